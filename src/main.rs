//! Gemini-backed chat web server
//!
//! (c) Softlandia 2025

use tokio_gemini_chat_api::api;
use tokio_gemini_chat_api::core::services::{MyAuthService, MyChatService};
use tokio_gemini_chat_api::infrastructure::gemini::GeminiClient;
use tokio_gemini_chat_api::infrastructure::users::InMemoryUserStore;

use axum::Router;
use axum::http::{HeaderValue, Method};
use di::{Injectable, ServiceCollection};
use di_axum::RouterServiceProviderExtensions;
use log::info;
use tokio::runtime::{Builder, Runtime};
use tower_http::cors::{Any, CorsLayer};

fn main() -> anyhow::Result<()> {
    // initialize tracing
    tracing_subscriber::fmt::init();
    dotenvy::dotenv().ok();

    let runtime: Runtime = Builder::new_multi_thread().enable_all().build()?;
    runtime.block_on(web_server_task());

    Ok(())
}

async fn web_server_task() {
    let provider = ServiceCollection::new()
        .add(GeminiClient::singleton())
        .add(InMemoryUserStore::singleton())
        .add(MyChatService::singleton())
        .add(MyAuthService::scoped())
        .build_provider()
        .unwrap();

    // build our application with a route
    let app = Router::new()
        .nest("/chat", api::chat::router())
        .nest("/ai", api::chat::status_router())
        .nest("/auth", api::auth::router())
        .nest("/conversation", api::conversations::router())
        .layer(
            CorsLayer::new()
                .allow_headers(Any)
                .allow_methods([Method::GET, Method::POST])
                .allow_origin([
                    "http://localhost:3000".parse::<HeaderValue>().unwrap(),
                    "http://localhost:5173".parse::<HeaderValue>().unwrap(),
                ]),
        )
        .with_provider(provider);

    // run our app with hyper, listening globally on port 3000
    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();
    info!("listening on {}", listener.local_addr().unwrap());
    axum::serve(listener, app).await.unwrap();
    info!("Shutting down...");
}
