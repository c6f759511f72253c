//! Canned responses for when the completion backend is unreachable.

use chrono::{DateTime, Local};
use rand::Rng;
use rand::seq::SliceRandom;

/// Generic unavailability notices, drawn from uniformly when no trigger
/// matches the input.
const FALLBACK_POOL: [&str; 3] = [
    "I'm currently unable to connect to the AI service. Please make sure your API key is configured correctly.",
    "The AI service is temporarily unavailable. Please check your internet connection and API configuration.",
    "I'm having trouble accessing the AI model. Please verify your Gemini API key is valid and has sufficient quota.",
];

const POOL_SUFFIX: &str =
    " I'm powered by Google Gemini AI - if you're seeing this, there might be a temporary connection issue.";

/// Generates a fallback reply for the given input.
pub fn generate(input: &str) -> String {
    respond(input, Local::now(), &mut rand::thread_rng())
}

/// Pure form of [`generate`]: same input, clock, and RNG draw always yield
/// the same reply. Triggers are checked in a fixed priority order against
/// the lowercased input; the first match wins.
pub fn respond(input: &str, now: DateTime<Local>, rng: &mut impl Rng) -> String {
    let lowered = input.to_lowercase();

    if lowered.contains("hello") || lowered.contains("hi") {
        return "Hello! I'm your AI assistant powered by Google Gemini. How can I help you today?"
            .to_owned();
    }

    if lowered.contains("how are you") {
        return "I'm doing well, thank you for asking! I'm here and ready to help with any questions or tasks you have."
            .to_owned();
    }

    if lowered.contains("weather") {
        return "I don't have access to real-time weather data, but I'd recommend checking a weather app or website for current conditions in your area."
            .to_owned();
    }

    if lowered.contains("time") {
        return format!(
            "The current time is {}. Is there something time-sensitive I can help you with?",
            now.format("%-I:%M:%S %p")
        );
    }

    if lowered.contains("help") {
        return "I'm here to help! You can ask me questions, have conversations, or request assistance with various topics. I'm powered by Google Gemini AI for intelligent responses."
            .to_owned();
    }

    if lowered.contains("ai") || lowered.contains("gemini") {
        return "I'm powered by Google Gemini AI! If you're seeing this message, it means the AI service might be temporarily unavailable. Please check your API configuration."
            .to_owned();
    }

    let notice = FALLBACK_POOL
        .choose(rng)
        .copied()
        .unwrap_or(FALLBACK_POOL[0]);
    format!("{notice}{POOL_SUFFIX}")
}
