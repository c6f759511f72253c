//! Conversation state and the per-turn lifecycle.

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

/// Oldest input-recall entries are dropped past this many.
pub const INPUT_HISTORY_LIMIT: usize = 50;

/// Advisory error recorded when a dispatched generation attempt fails.
pub const SEND_FAILURE_ERROR: &str = "Failed to send message";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Bot,
}

#[derive(Debug, Clone)]
pub struct Message {
    pub id: Uuid,
    pub content: String,
    pub sender: Sender,
    pub timestamp: DateTime<Utc>,
    pub is_loading: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryDirection {
    Up,
    Down,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubmitError {
    #[error("message is required")]
    EmptyInput,
    #[error("a turn is already in flight for this conversation")]
    TurnInFlight,
}

/// Phases of one in-flight turn. `advance` is the only way to move
/// between them.
#[derive(Debug)]
pub enum TurnPhase {
    AwaitingAvailability,
    Generating,
    FallingBack { failed: bool },
    Resolved(TurnResolution),
}

#[derive(Debug)]
pub enum TurnEvent {
    ProbeFinished { available: bool },
    GenerationSucceeded(String),
    GenerationFailed,
    FallbackComputed(String),
}

#[derive(Debug)]
pub struct TurnResolution {
    pub text: String,
    pub error: Option<String>,
}

/// Advances the turn state machine by one event.
///
/// A probe miss falls back without recording the advisory error; a failed
/// generation attempt falls back *and* records it. An event that does not
/// apply to the current phase leaves the phase unchanged.
pub fn advance(phase: TurnPhase, event: TurnEvent) -> TurnPhase {
    match (phase, event) {
        (TurnPhase::AwaitingAvailability, TurnEvent::ProbeFinished { available: true }) => {
            TurnPhase::Generating
        }
        (TurnPhase::AwaitingAvailability, TurnEvent::ProbeFinished { available: false }) => {
            TurnPhase::FallingBack { failed: false }
        }
        (TurnPhase::Generating, TurnEvent::GenerationSucceeded(text)) => {
            TurnPhase::Resolved(TurnResolution { text, error: None })
        }
        (TurnPhase::Generating, TurnEvent::GenerationFailed) => {
            TurnPhase::FallingBack { failed: true }
        }
        (TurnPhase::FallingBack { failed }, TurnEvent::FallbackComputed(text)) => {
            TurnPhase::Resolved(TurnResolution {
                text,
                error: failed.then(|| SEND_FAILURE_ERROR.to_owned()),
            })
        }
        (phase, _) => phase,
    }
}

/// Ordered message history plus input recall for a single user.
///
/// Messages are append-only except for the wholesale [`Conversation::clear`],
/// and a bot placeholder's content is rewritten exactly once when its turn
/// resolves.
#[derive(Debug, Default)]
pub struct Conversation {
    messages: Vec<Message>,
    input_history: Vec<String>,
    history_cursor: Option<usize>,
    error: Option<String>,
    turn_in_flight: bool,
}

impl Conversation {
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn input_history(&self) -> &[String] {
        &self.input_history
    }

    /// Starts a turn: appends the (trimmed) user message and a loading bot
    /// placeholder, records the input for recall, and resets the history
    /// cursor. Returns the placeholder id the resolution must target.
    ///
    /// Rejects blank input and overlapping submissions; at most one turn is
    /// in flight per conversation.
    pub fn begin_turn(&mut self, input: &str) -> Result<Uuid, SubmitError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(SubmitError::EmptyInput);
        }
        if self.turn_in_flight {
            return Err(SubmitError::TurnInFlight);
        }

        self.turn_in_flight = true;
        self.error = None;
        self.messages.push(Message {
            id: Uuid::new_v4(),
            content: trimmed.to_owned(),
            sender: Sender::User,
            timestamp: Utc::now(),
            is_loading: false,
        });
        self.record_input(trimmed);

        let placeholder_id = Uuid::new_v4();
        self.messages.push(Message {
            id: placeholder_id,
            content: String::new(),
            sender: Sender::Bot,
            timestamp: Utc::now(),
            is_loading: true,
        });
        Ok(placeholder_id)
    }

    /// Finishes a turn. If the placeholder is gone (the conversation was
    /// cleared while the turn was in flight) the resolution is a no-op
    /// beyond releasing the single-flight guard.
    pub fn resolve_turn(&mut self, placeholder_id: Uuid, resolution: TurnResolution) {
        self.turn_in_flight = false;
        if let Some(message) = self.messages.iter_mut().find(|m| m.id == placeholder_id) {
            message.content = resolution.text;
            message.is_loading = false;
            if resolution.error.is_some() {
                self.error = resolution.error;
            }
        }
    }

    /// Empties the message sequence and the advisory error. An in-flight
    /// turn is not cancelled; its resolution lands as a no-op.
    pub fn clear(&mut self) {
        self.messages.clear();
        self.error = None;
    }

    /// Moves the recall cursor and returns the entry under it, or an empty
    /// string when recall leaves the history (or the history is empty).
    pub fn navigate_history(&mut self, direction: HistoryDirection) -> String {
        if self.input_history.is_empty() {
            return String::new();
        }

        self.history_cursor = match (direction, self.history_cursor) {
            (HistoryDirection::Up, None) => Some(0),
            (HistoryDirection::Up, Some(cursor)) => {
                Some((cursor + 1).min(self.input_history.len() - 1))
            }
            (HistoryDirection::Down, None) | (HistoryDirection::Down, Some(0)) => None,
            (HistoryDirection::Down, Some(cursor)) => Some(cursor - 1),
        };

        match self.history_cursor {
            Some(cursor) => self.input_history[cursor].clone(),
            None => String::new(),
        }
    }

    /// Most-recent-first, deduplicated, capped.
    fn record_input(&mut self, input: &str) {
        self.input_history.retain(|entry| entry != input);
        self.input_history.insert(0, input.to_owned());
        self.input_history.truncate(INPUT_HISTORY_LIMIT);
        self.history_cursor = None;
    }
}

/// Messages plus the advisory error, cloned out for the presentation layer.
#[derive(Debug)]
pub struct ConversationSnapshot {
    pub messages: Vec<Message>,
    pub error: Option<String>,
}

/// Exportable document: the full message sequence and an export timestamp.
#[derive(Debug)]
pub struct ConversationExport {
    pub messages: Vec<Message>,
    pub exported_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolved(text: &str) -> TurnResolution {
        TurnResolution {
            text: text.to_owned(),
            error: None,
        }
    }

    #[test]
    fn test_begin_turn_appends_user_then_placeholder() {
        let mut convo = Conversation::default();
        let placeholder_id = convo.begin_turn("  Hi there  ").unwrap();

        let messages = convo.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].sender, Sender::User);
        assert_eq!(messages[0].content, "Hi there");
        assert!(!messages[0].is_loading);
        assert_eq!(messages[1].sender, Sender::Bot);
        assert_eq!(messages[1].id, placeholder_id);
        assert!(messages[1].is_loading);
        assert!(messages[1].content.is_empty());
    }

    #[test]
    fn test_begin_turn_rejects_blank_input() {
        let mut convo = Conversation::default();
        assert_eq!(convo.begin_turn("   "), Err(SubmitError::EmptyInput));
        assert!(convo.messages().is_empty());
        assert!(convo.input_history().is_empty());
    }

    #[test]
    fn test_begin_turn_rejects_overlapping_submission() {
        let mut convo = Conversation::default();
        convo.begin_turn("first").unwrap();
        assert_eq!(convo.begin_turn("second"), Err(SubmitError::TurnInFlight));
        assert_eq!(convo.messages().len(), 2);
    }

    #[test]
    fn test_resolve_turn_rewrites_placeholder_once() {
        let mut convo = Conversation::default();
        let placeholder_id = convo.begin_turn("question").unwrap();
        convo.resolve_turn(placeholder_id, resolved("answer"));

        let bot = &convo.messages()[1];
        assert_eq!(bot.content, "answer");
        assert!(!bot.is_loading);
        assert!(convo.error().is_none());

        // the guard is released, a new turn is accepted
        convo.begin_turn("next").unwrap();
    }

    #[test]
    fn test_resolve_turn_records_advisory_error() {
        let mut convo = Conversation::default();
        let placeholder_id = convo.begin_turn("question").unwrap();
        convo.resolve_turn(
            placeholder_id,
            TurnResolution {
                text: "fallback".to_owned(),
                error: Some(SEND_FAILURE_ERROR.to_owned()),
            },
        );
        assert_eq!(convo.error(), Some(SEND_FAILURE_ERROR));
    }

    #[test]
    fn test_resolution_after_clear_is_a_no_op() {
        let mut convo = Conversation::default();
        let placeholder_id = convo.begin_turn("question").unwrap();
        convo.clear();
        convo.resolve_turn(
            placeholder_id,
            TurnResolution {
                text: "late reply".to_owned(),
                error: Some(SEND_FAILURE_ERROR.to_owned()),
            },
        );
        assert!(convo.messages().is_empty());
        assert!(convo.error().is_none());
    }

    #[test]
    fn test_begin_turn_clears_previous_error() {
        let mut convo = Conversation::default();
        let placeholder_id = convo.begin_turn("question").unwrap();
        convo.resolve_turn(
            placeholder_id,
            TurnResolution {
                text: "fallback".to_owned(),
                error: Some(SEND_FAILURE_ERROR.to_owned()),
            },
        );
        convo.begin_turn("again").unwrap();
        assert!(convo.error().is_none());
    }

    #[test]
    fn test_input_history_dedupes_to_front() {
        let mut convo = Conversation::default();
        for input in ["a", "b", "a"] {
            let id = convo.begin_turn(input).unwrap();
            convo.resolve_turn(id, resolved("ok"));
        }
        assert_eq!(convo.input_history(), ["a", "b"]);
    }

    #[test]
    fn test_input_history_is_capped() {
        let mut convo = Conversation::default();
        for n in 0..60 {
            let id = convo.begin_turn(&format!("input {n}")).unwrap();
            convo.resolve_turn(id, resolved("ok"));
        }
        assert_eq!(convo.input_history().len(), INPUT_HISTORY_LIMIT);
        assert_eq!(convo.input_history()[0], "input 59");
    }

    #[test]
    fn test_history_navigation_round_trip() {
        let mut convo = Conversation::default();
        for input in ["one", "two", "three"] {
            let id = convo.begin_turn(input).unwrap();
            convo.resolve_turn(id, resolved("ok"));
        }

        // up walks toward older entries and saturates
        assert_eq!(convo.navigate_history(HistoryDirection::Up), "three");
        assert_eq!(convo.navigate_history(HistoryDirection::Up), "two");
        assert_eq!(convo.navigate_history(HistoryDirection::Up), "one");
        assert_eq!(convo.navigate_history(HistoryDirection::Up), "one");

        // an equal number of downs returns to "not recalling"
        assert_eq!(convo.navigate_history(HistoryDirection::Down), "two");
        assert_eq!(convo.navigate_history(HistoryDirection::Down), "three");
        assert_eq!(convo.navigate_history(HistoryDirection::Down), "");
        assert_eq!(convo.navigate_history(HistoryDirection::Down), "");
    }

    #[test]
    fn test_history_navigation_with_empty_history() {
        let mut convo = Conversation::default();
        assert_eq!(convo.navigate_history(HistoryDirection::Up), "");
        assert_eq!(convo.navigate_history(HistoryDirection::Down), "");
    }

    #[test]
    fn test_submission_resets_history_cursor() {
        let mut convo = Conversation::default();
        for input in ["one", "two"] {
            let id = convo.begin_turn(input).unwrap();
            convo.resolve_turn(id, resolved("ok"));
        }
        convo.navigate_history(HistoryDirection::Up);
        convo.navigate_history(HistoryDirection::Up);

        let id = convo.begin_turn("three").unwrap();
        convo.resolve_turn(id, resolved("ok"));

        // back at the top of the history
        assert_eq!(convo.navigate_history(HistoryDirection::Up), "three");
    }

    #[test]
    fn test_advance_probe_hit_generates() {
        let phase = advance(
            TurnPhase::AwaitingAvailability,
            TurnEvent::ProbeFinished { available: true },
        );
        assert!(matches!(phase, TurnPhase::Generating));
    }

    #[test]
    fn test_advance_probe_miss_falls_back_without_error() {
        let phase = advance(
            TurnPhase::AwaitingAvailability,
            TurnEvent::ProbeFinished { available: false },
        );
        let phase = advance(phase, TurnEvent::FallbackComputed("canned".to_owned()));
        match phase {
            TurnPhase::Resolved(resolution) => {
                assert_eq!(resolution.text, "canned");
                assert!(resolution.error.is_none());
            }
            other => panic!("expected Resolved, got {other:?}"),
        }
    }

    #[test]
    fn test_advance_generation_failure_falls_back_with_error() {
        let phase = advance(TurnPhase::Generating, TurnEvent::GenerationFailed);
        let phase = advance(phase, TurnEvent::FallbackComputed("canned".to_owned()));
        match phase {
            TurnPhase::Resolved(resolution) => {
                assert_eq!(resolution.error.as_deref(), Some(SEND_FAILURE_ERROR));
            }
            other => panic!("expected Resolved, got {other:?}"),
        }
    }

    #[test]
    fn test_advance_generation_success_resolves() {
        let phase = advance(
            TurnPhase::Generating,
            TurnEvent::GenerationSucceeded("reply".to_owned()),
        );
        match phase {
            TurnPhase::Resolved(resolution) => {
                assert_eq!(resolution.text, "reply");
                assert!(resolution.error.is_none());
            }
            other => panic!("expected Resolved, got {other:?}"),
        }
    }

    #[test]
    fn test_advance_ignores_mismatched_event() {
        let phase = advance(
            TurnPhase::AwaitingAvailability,
            TurnEvent::GenerationSucceeded("reply".to_owned()),
        );
        assert!(matches!(phase, TurnPhase::AwaitingAvailability));
    }
}
