//! テキストアドベンチャーの進行

pub mod orchestrator;
pub mod outcome;
pub mod prompts;
pub mod session;

pub use orchestrator::{
    Orchestrator, TurnResult, STALE_PREVIEW_MESSAGE, UNAVAILABLE_MESSAGE, UNREADABLE_INPUT_MESSAGE,
};
pub use outcome::{detect_outcome, Outcome};
pub use session::GameSession;
