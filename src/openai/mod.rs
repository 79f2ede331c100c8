//! OpenAI連携のモジュール

pub mod client;
pub mod history; // conversation history helper
pub mod retry;

// 代表的な公開APIを再エクスポート
pub use client::{GenerationClient, OpenAiClient, TextStream};
pub use history::{ChatMessage, Conversation, Role};
