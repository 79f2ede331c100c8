#![allow(dead_code)]

use ai_adventure::openai::{ChatMessage, GenerationClient, TextStream};
use async_trait::async_trait;
use color_eyre::{eyre::eyre, Result};
use futures::stream::{self, StreamExt};
use once_cell::sync::Lazy;
use std::collections::VecDeque;
use std::sync::{Mutex, Once};
use tracing_appender::rolling;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static START: Once = Once::new();
static _GUARD: Lazy<Mutex<Option<tracing_appender::non_blocking::WorkerGuard>>> =
    Lazy::new(|| Mutex::new(None));

/// Initialize test environment: dotenv and tracing (stderr + file).
/// Idempotent: safe to call multiple times.
pub fn init() {
    START.call_once(|| {
        let _ = dotenvy::dotenv();
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new("info"))
            .expect("env filter");

        // Daily rotating log file separate from app runtime logs
        let file_appender = rolling::daily("logs", "tests.log");
        let (file_nb, guard) = tracing_appender::non_blocking(file_appender);
        *_GUARD.lock().unwrap() = Some(guard); // retain guard for lifetime

        let stderr_layer = fmt::layer()
            .with_target(true)
            .with_test_writer();

        let file_layer = fmt::layer()
            .with_ansi(false)
            .with_target(true)
            .with_writer(file_nb);

        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(stderr_layer)
            .with(file_layer)
            .try_init();

        tracing::info!(target: "test_init", "Test tracing initialized (stderr + rotating file)");
    });
}

/// How a scripted streaming call behaves.
#[derive(Debug, Clone)]
pub enum StreamScript {
    /// Deliver these chunks, then finish.
    Chunks(Vec<&'static str>),
    /// Deliver these chunks, then fail mid-stream.
    Broken(Vec<&'static str>),
    /// Fail before any chunk arrives.
    Refused,
}

/// A `GenerationClient` double that replays scripted answers in order and records every call.
#[derive(Default)]
pub struct ScriptedClient {
    once_replies: Mutex<VecDeque<String>>,
    streams: Mutex<VecDeque<StreamScript>>,
    image_urls: Mutex<VecDeque<String>>,
    pub once_calls: Mutex<Vec<Vec<ChatMessage>>>,
    pub stream_calls: Mutex<Vec<Vec<ChatMessage>>>,
    pub image_prompts: Mutex<Vec<String>>,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, text: &str) -> Self {
        self.once_replies.lock().unwrap().push_back(text.to_string());
        self
    }

    pub fn stream(self, script: StreamScript) -> Self {
        self.streams.lock().unwrap().push_back(script);
        self
    }

    pub fn image(self, url: &str) -> Self {
        self.image_urls.lock().unwrap().push_back(url.to_string());
        self
    }

    pub fn once_call_count(&self) -> usize {
        self.once_calls.lock().unwrap().len()
    }

    pub fn image_prompts(&self) -> Vec<String> {
        self.image_prompts.lock().unwrap().clone()
    }

    pub fn stream_calls(&self) -> Vec<Vec<ChatMessage>> {
        self.stream_calls.lock().unwrap().clone()
    }
}

/// Poll the board until it holds exactly `expected`, or give up after about a second.
pub async fn wait_for_board(board: &ai_adventure::ImageBoard, expected: &[&str]) -> bool {
    for _ in 0..200 {
        let current = board.snapshot();
        if current.iter().map(String::as_str).eq(expected.iter().copied()) {
            return true;
        }
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }
    false
}

#[async_trait]
impl GenerationClient for ScriptedClient {
    async fn complete_once(&self, messages: &[ChatMessage]) -> Result<String> {
        self.once_calls.lock().unwrap().push(messages.to_vec());
        self.once_replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| eyre!("no scripted reply left"))
    }

    async fn complete_streaming(&self, messages: &[ChatMessage]) -> Result<TextStream> {
        self.stream_calls.lock().unwrap().push(messages.to_vec());
        let script = self.streams.lock().unwrap().pop_front();
        match script {
            Some(StreamScript::Chunks(chunks)) => {
                let items: Vec<Result<String>> =
                    chunks.into_iter().map(|c| Ok(c.to_string())).collect();
                Ok(stream::iter(items).boxed())
            }
            Some(StreamScript::Broken(chunks)) => {
                let items: Vec<Result<String>> = chunks
                    .into_iter()
                    .map(|c| Ok(c.to_string()))
                    .chain(std::iter::once(Err(eyre!("connection reset"))))
                    .collect();
                Ok(stream::iter(items).boxed())
            }
            Some(StreamScript::Refused) => Err(eyre!("service unavailable")),
            None => Err(eyre!("no scripted stream left")),
        }
    }

    async fn generate_image(&self, prompt: &str) -> Result<String> {
        self.image_prompts.lock().unwrap().push(prompt.to_string());
        self.image_urls
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| eyre!("image response contained no data"))
    }
}
