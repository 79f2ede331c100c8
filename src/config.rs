//! アプリケーション設定と定数

use async_openai::types::ImageSize;
use color_eyre::{eyre::eyre, Result};
use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

/// APIキーを読み取る環境変数
pub const API_KEY_VAR: &str = "OPENAI_API_KEY";

/// 厳格モード（元の挙動どおりリモート失敗で終了）を有効にする環境変数
pub const STRICT_VAR: &str = "ADVENTURE_STRICT";

/// アプリケーション設定
#[derive(Clone)]
pub struct Config {
    /// OpenAI APIキー
    pub api_key: String,
    /// チャットモデル名
    pub model: String,
    /// 生成温度（1.0 = 最大のランダム性）
    pub temperature: f32,
    /// 生成画像の解像度
    pub image_size: ImageSize,
    /// 画像プロンプト末尾に付けるスタイル指定
    pub image_style_suffix: String,
    /// プレビューサーバーの待ち受けアドレス
    pub preview_addr: SocketAddr,
    /// プレビューページの自動リロード間隔（ミリ秒）
    pub refresh_interval_ms: u64,
    /// プレビュー画像の表示幅（px）
    pub image_width_px: u32,
    /// 一時的な通信エラー時の最大試行回数
    pub max_attempts: u32,
    /// リトライ間隔の基準値（試行ごとに線形に伸びる）
    pub retry_backoff: Duration,
    /// trueならメインループのリモート失敗でプロセスを終了する
    pub strict: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: "gpt-4".to_string(),
            temperature: 1.0,
            image_size: ImageSize::S256x256,
            image_style_suffix: "realistic".to_string(),
            preview_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            refresh_interval_ms: 500,
            image_width_px: 800,
            max_attempts: 3,
            retry_backoff: Duration::from_millis(500),
            strict: false,
        }
    }
}

impl Config {
    /// 新しい設定インスタンスを作成
    pub fn new() -> Self {
        Self::default()
    }

    /// プロセス環境（と .env）から設定を読み込む
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// 任意の変数ルックアップから設定を構築する
    pub fn from_vars<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(API_KEY_VAR)
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .ok_or_else(|| eyre!("{API_KEY_VAR} is not set"))?;

        let strict = lookup(STRICT_VAR)
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        let mut config = Self {
            api_key,
            strict,
            ..Self::default()
        };
        if config.strict {
            config.max_attempts = 1;
        }
        Ok(config)
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("image_size", &self.image_size)
            .field("image_style_suffix", &self.image_style_suffix)
            .field("preview_addr", &self.preview_addr)
            .field("refresh_interval_ms", &self.refresh_interval_ms)
            .field("image_width_px", &self.image_width_px)
            .field("max_attempts", &self.max_attempts)
            .field("retry_backoff", &self.retry_backoff)
            .field("strict", &self.strict)
            .finish()
    }
}
