//! 生成サービスのクライアント（チャット補完・ストリーミング・画像生成）

use crate::config::Config;
use crate::openai::history::{ChatMessage, Role};
use crate::openai::retry::with_retry;
use async_openai::config::OpenAIConfig;
use async_openai::error::OpenAIError;
use async_openai::types::{
    ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequest, CreateChatCompletionRequestArgs, CreateChatCompletionResponse,
    CreateImageRequest, CreateImageRequestArgs, Image, ImageResponseFormat, ImagesResponse,
};
use async_openai::Client;
use async_trait::async_trait;
use color_eyre::{eyre::eyre, Result};
use futures::stream::{BoxStream, StreamExt};
use tracing::{debug, info, instrument};

/// 到着順に流れてくる応答テキスト断片のストリーム
pub type TextStream = BoxStream<'static, Result<String>>;

/// リモート生成サービスの抽象
///
/// どのメソッドもタイムアウトを持たない。失敗は `Err` として呼び出し側に返す。
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// 会話全体を送り、完成したアシスタント応答テキストを返す
    async fn complete_once(&self, messages: &[ChatMessage]) -> Result<String>;

    /// 会話全体を送り、応答テキストを断片ごとに返すストリームを開く（再開不可）
    async fn complete_streaming(&self, messages: &[ChatMessage]) -> Result<TextStream>;

    /// 短い説明文から画像を生成し、その参照（URL）を返す
    async fn generate_image(&self, prompt: &str) -> Result<String>;
}

/// async-openai を使った実装
pub struct OpenAiClient {
    client: Client<OpenAIConfig>,
    config: Config,
}

impl OpenAiClient {
    pub fn new(config: &Config) -> Self {
        let openai_config = OpenAIConfig::new().with_api_key(config.api_key.clone());
        Self {
            client: Client::with_config(openai_config),
            config: config.clone(),
        }
    }

    fn chat_request(&self, messages: &[ChatMessage]) -> Result<CreateChatCompletionRequest> {
        let req = CreateChatCompletionRequestArgs::default()
            .model(&self.config.model)
            .temperature(self.config.temperature)
            .messages(to_request_messages(messages)?)
            .build()?;
        Ok(req)
    }

    fn image_request(&self, prompt: &str) -> Result<CreateImageRequest> {
        let req = CreateImageRequestArgs::default()
            .prompt(prompt)
            .n(1)
            .size(self.config.image_size.clone())
            .response_format(ImageResponseFormat::Url)
            .build()?;
        Ok(req)
    }
}

/// 最初の選択肢の本文。空や空白だけの応答はエラー
fn first_text(resp: CreateChatCompletionResponse) -> Result<String> {
    resp.choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .filter(|text| !text.trim().is_empty())
        .ok_or_else(|| eyre!("chat completion returned no text"))
}

/// 最初の画像の参照。base64 で返ってきた場合は data URL にする
fn first_image_ref(resp: &ImagesResponse) -> Result<String> {
    let image = resp
        .data
        .first()
        .ok_or_else(|| eyre!("image response contained no data"))?;
    match image.as_ref() {
        Image::Url { url, .. } => Ok(url.to_string()),
        Image::B64Json { b64_json, .. } => Ok(format!("data:image/png;base64,{b64_json}")),
    }
}

/// 接続系のエラーだけを一時的な失敗として扱う
fn is_transient(e: &OpenAIError) -> bool {
    matches!(e, OpenAIError::Reqwest(_))
}

/// ドメインのメッセージを async-openai のリクエスト型へ変換する
pub fn to_request_messages(messages: &[ChatMessage]) -> Result<Vec<ChatCompletionRequestMessage>> {
    messages
        .iter()
        .map(|m| -> Result<ChatCompletionRequestMessage> {
            let msg: ChatCompletionRequestMessage = match m.role {
                Role::System => ChatCompletionRequestSystemMessageArgs::default()
                    .content(m.content.as_str())
                    .build()?
                    .into(),
                Role::User => ChatCompletionRequestUserMessageArgs::default()
                    .content(m.content.as_str())
                    .build()?
                    .into(),
                Role::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
                    .content(m.content.as_str())
                    .build()?
                    .into(),
            };
            Ok(msg)
        })
        .collect()
}

#[async_trait]
impl GenerationClient for OpenAiClient {
    #[instrument(name = "complete_once", skip_all, fields(messages = messages.len()))]
    async fn complete_once(&self, messages: &[ChatMessage]) -> Result<String> {
        let req = self.chat_request(messages)?;
        info!(
            target: "openai",
            "chat_request: model={}, messages={}",
            self.config.model,
            messages.len()
        );

        let resp = with_retry(
            "complete_once",
            self.config.max_attempts,
            self.config.retry_backoff,
            is_transient,
            || {
                let req = req.clone();
                async move { self.client.chat().create(req).await }
            },
        )
        .await?;
        debug!(target: "openai", "chat_response_choices: {}", resp.choices.len());
        first_text(resp)
    }

    #[instrument(name = "complete_streaming", skip_all, fields(messages = messages.len()))]
    async fn complete_streaming(&self, messages: &[ChatMessage]) -> Result<TextStream> {
        let req = self.chat_request(messages)?;
        info!(
            target: "openai",
            "stream_request: model={}, messages={}",
            self.config.model,
            messages.len()
        );

        let stream = self.client.chat().create_stream(req).await?;
        let text = stream.filter_map(|item| async move {
            match item {
                Ok(resp) => {
                    let chunk: String = resp
                        .choices
                        .iter()
                        .filter_map(|c| c.delta.content.as_deref())
                        .collect();
                    (!chunk.is_empty()).then_some(Ok(chunk))
                }
                Err(e) => Some(Err(color_eyre::Report::from(e))),
            }
        });
        Ok(text.boxed())
    }

    #[instrument(name = "generate_image", skip(self))]
    async fn generate_image(&self, prompt: &str) -> Result<String> {
        let req = self.image_request(prompt)?;
        info!(target: "openai", "image_request: size={:?}", self.config.image_size);

        let resp = with_retry(
            "generate_image",
            self.config.max_attempts,
            self.config.retry_backoff,
            is_transient,
            || {
                let req = req.clone();
                async move { self.client.images().create(req).await }
            },
        )
        .await?;
        debug!(target: "openai", "image_response_data: {}", resp.data.len());
        first_image_ref(&resp)
    }
}
