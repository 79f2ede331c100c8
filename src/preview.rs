//! 最新画像を表示するプレビューサーバー

use crate::board::ImageBoard;
use crate::config::Config;
use askama::Template;
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::get,
    Router,
};
use color_eyre::Result;
use tokio::net::TcpListener;

/// プレビューページテンプレート
#[derive(Template)]
#[template(path = "preview.html")]
pub struct PreviewTemplate {
    pub images: Vec<String>,
    pub refresh_ms: u64,
    pub width: u32,
}

/// ハンドラーが共有する状態
#[derive(Clone)]
pub struct PreviewState {
    pub board: ImageBoard,
    pub refresh_ms: u64,
    pub width: u32,
}

impl PreviewState {
    pub fn new(board: ImageBoard, config: &Config) -> Self {
        Self {
            board,
            refresh_ms: config.refresh_interval_ms,
            width: config.image_width_px,
        }
    }
}

/// ルーティング設定（GET / のみ）
pub fn router(state: PreviewState) -> Router {
    Router::new().route("/", get(index)).with_state(state)
}

/// GET / - ボードの現在の中身を自動リロード付きで表示
pub async fn index(State(state): State<PreviewState>) -> impl IntoResponse {
    let template = PreviewTemplate {
        images: state.board.snapshot(),
        refresh_ms: state.refresh_ms,
        width: state.width,
    };
    match template.render() {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::error!(target: "preview", error = %e, "template render failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Template error: {}", e),
            )
                .into_response()
        }
    }
}

/// サーバー起動
pub async fn serve(listener: TcpListener, app: Router) -> Result<()> {
    let addr = listener.local_addr()?;
    tracing::info!(target: "preview", "Preview server running on http://{}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}
