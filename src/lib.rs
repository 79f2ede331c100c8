
// 同階層のファイルをモジュールとしてインポート
pub mod board; // shared image board read by the preview page
pub mod config;
pub mod game; // narrative loop, prompts, outcome detection
pub mod openai;
pub mod preview; // auto-refreshing image page

pub use board::ImageBoard;
pub use config::Config;
pub use game::{Orchestrator, Outcome};

use color_eyre::Result;
use openai::OpenAiClient;
use std::sync::Arc;
use tokio::io::BufReader;
use tokio::net::TcpListener;

// Ensure .env is loaded for tests before anything else runs in the test process.
#[cfg(test)]
#[ctor::ctor]
fn load_dotenv_for_tests() {
    let _ = dotenvy::dotenv();
}

/// アプリケーションのメイン処理を実行
///
/// プレビューサーバーを裏で起動し、標準入出力で対話ループを回す。
pub async fn run(config: Config) -> Result<Option<Outcome>> {
    let board = ImageBoard::new();

    let listener = TcpListener::bind(config.preview_addr).await?;
    let app = preview::router(preview::PreviewState::new(board.clone(), &config));
    tokio::spawn(async move {
        if let Err(e) = preview::serve(listener, app).await {
            tracing::error!(target: "preview", error = %e, "preview server stopped");
        }
    });

    let client = Arc::new(OpenAiClient::new(&config));
    let orchestrator = Orchestrator::new(client, board, config);

    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();
    let outcome = orchestrator.run(stdin, &mut stdout).await?;
    tracing::info!(target: "game", outcome = ?outcome, "session_finished");
    Ok(outcome)
}
