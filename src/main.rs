use color_eyre::Result;
use tracing_appender::rolling;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    // Load .env (optional). This allows reading OPENAI_API_KEY from a local .env file.
    let config = ai_adventure::Config::from_env()?;

    // ログ: 標準出力はゲーム画面に使うため、ファイルへのみ出力する
    let file_appender = rolling::daily("logs", "adventure.log");
    // _guardはdropするとログが失われるため、main終了まで保持
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false) // ファイルにANSIカラー不要
        .with_target(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .init();

    tracing::info!(target: "app", config = ?config, "starting");

    // 勝ち負けどちらでも正常終了
    ai_adventure::run(config).await?;
    Ok(())
}
