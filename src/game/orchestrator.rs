//! 語り手ループ（世界生成 → 入力待ち → ストリーミング → 決着判定）

use crate::board::ImageBoard;
use crate::config::Config;
use crate::game::outcome::{detect_outcome, Outcome};
use crate::game::prompts;
use crate::game::session::GameSession;
use crate::openai::{Conversation, GenerationClient};
use color_eyre::{
    eyre::{bail, WrapErr},
    Result,
};
use crossterm::cursor::MoveTo;
use crossterm::queue;
use crossterm::style::Stylize;
use crossterm::terminal::{Clear, ClearType};
use futures::StreamExt;
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

/// 語りの取得に失敗したときにプレイヤーへ出すメッセージ
pub const UNAVAILABLE_MESSAGE: &str = "The game master is unavailable, try again.";

/// 入力行を文字列として読めなかったときのメッセージ
pub const UNREADABLE_INPUT_MESSAGE: &str = "Could not read that input, try again.";

/// 裏の画像更新が失敗したことを次の入力前に知らせるメッセージ
pub const STALE_PREVIEW_MESSAGE: &str = "(The preview image could not be updated.)";

/// 1ターンの結果
#[derive(Debug)]
pub enum TurnResult {
    /// ゲーム続行。背景の画像更新タスクは待たなくてよい
    Continue { image_task: JoinHandle<()> },
    /// 決着
    Finished(Outcome),
}

/// ゲーム進行を担うオーケストレーター
pub struct Orchestrator<C> {
    client: Arc<C>,
    board: ImageBoard,
    config: Config,
    /// 画像タスクが失敗してから、まだプレイヤーに知らせていない
    preview_stale: Arc<AtomicBool>,
}

impl<C> Orchestrator<C>
where
    C: GenerationClient + 'static,
{
    pub fn new(client: Arc<C>, board: ImageBoard, config: Config) -> Self {
        Self {
            client,
            board,
            config,
            preview_stale: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn board(&self) -> &ImageBoard {
        &self.board
    }

    /// 前回の確認以降に画像更新が失敗していれば true を返し、フラグを下ろす
    pub fn take_preview_stale(&self) -> bool {
        self.preview_stale.swap(false, Ordering::SeqCst)
    }

    /// 世界とクエストを生成し、ルール入りの会話でセッションを作る
    ///
    /// 世界の画像生成は裏で走らせ、完了を待たない。
    #[instrument(name = "initialize", skip_all)]
    pub async fn initialize<W: Write>(&self, out: &mut W) -> Result<GameSession> {
        writeln!(out, "Generating world...")?;
        out.flush()?;
        let world = self
            .client
            .complete_once(&prompts::world_request())
            .await
            .wrap_err("could not generate the world")?;
        info!(target: "game", world = %world, "world_generated");

        writeln!(out, "Generating quest...")?;
        out.flush()?;
        let quest = self
            .client
            .complete_once(&prompts::quest_request(&world))
            .await
            .wrap_err("could not generate the quest")?;
        info!(target: "game", quest = %quest, "quest_generated");

        queue!(out, Clear(ClearType::All), MoveTo(0, 0))?;
        writeln!(out, "World: {}", world.as_str().green())?;
        writeln!(out, "Quest: {}", quest.as_str().green())?;
        out.flush()?;

        self.spawn_image(world.clone());

        let conversation = Conversation::new(prompts::game_master_rules(&world, &quest));
        Ok(GameSession::new(world, quest, conversation))
    }

    /// プレイヤーの行動1つを会話に加えて語りを進める
    #[instrument(name = "play_turn", skip(self, session, out))]
    pub async fn play_turn<W: Write>(
        &self,
        session: &mut GameSession,
        action: &str,
        out: &mut W,
    ) -> Result<TurnResult> {
        if let Some(outcome) = session.outcome {
            bail!("the session has already ended ({outcome})");
        }
        session.conversation.add_user(action);
        self.narrate(session, out).await
    }

    /// 現在の会話に対する語りをストリーミングで受け取る
    ///
    /// 応答は届いた順にそのまま `out` へ書き出す。決着マーカーがなければ応答を会話に追加し、
    /// 画像更新タスクを起動して返す。途中で失敗した場合は部分的な応答を会話に残さない。
    pub async fn narrate<W: Write>(
        &self,
        session: &mut GameSession,
        out: &mut W,
    ) -> Result<TurnResult> {
        if let Some(outcome) = session.outcome {
            bail!("the session has already ended ({outcome})");
        }

        let mut stream = self
            .client
            .complete_streaming(session.conversation.as_slice())
            .await
            .wrap_err("narrative request failed")?;

        let mut narrative = String::new();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.wrap_err("narrative stream interrupted")?;
            write!(out, "{chunk}")?;
            out.flush()?;
            narrative.push_str(&chunk);
        }
        writeln!(out)?;
        debug!(target: "game", len = narrative.len(), "narrative_complete");

        if let Some(outcome) = detect_outcome(&narrative) {
            info!(target: "game", %outcome, "session_terminated");
            session.outcome = Some(outcome);
            writeln!(out, "{}", outcome.banner())?;
            out.flush()?;
            return Ok(TurnResult::Finished(outcome));
        }

        session.conversation.add_assistant(narrative);
        let image_task = self.spawn_image_refresh(session.conversation.clone());
        Ok(TurnResult::Continue { image_task })
    }

    /// 会話から状況説明を作らせ、それを元に画像を生成してボードを置き換える
    ///
    /// 先行タスクとの順序は保証しない。後から終わったタスクの画像が残る。
    pub fn spawn_image_refresh(&self, conversation: Conversation) -> JoinHandle<()> {
        let client = Arc::clone(&self.client);
        let board = self.board.clone();
        let stale = Arc::clone(&self.preview_stale);
        let suffix = self.config.image_style_suffix.clone();
        tokio::spawn(async move {
            let request = prompts::image_prompt_request(conversation.as_slice());
            match client.complete_once(&request).await {
                Ok(description) => {
                    let prompt = format!("{description} {suffix}");
                    render_image(client.as_ref(), &board, &stale, prompt).await
                }
                Err(e) => {
                    warn!(target: "game", error = %e, "image_prompt_failed");
                    stale.store(true, Ordering::SeqCst);
                }
            }
        })
    }

    /// 説明文から直接画像を生成してボードを置き換える
    pub fn spawn_image(&self, description: String) -> JoinHandle<()> {
        let client = Arc::clone(&self.client);
        let board = self.board.clone();
        let stale = Arc::clone(&self.preview_stale);
        let prompt = format!("{description} {}", self.config.image_style_suffix);
        tokio::spawn(async move { render_image(client.as_ref(), &board, &stale, prompt).await })
    }

    /// 対話ループ本体
    ///
    /// 決着がつけば `Some(outcome)`、入力が閉じられれば `None` を返す。
    /// 厳格モードでなければ、ターン中のリモート失敗はメッセージを出して入力待ちに戻る。
    /// UTF-8 として読めない行は捨てて入力待ちに戻る。
    pub async fn run<R, W>(&self, input: R, out: &mut W) -> Result<Option<Outcome>>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        let mut session = self.initialize(out).await?;
        let mut lines = input.lines();

        loop {
            if self.take_preview_stale() {
                writeln!(out, "{}", STALE_PREVIEW_MESSAGE.dark_grey())?;
            }
            writeln!(out, "\nWhat do you do?")?;
            write!(out, "{} ", ">".blue())?;
            out.flush()?;

            let line = match lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => {
                    info!(target: "game", "input_closed");
                    writeln!(out)?;
                    return Ok(None);
                }
                // 不正なバイト列は読み捨て済みなので、そのまま次の行を待てる
                Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                    warn!(target: "game", error = %e, "input_not_utf8");
                    writeln!(out, "{}", UNREADABLE_INPUT_MESSAGE.red())?;
                    continue;
                }
                Err(e) => return Err(e.into()),
            };
            let action = line.trim();
            if action.is_empty() {
                continue;
            }

            match self.play_turn(&mut session, action, out).await {
                Ok(TurnResult::Finished(outcome)) => return Ok(Some(outcome)),
                // 画像タスクは待たずに次の入力へ
                Ok(TurnResult::Continue { .. }) => {}
                Err(e) if self.config.strict => return Err(e),
                Err(e) => {
                    warn!(target: "game", error = ?e, "turn_failed");
                    writeln!(out, "\n{}", UNAVAILABLE_MESSAGE.red())?;
                }
            }
        }
    }
}

async fn render_image<C>(client: &C, board: &ImageBoard, stale: &AtomicBool, prompt: String)
where
    C: GenerationClient + ?Sized,
{
    match client.generate_image(&prompt).await {
        Ok(url) => {
            info!(target: "game", prompt = %prompt, "image_ready");
            board.replace(url);
        }
        Err(e) => {
            warn!(target: "game", prompt = %prompt, error = %e, "image_generation_failed");
            stale.store(true, Ordering::SeqCst);
        }
    }
}
