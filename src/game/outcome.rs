//! 終了マーカーの検出

use crossterm::style::{StyledContent, Stylize};
use std::fmt;

/// 勝利マーカー（小文字で比較）
pub const WIN_MARKER: &str = "you won";
/// 敗北マーカー（小文字で比較）
pub const LOSS_MARKER: &str = "you lost";

/// ゲームの決着
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Won,
    Lost,
}

impl Outcome {
    /// 端末に出す決着メッセージ
    pub fn banner(self) -> StyledContent<&'static str> {
        match self {
            Outcome::Won => "You won!".green(),
            Outcome::Lost => "You lost!".red(),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Won => f.write_str("won"),
            Outcome::Lost => f.write_str("lost"),
        }
    }
}

/// 語り手の応答全体からマーカーを探す
///
/// 大文字小文字を無視した部分一致で、位置は問わない。両方含まれる場合は勝利を優先する。
pub fn detect_outcome(text: &str) -> Option<Outcome> {
    let lower = text.to_lowercase();
    if lower.contains(WIN_MARKER) {
        Some(Outcome::Won)
    } else if lower.contains(LOSS_MARKER) {
        Some(Outcome::Lost)
    } else {
        None
    }
}
