//! 1回のプレイ分の状態

use crate::game::outcome::Outcome;
use crate::openai::Conversation;

/// ゲームセッションの状態（プロセスごとに1つ）
#[derive(Debug, Clone)]
pub struct GameSession {
    /// 生成された世界の説明
    pub world: String,
    /// 生成されたクエスト
    pub quest: String,
    /// メインの会話（先頭はルールの system メッセージ）
    pub conversation: Conversation,
    /// 決着がついたら Some
    pub outcome: Option<Outcome>,
}

impl GameSession {
    pub fn new(world: String, quest: String, conversation: Conversation) -> Self {
        Self {
            world,
            quest,
            conversation,
            outcome: None,
        }
    }

    pub fn is_terminated(&self) -> bool {
        self.outcome.is_some()
    }
}
