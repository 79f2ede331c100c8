//! 生成サービスへ送る固定プロンプト

use crate::openai::ChatMessage;

const WORLD_PROMPT: &str = "Imagine a fictional world. Describe the world and explain the laws and logic \
of the world in one sentence. Keep it short. Make the world close to our world. It should either play in \
the medieval ages or a science future. There are no absurdly weird things happening.";

const IMAGE_PROMPT: &str = "Describe the current users situation and environment in a super simple \
descriptive short sentence. Include the player. Remove any capitalization and punctuation.";

/// 世界生成の会話（単発）
pub fn world_request() -> Vec<ChatMessage> {
    vec![ChatMessage::user(WORLD_PROMPT)]
}

/// 世界の説明からクエストを作る会話（単発）
pub fn quest_request(world: &str) -> Vec<ChatMessage> {
    vec![ChatMessage::user(format!(
        "{world} is a world where the player is in. Think of a quest the player must complete. \
The quest should be short and concise. It should be possible to complete the quest in a few minutes. \
The quest should be fun and interesting. The quest should be possible. \
The quest should be short and concise and one sentence. The quest should be simple. \
Answer in one sentence only. Max 20 words."
    ))]
}

/// 現在の状況を画像用の一文にまとめさせる会話
///
/// メインの会話全体の後ろに指示を一つ足したもの。元の会話は変更しない。
pub fn image_prompt_request(conversation: &[ChatMessage]) -> Vec<ChatMessage> {
    let mut messages = conversation.to_vec();
    messages.push(ChatMessage::user(IMAGE_PROMPT));
    messages
}

/// ゲームマスターのルール（会話先頭の system メッセージ）
pub fn game_master_rules(world: &str, quest: &str) -> String {
    format!(
        "You are a game master providing an interactive experience for a player.
Give the player information about their current location.
The player is in a \"{world}\". Answer very short and concise.
Every time the player performs an action, you should describe the result of the action and a random event that happens in correlation to the action.
The player has no super powers and is bound to the laws of physics.
He can not do anything that is not possible in the real world.
The player can only do things that are in his control.
The player can only complete basic tasks.
The player has the quest to \"{quest}\".
When the player dies or the quest is not completable anymore, the game ends and you end your message with 'You lost'. When the player completes the quest, you end your message with 'You won'.
You must inform the player, that he can not do something, if he tries to do something that is not possible. The player can only complete single tasks at a time. The player can not do multiple things at once.
The player can not control the world in any way.
The quest should require multiple steps to complete.
The quest should be possible to complete within 5 actions."
    )
}
