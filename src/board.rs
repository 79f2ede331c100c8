//! 最新の生成画像を保持する共有ボード

use std::sync::{Arc, PoisonError, RwLock};

/// プレビューサーバーと画像生成タスクで共有する画像参照の置き場
///
/// 書き込みは常に全置換で、要素数は 0 か 1 にしかならない。
#[derive(Debug, Clone, Default)]
pub struct ImageBoard {
    images: Arc<RwLock<Vec<String>>>,
}

impl ImageBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// ボードの中身を `url` ひとつに置き換える
    pub fn replace<S: Into<String>>(&self, url: S) {
        let mut images = self.images.write().unwrap_or_else(PoisonError::into_inner);
        images.clear();
        images.push(url.into());
    }

    /// 現在の中身のコピー（ボード順）
    pub fn snapshot(&self) -> Vec<String> {
        self.images.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn len(&self) -> usize {
        self.images.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
