//! LLM補完API連携モジュール

mod gemini;

pub use gemini::{GeminiClient, GEMINI_API_BASE};

use crate::error::Result;
use async_trait::async_trait;

/// プロンプトを1回送信し、応答テキストを1つ受け取る
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;
}
