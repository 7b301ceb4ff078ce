//! OCRエンジン連携モジュール
//!
//! エンジンはセッション開始時に1度だけ初期化し、終了時に `terminate` で解放する。
//! 認識中は進捗通知（0.0〜1.0）を発行する。

mod tesseract;

pub use tesseract::{TesseractEngine, TesseractOptions};

use crate::capture::UploadedImage;
use crate::error::Result;
use async_trait::async_trait;

/// 進捗通知のステータス
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OcrStatus {
    /// 画像の受け渡し中
    LoadingImage,
    /// 文字認識中（進捗率はこのステータスのみ反映）
    RecognizingText,
}

/// 進捗通知
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OcrProgress {
    pub status: OcrStatus,
    /// 0.0〜1.0
    pub progress: f32,
}

impl OcrProgress {
    pub fn new(status: OcrStatus, progress: f32) -> Self {
        Self {
            status,
            progress: progress.clamp(0.0, 1.0),
        }
    }

    /// 整数パーセント（四捨五入）
    pub fn percent(&self) -> u8 {
        (self.progress * 100.0).round() as u8
    }
}

/// 進捗コールバック
pub type ProgressCallback<'a> = &'a (dyn Fn(OcrProgress) + Send + Sync);

#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// エンジン識別子
    fn name(&self) -> &'static str;

    /// 画像からテキストを抽出
    async fn recognize(&self, image: &UploadedImage, on_progress: ProgressCallback<'_>) -> Result<String>;

    /// リソースを解放（以降の `recognize` はエラー）
    async fn terminate(&mut self) -> Result<()>;
}
