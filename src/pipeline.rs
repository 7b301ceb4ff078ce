//! 解析パイプライン
//!
//! 取り込み → OCR → LLM解析 → 履歴追加 を1件ずつ直列に実行する。
//!
//! - セッション状態（画像・OCR結果・解析結果・履歴・モード）はこの構造体が所有する
//! - 同時実行は1件のみ。実行中の新規投入・画像変更は `PipelineBusy` で拒否する
//! - 進捗・ラベル・ローディングフラグは `watch` チャンネルで表示層へ配信する

use crate::capture::{self, CaptureOutcome, UploadedImage};
use crate::error::{Result, SaralError};
use crate::llm::CompletionBackend;
use crate::ocr::{OcrEngine, OcrProgress, OcrStatus};
use saral_common::{build_prompt_for_mode, AnalysisMode, AnalysisRecord};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::{watch, Semaphore, SemaphorePermit};
use tracing::{debug, error, info, warn};

/// 解析失敗時に表示する固定メッセージ
pub const FALLBACK_ANALYSIS: &str = "Unable to fetch analysis.";

pub const LABEL_IDLE: &str = "idle";
pub const LABEL_STARTING_OCR: &str = "Starting OCR...";
pub const LABEL_OCR_DONE: &str = "Image Recognition Done";
pub const LABEL_OCR_ERROR: &str = "Error occurred during OCR";

const DEFAULT_MAX_IMAGE_BYTES: u64 = 10 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Idle,
    Acquiring,
    OcrRunning,
    OcrDone,
    AnalysisRunning,
    AnalysisDone,
    Error,
}

/// 表示層が参照するフラグ
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineStatus {
    pub stage: PipelineStage,
    /// 0〜100
    pub progress: u8,
    pub progress_label: String,
    pub is_loading: bool,
}

impl Default for PipelineStatus {
    fn default() -> Self {
        Self {
            stage: PipelineStage::Idle,
            progress: 100,
            progress_label: LABEL_IDLE.to_string(),
            is_loading: false,
        }
    }
}

/// 解析段階の結果
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisOutcome {
    Completed(AnalysisRecord),
    /// 解析失敗（固定メッセージを表示、履歴は変更しない）
    Fallback { reason: String },
}

impl AnalysisOutcome {
    pub fn display_text(&self) -> &str {
        match self {
            AnalysisOutcome::Completed(record) => &record.text,
            AnalysisOutcome::Fallback { .. } => FALLBACK_ANALYSIS,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, AnalysisOutcome::Completed(_))
    }
}

/// 1回の投入結果
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub ocr_text: String,
    pub prompt: String,
    pub outcome: AnalysisOutcome,
}

#[derive(Debug, Default)]
struct SessionState {
    image: Option<UploadedImage>,
    ocr_result: String,
    final_result: String,
    history: Vec<AnalysisRecord>,
    mode: AnalysisMode,
}

pub struct Pipeline<E, B> {
    engine: E,
    backend: B,
    state: Mutex<SessionState>,
    status: watch::Sender<PipelineStatus>,
    slot: Semaphore,
    analysis_timeout: Option<Duration>,
    max_image_bytes: u64,
}

impl<E: OcrEngine, B: CompletionBackend> Pipeline<E, B> {
    pub fn new(engine: E, backend: B) -> Self {
        let (status, _) = watch::channel(PipelineStatus::default());
        Self {
            engine,
            backend,
            state: Mutex::new(SessionState::default()),
            status,
            slot: Semaphore::new(1),
            analysis_timeout: None,
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
        }
    }

    pub fn with_mode(self, mode: AnalysisMode) -> Self {
        self.state().mode = mode;
        self
    }

    pub fn with_analysis_timeout(mut self, timeout: Duration) -> Self {
        self.analysis_timeout = Some(timeout);
        self
    }

    pub fn with_max_image_bytes(mut self, max_image_bytes: u64) -> Self {
        self.max_image_bytes = max_image_bytes;
        self
    }

    // =============================================
    // 画像取り込み
    // =============================================

    /// 画像ファイルを読み込んで現在の画像を置き換える（画像以外は無視）
    pub async fn load_file(&self, path: &Path) -> Result<CaptureOutcome> {
        let _permit = self.acquire()?;
        self.publish(|s| s.stage = PipelineStage::Acquiring);

        let result = capture::read_image_file(path, self.max_image_bytes).await;
        match &result {
            Ok(CaptureOutcome::Accepted(image)) => {
                info!(file = %image.file_name, bytes = image.size, "image loaded");
                self.state().image = Some(image.clone());
            }
            Ok(CaptureOutcome::Ignored { media_type }) => {
                debug!(path = %path.display(), media_type, "not an image, ignored");
            }
            Err(e) => warn!(path = %path.display(), error = %e, "image load failed"),
        }

        self.publish(|s| s.stage = PipelineStage::Idle);
        result
    }

    /// デコード済み画像を現在の画像として設定
    pub fn accept_image(&self, image: UploadedImage) -> Result<()> {
        let _permit = self.acquire()?;
        self.state().image = Some(image);
        Ok(())
    }

    /// 現在の画像を破棄（新しい画像を選ぶ）
    pub fn select_new_image(&self) -> Result<()> {
        let _permit = self.acquire()?;
        self.state().image = None;
        Ok(())
    }

    // =============================================
    // モード
    // =============================================

    pub fn mode(&self) -> AnalysisMode {
        self.state().mode
    }

    pub fn set_mode(&self, mode: AnalysisMode) {
        self.state().mode = mode;
    }

    pub fn toggle_mode(&self) -> AnalysisMode {
        let mut state = self.state();
        state.mode = state.mode.toggled();
        state.mode
    }

    // =============================================
    // 抽出 & 解析
    // =============================================

    /// OCR → 解析を実行
    ///
    /// # Returns
    /// * `Ok(None)` - 画像未設定（エンジンは呼ばない）
    /// * `Ok(Some(_))` - 解析まで到達（失敗時は `AnalysisOutcome::Fallback`）
    /// * `Err(PipelineBusy)` - 別の投入が実行中
    /// * `Err(Ocr)` - OCR失敗（解析は行わない）
    pub async fn extract_and_analyze(&self) -> Result<Option<Submission>> {
        let _permit = self.acquire()?;

        let (image, mode) = {
            let mut state = self.state();
            state.ocr_result.clear();
            state.final_result.clear();
            (state.image.clone(), state.mode)
        };

        let Some(image) = image else {
            debug!("no image selected, skipping extraction");
            return Ok(None);
        };

        // 途中で中断（future破棄）されても許可より先に状態を戻す
        let _settle = SettleOnDrop(&self.status);

        self.publish(|s| {
            s.stage = PipelineStage::OcrRunning;
            s.progress = 0;
            s.progress_label = LABEL_STARTING_OCR.to_string();
            s.is_loading = false;
        });
        info!(file = %image.file_name, engine = self.engine.name(), "OCR started");

        let ocr_text = match self.run_ocr(&image).await {
            Ok(text) => text,
            Err(e) => {
                error!(error = %e, "OCR error");
                self.publish(|s| {
                    s.stage = PipelineStage::Error;
                    s.progress_label = LABEL_OCR_ERROR.to_string();
                });
                return Err(e);
            }
        };

        self.state().ocr_result = ocr_text.clone();
        self.publish(|s| {
            s.stage = PipelineStage::OcrDone;
            s.progress = 100;
            s.progress_label = LABEL_OCR_DONE.to_string();
        });
        info!(chars = ocr_text.len(), "OCR done");

        self.publish(|s| {
            s.stage = PipelineStage::AnalysisRunning;
            s.is_loading = true;
        });

        let prompt = build_prompt_for_mode(&ocr_text, mode);
        let outcome = match self.run_analysis(&prompt).await {
            Ok(text) => {
                let record = AnalysisRecord {
                    text: text.clone(),
                    mode,
                    created_at: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
                };
                {
                    let mut state = self.state();
                    state.final_result = text;
                    state.history.push(record.clone());
                }
                self.publish(|s| s.stage = PipelineStage::AnalysisDone);
                info!(%mode, "analysis done");
                AnalysisOutcome::Completed(record)
            }
            Err(e) => {
                error!(error = %e, "Analysis error");
                self.state().final_result = FALLBACK_ANALYSIS.to_string();
                self.publish(|s| s.stage = PipelineStage::Error);
                AnalysisOutcome::Fallback {
                    reason: e.to_string(),
                }
            }
        };

        Ok(Some(Submission {
            ocr_text,
            prompt,
            outcome,
        }))
    }

    async fn run_ocr(&self, image: &UploadedImage) -> Result<String> {
        let on_progress = |p: OcrProgress| {
            if p.status == OcrStatus::RecognizingText {
                let percent = p.percent();
                self.publish(|s| s.progress = percent);
            }
        };

        let text = self
            .engine
            .recognize(image, &on_progress)
            .await
            .map_err(|e| if e.is_ocr_failure() { e } else { SaralError::Ocr(e.to_string()) })?;

        if text.trim().is_empty() {
            return Err(SaralError::Ocr("テキストが検出されませんでした".into()));
        }
        Ok(text)
    }

    async fn run_analysis(&self, prompt: &str) -> Result<String> {
        let text = match self.analysis_timeout {
            Some(limit) => tokio::time::timeout(limit, self.backend.complete(prompt))
                .await
                .map_err(|_| SaralError::Timeout(limit.as_secs()))??,
            None => self.backend.complete(prompt).await?,
        };

        if text.trim().is_empty() {
            return Err(SaralError::Analysis("Empty response".into()));
        }
        Ok(text)
    }

    // =============================================
    // 参照（表示層向け）
    // =============================================

    pub fn history(&self) -> Vec<AnalysisRecord> {
        self.state().history.clone()
    }

    pub fn history_len(&self) -> usize {
        self.state().history.len()
    }

    /// 直近の表示結果（未実行なら空文字）
    pub fn final_result(&self) -> String {
        self.state().final_result.clone()
    }

    /// 直近のOCR結果（未実行なら空文字）
    pub fn ocr_result(&self) -> String {
        self.state().ocr_result.clone()
    }

    pub fn current_image(&self) -> Option<UploadedImage> {
        self.state().image.clone()
    }

    pub fn has_image(&self) -> bool {
        self.state().image.is_some()
    }

    pub fn status(&self) -> PipelineStatus {
        self.status.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<PipelineStatus> {
        self.status.subscribe()
    }

    pub fn is_busy(&self) -> bool {
        self.slot.available_permits() == 0
    }

    /// セッション終了（OCRエンジンを解放）
    pub async fn shutdown(mut self) -> Result<()> {
        self.engine.terminate().await
    }

    // =============================================
    // 内部
    // =============================================

    fn acquire(&self) -> Result<SemaphorePermit<'_>> {
        self.slot.try_acquire().map_err(|_| SaralError::PipelineBusy)
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn publish(&self, update: impl FnOnce(&mut PipelineStatus)) {
        self.status.send_modify(update);
    }

}

/// 抽出終了時（成功・失敗・中断）に状態を待機へ戻す
struct SettleOnDrop<'a>(&'a watch::Sender<PipelineStatus>);

impl Drop for SettleOnDrop<'_> {
    fn drop(&mut self) {
        self.0.send_modify(|s| {
            s.stage = PipelineStage::Idle;
            s.is_loading = false;
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct FixedEngine(&'static str);

    #[async_trait]
    impl OcrEngine for FixedEngine {
        fn name(&self) -> &'static str {
            "fixed"
        }

        async fn recognize(
            &self,
            _image: &UploadedImage,
            on_progress: crate::ocr::ProgressCallback<'_>,
        ) -> Result<String> {
            on_progress(OcrProgress::new(OcrStatus::LoadingImage, 0.5));
            on_progress(OcrProgress::new(OcrStatus::RecognizingText, 0.37));
            Ok(self.0.to_string())
        }

        async fn terminate(&mut self) -> Result<()> {
            Ok(())
        }
    }

    struct EchoBackend;

    #[async_trait]
    impl CompletionBackend for EchoBackend {
        async fn complete(&self, prompt: &str) -> Result<String> {
            Ok(format!("echo: {}", prompt.len()))
        }
    }

    fn pipeline(text: &'static str) -> Pipeline<FixedEngine, EchoBackend> {
        Pipeline::new(FixedEngine(text), EchoBackend)
    }

    #[test]
    fn test_initial_status() {
        let p = pipeline("x");
        let status = p.status();
        assert_eq!(status.stage, PipelineStage::Idle);
        assert_eq!(status.progress, 100);
        assert_eq!(status.progress_label, LABEL_IDLE);
        assert!(!status.is_loading);
        assert_eq!(p.mode(), AnalysisMode::Detailed);
    }

    #[test]
    fn test_toggle_mode() {
        let p = pipeline("x");
        assert_eq!(p.toggle_mode(), AnalysisMode::Quick);
        assert_eq!(p.toggle_mode(), AnalysisMode::Detailed);
        p.set_mode(AnalysisMode::Quick);
        assert_eq!(p.mode(), AnalysisMode::Quick);
    }

    #[tokio::test]
    async fn test_settled_status_after_success() {
        let p = pipeline("Calories 200");
        p.accept_image(UploadedImage::from_bytes("a.png", "image/png", b"x")).unwrap();

        let submission = p.extract_and_analyze().await.unwrap().unwrap();
        assert!(submission.outcome.is_completed());

        let status = p.status();
        assert_eq!(status.stage, PipelineStage::Idle);
        assert_eq!(status.progress, 100);
        assert_eq!(status.progress_label, LABEL_OCR_DONE);
        assert!(!status.is_loading);
        assert!(!p.is_busy());
    }

    #[tokio::test]
    async fn test_blank_ocr_text_is_ocr_failure() {
        let p = pipeline("  \n\u{c}");
        p.accept_image(UploadedImage::from_bytes("a.png", "image/png", b"x")).unwrap();

        let err = p.extract_and_analyze().await.unwrap_err();
        assert!(err.is_ocr_failure());
        assert_eq!(p.status().progress_label, LABEL_OCR_ERROR);
        // RecognizingText の進捗だけが反映される
        assert_eq!(p.status().progress, 37);
        assert_eq!(p.history_len(), 0);
    }

    #[test]
    fn test_outcome_display_text() {
        let fallback = AnalysisOutcome::Fallback {
            reason: "network".into(),
        };
        assert_eq!(fallback.display_text(), FALLBACK_ANALYSIS);
        assert!(!fallback.is_completed());
    }
}
