//! 表示用テキスト整形

use crate::pipeline::{AnalysisOutcome, PipelineStatus, Submission, LABEL_OCR_DONE};
use saral_common::{AnalysisMode, AnalysisRecord};
use serde::Serialize;

/// 解析結果が空のときの案内文
pub const PLACEHOLDER: &str = "Upload an image and click 'Extract & Analyze' to get started.";

pub const NO_HISTORY: &str = "No history found";

/// 解析結果の表示テキスト（未実行なら案内文）
pub fn render_result(final_result: &str) -> &str {
    if final_result.is_empty() {
        PLACEHOLDER
    } else {
        final_result
    }
}

/// 進捗行を表示すべきか
///
/// 進捗が100%未満、またはOCR完了直後のみ表示する
pub fn should_show_progress(status: &PipelineStatus) -> bool {
    status.progress < 100 || status.progress_label == LABEL_OCR_DONE
}

/// 進捗行（ラベル + パーセント）
pub fn render_progress(status: &PipelineStatus) -> String {
    let percent = if status.progress_label == LABEL_OCR_DONE {
        100
    } else {
        status.progress
    };
    format!("{} {}%", status.progress_label, percent)
}

/// 履歴一覧（挿入順）
pub fn render_history(history: &[AnalysisRecord]) -> String {
    if history.is_empty() {
        return NO_HISTORY.to_string();
    }

    history
        .iter()
        .enumerate()
        .map(|(i, record)| {
            format!(
                "--- #{} [{}] {} ---\n{}",
                i + 1,
                record.mode,
                record.created_at,
                record.text.trim_end()
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// `analyze --json` の出力
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeReport {
    pub image: String,
    pub mode: AnalysisMode,
    pub ocr_text: String,
    pub prompt: String,
    pub result: String,
    pub succeeded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AnalyzeReport {
    pub fn new(image: &str, mode: AnalysisMode, submission: &Submission) -> Self {
        let error = match &submission.outcome {
            AnalysisOutcome::Completed(_) => None,
            AnalysisOutcome::Fallback { reason } => Some(reason.clone()),
        };
        Self {
            image: image.to_string(),
            mode,
            ocr_text: submission.ocr_text.clone(),
            prompt: submission.prompt.clone(),
            result: submission.outcome.display_text().to_string(),
            succeeded: submission.outcome.is_completed(),
            error,
        }
    }
}
