//! 端末用プログレス表示
//!
//! パイプラインの状態チャンネルを購読してプログレスバーを更新する。

use crate::error::Result;
use crate::llm::CompletionBackend;
use crate::ocr::OcrEngine;
use crate::pipeline::{Pipeline, PipelineStatus, Submission};
use crate::report::{render_progress, should_show_progress};
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::watch;

const ANALYZING_MESSAGE: &str = "Analyzing your data...";

fn progress_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner} {msg:<34} [{bar:30}]")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ")
}

/// バーに出すメッセージ（解析中 > 進捗行 > ラベルのみ）
fn bar_message(status: &PipelineStatus) -> String {
    if status.is_loading {
        ANALYZING_MESSAGE.to_string()
    } else if should_show_progress(status) {
        render_progress(status)
    } else {
        status.progress_label.clone()
    }
}

fn apply_status(bar: &ProgressBar, status: &PipelineStatus) {
    bar.set_position(u64::from(status.progress));
    bar.set_message(bar_message(status));
}

async fn follow(bar: ProgressBar, mut rx: watch::Receiver<PipelineStatus>) {
    while rx.changed().await.is_ok() {
        let status = rx.borrow_and_update().clone();
        apply_status(&bar, &status);
    }
}

/// プログレスバー付きで抽出 & 解析を実行
pub async fn extract_with_progress<E: OcrEngine, B: CompletionBackend>(
    pipeline: &Pipeline<E, B>,
) -> Result<Option<Submission>> {
    let bar = ProgressBar::new(100);
    bar.set_style(progress_style());
    bar.enable_steady_tick(std::time::Duration::from_millis(120));

    let watcher = tokio::spawn(follow(bar.clone(), pipeline.subscribe()));
    let result = pipeline.extract_and_analyze().await;
    watcher.abort();

    apply_status(&bar, &pipeline.status());
    bar.finish_and_clear();
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{PipelineStage, LABEL_IDLE, LABEL_OCR_DONE, LABEL_STARTING_OCR};

    fn status(progress: u8, label: &str, is_loading: bool) -> PipelineStatus {
        PipelineStatus {
            stage: PipelineStage::OcrRunning,
            progress,
            progress_label: label.to_string(),
            is_loading,
        }
    }

    #[test]
    fn test_bar_message_during_ocr() {
        assert_eq!(bar_message(&status(0, LABEL_STARTING_OCR, false)), "Starting OCR... 0%");
        assert_eq!(
            bar_message(&status(100, LABEL_OCR_DONE, false)),
            "Image Recognition Done 100%"
        );
    }

    #[test]
    fn test_bar_message_while_analyzing() {
        assert_eq!(bar_message(&status(100, LABEL_OCR_DONE, true)), ANALYZING_MESSAGE);
    }

    #[test]
    fn test_bar_message_settled() {
        // 100%で完了ラベル以外なら進捗行は出さない
        assert_eq!(bar_message(&status(100, LABEL_IDLE, false)), LABEL_IDLE);
    }
}
