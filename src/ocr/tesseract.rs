//! Tesseract CLI連携
//!
//! `tesseract stdin stdout -l <lang>` を子プロセスとして起動し、画像を標準入力へ流す。
//! CLIは途中経過を出さないため、進捗は「入力完了=0%」「認識完了=100%」の2点のみ通知する。

use super::{OcrEngine, OcrProgress, OcrStatus, ProgressCallback};
use crate::capture::UploadedImage;
use crate::error::{Result, SaralError};
use async_trait::async_trait;
use saral_common::decode_data_url;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct TesseractOptions {
    /// 実行ファイルのパス
    pub binary: String,
    /// ページ分割モード（--psm）
    pub page_segmentation_mode: Option<u8>,
}

impl Default for TesseractOptions {
    fn default() -> Self {
        Self {
            binary: "tesseract".into(),
            page_segmentation_mode: None,
        }
    }
}

#[derive(Debug)]
pub struct TesseractEngine {
    language: String,
    options: TesseractOptions,
    terminated: bool,
}

impl TesseractEngine {
    /// エンジン初期化（実行ファイルと言語データの存在を1度だけ確認）
    pub async fn init(language: &str, options: TesseractOptions) -> Result<Self> {
        let output = Command::new(&options.binary)
            .arg("--list-langs")
            .output()
            .await
            .map_err(|e| SaralError::Ocr(format!("{} 実行エラー: {}", options.binary, e)))?;

        if !output.status.success() {
            return Err(SaralError::Ocr(format!(
                "{} --list-langs failed (code {:?})",
                options.binary,
                output.status.code()
            )));
        }

        // 古いバージョンは一覧を標準エラーに出す
        let listing = format!(
            "{}{}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
        let available = parse_language_list(&listing);

        for lang in language.split('+') {
            if !available.iter().any(|a| a == lang) {
                return Err(SaralError::Ocr(format!(
                    "言語データがありません: {} (利用可能: {})",
                    lang,
                    available.join(", ")
                )));
            }
        }

        info!(language, binary = %options.binary, "OCR engine initialized");

        Ok(Self {
            language: language.to_string(),
            options,
            terminated: false,
        })
    }

    fn build_args(&self) -> Vec<String> {
        let mut args = vec![
            "stdin".to_string(),
            "stdout".to_string(),
            "-l".to_string(),
            self.language.clone(),
        ];
        if let Some(psm) = self.options.page_segmentation_mode {
            args.push("--psm".to_string());
            args.push(psm.to_string());
        }
        args
    }
}

#[async_trait]
impl OcrEngine for TesseractEngine {
    fn name(&self) -> &'static str {
        "tesseract"
    }

    async fn recognize(&self, image: &UploadedImage, on_progress: ProgressCallback<'_>) -> Result<String> {
        if self.terminated {
            return Err(SaralError::EngineTerminated);
        }

        on_progress(OcrProgress::new(OcrStatus::LoadingImage, 0.0));
        let bytes = decode_data_url(&image.data_url)
            .map_err(|e| SaralError::Ocr(format!("画像データが不正: {}", e)))?;

        let mut child = Command::new(&self.options.binary)
            .args(self.build_args())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| SaralError::Ocr(format!("{} 起動エラー: {}", self.options.binary, e)))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| SaralError::Ocr("標準入力を取得できません".into()))?;
        let writer = tokio::spawn(async move {
            stdin.write_all(&bytes).await?;
            stdin.shutdown().await
        });

        on_progress(OcrProgress::new(OcrStatus::LoadingImage, 1.0));
        on_progress(OcrProgress::new(OcrStatus::RecognizingText, 0.0));

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| SaralError::Ocr(format!("{} 実行エラー: {}", self.options.binary, e)))?;

        if let Ok(Err(e)) = writer.await {
            debug!(error = %e, "stdin write ended early");
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SaralError::Ocr(format!(
                "{} failed (code {:?}): {}",
                self.options.binary,
                output.status.code(),
                stderr.trim()
            )));
        }

        on_progress(OcrProgress::new(OcrStatus::RecognizingText, 1.0));

        let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
        debug!(chars = text.len(), file = %image.file_name, "recognition finished");
        Ok(text)
    }

    async fn terminate(&mut self) -> Result<()> {
        if !self.terminated {
            self.terminated = true;
            info!("OCR engine terminated");
        }
        Ok(())
    }
}

/// `--list-langs` の出力から言語コードを取り出す
fn parse_language_list(listing: &str) -> Vec<String> {
    listing
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with("List of available languages"))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine(psm: Option<u8>) -> TesseractEngine {
        TesseractEngine {
            language: "eng".into(),
            options: TesseractOptions {
                binary: "tesseract".into(),
                page_segmentation_mode: psm,
            },
            terminated: false,
        }
    }

    #[test]
    fn test_parse_language_list() {
        let listing = "List of available languages in \"/usr/share/tesseract-ocr/5/tessdata/\" (3):\neng\nosd\njpn\n";
        assert_eq!(parse_language_list(listing), vec!["eng", "osd", "jpn"]);
    }

    #[test]
    fn test_parse_language_list_empty() {
        assert!(parse_language_list("List of available languages (0):\n").is_empty());
    }

    #[test]
    fn test_build_args() {
        assert_eq!(engine(None).build_args(), vec!["stdin", "stdout", "-l", "eng"]);
        assert_eq!(
            engine(Some(6)).build_args(),
            vec!["stdin", "stdout", "-l", "eng", "--psm", "6"]
        );
    }

    #[tokio::test]
    async fn test_terminated_engine_rejects_recognize() {
        let mut engine = engine(None);
        engine.terminate().await.unwrap();

        let image = UploadedImage::from_bytes("a.png", "image/png", b"png");
        let result = engine.recognize(&image, &|_| {}).await;
        assert!(matches!(result, Err(SaralError::EngineTerminated)));
    }

    #[tokio::test]
    async fn test_init_with_missing_binary() {
        let options = TesseractOptions {
            binary: "/nonexistent/tesseract-binary".into(),
            page_segmentation_mode: None,
        };
        let result = TesseractEngine::init("eng", options).await;
        assert!(matches!(result, Err(SaralError::Ocr(_))));
    }
}
