//! エラーケーステスト
//!
//! 各種エラー条件でのエラーハンドリングを検証

use saral::capture::{self, CaptureOutcome};
use saral::error::SaralError;
use std::path::Path;
use tempfile::tempdir;

/// 存在しないファイルを読み込んだ場合
#[tokio::test]
async fn test_read_nonexistent_file() {
    let result = capture::read_image_file(Path::new("/nonexistent/path/12345.jpg"), 1024).await;
    assert!(matches!(result, Err(SaralError::FileNotFound(_))));
}

/// ディレクトリを指定した場合
#[tokio::test]
async fn test_read_directory() {
    let dir = tempdir().expect("Failed to create temp dir");
    let result = capture::read_image_file(dir.path(), 1024).await;
    assert!(matches!(result, Err(SaralError::FileNotFound(_))));
}

/// 画像以外のファイルはエラーではなく無視
#[tokio::test]
async fn test_read_non_image_ignored() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("data.json");
    std::fs::write(&path, "{}").unwrap();

    let result = capture::read_image_file(&path, 1024).await.unwrap();
    assert!(matches!(result, CaptureOutcome::Ignored { .. }));
}

/// SaralErrorのDisplay実装確認
#[test]
fn test_error_display() {
    let errors = vec![
        SaralError::Config("テスト設定エラー".to_string()),
        SaralError::FileNotFound("label.jpg".to_string()),
        SaralError::ImageLoad("読み込み失敗".to_string()),
        SaralError::ImageTooLarge { size: 20, limit: 10 },
        SaralError::Ocr("エンジン異常".to_string()),
        SaralError::EngineTerminated,
        SaralError::Analysis("API呼び出し失敗".to_string()),
        SaralError::ApiParse("不正なJSON".to_string()),
        SaralError::Timeout(120),
        SaralError::PipelineBusy,
        SaralError::Interaction("入力中断".to_string()),
    ];

    for err in errors {
        let display = format!("{}", err);
        assert!(!display.is_empty(), "エラーメッセージが空: {:?}", err);
    }
}

/// MissingApiKeyエラーのメッセージ確認
#[test]
fn test_missing_api_key_message() {
    let err = SaralError::MissingApiKey;
    let display = format!("{}", err);

    assert!(display.contains("APIキー"));
    assert!(display.contains("GEMINI_KEY"));
    assert!(display.contains("saral config"));
}

/// OCR失敗と解析失敗の分類
#[test]
fn test_failure_kinds() {
    assert!(SaralError::Ocr("x".into()).is_ocr_failure());
    assert!(SaralError::EngineTerminated.is_ocr_failure());
    assert!(!SaralError::Ocr("x".into()).is_analysis_failure());

    assert!(SaralError::Analysis("x".into()).is_analysis_failure());
    assert!(SaralError::Timeout(1).is_analysis_failure());
    assert!(SaralError::ApiParse("x".into()).is_analysis_failure());
    assert!(!SaralError::PipelineBusy.is_analysis_failure());
    assert!(!SaralError::PipelineBusy.is_ocr_failure());
}

/// IOエラーからの変換
#[test]
fn test_io_error_conversion() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let err: SaralError = io_err.into();

    assert!(matches!(err, SaralError::Io(_)));
    let display = format!("{}", err);
    assert!(display.contains("IO"));
}

/// JSONエラーからの変換
#[test]
fn test_json_error_conversion() {
    let json_err = serde_json::from_str::<serde_json::Value>("{ invalid }").unwrap_err();
    let err: SaralError = json_err.into();

    assert!(matches!(err, SaralError::JsonParse(_)));
}

/// common::Errorからの変換（透過的エラー）
#[test]
fn test_common_error_conversion() {
    let common_err = saral_common::Error::DataUrl("データ部分がありません".to_string());
    let err: SaralError = common_err.into();

    assert!(matches!(err, SaralError::Common(_)));
    assert_eq!(format!("{}", err), "Data URL error: データ部分がありません");
}
