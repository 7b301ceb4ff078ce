use thiserror::Error;

#[derive(Error, Debug)]
pub enum SaralError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("APIキーが設定されていません。環境変数 GEMINI_KEY を設定するか `saral config --set-api-key YOUR_KEY` で設定してください")]
    MissingApiKey,

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("画像読み込みエラー: {0}")]
    ImageLoad(String),

    #[error("画像サイズが上限を超えています: {size} bytes (上限 {limit} bytes)")]
    ImageTooLarge { size: u64, limit: u64 },

    #[error("OCRエラー: {0}")]
    Ocr(String),

    #[error("OCRエンジンは終了済みです")]
    EngineTerminated,

    #[error("解析エラー: {0}")]
    Analysis(String),

    #[error("APIレスポンスのパースに失敗: {0}")]
    ApiParse(String),

    #[error("解析がタイムアウトしました ({0}秒)")]
    Timeout(u64),

    #[error("別の解析が実行中です")]
    PipelineBusy,

    #[error("対話入力エラー: {0}")]
    Interaction(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] saral_common::Error),
}

impl SaralError {
    /// OCR段階の失敗か（エンジン異常・空テキスト・終了済みエンジン）
    pub fn is_ocr_failure(&self) -> bool {
        matches!(self, SaralError::Ocr(_) | SaralError::EngineTerminated)
    }

    /// 解析段階の失敗か（ネットワーク・認証・クォータ・タイムアウト）
    pub fn is_analysis_failure(&self) -> bool {
        matches!(
            self,
            SaralError::Analysis(_)
                | SaralError::ApiParse(_)
                | SaralError::Timeout(_)
                | SaralError::MissingApiKey
        )
    }
}

pub type Result<T> = std::result::Result<T, SaralError>;
