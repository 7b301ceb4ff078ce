//! エラー型定義

use thiserror::Error;

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    #[error("Data URL error: {0}")]
    DataUrl(String),
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_data_url() {
        let error = Error::DataUrl("データ部分がありません".to_string());
        assert_eq!(format!("{}", error), "Data URL error: データ部分がありません");
    }
}
