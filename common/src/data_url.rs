//! Data URL ユーティリティ
//!
//! "data:image/jpeg;base64,/9j/4AAQ..." 形式の生成と分解

use base64::{engine::general_purpose::STANDARD, Engine};

use crate::error::{Error, Result};

/// バイト列からData URLを生成
pub fn encode_data_url(mime_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime_type, STANDARD.encode(bytes))
}

/// Data URLからBase64データ部分を抽出
///
/// # Arguments
/// * `data_url` - "data:image/jpeg;base64,/9j/4AAQ..." 形式のData URL
///
/// # Returns
/// Base64エンコードされたデータ部分、または抽出失敗時はNone
pub fn extract_base64_from_data_url(data_url: &str) -> Option<&str> {
    data_url.split(',').nth(1)
}

/// Data URLからMIMEタイプを抽出
///
/// 抽出失敗時は"image/jpeg"をデフォルトとして返す
pub fn extract_mime_type_from_data_url(data_url: &str) -> &str {
    data_url
        .split(':')
        .nth(1)
        .and_then(|s| s.split(';').next())
        .filter(|s| !s.is_empty())
        .unwrap_or("image/jpeg")
}

/// Data URLをデコードしてバイト列に戻す
pub fn decode_data_url(data_url: &str) -> Result<Vec<u8>> {
    if !data_url.starts_with("data:") {
        return Err(Error::DataUrl("data: スキームではありません".into()));
    }
    let payload = extract_base64_from_data_url(data_url)
        .ok_or_else(|| Error::DataUrl("データ部分がありません".into()))?;
    STANDARD
        .decode(payload)
        .map_err(|e| Error::DataUrl(format!("Base64デコード失敗: {}", e)))
}
