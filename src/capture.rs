//! 画像取り込みモジュール
//!
//! ファイルの宣言メディアタイプ（拡張子から判定）が `image/` で始まる場合のみ受け付け、
//! Data URLに変換して保持する。それ以外は黙って無視する。

use crate::error::{Result, SaralError};
use image::ImageFormat;
use saral_common::{encode_data_url, extract_mime_type_from_data_url};
use std::path::Path;

const UNKNOWN_MEDIA_TYPE: &str = "application/octet-stream";

/// 取り込み済み画像
#[derive(Debug, Clone, PartialEq)]
pub struct UploadedImage {
    pub file_name: String,
    pub media_type: String,
    pub data_url: String,
    /// 元ファイルのバイト数
    pub size: u64,
}

impl UploadedImage {
    pub fn from_bytes(file_name: impl Into<String>, media_type: &str, bytes: &[u8]) -> Self {
        Self {
            file_name: file_name.into(),
            media_type: media_type.to_string(),
            data_url: encode_data_url(media_type, bytes),
            size: bytes.len() as u64,
        }
    }

    /// Data URLから直接生成（メディアタイプはURLから取り出す）
    pub fn from_data_url(file_name: impl Into<String>, data_url: impl Into<String>) -> Self {
        let data_url = data_url.into();
        Self {
            file_name: file_name.into(),
            media_type: extract_mime_type_from_data_url(&data_url).to_string(),
            size: 0,
            data_url,
        }
    }
}

/// 取り込み結果
#[derive(Debug, Clone, PartialEq)]
pub enum CaptureOutcome {
    Accepted(UploadedImage),
    /// 画像以外のファイル
    Ignored { media_type: String },
}

pub fn is_image_media_type(media_type: &str) -> bool {
    media_type.starts_with("image/")
}

/// ファイル名から宣言メディアタイプを判定
pub fn declared_media_type(path: &Path) -> String {
    ImageFormat::from_path(path)
        .map(|format| format.to_mime_type().to_string())
        .unwrap_or_else(|_| UNKNOWN_MEDIA_TYPE.to_string())
}

/// 宣言メディアタイプとバイト列から取り込み
pub fn accept_bytes(
    file_name: &str,
    declared_type: &str,
    bytes: &[u8],
    max_bytes: u64,
) -> Result<CaptureOutcome> {
    if !is_image_media_type(declared_type) {
        return Ok(CaptureOutcome::Ignored {
            media_type: declared_type.to_string(),
        });
    }

    let size = bytes.len() as u64;
    if size > max_bytes {
        return Err(SaralError::ImageTooLarge { size, limit: max_bytes });
    }

    Ok(CaptureOutcome::Accepted(UploadedImage::from_bytes(
        file_name,
        declared_type,
        bytes,
    )))
}

/// 画像ファイルを非同期に読み込み
pub async fn read_image_file(path: &Path, max_bytes: u64) -> Result<CaptureOutcome> {
    if !path.is_file() {
        return Err(SaralError::FileNotFound(path.display().to_string()));
    }

    let declared_type = declared_media_type(path);
    if !is_image_media_type(&declared_type) {
        return Ok(CaptureOutcome::Ignored {
            media_type: declared_type,
        });
    }

    // 読み込み前にサイズを確認
    let size = tokio::fs::metadata(path).await?.len();
    if size > max_bytes {
        return Err(SaralError::ImageTooLarge { size, limit: max_bytes });
    }

    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| SaralError::ImageLoad(format!("{}: {}", path.display(), e)))?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    accept_bytes(&file_name, &declared_type, &bytes, max_bytes)
}
