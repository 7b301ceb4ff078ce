//! SARAL Common Library
//!
//! CLIとパイプラインで共有される型とユーティリティ

pub mod data_url;
pub mod error;
pub mod prompts;
pub mod types;

pub use data_url::{
    decode_data_url, encode_data_url, extract_base64_from_data_url,
    extract_mime_type_from_data_url,
};
pub use error::{Error, Result};
pub use prompts::{build_prompt, build_prompt_for_mode, DETAILED_SUFFIX, QUICK_SUFFIX};
pub use types::{AnalysisMode, AnalysisRecord};
