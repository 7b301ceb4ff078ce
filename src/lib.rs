//! SARAL - 栄養成分表示ラベル解析
//!
//! 取り込み → OCR → LLM解析 → 履歴 のパイプラインと、その端末フロントエンド

pub mod capture;
pub mod cli;
pub mod config;
pub mod error;
pub mod llm;
pub mod logging;
pub mod ocr;
pub mod pipeline;
pub mod progress;
pub mod report;
pub mod session;

pub use pipeline::{AnalysisOutcome, Pipeline, PipelineStage, PipelineStatus, Submission};
