//! 共有型定義
//!
//! - AnalysisMode: 解析モード（詳細 / 簡易）
//! - AnalysisRecord: 解析結果の履歴エントリ

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::prompts::{DETAILED_SUFFIX, QUICK_SUFFIX};

/// 解析モード
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AnalysisMode {
    /// 詳細レビュー（デフォルト）
    #[default]
    Detailed,
    /// クイックサマリー
    Quick,
}

impl AnalysisMode {
    pub fn from_detailed(detailed: bool) -> Self {
        if detailed {
            AnalysisMode::Detailed
        } else {
            AnalysisMode::Quick
        }
    }

    pub fn is_detailed(&self) -> bool {
        matches!(self, AnalysisMode::Detailed)
    }

    pub fn toggled(&self) -> Self {
        Self::from_detailed(!self.is_detailed())
    }

    /// プロンプト末尾に付与する指示文
    pub fn suffix(&self) -> &'static str {
        match self {
            AnalysisMode::Detailed => DETAILED_SUFFIX,
            AnalysisMode::Quick => QUICK_SUFFIX,
        }
    }

    /// 画面表示用ラベル
    pub fn label(&self) -> &'static str {
        match self {
            AnalysisMode::Detailed => "Detailed Review",
            AnalysisMode::Quick => "Quick Summary",
        }
    }
}

impl fmt::Display for AnalysisMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// 解析履歴エントリ
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRecord {
    /// LLMの応答テキスト
    pub text: String,

    #[serde(default)]
    pub mode: AnalysisMode,

    /// 解析日時（ローカル時刻）
    #[serde(default)]
    pub created_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_from_detailed() {
        assert_eq!(AnalysisMode::from_detailed(true), AnalysisMode::Detailed);
        assert_eq!(AnalysisMode::from_detailed(false), AnalysisMode::Quick);
        assert_eq!(AnalysisMode::default(), AnalysisMode::Detailed);
    }

    #[test]
    fn test_mode_toggled() {
        assert_eq!(AnalysisMode::Detailed.toggled(), AnalysisMode::Quick);
        assert_eq!(AnalysisMode::Quick.toggled(), AnalysisMode::Detailed);
    }

    #[test]
    fn test_mode_label() {
        assert_eq!(AnalysisMode::Detailed.to_string(), "Detailed Review");
        assert_eq!(AnalysisMode::Quick.to_string(), "Quick Summary");
    }

    #[test]
    fn test_record_json_camel_case() {
        let record = AnalysisRecord {
            text: "Analysis: moderate sodium".to_string(),
            mode: AnalysisMode::Quick,
            created_at: "2026-01-18 10:00:00".to_string(),
        };
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"createdAt\""));
        assert!(json.contains("\"quick\""));
    }

    #[test]
    fn test_record_missing_fields_default() {
        let record: AnalysisRecord = serde_json::from_str(r#"{"text": "ok"}"#).unwrap();
        assert_eq!(record.text, "ok");
        assert_eq!(record.mode, AnalysisMode::Detailed);
        assert!(record.created_at.is_empty());
    }
}
