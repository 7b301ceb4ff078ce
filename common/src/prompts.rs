//! プロンプト生成モジュール
//!
//! CLIとライブラリで共有されるプロンプト生成ロジック:
//! - DETAILED_SUFFIX: 詳細解析モードの指示文
//! - QUICK_SUFFIX: 簡易サマリーモードの指示文
//! - build_prompt: OCRテキスト + 指示文

use crate::types::AnalysisMode;

/// 詳細解析モードの指示文（栄養素の列挙 + 健康への影響）
pub const DETAILED_SUFFIX: &str = "Provide a **detailed analysis** of the product. Include sodium, carbs, calories (kcal), fats, protein, and any harmful additives. Also, suggest health implications and improvements.";

/// 簡易サマリーモードの指示文（主要栄養素の表 + 警告）
pub const QUICK_SUFFIX: &str = "Summarize the product data in a **quick, simplified format**. Include a short table with key nutrients (sodium, carbs, calories) and clear warnings if needed.";

/// プロンプト生成
///
/// # Arguments
/// * `ocr_text` - OCRで抽出したテキスト（そのまま先頭に置く）
/// * `detailed` - true: 詳細解析 / false: 簡易サマリー
///
/// # Examples
/// ```
/// use saral_common::build_prompt;
///
/// let prompt = build_prompt("Calories 200", false);
/// assert!(prompt.starts_with("Calories 200 Summarize"));
/// ```
pub fn build_prompt(ocr_text: &str, detailed: bool) -> String {
    build_prompt_for_mode(ocr_text, AnalysisMode::from_detailed(detailed))
}

/// モード指定版のプロンプト生成
pub fn build_prompt_for_mode(ocr_text: &str, mode: AnalysisMode) -> String {
    format!("{} {}", ocr_text, mode.suffix())
}
