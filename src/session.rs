//! 対話セッション
//!
//! 画像選択 → モード切替 → 抽出 & 解析 → 履歴表示 をメニューで繰り返す。
//! セッション終了時にOCRエンジンを解放する。

use crate::capture::CaptureOutcome;
use crate::error::{Result, SaralError};
use crate::llm::CompletionBackend;
use crate::ocr::OcrEngine;
use crate::pipeline::{AnalysisOutcome, Pipeline};
use crate::progress::extract_with_progress;
use crate::report;
use dialoguer::{Input, Select};
use saral_common::AnalysisMode;
use std::path::{Path, PathBuf};

/// メニュー操作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionAction {
    LoadImage,
    SelectNewImage,
    ToggleMode,
    Extract,
    ShowHistory,
    Quit,
}

/// 現在の状態に応じたメニュー項目
///
/// 画像未選択の間は「抽出 & 解析」「新しい画像を選ぶ」を出さない
pub fn menu_items(has_image: bool, mode: AnalysisMode, history_len: usize) -> Vec<(SessionAction, String)> {
    let mut items = Vec::new();
    if has_image {
        items.push((SessionAction::Extract, "Extract & Analyze".to_string()));
        items.push((SessionAction::SelectNewImage, "Select New Image".to_string()));
    } else {
        items.push((SessionAction::LoadImage, "画像を読み込む".to_string()));
    }
    items.push((
        SessionAction::ToggleMode,
        format!("モード切替（現在: {}）", mode),
    ));
    items.push((
        SessionAction::ShowHistory,
        format!("Show History ({}件)", history_len),
    ));
    items.push((SessionAction::Quit, "終了".to_string()));
    items
}

fn prompt_action(items: &[(SessionAction, String)]) -> Result<SessionAction> {
    let labels: Vec<&str> = items.iter().map(|(_, label)| label.as_str()).collect();
    let selected = tokio::task::block_in_place(|| {
        Select::new()
            .with_prompt("操作を選択")
            .items(&labels[..])
            .default(0)
            .interact()
    })
    .map_err(|e| SaralError::Interaction(e.to_string()))?;

    Ok(items[selected].0)
}

fn prompt_path() -> Result<PathBuf> {
    let input: String = tokio::task::block_in_place(|| {
        Input::<String>::new()
            .with_prompt("画像ファイルのパス")
            .interact_text()
    })
    .map_err(|e| SaralError::Interaction(e.to_string()))?;

    Ok(PathBuf::from(input.trim()))
}

async fn load_image<E: OcrEngine, B: CompletionBackend>(pipeline: &Pipeline<E, B>, path: &Path) {
    match pipeline.load_file(path).await {
        Ok(CaptureOutcome::Accepted(image)) => {
            println!("✔ 画像を読み込みました: {} ({} bytes)\n", image.file_name, image.size);
        }
        // 画像以外は何もしない
        Ok(CaptureOutcome::Ignored { .. }) => {}
        Err(e) => println!("⚠ {}\n", e),
    }
}

/// 対話セッションを実行
pub async fn run_interactive_session<E: OcrEngine, B: CompletionBackend>(
    pipeline: Pipeline<E, B>,
    initial_image: Option<&Path>,
) -> Result<()> {
    println!("🥗 SARAL - Nutrition Analyzer\n");

    if let Some(path) = initial_image {
        load_image(&pipeline, path).await;
    }

    let result = session_loop(&pipeline).await;

    // エラー終了でもエンジンは解放する
    pipeline.shutdown().await?;
    result
}

async fn session_loop<E: OcrEngine, B: CompletionBackend>(pipeline: &Pipeline<E, B>) -> Result<()> {
    loop {
        let items = menu_items(pipeline.has_image(), pipeline.mode(), pipeline.history_len());
        match prompt_action(&items)? {
            SessionAction::LoadImage => {
                let path = prompt_path()?;
                load_image(pipeline, &path).await;
            }
            SessionAction::SelectNewImage => {
                pipeline.select_new_image()?;
            }
            SessionAction::ToggleMode => {
                let mode = pipeline.toggle_mode();
                println!("✔ {}\n", mode);
            }
            SessionAction::Extract => match extract_with_progress(pipeline).await {
                Ok(Some(submission)) => {
                    if let AnalysisOutcome::Fallback { reason } = &submission.outcome {
                        println!("⚠ {}", reason);
                    }
                    println!("{}\n", submission.outcome.display_text());
                }
                Ok(None) => println!("{}\n", report::render_result("")),
                Err(e) => println!("⚠ {}: {}\n", pipeline.status().progress_label, e),
            },
            SessionAction::ShowHistory => {
                println!("📜 History\n{}\n", report::render_history(&pipeline.history()));
            }
            SessionAction::Quit => return Ok(()),
        }
    }
}
