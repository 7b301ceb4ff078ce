use clap::Parser;
use saral::{cli, config, error, llm, logging, ocr, progress, report, session};
use saral::Pipeline;
use cli::{Cli, Commands};
use config::Config;
use error::{Result, SaralError};
use llm::GeminiClient;
use ocr::{TesseractEngine, TesseractOptions};
use saral::capture::CaptureOutcome;
use saral_common::AnalysisMode;
use std::path::Path;

type AppPipeline = Pipeline<TesseractEngine, GeminiClient>;

/// APIクライアントとOCRエンジンを1度だけ用意してパイプラインを組み立てる
async fn build_pipeline(config: &Config, lang: Option<&str>, mode: AnalysisMode) -> Result<AppPipeline> {
    let backend = GeminiClient::from_config(config)?;

    let options = TesseractOptions {
        binary: config.tesseract_path.clone(),
        ..Default::default()
    };
    let engine = TesseractEngine::init(lang.unwrap_or(&config.ocr_language), options).await?;

    Ok(Pipeline::new(engine, backend)
        .with_mode(mode)
        .with_analysis_timeout(config.timeout())
        .with_max_image_bytes(config.max_image_bytes))
}

async fn analyze_one(pipeline: &AppPipeline, image: &Path, json: bool) -> Result<()> {
    if !json {
        println!("[1/3] 画像を読み込み中...");
    }
    match pipeline.load_file(image).await? {
        CaptureOutcome::Accepted(img) => {
            if !json {
                println!("✔ {} ({} bytes)\n", img.file_name, img.size);
            }
        }
        CaptureOutcome::Ignored { media_type } => {
            return Err(SaralError::ImageLoad(format!(
                "画像ファイルではありません: {} ({})",
                image.display(),
                media_type
            )));
        }
    }

    if !json {
        println!("[2/3] OCR・解析中... ({})", pipeline.mode());
    }
    let submission = progress::extract_with_progress(pipeline)
        .await?
        .ok_or_else(|| SaralError::ImageLoad("画像が選択されていません".into()))?;

    if json {
        let out = report::AnalyzeReport::new(&image.display().to_string(), pipeline.mode(), &submission);
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("✔ {}\n", pipeline.status().progress_label);
    println!("[3/3] 解析結果\n");
    println!("{}", submission.outcome.display_text());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);
    let config = Config::load()?;

    match cli.command {
        Commands::Analyze { image, quick, detailed, json } => {
            let mode = if quick {
                AnalysisMode::Quick
            } else if detailed {
                AnalysisMode::Detailed
            } else {
                AnalysisMode::from_detailed(config.detailed_by_default)
            };

            let pipeline = build_pipeline(&config, cli.lang.as_deref(), mode).await?;
            let result = analyze_one(&pipeline, &image, json).await;
            pipeline.shutdown().await?;
            result?;
        }

        Commands::Session { image } => {
            let mode = AnalysisMode::from_detailed(config.detailed_by_default);
            let pipeline = build_pipeline(&config, cli.lang.as_deref(), mode).await?;
            session::run_interactive_session(pipeline, image.as_deref()).await?;
        }

        Commands::Config { set_api_key, show } => {
            let mut config = config;

            if let Some(key) = set_api_key {
                config.set_api_key(key)?;
                println!("✔ APIキーを設定しました");
            }

            if show {
                println!("設定:");
                println!("  パス: {}", Config::config_path()?.display());
                println!("  モデル: {}", config.model);
                println!("  タイムアウト: {}秒", config.timeout_seconds);
                println!("  OCR言語: {}", config.ocr_language);
                println!("  tesseract: {}", config.tesseract_path);
                println!("  最大画像サイズ: {} bytes", config.max_image_bytes);
                println!(
                    "  既定モード: {}",
                    AnalysisMode::from_detailed(config.detailed_by_default)
                );
                println!(
                    "  APIキー: {}",
                    if config.get_api_key().is_ok() { "設定済み" } else { "未設定" }
                );
            }
        }
    }

    Ok(())
}
