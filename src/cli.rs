use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "saral")]
#[command(about = "栄養成分表示ラベルのOCR・AI解析ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// OCR言語（例: eng, jpn, eng+jpn）。省略時は設定値
    #[arg(long, global = true)]
    pub lang: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 画像1枚を抽出・解析して結果を出力
    Analyze {
        /// ラベル画像のパス
        #[arg(required = true)]
        image: PathBuf,

        /// 簡易サマリーモード（省略時は設定値、既定は詳細解析）
        #[arg(short, long)]
        quick: bool,

        /// 詳細解析モードを強制
        #[arg(short, long, conflicts_with = "quick")]
        detailed: bool,

        /// OCRテキスト・プロンプトを含むJSONで出力
        #[arg(long)]
        json: bool,
    },

    /// 対話セッション（画像選択・モード切替・履歴表示）
    Session {
        /// 最初に読み込む画像
        image: Option<PathBuf>,
    },

    /// 設定を表示/編集
    Config {
        /// APIキーを設定
        #[arg(long)]
        set_api_key: Option<String>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}
