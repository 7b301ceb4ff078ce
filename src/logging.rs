use tracing_subscriber::{fmt, EnvFilter};

/// ログ初期化（RUST_LOG が優先、未設定時は verbose で debug / 通常は warn）
///
/// 標準出力は結果表示用なので、ログは標準エラーへ出す。
pub fn init_logging(verbose: bool) {
    let default_level = if verbose { "saral=debug,info" } else { "warn" };
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
