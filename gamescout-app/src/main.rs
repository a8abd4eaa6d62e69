use anyhow::Result;
use gamescout_common::GamescoutError;
use gamescout_common::observability::{LogConfig, init_logging};
use gamescout_config::{GamescoutConfig, GamescoutConfigLoader};
use gamescout_web::GameSearch;
use tokio::io::BufReader;
mod session;

const CONFIG_FILE: &str = "gamescout.yaml";

#[tokio::main]
async fn main() -> Result<()> {
    // 1) Load config (env wins over the optional file)
    let cfg: GamescoutConfig = GamescoutConfigLoader::new()
        .with_optional_file(CONFIG_FILE)
        .load()?;

    // 2) Logs go to the file sink; stdout belongs to the session
    let log_path = init_logging(LogConfig {
        log_dir: cfg.logging.dir.clone(),
        emit_stderr: cfg.logging.stderr,
        format: cfg.logging.format,
        default_filter: cfg.logging.filter.clone(),
    })?;
    tracing::debug!(version = ?cfg.version, log = %log_path.display(), "config.loaded");

    let search = GameSearch::from_settings(cfg.search)
        .map_err(|e| GamescoutError::Config(format!("search settings: {e}")))?;

    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = tokio::io::stdout();
    session::run_session(stdin, &mut stdout, &search).await?;
    Ok(())
}
