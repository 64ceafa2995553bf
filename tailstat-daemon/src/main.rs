use anyhow::Result;
use clap::Parser;

use tailstat_daemon::cli::DaemonCli;
use tailstat_daemon::logging;
use tailstat_daemon::orchestrator::{self, Orchestrator};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = DaemonCli::parse();

    // 로깅 설정을 얻기 위한 1차 로딩 (구독자 설치 전이라 경고는 출력되지 않음)
    let general = orchestrator::load_config(&cli).await?.general;
    logging::init_tracing(&general)?;

    // 구독자 설치 후 다시 로딩해 기본값 대체 경고를 남김
    let config = orchestrator::load_config(&cli).await?;

    if cli.validate {
        config
            .monitor
            .check_log_source()
            .await
            .map_err(|e| anyhow::anyhow!("{}", e))?;
        let effective = toml::to_string_pretty(&config)
            .map_err(|e| anyhow::anyhow!("failed to render config: {}", e))?;
        println!("configuration is valid\n\n{effective}");
        return Ok(());
    }

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "tailstat-daemon starting");
    let mut orchestrator = Orchestrator::build_from_config(config).await?;
    orchestrator.run().await
}
