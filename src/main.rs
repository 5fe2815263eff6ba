use bookclub_feeds::core::ConfigProvider;
use bookclub_feeds::utils::{logger, validation::Validate};
use bookclub_feeds::{CliConfig, DiscoveryPipeline, EtlEngine, HttpFetcher, LocalStorage};
use clap::Parser;

#[tokio::main]
async fn main() {
    let config = CliConfig::parse();

    if config.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting bookclub-feeds discovery");
    tracing::debug!("CLI config: {:?}", config);

    if let Err(e) = config.validate() {
        std::process::exit(e.report("Configuration validation"));
    }

    let fetcher = match HttpFetcher::new(config.user_agent(), config.timeout()) {
        Ok(fetcher) => fetcher,
        Err(e) => std::process::exit(e.report("HTTP client setup")),
    };

    let monitor_enabled = config.monitor;
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let pipeline = DiscoveryPipeline::new(LocalStorage::default(), config, fetcher);
    let engine = EtlEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(output_path) => {
            tracing::info!("✅ Discovery completed");
            println!("✅ Wrote {}", output_path);
        }
        Err(e) => {
            let exit_code = e.report("Discovery");
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }
}
