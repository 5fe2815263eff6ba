use bookclub_feeds::core::ConfigProvider;
use bookclub_feeds::utils::{logger, validation::Validate};
use bookclub_feeds::{CliConfig, EtlEngine, HttpFetcher, LocalStorage, VerifyPipeline};
use clap::Parser;

#[derive(Parser)]
#[command(name = "verify-feeds")]
#[command(about = "Keep only the feed rows whose RSS URL still validates")]
struct Args {
    #[command(flatten)]
    common: CliConfig,
}

#[tokio::main]
async fn main() {
    let config = Args::parse().common;

    if config.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(config.verbose);
    }

    if let Err(e) = config.validate() {
        std::process::exit(e.report("Configuration validation"));
    }

    let fetcher = match HttpFetcher::new(config.user_agent(), config.timeout()) {
        Ok(fetcher) => fetcher,
        Err(e) => std::process::exit(e.report("HTTP client setup")),
    };

    let monitor_enabled = config.monitor;
    let pipeline = VerifyPipeline::new(LocalStorage::default(), config, fetcher);
    let engine = EtlEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(output_path) => println!("✅ Wrote {}", output_path),
        Err(e) => {
            let exit_code = e.report("Feed verification");
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }
}
