use bookclub_feeds::config::toml_config::TomlConfig;
use bookclub_feeds::core::csv_io::read_records;
use bookclub_feeds::core::ConfigProvider;
use bookclub_feeds::domain::model::LibraryRecord;
use bookclub_feeds::utils::validation::{validate_url, Validate};
use bookclub_feeds::utils::{error::Result, logger};
use bookclub_feeds::{DiscoveryPipeline, EtlEngine, HttpFetcher, LocalStorage};
use clap::Parser;

#[derive(Parser)]
#[command(name = "toml-discover")]
#[command(about = "Book club feed discovery driven by a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "crawl.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Override the number of libraries crawled at once
    #[arg(long)]
    concurrent_libraries: Option<usize>,

    /// Dry run - show what would be crawled without any network access
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let mut config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    if config.json_logs() {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(args.verbose);
    }
    tracing::info!("📁 Loaded configuration from: {}", args.config);

    if let Some(concurrent) = args.concurrent_libraries {
        config.crawl.concurrent_libraries = Some(concurrent);
        tracing::info!("🔧 Concurrent libraries overridden to: {}", concurrent);
    }

    if let Err(e) = config.validate() {
        std::process::exit(e.report("Configuration validation"));
    }

    display_config_summary(&config, &args);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No requests will be sent");
        if let Err(e) = perform_dry_run(&config).await {
            std::process::exit(e.report("Dry run"));
        }
        return;
    }

    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let fetcher = match HttpFetcher::new(config.user_agent(), config.timeout()) {
        Ok(fetcher) => fetcher,
        Err(e) => std::process::exit(e.report("HTTP client setup")),
    };

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

fn display_config_summary(config: &TomlConfig, args: &Args) {
    println!("📋 Configuration Summary:");
    println!(
        "  Pipeline: {} v{}",
        config.pipeline.name, config.pipeline.version
    );
    println!("  Input: {}", config.input_path());
    println!("  Output: {}", config.output_path());
    println!("  User agent: {}", config.user_agent());
    println!("  Timeout: {:?}", config.timeout());
    println!("  Request delay: {:?}", config.request_delay());
    println!("  Concurrent libraries: {}", config.concurrent_libraries());

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}

/// Reads the input and reports which libraries would be crawled.
async fn perform_dry_run(config: &TomlConfig) -> Result<()> {
    let data = tokio::fs::read(config.input_path()).await?;
    let records: Vec<LibraryRecord> = read_records(&data)?;

    let mut crawlable = 0;
    let mut skipped = 0;
    let mut invalid = Vec::new();
    for record in &records {
        if record.library_base_url.trim().is_empty() {
            skipped += 1;
            continue;
        }
        match validate_url("library_base_url", record.library_base_url.trim()) {
            Ok(()) => crawlable += 1,
            Err(e) => invalid.push(format!("{}: {}", record.library_name, e)),
        }
    }

    println!("🔍 Dry Run Analysis:");
    println!("  Rows: {}", records.len());
    println!("  Libraries to crawl: {}", crawlable);
    println!("  Rows without a base URL: {}", skipped);
    if !invalid.is_empty() {
        println!("  Invalid base URLs (will produce error rows):");
        for line in &invalid {
            println!("    {}", line);
        }
    }

    // events page, filtered page, then per series a title page and up to six candidates
    let minimum = crawlable * 2;
    println!(
        "  Minimum requests: {} (at least {:?} of pauses)",
        minimum,
        config.request_delay() * minimum as u32
    );

    println!();
    println!("✅ Dry run analysis complete.");
    Ok(())
}
