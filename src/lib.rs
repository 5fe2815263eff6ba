pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use config::cli::LocalStorage;
#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use core::discovery::DiscoveryPipeline;
pub use core::etl::EtlEngine;
pub use core::event_pipeline::EventFeedPipeline;
pub use core::fetcher::HttpFetcher;
pub use core::regions::RegionTable;
pub use core::verify::VerifyPipeline;
pub use core::views::EventViewsPipeline;
pub use utils::error::{CrawlError, Result};
