pub mod candidates;
pub mod csv_io;
pub mod discovery;
pub mod etl;
pub mod event_pipeline;
pub mod events;
pub mod fetcher;
pub mod identifiers;
pub mod pacing;
pub mod patterns;
pub mod progress;
pub mod regions;
pub mod series;
pub mod validator;
pub mod verify;
pub mod views;

pub use crate::domain::ports::{ConfigProvider, PageFetcher, Pipeline, Storage};
pub use crate::utils::error::Result;
