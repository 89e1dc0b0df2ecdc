pub mod archive;
pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod ingest;
pub mod models;
pub mod pipeline;
pub mod readers;
pub mod render;
pub mod utils;

pub use error::{PipelineError, Result};
