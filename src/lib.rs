pub mod cli;
pub mod config;
pub mod db;
pub mod distance;
pub mod embedding;
pub mod engine;
pub mod error;
pub mod index;
mod metrics;
mod server;

pub use config::{DataDir, Opts};
pub use engine::{SearchEngine, SearchResult};
pub use error::{Error, Result};
