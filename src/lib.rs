//! Loads header-first OHLCV + indicator CSV files into a columnar store and projects
//! them into candlestick, volume and indicator series framed by running axis bounds.

pub mod cli;
pub mod column_store;
pub mod error;
pub mod file_processing;
pub mod index;
pub mod log_sink;
pub mod pipeline;
pub mod progress;
pub mod projector;
pub mod render;
pub mod snapshot;
pub mod utils;
