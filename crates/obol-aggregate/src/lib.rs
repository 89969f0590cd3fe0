//! Dollar-bar aggregation for the obol engine.
//!
//! This crate provides threshold-driven tick aggregation:
//!
//! - [`DollarBar`] - Completed dollar bar
//! - [`AggregatorState`] - In-progress bar carried between chunks
//! - [`DollarBarAggregator`] - Streaming tick aggregator
//! - [`aggregate_chunk`] - One forward pass over a tick slice

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/obol/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod aggregator;
mod bar;
mod state;

pub use aggregator::{
    ChunkOutput, DollarBarAggregator, aggregate_chunk, aggregate_chunk_with_capacity,
};
pub use bar::DollarBar;
pub use state::AggregatorState;
