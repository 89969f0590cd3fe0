//! Core types for the obol dollar-bar engine.
//!
//! This crate provides the fundamental data structures used throughout obol:
//!
//! - [`Tick`] - A single trade with timestamp, price, and quantity
//! - [`DailyVolume`] - Quote (dollar) volume traded on one calendar day
//! - [`Target`] - Validated bar resolution, the divisor applied to ADV
//! - [`TargetTable`] - Fixed table holding one value per configured target

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/obol/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod target;
mod tick;
mod volume;

pub use error::{ConfigError, Result, TickError};
pub use target::{Target, TargetTable};
pub use tick::{Tick, validate_day};
pub use volume::DailyVolume;
