//! Rolling average daily volume and threshold scheduling.
//!
//! - [`RollingAdv`] - Causal trailing mean of daily dollar volume
//! - [`ThresholdScheduler`] - Turns a day's ADV into one threshold per target
//! - [`AdvPolicy`] - What to do on days without an ADV
//! - [`DaySchedule`] - Thresholds resolved for one day

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/obol/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod estimator;
mod schedule;

pub use estimator::RollingAdv;
pub use schedule::{AdvPolicy, AdvSource, DaySchedule, ThresholdScheduler, thresholds_for};
