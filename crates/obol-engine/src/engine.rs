//! Multi-target day orchestration.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use chrono::NaiveDate;
use futures::future::try_join_all;
use obol_adv::{DaySchedule, RollingAdv, ThresholdScheduler};
use obol_aggregate::{AggregatorState, ChunkOutput, DollarBar, aggregate_chunk_with_capacity};
use obol_types::{ConfigError, DailyVolume, Target, TargetTable, Tick, TickError, validate_day};
use tracing::{debug, info, warn};

use crate::{BarSink, DaySummary, EngineConfig, EngineError, RunSummary, TickSource};

/// Why a day was skipped for every target.
#[derive(Debug, Clone, PartialEq)]
pub enum DaySkip {
    /// No usable ADV for the day.
    NoAdv,
    /// The tick source failed to supply the day.
    SourceFailed(String),
    /// The day contained an invalid or out-of-order tick.
    Malformed(TickError),
    /// The day had no ticks.
    NoTicks,
}

impl fmt::Display for DaySkip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoAdv => f.write_str("no ADV"),
            Self::SourceFailed(reason) => write!(f, "tick source failed: {reason}"),
            Self::Malformed(err) => write!(f, "malformed ticks: {err}"),
            Self::NoTicks => f.write_str("no ticks"),
        }
    }
}

/// A day aggregated for every target but not yet committed.
///
/// Holding a plan changes nothing in the engine; only
/// [`Engine::commit`] does.
#[derive(Debug, Clone)]
pub struct DayPlan {
    schedule: DaySchedule,
    outputs: TargetTable<ChunkOutput>,
    // Last committed day when the plan was prepared.
    base: Option<NaiveDate>,
}

impl DayPlan {
    /// Returns the planned day.
    #[must_use]
    pub const fn date(&self) -> NaiveDate {
        self.schedule.date()
    }

    /// Returns the schedule the day was aggregated with.
    #[must_use]
    pub const fn schedule(&self) -> &DaySchedule {
        &self.schedule
    }

    /// Returns the bars completed for `target`.
    #[must_use]
    pub fn bars(&self, target: Target) -> Option<&[DollarBar]> {
        self.outputs.get(target).map(|out| out.bars.as_slice())
    }

    /// Iterates over each target's completed bars.
    pub fn iter_bars(&self) -> impl Iterator<Item = (Target, &[DollarBar])> {
        self.outputs
            .iter()
            .map(|(target, out)| (target, out.bars.as_slice()))
    }

    /// Returns the state each target would carry into the next day.
    #[must_use]
    pub fn states(&self) -> TargetTable<AggregatorState> {
        self.outputs.map(|_, out| out.state)
    }

    fn summary(&self) -> DaySummary {
        DaySummary {
            date: self.schedule.date(),
            adv: self.schedule.adv(),
            source: self.schedule.source(),
            bars: self.outputs.map(|_, out| out.bars.len()),
        }
    }
}

/// A committed day and its bars.
#[derive(Debug, Clone)]
pub struct DayOutput {
    /// What the day produced.
    pub summary: DaySummary,
    /// Completed bars per target.
    pub bars: TargetTable<Vec<DollarBar>>,
}

/// Outcome of [`Engine::process_day`].
#[derive(Debug, Clone)]
pub enum DayResult {
    /// The day was committed.
    Processed(DayOutput),
    /// The day was skipped for every target.
    Skipped {
        /// The skipped day.
        date: NaiveDate,
        /// Why it was skipped.
        reason: DaySkip,
    },
}

#[derive(Debug, Clone, Copy)]
struct TargetSlot {
    state: AggregatorState,
    // Bars emitted on the last committed day; sizes the next day's output.
    last_bar_count: usize,
}

/// Drives one dollar-bar aggregator per target across trading days.
///
/// Each day is all-or-nothing: either every target's state advances, or
/// none does.
#[derive(Debug, Clone)]
pub struct Engine {
    config: EngineConfig,
    scheduler: ThresholdScheduler,
    slots: TargetTable<TargetSlot>,
    last_committed: Option<NaiveDate>,
}

impl Engine {
    /// Creates an engine over a precomputed ADV series.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured targets cannot form a table.
    pub fn new(config: EngineConfig, adv: RollingAdv) -> Result<Self, ConfigError> {
        let slots = TargetTable::try_new(config.targets().iter().copied(), |_| TargetSlot {
            state: AggregatorState::new(),
            last_bar_count: 0,
        })?;
        let scheduler = ThresholdScheduler::new(adv, config.adv_policy());
        info!(
            targets = slots.len(),
            window = config.rolling_window().get(),
            policy = %config.adv_policy(),
            adv_days = scheduler.adv().len(),
            "engine ready"
        );
        Ok(Self {
            config,
            scheduler,
            slots,
            last_committed: None,
        })
    }

    /// Creates an engine, computing the ADV from daily volumes with the
    /// configured window.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured targets cannot form a table.
    pub fn from_volumes(config: EngineConfig, volumes: &[DailyVolume]) -> Result<Self, ConfigError> {
        let adv = RollingAdv::compute(volumes, config.rolling_window());
        Self::new(config, adv)
    }

    /// Returns the engine configuration.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns the threshold scheduler.
    #[must_use]
    pub const fn scheduler(&self) -> &ThresholdScheduler {
        &self.scheduler
    }

    /// Returns the state carried by `target`.
    #[must_use]
    pub fn state(&self, target: Target) -> Option<&AggregatorState> {
        self.slots.get(target).map(|slot| &slot.state)
    }

    /// Returns a copy of every target's carried state.
    #[must_use]
    pub fn states(&self) -> TargetTable<AggregatorState> {
        self.slots.map(|_, slot| slot.state)
    }

    /// Returns the last committed day.
    #[must_use]
    pub const fn last_committed(&self) -> Option<NaiveDate> {
        self.last_committed
    }

    /// Returns the thresholds for `date`, or `None` if it has no usable ADV.
    #[must_use]
    pub fn schedule(&self, date: NaiveDate) -> Option<DaySchedule> {
        self.scheduler.schedule(date, &self.slots)
    }

    /// Aggregates one day for every target without committing it.
    ///
    /// # Errors
    ///
    /// Returns the reason the day must be skipped. Nothing changes in the
    /// engine either way.
    pub fn prepare_day(&self, date: NaiveDate, ticks: &[Tick]) -> Result<DayPlan, DaySkip> {
        let schedule = self.admit(date, ticks)?;
        let outputs = self
            .slots
            .zip_map(schedule.thresholds(), |_, slot, &threshold| {
                aggregate_chunk_with_capacity(ticks, threshold, slot.state, slot.last_bar_count)
            })
            .ok_or(DaySkip::NoAdv)?;
        Ok(DayPlan {
            schedule,
            outputs,
            base: self.last_committed,
        })
    }

    /// Aggregates one day with each target on its own blocking task, joining
    /// all of them before returning.
    ///
    /// # Errors
    ///
    /// The outer error reports a task that failed to finish. The inner one
    /// is the reason the day must be skipped.
    pub async fn prepare_day_concurrent(
        &self,
        date: NaiveDate,
        ticks: Arc<[Tick]>,
    ) -> Result<Result<DayPlan, DaySkip>, EngineError> {
        let schedule = match self.admit(date, &ticks) {
            Ok(schedule) => schedule,
            Err(skip) => return Ok(Err(skip)),
        };

        let tasks = self
            .slots
            .zip_map(schedule.thresholds(), |_, slot, &threshold| {
                let ticks = Arc::clone(&ticks);
                let TargetSlot {
                    state,
                    last_bar_count,
                } = *slot;
                tokio::task::spawn_blocking(move || {
                    aggregate_chunk_with_capacity(&ticks, threshold, state, last_bar_count)
                })
            });
        let Some(tasks) = tasks else {
            return Ok(Err(DaySkip::NoAdv));
        };
        let outputs = try_join_all(tasks.into_entries().into_iter().map(|(_, task)| task))
            .await
            .map_err(|e| EngineError::Join(e.to_string()))?;
        let outputs = self
            .slots
            .with_values(outputs)
            .ok_or_else(|| EngineError::Join("task count does not match targets".to_string()))?;

        Ok(Ok(DayPlan {
            schedule,
            outputs,
            base: self.last_committed,
        }))
    }

    /// Commits a prepared day, advancing every target's state at once.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::DayOutOfOrder`] if the day is not after the
    /// last committed day, and rejects plans prepared before another commit
    /// or by an engine with different targets.
    pub fn commit(&mut self, plan: DayPlan) -> Result<DayOutput, EngineError> {
        let date = plan.date();
        self.check_order(date)?;
        if plan.base != self.last_committed {
            return Err(EngineError::StalePlan { date });
        }
        if !plan.outputs.targets().eq(self.slots.targets()) {
            return Err(EngineError::PlanMismatch);
        }

        let summary = plan.summary();
        for ((_, slot), (_, out)) in self.slots.iter_mut().zip(plan.outputs.iter()) {
            slot.state = out.state;
            slot.last_bar_count = out.bars.len();
        }
        self.last_committed = Some(date);

        info!(%date, bars = summary.total_bars(), "Processed {summary}");
        let bars = plan.outputs.into_map(|_, out| out.bars);
        Ok(DayOutput { summary, bars })
    }

    /// Aggregates and commits one day, or skips it for every target.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::DayOutOfOrder`] if the day is not after the
    /// last committed day, skipped or not.
    pub fn process_day(&mut self, date: NaiveDate, ticks: &[Tick]) -> Result<DayResult, EngineError> {
        self.check_order(date)?;
        match self.prepare_day(date, ticks) {
            Ok(plan) => Ok(DayResult::Processed(self.commit(plan)?)),
            Err(reason) => {
                log_skip(date, &reason);
                Ok(DayResult::Skipped { date, reason })
            }
        }
    }

    /// Processes every day `source` offers, in order, writing bars to `sink`.
    ///
    /// A day's bars are all written before its state is committed.
    ///
    /// # Errors
    ///
    /// Stops at the first sink failure or out-of-order day. Days committed
    /// before that stay committed.
    pub fn run<S, K>(&mut self, source: &S, sink: &mut K) -> Result<RunSummary, EngineError>
    where
        S: TickSource + ?Sized,
        K: BarSink + ?Sized,
    {
        let started = Instant::now();
        let mut summary = RunSummary::new(&self.slots);
        let days = source.days();
        info!(days = days.len(), targets = self.slots.len(), "starting run");

        for date in days {
            self.check_order(date)?;
            let prepared = self
                .load_day(source, date)
                .and_then(|ticks| self.prepare_day(date, &ticks));
            match prepared {
                Ok(plan) => self.write_and_commit(plan, sink, &mut summary)?,
                Err(reason) => skip_day(date, &reason, &mut summary),
            }
        }

        summary.elapsed = started.elapsed();
        info!(%summary, "run complete");
        Ok(summary)
    }

    /// Like [`Self::run`], aggregating each day's targets in parallel.
    ///
    /// Days are still processed strictly one after another.
    ///
    /// # Errors
    ///
    /// Stops at the first sink failure, out-of-order day, or failed
    /// aggregation task.
    pub async fn run_concurrent<S, K>(
        &mut self,
        source: &S,
        sink: &mut K,
    ) -> Result<RunSummary, EngineError>
    where
        S: TickSource + ?Sized,
        K: BarSink + ?Sized,
    {
        let started = Instant::now();
        let mut summary = RunSummary::new(&self.slots);
        let days = source.days();
        info!(
            days = days.len(),
            targets = self.slots.len(),
            "starting concurrent run"
        );

        for date in days {
            self.check_order(date)?;
            let prepared = match self.load_day(source, date) {
                Ok(ticks) => self.prepare_day_concurrent(date, ticks.into()).await?,
                Err(reason) => Err(reason),
            };
            match prepared {
                Ok(plan) => self.write_and_commit(plan, sink, &mut summary)?,
                Err(reason) => skip_day(date, &reason, &mut summary),
            }
        }

        summary.elapsed = started.elapsed();
        info!(%summary, "run complete");
        Ok(summary)
    }

    fn check_order(&self, date: NaiveDate) -> Result<(), EngineError> {
        match self.last_committed {
            Some(last) if date <= last => Err(EngineError::DayOutOfOrder { date, last }),
            _ => Ok(()),
        }
    }

    fn admit(&self, date: NaiveDate, ticks: &[Tick]) -> Result<DaySchedule, DaySkip> {
        let schedule = self.schedule(date).ok_or(DaySkip::NoAdv)?;
        validate_day(ticks).map_err(DaySkip::Malformed)?;
        if ticks.is_empty() {
            return Err(DaySkip::NoTicks);
        }
        debug!(%date, adv = schedule.adv(), ticks = ticks.len(), "aggregating day");
        Ok(schedule)
    }

    // Checks the ADV first so days that will be skipped are never read.
    fn load_day<S>(&self, source: &S, date: NaiveDate) -> Result<Vec<Tick>, DaySkip>
    where
        S: TickSource + ?Sized,
    {
        if self.schedule(date).is_none() {
            return Err(DaySkip::NoAdv);
        }
        source
            .read_day(date)
            .map_err(|e| DaySkip::SourceFailed(e.to_string()))
    }

    fn write_and_commit<K>(
        &mut self,
        plan: DayPlan,
        sink: &mut K,
        summary: &mut RunSummary,
    ) -> Result<(), EngineError>
    where
        K: BarSink + ?Sized,
    {
        let date = plan.date();
        for (target, bars) in plan.iter_bars().filter(|(_, bars)| !bars.is_empty()) {
            sink.write_bars(target, date, bars)
                .map_err(|source| EngineError::Sink {
                    target,
                    date,
                    source,
                })?;
        }
        let output = self.commit(plan)?;
        summary.record_day(&output.summary);
        Ok(())
    }
}

fn skip_day(date: NaiveDate, reason: &DaySkip, summary: &mut RunSummary) {
    log_skip(date, reason);
    summary.record_skip(reason);
}

fn log_skip(date: NaiveDate, reason: &DaySkip) {
    match reason {
        DaySkip::NoAdv | DaySkip::NoTicks => debug!(%date, %reason, "skipping day"),
        DaySkip::SourceFailed(_) | DaySkip::Malformed(_) => warn!(%date, %reason, "skipping day"),
    }
}
