//! File-backed bar sink.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use obol_aggregate::DollarBar;
use obol_engine::{BarSink, EngineConfig, SinkError};
use obol_types::Target;
use tracing::debug;

use crate::{FormatError, Formatter};

/// Directory and file naming for per-target, per-day output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    root: PathBuf,
    symbol: String,
    market: String,
}

impl OutputLayout {
    /// Creates a layout rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, symbol: impl Into<String>, market: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            symbol: symbol.into(),
            market: market.into(),
        }
    }

    /// Creates a layout using the symbol and market of `config`.
    #[must_use]
    pub fn from_config(root: impl Into<PathBuf>, config: &EngineConfig) -> Self {
        Self::new(root, config.symbol(), config.market())
    }

    /// Returns the output root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the directory holding every file of `target`, e.g.
    /// `{root}/500_bpd`.
    #[must_use]
    pub fn target_dir(&self, target: Target) -> PathBuf {
        self.root.join(format!("{}_bpd", target.get()))
    }

    /// Returns the file name for one target and day, e.g.
    /// `BTCUSDC_futures_dollar_bars_500pd_2024-03-02.parquet`.
    #[must_use]
    pub fn file_name(&self, target: Target, date: NaiveDate, extension: &str) -> String {
        format!(
            "{}_{}_dollar_bars_{target}_{}.{extension}",
            self.symbol,
            self.market,
            date.format("%Y-%m-%d")
        )
    }

    /// Returns the full path for one target and day.
    #[must_use]
    pub fn path_for(&self, target: Target, date: NaiveDate, extension: &str) -> PathBuf {
        self.target_dir(target)
            .join(self.file_name(target, date, extension))
    }
}

/// Bar sink writing one file per target and day.
///
/// Each file is written under a temporary name and renamed into place once
/// complete, so a failed write never leaves a partial file at the final
/// path.
#[derive(Debug, Clone)]
pub struct FileSink<F> {
    layout: OutputLayout,
    formatter: F,
    files_written: usize,
}

impl<F: Formatter> FileSink<F> {
    /// Creates a sink writing with `formatter` under `layout`.
    #[must_use]
    pub const fn new(layout: OutputLayout, formatter: F) -> Self {
        Self {
            layout,
            formatter,
            files_written: 0,
        }
    }

    /// Returns the naming layout.
    #[must_use]
    pub const fn layout(&self) -> &OutputLayout {
        &self.layout
    }

    /// Returns the number of files written so far.
    #[must_use]
    pub const fn files_written(&self) -> usize {
        self.files_written
    }

    /// Returns where the bars of `target` on `date` are written.
    #[must_use]
    pub fn path_for(&self, target: Target, date: NaiveDate) -> PathBuf {
        self.layout
            .path_for(target, date, self.formatter.extension())
    }

    fn write_file(&self, path: &Path, bars: &[DollarBar]) -> Result<(), FormatError> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let mut partial = path.as_os_str().to_owned();
        partial.push(".partial");
        let partial = PathBuf::from(partial);

        let written = File::create(&partial)
            .map_err(FormatError::from)
            .and_then(|file| self.formatter.write_bars(bars, BufWriter::new(file)));
        if let Err(e) = written {
            let _ = fs::remove_file(&partial);
            return Err(e);
        }
        fs::rename(&partial, path)?;
        Ok(())
    }
}

impl<F: Formatter> BarSink for FileSink<F> {
    fn write_bars(
        &mut self,
        target: Target,
        date: NaiveDate,
        bars: &[DollarBar],
    ) -> Result<(), SinkError> {
        let path = self.path_for(target, date);
        self.write_file(&path, bars)?;
        self.files_written += 1;
        debug!(path = %path.display(), bars = bars.len(), "wrote bars");
        Ok(())
    }
}

impl From<FormatError> for SinkError {
    fn from(err: FormatError) -> Self {
        match err {
            FormatError::Io(e) => Self::Io(e),
            other => Self::Format(other.to_string()),
        }
    }
}
