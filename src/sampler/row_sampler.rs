use crate::error::Result;
use crate::outcome::{Outcome, SkipReason};
use crate::sampler::row_table::{Row, RowTable};
use clap::ValueEnum;
use rand::rngs::ThreadRng;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// How rows are chosen when a table is cut down to a target size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum SamplingPolicy {
    /// Row 0 is a header and always kept; `n` randomly chosen data rows
    /// survive in their original order.
    #[default]
    ExcludingHeader,
    /// Every row is a candidate; the output is the `n` rows drawn at random,
    /// in draw order.
    WithoutHeader,
}

impl SamplingPolicy {
    /// Rows that may be dropped out of a table of `total_rows`.
    pub fn eligible_rows(self, total_rows: usize) -> usize {
        match self {
            SamplingPolicy::ExcludingHeader => total_rows.saturating_sub(1),
            SamplingPolicy::WithoutHeader => total_rows,
        }
    }
}

impl fmt::Display for SamplingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SamplingPolicy::ExcludingHeader => write!(f, "excluding-header"),
            SamplingPolicy::WithoutHeader => write!(f, "without-header"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SampleReport {
    pub path: PathBuf,
    pub policy: SamplingPolicy,
    pub rows_before: usize,
    pub rows_after: usize,
    pub rows_removed: usize,
}

pub struct RowSampler<R = ThreadRng> {
    rng: R,
}

impl RowSampler<ThreadRng> {
    pub fn new() -> Self {
        Self { rng: rand::rng() }
    }
}

impl Default for RowSampler<ThreadRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> RowSampler<R> {
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }

    pub fn sample<P: AsRef<Path>>(
        &mut self,
        path: P,
        keep: usize,
        policy: SamplingPolicy,
    ) -> Result<Outcome<SampleReport>> {
        let path = path.as_ref();
        let mut table = RowTable::read(path)?;
        let rows_before = table.row_count();

        let eligible = policy.eligible_rows(rows_before);
        if keep >= eligible {
            tracing::warn!(
                path = %path.display(),
                requested = keep,
                eligible,
                "nothing to remove, leaving file unchanged"
            );
            return Ok(Outcome::Skipped(SkipReason::NotEnoughRows {
                requested: keep,
                eligible,
            }));
        }

        match policy {
            SamplingPolicy::ExcludingHeader => {
                drop_random_data_rows(table.rows_mut(), keep, &mut self.rng)
            }
            SamplingPolicy::WithoutHeader => {
                draw_random_rows(table.rows_mut(), keep, &mut self.rng)
            }
        }
        table.write_atomic(path)?;
        let rows_after = table.row_count();

        let report = SampleReport {
            path: path.to_path_buf(),
            policy,
            rows_before,
            rows_after,
            rows_removed: rows_before - rows_after,
        };
        tracing::info!(
            path = %path.display(),
            policy = %policy,
            kept = keep,
            removed = report.rows_removed,
            "rows remaining after deletion"
        );

        Ok(Outcome::Completed(report))
    }

    /// Keeps the header row plus `keep` randomly chosen data rows.
    pub fn sample_excluding_header<P: AsRef<Path>>(
        &mut self,
        path: P,
        keep: usize,
    ) -> Result<Outcome<SampleReport>> {
        self.sample(path, keep, SamplingPolicy::ExcludingHeader)
    }

    /// Replaces the table with `keep` rows drawn at random from all rows,
    /// the first row included.
    pub fn sample_without_header<P: AsRef<Path>>(
        &mut self,
        path: P,
        keep: usize,
    ) -> Result<Outcome<SampleReport>> {
        self.sample(path, keep, SamplingPolicy::WithoutHeader)
    }
}

/// Removes uniformly chosen rows from index 1 onward until `keep` rows follow
/// the header. Survivors stay in their original order.
fn drop_random_data_rows<R: Rng + ?Sized>(rows: &mut Vec<Row>, keep: usize, rng: &mut R) {
    while rows.len() > keep + 1 {
        let index = rng.random_range(1..rows.len());
        rows.remove(index);
    }
}

/// Replaces `rows` with `keep` rows drawn uniformly without replacement, in
/// draw order.
fn draw_random_rows<R: Rng + ?Sized>(rows: &mut Vec<Row>, keep: usize, rng: &mut R) {
    let mut pool = std::mem::take(rows);
    rows.reserve(keep);
    while rows.len() < keep {
        let index = rng.random_range(0..pool.len());
        // Pool order does not matter, only the live count.
        rows.push(pool.swap_remove(index));
    }
}
