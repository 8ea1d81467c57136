//! Delay probability scoring.
//!
//! Additive weighted heuristic over a [`MetricSet`]. Each factor contributes
//! independently and the total is capped below certainty.

use serde::Serialize;

use crate::metrics::MetricSet;
use crate::workload::WorkloadSnapshot;

/// Highest probability ever reported.
pub const MAX_PROBABILITY: u8 = 95;

/// SPI below which the schedule is critically behind.
pub const SPI_CRITICAL: f64 = 0.7;
/// SPI below which the schedule is behind.
pub const SPI_BEHIND: f64 = 0.9;
/// SPI below which the schedule is slipping.
pub const SPI_SLIPPING: f64 = 1.0;

/// Weight for SPI below [`SPI_CRITICAL`].
pub const WEIGHT_SPI_CRITICAL: u8 = 50;
/// Weight for SPI below [`SPI_BEHIND`].
pub const WEIGHT_SPI_BEHIND: u8 = 30;
/// Weight for SPI below [`SPI_SLIPPING`].
pub const WEIGHT_SPI_SLIPPING: u8 = 10;

/// Weight for more than 5 overdue tasks.
pub const WEIGHT_OVERDUE_MANY: u8 = 30;
/// Weight for more than 2 overdue tasks.
pub const WEIGHT_OVERDUE_SEVERAL: u8 = 20;
/// Weight for any overdue task.
pub const WEIGHT_OVERDUE_SOME: u8 = 10;

/// Weight for less than half done with under a week left.
pub const WEIGHT_TIME_PRESSURE: u8 = 20;

/// Weight for more than [`MAX_TASKS_PER_DAY`] pending tasks per remaining day.
pub const WEIGHT_WORKLOAD: u8 = 15;
/// Pending tasks per remaining day the team can plausibly absorb.
pub const MAX_TASKS_PER_DAY: f64 = 3.0;

/// Per-factor contributions of a score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RiskBreakdown {
    /// Schedule performance factor
    pub spi: u8,
    /// Overdue task factor
    pub overdue: u8,
    /// Time pressure factor
    pub time_pressure: u8,
    /// Workload disproportion factor
    pub workload: u8,
    /// Capped total
    pub total: u8,
}

/// Scores the probability of a project missing its deadline.
#[derive(Debug, Clone, Copy, Default)]
pub struct DelayRiskScorer;

impl DelayRiskScorer {
    /// Create a new scorer.
    pub fn new() -> Self {
        Self
    }

    /// Probability of delay in `[0, MAX_PROBABILITY]`.
    ///
    /// The workload factor only applies when team data is supplied.
    pub fn score(&self, metrics: &MetricSet, workload: Option<&WorkloadSnapshot>) -> u8 {
        self.breakdown(metrics, workload).total
    }

    /// Score with each factor's contribution.
    pub fn breakdown(&self, metrics: &MetricSet, workload: Option<&WorkloadSnapshot>) -> RiskBreakdown {
        if metrics.is_completed() {
            return RiskBreakdown::default();
        }

        let spi = spi_factor(metrics.spi);
        let overdue = overdue_factor(metrics.overdue_tasks);
        let time_pressure = if metrics.completion_rate < 50.0 && metrics.remaining_days < 7 {
            WEIGHT_TIME_PRESSURE
        } else {
            0
        };
        let workload = match workload {
            Some(_) if tasks_per_remaining_day(metrics) > MAX_TASKS_PER_DAY => WEIGHT_WORKLOAD,
            _ => 0,
        };

        let sum = spi as u16 + overdue as u16 + time_pressure as u16 + workload as u16;
        RiskBreakdown {
            spi,
            overdue,
            time_pressure,
            workload,
            total: sum.min(MAX_PROBABILITY as u16) as u8,
        }
    }
}

fn spi_factor(spi: f64) -> u8 {
    if spi < SPI_CRITICAL {
        WEIGHT_SPI_CRITICAL
    } else if spi < SPI_BEHIND {
        WEIGHT_SPI_BEHIND
    } else if spi < SPI_SLIPPING {
        WEIGHT_SPI_SLIPPING
    } else {
        0
    }
}

fn overdue_factor(overdue: usize) -> u8 {
    match overdue {
        0 => 0,
        1..=2 => WEIGHT_OVERDUE_SOME,
        3..=5 => WEIGHT_OVERDUE_SEVERAL,
        _ => WEIGHT_OVERDUE_MANY,
    }
}

fn tasks_per_remaining_day(metrics: &MetricSet) -> f64 {
    metrics.pending_tasks as f64 / metrics.remaining_days.max(1) as f64
}
