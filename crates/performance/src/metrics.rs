//! Earned-value metrics for a project.
//!
//! EV is the fraction of tasks completed, PV the fraction of the schedule
//! elapsed. Everything else derives from those two plus the overdue count.

use chrono::Utc;
use planwise_core::{Project, Task, Time};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Completion rate (percent) from which a project counts as delivered.
pub const COMPLETION_THRESHOLD: f64 = 99.9;

/// Lowest SPI ever reported.
const SPI_FLOOR: f64 = 0.1;

/// SPI cap once the deadline has passed with work still open.
const PAST_DUE_SPI: f64 = 0.3;

/// SPI reduction per unit of overdue share.
const OVERDUE_PENALTY: f64 = 0.5;

/// TCPI above this is practically unreachable and reported as the ceiling.
const TCPI_CEILING: f64 = 2.0;

/// EVM metrics of a project at a point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSet {
    /// All tasks
    pub total_tasks: usize,
    /// Completed tasks
    pub completed_tasks: usize,
    /// Open tasks
    pub pending_tasks: usize,
    /// Open tasks past their due date
    pub overdue_tasks: usize,
    /// Percent of tasks completed (0-100)
    pub completion_rate: f64,

    /// Planned duration in days (at least 1)
    pub total_days: i64,
    /// Days since start
    pub elapsed_days: i64,
    /// Days until the planned end
    pub remaining_days: i64,

    /// Earned value (0-1)
    pub ev: f64,
    /// Planned value (0-1)
    pub pv: f64,
    /// Schedule performance index
    pub spi: f64,
    /// Schedule variance (ev - pv)
    pub sv: f64,
    /// Estimate at completion, days
    pub eac: f64,
    /// Variance at completion, days (negative = behind)
    pub vac: f64,
    /// To-complete performance index (capped at 2.0)
    pub tcpi: f64,
    /// Projected delay in days (`max(0, -vac)`)
    pub delay_days: f64,
    /// Mean task complexity
    pub average_complexity: f64,

    /// The planned end has passed
    pub is_past_due: bool,
}

impl MetricSet {
    /// Whether the project counts as delivered.
    pub fn is_completed(&self) -> bool {
        self.completion_rate >= COMPLETION_THRESHOLD
    }
}

/// Computes [`MetricSet`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsCalculator;

impl MetricsCalculator {
    /// Create a new calculator.
    pub fn new() -> Self {
        Self
    }

    /// Compute metrics as of `now`. Returns `None` when there are no tasks.
    pub fn compute(&self, project: &Project, tasks: &[Task], now: Time) -> Option<MetricSet> {
        if tasks.is_empty() {
            debug!("Project {} has no tasks, no metrics", project.id);
            return None;
        }

        let total = tasks.len();
        let completed = tasks.iter().filter(|t| t.is_completed).count();
        let overdue = tasks.iter().filter(|t| t.is_overdue(now)).count();
        let pending = total - completed;

        let total_days = days_between(project.start, project.end).max(1);
        let elapsed_days = days_between(project.start, now).max(0);
        let remaining_days = days_between(now, project.end).max(0);
        let is_past_due = now > project.end;

        let ev = completed as f64 / total as f64;
        let pv = (elapsed_days as f64 / total_days as f64).min(1.0);

        let spi = schedule_performance_index(ev, pv, overdue, total, is_past_due && pending > 0);
        let sv = ev - pv;

        let eac = if spi > SPI_FLOOR {
            total_days as f64 / spi
        } else {
            total_days as f64 * 2.0
        };
        let vac = total_days as f64 - eac;

        let raw_tcpi = if remaining_days > 0 {
            (1.0 - ev) / (remaining_days as f64 / total_days as f64)
        } else {
            TCPI_CEILING
        };
        let tcpi = raw_tcpi.min(TCPI_CEILING);

        let average_complexity =
            tasks.iter().map(Task::effective_complexity).sum::<f64>() / total as f64;

        let metrics = MetricSet {
            total_tasks: total,
            completed_tasks: completed,
            pending_tasks: pending,
            overdue_tasks: overdue,
            completion_rate: round_to(ev * 100.0, 2),
            total_days,
            elapsed_days,
            remaining_days,
            ev: round_to(ev, 3),
            pv: round_to(pv, 3),
            spi: round_to(spi, 3),
            sv: round_to(sv, 3),
            eac: round_to(eac, 1),
            vac: round_to(vac, 1),
            tcpi: round_to(tcpi, 3),
            delay_days: round_to((-vac).max(0.0), 1),
            average_complexity: round_to(average_complexity, 2),
            is_past_due,
        };

        debug!(
            "Metrics for {}: spi={} tcpi={} vac={} overdue={}",
            project.id, metrics.spi, metrics.tcpi, metrics.vac, metrics.overdue_tasks
        );
        Some(metrics)
    }

    /// Compute metrics against the wall clock.
    pub fn compute_now(&self, project: &Project, tasks: &[Task]) -> Option<MetricSet> {
        self.compute(project, tasks, Utc::now())
    }
}

/// SPI with the overdue penalty and the past-due cap applied.
fn schedule_performance_index(
    ev: f64,
    pv: f64,
    overdue: usize,
    total: usize,
    open_past_deadline: bool,
) -> f64 {
    let mut spi = if pv > 0.0 { ev / pv } else { 1.0 };

    if overdue > 0 {
        spi -= (overdue as f64 / total as f64) * OVERDUE_PENALTY;
    }
    spi = spi.max(SPI_FLOOR);

    if open_past_deadline {
        spi = spi.min(PAST_DUE_SPI);
    }
    spi
}

/// Whole days from `from` to `to`, truncated toward zero.
fn days_between(from: Time, to: Time) -> i64 {
    (to - from).num_days()
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
impl MetricSet {
    /// A healthy mid-project baseline for rule tests.
    pub(crate) fn sample() -> Self {
        MetricSet {
            total_tasks: 10,
            completed_tasks: 5,
            pending_tasks: 5,
            overdue_tasks: 0,
            completion_rate: 50.0,
            total_days: 60,
            elapsed_days: 30,
            remaining_days: 30,
            ev: 0.5,
            pv: 0.5,
            spi: 1.0,
            sv: 0.0,
            eac: 60.0,
            vac: 0.0,
            tcpi: 1.0,
            delay_days: 0.0,
            average_complexity: 3.0,
            is_past_due: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use planwise_core::{Project, Task};

    fn now() -> Time {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    /// Project of `total` days, `elapsed` of which have passed at `now()`.
    fn project(total: i64, elapsed: i64) -> Project {
        let start = now() - Duration::days(elapsed);
        Project::new("Demo", start, start + Duration::days(total))
    }

    /// `done` completed tasks, `overdue` late ones, the rest due in the future.
    fn tasks(p: &Project, total: usize, done: usize, overdue: usize) -> Vec<Task> {
        (0..total)
            .map(|i| {
                let due = if i >= done && i < done + overdue {
                    now() - Duration::days(2)
                } else {
                    now() + Duration::days(5)
                };
                Task::new(p.id, format!("task {}", i), due).completed(i < done)
            })
            .collect()
    }

    #[test]
    fn test_no_tasks_no_metrics() {
        let p = project(30, 10);
        assert!(MetricsCalculator::new().compute(&p, &[], now()).is_none());
    }

    #[test]
    fn test_scenario_behind_with_overdue() {
        let p = project(60, 40);
        let t = tasks(&p, 10, 2, 3);
        let m = MetricsCalculator::new().compute(&p, &t, now()).unwrap();

        assert_eq!(m.total_tasks, 10);
        assert_eq!(m.completed_tasks, 2);
        assert_eq!(m.pending_tasks, 8);
        assert_eq!(m.overdue_tasks, 3);
        assert_eq!(m.total_days, 60);
        assert_eq!(m.elapsed_days, 40);
        assert_eq!(m.remaining_days, 20);
        assert_eq!(m.ev, 0.2);
        assert_eq!(m.pv, 0.667);
        // raw 0.3 minus 0.3 * 0.5
        assert_eq!(m.spi, 0.15);
        assert_eq!(m.sv, -0.467);
        assert_eq!(m.eac, 400.0);
        assert_eq!(m.vac, -340.0);
        assert_eq!(m.delay_days, 340.0);
        assert_eq!(m.tcpi, 2.0);
        assert!(!m.is_past_due);
    }

    #[test]
    fn test_on_schedule_project() {
        let p = project(100, 50);
        let t = tasks(&p, 10, 5, 0);
        let m = MetricsCalculator::new().compute(&p, &t, now()).unwrap();

        assert_eq!(m.spi, 1.0);
        assert_eq!(m.sv, 0.0);
        assert_eq!(m.eac, 100.0);
        assert_eq!(m.vac, 0.0);
        assert_eq!(m.tcpi, 1.0);
        assert_eq!(m.completion_rate, 50.0);
    }

    #[test]
    fn test_not_started_project_has_neutral_spi() {
        let start = now() + Duration::days(5);
        let p = Project::new("Future", start, start + Duration::days(20));
        let t = tasks(&p, 4, 0, 0);
        let m = MetricsCalculator::new().compute(&p, &t, now()).unwrap();

        assert_eq!(m.elapsed_days, 0);
        assert_eq!(m.pv, 0.0);
        assert_eq!(m.spi, 1.0);
    }

    #[test]
    fn test_zero_length_window_is_clamped() {
        let start = now() - Duration::hours(1);
        let p = Project::new("Same day", start, start);
        let t = tasks(&p, 2, 1, 0);
        let m = MetricsCalculator::new().compute(&p, &t, now()).unwrap();

        assert_eq!(m.total_days, 1);
        assert_eq!(m.remaining_days, 0);
        assert_eq!(m.tcpi, 2.0);
        assert!(m.spi.is_finite());
        assert!(m.eac.is_finite());
    }

    #[test]
    fn test_past_due_caps_spi() {
        // Ended 5 days ago, 9 of 10 done: raw SPI 0.9, capped.
        let p = project(30, 35);
        let t = tasks(&p, 10, 9, 0);
        let m = MetricsCalculator::new().compute(&p, &t, now()).unwrap();

        assert!(m.is_past_due);
        assert_eq!(m.spi, 0.3);
        assert_eq!(m.remaining_days, 0);
    }

    #[test]
    fn test_past_due_completed_project_keeps_spi() {
        let p = project(30, 35);
        let t = tasks(&p, 4, 4, 0);
        let m = MetricsCalculator::new().compute(&p, &t, now()).unwrap();

        assert!(m.is_past_due);
        assert_eq!(m.spi, 1.0);
        assert!(m.is_completed());
    }

    #[test]
    fn test_spi_floor_and_pessimistic_eac() {
        // Nothing done, half the schedule gone.
        let p = project(40, 20);
        let t = tasks(&p, 5, 0, 0);
        let m = MetricsCalculator::new().compute(&p, &t, now()).unwrap();

        assert_eq!(m.spi, 0.1);
        assert_eq!(m.eac, 80.0);
        assert_eq!(m.vac, -40.0);
    }

    #[test]
    fn test_spi_non_increasing_in_overdue() {
        let p = project(60, 30);
        let mut previous = f64::INFINITY;
        for overdue in 0..=7 {
            let t = tasks(&p, 10, 3, overdue);
            let m = MetricsCalculator::new().compute(&p, &t, now()).unwrap();
            assert_eq!(m.ev, 0.3);
            assert_eq!(m.pv, 0.5);
            assert!(m.spi <= previous, "spi rose at overdue={}", overdue);
            previous = m.spi;
        }
    }

    #[test]
    fn test_compute_is_deterministic() {
        let p = project(60, 25);
        let t = tasks(&p, 13, 4, 2);
        let calc = MetricsCalculator::new();
        let a = calc.compute(&p, &t, now()).unwrap();
        let b = calc.compute(&p, &t, now()).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.spi.to_bits(), b.spi.to_bits());
        assert_eq!(a.tcpi.to_bits(), b.tcpi.to_bits());
    }

    #[test]
    fn test_average_complexity_uses_default() {
        let p = project(30, 10);
        let due = now() + Duration::days(3);
        let t = vec![
            Task::new(p.id, "a", due).with_complexity(5.0),
            Task::new(p.id, "b", due),
        ];
        let m = MetricsCalculator::new().compute(&p, &t, now()).unwrap();
        assert_eq!(m.average_complexity, 4.0);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(0.66666, 3), 0.667);
        assert_eq!(round_to(-339.96, 1), -340.0);
        assert_eq!(round_to(33.3333, 2), 33.33);
    }
}
