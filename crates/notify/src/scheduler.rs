//! Cron schedules for alert frequencies and the tick loop that runs them.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use cron::Schedule;
use tokio::sync::watch;
use tracing::{debug, error, info};

use crate::alert::Frequency;
use crate::dispatcher::AlertDispatcher;
use crate::traits::NotifyError;

/// Normalize a 5-field cron expression to 6-field by prepending "0 " for seconds.
///
/// The `cron` crate requires 6 fields: `sec min hour day-of-month month day-of-week`.
pub(crate) fn normalize_cron(expr: &str) -> String {
    let trimmed = expr.trim();
    if trimmed.split_whitespace().count() == 5 {
        format!("0 {}", trimmed)
    } else {
        trimmed.to_string()
    }
}

/// True when a scheduled tick falls in `(last_run, now]`. Without a previous
/// run only the last day is considered.
pub(crate) fn is_cron_due(
    schedule: &Schedule,
    now: DateTime<Utc>,
    last_run: Option<DateTime<Utc>>,
) -> bool {
    let check_from = last_run.unwrap_or(now - chrono::Duration::days(1));
    match schedule.after(&check_from).next() {
        Some(next) => next <= now,
        None => false,
    }
}

/// One schedule per frequency, evaluated against the time of the last tick.
pub struct AlertScheduler {
    schedules: Vec<(Frequency, Schedule)>,
}

impl AlertScheduler {
    pub fn new() -> Result<Self, NotifyError> {
        let schedules = Frequency::ALL
            .into_iter()
            .map(|freq| {
                let expr = normalize_cron(freq.cron_expr());
                Schedule::from_str(&expr)
                    .map(|schedule| (freq, schedule))
                    .map_err(|e| NotifyError::Config(format!("bad cron for {freq}: {e}")))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { schedules })
    }

    /// Frequencies with a scheduled time in `(last_tick, now]`.
    pub fn due_between(&self, last_tick: DateTime<Utc>, now: DateTime<Utc>) -> Vec<Frequency> {
        self.schedules
            .iter()
            .filter(|(_, schedule)| is_cron_due(schedule, now, Some(last_tick)))
            .map(|(freq, _)| *freq)
            .collect()
    }

    /// Next scheduled time for a frequency after `now`.
    pub fn next_run(&self, frequency: Frequency, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.schedules
            .iter()
            .find(|(f, _)| *f == frequency)
            .and_then(|(_, schedule)| schedule.after(&now).next())
    }

    /// Tick every `tick` until `shutdown` flips to true, running each
    /// frequency whose schedule came due since the previous tick.
    pub async fn run(
        &self,
        dispatcher: Arc<AlertDispatcher>,
        tick: Duration,
        mut shutdown: watch::Receiver<bool>,
    ) {
        let mut interval = tokio::time::interval(tick);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        let mut last_tick = Utc::now();

        for freq in Frequency::ALL {
            if let Some(next) = self.next_run(freq, last_tick) {
                info!(frequency = %freq, next = %next, "alert schedule armed");
            }
        }

        loop {
            tokio::select! {
                _ = interval.tick() => {}
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("alert scheduler stopping");
                        return;
                    }
                    continue;
                }
            }

            let now = Utc::now();
            let due = self.due_between(last_tick, now);
            last_tick = now;
            if due.is_empty() {
                debug!("no alert schedules due");
                continue;
            }

            for freq in due {
                if let Err(e) = dispatcher.process_frequency(freq).await {
                    error!(frequency = %freq, error = %e, "alert run failed");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn normalize_five_field() {
        assert_eq!(normalize_cron("0 8 * * Mon"), "0 0 8 * * Mon");
        assert_eq!(normalize_cron(" 0 0 8 * * * "), "0 0 8 * * *");
    }

    #[test]
    fn every_frequency_schedule_parses() {
        let scheduler = AlertScheduler::new().unwrap();
        assert_eq!(scheduler.schedules.len(), 3);
    }

    // 2025-06-02 is a Monday.
    #[test]
    fn monday_morning_runs_all_three() {
        let scheduler = AlertScheduler::new().unwrap();
        let due = scheduler.due_between(at(2025, 6, 2, 7, 59), at(2025, 6, 2, 8, 0));
        assert_eq!(due, vec![Frequency::Daily, Frequency::TwiceWeek, Frequency::Weekly]);
    }

    #[test]
    fn thursday_runs_daily_and_twice_week() {
        let scheduler = AlertScheduler::new().unwrap();
        let due = scheduler.due_between(at(2025, 6, 5, 7, 59), at(2025, 6, 5, 8, 1));
        assert_eq!(due, vec![Frequency::Daily, Frequency::TwiceWeek]);
    }

    #[test]
    fn tuesday_runs_daily_only() {
        let scheduler = AlertScheduler::new().unwrap();
        let due = scheduler.due_between(at(2025, 6, 3, 7, 59), at(2025, 6, 3, 8, 0));
        assert_eq!(due, vec![Frequency::Daily]);
    }

    #[test]
    fn nothing_due_outside_the_hour() {
        let scheduler = AlertScheduler::new().unwrap();
        assert!(scheduler
            .due_between(at(2025, 6, 2, 8, 0), at(2025, 6, 2, 9, 0))
            .is_empty());
    }

    #[test]
    fn next_weekly_run_is_monday() {
        let scheduler = AlertScheduler::new().unwrap();
        let next = scheduler
            .next_run(Frequency::Weekly, at(2025, 6, 3, 12, 0))
            .unwrap();
        assert_eq!(next, at(2025, 6, 9, 8, 0));
    }

    #[test]
    fn due_without_last_run_uses_one_day_window() {
        let schedule = Schedule::from_str(&normalize_cron("0 8 * * *")).unwrap();
        assert!(is_cron_due(&schedule, at(2025, 6, 3, 9, 0), None));
        assert!(!is_cron_due(
            &schedule,
            at(2025, 6, 3, 9, 0),
            Some(at(2025, 6, 3, 8, 30))
        ));
    }
}
