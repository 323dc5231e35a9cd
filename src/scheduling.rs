use std::str::FromStr;
use std::thread;
use std::time::Duration;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use cron::Schedule;
use log::info;
use thiserror::Error;

/// Longest single sleep, so a wall clock adjustment or a suspended host is caught up with
const MAX_SLEEP: Duration = Duration::from_secs(60);

/// A cron expression resolved against a named timezone
#[derive(Debug, Clone)]
pub struct Trigger {
    expression: String,
    schedule: Schedule,
    timezone: Tz,
}

impl Trigger {
    /// Parses a cron expression and a timezone name into a trigger.
    /// Standard 5-field expressions get their seconds pinned to zero.
    ///
    /// # Arguments
    ///
    /// * 'expression' - cron expression, e.g. "0 7 * * *"
    /// * 'timezone' - IANA timezone name, e.g. "America/Chicago"
    pub fn new(expression: &str, timezone: &str) -> Result<Trigger, SchedulingError> {
        let trimmed = expression.trim();
        let normalized = if trimmed.split_whitespace().count() == 5 {
            format!("0 {}", trimmed)
        } else {
            trimmed.to_string()
        };

        let schedule = Schedule::from_str(&normalized)
            .map_err(|e| SchedulingError::InvalidExpression(format!("{}: {}", expression, e)))?;
        let timezone = Tz::from_str(timezone)
            .map_err(|e| SchedulingError::InvalidTimezone(format!("{}: {}", timezone, e)))?;

        Ok(Trigger {
            expression: trimmed.to_string(),
            schedule,
            timezone,
        })
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// Returns the first fire time strictly after the given instant, as wall clock time
    /// in the trigger's timezone. The host's own timezone plays no part.
    ///
    /// # Arguments
    ///
    /// * 'after' - instant to search from
    pub fn next_after(&self, after: DateTime<Utc>) -> Option<DateTime<Tz>> {
        self.schedule.after(&after.with_timezone(&self.timezone)).next()
    }
}

/// Source of time for a timer
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;

    /// Blocks until the given instant has passed. Returns false if the clock
    /// will never get there, which ends the timer.
    fn sleep_until(&self, when: DateTime<Utc>) -> bool;
}

/// Clock backed by the system wall clock
#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn sleep_until(&self, when: DateTime<Utc>) -> bool {
        loop {
            let remaining = when - Utc::now();
            match remaining.to_std() {
                Ok(d) if !d.is_zero() => thread::sleep(d.min(MAX_SLEEP)),
                _ => return true,
            }
        }
    }
}

/// Something that runs a job each time a trigger fires
pub trait Timer {
    /// Registers the job with the trigger and keeps firing it for as long as the timer runs
    fn register(&self, trigger: &Trigger, job: &mut dyn FnMut()) -> Result<(), SchedulingError>;
}

/// Timer that sleeps between cron fire times and runs the job inline
#[derive(Debug)]
pub struct CronTimer<C: Clock> {
    clock: C,
}

impl<C: Clock> CronTimer<C> {
    pub fn new(clock: C) -> CronTimer<C> {
        CronTimer { clock }
    }
}

impl<C: Clock> Timer for CronTimer<C> {
    fn register(&self, trigger: &Trigger, job: &mut dyn FnMut()) -> Result<(), SchedulingError> {
        let mut last_fire: Option<DateTime<Utc>> = None;

        loop {
            // A job finishing within the second it fired must not fire twice
            let from = match last_fire {
                Some(last) => last.max(self.clock.now()),
                None => self.clock.now(),
            };

            let next = trigger.next_after(from)
                .ok_or_else(|| SchedulingError::NoUpcomingRun(trigger.expression.clone()))?;
            info!("Next run at {}", next.to_rfc3339());

            let next_utc = next.with_timezone(&Utc);
            if !self.clock.sleep_until(next_utc) {
                return Ok(());
            }

            last_fire = Some(next_utc);
            job();
        }
    }
}

/// Error depicting errors that occur while setting up or running the schedule
///
#[derive(Debug, Error)]
pub enum SchedulingError {
    #[error("InvalidExpression: {0}")]
    InvalidExpression(String),
    #[error("InvalidTimezone: {0}")]
    InvalidTimezone(String),
    #[error("NoUpcomingRun: {0} never fires")]
    NoUpcomingRun(String),
}
