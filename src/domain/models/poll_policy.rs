#[cfg(test)]
#[path = "poll_policy_test.rs"]
mod tests;

use std::time::Duration;

use anyhow::bail;
use anyhow::Result;
use strum::EnumIter;
use strum::EnumVariantNames;
use strum::IntoEnumIterator;

#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, EnumVariantNames, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Backoff {
    Fixed,
    Exponential,
}

impl Backoff {
    pub fn parse(text: &str) -> Option<Backoff> {
        return Backoff::iter().find(|e| return e.to_string() == text);
    }
}

/// Governs how often a run is re-checked and when waiting gives up.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub backoff: Backoff,
    pub max_interval: Duration,
    /// `None` polls forever.
    pub max_attempts: Option<u32>,
    /// `None` waits forever.
    pub max_elapsed: Option<Duration>,
    /// Emit a reminder every N polls. `None` never reminds.
    pub reminder_every: Option<u32>,
}

impl Default for PollPolicy {
    fn default() -> PollPolicy {
        return PollPolicy {
            interval: Duration::from_millis(2000),
            backoff: Backoff::Fixed,
            max_interval: Duration::from_millis(30000),
            max_attempts: None,
            max_elapsed: Some(Duration::from_millis(600000)),
            reminder_every: Some(10),
        };
    }
}

fn parse_u64(name: &str, value: &str) -> Result<u64> {
    return match value.trim().parse::<u64>() {
        Ok(parsed) => Ok(parsed),
        Err(_) => bail!(format!("{name} must be a whole number, got '{value}'")),
    };
}

fn parse_u32(name: &str, value: &str) -> Result<u32> {
    return match u32::try_from(parse_u64(name, value)?) {
        Ok(parsed) => Ok(parsed),
        Err(_) => bail!(format!("{name} must be at most {}, got '{value}'", u32::MAX)),
    };
}

/// Zero means "no bound".
fn non_zero<T: Default + PartialEq>(value: T) -> Option<T> {
    if value == T::default() {
        return None;
    }
    return Some(value);
}

impl PollPolicy {
    /// Builds a policy from raw configuration strings. Durations are in
    /// milliseconds, and a zero bound disables that bound.
    pub fn parse(
        interval: &str,
        backoff: &str,
        max_interval: &str,
        max_attempts: &str,
        max_elapsed: &str,
        reminder_every: &str,
    ) -> Result<PollPolicy> {
        let backoff = match Backoff::parse(backoff) {
            Some(backoff) => backoff,
            None => bail!(format!("Unknown poll backoff '{backoff}'")),
        };

        return Ok(PollPolicy {
            interval: Duration::from_millis(parse_u64("poll-interval", interval)?),
            backoff,
            max_interval: Duration::from_millis(parse_u64(
                "poll-max-interval",
                max_interval,
            )?),
            max_attempts: non_zero(parse_u32("poll-max-attempts", max_attempts)?),
            max_elapsed: non_zero(parse_u64("poll-max-elapsed", max_elapsed)?)
                .map(Duration::from_millis),
            reminder_every: non_zero(parse_u32(
                "poll-reminder-every",
                reminder_every,
            )?),
        });
    }

    /// An unbounded policy that polls at a fixed interval without reminders.
    pub fn unbounded(interval: Duration) -> PollPolicy {
        return PollPolicy {
            interval,
            backoff: Backoff::Fixed,
            max_interval: interval,
            max_attempts: None,
            max_elapsed: None,
            reminder_every: None,
        };
    }

    /// Delay to wait after the given 1-based attempt before polling again.
    pub fn delay(&self, attempt: u32) -> Duration {
        match self.backoff {
            Backoff::Fixed => return self.interval,
            Backoff::Exponential => {
                let exponent = attempt.saturating_sub(1).min(31);
                let delay = self.interval.saturating_mul(1u32 << exponent);
                return delay.min(self.max_interval.max(self.interval));
            }
        }
    }

    pub fn is_exhausted(&self, attempts: u32, elapsed: Duration) -> bool {
        if let Some(max_attempts) = self.max_attempts {
            if attempts >= max_attempts {
                return true;
            }
        }

        if let Some(max_elapsed) = self.max_elapsed {
            if elapsed >= max_elapsed {
                return true;
            }
        }

        return false;
    }

    pub fn is_reminder(&self, attempt: u32) -> bool {
        return match self.reminder_every {
            Some(every) => attempt > 0 && attempt % every == 0,
            None => false,
        };
    }
}
