use rand::Rng;
use std::time::Duration;

use crate::cancel::CancellationToken;
use crate::config::LineSettings;

/// Shortest gap between two firings, whatever the range says
const MIN_REARM: Duration = Duration::from_millis(1);

/// Closed range a spawn delay is drawn from
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DelayRange {
    min: Duration,
    max: Duration,
}

impl DelayRange {
    pub fn new(min: Duration, max: Duration) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    pub fn min(&self) -> Duration {
        self.min
    }

    pub fn max(&self) -> Duration {
        self.max
    }

    pub fn contains(&self, d: Duration) -> bool {
        (self.min..=self.max).contains(&d)
    }

    /// Uniform sample in `[min, max]`
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        let secs = rng.gen_range(self.min.as_secs_f64()..=self.max.as_secs_f64());
        Duration::from_secs_f64(secs).clamp(self.min, self.max)
    }
}

impl From<&LineSettings> for DelayRange {
    fn from(s: &LineSettings) -> Self {
        DelayRange::new(
            Duration::from_millis(s.interval_min_ms),
            Duration::from_millis(s.interval_max_ms),
        )
    }
}

/// Self-rescheduling timer: after each firing the next delay is re-sampled
#[derive(Debug)]
pub struct Scheduler {
    range: DelayRange,
    next_due: Option<Duration>,
    token: CancellationToken,
}

impl Scheduler {
    pub fn new(range: DelayRange, token: CancellationToken) -> Self {
        Self {
            range,
            next_due: None,
            token,
        }
    }

    pub fn range(&self) -> DelayRange {
        self.range
    }

    pub fn next_due(&self) -> Option<Duration> {
        self.next_due
    }

    pub fn is_stopped(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn stop(&mut self) {
        self.token.cancel();
        self.next_due = None;
    }

    /// Arm the first firing one sampled delay after `now`
    pub fn start<R: Rng + ?Sized>(&mut self, now: Duration, rng: &mut R) {
        if self.is_stopped() {
            return;
        }
        self.next_due = Some(now + self.range.sample(rng));
    }

    /// Due times of the firings that elapsed up to `now`; re-arms after each one
    pub fn poll<R: Rng + ?Sized>(&mut self, now: Duration, rng: &mut R) -> Vec<Duration> {
        if self.is_stopped() {
            self.next_due = None;
            return Vec::new();
        }

        let mut fired = Vec::new();
        while let Some(due) = self.next_due {
            if due > now {
                break;
            }
            fired.push(due);
            let delay = self.range.sample(rng).max(MIN_REARM);
            self.next_due = Some(due + delay);
        }
        fired
    }

    /// Successive delays the loop would wait, for bounded runs
    pub fn delays<'a, R: Rng + ?Sized>(
        &'a self,
        rng: &'a mut R,
    ) -> impl Iterator<Item = Duration> + 'a {
        std::iter::repeat_with(move || self.range.sample(&mut *rng))
    }
}
