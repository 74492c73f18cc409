use std::time::{Duration, Instant};

use chrono::{DateTime, Local, NaiveDate};

/// Wall-clock source, swappable in tests.
pub trait Clock {
    fn now(&self) -> DateTime<Local>;

    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// A fixed-period schedule the event loop polls.
///
/// Disarmed tickers never fire. Firing reports how many periods have passed
/// since the last fire, so a loop that stalled for three seconds still
/// delivers three ticks.
#[derive(Debug)]
pub struct Ticker {
    period: Duration,
    next_due: Option<Instant>,
}

impl Ticker {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            next_due: None,
        }
    }

    pub fn every_second() -> Self {
        Self::new(Duration::from_secs(1))
    }

    /// Start counting from `now`. Re-arming an armed ticker keeps its phase.
    pub fn arm(&mut self, now: Instant) {
        if self.next_due.is_none() {
            self.next_due = Some(now + self.period);
        }
    }

    pub fn cancel(&mut self) {
        self.next_due = None;
    }

    pub fn is_armed(&self) -> bool {
        self.next_due.is_some()
    }

    /// Number of periods elapsed by `now`, advancing the schedule past them.
    pub fn fire(&mut self, now: Instant) -> u32 {
        let Some(mut due) = self.next_due else {
            return 0;
        };
        let mut fired = 0;
        while due <= now {
            fired += 1;
            due += self.period;
        }
        self.next_due = Some(due);
        fired
    }

    /// Time until the next fire, `None` when disarmed.
    pub fn time_until(&self, now: Instant) -> Option<Duration> {
        self.next_due.map(|due| due.saturating_duration_since(now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disarmed_ticker_never_fires() {
        let mut ticker = Ticker::every_second();
        let now = Instant::now();
        assert_eq!(ticker.fire(now + Duration::from_secs(10)), 0);
        assert_eq!(ticker.time_until(now), None);
    }

    #[test]
    fn fires_once_per_elapsed_period() {
        let mut ticker = Ticker::every_second();
        let start = Instant::now();
        ticker.arm(start);

        assert_eq!(ticker.fire(start + Duration::from_millis(999)), 0);
        assert_eq!(ticker.fire(start + Duration::from_millis(1000)), 1);
        assert_eq!(ticker.fire(start + Duration::from_millis(4500)), 3);
        assert_eq!(
            ticker.time_until(start + Duration::from_millis(4500)),
            Some(Duration::from_millis(500))
        );
    }

    #[test]
    fn cancel_stops_ticking() {
        let mut ticker = Ticker::every_second();
        let start = Instant::now();
        ticker.arm(start);
        ticker.cancel();
        assert!(!ticker.is_armed());
        assert_eq!(ticker.fire(start + Duration::from_secs(5)), 0);
    }

    #[test]
    fn rearming_keeps_phase() {
        let mut ticker = Ticker::every_second();
        let start = Instant::now();
        ticker.arm(start);
        ticker.arm(start + Duration::from_millis(600));
        assert_eq!(ticker.fire(start + Duration::from_secs(1)), 1);
    }

    #[test]
    fn system_clock_today_matches_now() {
        let clock = SystemClock;
        let now = clock.now();
        let today = clock.today();
        // Allow for crossing midnight between the two reads.
        assert!(today == now.date_naive() || today == now.date_naive().succ_opt().unwrap());
    }
}
