use embassy_time::{Duration, Instant, Timer};
use reporter_core::traits::{Sleeper, WallClock};
use reporter_core::Timestamp;

/// Wall clock derived from uptime plus the Unix time at boot.
///
/// Until [`SystemClock::set_unix_time`] is called the boot time is the Unix
/// epoch, so timestamps read as 1970-01-01 plus uptime.
#[derive(Debug, Default)]
pub struct SystemClock {
    boot_unix_secs: u64,
}

impl SystemClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_unix_time(&mut self, unix_secs: u64) {
        self.boot_unix_secs = unix_secs.saturating_sub(Instant::now().as_secs());
    }

    pub fn unix_time(&self) -> u64 {
        self.boot_unix_secs + Instant::now().as_secs()
    }
}

impl WallClock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::from_unix_secs(self.unix_time())
    }
}

pub struct TimerSleeper;

impl Sleeper for TimerSleeper {
    async fn sleep(&mut self, duration: Duration) {
        Timer::after(duration).await;
    }
}
