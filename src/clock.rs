use time::OffsetDateTime;

/// Time source injected into every service so timestamps are an explicit,
/// testable input rather than an ambient read.
pub trait Clock: Send + Sync {
    fn now(&self) -> OffsetDateTime;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

#[cfg(test)]
pub mod test {
    use std::sync::Mutex;

    use time::{Duration, OffsetDateTime};

    use super::Clock;

    /// Settable clock for deterministic tests.
    pub struct TestClock {
        now: Mutex<OffsetDateTime>,
    }

    impl TestClock {
        pub fn at(now: OffsetDateTime) -> Self {
            Self { now: Mutex::new(now) }
        }

        pub fn set(&self, now: OffsetDateTime) {
            *self.now.lock().unwrap() = now;
        }

        pub fn advance(&self, by: Duration) {
            let mut now = self.now.lock().unwrap();
            *now += by;
        }
    }

    impl Clock for TestClock {
        fn now(&self) -> OffsetDateTime {
            *self.now.lock().unwrap()
        }
    }
}
