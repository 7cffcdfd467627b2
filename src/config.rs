use std::time::Duration;

pub struct Config {
    /// Upper bound for a single pull. An expired pull is reported as a failed refresh.
    pub refresh_timeout: Duration,
    /// When set, a refresh requested while another one is running is skipped.
    pub guard_concurrent_refresh: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            refresh_timeout: Duration::from_secs(30),
            guard_concurrent_refresh: true,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn refresh_timeout(mut self, timeout: Duration) -> Self {
        self.refresh_timeout = timeout;
        self
    }

    pub fn guard_concurrent_refresh(mut self, guard: bool) -> Self {
        self.guard_concurrent_refresh = guard;
        self
    }
}
