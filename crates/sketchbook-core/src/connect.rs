//! Bounded-retry network bring-up
//!
//! The station is told to join once, then its status is polled at a fixed
//! interval until it reports connected or the deadline passes. A timeout is
//! not fatal: the caller keeps running with network-dependent features
//! switched off.

use core::net::Ipv4Addr;

use embedded_hal_async::delay::DelayNs;
use log::{info, warn};

use crate::config::{ConnectConfig, WifiCredentials};
use crate::traits::{Clock, WifiStation};

/// Result of one bounded connect attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectOutcome {
    Connected {
        ip: Option<Ipv4Addr>,
        checks: u32,
        elapsed_ms: u64,
    },
    TimedOut {
        checks: u32,
        elapsed_ms: u64,
    },
    /// The station refused to start the attempt
    BeginFailed(&'static str),
}

/// What the program runs as after bring-up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Online,
    Degraded,
}

impl ConnectOutcome {
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected { .. })
    }

    /// Number of status checks performed
    pub fn checks(&self) -> u32 {
        match *self {
            Self::Connected { checks, .. } | Self::TimedOut { checks, .. } => checks,
            Self::BeginFailed(_) => 0,
        }
    }

    /// Run `dependent_init` only when connected.
    pub fn then_init<F>(self, dependent_init: F) -> Mode
    where
        F: FnOnce(Option<Ipv4Addr>),
    {
        match self {
            Self::Connected { ip, .. } => {
                dependent_init(ip);
                Mode::Online
            }
            Self::TimedOut { .. } | Self::BeginFailed(_) => {
                warn!("Skipping network-dependent initialization");
                Mode::Degraded
            }
        }
    }
}

/// Join `credentials` on `station`, waiting at most `config.deadline_ms`.
///
/// `on_poll` is called once per check, after the sleep and before the status
/// is read, with the number of checks done so far.
pub async fn connect_with_timeout<S, C, D, F>(
    station: &mut S,
    clock: &C,
    delay: &mut D,
    credentials: &WifiCredentials<'_>,
    config: &ConnectConfig,
    mut on_poll: F,
) -> ConnectOutcome
where
    S: WifiStation,
    C: Clock,
    D: DelayNs,
    F: FnMut(u32),
{
    let start = clock.now_ms();
    let interval = config.poll_interval_ms.clamp(1, u32::MAX as u64) as u32;

    info!("Connecting to '{}'", credentials.ssid);
    if let Err(e) = station.begin(credentials.ssid, credentials.password) {
        warn!("Could not start connection attempt: {}", e);
        return ConnectOutcome::BeginFailed(e);
    }

    let mut checks = 0u32;
    loop {
        delay.delay_ms(interval).await;
        on_poll(checks);
        checks += 1;

        let elapsed_ms = clock.now_ms().wrapping_sub(start);

        if station.is_connected() {
            let ip = station.local_ip();
            match ip {
                Some(addr) => info!("WiFi connected, IP: {} ({} checks)", addr, checks),
                None => info!("WiFi connected ({} checks)", checks),
            }
            return ConnectOutcome::Connected {
                ip,
                checks,
                elapsed_ms,
            };
        }

        if elapsed_ms >= config.deadline_ms {
            warn!(
                "WiFi connection FAILED after {} ms ({} checks)",
                elapsed_ms, checks
            );
            return ConnectOutcome::TimedOut { checks, elapsed_ms };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;
    use embassy_futures::block_on;

    struct SimClock<'a>(&'a Cell<u64>);

    impl Clock for SimClock<'_> {
        fn now_ms(&self) -> u64 {
            self.0.get()
        }
    }

    /// Sleeping advances simulated time
    struct SimDelay<'a>(&'a Cell<u64>);

    impl DelayNs for SimDelay<'_> {
        async fn delay_ns(&mut self, ns: u32) {
            self.0.set(self.0.get() + (ns as u64).div_ceil(1_000_000));
        }

        async fn delay_ms(&mut self, ms: u32) {
            self.0.set(self.0.get() + ms as u64);
        }
    }

    struct FakeStation<'a> {
        now: &'a Cell<u64>,
        connects_at: Option<u64>,
        begin_calls: u32,
        status_polls: u32,
        refuse_begin: bool,
    }

    impl<'a> FakeStation<'a> {
        fn new(now: &'a Cell<u64>, connects_at: Option<u64>) -> Self {
            Self {
                now,
                connects_at,
                begin_calls: 0,
                status_polls: 0,
                refuse_begin: false,
            }
        }
    }

    impl WifiStation for FakeStation<'_> {
        fn begin(&mut self, _ssid: &str, _password: &str) -> Result<(), &'static str> {
            self.begin_calls += 1;
            if self.refuse_begin {
                Err("radio not started")
            } else {
                Ok(())
            }
        }

        fn is_connected(&mut self) -> bool {
            self.status_polls += 1;
            matches!(self.connects_at, Some(t) if self.now.get() >= t)
        }

        fn local_ip(&self) -> Option<Ipv4Addr> {
            Some(Ipv4Addr::new(192, 168, 1, 42))
        }
    }

    fn credentials() -> WifiCredentials<'static> {
        WifiCredentials::new("HomeNetwork", "password123").unwrap()
    }

    fn run(station: &mut FakeStation<'_>, now: &Cell<u64>, config: ConnectConfig) -> (ConnectOutcome, u32) {
        let clock = SimClock(now);
        let mut delay = SimDelay(now);
        let mut dots = 0;
        let outcome = block_on(connect_with_timeout(
            station,
            &clock,
            &mut delay,
            &credentials(),
            &config,
            |_| dots += 1,
        ));
        (outcome, dots)
    }

    #[test]
    fn test_connects_at_3200_after_seven_checks() {
        let now = Cell::new(0);
        let mut station = FakeStation::new(&now, Some(3_200));
        let (outcome, dots) = run(&mut station, &now, ConnectConfig::default());

        assert_eq!(
            outcome,
            ConnectOutcome::Connected {
                ip: Some(Ipv4Addr::new(192, 168, 1, 42)),
                checks: 7,
                elapsed_ms: 3_500,
            }
        );
        assert_eq!(dots, 7);
        assert_eq!(station.begin_calls, 1);

        let mut init_ran = false;
        assert_eq!(outcome.then_init(|_| init_ran = true), Mode::Online);
        assert!(init_ran);
    }

    #[test]
    fn test_never_connects_gives_up_after_thirty_checks() {
        let now = Cell::new(0);
        let mut station = FakeStation::new(&now, None);
        let (outcome, _) = run(&mut station, &now, ConnectConfig::default());

        assert_eq!(
            outcome,
            ConnectOutcome::TimedOut {
                checks: 30,
                elapsed_ms: 15_000,
            }
        );
        assert_eq!(station.status_polls, 30);

        let mut init_ran = false;
        assert_eq!(outcome.then_init(|_| init_ran = true), Mode::Degraded);
        assert!(!init_ran);
    }

    #[test]
    fn test_stops_at_first_connected_check() {
        let now = Cell::new(0);
        let mut station = FakeStation::new(&now, Some(500));
        let (outcome, _) = run(&mut station, &now, ConnectConfig::default());

        assert_eq!(outcome.checks(), 1);
        assert_eq!(station.status_polls, 1);
        assert_eq!(now.get(), 500);
    }

    #[test]
    fn test_check_count_bounded_by_deadline_over_interval() {
        for (deadline_ms, poll_interval_ms) in [(1_000, 300), (15_000, 500), (2_000, 700), (999, 1)] {
            let now = Cell::new(0);
            let mut station = FakeStation::new(&now, None);
            let config = ConnectConfig {
                deadline_ms,
                poll_interval_ms,
            };
            let (outcome, _) = run(&mut station, &now, config);

            let bound = deadline_ms.div_ceil(poll_interval_ms) as u32;
            assert!(!outcome.is_connected());
            assert!(outcome.checks() <= bound, "{} > {}", outcome.checks(), bound);
            assert_eq!(outcome.checks(), bound);
        }
    }

    #[test]
    fn test_begin_failure_is_degraded() {
        let now = Cell::new(0);
        let mut station = FakeStation::new(&now, Some(0));
        station.refuse_begin = true;
        let (outcome, dots) = run(&mut station, &now, ConnectConfig::default());

        assert_eq!(outcome, ConnectOutcome::BeginFailed("radio not started"));
        assert_eq!(dots, 0);
        assert_eq!(station.status_polls, 0);
        assert_eq!(outcome.then_init(|_| panic!("must be skipped")), Mode::Degraded);
    }
}
