//! Server-corrected clock.
//!
//! Keeps a reference pair (monotonic instant, corrected wall time) taken at the
//! last resync and extrapolates from it with the monotonic source only, so a
//! device wall-clock step (NTP, DST, manual change) never moves `now()` between
//! resyncs.

use std::time::{Instant, SystemTime, UNIX_EPOCH};

/// Device clocks consumed by [`ClockSync`].
pub trait TimeSource {
    /// Device wall clock, unix milliseconds. May jump in either direction.
    fn wall_ms(&self) -> i64;
    /// Monotonic milliseconds since an arbitrary origin. Never regresses.
    fn monotonic_ms(&self) -> f64;
}

/// `SystemTime` for the wall clock, `Instant` for the monotonic clock.
pub struct SystemTimeSource {
    origin: Instant,
}

impl SystemTimeSource {
    pub fn new() -> Self {
        Self { origin: Instant::now() }
    }
}

impl Default for SystemTimeSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for SystemTimeSource {
    fn wall_ms(&self) -> i64 {
        match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(d) => d.as_millis() as i64,
            // Clock set before 1970
            Err(e) => -(e.duration().as_millis() as i64),
        }
    }

    fn monotonic_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClockState {
    pub server_skew_ms: i64,
    pub reference_monotonic_ms: f64,
    pub reference_wall_ms: i64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncStatus {
    Unsynced,
    Syncing,
    Synced,
    SyncFailed,
}

impl SyncStatus {
    pub fn label(&self) -> &'static str {
        match self {
            SyncStatus::Unsynced => "Unsynced",
            SyncStatus::Syncing => "Syncing...",
            SyncStatus::Synced => "Synced",
            SyncStatus::SyncFailed => "Sync failed",
        }
    }
}

pub struct ClockSync<S: TimeSource = SystemTimeSource> {
    source: S,
    state: ClockState,
    status: SyncStatus,
    in_flight: bool,
}

impl<S: TimeSource> ClockSync<S> {
    /// Unsynced clock: device wall time, zero skew.
    pub fn new(source: S) -> Self {
        let state = ClockState {
            server_skew_ms: 0,
            reference_monotonic_ms: source.monotonic_ms(),
            reference_wall_ms: source.wall_ms(),
        };
        Self {
            source,
            state,
            status: SyncStatus::Unsynced,
            in_flight: false,
        }
    }

    /// Corrected unix milliseconds.
    pub fn now(&self) -> i64 {
        let elapsed = (self.source.monotonic_ms() - self.state.reference_monotonic_ms).max(0.0);
        self.state.reference_wall_ms + elapsed as i64
    }

    /// Mark a sync request as started. Returns false (and changes nothing) if
    /// one is already in flight; overlapping attempts are dropped.
    pub fn begin_sync(&mut self) -> bool {
        if self.in_flight {
            return false;
        }
        self.in_flight = true;
        self.status = SyncStatus::Syncing;
        true
    }

    /// Rebase on a server timestamp. Safe to call repeatedly; each call
    /// replaces the previous reference point outright.
    pub fn resync(&mut self, server_unix_ms: i64) {
        let skew = server_unix_ms - self.source.wall_ms();
        self.state = ClockState {
            server_skew_ms: skew,
            reference_monotonic_ms: self.source.monotonic_ms(),
            reference_wall_ms: self.source.wall_ms() + skew,
        };
        self.status = SyncStatus::Synced;
        self.in_flight = false;
        log::debug!("clock resynced, skew {} ms", skew);
    }

    /// Record a failed sync. The reference point is left untouched.
    pub fn fail_sync(&mut self) {
        self.status = SyncStatus::SyncFailed;
        self.in_flight = false;
    }

    pub fn status(&self) -> SyncStatus {
        self.status
    }

    pub fn state(&self) -> ClockState {
        self.state
    }

    /// Skew rounded to whole seconds.
    pub fn offset_seconds(&self) -> i64 {
        (self.state.server_skew_ms as f64 / 1000.0).round() as i64
    }

    /// Second status line: `offset +3s`, or a hint after a failure.
    pub fn offset_label(&self) -> String {
        match self.status {
            SyncStatus::SyncFailed => "check server".to_string(),
            SyncStatus::Unsynced => "offset --".to_string(),
            _ => {
                let secs = self.offset_seconds();
                let sign = if secs >= 0 { "+" } else { "" };
                format!("offset {sign}{secs}s")
            }
        }
    }
}

impl Default for ClockSync<SystemTimeSource> {
    fn default() -> Self {
        Self::new(SystemTimeSource::new())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    /// Hand-driven clocks shared between the test and the `ClockSync` under test.
    #[derive(Clone, Default)]
    pub(crate) struct ManualTime {
        wall: Rc<Cell<i64>>,
        mono: Rc<Cell<f64>>,
    }

    impl ManualTime {
        pub(crate) fn at(wall: i64) -> Self {
            let t = Self::default();
            t.wall.set(wall);
            t
        }

        /// Both clocks move forward together.
        pub(crate) fn advance(&self, ms: i64) {
            self.wall.set(self.wall.get() + ms);
            self.mono.set(self.mono.get() + ms as f64);
        }

        /// Only the wall clock moves (NTP step, manual change).
        pub(crate) fn step_wall(&self, ms: i64) {
            self.wall.set(self.wall.get() + ms);
        }
    }

    impl TimeSource for ManualTime {
        fn wall_ms(&self) -> i64 {
            self.wall.get()
        }

        fn monotonic_ms(&self) -> f64 {
            self.mono.get()
        }
    }

    #[test]
    fn unsynced_clock_follows_device() {
        let time = ManualTime::at(1_000_000);
        let clock = ClockSync::new(time.clone());
        assert_eq!(clock.now(), 1_000_000);
        assert_eq!(clock.status(), SyncStatus::Unsynced);
        time.advance(250);
        assert_eq!(clock.now(), 1_000_250);
    }

    #[test]
    fn resync_applies_server_time() {
        let time = ManualTime::at(1_000_000);
        let mut clock = ClockSync::new(time.clone());
        time.advance(10);
        clock.resync(1_003_010);
        assert_eq!(clock.now(), 1_003_010);
        assert_eq!(clock.state().server_skew_ms, 3_000);
        assert_eq!(clock.offset_seconds(), 3);
        assert_eq!(clock.offset_label(), "offset +3s");
        time.advance(1_000);
        assert_eq!(clock.now(), 1_004_010);
    }

    #[test]
    fn negative_offset_label() {
        let time = ManualTime::at(50_000);
        let mut clock = ClockSync::new(time);
        clock.resync(47_600);
        assert_eq!(clock.offset_seconds(), -2);
        assert_eq!(clock.offset_label(), "offset -2s");
    }

    #[test]
    fn wall_clock_step_does_not_move_now() {
        let time = ManualTime::at(1_000_000);
        let mut clock = ClockSync::new(time.clone());
        clock.resync(1_000_000);
        time.advance(500);
        let before = clock.now();
        time.step_wall(-3_600_000);
        assert_eq!(clock.now(), before);
        time.advance(500);
        assert_eq!(clock.now(), before + 500);
    }

    #[test]
    fn duplicate_resync_does_not_accumulate() {
        let time = ManualTime::at(10_000);
        let mut clock = ClockSync::new(time.clone());
        clock.resync(12_000);
        clock.resync(12_000);
        assert_eq!(clock.state().server_skew_ms, 2_000);
        assert_eq!(clock.now(), 12_000);
    }

    #[test]
    fn failed_sync_keeps_reference_point() {
        let time = ManualTime::at(5_000);
        let mut clock = ClockSync::new(time.clone());
        clock.resync(9_000);
        let state = clock.state();

        assert!(clock.begin_sync());
        assert_eq!(clock.status(), SyncStatus::Syncing);
        clock.fail_sync();

        assert_eq!(clock.status(), SyncStatus::SyncFailed);
        assert_eq!(clock.state(), state);
        assert_eq!(clock.offset_label(), "check server");
        time.advance(2_000);
        assert_eq!(clock.now(), 11_000);
    }

    #[test]
    fn overlapping_sync_is_dropped() {
        let mut clock = ClockSync::new(ManualTime::at(0));
        assert!(clock.begin_sync());
        assert!(!clock.begin_sync());
        clock.resync(100);
        assert!(clock.begin_sync());
    }

    #[test]
    fn system_clock_is_monotonic() {
        let clock = ClockSync::default();
        let mut last = clock.now();
        for _ in 0..1_000 {
            let next = clock.now();
            assert!(next >= last);
            last = next;
        }
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn now_never_decreases(steps in proptest::collection::vec((0i64..5_000, -100_000i64..100_000), 1..50)) {
                let time = ManualTime::at(1_700_000_000_000);
                let mut clock = ClockSync::new(time.clone());
                clock.resync(1_700_000_004_000);
                let mut last = clock.now();
                for (advance, wall_step) in steps {
                    time.advance(advance);
                    time.step_wall(wall_step);
                    let next = clock.now();
                    prop_assert!(next >= last);
                    last = next;
                }
            }
        }
    }
}
