use chrono::{DateTime, Local};
use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::{debug, info};

pub const DEFAULT_SYNC_DELAY_MS: u64 = 1200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMode {
    Simulated,
    Off,
}

impl SyncMode {
    pub fn as_str(self) -> &'static str {
        match self {
            SyncMode::Simulated => "simulated",
            SyncMode::Off => "off",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "simulated" => Some(SyncMode::Simulated),
            "off" => Some(SyncMode::Off),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncStatus {
    pub mode: &'static str,
    pub syncing: bool,
    pub last_sync: Option<String>,
}

/// Notification port fired after every store mutation. Implementations
/// must not block; the daemon polls them between requests.
pub trait SyncPort {
    fn mode(&self) -> SyncMode;
    fn trigger(&mut self, now: Instant);
    /// Marks the port as synced without a pending delay.
    fn mark_synced(&mut self);
    fn poll(&mut self, now: Instant) -> SyncStatus;
}

/// Cosmetic stand-in for a cloud push: busy for `delay`, then stamps the
/// local time. Nothing leaves the machine.
pub struct SimulatedSync {
    delay: Duration,
    pending_until: Option<Instant>,
    last_sync: Option<String>,
}

impl SimulatedSync {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending_until: None,
            last_sync: None,
        }
    }
}

fn clock_label(now: DateTime<Local>) -> String {
    now.format("%H:%M:%S").to_string()
}

impl SyncPort for SimulatedSync {
    fn mode(&self) -> SyncMode {
        SyncMode::Simulated
    }

    fn trigger(&mut self, now: Instant) {
        debug!(delay_ms = self.delay.as_millis() as u64, "sync scheduled");
        self.pending_until = Some(now + self.delay);
    }

    fn mark_synced(&mut self) {
        self.pending_until = None;
        self.last_sync = Some(clock_label(Local::now()));
    }

    fn poll(&mut self, now: Instant) -> SyncStatus {
        if let Some(deadline) = self.pending_until {
            if now >= deadline {
                self.pending_until = None;
                self.last_sync = Some(clock_label(Local::now()));
                info!("records synchronised (simulated)");
            }
        }
        SyncStatus {
            mode: self.mode().as_str(),
            syncing: self.pending_until.is_some(),
            last_sync: self.last_sync.clone(),
        }
    }
}

#[derive(Default)]
pub struct NoopSync;

impl SyncPort for NoopSync {
    fn mode(&self) -> SyncMode {
        SyncMode::Off
    }

    fn trigger(&mut self, _now: Instant) {}

    fn mark_synced(&mut self) {}

    fn poll(&mut self, _now: Instant) -> SyncStatus {
        SyncStatus {
            mode: self.mode().as_str(),
            syncing: false,
            last_sync: None,
        }
    }
}

pub fn build_port(mode: SyncMode, delay: Duration) -> Box<dyn SyncPort> {
    match mode {
        SyncMode::Simulated => Box::new(SimulatedSync::new(delay)),
        SyncMode::Off => Box::new(NoopSync),
    }
}
