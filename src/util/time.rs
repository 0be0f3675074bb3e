//! Time utilities for the game loop

use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// Get current Unix timestamp in milliseconds
pub fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::ZERO)
        .as_millis() as u64
}

/// Server start time for uptime tracking
static SERVER_START: std::sync::OnceLock<Instant> = std::sync::OnceLock::new();

/// Initialize server start time (call once at startup)
pub fn init_server_time() {
    SERVER_START.get_or_init(Instant::now);
}

/// Get server uptime in seconds
pub fn uptime_secs() -> u64 {
    SERVER_START
        .get()
        .map(|start| start.elapsed().as_secs())
        .unwrap_or(0)
}

/// Tick rate configuration: one simulation step per animation frame
pub const SIMULATION_TPS: u32 = 60;
pub const SNAPSHOT_TPS: u32 = 60;

/// Fixed wall time assigned to each simulation tick
pub fn tick_delta() -> Duration {
    Duration::from_micros(1_000_000 / SIMULATION_TPS as u64)
}

/// Ticks between outgoing snapshots
pub fn snapshot_interval() -> u32 {
    (SIMULATION_TPS / SNAPSHOT_TPS).max(1)
}
