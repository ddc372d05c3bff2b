//! Fixed-window SLA rate limiting
//!
//! One counter per `(client, zone)` pair. The window is anchored at the
//! zone's first request and resets strictly every 60 seconds; the count
//! saturates at the configured cap, so a client hammering past its SLA
//! cannot widen the window's allowance.

use std::time::{Duration, Instant};

use dashmap::DashMap;

const WINDOW: Duration = Duration::from_secs(60);

/// Outcome of a zone acquisition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acquire {
    Allowed { remaining: u32 },
    Denied { retry_after_secs: u64 },
}

#[derive(Debug)]
struct ZoneCounter {
    window_start: Instant,
    count: u32,
}

/// Per-zone fixed-window request counters.
///
/// The map's entry guard serializes concurrent updates to the same zone
/// key while leaving unrelated zones uncontended; there is no lock shared
/// across zones.
#[derive(Debug, Default)]
pub struct RateLimiter {
    zones: DashMap<String, ZoneCounter>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self {
            zones: DashMap::new(),
        }
    }

    /// Acquire one request slot for `(client, zone)` under a `per_minute`
    /// SLA. The first `per_minute` requests of a window are allowed; every
    /// further request in that window is denied without reaching upstream.
    pub fn try_acquire(&self, client: &str, zone: &str, per_minute: u32) -> Acquire {
        self.try_acquire_at(&zone_key(client, zone), per_minute, Instant::now())
    }

    fn try_acquire_at(&self, key: &str, per_minute: u32, now: Instant) -> Acquire {
        let mut zone = self
            .zones
            .entry(key.to_string())
            .or_insert_with(|| ZoneCounter {
                window_start: now,
                count: 0,
            });

        let elapsed = now.saturating_duration_since(zone.window_start);

        if elapsed >= WINDOW {
            zone.window_start = now;
            zone.count = 1;
            return Acquire::Allowed {
                remaining: per_minute.saturating_sub(1),
            };
        }

        if zone.count < per_minute {
            zone.count += 1;
            Acquire::Allowed {
                remaining: per_minute - zone.count,
            }
        } else {
            // Count stays at the cap.
            Acquire::Denied {
                retry_after_secs: (WINDOW - elapsed).as_secs().max(1),
            }
        }
    }
}

fn zone_key(client: &str, zone: &str) -> String {
    format!("{}:{}", client, zone)
}
