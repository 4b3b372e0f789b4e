//! Prometheus-compatible metrics
//!
//! Counters for the marketplace API and the Dash mini-game, rendered as
//! Prometheus text (`/metrics`) or JSON (`/metrics/json`).

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use parking_lot::RwLock;

use crate::game::state::EndReason;

/// Samples kept for tick-time percentiles
const TICK_HISTORY: usize = 1000;

/// Metrics registry
#[derive(Debug)]
pub struct Metrics {
    // HTTP
    pub http_requests: AtomicU64,
    pub http_errors: AtomicU64,

    // Marketplace totals
    pub users_total: AtomicU64,
    pub listings_total: AtomicU64,
    pub bookings_total: AtomicU64,

    // Dash sessions
    pub dash_sessions_started: AtomicU64,
    pub dash_sessions_time_expired: AtomicU64,
    pub dash_sessions_bomb_hit: AtomicU64,
    pub dash_rewards_caught: AtomicU64,
    pub dash_discounts_awarded: AtomicU64,

    // Tick timing (microseconds)
    pub tick_count: AtomicU64,
    pub tick_time_us: AtomicU64,
    pub tick_time_p95_us: AtomicU64,
    pub tick_time_p99_us: AtomicU64,
    pub tick_time_max_us: AtomicU64,

    start_time: Instant,

    // Rolling tick times for percentile calculation
    tick_history: RwLock<VecDeque<u64>>,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            http_requests: AtomicU64::new(0),
            http_errors: AtomicU64::new(0),
            users_total: AtomicU64::new(0),
            listings_total: AtomicU64::new(0),
            bookings_total: AtomicU64::new(0),
            dash_sessions_started: AtomicU64::new(0),
            dash_sessions_time_expired: AtomicU64::new(0),
            dash_sessions_bomb_hit: AtomicU64::new(0),
            dash_rewards_caught: AtomicU64::new(0),
            dash_discounts_awarded: AtomicU64::new(0),
            tick_count: AtomicU64::new(0),
            tick_time_us: AtomicU64::new(0),
            tick_time_p95_us: AtomicU64::new(0),
            tick_time_p99_us: AtomicU64::new(0),
            tick_time_max_us: AtomicU64::new(0),
            start_time: Instant::now(),
            tick_history: RwLock::new(VecDeque::with_capacity(TICK_HISTORY)),
        }
    }

    /// Record a tick time and update percentiles
    pub fn record_tick_time(&self, duration: Duration) {
        let us = duration.as_micros() as u64;
        self.tick_time_us.store(us, Ordering::Relaxed);
        self.tick_count.fetch_add(1, Ordering::Relaxed);

        let mut history = self.tick_history.write();
        history.push_back(us);
        while history.len() > TICK_HISTORY {
            history.pop_front();
        }

        if history.len() >= 10 {
            let mut sorted: Vec<u64> = history.iter().copied().collect();
            sorted.sort_unstable();

            let p95_idx = (sorted.len() as f32 * 0.95) as usize;
            let p99_idx = (sorted.len() as f32 * 0.99) as usize;

            self.tick_time_p95_us.store(sorted[p95_idx.min(sorted.len() - 1)], Ordering::Relaxed);
            self.tick_time_p99_us.store(sorted[p99_idx.min(sorted.len() - 1)], Ordering::Relaxed);
            self.tick_time_max_us.store(sorted.last().copied().unwrap_or(0), Ordering::Relaxed);
        }
    }

    /// Count a finished Dash session
    pub fn record_session_end(&self, reason: EndReason, discount: bool) {
        match reason {
            EndReason::TimeExpired => self.dash_sessions_time_expired.fetch_add(1, Ordering::Relaxed),
            EndReason::BombHit => self.dash_sessions_bomb_hit.fetch_add(1, Ordering::Relaxed),
        };
        if discount {
            self.dash_discounts_awarded.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Get uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Generate Prometheus-format metrics output
    pub fn to_prometheus(&self) -> String {
        let mut output = String::with_capacity(2048);

        macro_rules! metric {
            ($name:expr, $help:expr, $type:expr, $value:expr) => {
                output.push_str(&format!(
                    "# HELP {} {}\n# TYPE {} {}\n{} {}\n",
                    $name, $help, $name, $type, $name, $value
                ));
            };
        }

        metric!("marbnb_http_requests_total", "HTTP requests served", "counter",
            self.http_requests.load(Ordering::Relaxed));
        metric!("marbnb_http_errors_total", "HTTP responses with status >= 400", "counter",
            self.http_errors.load(Ordering::Relaxed));

        metric!("marbnb_users", "Registered users", "gauge",
            self.users_total.load(Ordering::Relaxed));
        metric!("marbnb_listings", "Active listings", "gauge",
            self.listings_total.load(Ordering::Relaxed));
        metric!("marbnb_bookings", "Active bookings", "gauge",
            self.bookings_total.load(Ordering::Relaxed));

        metric!("marbnb_dash_sessions_started_total", "Dash sessions started", "counter",
            self.dash_sessions_started.load(Ordering::Relaxed));
        metric!("marbnb_dash_sessions_time_expired_total", "Dash sessions ended by the timer", "counter",
            self.dash_sessions_time_expired.load(Ordering::Relaxed));
        metric!("marbnb_dash_sessions_bomb_hit_total", "Dash sessions ended by a hazard", "counter",
            self.dash_sessions_bomb_hit.load(Ordering::Relaxed));
        metric!("marbnb_dash_rewards_caught_total", "Rewards caught across all sessions", "counter",
            self.dash_rewards_caught.load(Ordering::Relaxed));
        metric!("marbnb_dash_discounts_awarded_total", "Discount codes awarded", "counter",
            self.dash_discounts_awarded.load(Ordering::Relaxed));

        metric!("marbnb_dash_tick_count", "Total ticks processed", "counter",
            self.tick_count.load(Ordering::Relaxed));
        metric!("marbnb_dash_tick_time_microseconds", "Last tick time in microseconds", "gauge",
            self.tick_time_us.load(Ordering::Relaxed));
        metric!("marbnb_dash_tick_time_p95_microseconds", "95th percentile tick time", "gauge",
            self.tick_time_p95_us.load(Ordering::Relaxed));
        metric!("marbnb_dash_tick_time_p99_microseconds", "99th percentile tick time", "gauge",
            self.tick_time_p99_us.load(Ordering::Relaxed));
        metric!("marbnb_dash_tick_time_max_microseconds", "Maximum tick time", "gauge",
            self.tick_time_max_us.load(Ordering::Relaxed));

        metric!("marbnb_uptime_seconds", "Server uptime in seconds", "counter",
            self.uptime_seconds());

        output
    }

    /// Generate JSON format metrics
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "http": {
                "requests": self.http_requests.load(Ordering::Relaxed),
                "errors": self.http_errors.load(Ordering::Relaxed),
            },
            "market": {
                "users": self.users_total.load(Ordering::Relaxed),
                "listings": self.listings_total.load(Ordering::Relaxed),
                "bookings": self.bookings_total.load(Ordering::Relaxed),
            },
            "dash": {
                "sessions_started": self.dash_sessions_started.load(Ordering::Relaxed),
                "sessions_time_expired": self.dash_sessions_time_expired.load(Ordering::Relaxed),
                "sessions_bomb_hit": self.dash_sessions_bomb_hit.load(Ordering::Relaxed),
                "rewards_caught": self.dash_rewards_caught.load(Ordering::Relaxed),
                "discounts_awarded": self.dash_discounts_awarded.load(Ordering::Relaxed),
            },
            "performance": {
                "tick_count": self.tick_count.load(Ordering::Relaxed),
                "tick_time_us": self.tick_time_us.load(Ordering::Relaxed),
                "tick_time_p95_us": self.tick_time_p95_us.load(Ordering::Relaxed),
                "tick_time_p99_us": self.tick_time_p99_us.load(Ordering::Relaxed),
                "tick_time_max_us": self.tick_time_max_us.load(Ordering::Relaxed),
            },
            "uptime_seconds": self.uptime_seconds(),
        })
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
