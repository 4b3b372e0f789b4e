use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;
use std::time::Duration;

use crate::game::constants::{session, spawn};

/// HTTP server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the server to
    pub bind_address: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// PBKDF2 iterations for stored password hashes
    pub password_iterations: u32,
    /// Insert demo users and listings into an empty store at startup
    pub seed_demo_data: bool,
    /// Max age advertised on CORS preflight responses
    pub cors_max_age: Duration,
    /// SQLite file holding users, listings and bookings (`:memory:` for none)
    pub database_path: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)),
            port: 5000,
            password_iterations: 100_000,
            seed_demo_data: true,
            cors_max_age: Duration::from_secs(60 * 60),
            database_path: PathBuf::from("database.db"),
        }
    }
}

impl ServerConfig {
    /// Load config from environment or use defaults
    pub fn load_or_default() -> Self {
        let mut config = Self::default();

        if let Ok(addr) = std::env::var("BIND_ADDRESS") {
            if let Ok(parsed) = addr.parse() {
                config.bind_address = parsed;
            } else {
                tracing::warn!("Invalid BIND_ADDRESS '{}', using default", addr);
            }
        }

        if let Ok(port) = std::env::var("PORT") {
            if let Ok(parsed) = port.parse::<u16>() {
                if parsed > 0 {
                    config.port = parsed;
                } else {
                    tracing::warn!("PORT must be > 0, using default");
                }
            } else {
                tracing::warn!("Invalid PORT '{}', using default", port);
            }
        }

        if let Ok(iterations) = std::env::var("PASSWORD_ITERATIONS") {
            if let Ok(parsed) = iterations.parse::<u32>() {
                if parsed > 0 {
                    config.password_iterations = parsed;
                } else {
                    tracing::warn!("PASSWORD_ITERATIONS must be > 0, using default");
                }
            } else {
                tracing::warn!("Invalid PASSWORD_ITERATIONS '{}', using default", iterations);
            }
        }

        if let Ok(seed) = std::env::var("SEED_DEMO_DATA") {
            match parse_flag(&seed) {
                Some(flag) => config.seed_demo_data = flag,
                None => tracing::warn!("Invalid SEED_DEMO_DATA '{}', using default", seed),
            }
        }

        if let Ok(max_age) = std::env::var("CORS_MAX_AGE_SECS") {
            if let Ok(parsed) = max_age.parse::<u64>() {
                config.cors_max_age = Duration::from_secs(parsed);
            } else {
                tracing::warn!("Invalid CORS_MAX_AGE_SECS '{}', using default", max_age);
            }
        }

        if let Ok(path) = std::env::var("DATABASE_PATH") {
            if path.trim().is_empty() {
                tracing::warn!("DATABASE_PATH is empty, using default");
            } else {
                config.database_path = PathBuf::from(path);
            }
        }

        config
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), String> {
        if self.port == 0 {
            return Err("Port cannot be 0".to_string());
        }
        if self.password_iterations == 0 {
            return Err("password_iterations must be at least 1".to_string());
        }
        if self.database_path.as_os_str().is_empty() {
            return Err("database_path cannot be empty".to_string());
        }
        Ok(())
    }
}

/// Dash mini-game tuning
#[derive(Debug, Clone, PartialEq)]
pub struct DashConfig {
    /// Length of one session
    pub session_duration: Duration,
    /// Spawn interval at difficulty 1.0
    pub base_spawn_interval: Duration,
    /// Points per caught reward
    pub reward_points: u32,
    /// Frames per second for the interval-driven runner
    pub frame_rate: u32,
}

impl Default for DashConfig {
    fn default() -> Self {
        Self {
            session_duration: Duration::from_secs_f32(session::DURATION_SECS),
            base_spawn_interval: Duration::from_millis(spawn::BASE_INTERVAL_MS),
            reward_points: session::REWARD_POINTS,
            frame_rate: session::FRAME_RATE,
        }
    }
}

impl DashConfig {
    /// Load config from environment or use defaults
    pub fn load_or_default() -> Self {
        let mut config = Self::default();

        if let Ok(secs) = std::env::var("DASH_SESSION_SECS") {
            match parse_session_secs(&secs) {
                Some(duration) => config.session_duration = duration,
                None => tracing::warn!(
                    "DASH_SESSION_SECS must be a number in (0, {}], got '{}', using default",
                    MAX_SESSION_SECS,
                    secs
                ),
            }
        }

        if let Ok(ms) = std::env::var("DASH_SPAWN_INTERVAL_MS") {
            match ms.parse::<u64>() {
                Ok(parsed) if parsed > 0 => {
                    config.base_spawn_interval = Duration::from_millis(parsed);
                }
                _ => tracing::warn!("Invalid DASH_SPAWN_INTERVAL_MS '{}', using default", ms),
            }
        }

        if let Ok(points) = std::env::var("DASH_REWARD_POINTS") {
            match points.parse::<u32>() {
                Ok(parsed) if parsed > 0 => config.reward_points = parsed,
                _ => tracing::warn!("Invalid DASH_REWARD_POINTS '{}', using default", points),
            }
        }

        if let Ok(rate) = std::env::var("DASH_FRAME_RATE") {
            match rate.parse::<u32>() {
                Ok(parsed) if (1..=1000).contains(&parsed) => config.frame_rate = parsed,
                _ => tracing::warn!("DASH_FRAME_RATE must be 1-1000, got '{}', using default", rate),
            }
        }

        config
    }

    /// Duration of one frame at the configured rate
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs(1) / self.frame_rate.max(1)
    }

    /// Session length in seconds
    pub fn duration_secs(&self) -> f32 {
        self.session_duration.as_secs_f32()
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), String> {
        if self.session_duration.is_zero() {
            return Err("session_duration must be positive".to_string());
        }
        if self.base_spawn_interval.is_zero() {
            return Err("base_spawn_interval must be positive".to_string());
        }
        if self.reward_points == 0 {
            return Err("reward_points must be at least 1".to_string());
        }
        if self.frame_rate == 0 {
            return Err("frame_rate must be at least 1".to_string());
        }
        Ok(())
    }
}

/// Upper bound for `DASH_SESSION_SECS`
const MAX_SESSION_SECS: f32 = 3600.0;

fn parse_session_secs(value: &str) -> Option<Duration> {
    let secs = value.trim().parse::<f32>().ok()?;
    if secs > 0.0 && secs <= MAX_SESSION_SECS {
        Duration::try_from_secs_f32(secs).ok()
    } else {
        None
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
