//! Plays one Dash session with the autopilot and logs the outcome
//!
//! Usage: dash-headless [seed]

use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use marbnb_server::config::DashConfig;
use marbnb_server::game::input_buffer::{InputBuffer, InputBufferError};
use marbnb_server::game::random::RngSource;
use marbnb_server::game::runner::run_session;
use marbnb_server::game::state::SessionSnapshot;
use marbnb_server::game::systems::autopilot;
use marbnb_server::metrics::Metrics;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let config = DashConfig::load_or_default();
    config.validate().map_err(anyhow::Error::msg)?;

    let rng = match std::env::args().nth(1) {
        Some(arg) => {
            let seed: u64 = arg.parse()?;
            info!(seed, "Using seeded RNG");
            RngSource::seeded(seed)
        }
        None => RngSource::from_entropy(),
    };

    let pointer = InputBuffer::default();
    let (snapshots, mut updates) = watch::channel(SessionSnapshot::default());
    let metrics = Metrics::new();

    // Autopilot reacts to every published snapshot
    let mut sender = pointer.sender();
    let pilot = tokio::spawn(async move {
        while updates.changed().await.is_ok() {
            let x = {
                let snapshot = updates.borrow_and_update();
                if snapshot.phase.is_ended() {
                    break;
                }
                autopilot::steer(&snapshot)
            };
            match sender.send_x(x) {
                Ok(()) | Err(InputBufferError::Full) => {}
                Err(InputBufferError::Disconnected) => break,
            }
        }
    });

    let result = run_session(&config, rng, &pointer, &snapshots, &metrics).await;
    drop(snapshots);
    pilot.await?;

    match result {
        Some(result) => {
            info!(
                reason = ?result.reason,
                score = result.score,
                duration_ms = result.duration.as_millis() as u64,
                "Session finished"
            );
            match result.discount_code {
                Some(code) => info!("Discount earned: {}", code),
                None => info!("No discount this time"),
            }
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        None => warn!("Session stopped without a result"),
    }

    let stats = metrics.to_json();
    info!(
        ticks = %stats["performance"]["tick_count"],
        p99_us = %stats["performance"]["tick_time_p99_us"],
        "Tick timings"
    );

    Ok(())
}
