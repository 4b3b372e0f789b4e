pub mod clock;
pub mod spawner;
pub mod catch;

#[cfg(feature = "autopilot")]
pub mod autopilot;
