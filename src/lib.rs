//! MarBnB Server Library
//!
//! Listings/booking HTTP API plus the Dash mini-game engine that awards the
//! booking discount code.
//!
//! # Features
//!
//! - `autopilot` - Heuristic basket steering used by the `dash-headless` binary (enabled by default)

pub mod config;
pub mod game;
pub mod market;
pub mod metrics;
