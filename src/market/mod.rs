//! Listings and booking service
//!
//! Accounts, listings and bookings kept in SQLite and served over JSON/HTTP.

pub mod error;
pub mod models;
pub mod password;
pub mod routes;
pub mod seed;
pub mod store;

pub use error::MarketError;
pub use password::PasswordHasher;
pub use routes::{router, AppState, SharedState};
pub use store::MarketStore;
