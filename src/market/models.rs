//! Marketplace records and request/response bodies

use serde::{Deserialize, Serialize};

pub type UserId = u64;
pub type ListingId = u64;
pub type BookingId = u64;

/// Account role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Host,
    #[default]
    Guest,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Host => "host",
            Role::Guest => "guest",
        }
    }

    /// Parse a role name; anything unrecognised is a guest
    pub fn parse_lenient(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("admin") => Role::Admin,
            Some("host") => Role::Host,
            _ => Role::Guest,
        }
    }
}

/// Stored account, including the password hash
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: UserId,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

impl UserRecord {
    pub fn public(&self) -> PublicUser {
        PublicUser {
            id: self.id,
            email: self.email.clone(),
            role: self.role,
        }
    }
}

/// Account as returned to clients
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublicUser {
    pub id: UserId,
    pub email: String,
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Listing {
    pub id: ListingId,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub location: String,
    pub category: String,
    pub image: String,
    pub host_email: String,
}

/// Body of `POST /api/listings`; absent fields default to empty
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NewListing {
    pub title: String,
    pub description: String,
    pub price: f64,
    pub location: String,
    pub category: String,
    pub image: String,
    pub host_email: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    #[default]
    Confirmed,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Confirmed => "confirmed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Booking {
    pub id: BookingId,
    pub listing_id: ListingId,
    pub user_email: String,
    pub date: Option<String>,
    pub status: BookingStatus,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewBooking {
    pub listing_id: Option<ListingId>,
    pub user_email: Option<String>,
    pub date: Option<String>,
}

/// Booking joined with the listing it belongs to
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookingView {
    #[serde(flatten)]
    pub booking: Booking,
    pub title: String,
    pub price: f64,
    pub location: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Query string of `GET /api/bookings`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookingQuery {
    pub email: Option<String>,
    pub role: Option<String>,
}
