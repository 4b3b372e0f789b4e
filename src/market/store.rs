//! Marketplace tables in an embedded SQLite database
//!
//! Users, listings and bookings live in one SQLite file (or in memory for
//! tests). The connection sits behind a mutex; callers on the async side go
//! through `spawn_blocking`. Ids come from `AUTOINCREMENT` and are never
//! reused.

use std::path::Path;

use parking_lot::Mutex;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};
use tracing::info;

use super::error::MarketError;
use super::models::{
    Booking, BookingId, BookingStatus, BookingView, Listing, ListingId, NewBooking, NewListing,
    PublicUser, Role, UserRecord,
};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    email TEXT NOT NULL UNIQUE,
    password TEXT NOT NULL,
    role TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS listings (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    description TEXT NOT NULL,
    price REAL NOT NULL,
    location TEXT NOT NULL,
    category TEXT NOT NULL,
    image TEXT NOT NULL,
    host_email TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS bookings (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    listing_id INTEGER NOT NULL,
    user_email TEXT NOT NULL,
    date TEXT,
    status TEXT NOT NULL DEFAULT 'confirmed'
);
CREATE INDEX IF NOT EXISTS bookings_listing ON bookings (listing_id);
";

const BOOKING_VIEW: &str = "SELECT b.id, b.listing_id, b.user_email, b.date, l.title, l.price, l.location
     FROM bookings b JOIN listings l ON b.listing_id = l.id";

/// Row counts, for metrics gauges
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreCounts {
    pub users: usize,
    pub listings: usize,
    pub bookings: usize,
}

#[derive(Debug)]
pub struct MarketStore {
    conn: Mutex<Connection>,
}

impl MarketStore {
    /// Open (or create) the database file and apply the schema
    pub fn open(path: impl AsRef<Path>) -> Result<Self, MarketError> {
        let path = path.as_ref();
        let conn = Connection::open(path)?;
        info!(path = %path.display(), "Opened market database");
        Self::with_connection(conn)
    }

    /// Private database that disappears with the store
    pub fn open_in_memory() -> Result<Self, MarketError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, MarketError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Insert an account; the email must be unused
    pub fn insert_user(&self, email: &str, password_hash: String, role: Role) -> Result<PublicUser, MarketError> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO users (email, password, role) VALUES (?1, ?2, ?3)",
            params![email, password_hash, role.as_str()],
        )
        .map_err(|e| match e.sqlite_error_code() {
            Some(ErrorCode::ConstraintViolation) => MarketError::DuplicateUser,
            _ => MarketError::from(e),
        })?;

        Ok(PublicUser {
            id: conn.last_insert_rowid() as u64,
            email: email.to_string(),
            role,
        })
    }

    pub fn user_by_email(&self, email: &str) -> Result<Option<UserRecord>, MarketError> {
        let user = self
            .conn
            .lock()
            .query_row(
                "SELECT id, email, password, role FROM users WHERE email = ?1",
                params![email],
                |row| {
                    let role: String = row.get(3)?;
                    Ok(UserRecord {
                        id: row.get::<_, i64>(0)? as u64,
                        email: row.get(1)?,
                        password_hash: row.get(2)?,
                        role: Role::parse_lenient(Some(&role)),
                    })
                },
            )
            .optional()?;
        Ok(user)
    }

    pub fn has_user(&self, email: &str) -> Result<bool, MarketError> {
        let found = self
            .conn
            .lock()
            .query_row("SELECT 1 FROM users WHERE email = ?1", params![email], |_| Ok(()))
            .optional()?;
        Ok(found.is_some())
    }

    /// All listings ordered by id
    pub fn listings(&self) -> Result<Vec<Listing>, MarketError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT id, title, description, price, location, category, image, host_email
             FROM listings ORDER BY id",
        )?;
        let listings = stmt
            .query_map([], listing_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(listings)
    }

    pub fn listing(&self, id: ListingId) -> Result<Option<Listing>, MarketError> {
        let listing = self
            .conn
            .lock()
            .query_row(
                "SELECT id, title, description, price, location, category, image, host_email
                 FROM listings WHERE id = ?1",
                params![id as i64],
                listing_from_row,
            )
            .optional()?;
        Ok(listing)
    }

    pub fn create_listing(&self, new: NewListing) -> Result<ListingId, MarketError> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO listings (title, description, price, location, category, image, host_email)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                new.title,
                new.description,
                new.price,
                new.location,
                new.category,
                new.image,
                new.host_email
            ],
        )?;
        Ok(conn.last_insert_rowid() as ListingId)
    }

    /// Remove a listing and every booking that references it
    ///
    /// Returns how many bookings were removed with it.
    pub fn delete_listing(&self, id: ListingId) -> Result<usize, MarketError> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        let removed = tx.execute("DELETE FROM bookings WHERE listing_id = ?1", params![id as i64])?;
        tx.execute("DELETE FROM listings WHERE id = ?1", params![id as i64])?;
        tx.commit()?;
        Ok(removed)
    }

    pub fn create_booking(&self, new: NewBooking) -> Result<BookingId, MarketError> {
        let (Some(listing_id), Some(user_email)) = (new.listing_id, new.user_email) else {
            return Err(MarketError::MissingFields);
        };
        if listing_id == 0 || user_email.is_empty() {
            return Err(MarketError::MissingFields);
        }

        let conn = self.conn.lock();
        let exists = conn
            .query_row("SELECT 1 FROM listings WHERE id = ?1", params![listing_id as i64], |_| Ok(()))
            .optional()?
            .is_some();
        if !exists {
            return Err(MarketError::ListingNotFound);
        }

        conn.execute(
            "INSERT INTO bookings (listing_id, user_email, date, status) VALUES (?1, ?2, ?3, ?4)",
            params![listing_id as i64, user_email, new.date, BookingStatus::Confirmed.as_str()],
        )?;
        Ok(conn.last_insert_rowid() as BookingId)
    }

    /// Bookings visible to `email` acting as `role`, ordered by id
    ///
    /// Admins see everything, hosts see bookings on listings they own and
    /// everyone else sees bookings they made.
    pub fn bookings_for(&self, email: Option<&str>, role: Role) -> Result<Vec<BookingView>, MarketError> {
        let conn = self.conn.lock();
        let views = match role {
            Role::Admin => {
                let mut stmt = conn.prepare(&format!("{BOOKING_VIEW} ORDER BY b.id"))?;
                let rows = stmt.query_map([], booking_view_from_row)?;
                rows.collect::<Result<Vec<_>, _>>()?
            }
            Role::Host => {
                let mut stmt = conn.prepare(&format!("{BOOKING_VIEW} WHERE l.host_email = ?1 ORDER BY b.id"))?;
                let rows = stmt.query_map(params![email], booking_view_from_row)?;
                rows.collect::<Result<Vec<_>, _>>()?
            }
            Role::Guest => {
                let mut stmt = conn.prepare(&format!("{BOOKING_VIEW} WHERE b.user_email = ?1 ORDER BY b.id"))?;
                let rows = stmt.query_map(params![email], booking_view_from_row)?;
                rows.collect::<Result<Vec<_>, _>>()?
            }
        };
        Ok(views)
    }

    /// Remove a booking; returns whether it existed
    pub fn delete_booking(&self, id: BookingId) -> Result<bool, MarketError> {
        let removed = self
            .conn
            .lock()
            .execute("DELETE FROM bookings WHERE id = ?1", params![id as i64])?;
        Ok(removed > 0)
    }

    pub fn counts(&self) -> Result<StoreCounts, MarketError> {
        let conn = self.conn.lock();
        let count = |table: &str| -> Result<usize, MarketError> {
            let n: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))?;
            Ok(n as usize)
        };
        Ok(StoreCounts {
            users: count("users")?,
            listings: count("listings")?,
            bookings: count("bookings")?,
        })
    }

    pub fn is_empty(&self) -> Result<bool, MarketError> {
        let counts = self.counts()?;
        Ok(counts.users == 0 && counts.listings == 0)
    }
}

fn listing_from_row(row: &Row<'_>) -> rusqlite::Result<Listing> {
    Ok(Listing {
        id: row.get::<_, i64>(0)? as ListingId,
        title: row.get(1)?,
        description: row.get(2)?,
        price: row.get(3)?,
        location: row.get(4)?,
        category: row.get(5)?,
        image: row.get(6)?,
        host_email: row.get(7)?,
    })
}

fn booking_view_from_row(row: &Row<'_>) -> rusqlite::Result<BookingView> {
    Ok(BookingView {
        booking: Booking {
            id: row.get::<_, i64>(0)? as BookingId,
            listing_id: row.get::<_, i64>(1)? as ListingId,
            user_email: row.get(2)?,
            date: row.get(3)?,
            status: BookingStatus::Confirmed,
        },
        title: row.get(4)?,
        price: row.get(5)?,
        location: row.get(6)?,
    })
}
