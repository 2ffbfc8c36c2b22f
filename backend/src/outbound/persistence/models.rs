//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and
//! must never be exposed to the domain. They exist solely to satisfy
//! Diesel's type requirements for queries and mutations.

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{artworks, coasters, comments, daily_scan_counts, scans, users};

/// Credential columns read during login. `Selectable` keeps the query
/// narrow; the remaining user columns are only touched by aggregate
/// queries that select tuples directly.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserCredentialsRow {
    pub id: Uuid,
    pub password_hash: String,
    pub is_admin: bool,
}

/// Row struct for reading from the artworks table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = artworks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ArtworkRow {
    pub id: Uuid,
    pub title: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub status: String,
    pub artist_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Row struct for reading from the coasters table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = coasters)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CoasterRow {
    pub id: Uuid,
    pub code: String,
    pub artwork_id: Uuid,
    pub venue_id: Option<Uuid>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for creating new coasters.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = coasters)]
pub(crate) struct NewCoasterRow<'a> {
    pub id: Uuid,
    pub code: &'a str,
    pub artwork_id: Uuid,
    pub venue_id: Option<Uuid>,
    pub status: &'a str,
}

/// Row struct for reading from the scans table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = scans)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ScanRow {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub coaster_id: Uuid,
    pub is_first_scan: bool,
    pub points_earned: i32,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for recording scans.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = scans)]
pub(crate) struct NewScanRow {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub coaster_id: Uuid,
    pub is_first_scan: bool,
    pub points_earned: i32,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Insertable struct for first-scan comments. `user_id` is null for
/// guest comments.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = comments)]
pub(crate) struct NewCommentRow<'a> {
    pub id: Uuid,
    pub scan_id: Uuid,
    pub user_id: Option<Uuid>,
    pub content: &'a str,
}

/// Insertable struct for the daily rate-limit counter upsert.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = daily_scan_counts)]
pub(crate) struct NewDailyScanCountRow {
    pub user_id: Uuid,
    pub scan_date: NaiveDate,
    pub count: i32,
}
