//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the database migrations exactly; Diesel
//! uses them for compile-time query validation and type-safe SQL
//! generation. Regenerate with `diesel print-schema` when migrations
//! change.
//!
//! Constraints the definitions cannot express:
//!
//! - `coasters.code` carries a unique constraint.
//! - `users.email` carries a unique constraint.
//! - `scans` carries the partial unique index
//!   `scans_coaster_first_scan_idx` on `(coaster_id) WHERE is_first_scan`,
//!   which makes discovery of a coaster a one-time event under concurrency.

diesel::table! {
    /// Member accounts.
    users (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Login email, unique.
        email -> Varchar,
        /// Hex-encoded SHA-256 digest of the password.
        password_hash -> Varchar,
        /// Optional display name.
        name -> Nullable<Varchar>,
        /// Whether the account may use admin endpoints.
        is_admin -> Bool,
        /// Lifetime points balance.
        points -> Int4,
        /// Record creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Venues hosting coasters.
    venues (id) {
        id -> Uuid,
        name -> Varchar,
        /// `ACTIVE` or `INACTIVE`.
        status -> Varchar,
        /// Denormalized lifetime scan counter.
        total_scans -> Int4,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Artworks revealed by scanning coasters.
    artworks (id) {
        id -> Uuid,
        title -> Nullable<Varchar>,
        description -> Nullable<Text>,
        image_url -> Nullable<Varchar>,
        /// `PENDING` or `APPROVED`.
        status -> Varchar,
        /// The artist's user id.
        artist_id -> Uuid,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Physical coasters and their codes.
    coasters (id) {
        id -> Uuid,
        /// Unique four-symbol code printed on the coaster.
        code -> Varchar,
        artwork_id -> Uuid,
        venue_id -> Nullable<Uuid>,
        /// `ACTIVE` or `RETIRED`.
        status -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Recorded scan events.
    scans (id) {
        id -> Uuid,
        /// Null for guest comment scans.
        user_id -> Nullable<Uuid>,
        coaster_id -> Uuid,
        is_first_scan -> Bool,
        points_earned -> Int4,
        latitude -> Nullable<Float8>,
        longitude -> Nullable<Float8>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Comments anchored to first scans.
    comments (id) {
        id -> Uuid,
        scan_id -> Uuid,
        /// Null for guest comments.
        user_id -> Nullable<Uuid>,
        content -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Per-member per-day scan counters backing the daily rate limit.
    daily_scan_counts (user_id, scan_date) {
        user_id -> Uuid,
        /// UTC calendar day.
        scan_date -> Date,
        count -> Int4,
    }
}

diesel::joinable!(artworks -> users (artist_id));
diesel::joinable!(coasters -> artworks (artwork_id));
diesel::joinable!(coasters -> venues (venue_id));
diesel::joinable!(scans -> coasters (coaster_id));
diesel::joinable!(scans -> users (user_id));
diesel::joinable!(comments -> scans (scan_id));
diesel::joinable!(comments -> users (user_id));
diesel::joinable!(daily_scan_counts -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    venues,
    artworks,
    coasters,
    scans,
    comments,
    daily_scan_counts,
);
