//! Shared helper utilities for backend integration tests.
//!
//! Integration tests compile as separate crates under `backend/tests/`, which
//! makes it awkward to share small helpers without copy/paste. This module
//! provides database provisioning, schema setup, and the skip policy for
//! environments where the embedded cluster cannot start.

use pg_embedded_setup_unpriv::ClusterHandle;
use postgres::{Client, NoTls};

/// DDL mirroring the Diesel table definitions, including the constraints the
/// `table!` macros cannot express: the unique coaster code, the unique email,
/// and the partial unique index that makes discovery a one-time event.
const SCHEMA_SQL: &str = "
CREATE TABLE users (
    id UUID PRIMARY KEY,
    email VARCHAR NOT NULL UNIQUE,
    password_hash VARCHAR NOT NULL,
    name VARCHAR,
    is_admin BOOLEAN NOT NULL DEFAULT FALSE,
    points INTEGER NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
CREATE TABLE venues (
    id UUID PRIMARY KEY,
    name VARCHAR NOT NULL,
    status VARCHAR NOT NULL DEFAULT 'ACTIVE',
    total_scans INTEGER NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
CREATE TABLE artworks (
    id UUID PRIMARY KEY,
    title VARCHAR,
    description TEXT,
    image_url VARCHAR,
    status VARCHAR NOT NULL DEFAULT 'PENDING',
    artist_id UUID NOT NULL REFERENCES users (id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
CREATE TABLE coasters (
    id UUID PRIMARY KEY,
    code VARCHAR(4) NOT NULL UNIQUE,
    artwork_id UUID NOT NULL REFERENCES artworks (id),
    venue_id UUID REFERENCES venues (id),
    status VARCHAR NOT NULL DEFAULT 'ACTIVE',
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
CREATE TABLE scans (
    id UUID PRIMARY KEY,
    user_id UUID REFERENCES users (id),
    coaster_id UUID NOT NULL REFERENCES coasters (id),
    is_first_scan BOOLEAN NOT NULL,
    points_earned INTEGER NOT NULL,
    latitude DOUBLE PRECISION,
    longitude DOUBLE PRECISION,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
CREATE UNIQUE INDEX scans_coaster_first_scan_idx ON scans (coaster_id) WHERE is_first_scan;
CREATE TABLE comments (
    id UUID PRIMARY KEY,
    scan_id UUID NOT NULL REFERENCES scans (id),
    user_id UUID REFERENCES users (id),
    content VARCHAR(144) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
CREATE TABLE daily_scan_counts (
    user_id UUID NOT NULL REFERENCES users (id),
    scan_date DATE NOT NULL,
    count INTEGER NOT NULL,
    PRIMARY KEY (user_id, scan_date)
);
";

/// Render a `postgres` error with enough detail to be useful in CI logs.
///
/// The `postgres::Error` `Display` implementation often collapses database
/// errors to a generic `db error`, which hides the message and SQLSTATE.
/// Prefer using `as_db_error()` when available so failures are actionable.
pub fn format_postgres_error(error: &postgres::Error) -> String {
    let Some(db_error) = error.as_db_error() else {
        return error.to_string();
    };

    let mut summary = format!(
        "postgres error {:?}: {}",
        db_error.code(),
        db_error.message()
    );

    if let Some(detail) = db_error.detail() {
        summary.push_str("; detail: ");
        summary.push_str(detail);
    }

    summary
}

/// Returns true when the `SKIP_TEST_CLUSTER` environment variable is set to a
/// truthy value ("1", "true", "yes", case-insensitive).
pub fn should_skip_test_cluster() -> bool {
    std::env::var("SKIP_TEST_CLUSTER")
        .map(|value| matches!(value.to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

/// Handles embedded cluster setup failures consistently across suites.
///
/// When `SKIP_TEST_CLUSTER` is truthy, prints a skip marker and returns
/// `None`. Otherwise, panics with a clear failure message so CI breakage is
/// not masked.
pub fn handle_cluster_setup_failure<T>(reason: impl std::fmt::Display) -> Option<T> {
    if should_skip_test_cluster() {
        eprintln!("SKIP-TEST-CLUSTER: {reason}");
        None
    } else {
        panic!("Test cluster setup failed: {reason}. Set SKIP_TEST_CLUSTER=1 to skip.");
    }
}

/// Drops and recreates the named database, applies the schema, and returns
/// its connection URL. Callers pass a per-test database name so suites stay
/// isolated on the shared cluster.
pub fn reset_database(cluster: &ClusterHandle, name: &str) -> Result<String, String> {
    let admin_url = cluster.connection().database_url("postgres");
    let mut admin = Client::connect(&admin_url, NoTls).map_err(|err| format_postgres_error(&err))?;
    admin
        .batch_execute(&format!("DROP DATABASE IF EXISTS {name}"))
        .map_err(|err| format_postgres_error(&err))?;
    admin
        .batch_execute(&format!("CREATE DATABASE {name}"))
        .map_err(|err| format_postgres_error(&err))?;

    let url = cluster.connection().database_url(name);
    let mut client = Client::connect(&url, NoTls).map_err(|err| format_postgres_error(&err))?;
    client
        .batch_execute(SCHEMA_SQL)
        .map_err(|err| format_postgres_error(&err))?;

    Ok(url)
}
