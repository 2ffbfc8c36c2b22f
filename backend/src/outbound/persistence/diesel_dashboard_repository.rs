//! PostgreSQL-backed `DashboardRepository` implementation using Diesel ORM.
//!
//! Loads the whole snapshot inside one transaction so the counts, feeds,
//! and rankings describe a single consistent point in time.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use diesel::dsl::count_star;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{
    ArtworkRanking, DashboardRepository, DashboardRepositoryError, DashboardSnapshot,
    DashboardTotals, RecentScanEntry, UserGrowthDay,
};
use crate::domain::{Venue, VenueStatus};

use super::error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::pool::{DbPool, PoolError};
use super::schema::{artworks, coasters, scans, users, venues};

/// Rows in the recent-activity feed.
const RECENT_SCANS_LIMIT: i64 = 5;

/// Entries in each ranking list.
const RANKING_LIMIT: i64 = 5;

/// Length of the member-growth window in days, today included.
const GROWTH_WINDOW_DAYS: i64 = 7;

/// Diesel-backed implementation of the dashboard repository port.
#[derive(Clone)]
pub struct DieselDashboardRepository {
    pool: DbPool,
}

impl DieselDashboardRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Map pool errors to domain repository errors.
fn map_pool_error(error: PoolError) -> DashboardRepositoryError {
    map_basic_pool_error(error, DashboardRepositoryError::connection)
}

/// Map Diesel errors to domain repository errors.
fn map_diesel_error(error: diesel::result::Error) -> DashboardRepositoryError {
    map_basic_diesel_error(
        error,
        DashboardRepositoryError::query,
        DashboardRepositoryError::connection,
    )
}

async fn load_totals(
    conn: &mut AsyncPgConnection,
) -> Result<DashboardTotals, diesel::result::Error> {
    Ok(DashboardTotals {
        users: users::table.select(count_star()).get_result(conn).await?,
        venues: venues::table.select(count_star()).get_result(conn).await?,
        artworks: artworks::table.select(count_star()).get_result(conn).await?,
        coasters: coasters::table.select(count_star()).get_result(conn).await?,
        scans: scans::table.select(count_star()).get_result(conn).await?,
    })
}

async fn load_recent_scans(
    conn: &mut AsyncPgConnection,
) -> Result<Vec<RecentScanEntry>, diesel::result::Error> {
    type Row = (
        Uuid,
        String,
        Option<String>,
        Option<String>,
        Option<String>,
        bool,
        DateTime<Utc>,
    );

    let rows: Vec<Row> = scans::table
        .inner_join(
            coasters::table
                .inner_join(artworks::table)
                .left_join(venues::table),
        )
        .left_join(users::table)
        .order((scans::created_at.desc(), scans::id.desc()))
        .limit(RECENT_SCANS_LIMIT)
        .select((
            scans::id,
            coasters::code,
            artworks::title,
            venues::name.nullable(),
            users::name.nullable(),
            scans::is_first_scan,
            scans::created_at,
        ))
        .load(conn)
        .await?;

    Ok(rows
        .into_iter()
        .map(
            |(scan_id, code, artwork_title, venue_name, user_name, is_first_scan, created_at)| {
                RecentScanEntry {
                    scan_id,
                    code,
                    artwork_title,
                    venue_name,
                    user_name,
                    is_first_scan,
                    created_at,
                }
            },
        )
        .collect())
}

async fn load_top_venues(
    conn: &mut AsyncPgConnection,
) -> Result<Vec<Venue>, diesel::result::Error> {
    let rows: Vec<(Uuid, String, String, i32)> = venues::table
        .filter(venues::status.eq(VenueStatus::Active.as_str()))
        .order((venues::total_scans.desc(), venues::name.asc()))
        .limit(RANKING_LIMIT)
        .select((venues::id, venues::name, venues::status, venues::total_scans))
        .load(conn)
        .await?;

    rows.into_iter()
        .map(|(id, name, status, total_scans)| {
            let status = status
                .parse()
                .map_err(|err| diesel::result::Error::DeserializationError(Box::new(err)))?;
            Ok(Venue {
                id,
                name,
                status,
                total_scans,
            })
        })
        .collect()
}

async fn load_top_artworks(
    conn: &mut AsyncPgConnection,
) -> Result<Vec<ArtworkRanking>, diesel::result::Error> {
    let rows: Vec<(Uuid, Option<String>, i64)> = artworks::table
        .inner_join(coasters::table.inner_join(scans::table))
        .group_by((artworks::id, artworks::title))
        .order(count_star().desc())
        .limit(RANKING_LIMIT)
        .select((artworks::id, artworks::title, count_star()))
        .load(conn)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(artwork_id, title, scan_count)| ArtworkRanking {
            artwork_id,
            title,
            scan_count,
        })
        .collect())
}

async fn load_user_growth(
    conn: &mut AsyncPgConnection,
    today: NaiveDate,
) -> Result<Vec<UserGrowthDay>, diesel::result::Error> {
    let window_start = today - Duration::days(GROWTH_WINDOW_DAYS - 1);
    let cutoff = window_start
        .and_hms_opt(0, 0, 0)
        .map(|start| start.and_utc())
        .unwrap_or_else(Utc::now);

    let signups: Vec<DateTime<Utc>> = users::table
        .filter(users::created_at.ge(cutoff))
        .select(users::created_at)
        .load(conn)
        .await?;

    Ok(fold_signups_per_day(&signups, window_start, today))
}

/// Collapse signup timestamps into one entry per UTC day, zero-filled
/// across the whole window so the chart renders gapless.
fn fold_signups_per_day(
    signups: &[DateTime<Utc>],
    window_start: NaiveDate,
    today: NaiveDate,
) -> Vec<UserGrowthDay> {
    let mut per_day: BTreeMap<NaiveDate, i64> = BTreeMap::new();
    let mut day = window_start;
    while day <= today {
        per_day.insert(day, 0);
        day += Duration::days(1);
    }

    for signup in signups {
        let day = signup.date_naive();
        if let Some(count) = per_day.get_mut(&day) {
            *count += 1;
        }
    }

    per_day
        .into_iter()
        .map(|(date, new_users)| UserGrowthDay { date, new_users })
        .collect()
}

#[async_trait]
impl DashboardRepository for DieselDashboardRepository {
    async fn load_snapshot(&self) -> Result<DashboardSnapshot, DashboardRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let today = Utc::now().date_naive();

        conn.transaction(|conn| {
            async move {
                Ok(DashboardSnapshot {
                    totals: load_totals(conn).await?,
                    recent_scans: load_recent_scans(conn).await?,
                    top_venues: load_top_venues(conn).await?,
                    top_artworks: load_top_artworks(conn).await?,
                    user_growth: load_user_growth(conn, today).await?,
                })
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }
}
