//! PostgreSQL-backed `ScanStore` implementation using Diesel ORM.
//!
//! Every mutation here runs in a single transaction so the scan row, the
//! daily counter, the point award, the artwork approval, and the venue
//! counter commit together or not at all. First-scan status is decided
//! inside the transaction and backstopped by the partial unique index
//! `scans_coaster_first_scan_idx`: when two concurrent scans both observe
//! an undiscovered coaster, one insert loses the race, rolls back, and is
//! retried as a repeat scan.

use async_trait::async_trait;
use chrono::Utc;
use diesel::dsl::exists;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::code::CoasterCode;
use crate::domain::ports::{
    GuestCommentDraft, MemberScanDraft, RecordedScan, ScanHistoryEntry, ScanStore, ScanStoreError,
};
use crate::domain::scan::{points_for, GeoPoint, Scan, DAILY_SCAN_LIMIT};
use crate::domain::{ArtworkStatus, UserId};

use super::error_mapping::{is_unique_violation_on, map_basic_diesel_error, map_basic_pool_error};
use super::models::{NewCommentRow, NewDailyScanCountRow, NewScanRow, ScanRow};
use super::pool::{DbPool, PoolError};
use super::schema::{artworks, coasters, comments, daily_scan_counts, scans, users, venues};

/// Partial unique index guaranteeing at most one first scan per coaster.
const FIRST_SCAN_INDEX: &str = "scans_coaster_first_scan_idx";

/// Diesel-backed implementation of the scan store port.
#[derive(Clone)]
pub struct DieselScanStore {
    pool: DbPool,
}

impl DieselScanStore {
    /// Create a new store with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Transaction-internal error carrying domain outcomes across the rollback
/// boundary.
#[derive(Debug)]
enum TxnError {
    Diesel(diesel::result::Error),
    LimitExceeded,
    AlreadyDiscovered,
}

impl From<diesel::result::Error> for TxnError {
    fn from(error: diesel::result::Error) -> Self {
        Self::Diesel(error)
    }
}

/// Map pool errors to domain store errors.
fn map_pool_error(error: PoolError) -> ScanStoreError {
    map_basic_pool_error(error, ScanStoreError::connection)
}

/// Map Diesel errors to domain store errors.
fn map_diesel_error(error: diesel::result::Error) -> ScanStoreError {
    map_basic_diesel_error(error, ScanStoreError::query, ScanStoreError::connection)
}

/// Map transaction errors to domain store errors.
fn map_txn_error(error: TxnError) -> ScanStoreError {
    match error {
        TxnError::Diesel(err) => map_diesel_error(err),
        TxnError::LimitExceeded => ScanStoreError::daily_limit_exceeded(DAILY_SCAN_LIMIT),
        TxnError::AlreadyDiscovered => ScanStoreError::already_discovered(),
    }
}

/// Whether a transaction failed because the first-scan index rejected the
/// insert, meaning another scan won the discovery concurrently.
fn lost_discovery_race(error: &TxnError) -> bool {
    matches!(error, TxnError::Diesel(err) if is_unique_violation_on(err, FIRST_SCAN_INDEX))
}

/// Convert a database row into a domain scan.
fn row_to_scan(row: ScanRow) -> Scan {
    let ScanRow {
        id,
        user_id,
        coaster_id,
        is_first_scan,
        points_earned,
        latitude,
        longitude,
        created_at,
    } = row;

    let location = (latitude.is_some() || longitude.is_some())
        .then_some(GeoPoint {
            latitude,
            longitude,
        });

    Scan {
        id,
        user_id: user_id.map(UserId::from_uuid),
        coaster_id,
        is_first_scan,
        points_earned,
        location,
        created_at,
    }
}

/// Bump the member's counter for today and enforce the daily quota.
///
/// The upsert increments atomically; a quota breach rolls the whole
/// transaction back, so the counter never records a rejected scan.
async fn bump_daily_counter(
    conn: &mut diesel_async::AsyncPgConnection,
    user_id: Uuid,
) -> Result<(), TxnError> {
    let new_count = NewDailyScanCountRow {
        user_id,
        scan_date: Utc::now().date_naive(),
        count: 1,
    };

    let count: i32 = diesel::insert_into(daily_scan_counts::table)
        .values(&new_count)
        .on_conflict((daily_scan_counts::user_id, daily_scan_counts::scan_date))
        .do_update()
        .set(daily_scan_counts::count.eq(daily_scan_counts::count + 1))
        .returning(daily_scan_counts::count)
        .get_result(conn)
        .await?;

    if count > DAILY_SCAN_LIMIT {
        return Err(TxnError::LimitExceeded);
    }
    Ok(())
}

/// Whether any first scan has been recorded for the coaster.
async fn coaster_discovered(
    conn: &mut diesel_async::AsyncPgConnection,
    coaster_id: Uuid,
) -> Result<bool, TxnError> {
    let discovered = diesel::select(exists(
        scans::table.filter(
            scans::coaster_id
                .eq(coaster_id)
                .and(scans::is_first_scan.eq(true)),
        ),
    ))
    .get_result(conn)
    .await?;
    Ok(discovered)
}

/// Flip the artwork to approved inside the current transaction.
async fn approve_artwork_in_txn(
    conn: &mut diesel_async::AsyncPgConnection,
    artwork_id: Uuid,
) -> Result<(), TxnError> {
    diesel::update(artworks::table.filter(artworks::id.eq(artwork_id)))
        .set(artworks::status.eq(ArtworkStatus::Approved.as_str()))
        .execute(conn)
        .await?;
    Ok(())
}

/// Increment the venue's lifetime scan counter, when the coaster has one.
async fn bump_venue_counter(
    conn: &mut diesel_async::AsyncPgConnection,
    venue_id: Option<Uuid>,
) -> Result<(), TxnError> {
    if let Some(venue_id) = venue_id {
        diesel::update(venues::table.filter(venues::id.eq(venue_id)))
            .set(venues::total_scans.eq(venues::total_scans + 1))
            .execute(conn)
            .await?;
    }
    Ok(())
}

/// One attempt at the member scan transaction.
///
/// `force_repeat` is set after losing the discovery race so the retry
/// records a repeat scan without re-testing the index.
async fn member_scan_attempt(
    conn: &mut diesel_async::AsyncPgConnection,
    draft: &MemberScanDraft,
    force_repeat: bool,
) -> Result<(ScanRow, bool, i32), TxnError> {
    conn.transaction(|conn| {
        async move {
            bump_daily_counter(conn, *draft.user_id.as_uuid()).await?;

            let is_first_scan = if force_repeat {
                false
            } else {
                !coaster_discovered(conn, draft.coaster_id).await?
            };
            let points_earned = points_for(is_first_scan);

            let new_scan = NewScanRow {
                id: Uuid::new_v4(),
                user_id: Some(*draft.user_id.as_uuid()),
                coaster_id: draft.coaster_id,
                is_first_scan,
                points_earned,
                latitude: draft.location.as_ref().and_then(|point| point.latitude),
                longitude: draft.location.as_ref().and_then(|point| point.longitude),
            };

            let row: ScanRow = diesel::insert_into(scans::table)
                .values(&new_scan)
                .returning(ScanRow::as_returning())
                .get_result(conn)
                .await?;

            if is_first_scan {
                if let Some(comment) = &draft.comment {
                    let new_comment = NewCommentRow {
                        id: Uuid::new_v4(),
                        scan_id: row.id,
                        user_id: Some(*draft.user_id.as_uuid()),
                        content: comment.as_str(),
                    };
                    diesel::insert_into(comments::table)
                        .values(&new_comment)
                        .execute(conn)
                        .await?;
                }
                approve_artwork_in_txn(conn, draft.artwork_id).await?;
            }

            bump_venue_counter(conn, draft.venue_id).await?;

            diesel::update(users::table.filter(users::id.eq(draft.user_id.as_uuid())))
                .set(users::points.eq(users::points + points_earned))
                .execute(conn)
                .await?;

            Ok((row, is_first_scan, points_earned))
        }
        .scope_boxed()
    })
    .await
}

#[async_trait]
impl ScanStore for DieselScanStore {
    async fn record_member_scan(
        &self,
        draft: MemberScanDraft,
    ) -> Result<RecordedScan, ScanStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let first_attempt = member_scan_attempt(&mut conn, &draft, false).await;
        let (row, is_first_scan, points_earned) = match first_attempt {
            Ok(outcome) => outcome,
            Err(error) if lost_discovery_race(&error) => {
                member_scan_attempt(&mut conn, &draft, true)
                    .await
                    .map_err(map_txn_error)?
            }
            Err(error) => return Err(map_txn_error(error)),
        };

        Ok(RecordedScan {
            scan: row_to_scan(row),
            is_first_scan,
            points_earned,
        })
    }

    async fn record_guest_comment(
        &self,
        draft: GuestCommentDraft,
    ) -> Result<RecordedScan, ScanStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let outcome = conn
            .transaction(|conn| {
                let draft = &draft;
                async move {
                    if coaster_discovered(conn, draft.coaster_id).await? {
                        return Err(TxnError::AlreadyDiscovered);
                    }

                    let new_scan = NewScanRow {
                        id: Uuid::new_v4(),
                        user_id: None,
                        coaster_id: draft.coaster_id,
                        is_first_scan: true,
                        points_earned: 0,
                        latitude: None,
                        longitude: None,
                    };

                    let row: ScanRow = diesel::insert_into(scans::table)
                        .values(&new_scan)
                        .returning(ScanRow::as_returning())
                        .get_result(conn)
                        .await?;

                    let new_comment = NewCommentRow {
                        id: Uuid::new_v4(),
                        scan_id: row.id,
                        user_id: None,
                        content: draft.comment.as_str(),
                    };
                    diesel::insert_into(comments::table)
                        .values(&new_comment)
                        .execute(conn)
                        .await?;

                    approve_artwork_in_txn(conn, draft.artwork_id).await?;
                    bump_venue_counter(conn, draft.venue_id).await?;

                    Ok(row)
                }
                .scope_boxed()
            })
            .await;

        let row = match outcome {
            Ok(row) => row,
            // Another scan won the discovery between the existence check
            // and the insert.
            Err(error) if lost_discovery_race(&error) => {
                return Err(ScanStoreError::already_discovered());
            }
            Err(error) => return Err(map_txn_error(error)),
        };

        Ok(RecordedScan {
            scan: row_to_scan(row),
            is_first_scan: true,
            points_earned: 0,
        })
    }

    async fn approve_artwork(&self, artwork_id: Uuid) -> Result<(), ScanStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::update(artworks::table.filter(artworks::id.eq(artwork_id)))
            .set(artworks::status.eq(ArtworkStatus::Approved.as_str()))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn list_scans_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<ScanHistoryEntry>, ScanStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<(ScanRow, String, Option<String>)> = scans::table
            .inner_join(coasters::table.inner_join(artworks::table))
            .filter(scans::user_id.eq(user_id.as_uuid()))
            .order((scans::created_at.desc(), scans::id.desc()))
            .select((ScanRow::as_select(), coasters::code, artworks::title))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter()
            .map(|(scan_row, code, artwork_title)| {
                let code = CoasterCode::new(code)
                    .map_err(|err| ScanStoreError::query(err.to_string()))?;
                Ok(ScanHistoryEntry {
                    scan: row_to_scan(scan_row),
                    code,
                    artwork_title,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for error mapping and row conversion edge cases.

    use chrono::Utc;
    use rstest::{fixture, rstest};

    use super::*;

    #[fixture]
    fn scan_row() -> ScanRow {
        ScanRow {
            id: Uuid::new_v4(),
            user_id: Some(Uuid::new_v4()),
            coaster_id: Uuid::new_v4(),
            is_first_scan: true,
            points_earned: 10,
            latitude: Some(55.75),
            longitude: Some(37.61),
            created_at: Utc::now(),
        }
    }

    #[rstest]
    fn pool_error_maps_to_connection_error() {
        let store_err = map_pool_error(PoolError::checkout("connection refused"));

        assert!(matches!(store_err, ScanStoreError::Connection { .. }));
        assert!(store_err.to_string().contains("connection refused"));
    }

    #[rstest]
    fn limit_breach_maps_to_daily_limit_error() {
        let store_err = map_txn_error(TxnError::LimitExceeded);

        assert_eq!(
            store_err,
            ScanStoreError::daily_limit_exceeded(DAILY_SCAN_LIMIT)
        );
    }

    #[rstest]
    fn discovery_race_maps_to_already_discovered() {
        let store_err = map_txn_error(TxnError::AlreadyDiscovered);

        assert_eq!(store_err, ScanStoreError::already_discovered());
    }

    #[rstest]
    fn row_conversion_builds_location_from_coordinates(scan_row: ScanRow) {
        let scan = row_to_scan(scan_row);

        let location = scan.location.expect("coordinates present");
        assert_eq!(location.latitude, Some(55.75));
        assert_eq!(location.longitude, Some(37.61));
    }

    #[rstest]
    fn row_conversion_omits_location_without_coordinates(mut scan_row: ScanRow) {
        scan_row.latitude = None;
        scan_row.longitude = None;

        let scan = row_to_scan(scan_row);

        assert!(scan.location.is_none());
    }

    #[rstest]
    fn guest_scan_rows_carry_no_user(mut scan_row: ScanRow) {
        scan_row.user_id = None;

        let scan = row_to_scan(scan_row);

        assert!(scan.user_id.is_none());
    }

    #[rstest]
    fn non_index_diesel_errors_are_not_a_discovery_race() {
        let error = TxnError::Diesel(diesel::result::Error::NotFound);

        assert!(!lost_discovery_race(&error));
    }
}
