//! PostgreSQL-backed `CoasterRepository` implementation using Diesel ORM.
//!
//! This adapter persists provisioned coasters and resolves codes to their
//! artwork through validated domain constructors.

use async_trait::async_trait;
use diesel::dsl::exists;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::coaster::Coaster;
use crate::domain::code::CoasterCode;
use crate::domain::ports::{
    ArtworkSummary, CoasterRecord, CoasterRepository, CoasterRepositoryError, NewCoaster,
};
use crate::domain::{Artwork, CoasterStatus};

use super::error_mapping::{
    is_foreign_key_violation, log_diesel_error, map_basic_diesel_error, map_basic_pool_error,
};
use super::models::{ArtworkRow, CoasterRow, NewCoasterRow};
use super::pool::{DbPool, PoolError};
use super::schema::{artworks, coasters, scans, users};

/// Diesel-backed implementation of the coaster repository port.
#[derive(Clone)]
pub struct DieselCoasterRepository {
    pool: DbPool,
}

impl DieselCoasterRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Map pool errors to domain repository errors.
fn map_pool_error(error: PoolError) -> CoasterRepositoryError {
    map_basic_pool_error(error, CoasterRepositoryError::connection)
}

/// Map Diesel errors to domain repository errors.
fn map_diesel_error(error: diesel::result::Error) -> CoasterRepositoryError {
    map_basic_diesel_error(
        error,
        CoasterRepositoryError::query,
        CoasterRepositoryError::connection,
    )
}

/// Map insert errors, surfacing dangling artwork or venue references.
fn map_insert_error(error: diesel::result::Error) -> CoasterRepositoryError {
    if is_foreign_key_violation(&error) {
        log_diesel_error(&error);
        return CoasterRepositoryError::missing_reference("artwork or venue does not exist");
    }
    map_diesel_error(error)
}

/// Convert a database row into a validated domain coaster.
fn row_to_coaster(row: CoasterRow) -> Result<Coaster, CoasterRepositoryError> {
    let CoasterRow {
        id,
        code,
        artwork_id,
        venue_id,
        status,
        created_at,
    } = row;

    let code = CoasterCode::new(code).map_err(|err| CoasterRepositoryError::query(err.to_string()))?;
    let status: CoasterStatus = status
        .parse()
        .map_err(|err: crate::domain::artwork::UnknownStatus| CoasterRepositoryError::query(err.to_string()))?;

    Ok(Coaster {
        id,
        code,
        artwork_id,
        venue_id,
        status,
        created_at,
    })
}

/// Convert a database row into a domain artwork.
fn row_to_artwork(row: ArtworkRow) -> Result<Artwork, CoasterRepositoryError> {
    let ArtworkRow {
        id,
        title,
        description,
        image_url,
        status,
        artist_id,
        created_at,
    } = row;

    let status = status
        .parse()
        .map_err(|err: crate::domain::artwork::UnknownStatus| CoasterRepositoryError::query(err.to_string()))?;

    Ok(Artwork {
        id,
        title,
        description,
        image_url,
        status,
        artist_id,
        created_at,
    })
}

#[async_trait]
impl CoasterRepository for DieselCoasterRepository {
    async fn code_exists(&self, code: &CoasterCode) -> Result<bool, CoasterRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::select(exists(
            coasters::table.filter(coasters::code.eq(code.as_str())),
        ))
        .get_result(&mut conn)
        .await
        .map_err(map_diesel_error)
    }

    async fn create(&self, coaster: NewCoaster) -> Result<Coaster, CoasterRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewCoasterRow {
            id: Uuid::new_v4(),
            code: coaster.code.as_str(),
            artwork_id: coaster.artwork_id,
            venue_id: coaster.venue_id,
            status: CoasterStatus::Active.as_str(),
        };

        let row: CoasterRow = diesel::insert_into(coasters::table)
            .values(&new_row)
            .returning(CoasterRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_insert_error)?;

        row_to_coaster(row)
    }

    async fn find_by_code(
        &self,
        code: &CoasterCode,
    ) -> Result<Option<CoasterRecord>, CoasterRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let joined: Option<(CoasterRow, ArtworkRow, bool)> = coasters::table
            .inner_join(artworks::table)
            .filter(coasters::code.eq(code.as_str()))
            .select((
                CoasterRow::as_select(),
                ArtworkRow::as_select(),
                exists(
                    scans::table.filter(
                        scans::coaster_id
                            .eq(coasters::id)
                            .and(scans::is_first_scan.eq(true)),
                    ),
                ),
            ))
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        joined
            .map(|(coaster_row, artwork_row, discovered)| {
                Ok(CoasterRecord {
                    coaster: row_to_coaster(coaster_row)?,
                    artwork: row_to_artwork(artwork_row)?,
                    discovered,
                })
            })
            .transpose()
    }

    async fn latest_artworks(
        &self,
        limit: i64,
    ) -> Result<Vec<ArtworkSummary>, CoasterRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<(ArtworkRow, Option<String>)> = artworks::table
            .inner_join(users::table)
            .order(artworks::created_at.desc())
            .limit(limit)
            .select((ArtworkRow::as_select(), users::name.nullable()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter()
            .map(|(artwork_row, artist_name)| {
                Ok(ArtworkSummary {
                    artwork: row_to_artwork(artwork_row)?,
                    artist_name,
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
    fn valid_row() -> CoasterRow {
        CoasterRow {
            id: Uuid::new_v4(),
            code: "A2B3".to_owned(),
            artwork_id: Uuid::new_v4(),
            venue_id: None,
            status: "ACTIVE".to_owned(),
            created_at: Utc::now(),
        }
    }

    #[rstest]
    fn pool_error_maps_to_connection_error() {
        let repo_err = map_pool_error(PoolError::checkout("connection refused"));

        assert!(matches!(repo_err, CoasterRepositoryError::Connection { .. }));
        assert!(repo_err.to_string().contains("connection refused"));
    }

    #[rstest]
    fn diesel_not_found_maps_to_query_error() {
        let repo_err = map_diesel_error(diesel::result::Error::NotFound);

        assert!(matches!(repo_err, CoasterRepositoryError::Query { .. }));
        assert!(repo_err.to_string().contains("record not found"));
    }

    #[rstest]
    fn row_conversion_accepts_valid_row(valid_row: CoasterRow) {
        let coaster = row_to_coaster(valid_row).expect("valid row converts");

        assert_eq!(coaster.code.as_str(), "A2B3");
        assert_eq!(coaster.status, CoasterStatus::Active);
    }

    #[rstest]
    fn row_conversion_rejects_malformed_code(mut valid_row: CoasterRow) {
        valid_row.code = "A2B".to_owned();

        let error = row_to_coaster(valid_row).expect_err("short code should fail");
        assert!(matches!(error, CoasterRepositoryError::Query { .. }));
    }

    #[rstest]
    fn row_conversion_rejects_unknown_status(mut valid_row: CoasterRow) {
        valid_row.status = "LOST".to_owned();

        let error = row_to_coaster(valid_row).expect_err("unknown status should fail");
        assert!(matches!(error, CoasterRepositoryError::Query { .. }));
        assert!(error.to_string().contains("LOST"));
    }
}
