//! Driven port for coaster and artwork persistence.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::artwork::Artwork;
use crate::domain::coaster::Coaster;
use crate::domain::code::CoasterCode;
use crate::domain::ports::macros::define_port_error;

define_port_error! {
    /// Failures surfaced by [`CoasterRepository`] implementations.
    CoasterRepositoryError {
        /// The backing store could not be reached.
        Connection { message: String } => "storage connection failed: {message}",
        /// A statement failed after the connection was established.
        Query { message: String } => "storage query failed: {message}",
        /// An insert referenced an artwork or venue that does not exist.
        MissingReference { message: String } => "referenced row does not exist: {message}",
    }
}

/// Insert payload for a freshly provisioned coaster.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCoaster {
    pub code: CoasterCode,
    pub artwork_id: Uuid,
    pub venue_id: Option<Uuid>,
}

/// A coaster joined with its artwork and discovery state.
#[derive(Debug, Clone, PartialEq)]
pub struct CoasterRecord {
    pub coaster: Coaster,
    pub artwork: Artwork,
    /// Whether any first scan has already been recorded for this coaster.
    pub discovered: bool,
}

/// An artwork joined with its artist's display name.
#[derive(Debug, Clone, PartialEq)]
pub struct ArtworkSummary {
    pub artwork: Artwork,
    pub artist_name: Option<String>,
}

/// Persistence operations over coasters and their artworks.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CoasterRepository: Send + Sync {
    /// Whether a coaster with the given code already exists.
    async fn code_exists(&self, code: &CoasterCode) -> Result<bool, CoasterRepositoryError>;

    /// Insert a new coaster row.
    ///
    /// Fails with [`CoasterRepositoryError::MissingReference`] when the
    /// artwork or venue id does not resolve, and with a unique-violation
    /// [`CoasterRepositoryError::Query`] when the code raced another insert.
    async fn create(&self, coaster: NewCoaster) -> Result<Coaster, CoasterRepositoryError>;

    /// Look up a coaster with its artwork by code.
    async fn find_by_code(
        &self,
        code: &CoasterCode,
    ) -> Result<Option<CoasterRecord>, CoasterRepositoryError>;

    /// Most recently created artworks, newest first.
    async fn latest_artworks(
        &self,
        limit: i64,
    ) -> Result<Vec<ArtworkSummary>, CoasterRepositoryError>;
}

/// In-memory fixture used by handler tests and examples.
#[derive(Debug, Clone, Default)]
pub struct FixtureCoasterRepository {
    /// Records returned by [`CoasterRepository::find_by_code`] keyed by code.
    pub records: Vec<CoasterRecord>,
}

#[async_trait]
impl CoasterRepository for FixtureCoasterRepository {
    async fn code_exists(&self, code: &CoasterCode) -> Result<bool, CoasterRepositoryError> {
        Ok(self.records.iter().any(|r| &r.coaster.code == code))
    }

    async fn create(&self, coaster: NewCoaster) -> Result<Coaster, CoasterRepositoryError> {
        Ok(Coaster {
            id: Uuid::new_v4(),
            code: coaster.code,
            artwork_id: coaster.artwork_id,
            venue_id: coaster.venue_id,
            status: crate::domain::coaster::CoasterStatus::Active,
            created_at: chrono::Utc::now(),
        })
    }

    async fn find_by_code(
        &self,
        code: &CoasterCode,
    ) -> Result<Option<CoasterRecord>, CoasterRepositoryError> {
        Ok(self
            .records
            .iter()
            .find(|r| &r.coaster.code == code)
            .cloned())
    }

    async fn latest_artworks(
        &self,
        limit: i64,
    ) -> Result<Vec<ArtworkSummary>, CoasterRepositoryError> {
        Ok(self
            .records
            .iter()
            .take(usize::try_from(limit).unwrap_or(usize::MAX))
            .map(|r| ArtworkSummary {
                artwork: r.artwork.clone(),
                artist_name: None,
            })
            .collect())
    }
}
