//! Driving port for scan-related reads.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::artwork::{Artwork, ArtworkStatus};
use crate::domain::coaster::{Coaster, CoasterStatus};
use crate::domain::code::CoasterCode;
use crate::domain::error::Error;
use crate::domain::ports::coaster_repository::ArtworkSummary;
use crate::domain::ports::scan_store::ScanHistoryEntry;
use crate::domain::user::UserId;

/// What an anonymous visitor sees when opening a coaster link.
#[derive(Debug, Clone, PartialEq)]
pub struct CoasterPreview {
    pub coaster: Coaster,
    pub artwork: Artwork,
    /// Whether the next member scan of this coaster would be a discovery.
    pub is_first_scan: bool,
}

/// Read operations invoked by public and member endpoints.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ScanQuery: Send + Sync {
    /// Resolve a coaster code for anonymous preview. Approves the artwork
    /// as a side effect when the coaster is still undiscovered.
    async fn preview(&self, code: &CoasterCode) -> Result<CoasterPreview, Error>;

    /// A member's scan history, newest first.
    async fn list_user_scans(&self, user_id: UserId) -> Result<Vec<ScanHistoryEntry>, Error>;

    /// Most recently created artworks for the public gallery strip.
    async fn latest_artworks(&self) -> Result<Vec<ArtworkSummary>, Error>;
}

/// Fixture resolving a single known code.
#[derive(Debug, Clone)]
pub struct FixtureScanQuery {
    pub known_code: CoasterCode,
    pub is_first_scan: bool,
    pub history: Vec<ScanHistoryEntry>,
}

impl Default for FixtureScanQuery {
    fn default() -> Self {
        Self {
            known_code: CoasterCode::new("A2B3").expect("fixture code is valid"),
            is_first_scan: true,
            history: Vec::new(),
        }
    }
}

#[async_trait]
impl ScanQuery for FixtureScanQuery {
    async fn preview(&self, code: &CoasterCode) -> Result<CoasterPreview, Error> {
        if code != &self.known_code {
            return Err(Error::not_found("coaster not found"));
        }
        let artwork = Artwork {
            id: Uuid::from_u128(3),
            title: Some("Untitled No. 5".to_owned()),
            description: None,
            image_url: None,
            status: ArtworkStatus::Approved,
            artist_id: Uuid::from_u128(4),
            created_at: chrono::Utc::now(),
        };
        Ok(CoasterPreview {
            coaster: Coaster {
                id: Uuid::from_u128(2),
                code: self.known_code.clone(),
                artwork_id: artwork.id,
                venue_id: None,
                status: CoasterStatus::Active,
                created_at: chrono::Utc::now(),
            },
            artwork,
            is_first_scan: self.is_first_scan,
        })
    }

    async fn list_user_scans(&self, _user_id: UserId) -> Result<Vec<ScanHistoryEntry>, Error> {
        Ok(self.history.clone())
    }

    async fn latest_artworks(&self) -> Result<Vec<ArtworkSummary>, Error> {
        Ok(Vec::new())
    }
}
