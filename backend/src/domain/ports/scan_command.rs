//! Driving port for the scan transaction.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::artwork::{Artwork, ArtworkStatus};
use crate::domain::code::CoasterCode;
use crate::domain::error::Error;
use crate::domain::scan::{points_for, CommentText, GeoPoint, Scan};
use crate::domain::user::UserId;

/// A member's request to record a scan of a coaster code.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordScanRequest {
    pub user_id: UserId,
    pub code: CoasterCode,
    /// Stored only if this scan discovers the coaster.
    pub comment: Option<CommentText>,
    pub location: Option<GeoPoint>,
}

/// A guest's request to leave a comment on an undiscovered coaster.
#[derive(Debug, Clone, PartialEq)]
pub struct GuestCommentRequest {
    pub code: CoasterCode,
    pub comment: CommentText,
}

/// Outcome of a recorded scan, returned to the scanning client.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanReceipt {
    pub scan: Scan,
    pub is_first_scan: bool,
    pub points_earned: i32,
    /// The artwork revealed by the scan, with any approval applied.
    pub artwork: Artwork,
}

/// Scan-recording operations invoked by HTTP handlers.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ScanCommand: Send + Sync {
    /// Record a member scan and award points.
    async fn record_scan(&self, request: RecordScanRequest) -> Result<ScanReceipt, Error>;

    /// Record a guest comment, which also marks the coaster discovered.
    async fn record_guest_comment(
        &self,
        request: GuestCommentRequest,
    ) -> Result<ScanReceipt, Error>;
}

/// Fixture returning a canned receipt for any known code.
#[derive(Debug, Clone)]
pub struct FixtureScanCommand {
    pub known_code: CoasterCode,
    pub is_first_scan: bool,
}

impl Default for FixtureScanCommand {
    fn default() -> Self {
        Self {
            known_code: CoasterCode::new("A2B3").expect("fixture code is valid"),
            is_first_scan: false,
        }
    }
}

impl FixtureScanCommand {
    fn receipt(&self, user_id: Option<UserId>, location: Option<GeoPoint>) -> ScanReceipt {
        let points_earned = user_id.map_or(0, |_| points_for(self.is_first_scan));
        let coaster_id = Uuid::from_u128(2);
        ScanReceipt {
            scan: Scan {
                id: Uuid::new_v4(),
                user_id,
                coaster_id,
                is_first_scan: self.is_first_scan,
                points_earned,
                location,
                created_at: chrono::Utc::now(),
            },
            is_first_scan: self.is_first_scan,
            points_earned,
            artwork: Artwork {
                id: Uuid::from_u128(3),
                title: Some("Untitled No. 5".to_owned()),
                description: None,
                image_url: None,
                status: ArtworkStatus::Approved,
                artist_id: Uuid::from_u128(4),
                created_at: chrono::Utc::now(),
            },
        }
    }
}

#[async_trait]
impl ScanCommand for FixtureScanCommand {
    async fn record_scan(&self, request: RecordScanRequest) -> Result<ScanReceipt, Error> {
        if request.code != self.known_code {
            return Err(Error::not_found("coaster not found"));
        }
        Ok(self.receipt(Some(request.user_id), request.location))
    }

    async fn record_guest_comment(
        &self,
        request: GuestCommentRequest,
    ) -> Result<ScanReceipt, Error> {
        if request.code != self.known_code {
            return Err(Error::not_found("coaster not found"));
        }
        Ok(self.receipt(None, None))
    }
}
