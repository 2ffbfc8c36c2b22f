//! Driven port for recording scans.
//!
//! Implementations must make [`ScanStore::record_member_scan`] atomic: the
//! scan row, the daily counter, the point award, the artwork approval, and
//! the venue counter all commit together or not at all.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::code::CoasterCode;
use crate::domain::ports::macros::define_port_error;
use crate::domain::scan::{points_for, CommentText, GeoPoint, Scan};
use crate::domain::user::UserId;

define_port_error! {
    /// Failures surfaced by [`ScanStore`] implementations.
    ScanStoreError {
        /// The backing store could not be reached.
        Connection { message: String } => "storage connection failed: {message}",
        /// A statement failed after the connection was established.
        Query { message: String } => "storage query failed: {message}",
        /// The member already recorded their full quota of scans today.
        DailyLimitExceeded { limit: i32 } => "daily scan limit of {limit} reached",
        /// A guest comment targeted a coaster that has already been discovered.
        AlreadyDiscovered {} => "coaster has already been discovered",
    }
}

/// Payload for a member scan, assembled by the service after code lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberScanDraft {
    pub user_id: UserId,
    pub coaster_id: Uuid,
    pub artwork_id: Uuid,
    pub venue_id: Option<Uuid>,
    pub location: Option<GeoPoint>,
    /// Stored only when this scan turns out to be the first scan.
    pub comment: Option<CommentText>,
}

/// Payload for a guest comment on an undiscovered coaster.
#[derive(Debug, Clone, PartialEq)]
pub struct GuestCommentDraft {
    pub coaster_id: Uuid,
    pub artwork_id: Uuid,
    pub venue_id: Option<Uuid>,
    pub comment: CommentText,
}

/// Outcome of a committed member scan.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedScan {
    pub scan: Scan,
    pub is_first_scan: bool,
    pub points_earned: i32,
}

/// A past scan joined with the coaster code and artwork title for display.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanHistoryEntry {
    pub scan: Scan,
    pub code: CoasterCode,
    pub artwork_title: Option<String>,
}

/// Transactional scan persistence.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ScanStore: Send + Sync {
    /// Record a member scan, deciding first-scan status and points inside
    /// the transaction.
    ///
    /// Returns [`ScanStoreError::DailyLimitExceeded`] without any visible
    /// write when the member's daily quota is spent.
    async fn record_member_scan(
        &self,
        draft: MemberScanDraft,
    ) -> Result<RecordedScan, ScanStoreError>;

    /// Record a guest's first-scan comment.
    ///
    /// Returns [`ScanStoreError::AlreadyDiscovered`] when another scan won
    /// the discovery in the meantime.
    async fn record_guest_comment(
        &self,
        draft: GuestCommentDraft,
    ) -> Result<RecordedScan, ScanStoreError>;

    /// Flip an artwork to approved. Idempotent.
    async fn approve_artwork(&self, artwork_id: Uuid) -> Result<(), ScanStoreError>;

    /// A member's scan history, newest first.
    async fn list_scans_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<ScanHistoryEntry>, ScanStoreError>;
}

/// In-memory fixture that treats every scan as a repeat scan.
#[derive(Debug, Clone, Default)]
pub struct FixtureScanStore {
    /// When set, member scans are recorded as discoveries.
    pub next_scan_is_first: bool,
    /// History returned by [`ScanStore::list_scans_for_user`].
    pub history: Vec<ScanHistoryEntry>,
}

#[async_trait]
impl ScanStore for FixtureScanStore {
    async fn record_member_scan(
        &self,
        draft: MemberScanDraft,
    ) -> Result<RecordedScan, ScanStoreError> {
        let is_first_scan = self.next_scan_is_first;
        let points_earned = points_for(is_first_scan);
        Ok(RecordedScan {
            scan: Scan {
                id: Uuid::new_v4(),
                user_id: Some(draft.user_id),
                coaster_id: draft.coaster_id,
                is_first_scan,
                points_earned,
                location: draft.location,
                created_at: chrono::Utc::now(),
            },
            is_first_scan,
            points_earned,
        })
    }

    async fn record_guest_comment(
        &self,
        draft: GuestCommentDraft,
    ) -> Result<RecordedScan, ScanStoreError> {
        Ok(RecordedScan {
            scan: Scan {
                id: Uuid::new_v4(),
                user_id: None,
                coaster_id: draft.coaster_id,
                is_first_scan: true,
                points_earned: 0,
                location: None,
                created_at: chrono::Utc::now(),
            },
            is_first_scan: true,
            points_earned: 0,
        })
    }

    async fn approve_artwork(&self, _artwork_id: Uuid) -> Result<(), ScanStoreError> {
        Ok(())
    }

    async fn list_scans_for_user(
        &self,
        _user_id: UserId,
    ) -> Result<Vec<ScanHistoryEntry>, ScanStoreError> {
        Ok(self.history.clone())
    }
}
