//! The coaster-scan transaction and its read-side companions.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::artwork::ArtworkStatus;
use crate::domain::code::CoasterCode;
use crate::domain::error::Error;
use crate::domain::ports::{
    ArtworkSummary, CoasterPreview, CoasterRecord, CoasterRepository, CoasterRepositoryError,
    GuestCommentDraft, GuestCommentRequest, MemberScanDraft, RecordScanRequest, ScanCommand,
    ScanHistoryEntry, ScanQuery, ScanReceipt, ScanStore, ScanStoreError,
};
use crate::domain::user::UserId;

/// Artworks returned by the public latest-artworks strip.
const LATEST_ARTWORKS_LIMIT: i64 = 10;

/// Records scans and serves scan-related reads over the driven ports.
pub struct ScanService<C, S> {
    coaster_repo: Arc<C>,
    scan_store: Arc<S>,
}

impl<C, S> ScanService<C, S>
where
    C: CoasterRepository,
    S: ScanStore,
{
    pub fn new(coaster_repo: Arc<C>, scan_store: Arc<S>) -> Self {
        Self {
            coaster_repo,
            scan_store,
        }
    }

    async fn resolve_code(&self, code: &CoasterCode) -> Result<CoasterRecord, Error> {
        self.coaster_repo
            .find_by_code(code)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| Error::not_found("coaster not found"))
    }
}

#[async_trait]
impl<C, S> ScanCommand for ScanService<C, S>
where
    C: CoasterRepository,
    S: ScanStore,
{
    async fn record_scan(&self, request: RecordScanRequest) -> Result<ScanReceipt, Error> {
        let record = self.resolve_code(&request.code).await?;
        let recorded = self
            .scan_store
            .record_member_scan(MemberScanDraft {
                user_id: request.user_id,
                coaster_id: record.coaster.id,
                artwork_id: record.artwork.id,
                venue_id: record.coaster.venue_id,
                location: request.location,
                comment: request.comment,
            })
            .await
            .map_err(map_store_error)?;

        let mut artwork = record.artwork;
        if recorded.is_first_scan {
            // The store approved the row inside the transaction; mirror it
            // on the copy handed back to the client.
            artwork.status = ArtworkStatus::Approved;
        }
        Ok(ScanReceipt {
            scan: recorded.scan,
            is_first_scan: recorded.is_first_scan,
            points_earned: recorded.points_earned,
            artwork,
        })
    }

    async fn record_guest_comment(
        &self,
        request: GuestCommentRequest,
    ) -> Result<ScanReceipt, Error> {
        let record = self.resolve_code(&request.code).await?;
        if record.discovered {
            return Err(Error::forbidden(
                "comments are only allowed on the first scan",
            ));
        }
        let recorded = self
            .scan_store
            .record_guest_comment(GuestCommentDraft {
                coaster_id: record.coaster.id,
                artwork_id: record.artwork.id,
                venue_id: record.coaster.venue_id,
                comment: request.comment,
            })
            .await
            .map_err(|err| match err {
                ScanStoreError::AlreadyDiscovered {} => Error::forbidden(
                    "comments are only allowed on the first scan",
                ),
                other => map_store_error(other),
            })?;

        let mut artwork = record.artwork;
        artwork.status = ArtworkStatus::Approved;
        Ok(ScanReceipt {
            scan: recorded.scan,
            is_first_scan: recorded.is_first_scan,
            points_earned: recorded.points_earned,
            artwork,
        })
    }
}

#[async_trait]
impl<C, S> ScanQuery for ScanService<C, S>
where
    C: CoasterRepository,
    S: ScanStore,
{
    async fn preview(&self, code: &CoasterCode) -> Result<CoasterPreview, Error> {
        let record = self.resolve_code(code).await?;
        let mut artwork = record.artwork;
        if !record.discovered {
            // Opening the link reveals the artwork even before a member
            // scan claims the discovery bonus.
            self.scan_store
                .approve_artwork(artwork.id)
                .await
                .map_err(map_store_error)?;
            artwork.status = ArtworkStatus::Approved;
        }
        Ok(CoasterPreview {
            coaster: record.coaster,
            artwork,
            is_first_scan: !record.discovered,
        })
    }

    async fn list_user_scans(&self, user_id: UserId) -> Result<Vec<ScanHistoryEntry>, Error> {
        self.scan_store
            .list_scans_for_user(user_id)
            .await
            .map_err(map_store_error)
    }

    async fn latest_artworks(&self) -> Result<Vec<ArtworkSummary>, Error> {
        self.coaster_repo
            .latest_artworks(LATEST_ARTWORKS_LIMIT)
            .await
            .map_err(map_repository_error)
    }
}

fn map_repository_error(err: CoasterRepositoryError) -> Error {
    match err {
        CoasterRepositoryError::Connection { message } => {
            tracing::error!(error = %message, "coaster storage unreachable");
            Error::service_unavailable("storage is temporarily unavailable")
        }
        CoasterRepositoryError::Query { message } => {
            tracing::error!(error = %message, "coaster storage query failed");
            Error::internal("storage query failed")
        }
        CoasterRepositoryError::MissingReference { message } => Error::not_found(message),
    }
}

fn map_store_error(err: ScanStoreError) -> Error {
    match err {
        ScanStoreError::Connection { message } => {
            tracing::error!(error = %message, "scan storage unreachable");
            Error::service_unavailable("storage is temporarily unavailable")
        }
        ScanStoreError::Query { message } => {
            tracing::error!(error = %message, "scan storage query failed");
            Error::internal("storage query failed")
        }
        ScanStoreError::DailyLimitExceeded { limit } => {
            Error::forbidden(format!("daily scan limit of {limit} reached"))
        }
        ScanStoreError::AlreadyDiscovered {} => {
            Error::conflict("coaster has already been discovered")
        }
    }
}

#[cfg(test)]
#[path = "scan_service_tests.rs"]
mod tests;
