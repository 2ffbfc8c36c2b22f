//! Coaster aggregate.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::artwork::UnknownStatus;
use crate::domain::code::CoasterCode;

/// Lifecycle status of a physical coaster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CoasterStatus {
    Active,
    Retired,
}

impl CoasterStatus {
    /// Stable storage representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Retired => "RETIRED",
        }
    }
}

impl fmt::Display for CoasterStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CoasterStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ACTIVE" => Ok(Self::Active),
            "RETIRED" => Ok(Self::Retired),
            other => Err(UnknownStatus(other.to_owned())),
        }
    }
}

/// Physical coaster bearing a unique short code.
///
/// ## Invariants
/// - `code` is unique among all coasters at any point in time (enforced by
///   the store's unique constraint; the allocator only narrows the retry
///   window).
/// - A coaster references exactly one artwork and at most one venue, fixed
///   at provisioning time; only `status` changes afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coaster {
    pub id: Uuid,
    pub code: CoasterCode,
    pub artwork_id: Uuid,
    pub venue_id: Option<Uuid>,
    pub status: CoasterStatus,
    pub created_at: DateTime<Utc>,
}
