//! Scan records and the rules governing point awards.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::user::UserId;

/// Maximum number of point-earning scans a member may record per UTC day.
pub const DAILY_SCAN_LIMIT: i32 = 5;

/// Points awarded for the first scan of a coaster, ever, by anyone.
pub const FIRST_SCAN_POINTS: i32 = 10;

/// Points awarded for every subsequent scan of an already discovered coaster.
pub const REPEAT_SCAN_POINTS: i32 = 1;

/// Maximum comment length in characters.
pub const COMMENT_MAX_LEN: usize = 144;

/// Points awarded for a scan given whether it discovered the coaster.
pub fn points_for(is_first_scan: bool) -> i32 {
    if is_first_scan {
        FIRST_SCAN_POINTS
    } else {
        REPEAT_SCAN_POINTS
    }
}

/// Optional client-reported location attached to a scan.
///
/// Either coordinate may be absent; the pair is stored verbatim and never
/// validated against a geography, matching what scanning clients send.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GeoPoint {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// A recorded scan event.
///
/// `user_id` is `None` for guest comments, which create a scan row to anchor
/// the comment but award no points and never count as a discovery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scan {
    pub id: Uuid,
    pub user_id: Option<UserId>,
    pub coaster_id: Uuid,
    pub is_first_scan: bool,
    pub points_earned: i32,
    pub location: Option<GeoPoint>,
    pub created_at: DateTime<Utc>,
}

/// Validation errors raised when constructing [`CommentText`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanValidationError {
    EmptyComment,
    CommentTooLong { max: usize },
}

impl fmt::Display for ScanValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyComment => write!(f, "comment must not be empty"),
            Self::CommentTooLong { max } => {
                write!(f, "comment must be at most {max} characters")
            }
        }
    }
}

impl std::error::Error for ScanValidationError {}

/// Validated comment body attached to a first scan.
///
/// ## Invariants
/// - Non-empty after trimming surrounding whitespace.
/// - At most [`COMMENT_MAX_LEN`] characters (`char` count, not bytes).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CommentText(String);

impl CommentText {
    /// Trim, validate, and construct a [`CommentText`].
    pub fn new(text: impl AsRef<str>) -> Result<Self, ScanValidationError> {
        let trimmed = text.as_ref().trim();
        if trimmed.is_empty() {
            return Err(ScanValidationError::EmptyComment);
        }
        if trimmed.chars().count() > COMMENT_MAX_LEN {
            return Err(ScanValidationError::CommentTooLong {
                max: COMMENT_MAX_LEN,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the comment as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for CommentText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<CommentText> for String {
    fn from(value: CommentText) -> Self {
        value.0
    }
}

impl TryFrom<String> for CommentText {
    type Error = ScanValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}
