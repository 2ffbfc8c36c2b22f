//! Driving port for provisioning coasters.

use async_trait::async_trait;
use url::Url;
use uuid::Uuid;

use crate::domain::coaster::{Coaster, CoasterStatus};
use crate::domain::code::CoasterCode;
use crate::domain::error::Error;

/// Maximum number of coasters accepted in a single batch request.
pub const MAX_BATCH_SIZE: usize = 100;

/// Request to provision one coaster for an existing artwork.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreateCoasterRequest {
    pub artwork_id: Uuid,
    pub venue_id: Option<Uuid>,
}

/// Request to provision up to [`MAX_BATCH_SIZE`] coasters for one artwork.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchCreateCoastersRequest {
    pub artwork_id: Uuid,
    pub count: usize,
    pub venue_id: Option<Uuid>,
}

/// A provisioned coaster together with its printable share link.
#[derive(Debug, Clone, PartialEq)]
pub struct ProvisionedCoaster {
    pub coaster: Coaster,
    pub share_url: Url,
}

/// Operations invoked by admin provisioning endpoints.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CoasterProvisioning: Send + Sync {
    /// Allocate a unique code and insert one coaster.
    async fn create_coaster(
        &self,
        request: CreateCoasterRequest,
    ) -> Result<ProvisionedCoaster, Error>;

    /// Provision a batch of coasters, validating the batch size up front.
    async fn batch_create(
        &self,
        request: BatchCreateCoastersRequest,
    ) -> Result<Vec<ProvisionedCoaster>, Error>;
}

/// Fixture minting deterministic coasters for handler tests.
#[derive(Debug, Clone)]
pub struct FixtureCoasterProvisioning {
    pub code: CoasterCode,
    pub share_domain: String,
}

impl Default for FixtureCoasterProvisioning {
    fn default() -> Self {
        Self {
            code: CoasterCode::new("A2B3").expect("fixture code is valid"),
            share_domain: "zd.md".to_owned(),
        }
    }
}

impl FixtureCoasterProvisioning {
    fn mint(&self, request: CreateCoasterRequest) -> ProvisionedCoaster {
        let share_url = Url::parse(&format!("https://{}/{}", self.share_domain, self.code))
            .expect("fixture url is valid");
        ProvisionedCoaster {
            coaster: Coaster {
                id: Uuid::new_v4(),
                code: self.code.clone(),
                artwork_id: request.artwork_id,
                venue_id: request.venue_id,
                status: CoasterStatus::Active,
                created_at: chrono::Utc::now(),
            },
            share_url,
        }
    }
}

#[async_trait]
impl CoasterProvisioning for FixtureCoasterProvisioning {
    async fn create_coaster(
        &self,
        request: CreateCoasterRequest,
    ) -> Result<ProvisionedCoaster, Error> {
        Ok(self.mint(request))
    }

    async fn batch_create(
        &self,
        request: BatchCreateCoastersRequest,
    ) -> Result<Vec<ProvisionedCoaster>, Error> {
        if request.count == 0 || request.count > MAX_BATCH_SIZE {
            return Err(Error::invalid_request(format!(
                "batch size must be between 1 and {MAX_BATCH_SIZE}"
            )));
        }
        Ok((0..request.count)
            .map(|_| {
                self.mint(CreateCoasterRequest {
                    artwork_id: request.artwork_id,
                    venue_id: request.venue_id,
                })
            })
            .collect())
    }
}
