//! Coaster provisioning: unique code allocation and batch creation.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use rand::{rngs::SmallRng, Rng, SeedableRng};
use url::Url;

use crate::domain::code::{CoasterCode, CODE_ALPHABET, CODE_LENGTH};
use crate::domain::error::Error;
use crate::domain::ports::{
    BatchCreateCoastersRequest, CoasterProvisioning, CoasterRepository, CoasterRepositoryError,
    CreateCoasterRequest, NewCoaster, ProvisionedCoaster, MAX_BATCH_SIZE,
};

/// Random draws attempted before falling back to a time-derived code.
const MAX_CODE_ATTEMPTS: usize = 10;

/// Provisions coasters against a [`CoasterRepository`].
pub struct ProvisioningService<R> {
    coaster_repo: Arc<R>,
    share_domain: String,
}

impl<R> ProvisioningService<R>
where
    R: CoasterRepository,
{
    /// Build the service over a repository and the public share domain.
    pub fn new(coaster_repo: Arc<R>, share_domain: impl Into<String>) -> Self {
        Self {
            coaster_repo,
            share_domain: share_domain.into(),
        }
    }

    /// Draw random codes until one is free, then fall back to a
    /// timestamp-suffixed code checked once more against storage.
    async fn allocate_unique_code(&self) -> Result<CoasterCode, Error> {
        for _ in 0..MAX_CODE_ATTEMPTS {
            let candidate = random_code();
            if !self
                .coaster_repo
                .code_exists(&candidate)
                .await
                .map_err(map_repository_error)?
            {
                return Ok(candidate);
            }
        }
        let fallback = fallback_code(Utc::now().timestamp_millis());
        if self
            .coaster_repo
            .code_exists(&fallback)
            .await
            .map_err(map_repository_error)?
        {
            return Err(Error::conflict("could not allocate a unique coaster code"));
        }
        Ok(fallback)
    }

    fn share_url(&self, code: &CoasterCode) -> Result<Url, Error> {
        Url::parse(&format!("https://{}/{}", self.share_domain, code)).map_err(|err| {
            tracing::error!(error = %err, domain = %self.share_domain, "share domain is not a valid host");
            Error::internal("share link construction failed")
        })
    }

    async fn provision_one(
        &self,
        request: CreateCoasterRequest,
    ) -> Result<ProvisionedCoaster, Error> {
        let code = self.allocate_unique_code().await?;
        let share_url = self.share_url(&code)?;
        let coaster = self
            .coaster_repo
            .create(NewCoaster {
                code,
                artwork_id: request.artwork_id,
                venue_id: request.venue_id,
            })
            .await
            .map_err(map_repository_error)?;
        Ok(ProvisionedCoaster { coaster, share_url })
    }
}

#[async_trait]
impl<R> CoasterProvisioning for ProvisioningService<R>
where
    R: CoasterRepository,
{
    async fn create_coaster(
        &self,
        request: CreateCoasterRequest,
    ) -> Result<ProvisionedCoaster, Error> {
        self.provision_one(request).await
    }

    /// Provisions sequentially; a mid-batch failure leaves the coasters
    /// created so far intact.
    async fn batch_create(
        &self,
        request: BatchCreateCoastersRequest,
    ) -> Result<Vec<ProvisionedCoaster>, Error> {
        if request.count == 0 || request.count > MAX_BATCH_SIZE {
            return Err(Error::invalid_request(format!(
                "batch size must be between 1 and {MAX_BATCH_SIZE}"
            )));
        }
        let mut provisioned = Vec::with_capacity(request.count);
        for _ in 0..request.count {
            provisioned.push(
                self.provision_one(CreateCoasterRequest {
                    artwork_id: request.artwork_id,
                    venue_id: request.venue_id,
                })
                .await?,
            );
        }
        Ok(provisioned)
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

fn alphabet_symbol(index: usize) -> char {
    CODE_ALPHABET.as_bytes()[index % CODE_ALPHABET.len()] as char
}

/// Uniformly random code over the coaster alphabet.
///
/// Kept synchronous so the non-`Send` thread RNG never crosses an await.
fn random_code() -> CoasterCode {
    let mut rng = SmallRng::from_entropy();
    let code: String = (0..CODE_LENGTH)
        .map(|_| alphabet_symbol(rng.gen_range(0..CODE_ALPHABET.len())))
        .collect();
    CoasterCode::new(code).expect("generated code is drawn from the alphabet")
}

/// Code whose last two symbols derive from the clock, shrinking the
/// collision window after repeated random misses.
fn fallback_code(now_millis: i64) -> CoasterCode {
    let mut rng = SmallRng::from_entropy();
    let symbols = CODE_ALPHABET.len() as i64;
    let mut code: String = (0..CODE_LENGTH - 2)
        .map(|_| alphabet_symbol(rng.gen_range(0..CODE_ALPHABET.len())))
        .collect();
    code.push(alphabet_symbol(((now_millis / symbols) % symbols) as usize));
    code.push(alphabet_symbol((now_millis % symbols) as usize));
    CoasterCode::new(code).expect("generated code is drawn from the alphabet")
}

#[cfg(test)]
#[path = "provisioning_service_tests.rs"]
mod tests;
