//! Helpers for bootstrapping embedded PostgreSQL in integration tests.
//!
//! `pg-embed-setup-unpriv` defaults to using `/var/tmp` for installation and
//! data directories. Sandboxed CI runners often block writes outside the
//! workspace, so the bootstrap below redirects both paths into the cargo
//! target directory before starting the cluster.

use std::path::PathBuf;
use std::sync::OnceLock;
use std::time::Duration;

use pg_embedded_setup_unpriv::{ClusterHandle, TestCluster};
use uuid::Uuid;

/// Maximum number of retry attempts for transient network errors.
const MAX_RETRIES: u32 = 3;

/// Base delay between retry attempts (doubles with each retry).
const RETRY_DELAY_MS: u64 = 500;

static CLUSTER: OnceLock<Result<ClusterHandle, String>> = OnceLock::new();

fn pg_embed_target_dir() -> PathBuf {
    if let Some(target_dir) = std::env::var_os("CARGO_TARGET_DIR") {
        return PathBuf::from(target_dir).join("pg-embed");
    }
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("target")
        .join("pg-embed")
}

fn create_unique_pg_embed_dirs() -> Result<(PathBuf, PathBuf), std::io::Error> {
    let unique = format!("bootstrap-{}-{}", std::process::id(), Uuid::new_v4());
    let base = pg_embed_target_dir().join(unique);
    let runtime_dir = base.join("install");
    let data_dir = base.join("data");

    std::fs::create_dir_all(&runtime_dir)?;
    std::fs::create_dir_all(&data_dir)?;

    Ok((runtime_dir, data_dir))
}

/// Returns true if the error message suggests a transient network issue.
fn is_transient_error(err: &str) -> bool {
    let transient_patterns = [
        "error decoding response body",
        "connection reset",
        "connection refused",
        "timeout",
        "timed out",
        "temporarily unavailable",
        "network unreachable",
        "dns error",
        "failed to lookup",
    ];

    let err_lower = err.to_lowercase();
    transient_patterns
        .iter()
        .any(|pattern| err_lower.contains(pattern))
}

fn bootstrap() -> Result<ClusterHandle, String> {
    if std::env::var_os("PG_RUNTIME_DIR").is_none() || std::env::var_os("PG_DATA_DIR").is_none() {
        let (runtime_dir, data_dir) =
            create_unique_pg_embed_dirs().map_err(|err| err.to_string())?;

        // SAFETY: runs at most once, inside the `OnceLock` initializer,
        // before any test thread depends on these variables.
        unsafe {
            std::env::set_var("PG_RUNTIME_DIR", &runtime_dir);
            std::env::set_var("PG_DATA_DIR", &data_dir);
        }
    }

    let mut last_error = String::new();
    for attempt in 0..=MAX_RETRIES {
        // `TestCluster` itself is `!Send`, so the shared `OnceLock` holds the
        // `Send + Sync` `ClusterHandle` from `new_split()` instead; the guard
        // is forgotten and shutdown is handled by the exit hook, as the
        // library documents for shared-cluster fixtures.
        match TestCluster::new_split() {
            Ok((handle, guard)) => {
                handle
                    .register_shutdown_on_exit()
                    .map_err(|err| format!("{err:?}"))?;
                std::mem::forget(guard);
                return Ok(handle);
            }
            Err(err) => {
                last_error = format!("{err:?}");
                if attempt < MAX_RETRIES && is_transient_error(&last_error) {
                    let delay = Duration::from_millis(RETRY_DELAY_MS * (1 << attempt));
                    eprintln!(
                        "pg-embed: transient error on attempt {}/{}, retrying in {:?}: {last_error}",
                        attempt + 1,
                        MAX_RETRIES + 1,
                        delay
                    );
                    std::thread::sleep(delay);
                } else {
                    break;
                }
            }
        }
    }

    Err(last_error)
}

/// Returns the cluster shared by every test in this binary, booting it on
/// first use. The cluster lives until the test process exits.
pub fn shared_cluster() -> Result<&'static ClusterHandle, String> {
    CLUSTER.get_or_init(bootstrap).as_ref().map_err(Clone::clone)
}
