//! Credential loading and metadata enrichment.
//!
//! Secrets live in the environment, never in the metadata file. They are read
//! exactly once, here, into an explicit [`Credentials`] value that the
//! orchestrator passes down; deeper components do no ambient lookups.

use anyhow::{bail, Result};
use chrono::NaiveDate;
use serde_yaml::Value;
use std::env;
use tracing::{error, info};

use crate::load_config::Metadata;

const ACCESS_KEY_VAR: &str = "AWS_ACCESS_KEY_ID";
const ACCESS_SECRET_VAR: &str = "AWS_SECRET_ACCESS_KEY";

/// Storage-provider credentials for the snapshot repository.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub access_key: String,
    pub access_secret: String,
}

impl Credentials {
    /// Reads both required variables from the environment. A missing variable
    /// is fatal for the run.
    pub fn from_env() -> Result<Self> {
        match (env::var(ACCESS_KEY_VAR), env::var(ACCESS_SECRET_VAR)) {
            (Ok(access_key), Ok(access_secret)) => {
                info!("Loaded storage credentials from environment");
                Ok(Credentials {
                    access_key,
                    access_secret,
                })
            }
            (Err(e), _) => {
                error!(error = ?e, var = ACCESS_KEY_VAR, "credential missing in environment");
                bail!("{ACCESS_KEY_VAR} missing in environment");
            }
            (_, Err(e)) => {
                error!(error = ?e, var = ACCESS_SECRET_VAR, "credential missing in environment");
                bail!("{ACCESS_SECRET_VAR} missing in environment");
            }
        }
    }
}

/// Name for the snapshot taken on `date`. One snapshot per calendar day:
/// two runs on the same day collide, by design.
pub fn snapshot_name(date: NaiveDate) -> String {
    format!("snapshot-{}", date.format("%Y-%m-%d"))
}

/// Overlays the credentials and the snapshot name onto the bucket section,
/// in place, before the templates are rendered.
///
/// The metadata must already carry a `bucket.snapshot` mapping; its absence
/// means the file does not describe a snapshot run and the whole run stops.
pub fn inject(metadata: &mut Metadata, credentials: &Credentials, snapshot: &str) -> Result<()> {
    let bucket = &mut metadata.config.bucket;
    bucket.insert(
        Value::from("access_key"),
        Value::from(credentials.access_key.as_str()),
    );
    bucket.insert(
        Value::from("access_secret"),
        Value::from(credentials.access_secret.as_str()),
    );

    match bucket.get_mut(Value::from("snapshot")) {
        Some(Value::Mapping(section)) => {
            section.insert(Value::from("name"), Value::from(snapshot));
            Ok(())
        }
        Some(_) => bail!("bucket.snapshot in the metadata is not a mapping"),
        None => bail!("bucket.snapshot section missing from the metadata"),
    }
}
