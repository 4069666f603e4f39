//! CLI definition and the top-level snapshot pipeline.
//!
//! The orchestration here is strictly sequential: load the metadata YAML,
//! inject credentials and the dated snapshot name, render the two payload
//! templates, then walk the cluster's snapshot API (configure repository,
//! verify, create snapshot). Each stage's value is printed to stdout;
//! recoverable failures are only logged and the run continues.
//!
//! The single fatal configuration path is a metadata file that did not load:
//! nothing can be rendered without it, so [`run`] bails before touching the
//! templates and the process exits nonzero. Downstream HTTP failures never
//! change the exit code.

use std::path::PathBuf;

use anyhow::Result;
use chrono::Local;
use clap::Parser;
use tracing::{info, warn};

use crate::credentials::{inject, snapshot_name, Credentials};
use crate::elastic::ElasticClient;
use crate::load_config::load_metadata;
use crate::render::render_payload;

const BUCKET_TEMPLATE: &str = "configuration/elastic_bucket.j2";
const SNAPSHOT_TEMPLATE: &str = "configuration/elastic_snapshot.j2";
const BUCKET_PAYLOAD: &str = "configuration/bucket.json";
const SNAPSHOT_PAYLOAD: &str = "configuration/snapshot.json";

/// CLI for elastic-snapshot: register a snapshot repository and take a dated backup.
#[derive(Parser)]
#[clap(
    name = "elastic-snapshot",
    version,
    about = "Configure an Elasticsearch snapshot repository and trigger a backup snapshot"
)]
pub struct Cli {
    /// Path to the YAML metadata file
    #[clap(long)]
    pub metadata: Option<PathBuf>,
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    let Some(mut metadata) = load_metadata(cli.metadata.as_deref()) else {
        anyhow::bail!("metadata did not load; check the YAML file");
    };

    let credentials = Credentials::from_env()?;

    let snapshot = snapshot_name(Local::now().date_naive());
    println!("{snapshot}");

    inject(&mut metadata, &credentials, &snapshot)?;
    println!("{}", metadata.config.url);

    for (template, outfile) in [
        (BUCKET_TEMPLATE, BUCKET_PAYLOAD),
        (SNAPSHOT_TEMPLATE, SNAPSHOT_PAYLOAD),
    ] {
        match render_payload(template.as_ref(), &metadata, outfile.as_ref()) {
            Ok(0) => warn!(template, "rendered an empty payload; check the metadata"),
            Ok(bytes) => info!(template, outfile, bytes, "payload rendered"),
            Err(e) => warn!(template, error = %e, "payload not rendered"),
        }
    }

    let client = ElasticClient::new(
        metadata.config.url.clone(),
        metadata.config.repository.clone(),
    );

    match client.configure_repository(BUCKET_PAYLOAD.as_ref()).await {
        Ok(status) => println!("{}", status.as_u16()),
        Err(e) => {
            warn!(error = %e, "repository configuration failed");
            println!("{}", e.status().as_u16());
        }
    }

    // No rollback: a bad repository status above does not stop the
    // verify/create steps, it is only surfaced through the printed output.
    match client.verify_repository().await {
        Ok(response) => println!("{response}"),
        Err(e) => warn!(error = %e, "repository verification failed"),
    }

    match client.create_snapshot(&snapshot, SNAPSHOT_PAYLOAD.as_ref()).await {
        Ok(response) => println!("{response}"),
        Err(e) => warn!(error = %e, "snapshot creation failed"),
    }

    Ok(())
}
