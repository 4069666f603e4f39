//! `load_config` module: loads the metadata YAML that drives a snapshot run.
//!
//! This is the only place where untrusted YAML is parsed and mapped to typed
//! structs. The `bucket` section deliberately stays an open
//! [`serde_yaml::Mapping`]: it carries storage-provider settings that are
//! passed through to the payload templates verbatim, and the credential
//! injector enriches it in place before rendering.
//!
//! Any failure to produce a metadata value (absent path, unreadable file,
//! malformed YAML, missing required keys) is logged and reported as `None`,
//! meaning "no configuration". Deciding whether that is fatal belongs to the
//! caller.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{error, info, warn};

#[derive(Debug, Serialize, Deserialize)]
pub struct Metadata {
    pub config: ClusterSection,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ClusterSection {
    /// Base URL of the cluster's administrative API.
    pub url: String,
    /// Name of the snapshot repository to register.
    pub repository: String,
    /// Storage-provider settings, handed to the templates as-is.
    pub bucket: serde_yaml::Mapping,
}

/// Loads the metadata YAML file. Returns `None` when there is no usable
/// configuration, logging the reason.
pub fn load_metadata(path: Option<&Path>) -> Option<Metadata> {
    let Some(path) = path else {
        warn!("no metadata path given (--metadata), nothing to load");
        return None;
    };
    info!(config_path = ?path, "Loading metadata from file");

    let content = match fs::read_to_string(path) {
        Ok(content) => {
            info!(config_path = ?path, "Metadata file read successfully");
            content
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path, "Failed to read metadata file");
            return None;
        }
    };

    match serde_yaml::from_str::<Metadata>(&content) {
        Ok(metadata) => {
            info!(config_path = ?path, "Parsed metadata YAML successfully");
            Some(metadata)
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path, "Failed to parse metadata YAML");
            None
        }
    }
}
