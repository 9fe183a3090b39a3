//! Persistence operations for the InMemory backend
//!
//! This module handles serialization and file I/O for saving/loading
//! every writer's log to/from a JSON file.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};
use tokio::sync::RwLock;

use super::InMemory;
use crate::{
    Error, Result,
    log::LogError,
    node::{Node, WriterId},
};

/// The current persistence file format version.
/// v0 indicates this is an unstable format subject to breaking changes.
const PERSISTENCE_VERSION: u8 = 0;

/// Helper to check if version is default (0) for serde skip_serializing_if
fn is_v0(v: &u8) -> bool {
    *v == 0
}

/// Validates the persistence version during deserialization.
fn validate_persistence_version<'de, D>(deserializer: D) -> std::result::Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let version = u8::deserialize(deserializer)?;
    if version != PERSISTENCE_VERSION {
        return Err(serde::de::Error::custom(format!(
            "unsupported persistence version {version}; only version {PERSISTENCE_VERSION} is supported"
        )));
    }
    Ok(version)
}

/// On-disk shape of the backend.
#[derive(Serialize, Deserialize)]
struct SerializableLogs {
    /// File format version for compatibility checking
    #[serde(
        rename = "_v",
        default,
        skip_serializing_if = "is_v0",
        deserialize_with = "validate_persistence_version"
    )]
    version: u8,
    logs: HashMap<WriterId, Vec<Node>>,
}

pub(crate) async fn save_to_file<P: AsRef<Path>>(backend: &InMemory, path: P) -> Result<()> {
    let logs = backend.logs.read().await.clone();
    let serializable = SerializableLogs {
        version: PERSISTENCE_VERSION,
        logs,
    };

    let json = serde_json::to_string_pretty(&serializable)
        .map_err(|e| -> Error { LogError::SerializationFailed { source: e }.into() })?;
    tokio::fs::write(path, json)
        .await
        .map_err(|e| -> Error { LogError::FileIo { source: e }.into() })
}

pub(crate) async fn load_from_file<P: AsRef<Path>>(path: P) -> Result<InMemory> {
    match tokio::fs::read_to_string(path).await {
        Ok(json) => {
            let serializable: SerializableLogs = serde_json::from_str(&json).map_err(|e| -> Error {
                LogError::DeserializationFailed { source: e }.into()
            })?;
            check_gapless(&serializable.logs)?;
            Ok(InMemory {
                logs: RwLock::new(serializable.logs),
            })
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(InMemory::new()),
        Err(e) => Err(LogError::FileIo { source: e }.into()),
    }
}

/// A loaded log must still satisfy the append invariant: node `i` has seq `i`
/// and belongs to the writer it is filed under.
fn check_gapless(logs: &HashMap<WriterId, Vec<Node>>) -> Result<()> {
    for (writer, log) in logs {
        for (index, node) in log.iter().enumerate() {
            if node.writer() != writer {
                return Err(LogError::StorageFailure {
                    reason: format!("node {} filed under writer {writer}", node.id()),
                }
                .into());
            }
            if node.seq() != index as u64 {
                return Err(LogError::NonSequentialAppend {
                    writer: writer.clone(),
                    expected: index as u64,
                    got: node.seq(),
                }
                .into());
            }
        }
    }
    Ok(())
}
