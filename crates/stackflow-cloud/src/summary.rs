//! Post-apply summary artifact.
//!
//! After a successful apply the CLI writes a flat key/value summary
//! (role identifiers, bucket names, endpoints) to
//! `.stackflow/summary.json` for the downstream workload-deployment step.
//! The file is a convenience artifact, not a system of record: the
//! provisioning backend always holds the truth.

use crate::error::{CloudError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;

const SUMMARY_VERSION: u32 = 1;
const SUMMARY_DIR: &str = ".stackflow";
const SUMMARY_FILE: &str = "summary.json";
const SUMMARY_BACKUP: &str = "summary.json.backup";

/// Flat summary of the applied topology.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Summary {
    /// File format version
    pub version: u32,

    /// Environment the summary was produced for
    pub environment: String,

    /// Last write timestamp
    pub updated_at: DateTime<Utc>,

    /// Values keyed as "<unit>.<OutputKey>"
    pub values: BTreeMap<String, String>,
}

impl Summary {
    pub fn new(environment: impl Into<String>) -> Self {
        Self {
            version: SUMMARY_VERSION,
            environment: environment.into(),
            updated_at: Utc::now(),
            values: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, unit: &str, key: &str, value: impl Into<String>) {
        self.values.insert(format!("{unit}.{key}"), value.into());
        self.updated_at = Utc::now();
    }

    pub fn get(&self, unit: &str, key: &str) -> Option<&str> {
        self.values.get(&format!("{unit}.{key}")).map(String::as_str)
    }
}

/// Reader/writer for the summary file.
pub struct SummaryStore {
    project_root: PathBuf,
}

impl SummaryStore {
    pub fn new(project_root: impl AsRef<Path>) -> Self {
        Self {
            project_root: project_root.as_ref().to_path_buf(),
        }
    }

    fn dir(&self) -> PathBuf {
        self.project_root.join(SUMMARY_DIR)
    }

    pub fn path(&self) -> PathBuf {
        self.dir().join(SUMMARY_FILE)
    }

    fn backup_path(&self) -> PathBuf {
        self.dir().join(SUMMARY_BACKUP)
    }

    /// Load the current summary, if one has been written.
    pub async fn load(&self) -> Result<Option<Summary>> {
        let path = self.path();
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path).await?;
        let summary: Summary = serde_json::from_str(&content)?;

        if summary.version > SUMMARY_VERSION {
            return Err(CloudError::Summary(format!(
                "summary file version {} is newer than supported version {}",
                summary.version, SUMMARY_VERSION
            )));
        }

        Ok(Some(summary))
    }

    /// Write the summary, keeping the previous file as a backup.
    pub async fn save(&self, summary: &Summary) -> Result<()> {
        let dir = self.dir();
        if !dir.exists() {
            fs::create_dir_all(&dir).await?;
        }

        let path = self.path();
        let backup = self.backup_path();

        if path.exists() {
            if backup.exists() {
                fs::remove_file(&backup).await?;
            }
            fs::rename(&path, &backup).await?;
        }

        let content = serde_json::to_string_pretty(summary)?;
        fs::write(&path, content).await?;

        tracing::debug!(
            path = %path.display(),
            entries = summary.values.len(),
            "wrote summary"
        );
        Ok(())
    }
}
