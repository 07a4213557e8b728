//! In-memory record of completed merges
//!
//! Whether a merge happened is answered here, not by probing the output
//! directory. Only the most recent job per output name is kept: an older job
//! with the same name has had its file replaced, so its record would lie.

use std::collections::HashMap;
use std::path::Path;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;
use crate::pdf::{MergeSummary, StagedBinding};

/// Result of one successful upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRecord {
    pub id: Uuid,
    /// Output file name inside the output directory
    pub filename: String,
    /// Sanitized names of the merged uploads, in merge order
    pub source_files: Vec<String>,
    /// How many sources were followed by a blank page
    pub padded_documents: usize,
    /// Pages in the final document
    pub page_count: usize,
    pub created_at: DateTime<Utc>,
}

impl JobRecord {
    pub fn new(filename: String, source_files: Vec<String>, summary: &MergeSummary) -> Self {
        Self {
            id: Uuid::new_v4(),
            filename,
            source_files,
            padded_documents: summary.padded_count,
            page_count: summary.page_count,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Default)]
struct Jobs {
    by_id: HashMap<Uuid, JobRecord>,
    by_filename: HashMap<String, Uuid>,
}

/// Shared registry of jobs, keyed by id and by output file name
#[derive(Debug, Default)]
pub struct JobRegistry {
    jobs: RwLock<Jobs>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move a staged output into place and record the job that produced it
    ///
    /// The rename and the registry update happen under the same write lock, so
    /// the record for a file name always describes the bytes on disk. An earlier
    /// job with the same file name is forgotten.
    pub async fn publish(
        &self,
        staged: StagedBinding,
        output_path: &Path,
        job: JobRecord,
    ) -> crate::Result<()> {
        let mut jobs = self.jobs.write().await;
        staged.persist(output_path)?;

        if let Some(previous) = jobs.by_filename.insert(job.filename.clone(), job.id) {
            jobs.by_id.remove(&previous);
        }
        jobs.by_id.insert(job.id, job);
        Ok(())
    }

    pub async fn get(&self, id: &Uuid) -> Option<JobRecord> {
        self.jobs.read().await.by_id.get(id).cloned()
    }

    /// The job that last wrote `filename`
    pub async fn latest_for(&self, filename: &str) -> Option<JobRecord> {
        let jobs = self.jobs.read().await;
        jobs.by_filename
            .get(filename)
            .and_then(|id| jobs.by_id.get(id))
            .cloned()
    }
}
