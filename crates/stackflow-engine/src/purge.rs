//! Bucket purge: empty a versioned bucket before its owning stack is
//! destroyed.
//!
//! Deletion requests run through a bounded worker pool. Individual delete
//! failures are logged and skipped; a bucket left non-empty makes the
//! subsequent stack deletion fail loudly, so nothing is silently lost at
//! the system level.

use crate::error::Result;
use futures_util::future::join_all;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use stackflow_cloud::ProvisioningClient;
use tokio::sync::Semaphore;

/// Concurrent delete calls per bucket.
pub const DELETE_POOL_SIZE: usize = 10;

pub struct BucketPurger {
    client: Arc<dyn ProvisioningClient>,
    pool_size: usize,
}

impl BucketPurger {
    pub fn new(client: Arc<dyn ProvisioningClient>) -> Self {
        Self {
            client,
            pool_size: DELETE_POOL_SIZE,
        }
    }

    #[cfg(test)]
    pub fn with_pool_size(mut self, pool_size: usize) -> Self {
        self.pool_size = pool_size;
        self
    }

    /// Remove every object version and delete marker, then make one
    /// best-effort unversioned sweep. Returns the number of entries
    /// removed; 0 for a bucket that does not exist.
    pub async fn purge(&self, bucket: &str) -> Result<usize> {
        if !self.client.bucket_exists(bucket).await? {
            tracing::debug!(bucket, "bucket does not exist, nothing to purge");
            return Ok(0);
        }

        let entries = self.client.list_object_versions(bucket).await?;
        tracing::info!(bucket, entries = entries.len(), "purging bucket");

        let pool = Arc::new(Semaphore::new(self.pool_size));
        let removed = Arc::new(AtomicUsize::new(0));

        let deletions = entries.into_iter().map(|entry| {
            let client = self.client.clone();
            let pool = pool.clone();
            let removed = removed.clone();
            let bucket = bucket.to_string();
            async move {
                let _permit = match pool.acquire().await {
                    Ok(permit) => permit,
                    Err(_) => return,
                };
                match client
                    .delete_object_version(&bucket, &entry.key, entry.version_id.as_deref())
                    .await
                {
                    Ok(()) => {
                        removed.fetch_add(1, Ordering::Relaxed);
                    }
                    Err(err) => {
                        tracing::warn!(
                            bucket = %bucket,
                            key = %entry.key,
                            error = %err,
                            "failed to delete object version, continuing"
                        );
                    }
                }
            }
        });
        join_all(deletions).await;

        // Catch anything the versioned listing did not cover.
        match self.client.list_objects(bucket).await {
            Ok(keys) => {
                for key in keys {
                    match self.client.delete_object_version(bucket, &key, None).await {
                        Ok(()) => {
                            removed.fetch_add(1, Ordering::Relaxed);
                        }
                        Err(err) => {
                            tracing::warn!(bucket, key = %key, error = %err, "sweep delete failed");
                        }
                    }
                }
            }
            Err(err) => tracing::warn!(bucket, error = %err, "final sweep listing failed"),
        }

        Ok(removed.load(Ordering::Relaxed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockBackend;
    use stackflow_cloud::ObjectVersion;

    fn purger(backend: &Arc<MockBackend>) -> BucketPurger {
        BucketPurger::new(backend.clone() as Arc<dyn ProvisioningClient>).with_pool_size(3)
    }

    #[tokio::test]
    async fn purge_removes_versions_and_delete_markers() {
        let backend = Arc::new(MockBackend::new());
        backend.add_bucket("data");
        backend.add_version("data", ObjectVersion::version("a.log", "v1"));
        backend.add_version("data", ObjectVersion::version("a.log", "v2"));
        backend.add_version("data", ObjectVersion::delete_marker("b.log", "v3"));

        let removed = purger(&backend).purge("data").await.unwrap();

        assert_eq!(removed, 3);
        assert_eq!(backend.bucket_entry_count("data"), 0);
    }

    #[tokio::test]
    async fn purge_of_missing_bucket_is_zero_and_no_error() {
        let backend = Arc::new(MockBackend::new());

        let removed = purger(&backend).purge("ghost").await.unwrap();

        assert_eq!(removed, 0);
        assert!(!backend
            .calls()
            .contains(&"list_versions ghost".to_string()));
    }

    #[tokio::test]
    async fn individual_delete_failures_are_skipped() {
        let backend = Arc::new(MockBackend::new());
        backend.add_bucket("data");
        backend.add_version("data", ObjectVersion::version("keep-failing", "v1"));
        backend.add_version("data", ObjectVersion::version("ok-1", "v1"));
        backend.add_version("data", ObjectVersion::version("ok-2", "v1"));
        backend.fail_delete("data", "keep-failing");

        let removed = purger(&backend).purge("data").await.unwrap();

        // The failing key is left behind for the stack delete to trip on.
        assert_eq!(removed, 2);
        assert_eq!(backend.bucket_entry_count("data"), 1);
    }

    #[tokio::test]
    async fn final_sweep_catches_unversioned_objects() {
        let backend = Arc::new(MockBackend::new());
        backend.add_bucket("data");
        backend.add_version("data", ObjectVersion::version("a.log", "v1"));
        backend.add_plain_object("data", "stray.tmp");

        let removed = purger(&backend).purge("data").await.unwrap();

        assert_eq!(removed, 2);
        assert_eq!(backend.bucket_entry_count("data"), 0);
    }
}
