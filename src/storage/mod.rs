// glacier-restore/src/storage/mod.rs
pub(crate) mod s3;
pub(crate) mod types;

#[cfg(test)]
pub(crate) mod memory;

use async_trait::async_trait;

use crate::errors::StoreError;
use types::{ListPage, RestoreRequest, RestoreResponse, StorageTier};

/// Remote archive operations the tool needs. One instance is built per
/// invocation and shared by every worker; implementations must be safe for
/// concurrent use.
#[async_trait]
pub trait ArchiveStore: Send + Sync {
    /// Fetches one page of keys under `prefix`. `cursor` is the previous
    /// page's continuation token, `None` for the first page.
    async fn list_page(
        &self,
        container: &str,
        prefix: &str,
        cursor: Option<String>,
    ) -> Result<ListPage, StoreError>;

    /// Current storage class of a single object.
    async fn head_object(&self, container: &str, key: &str) -> Result<StorageTier, StoreError>;

    /// Asks the service to restore an archived object.
    async fn restore_object(
        &self,
        container: &str,
        request: &RestoreRequest,
    ) -> Result<RestoreResponse, StoreError>;
}
