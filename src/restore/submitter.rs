// glacier-restore/src/restore/submitter.rs
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use super::tier;
use crate::errors::{RestoreError, StoreError};
use crate::storage::ArchiveStore;
use crate::storage::types::{RestoreRequest, TierRequest};

/// Result of submitting one key. Exactly one per submitted key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreOutcome {
    Success {
        key: String,
        http_status: u16,
        raw_response: String,
    },
    Failure {
        key: String,
        error: RestoreError,
    },
}

/// Issues restore requests for single keys against one container.
#[derive(Clone)]
pub struct RestoreSubmitter {
    store: Arc<dyn ArchiveStore>,
    container: String,
    call_timeout: Option<Duration>,
}

impl RestoreSubmitter {
    pub fn new(store: Arc<dyn ArchiveStore>, container: impl Into<String>) -> Self {
        Self {
            store,
            container: container.into(),
            call_timeout: None,
        }
    }

    /// Bounds every remote call made for a key. `None` leaves it to the client.
    pub fn with_call_timeout(mut self, call_timeout: Option<Duration>) -> Self {
        self.call_timeout = call_timeout;
        self
    }

    /// Requests restoration of `key`. Never fails: every error path ends in a
    /// `RestoreOutcome::Failure`.
    ///
    /// In `Fastest` mode the object's storage class is looked up first, which
    /// costs one extra remote read per key. A key whose class has no fastest
    /// tier is skipped without calling the restore API.
    pub async fn submit(&self, key: String, requested: TierRequest) -> RestoreOutcome {
        match self.try_submit(&key, requested).await {
            Ok((http_status, raw_response)) => RestoreOutcome::Success {
                key,
                http_status,
                raw_response,
            },
            Err(error) => {
                debug!(key = %key, code = ?error.code(), error = %error, "restore request failed");
                RestoreOutcome::Failure { key, error }
            }
        }
    }

    async fn try_submit(
        &self,
        key: &str,
        requested: TierRequest,
    ) -> Result<(u16, String), RestoreError> {
        let tier = match requested {
            TierRequest::Fixed(tier) => tier,
            TierRequest::Fastest => {
                let current = self
                    .bounded(self.store.head_object(&self.container, key))
                    .await?;
                tier::resolve(&current, requested)?
            }
        };

        let request = RestoreRequest::new(key, tier);
        let response = self
            .bounded(self.store.restore_object(&self.container, &request))
            .await?;

        if let Some(embedded) = response.error {
            return Err(RestoreError::Rejected {
                status: response.http_status,
                code: embedded.code,
                message: embedded.message,
            });
        }
        // 200 re-extends an existing restored copy, 202 starts a new restore.
        if !(200..300).contains(&response.http_status) {
            return Err(RestoreError::Rejected {
                status: response.http_status,
                code: "UnexpectedStatus".to_string(),
                message: String::new(),
            });
        }
        Ok((response.http_status, response.raw_response))
    }

    async fn bounded<T, F>(&self, call: F) -> Result<T, RestoreError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        match self.call_timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .map_err(|_| RestoreError::Timeout(limit))?
                .map_err(RestoreError::from),
            None => call.await.map_err(RestoreError::from),
        }
    }
}
