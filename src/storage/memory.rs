// glacier-restore/src/storage/memory.rs
//! Scripted in-memory `ArchiveStore` for tests.
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use super::ArchiveStore;
use super::types::{
    ApiErrorRecord, ListPage, ObjectDescriptor, RestoreRequest, RestoreResponse, StorageTier,
};
use crate::errors::StoreError;

/// Scripted reply for a restore call on one key.
#[derive(Debug, Clone)]
pub enum RestoreScript {
    Accept(u16),
    Fail(StoreError),
    Embedded { status: u16, code: String, message: String },
    Hang,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    objects: Vec<ObjectDescriptor>,
    page_size: usize,
    restore_scripts: HashMap<String, RestoreScript>,
    list_failure_at_page: Option<usize>,
    empty_final_cursor: bool,
    latency: Option<Duration>,
    in_progress: Mutex<Vec<String>>,
    restored: Mutex<Vec<RestoreRequest>>,
    pub list_calls: AtomicUsize,
    pub head_calls: AtomicUsize,
    pub restore_calls: AtomicUsize,
    active: AtomicUsize,
    pub max_active: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            page_size: 1000,
            ..Default::default()
        }
    }

    pub fn with_object(mut self, key: &str, tier: StorageTier) -> Self {
        self.objects.push(ObjectDescriptor {
            key: key.to_string(),
            storage_tier: tier,
        });
        self
    }

    pub fn with_objects(mut self, count: usize, tier: StorageTier) -> Self {
        for i in 0..count {
            self.objects.push(ObjectDescriptor {
                key: format!("obj/{:05}", i),
                storage_tier: tier.clone(),
            });
        }
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_script(mut self, key: &str, script: RestoreScript) -> Self {
        self.restore_scripts.insert(key.to_string(), script);
        self
    }

    pub fn failing_list_at_page(mut self, page: usize) -> Self {
        self.list_failure_at_page = Some(page);
        self
    }

    /// Ends the listing with `Some("")` instead of no cursor.
    pub fn with_empty_final_cursor(mut self) -> Self {
        self.empty_final_cursor = true;
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Restore requests the store accepted, in arrival order.
    pub fn restored(&self) -> Vec<RestoreRequest> {
        self.restored.lock().map(|r| r.clone()).unwrap_or_default()
    }

    async fn simulate_latency(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl ArchiveStore for MemoryStore {
    async fn list_page(
        &self,
        _container: &str,
        prefix: &str,
        cursor: Option<String>,
    ) -> Result<ListPage, StoreError> {
        let page_index = self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.list_failure_at_page == Some(page_index) {
            return Err(StoreError::Transport("connection reset".to_string()));
        }

        let start: usize = match cursor {
            Some(token) => token
                .parse()
                .map_err(|_| StoreError::Api {
                    code: "InvalidArgument".to_string(),
                    message: format!("bad continuation token {}", token),
                })?,
            None => 0,
        };
        let matching: Vec<&ObjectDescriptor> = self
            .objects
            .iter()
            .filter(|o| o.key.starts_with(prefix))
            .collect();
        let end = (start + self.page_size).min(matching.len());
        let objects = matching[start.min(end)..end].iter().map(|o| (*o).clone()).collect();
        let next_cursor = if end < matching.len() {
            Some(end.to_string())
        } else if self.empty_final_cursor {
            Some(String::new())
        } else {
            None
        };

        Ok(ListPage {
            objects,
            next_cursor,
        })
    }

    async fn head_object(&self, _container: &str, key: &str) -> Result<StorageTier, StoreError> {
        self.head_calls.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await;
        self.objects
            .iter()
            .find(|o| o.key == key)
            .map(|o| o.storage_tier.clone())
            .ok_or_else(|| StoreError::Api {
                code: "NotFound".to_string(),
                message: String::new(),
            })
    }

    async fn restore_object(
        &self,
        _container: &str,
        request: &RestoreRequest,
    ) -> Result<RestoreResponse, StoreError> {
        self.restore_calls.fetch_add(1, Ordering::SeqCst);
        let now_active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now_active, Ordering::SeqCst);

        self.simulate_latency().await;
        let result = self.scripted_restore(request).await;

        self.active.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

impl MemoryStore {
    async fn scripted_restore(
        &self,
        request: &RestoreRequest,
    ) -> Result<RestoreResponse, StoreError> {
        match self.restore_scripts.get(&request.key).cloned() {
            Some(RestoreScript::Fail(err)) => Err(err),
            Some(RestoreScript::Embedded {
                status,
                code,
                message,
            }) => Ok(RestoreResponse {
                http_status: status,
                raw_response: String::new(),
                error: Some(ApiErrorRecord { code, message }),
            }),
            Some(RestoreScript::Hang) => {
                futures::future::pending::<()>().await;
                unreachable!("pending future never resolves")
            }
            Some(RestoreScript::Accept(status)) => self.accept(request, status),
            None => self.accept(request, 202),
        }
    }

    fn accept(&self, request: &RestoreRequest, status: u16) -> Result<RestoreResponse, StoreError> {
        let mut in_progress = self
            .in_progress
            .lock()
            .map_err(|_| StoreError::Transport("poisoned".to_string()))?;
        if in_progress.contains(&request.key) {
            return Err(StoreError::Api {
                code: "RestoreAlreadyInProgress".to_string(),
                message: "Object restore is already in progress".to_string(),
            });
        }
        in_progress.push(request.key.clone());
        if let Ok(mut restored) = self.restored.lock() {
            restored.push(request.clone());
        }
        Ok(RestoreResponse {
            http_status: status,
            raw_response: format!("restore accepted for {}", request.key),
            error: None,
        })
    }
}
