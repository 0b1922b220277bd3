// glacier-restore/src/storage/s3.rs
use std::sync::Arc;
use std::sync::atomic::{AtomicU16, Ordering};

use async_trait::async_trait;
use aws_sdk_s3 as s3;
use aws_smithy_runtime_api::box_error::BoxError;
use aws_smithy_runtime_api::client::interceptors::{
    Intercept, context::BeforeDeserializationInterceptorContextRef,
};
use aws_smithy_runtime_api::client::runtime_components::RuntimeComponents;
use aws_smithy_types::config_bag::ConfigBag;
use s3::config::Region;
use s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use s3::types::{GlacierJobParameters, Tier};
use tracing::debug;

use super::ArchiveStore;
use super::types::{ListPage, ObjectDescriptor, RestoreRequest, RestoreResponse, StorageTier};
use crate::config::RemoteSettings;
use crate::errors::StoreError;

/// `ArchiveStore` backed by the AWS S3 API.
#[derive(Clone, Debug)]
pub struct S3Store {
    client: s3::Client,
}

impl S3Store {
    /// Builds a client from the ambient credential chain. Region and endpoint
    /// are only overridden when configured.
    pub async fn connect(settings: &RemoteSettings) -> Self {
        let mut loader = aws_config::defaults(s3::config::BehaviorVersion::latest());
        if let Some(region) = &settings.region {
            loader = loader.region(Region::new(region.clone()));
        }
        if let Some(endpoint) = &settings.endpoint_url {
            loader = loader.endpoint_url(endpoint);
        }
        let sdk_config = loader.load().await;

        // Custom endpoints (MinIO, localstack, ...) rarely support virtual-host addressing.
        let s3_config = s3::config::Builder::from(&sdk_config)
            .force_path_style(settings.endpoint_url.is_some())
            .build();

        debug!(
            region = ?sdk_config.region(),
            endpoint = ?settings.endpoint_url,
            "built S3 client"
        );

        Self {
            client: s3::Client::from_conf(s3_config),
        }
    }
}

#[async_trait]
impl ArchiveStore for S3Store {
    async fn list_page(
        &self,
        container: &str,
        prefix: &str,
        cursor: Option<String>,
    ) -> Result<ListPage, StoreError> {
        let mut request = self.client.list_objects_v2().bucket(container);
        if !prefix.is_empty() {
            request = request.prefix(prefix);
        }
        if let Some(token) = cursor {
            request = request.continuation_token(token);
        }
        let response = request.send().await.map_err(classify)?;

        let objects = response
            .contents()
            .iter()
            .filter_map(|object| {
                let key = object.key()?;
                let storage_tier = object
                    .storage_class()
                    .map(|class| StorageTier::from(class.as_str()))
                    .unwrap_or(StorageTier::Standard);
                Some(ObjectDescriptor {
                    key: key.to_string(),
                    storage_tier,
                })
            })
            .collect();

        Ok(ListPage {
            objects,
            next_cursor: response.next_continuation_token().map(str::to_string),
        })
    }

    async fn head_object(&self, container: &str, key: &str) -> Result<StorageTier, StoreError> {
        let response = self
            .client
            .head_object()
            .bucket(container)
            .key(key)
            .send()
            .await
            .map_err(classify)?;

        // S3 omits the storage class header for STANDARD objects.
        Ok(response
            .storage_class()
            .map(|class| StorageTier::from(class.as_str()))
            .unwrap_or(StorageTier::Standard))
    }

    async fn restore_object(
        &self,
        container: &str,
        request: &RestoreRequest,
    ) -> Result<RestoreResponse, StoreError> {
        let job_parameters = GlacierJobParameters::builder()
            .tier(Tier::from(request.tier.as_str()))
            .build()
            .map_err(|e| StoreError::Transport(format!("invalid restore parameters: {}", e)))?;
        let restore_request = s3::types::RestoreRequest::builder()
            .days(request.retention_days)
            .glacier_job_parameters(job_parameters)
            .build();

        let status = StatusCapture::default();

        let output = self
            .client
            .restore_object()
            .bucket(container)
            .key(&request.key)
            .restore_request(restore_request)
            .customize()
            .interceptor(status.clone())
            .send()
            .await
            .map_err(classify)?;

        Ok(RestoreResponse {
            http_status: status.get(),
            raw_response: format!("{:?}", output),
            error: None,
        })
    }
}

/// Records the HTTP status of the raw response; the SDK output types do not
/// carry it.
#[derive(Clone, Debug, Default)]
struct StatusCapture(Arc<AtomicU16>);

impl StatusCapture {
    fn get(&self) -> u16 {
        self.0.load(Ordering::Relaxed)
    }
}

impl Intercept for StatusCapture {
    fn name(&self) -> &'static str {
        "StatusCapture"
    }

    fn read_before_deserialization(
        &self,
        context: &BeforeDeserializationInterceptorContextRef<'_>,
        _runtime_components: &RuntimeComponents,
        _cfg: &mut ConfigBag,
    ) -> Result<(), BoxError> {
        self.0.store(context.response().status().as_u16(), Ordering::Relaxed);
        Ok(())
    }
}

/// Splits SDK failures into service errors (with a code) and everything else.
fn classify<E, R>(err: SdkError<E, R>) -> StoreError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    match err.code() {
        Some(code) => StoreError::Api {
            code: code.to_string(),
            message: err.message().unwrap_or_default().to_string(),
        },
        None => StoreError::Transport(DisplayErrorContext(&err).to_string()),
    }
}
