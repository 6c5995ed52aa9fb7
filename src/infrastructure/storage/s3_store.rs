use std::path::PathBuf;

use anyhow::{Context, anyhow};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::operation::create_bucket::CreateBucketError;
use aws_sdk_s3::operation::head_bucket::HeadBucketError;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::{Client, error::SdkError};

use crate::application::ports::object_store::ObjectStore;
use crate::bootstrap::config::Config;

use super::{normalize_key, normalize_prefix};

pub struct S3ObjectStore {
    client: Client,
    bucket: String,
    root_prefix: String,
}

impl S3ObjectStore {
    pub async fn new(cfg: &Config) -> anyhow::Result<Self> {
        let bucket = cfg
            .s3_bucket
            .clone()
            .context("S3 bucket must be configured when using S3 storage backend")?;

        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = &cfg.s3_region {
            loader = loader.region(Region::new(region.clone()));
        }
        let shared_config = loader.load().await;

        let mut builder = aws_sdk_s3::config::Builder::from(&shared_config);
        if let (Some(access), Some(secret)) = (&cfg.s3_access_key, &cfg.s3_secret_key) {
            let creds = Credentials::new(
                access.clone(),
                secret.clone(),
                None,
                None,
                "sonara-s3-static",
            );
            builder = builder.credentials_provider(creds);
        }
        if let Some(endpoint) = &cfg.s3_endpoint {
            builder = builder.endpoint_url(endpoint.clone());
        }
        if cfg.s3_use_path_style {
            builder = builder.force_path_style(true);
        }

        let client = Client::from_conf(builder.build());
        let root_prefix = normalize_prefix(&PathBuf::from(&cfg.storage_root));

        ensure_bucket(&client, &bucket).await?;
        tracing::info!(bucket = %bucket, prefix = %root_prefix, "s3_store_ready");

        Ok(Self {
            client,
            bucket,
            root_prefix,
        })
    }

    fn object_key(&self, key: &str) -> String {
        if self.root_prefix.is_empty() {
            key.to_string()
        } else {
            format!("{}/{}", self.root_prefix, key)
        }
    }

    async fn object_exists(&self, key: &str) -> anyhow::Result<bool> {
        use aws_sdk_s3::operation::head_object::HeadObjectError;

        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(SdkError::ServiceError(service_err)) => {
                let head_err: &HeadObjectError = service_err.err();
                if head_err.is_not_found() {
                    Ok(false)
                } else {
                    Err(anyhow!("head_object error for {}: {}", key, head_err))
                }
            }
            Err(other) => Err(anyhow!("head_object failed for {}: {}", key, other)),
        }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put(&self, path: &str, bytes: &[u8], content_type: &str) -> anyhow::Result<String> {
        let rel = normalize_key(path)?;
        let key = self.object_key(&rel);
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .content_type(content_type)
            .body(ByteStream::from(bytes.to_vec()))
            .send()
            .await
            .with_context(|| format!("failed to upload object {key}"))?;
        Ok(rel)
    }

    async fn delete(&self, path: &str) -> anyhow::Result<bool> {
        let key = self.object_key(&normalize_key(path)?);
        // DeleteObject succeeds for missing keys, so existence is checked first.
        if !self.object_exists(&key).await? {
            return Ok(false);
        }
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(&key)
            .send()
            .await
            .with_context(|| format!("failed to delete object {key}"))?;
        Ok(true)
    }

    async fn get(&self, path: &str) -> anyhow::Result<Option<Vec<u8>>> {
        let key = self.object_key(&normalize_key(path)?);
        let object = match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(&key)
            .send()
            .await
        {
            Ok(object) => object,
            Err(SdkError::ServiceError(service_err)) if service_err.err().is_no_such_key() => {
                return Ok(None);
            }
            Err(err) => return Err(anyhow!("failed to get object {key}: {err}")),
        };
        let data = object
            .body
            .collect()
            .await
            .with_context(|| format!("failed to read object {key}"))?;
        Ok(Some(data.into_bytes().to_vec()))
    }
}

async fn ensure_bucket(client: &Client, bucket: &str) -> anyhow::Result<()> {
    match client.head_bucket().bucket(bucket).send().await {
        Ok(_) => return Ok(()),
        Err(SdkError::ServiceError(service_err)) => {
            if !matches!(service_err.err(), HeadBucketError::NotFound(_)) {
                return Err(anyhow!(service_err.err().to_string()));
            }
        }
        Err(err) => return Err(anyhow!(err.to_string())),
    }

    match client.create_bucket().bucket(bucket).send().await {
        Ok(_) => Ok(()),
        Err(SdkError::ServiceError(service_err)) => match service_err.err() {
            CreateBucketError::BucketAlreadyOwnedByYou(_) => Ok(()),
            CreateBucketError::BucketAlreadyExists(_) => Ok(()),
            other => Err(anyhow!(other.to_string())),
        },
        Err(err) => Err(anyhow!(err.to_string())),
    }
}
