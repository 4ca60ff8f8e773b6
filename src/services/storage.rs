/// Object storage for uploaded images (S3 or an S3-compatible endpoint).
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use uuid::Uuid;

use crate::config::StorageConfig;
use crate::error::{AppError, Result};

#[derive(Clone)]
pub struct StorageService {
    client: Client,
    bucket: String,
    public_url: String,
}

impl StorageService {
    pub async fn new(config: &StorageConfig) -> Result<Self> {
        let credentials = Credentials::new(
            &config.access_key_id,
            &config.secret_access_key,
            None,
            None,
            "social-api",
        );

        let shared_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials)
            .load()
            .await;

        let mut builder = aws_sdk_s3::config::Builder::from(&shared_config);
        if let Some(endpoint) = &config.endpoint {
            if !endpoint.trim().is_empty() {
                builder = builder.endpoint_url(endpoint).force_path_style(true);
            }
        }

        Ok(StorageService {
            client: Client::from_conf(builder.build()),
            bucket: config.bucket.clone(),
            public_url: config.public_url.trim_end_matches('/').to_string(),
        })
    }

    /// Upload a processed JPEG under the given key prefix and return its
    /// public URL.
    pub async fn upload_image(&self, prefix: &str, data: Vec<u8>) -> Result<String> {
        let key = format!("{}/{}.jpg", prefix, Uuid::new_v4());

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .content_type("image/jpeg")
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(|e| AppError::Internal(format!("Image upload failed: {e}")))?;

        Ok(format!("{}/{}", self.public_url, key))
    }
}
