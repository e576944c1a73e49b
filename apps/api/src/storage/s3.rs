use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use tracing::{debug, info};

use super::{blob_key, BlobStore, StorageError, StoredBlob};

/// Every uploaded object lives under this prefix so a wipe never touches
/// anything else in the bucket.
const UPLOAD_PREFIX: &str = "uploads/";

/// Blob storage on S3 (or MinIO locally).
#[derive(Clone)]
pub struct S3BlobStore {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl S3BlobStore {
    pub fn new(client: aws_sdk_s3::Client, bucket: String) -> Self {
        Self { client, bucket }
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn upload(
        &self,
        file_name: &str,
        content_type: &str,
        data: Bytes,
    ) -> Result<StoredBlob, StorageError> {
        let key = blob_key(UPLOAD_PREFIX, file_name);
        let size = data.len() as u64;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(data))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| StorageError::Blob(format!("S3 upload failed: {e}")))?;

        info!("Uploaded {} bytes to s3://{}/{}", size, self.bucket, key);

        Ok(StoredBlob {
            path: key,
            name: file_name.to_string(),
            size,
        })
    }

    async fn read(&self, path: &str) -> Result<Option<Bytes>, StorageError> {
        let output = match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(path)
            .send()
            .await
        {
            Ok(output) => output,
            Err(err) => {
                let service_err = err.into_service_error();
                if service_err.is_no_such_key() {
                    debug!("s3://{}/{} does not exist", self.bucket, path);
                    return Ok(None);
                }
                return Err(StorageError::Blob(format!("S3 read failed: {service_err}")));
            }
        };

        let data = output
            .body
            .collect()
            .await
            .map_err(|e| StorageError::Blob(format!("S3 body read failed: {e}")))?;

        Ok(Some(data.into_bytes()))
    }

    async fn delete(&self, path: &str) -> Result<(), StorageError> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(path)
            .send()
            .await
            .map_err(|e| StorageError::Blob(format!("S3 delete failed: {e}")))?;

        info!("Deleted s3://{}/{}", self.bucket, path);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<StoredBlob>, StorageError> {
        let mut pages = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .prefix(UPLOAD_PREFIX)
            .into_paginator()
            .send();

        let mut blobs = Vec::new();
        while let Some(page) = pages.next().await {
            let page = page.map_err(|e| StorageError::Blob(format!("S3 list failed: {e}")))?;
            for object in page.contents() {
                let Some(key) = object.key() else { continue };
                blobs.push(StoredBlob {
                    path: key.to_string(),
                    name: display_name(key),
                    size: object.size().unwrap_or(0).max(0) as u64,
                });
            }
        }

        Ok(blobs)
    }
}

/// Strips the upload prefix and the uniqueness UUID from an object key.
fn display_name(key: &str) -> String {
    let name = key.strip_prefix(UPLOAD_PREFIX).unwrap_or(key);
    // `{uuid}-{name}`: a hyphenated UUID is 36 characters.
    match name.get(36..) {
        Some(rest) if rest.starts_with('-') && uuid::Uuid::parse_str(&name[..36]).is_ok() => {
            rest[1..].to_string()
        }
        _ => name.to_string(),
    }
}
