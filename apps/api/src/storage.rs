//! Resume PDF storage on S3 / MinIO.

use std::time::Duration;

use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use bytes::{Bytes, BytesMut};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;

const PDF_CONTENT_TYPE: &str = "application/pdf";

/// A presigned PUT URL the client can upload a resume PDF to directly.
#[derive(Debug, Clone, Serialize)]
pub struct UploadTarget {
    pub upload_url: String,
    pub s3_key: String,
    pub expires_in_secs: u64,
}

/// Object key for a user's resume: `resumes/<user_id>/<file_id>.pdf`.
pub fn resume_key(user_id: Uuid, file_id: Uuid) -> String {
    format!("resumes/{user_id}/{file_id}.pdf")
}

/// True if `key` lives under the given user's prefix.
pub fn key_belongs_to(key: &str, user_id: Uuid) -> bool {
    key.starts_with(&format!("resumes/{user_id}/")) && !key.contains("..")
}

pub async fn put_resume_pdf(
    s3: &aws_sdk_s3::Client,
    bucket: &str,
    key: &str,
    body: Bytes,
) -> Result<(), AppError> {
    let size = body.len();
    s3.put_object()
        .bucket(bucket)
        .key(key)
        .body(ByteStream::from(body))
        .content_type(PDF_CONTENT_TYPE)
        .send()
        .await
        .map_err(|e| AppError::S3(format!("upload of {key} failed: {e}")))?;

    info!("Uploaded resume to s3://{bucket}/{key} ({size} bytes)");
    Ok(())
}

/// Downloads a resume, refusing objects larger than `max_bytes`.
///
/// The declared length is checked before any body is read, and the stream is
/// still capped in case the length is missing or wrong.
pub async fn fetch_resume_pdf(
    s3: &aws_sdk_s3::Client,
    bucket: &str,
    key: &str,
    max_bytes: usize,
) -> Result<Bytes, AppError> {
    let mut object = s3
        .get_object()
        .bucket(bucket)
        .key(key)
        .send()
        .await
        .map_err(|e| AppError::S3(format!("download of {key} failed: {e}")))?;

    check_object_size(object.content_length(), max_bytes)?;

    let mut data = BytesMut::new();
    while let Some(chunk) = object
        .body
        .try_next()
        .await
        .map_err(|e| AppError::S3(format!("reading {key} failed: {e}")))?
    {
        append_capped(&mut data, &chunk, max_bytes)?;
    }
    Ok(data.freeze())
}

fn too_large(max_bytes: usize) -> AppError {
    AppError::PayloadTooLarge(format!(
        "resume must be at most {} MiB",
        max_bytes / (1024 * 1024)
    ))
}

pub fn check_object_size(content_length: Option<i64>, max_bytes: usize) -> Result<(), AppError> {
    match content_length {
        Some(len) if usize::try_from(len).map_or(true, |len| len > max_bytes) => {
            Err(too_large(max_bytes))
        }
        _ => Ok(()),
    }
}

fn append_capped(buf: &mut BytesMut, chunk: &[u8], max_bytes: usize) -> Result<(), AppError> {
    if buf.len() + chunk.len() > max_bytes {
        return Err(too_large(max_bytes));
    }
    buf.extend_from_slice(chunk);
    Ok(())
}

pub async fn presign_resume_upload(
    s3: &aws_sdk_s3::Client,
    bucket: &str,
    user_id: Uuid,
    ttl_secs: u64,
) -> Result<UploadTarget, AppError> {
    let s3_key = resume_key(user_id, Uuid::new_v4());
    let presigning = PresigningConfig::expires_in(Duration::from_secs(ttl_secs))
        .map_err(|e| AppError::Internal(anyhow::anyhow!("invalid presign TTL: {e}")))?;

    let request = s3
        .put_object()
        .bucket(bucket)
        .key(&s3_key)
        .content_type(PDF_CONTENT_TYPE)
        .presigned(presigning)
        .await
        .map_err(|e| AppError::S3(format!("presigning {s3_key} failed: {e}")))?;

    Ok(UploadTarget {
        upload_url: request.uri().to_string(),
        s3_key,
        expires_in_secs: ttl_secs,
    })
}
