//! Object storage helpers (S3 / MinIO). Keys are namespaced per user:
//! `cvs/{user_id}/...` and `exports/{user_id}/...`.

use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;

pub fn cv_key(user_id: Uuid, version: i32) -> String {
    format!("cvs/{user_id}/v{version}.md")
}

pub fn export_key(user_id: Uuid, timestamp: i64) -> String {
    format!("exports/{user_id}/{timestamp}.json")
}

/// Every prefix that holds objects belonging to `user_id`.
pub fn user_prefixes(user_id: Uuid) -> [String; 2] {
    [format!("cvs/{user_id}/"), format!("exports/{user_id}/")]
}

pub async fn put_object(
    s3: &S3Client,
    bucket: &str,
    key: &str,
    body: Vec<u8>,
    content_type: &str,
) -> Result<(), AppError> {
    s3.put_object()
        .bucket(bucket)
        .key(key)
        .body(ByteStream::from(body))
        .content_type(content_type)
        .send()
        .await
        .map_err(|e| AppError::S3(format!("upload of {key} failed: {e}")))?;

    info!("Uploaded s3://{bucket}/{key}");
    Ok(())
}

pub async fn delete_object(s3: &S3Client, bucket: &str, key: &str) -> Result<(), AppError> {
    s3.delete_object()
        .bucket(bucket)
        .key(key)
        .send()
        .await
        .map_err(|e| AppError::S3(format!("delete of {key} failed: {e}")))?;
    Ok(())
}

/// Deletes every object under `prefix`. Per-object failures are logged and skipped;
/// returns how many objects were removed.
pub async fn delete_prefix(s3: &S3Client, bucket: &str, prefix: &str) -> Result<usize, AppError> {
    let mut removed = 0;
    let mut continuation: Option<String> = None;

    loop {
        let page = s3
            .list_objects_v2()
            .bucket(bucket)
            .prefix(prefix)
            .set_continuation_token(continuation.take())
            .send()
            .await
            .map_err(|e| AppError::S3(format!("listing {prefix} failed: {e}")))?;

        for object in page.contents() {
            let Some(key) = object.key() else { continue };
            match delete_object(s3, bucket, key).await {
                Ok(()) => removed += 1,
                Err(e) => warn!("Skipping object: {e}"),
            }
        }

        match page.next_continuation_token() {
            Some(token) => continuation = Some(token.to_string()),
            None => break,
        }
    }

    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_are_namespaced_by_user() {
        let user = Uuid::new_v4();
        let [cvs, exports] = user_prefixes(user);
        assert!(cv_key(user, 3).starts_with(&cvs));
        assert!(cv_key(user, 3).ends_with("/v3.md"));
        assert!(export_key(user, 1_700_000_000).starts_with(&exports));
    }
}
