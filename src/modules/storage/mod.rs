//! Object storage for generated images and exported PDFs.
//!
//! Features depend on the [`ObjectStorage`] trait; [`MinIOClient`] is the
//! S3-compatible implementation used in production.

mod minio_client;
mod sigv4;

use async_trait::async_trait;

use crate::core::error::AppError;

pub use minio_client::MinIOClient;

/// Location of an uploaded object
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub key: String,
    pub url: String,
}

#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Object key for `path` under the publicly readable prefix
    fn public_key(&self, path: &str) -> String;

    /// URL anonymous clients can fetch `key` from
    fn public_url(&self, key: &str) -> String;

    async fn upload(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<StoredObject, AppError>;

    async fn delete(&self, key: &str) -> Result<(), AppError>;
}

#[cfg(test)]
pub mod fake {
    use super::*;
    use std::sync::Mutex;

    /// In-memory storage recording every upload
    #[derive(Default)]
    pub struct FakeStorage {
        pub uploads: Mutex<Vec<(String, usize, String)>>,
        pub fail_uploads: bool,
    }

    #[async_trait]
    impl ObjectStorage for FakeStorage {
        fn public_key(&self, path: &str) -> String {
            format!("public/{}", path)
        }

        fn public_url(&self, key: &str) -> String {
            format!("https://cdn.test/{}", key)
        }

        async fn upload(
            &self,
            key: &str,
            data: Vec<u8>,
            content_type: &str,
        ) -> Result<StoredObject, AppError> {
            if self.fail_uploads {
                return Err(AppError::ExternalServiceError("storage down".into()));
            }
            self.uploads
                .lock()
                .unwrap()
                .push((key.to_string(), data.len(), content_type.to_string()));
            Ok(StoredObject {
                key: key.to_string(),
                url: self.public_url(key),
            })
        }

        async fn delete(&self, _key: &str) -> Result<(), AppError> {
            Ok(())
        }
    }
}
