//! Image generation provider.
//!
//! The cover flow talks to [`ImageGenerator`]; [`ReplicateClient`] implements
//! it against the Replicate predictions API.

mod replicate_client;

use async_trait::async_trait;
use serde_json::Value;

use crate::core::error::AppError;

pub use replicate_client::ReplicateClient;

/// A finished generation, still hosted by the provider
#[derive(Debug, Clone)]
pub struct GeneratedImage {
    pub url: String,
    /// Model identifier recorded with the cover
    pub model: String,
    /// Input parameters sent to the provider
    pub params: Value,
    /// Size descriptor recorded with the cover (aspect ratio)
    pub size: String,
}

/// Image bytes fetched from the provider
#[derive(Debug, Clone)]
pub struct DownloadedImage {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

impl DownloadedImage {
    /// File extension matching the content type
    pub fn extension(&self) -> &'static str {
        match self.content_type.as_str() {
            "image/jpeg" | "image/jpg" => "jpg",
            "image/webp" => "webp",
            _ => "png",
        }
    }
}

#[async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<GeneratedImage, AppError>;

    async fn download(&self, url: &str) -> Result<DownloadedImage, AppError>;
}

#[cfg(test)]
pub mod fake {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    /// Generator returning a fixed image, or failing when `fail` is set
    #[derive(Default)]
    pub struct FakeGenerator {
        pub fail: bool,
        pub prompts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ImageGenerator for FakeGenerator {
        async fn generate(&self, prompt: &str) -> Result<GeneratedImage, AppError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            if self.fail {
                return Err(AppError::ExternalServiceError("provider down".into()));
            }
            Ok(GeneratedImage {
                url: "https://provider.test/out.png".to_string(),
                model: "test/model".to_string(),
                params: json!({ "prompt": prompt }),
                size: "16:9".to_string(),
            })
        }

        async fn download(&self, _url: &str) -> Result<DownloadedImage, AppError> {
            Ok(DownloadedImage {
                bytes: vec![0x89, b'P', b'N', b'G'],
                content_type: "image/png".to_string(),
            })
        }
    }

    #[test]
    fn test_extension_from_content_type() {
        let image = |ct: &str| DownloadedImage {
            bytes: Vec::new(),
            content_type: ct.to_string(),
        };
        assert_eq!(image("image/jpeg").extension(), "jpg");
        assert_eq!(image("image/webp").extension(), "webp");
        assert_eq!(image("application/octet-stream").extension(), "png");
    }
}
