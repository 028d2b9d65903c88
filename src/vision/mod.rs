//! Image-side capabilities that live outside this service: text recognition
//! and perspective rectification. Each is a trait with swappable providers.

pub mod demo;
pub mod image;
pub mod passthrough;
pub mod remote;

use async_trait::async_trait;
use std::sync::Arc;
use tracing::warn;

use crate::config::Settings;

/// `text = recognize_text(image)`.
#[async_trait]
pub trait TextRecognizer: Send + Sync {
    async fn recognize_text(&self, image_base64: &str) -> anyhow::Result<String>;

    fn provider_name(&self) -> &str;
}

/// Output of a rectification step.
#[derive(Debug, Clone)]
pub struct Rectified {
    pub image_base64: String,
    pub message: String,
}

/// `image = rectify(image)`.
#[async_trait]
pub trait Rectifier: Send + Sync {
    async fn rectify(&self, image_base64: &str) -> anyhow::Result<Rectified>;

    fn provider_name(&self) -> &str;
}

pub fn build_recognizer(settings: &Settings) -> anyhow::Result<Arc<dyn TextRecognizer>> {
    match settings.ocr_provider.as_str() {
        "remote" => {
            let url = settings
                .ocr_api_url
                .clone()
                .ok_or_else(|| anyhow::anyhow!("OCR_API_URL is required for the remote OCR provider"))?;
            Ok(Arc::new(remote::RemoteTextRecognizer::new(url, settings.vision_timeout_secs)?))
        }
        "demo" => {
            warn!("OCR provider is 'demo': recognized text is a canned sample, not read from the image");
            Ok(Arc::new(demo::DemoTextRecognizer))
        }
        other => anyhow::bail!("Unknown OCR provider: {other}"),
    }
}

pub fn build_rectifier(settings: &Settings) -> anyhow::Result<Arc<dyn Rectifier>> {
    match settings.rectify_provider.as_str() {
        "remote" => {
            let url = settings.rectify_api_url.clone().ok_or_else(|| {
                anyhow::anyhow!("RECTIFY_API_URL is required for the remote rectify provider")
            })?;
            Ok(Arc::new(remote::RemoteRectifier::new(url, settings.vision_timeout_secs)?))
        }
        "passthrough" => Ok(Arc::new(passthrough::PassthroughRectifier)),
        other => anyhow::bail!("Unknown rectify provider: {other}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_defaults() {
        let settings = Settings::from_toml(Default::default());
        assert_eq!(build_recognizer(&settings).unwrap().provider_name(), "demo");
        assert_eq!(build_rectifier(&settings).unwrap().provider_name(), "passthrough");
    }

    #[test]
    fn test_remote_requires_url() {
        let mut settings = Settings::from_toml(Default::default());
        settings.ocr_provider = "remote".to_string();
        settings.ocr_api_url = None;
        assert!(build_recognizer(&settings).is_err());

        settings.rectify_provider = "opencv".to_string();
        assert!(build_rectifier(&settings).is_err());
    }
}
