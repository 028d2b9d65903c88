use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{Rectified, Rectifier, TextRecognizer};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageBody<'a> {
    image_base64: &'a str,
}

#[derive(Deserialize)]
struct OcrReply {
    #[serde(default = "default_true")]
    success: bool,
    #[serde(default)]
    text: String,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RectifyReply {
    #[serde(default = "default_true")]
    success: bool,
    #[serde(default)]
    rectified_image: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

fn default_true() -> bool {
    true
}

async fn post_image<T: for<'de> Deserialize<'de>>(
    client: &reqwest::Client,
    url: &str,
    image_base64: &str,
    what: &str,
) -> anyhow::Result<T> {
    let resp = client
        .post(url)
        .json(&ImageBody { image_base64 })
        .send()
        .await?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        anyhow::bail!("{what} service error ({status}): {body}");
    }
    Ok(resp.json().await?)
}

/// OCR service reached over HTTP: `POST {url}` with `{imageBase64}`,
/// replying `{success, text}`.
pub struct RemoteTextRecognizer {
    url: String,
    http_client: reqwest::Client,
}

impl RemoteTextRecognizer {
    pub fn new(url: String, timeout_secs: u64) -> anyhow::Result<Self> {
        Ok(Self {
            url,
            http_client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(timeout_secs))
                .build()?,
        })
    }
}

#[async_trait]
impl TextRecognizer for RemoteTextRecognizer {
    async fn recognize_text(&self, image_base64: &str) -> anyhow::Result<String> {
        let reply: OcrReply = post_image(&self.http_client, &self.url, image_base64, "OCR").await?;
        if !reply.success {
            anyhow::bail!("OCR failed: {}", reply.error.unwrap_or_default());
        }
        Ok(reply.text)
    }

    fn provider_name(&self) -> &str {
        "remote"
    }
}

/// Rectification service reached over HTTP: `POST {url}` with
/// `{imageBase64}`, replying `{success, rectifiedImage, message}`.
pub struct RemoteRectifier {
    url: String,
    http_client: reqwest::Client,
}

impl RemoteRectifier {
    pub fn new(url: String, timeout_secs: u64) -> anyhow::Result<Self> {
        Ok(Self {
            url,
            http_client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(timeout_secs))
                .build()?,
        })
    }
}

#[async_trait]
impl Rectifier for RemoteRectifier {
    async fn rectify(&self, image_base64: &str) -> anyhow::Result<Rectified> {
        let reply: RectifyReply =
            post_image(&self.http_client, &self.url, image_base64, "Rectify").await?;
        match (reply.success, reply.rectified_image) {
            (true, Some(image)) => Ok(Rectified {
                image_base64: image,
                message: reply.message.unwrap_or_default(),
            }),
            _ => anyhow::bail!(
                "Rectification failed: {}",
                reply.error.or(reply.message).unwrap_or_default()
            ),
        }
    }

    fn provider_name(&self) -> &str {
        "remote"
    }
}
