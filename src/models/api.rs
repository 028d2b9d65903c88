use serde::{Deserialize, Serialize};

use super::question::Question;

// ──────────────────────────── Ingest ────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddQuestionRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub image_base64: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AddQuestionResponse {
    pub success: bool,
    pub message: String,
    pub id: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadImageRequest {
    #[serde(default)]
    pub image_base64: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadImageResponse {
    pub success: bool,
    pub image_url: String,
}

// ──────────────────────────── Search ────────────────────────────

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_base64: Option<String>,
}

impl SearchRequest {
    pub fn by_keyword(keyword: impl Into<String>) -> Self {
        Self {
            keyword: Some(keyword.into()),
            image_base64: None,
        }
    }

    pub fn by_image(image_base64: impl Into<String>) -> Self {
        Self {
            keyword: None,
            image_base64: Some(image_base64.into()),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<Question>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchByImageResponse {
    pub results: Vec<Question>,
    #[serde(default)]
    pub recognized_text: Option<String>,
    /// "image", "text" or "none".
    pub source: String,
}

// ──────────────────────────── Vision ────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_base64: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrResponse {
    pub success: bool,
    pub text: String,
    pub words: Vec<String>,
}

impl OcrResponse {
    pub fn from_text(text: String) -> Self {
        let words = text.split(' ').map(str::to_string).collect();
        Self {
            success: true,
            text,
            words,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RectifyResponse {
    pub success: bool,
    pub rectified_image: String,
    pub message: String,
}

// ──────────────────────────── Health ────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub service: String,
    pub version: String,
}
