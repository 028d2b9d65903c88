use async_trait::async_trait;

use super::{Rectified, Rectifier};

/// Returns the image unchanged. Stands in until a real rectification
/// service is configured.
pub struct PassthroughRectifier;

#[async_trait]
impl Rectifier for PassthroughRectifier {
    async fn rectify(&self, image_base64: &str) -> anyhow::Result<Rectified> {
        Ok(Rectified {
            image_base64: image_base64.to_string(),
            message: "图像矫正完成（演示模式）".to_string(),
        })
    }

    fn provider_name(&self) -> &str {
        "passthrough"
    }
}
