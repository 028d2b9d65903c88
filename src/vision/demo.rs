use async_trait::async_trait;
use sha2::{Digest, Sha256};

use super::image::split_data_uri;
use super::TextRecognizer;

/// Sample problems returned by the demo recognizer.
pub const SAMPLE_TEXTS: [&str; 5] = [
    "已知函数 f(x) = x^2 + 2x + 1，求 f(3) 的值",
    "解二元一次方程组: 2x + 3y = 7, x - y = 1",
    "计算三角函数值: sin(π/6) + cos(π/3)",
    "几何证明: 证明直角三角形斜边上的中线等于斜边的一半",
    "概率问题: 从52张扑克牌中随机抽取2张，都是红心的概率是多少",
];

/// Demo recognizer: picks one of [`SAMPLE_TEXTS`] from a digest of the
/// payload, so the same image always yields the same text. It does not read
/// the image.
pub struct DemoTextRecognizer;

/// Index into [`SAMPLE_TEXTS`] from the first 8 bytes of the SHA-256 digest.
fn sample_index(data: &[u8]) -> usize {
    let hash = Sha256::digest(data);
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&hash[..8]);
    (u64::from_be_bytes(prefix) % SAMPLE_TEXTS.len() as u64) as usize
}

#[async_trait]
impl TextRecognizer for DemoTextRecognizer {
    async fn recognize_text(&self, image_base64: &str) -> anyhow::Result<String> {
        let (_, payload) = split_data_uri(image_base64);
        Ok(SAMPLE_TEXTS[sample_index(payload.as_bytes())].to_string())
    }

    fn provider_name(&self) -> &str {
        "demo"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_same_image_same_text() {
        let a = DemoTextRecognizer.recognize_text("AAAA").await.unwrap();
        let b = DemoTextRecognizer.recognize_text("data:image/png;base64,AAAA").await.unwrap();
        assert_eq!(a, b);
        assert!(SAMPLE_TEXTS.contains(&a.as_str()));
    }

    #[test]
    fn test_sample_index_is_stable_and_in_range() {
        for payload in [&b""[..], b"AAAA", b"iVBORw0KGgo=", b"/9j/4AAQSkZJRg=="] {
            let idx = sample_index(payload);
            assert!(idx < SAMPLE_TEXTS.len());
            assert_eq!(idx, sample_index(payload));
        }
    }

    #[test]
    fn test_sample_index_uses_sha256_prefix() {
        // SHA-256("") starts e3b0c44298fc1c14.
        let expected = (0xe3b0c44298fc1c14u64 % SAMPLE_TEXTS.len() as u64) as usize;
        assert_eq!(sample_index(b""), expected);
    }
}
