use base64::Engine;

/// A decoded image payload.
#[derive(Debug, Clone)]
pub struct ImagePayload {
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl ImagePayload {
    /// Decode plain base64 or a `data:<mime>;base64,<payload>` URI.
    pub fn parse(content: &str) -> Result<Self, base64::DecodeError> {
        let (declared_mime, payload) = split_data_uri(content);
        let bytes = base64::engine::general_purpose::STANDARD.decode(payload.trim())?;
        let mime = declared_mime
            .map(str::to_string)
            .unwrap_or_else(|| detect_image_mime(&bytes).to_string());
        Ok(Self { mime, bytes })
    }

    /// File extension matching the MIME type.
    pub fn extension(&self) -> &'static str {
        match self.mime.as_str() {
            "image/jpeg" | "image/jpg" => "jpg",
            "image/gif" => "gif",
            "image/bmp" => "bmp",
            "image/webp" => "webp",
            _ => "png",
        }
    }
}

/// Strip a `data:` URI header, returning the declared MIME type if any.
pub fn split_data_uri(content: &str) -> (Option<&str>, &str) {
    if let Some(rest) = content.strip_prefix("data:") {
        if let Some((header, payload)) = rest.split_once(',') {
            let mime = header.split(';').next().filter(|m| !m.is_empty());
            return (mime, payload);
        }
    }
    (None, content)
}

/// Detect MIME type from raw image bytes.
pub fn detect_image_mime(data: &[u8]) -> &'static str {
    if data.starts_with(b"\x89PNG\r\n\x1a\n") {
        "image/png"
    } else if data.starts_with(b"\xff\xd8") {
        "image/jpeg"
    } else if data.starts_with(b"GIF8") {
        "image/gif"
    } else if data.starts_with(b"BM") {
        "image/bmp"
    } else if data.starts_with(b"RIFF") && data.len() > 12 && &data[8..12] == b"WEBP" {
        "image/webp"
    } else {
        "image/png"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_data_uri() {
        let encoded = base64::engine::general_purpose::STANDARD.encode(b"\xff\xd8\xff\xe0rest");
        let payload = ImagePayload::parse(&format!("data:image/jpeg;base64,{encoded}")).unwrap();
        assert_eq!(payload.mime, "image/jpeg");
        assert_eq!(payload.extension(), "jpg");
        assert_eq!(&payload.bytes[..2], b"\xff\xd8");
    }

    #[test]
    fn test_parse_plain_base64_sniffs_mime() {
        let encoded = base64::engine::general_purpose::STANDARD.encode(b"GIF89a....");
        let payload = ImagePayload::parse(&encoded).unwrap();
        assert_eq!(payload.mime, "image/gif");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(ImagePayload::parse("data:image/png;base64,@@@").is_err());
    }

    #[test]
    fn test_split_data_uri_without_header() {
        assert_eq!(split_data_uri("AAAA"), (None, "AAAA"));
        assert_eq!(split_data_uri("data:,AAAA"), (None, "AAAA"));
    }
}
