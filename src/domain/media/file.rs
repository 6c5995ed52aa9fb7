/// A newly uploaded file payload, as received from the HTTP layer.
#[derive(Debug, Clone)]
pub struct IncomingFile {
    pub bytes: Vec<u8>,
    pub content_type: String,
    pub filename: Option<String>,
}

impl IncomingFile {
    pub fn new(bytes: Vec<u8>, content_type: impl Into<String>, filename: Option<String>) -> Self {
        Self {
            bytes,
            content_type: content_type.into(),
            filename,
        }
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Essence of the declared content type (`image/png; foo=bar` -> `image/png`).
    pub fn mime_essence(&self) -> String {
        self.content_type
            .split(';')
            .next()
            .unwrap_or("")
            .trim()
            .to_ascii_lowercase()
    }

    /// Lowercased extension for the stored object. Taken from the original
    /// filename when it is a short alphanumeric suffix, else guessed from
    /// the content type.
    pub fn extension(&self) -> Option<String> {
        let from_name = self
            .filename
            .as_deref()
            .and_then(|n| n.rsplit_once('.'))
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .filter(|ext| {
                !ext.is_empty() && ext.len() <= 8 && ext.chars().all(|c| c.is_ascii_alphanumeric())
            });
        if from_name.is_some() {
            return from_name;
        }
        mime_guess::get_mime_extensions_str(&self.mime_essence())
            .and_then(|exts| exts.first())
            .map(|ext| ext.to_string())
    }
}
