use anyhow::Result;

const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n";
const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiptFormat {
    Png,
    Jpeg,
}

impl ReceiptFormat {
    /// Sniff the image format from the leading bytes.
    pub fn detect(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(PNG_MAGIC) {
            Some(Self::Png)
        } else if bytes.starts_with(JPEG_MAGIC) {
            Some(Self::Jpeg)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Png => "PNG",
            Self::Jpeg => "JPEG",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
        }
    }
}

impl std::fmt::Display for ReceiptFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A receipt image stored verbatim; never re-encoded or size-limited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    format: ReceiptFormat,
    bytes: Vec<u8>,
}

impl Receipt {
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        let Some(format) = ReceiptFormat::detect(&bytes) else {
            anyhow::bail!("Receipt must be a PNG or JPEG image");
        };
        Ok(Self { format, bytes })
    }

    pub fn format(&self) -> ReceiptFormat {
        self.format
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }
}
