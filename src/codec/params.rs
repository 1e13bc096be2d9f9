//! Parameter types for the codec seam.
//!
//! These types describe *what* to encode, not *how*. They are the interface
//! between the search layer (which decides what to try next) and the
//! [`backend`](super::backend) (which does the actual pixel work). Keeping
//! them as plain data allows swapping backends (e.g. a mock for testing)
//! without touching search logic.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Quality(pub u8);

impl Quality {
    pub fn new(value: u8) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(92)
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Output format for re-encoded images.
///
/// Quality only varies for JPEG and WebP; the PNG path degrades to a
/// dimension-only search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Jpeg,
    Png,
    Webp,
}

impl OutputFormat {
    /// Whether the encoder's quality knob affects output size for this format.
    pub fn is_lossy(self) -> bool {
        !matches!(self, OutputFormat::Png)
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutputFormat::Jpeg => "jpeg",
            OutputFormat::Png => "png",
            OutputFormat::Webp => "webp",
        };
        write!(f, "{name}")
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "jpeg" | "jpg" => Ok(OutputFormat::Jpeg),
            "png" => Ok(OutputFormat::Png),
            "webp" => Ok(OutputFormat::Webp),
            other => Err(format!("unknown format '{other}' (expected jpeg, png or webp)")),
        }
    }
}

/// One encoded candidate produced by a trial.
///
/// `dimensions` is `None` when the encoding path does not report them
/// (the platform fast path encodes from a file without decoding here).
#[derive(Debug, Clone)]
pub struct EncodedBlob {
    pub bytes: Vec<u8>,
    pub quality: Quality,
    pub dimensions: Option<(u32, u32)>,
}

impl EncodedBlob {
    pub fn new(bytes: Vec<u8>, quality: Quality, dimensions: Option<(u32, u32)>) -> Self {
        Self {
            bytes,
            quality,
            dimensions,
        }
    }

    /// Encoded size in bytes.
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_clamps_to_valid_range() {
        assert_eq!(Quality::new(0).value(), 1);
        assert_eq!(Quality::new(50).value(), 50);
        assert_eq!(Quality::new(255).value(), 100);
    }

    #[test]
    fn quality_default_is_92() {
        assert_eq!(Quality::default().value(), 92);
    }

    #[test]
    fn format_parses_common_spellings() {
        assert_eq!("jpeg".parse::<OutputFormat>().unwrap(), OutputFormat::Jpeg);
        assert_eq!("JPG".parse::<OutputFormat>().unwrap(), OutputFormat::Jpeg);
        assert_eq!("webp".parse::<OutputFormat>().unwrap(), OutputFormat::Webp);
        assert!("gif".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn png_is_not_lossy() {
        assert!(OutputFormat::Jpeg.is_lossy());
        assert!(OutputFormat::Webp.is_lossy());
        assert!(!OutputFormat::Png.is_lossy());
    }

    #[test]
    fn blob_reports_size() {
        let blob = EncodedBlob::new(vec![0u8; 1234], Quality::new(80), Some((640, 480)));
        assert_eq!(blob.size(), 1234);
        assert_eq!(blob.dimensions, Some((640, 480)));
    }
}
