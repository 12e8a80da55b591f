use serde::{Deserialize, Serialize};

use super::ModelError;

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = ModelError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(ModelError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

str_enum!(FileKind {
    Pdf => "PDF",
    Image => "IMAGE",
    Unknown => "UNKNOWN",
});

str_enum!(ProcessingStatus {
    Processing => "PROCESSING",
    Processed => "PROCESSED",
    Failed => "FAILED",
    ManualReviewRequired => "MANUAL_REVIEW_REQUIRED",
});

impl FileKind {
    /// Classify an upload from its declared content type.
    ///
    /// "pdf" is checked before "image" so a hint naming both routes to PDF.
    pub fn from_content_type(content_type: Option<&str>) -> Self {
        let Some(hint) = content_type else {
            return Self::Unknown;
        };
        let lower = hint.to_ascii_lowercase();
        if lower.contains("pdf") {
            Self::Pdf
        } else if lower.contains("image") {
            Self::Image
        } else {
            Self::Unknown
        }
    }
}

impl ProcessingStatus {
    /// Terminal statuses are the only ones a record may carry once it
    /// leaves the pipeline.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Processing)
    }
}
