//! Limits for codec-level decoding.

/// Codec-specific limits enforced while decoding payloads.
///
/// A payload exceeding a limit is treated as a protocol desync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecLimits {
    /// Maximum UTF-8 length of a decoded string.
    pub max_string_bytes: usize,
    /// Maximum number of materials on a renderer.
    pub max_materials: usize,
    /// Maximum number of bones on a skinned mesh.
    pub max_bones: usize,
}

impl Default for CodecLimits {
    fn default() -> Self {
        Self {
            max_string_bytes: 16 * 1024,
            max_materials: 64,
            max_bones: 512,
        }
    }
}

impl CodecLimits {
    /// Creates limits suitable for testing with smaller values.
    #[must_use]
    pub const fn for_testing() -> Self {
        Self {
            max_string_bytes: 256,
            max_materials: 8,
            max_bones: 32,
        }
    }

    /// Creates limits with no restrictions (use with caution).
    #[must_use]
    pub const fn unlimited() -> Self {
        Self {
            max_string_bytes: usize::MAX,
            max_materials: usize::MAX,
            max_bones: usize::MAX,
        }
    }
}
