use super::payload::{FORMAT_VERSION, MAGIC_HEADER};

/// Default edge length of the square embedding region, in pixels
pub const DEFAULT_REGION_SIZE: u32 = 100;

/// Codec configuration for embedding and extracting card records.
///
/// The defaults produce the on-disk format every Aurora card uses, changing
/// `region_size` or `magic` yields images the default codec cannot read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecOptions {
    /// Edge length of the top left embedding region. The region is clipped to the
    /// image, so images smaller than this use all of their pixels.
    ///
    /// Note this number influences the capacity directly.
    pub region_size: u32,

    /// The 12 character tag that marks a payload as ours
    pub magic: String,

    /// Written into the metadata of every envelope
    pub format_version: String,

    /// If false, the stored checksum is read but not compared. Meant for
    /// recovering damaged cards, never for regular reads.
    pub verify_checksum: bool,
}

impl Default for CodecOptions {
    fn default() -> Self {
        Self {
            region_size: DEFAULT_REGION_SIZE,
            magic: MAGIC_HEADER.to_string(),
            format_version: FORMAT_VERSION.to_string(),
            verify_checksum: true,
        }
    }
}

impl CodecOptions {
    pub fn with_region_size(mut self, region_size: u32) -> Self {
        self.region_size = region_size;
        self
    }

    pub fn with_magic<S: Into<String>>(mut self, magic: S) -> Self {
        self.magic = magic.into();
        self
    }

    pub fn with_verify_checksum(mut self, verify_checksum: bool) -> Self {
        self.verify_checksum = verify_checksum;
        self
    }
}
