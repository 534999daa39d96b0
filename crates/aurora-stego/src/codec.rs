use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::RgbImage;
use log::{debug, info, warn};

use crate::api::shared::png_output_path;
use crate::media::image::LsbRegion;
use crate::media::payload::{
    Envelope, EnvelopeCodec, EnvelopeMeta, Record, LENGTH_HEADER_BITS,
};
use crate::media::{CodecOptions, ImageSurface, PngSurface};
use crate::{AuroraError, Result};

/// How much an image can carry, for capacity planning before an embed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capacity {
    pub region_width: u32,
    pub region_height: u32,
    /// every LSB of the region
    pub total_bits: usize,
    /// `total_bits` minus the 32 bit length header
    pub usable_bits: usize,
    pub usable_bytes: usize,
}

impl From<LsbRegion> for Capacity {
    fn from(region: LsbRegion) -> Self {
        let total_bits = region.capacity_bits();
        let usable_bits = total_bits.saturating_sub(LENGTH_HEADER_BITS);

        Self {
            region_width: region.width(),
            region_height: region.height(),
            total_bits,
            usable_bits,
            usable_bytes: usable_bits >> 3,
        }
    }
}

/// Embeds records into card images and reads them back.
///
/// ## Example of usage
/// ```rust
/// use aurora_stego::{Record, StegoCodec};
/// use serde_json::json;
/// use tempfile::tempdir;
///
/// let temp_dir = tempdir().expect("Failed to create temporary directory");
/// let card = temp_dir.path().join("card.png");
/// image::RgbImage::new(120, 80).save(&card).unwrap();
///
/// let mut record = Record::new();
/// record.insert("name".to_string(), json!("Crimson"));
///
/// let codec = StegoCodec::new();
/// codec.embed(&card, &record, false).expect("Failed to embed the record");
///
/// assert_eq!(codec.extract(&card).unwrap(), record);
/// ```
pub struct StegoCodec {
    options: CodecOptions,
    envelope: EnvelopeCodec,
    surface: Arc<dyn ImageSurface>,
}

impl Default for StegoCodec {
    fn default() -> Self {
        Self::with_options(CodecOptions::default())
    }
}

impl std::fmt::Debug for StegoCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StegoCodec")
            .field("options", &self.options)
            .finish()
    }
}

impl StegoCodec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(opts: CodecOptions) -> Self {
        Self {
            envelope: EnvelopeCodec::from_options(&opts),
            options: opts,
            surface: Arc::new(PngSurface),
        }
    }

    /// swaps the storage behind `load` and `save`
    pub fn with_surface(mut self, surface: Arc<dyn ImageSurface>) -> Self {
        self.surface = surface;
        self
    }

    pub fn options(&self) -> &CodecOptions {
        &self.options
    }

    pub fn region_of(&self, image: &RgbImage) -> LsbRegion {
        LsbRegion::for_image(image, self.options.region_size)
    }

    /// Writes the envelope of `record` and `meta` into the region of `image`.
    ///
    /// Fails with `CapacityExceeded` before any pixel is touched.
    pub fn embed_image(
        &self,
        image: &mut RgbImage,
        record: &Record,
        meta: &EnvelopeMeta,
    ) -> Result<()> {
        let region = self.region_of(image);
        let bits = self.envelope.encode(record, meta)?;

        region.embed(image, &bits)
    }

    pub fn extract_image(&self, image: &RgbImage) -> Result<Envelope> {
        let region = self.region_of(image);

        self.envelope.decode(&region.extract(image))
    }

    pub fn capacity_of(&self, image: &RgbImage) -> Capacity {
        self.region_of(image).into()
    }

    /// Embeds `record` into the image at `path` and writes it back in place.
    ///
    /// Without `overwrite` an image that already carries a record is refused.
    /// Returns the path written, which gets `.png` appended if it had another extension.
    pub fn embed(&self, path: impl AsRef<Path>, record: &Record, overwrite: bool) -> Result<PathBuf> {
        let path = path.as_ref();
        self.embed_to(path, path, record, overwrite)
    }

    /// like `embed`, but reads from `source` and writes to `target`
    pub fn embed_to(
        &self,
        source: impl AsRef<Path>,
        target: impl AsRef<Path>,
        record: &Record,
        overwrite: bool,
    ) -> Result<PathBuf> {
        let meta = EnvelopeMeta::fresh(&self.options.format_version);
        self.embed_with_meta(source.as_ref(), target.as_ref(), record, &meta, overwrite)
    }

    /// embeds with caller computed metadata, used when committing edits
    pub fn embed_with_meta(
        &self,
        source: &Path,
        target: &Path,
        record: &Record,
        meta: &EnvelopeMeta,
        overwrite: bool,
    ) -> Result<PathBuf> {
        let target = png_output_path(target)?;
        let mut image = self.surface.load(source)?;

        if !overwrite && self.extract_image(&image).is_ok() {
            warn!("Refusing to overwrite the record embedded in {source:?}");
            return Err(AuroraError::AlreadyEmbedded(source.to_path_buf()));
        }

        self.embed_image(&mut image, record, meta)?;
        self.surface.save(&image, &target)?;
        info!(
            "embedded record with {} fields into {target:?} (edit {})",
            record.len(),
            meta.edit_count
        );

        Ok(target)
    }

    /// the record embedded in the image at `path`, without metadata
    pub fn extract(&self, path: impl AsRef<Path>) -> Result<Record> {
        Ok(self.extract_envelope(path)?.record)
    }

    pub fn extract_envelope(&self, path: impl AsRef<Path>) -> Result<Envelope> {
        let path = path.as_ref();
        let image = self.surface.load(path)?;

        self.extract_image(&image).map_err(|e| {
            debug!("No record extracted from {path:?}: {e}");
            e
        })
    }

    /// true iff `extract` would succeed
    pub fn has_embedded(&self, path: impl AsRef<Path>) -> bool {
        self.extract_envelope(path).is_ok()
    }

    /// Metadata of the embedded envelope, `None` for records written without any
    pub fn get_metadata(&self, path: impl AsRef<Path>) -> Result<Option<EnvelopeMeta>> {
        Ok(self.extract_envelope(path)?.meta)
    }

    pub fn capacity(&self, path: impl AsRef<Path>) -> Result<Capacity> {
        let image = self.surface.load(path.as_ref())?;

        Ok(self.capacity_of(&image))
    }
}
