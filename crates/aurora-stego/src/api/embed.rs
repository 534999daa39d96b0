use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::api::shared::derived_output_path;
use crate::media::payload::Record;
use crate::{AuroraError, CodecOptions, StegoCodec};

pub fn prepare() -> EmbedApi {
    EmbedApi::default()
}

#[derive(Default, Debug)]
pub struct EmbedApi {
    image: Option<PathBuf>,
    output: Option<PathBuf>,
    record: Record,
    overwrite: bool,
    options: CodecOptions,
}

impl EmbedApi {
    pub fn with_options(mut self, options: CodecOptions) -> Self {
        self.options = options;
        self
    }

    /// the carrier image, any format the `image` crate decodes
    pub fn with_image<A: AsRef<Path>>(mut self, image: A) -> Self {
        self.image = Some(image.as_ref().to_path_buf());
        self
    }

    /// Where to write the card, defaults to `<stem>_embedded.png` next to the image
    pub fn with_output<A: AsRef<Path>>(mut self, output: A) -> Self {
        self.output = Some(output.as_ref().to_path_buf());
        self
    }

    /// If `None` is passed, the output is derived from the image path
    pub fn use_output<A: AsRef<Path>>(mut self, output: Option<A>) -> Self {
        self.output = output.map(|o| o.as_ref().to_path_buf());
        self
    }

    /// replaces all fields collected so far
    pub fn with_record(mut self, record: Record) -> Self {
        self.record = record;
        self
    }

    pub fn with_field<K: Into<String>>(mut self, field: K, value: Value) -> Self {
        self.record.insert(field.into(), value);
        self
    }

    /// replace a record the image already carries instead of failing
    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// embeds and returns the path of the written card
    pub fn execute(self) -> Result<PathBuf, AuroraError> {
        let Some(image) = self.image else {
            return Err(AuroraError::CarrierNotSet);
        };
        let output = self
            .output
            .unwrap_or_else(|| derived_output_path(&image));

        StegoCodec::with_options(self.options).embed_to(
            &image,
            &output,
            &self.record,
            self.overwrite,
        )
    }
}
