pub mod bits;
pub mod codec_options;
pub mod image;
pub mod payload;
mod surface;

pub use codec_options::{CodecOptions, DEFAULT_REGION_SIZE};
pub use surface::*;
