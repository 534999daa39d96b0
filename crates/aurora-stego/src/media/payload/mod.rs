mod checksum;
mod envelope;
mod meta;

pub use checksum::*;
pub use envelope::*;
pub use meta::*;
