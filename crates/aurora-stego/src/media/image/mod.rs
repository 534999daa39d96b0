mod iterators;
pub mod lsb_codec;

pub use lsb_codec::{check_capacity, HideBit, LsbRegion};
