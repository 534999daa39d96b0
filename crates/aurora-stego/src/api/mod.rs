pub mod embed;
pub(crate) mod shared;
