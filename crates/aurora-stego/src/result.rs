use crate::error::AuroraError;

pub type Result<T> = std::result::Result<T, AuroraError>;
