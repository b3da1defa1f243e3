// error.rs     Error definitions
//
// Copyright (c) 2024-2025  Douglas Lau
//

/// Sapling errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error
    #[error("I/O {0}")]
    Io(#[from] std::io::Error),

    /// Invalid Parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(&'static str),
}

pub type Result<T> = std::result::Result<T, Error>;
