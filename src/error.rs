use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("unknown syntax element: {0}")]
    UnknownSyntaxElement(String),

    #[error("invalid parameter for {element}: {reason}")]
    InvalidParameter { element: String, reason: String },

    #[error("invalid slice type: {0}")]
    InvalidSliceType(String),

    #[error("input error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
