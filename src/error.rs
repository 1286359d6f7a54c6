use std::io;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("config error on line {line}: {message}")]
    Config { line: usize, message: String },
}

pub type Result<T> = std::result::Result<T, Error>;
