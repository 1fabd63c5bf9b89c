use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FrameError {
    #[error("encoded body of {0} bytes exceeds MAX_FRAME")]
    TooLarge(usize),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("body is not valid UTF-8")]
    InvalidUtf8,
    #[error("body has fewer than 3 pipe-delimited fields")]
    TooFewFields,
    #[error("client_type field is not a decimal integer")]
    InvalidClientType,
    #[error("kind field is not a decimal integer in [1, 200]")]
    InvalidKind,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BufferError {
    #[error("appending {0} bytes would exceed the connection buffer cap")]
    Overflow(usize),
    #[error("declared frame length {0} exceeds MAX_FRAME; buffer cleared")]
    FrameTooLarge(u32),
}
