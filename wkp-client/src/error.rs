use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("{endpoint} returned HTTP {status}")]
    StatusError { endpoint: &'static str, status: u16 },
}

pub type Result<T> = std::result::Result<T, ClientError>;
