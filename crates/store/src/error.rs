use thiserror::Error;

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("contact with id {0} not found")]
    NotFound(u64),

    #[error("page {0} not found")]
    PageNotFound(usize),

    #[error("invalid contact id {0}")]
    InvalidId(u64),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::PageNotFound(_))
    }
}
