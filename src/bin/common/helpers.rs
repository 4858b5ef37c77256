use thiserror::Error;

use sundex::catalog::CatalogError;
use sundex::raster::reader::RasterError;

#[derive(Debug, Error)]
pub enum SundexError {
    #[error("{0}")]
    Catalog(#[from] CatalogError),
    #[error("{0}")]
    Raster(#[from] RasterError),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("export: {0}")]
    Export(#[from] serde_json::Error),
    #[error("{0}")]
    Message(String),
}

impl From<String> for SundexError {
    fn from(msg: String) -> Self {
        SundexError::Message(msg)
    }
}

impl From<&str> for SundexError {
    fn from(msg: &str) -> Self {
        SundexError::Message(msg.to_owned())
    }
}
