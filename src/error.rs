/// Error types for deck generation.
use thiserror::Error;

/// Result type for deck generation operations.
pub type Result<T> = std::result::Result<T, DeckError>;

/// Error types for deck generation.
#[derive(Error, Debug)]
pub enum DeckError {
    /// Spreadsheet read error
    #[error("spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::Error),

    /// ZIP package error
    #[error("package error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// XML parsing or generation error
    #[error("XML error: {0}")]
    Xml(String),

    /// Part not found in an OPC package
    #[error("part not found: {0}")]
    PartNotFound(String),

    /// Invalid format
    #[error("invalid format: {0}")]
    InvalidFormat(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<quick_xml::Error> for DeckError {
    fn from(err: quick_xml::Error) -> Self {
        DeckError::Xml(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for DeckError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        DeckError::Xml(err.to_string())
    }
}

impl From<std::fmt::Error> for DeckError {
    fn from(err: std::fmt::Error) -> Self {
        DeckError::Xml(err.to_string())
    }
}
