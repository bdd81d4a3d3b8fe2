//! Error types for the penmark-core library.

use thiserror::Error;

/// Main error type for the penmark library.
#[derive(Error, Debug)]
pub enum PenmarkError {
    /// Document loading error.
    #[error("load error: {0}")]
    Load(#[from] LoadError),

    /// Signature embedding error.
    #[error("embed error: {0}")]
    Embed(#[from] EmbedError),

    /// Invalid geometry or render-context input.
    #[error("geometry error: {0}")]
    Geometry(#[from] GeometryError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors raised while loading a document into a session.
#[derive(Error, Debug)]
pub enum LoadError {
    /// The supplied byte stream was empty.
    #[error("input byte stream is empty")]
    EmptyInput,

    /// The bytes could not be parsed as a PDF.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// The PDF is encrypted with a non-empty password.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF parsed but contains no pages.
    #[error("PDF has no pages")]
    NoPages,
}

/// Errors raised by the signature embedding pipeline.
#[derive(Error, Debug)]
pub enum EmbedError {
    /// No document has been loaded into the session.
    #[error("no document loaded")]
    NoDocumentLoaded,

    /// The session's current page is outside the document's page range.
    #[error("invalid page index: {0}")]
    InvalidPageIndex(u32),

    /// The signature image is absent or could not be decoded.
    #[error("failed to decode signature image: {0}")]
    ImageDecode(String),

    /// Another embed operation is already in flight on this session.
    #[error("an embed operation is already in progress")]
    InProgress,

    /// The target page's object structure could not be mutated.
    #[error("malformed page structure: {0}")]
    PageStructure(String),

    /// The mutated document could not be serialized.
    #[error("failed to serialize signed document: {0}")]
    Serialize(String),
}

/// Errors raised when numeric inputs cross the geometry boundary.
///
/// The transform itself is total; malformed numbers are rejected here, at
/// construction time, so non-finite values never reach the coordinate math.
#[derive(Error, Debug)]
pub enum GeometryError {
    /// A coordinate, delta, or scale was NaN or infinite.
    #[error("non-finite value for {0}")]
    NonFinite(&'static str),

    /// A dimension or scale that must be strictly positive was not.
    #[error("{0} must be positive")]
    NotPositive(&'static str),
}

/// Result type for the penmark library.
pub type Result<T> = std::result::Result<T, PenmarkError>;
