use thiserror::Error;

pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Date parsing error: {0}")]
    DateParse(#[from] chrono::ParseError),

    #[error("Zip archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    #[error("Invalid coordinate: {0}")]
    InvalidCoordinate(String),

    #[error("Cell indexing error: {0}")]
    CellIndexing(String),

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("Rendering error: {0}")]
    Render(String),

    #[error("Encoder precondition violated: {0}")]
    Encoding(String),

    #[error("No data available: {0}")]
    NoData(String),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
