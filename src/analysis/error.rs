use thiserror::Error;
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("recording contains no sweeps")]
    NoSweeps,
    #[error("ragged sweep data: row {row} has {actual} values, expected {expected}")]
    RaggedSweeps {
        row: usize,
        expected: usize,
        actual: usize,
    },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to render plot: {0}")]
    Plot(String),
}
impl<E: std::error::Error + Send + Sync + 'static> From<plotters::drawing::DrawingAreaErrorKind<E>>
    for AnalysisError
{
    fn from(value: plotters::drawing::DrawingAreaErrorKind<E>) -> Self {
        AnalysisError::Plot(format!("{value:?}"))
    }
}
impl From<image::ImageError> for AnalysisError {
    fn from(value: image::ImageError) -> Self {
        AnalysisError::Plot(value.to_string())
    }
}
