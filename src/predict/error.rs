use thiserror::Error;

#[derive(Debug, Error)]
pub enum PredictError {
    #[error("Invalid elements for {name}: {message}")]
    InvalidElements { name: String, message: String },
    #[error("Propagation error: {0}")]
    Propagation(String),
    #[error("Track step must be positive")]
    InvalidStep,
    #[error("No data available for {0}")]
    NoData(String),
}

impl From<sgp4::Error> for PredictError {
    fn from(err: sgp4::Error) -> Self {
        PredictError::Propagation(err.to_string())
    }
}
