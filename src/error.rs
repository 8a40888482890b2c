use thiserror::Error;

#[derive(Debug, Error)]
pub enum RatingDecodeError {
    #[error("rating payload is not valid JSON: {0}")]
    MalformedJson(#[from] serde_json::Error),
    #[error("rating payload is a JSON {0}, expected an object or array")]
    NotAMap(&'static str),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RatingValueError {
    #[error("rating is not numeric")]
    NotNumeric,
    #[error("rating {0} is outside {1}..={2}")]
    OutOfRange(f64, u8, u8),
}
