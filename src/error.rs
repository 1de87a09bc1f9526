use thiserror::Error;

pub type DustResult<T> = Result<T, DustError>;

#[derive(Debug, Error)]
pub enum DustError {
    #[error("Missing required FITS keyword: {keyword}")]
    MissingKeyword { keyword: String },

    #[error("Invalid FITS keyword '{keyword}': {message}")]
    InvalidKeyword { keyword: String, message: String },

    #[error("Invalid FITS format: {message}")]
    InvalidFormat { message: String },

    #[error("Unsupported projection: {code}")]
    UnsupportedProjection { code: String },

    #[error("Non-invertible CD matrix (determinant = {determinant})")]
    NonInvertibleMatrix { determinant: f64 },

    #[error("Coordinate out of bounds: {message}")]
    OutOfBounds { message: String },

    #[error("Invalid coordinate: {message}")]
    InvalidCoordinate { message: String },

    #[error("Unsupported coordinate frame: {name}")]
    UnsupportedFrame { name: String },

    #[error("Unknown survey: {survey}")]
    UnknownSurvey { survey: String },

    #[error("Unknown filter '{filter}' for survey '{survey}'")]
    UnknownFilter { survey: String, filter: String },

    #[error("Invalid parameter: {message}")]
    InvalidParameter { message: String },

    #[error("Reference data not available: {message}")]
    DataUnavailable { message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Coefficient table parse error: {0}")]
    Table(#[from] serde_json::Error),
}

impl DustError {
    pub fn missing_keyword(keyword: impl Into<String>) -> Self {
        Self::MissingKeyword {
            keyword: keyword.into(),
        }
    }

    pub fn invalid_keyword(keyword: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidKeyword {
            keyword: keyword.into(),
            message: message.into(),
        }
    }

    pub fn invalid_format(message: impl Into<String>) -> Self {
        Self::InvalidFormat {
            message: message.into(),
        }
    }

    pub fn unsupported_projection(code: impl Into<String>) -> Self {
        Self::UnsupportedProjection { code: code.into() }
    }

    pub fn non_invertible_matrix(determinant: f64) -> Self {
        Self::NonInvertibleMatrix { determinant }
    }

    pub fn out_of_bounds(message: impl Into<String>) -> Self {
        Self::OutOfBounds {
            message: message.into(),
        }
    }

    pub fn invalid_coordinate(message: impl Into<String>) -> Self {
        Self::InvalidCoordinate {
            message: message.into(),
        }
    }

    pub fn unsupported_frame(name: impl Into<String>) -> Self {
        Self::UnsupportedFrame { name: name.into() }
    }

    pub fn unknown_survey(survey: impl Into<String>) -> Self {
        Self::UnknownSurvey {
            survey: survey.into(),
        }
    }

    pub fn unknown_filter(survey: impl Into<String>, filter: impl Into<String>) -> Self {
        Self::UnknownFilter {
            survey: survey.into(),
            filter: filter.into(),
        }
    }

    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            message: message.into(),
        }
    }

    pub fn data_unavailable(message: impl Into<String>) -> Self {
        Self::DataUnavailable {
            message: message.into(),
        }
    }
}
