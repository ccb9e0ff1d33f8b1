//! Error types for the precipitation-frequency services.

use thiserror::Error;

/// Result type alias using PfError.
pub type PfResult<T> = Result<T, PfError>;

/// Primary error type for point lookups and table rendering.
#[derive(Debug, Error)]
pub enum PfError {
    // === Request Errors ===
    #[error("Missing required parameter: {0}")]
    MissingParameter(String),

    #[error("Invalid parameter value for '{param}': {message}")]
    InvalidParameter { param: String, message: String },

    #[error("Point {0} is outside the data set")]
    OutsideDataSet(String),

    // === Backend Errors ===
    #[error("Data service unavailable: {0}")]
    Unavailable(String),

    #[error("Malformed response from data service: {0}")]
    MalformedResponse(String),

    // === Logic Errors ===
    #[error("Axis '{axis}' has no label '{label}'")]
    AxisNotFound { axis: String, label: String },

    #[error("Projection error: {0}")]
    ProjectionError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl PfError {
    pub fn invalid_parameter(param: impl Into<String>, message: impl Into<String>) -> Self {
        PfError::InvalidParameter {
            param: param.into(),
            message: message.into(),
        }
    }

    pub fn axis_not_found(axis: impl Into<String>, label: impl ToString) -> Self {
        PfError::AxisNotFound {
            axis: axis.into(),
            label: label.to_string(),
        }
    }

    /// Short machine-readable name used in JSON error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            PfError::MissingParameter(_) => "MissingParameter",
            PfError::InvalidParameter { .. } => "InvalidParameter",
            PfError::OutsideDataSet(_) => "OutsideDataSet",
            PfError::Unavailable(_) => "Unavailable",
            PfError::MalformedResponse(_) => "MalformedResponse",
            PfError::AxisNotFound { .. } => "AxisNotFound",
            PfError::ProjectionError(_) => "TransformError",
            PfError::InternalError(_) => "InternalError",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn http_status_code(&self) -> u16 {
        match self {
            PfError::MissingParameter(_) | PfError::InvalidParameter { .. } => 400,

            PfError::OutsideDataSet(_) => 404,

            PfError::Unavailable(_) | PfError::MalformedResponse(_) => 502,

            _ => 500,
        }
    }

    /// Message shown to the person who clicked the map.
    ///
    /// Logic errors are not recoverable from the UI, so they get a generic text.
    pub fn user_message(&self) -> String {
        match self {
            PfError::MissingParameter(_) | PfError::InvalidParameter { .. } => self.to_string(),
            PfError::OutsideDataSet(point) => format!(
                "The point {} is outside of the data set. Choose a point within Alaska.",
                point
            ),
            PfError::Unavailable(_) | PfError::MalformedResponse(_) => {
                "The data service could not be reached. Please try again.".to_string()
            }
            _ => "An internal error occurred while building the table.".to_string(),
        }
    }
}

impl From<serde_json::Error> for PfError {
    fn from(err: serde_json::Error) -> Self {
        PfError::MalformedResponse(format!("JSON error: {}", err))
    }
}
