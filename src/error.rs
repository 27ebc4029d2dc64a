//! Error types for look generation.

use axum::http::StatusCode;
use thiserror::Error;

/// Result type alias for the look-generation core.
pub type Result<T> = std::result::Result<T, LookError>;

/// Errors that can surface from `LookService::generate`.
///
/// Filtering and assembly never fail; a candidate that breaks a rule simply
/// drops out. Only argument validation and store transport problems reach
/// callers.
#[derive(Error, Debug)]
pub enum LookError {
    /// Requested look count is outside `[1, max_looks]`
    #[error("num_looks {got} outside allowed range [1, {max}]")]
    InvalidArgument { got: usize, max: usize },

    /// Anchor SKU is not in the catalog
    #[error("anchor sku not found: {0}")]
    AnchorNotFound(String),

    /// ProductStore or EdgeStore failed or timed out
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
}

impl LookError {
    /// Transport mapping fixed by the service contract.
    pub fn status_code(&self) -> StatusCode {
        match self {
            LookError::InvalidArgument { .. } => StatusCode::BAD_REQUEST,
            LookError::AnchorNotFound(_) => StatusCode::NOT_FOUND,
            LookError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            LookError::InvalidArgument { got: 0, max: 10 }.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            LookError::AnchorNotFound("X".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            LookError::StoreUnavailable("edge store timeout".into()).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
