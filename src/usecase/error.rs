use thiserror::Error;

use crate::repository::errors::ApiError;

#[derive(Debug, Error)]
pub enum UsecaseError {
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl UsecaseError {
    /// True when the remote store never answered.
    pub fn is_network(&self) -> bool {
        matches!(self, UsecaseError::Api(ApiError::Network(_)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_message_is_preserved() {
        let err = UsecaseError::from(ApiError::Rejected {
            status: 404,
            detail: "Comentario no encontrado".to_string(),
        });
        assert_eq!(err.to_string(), "Comentario no encontrado");
        assert!(!err.is_network());
    }

    #[test]
    fn test_network_error() {
        let err = UsecaseError::from(ApiError::Network("connection refused".to_string()));
        assert!(err.is_network());
        assert_eq!(
            err.to_string(),
            "Error de conexión. Verifica tu conexión a internet."
        );
    }
}
