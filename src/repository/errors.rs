use thiserror::Error;

/// Failure talking to the remote REST API. `Display` is the message shown
/// to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// No response was received (connect error, timeout, dropped connection).
    #[error("Error de conexión. Verifica tu conexión a internet.")]
    Network(String),
    /// The server answered with a non-2xx status.
    #[error("{detail}")]
    Rejected { status: u16, detail: String },
    #[error("Respuesta inesperada del servidor: {0}")]
    Decode(String),
    #[error("Sesión no iniciada")]
    Unauthorized,
}

/// Failure of the local durable cache.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Storage error: {0}")]
    Io(String),
    #[error("Corrupt cache entry: {0}")]
    Corrupt(String),
}
