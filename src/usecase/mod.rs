pub mod cache;
pub mod clock;
pub mod comments;
pub mod contracts;
pub mod error;
pub mod lock;
pub mod notifications;
