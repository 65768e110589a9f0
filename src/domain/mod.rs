pub mod comment;
pub mod humanize;
pub mod notification;
