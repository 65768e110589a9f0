//! Client-side comment synchronization for the news portal.
//!
//! [`usecase::comments::CommentsUseCase`] mediates between the portal's
//! REST API and a local durable cache: reads prefer the cache, writes go to
//! the API first and fall back to an optimistic local copy, and remote
//! failures degrade instead of propagating (except for deletes).

pub mod config;
pub mod delivery;
pub mod domain;
pub mod repository;
pub mod telemetry;
pub mod usecase;
