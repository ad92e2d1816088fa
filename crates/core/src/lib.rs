//! Core types and shared functionality for fetchwork.
//!
//! This crate provides:
//! - The request/response data model shared by the router and client
//! - Cache stores (in-memory and SQLite) organized into generations
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;
pub mod request;

pub use cache::{CacheHandle, CacheStore, MemoryStore, RequestKey, ResponseSnapshot, SqliteStore};
pub use config::{AppConfig, ConfigError};
pub use error::Error;
pub use request::{RequestDescriptor, RequestMode};
