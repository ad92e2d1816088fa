//! Network client for fetchwork.
//!
//! This crate provides the HTTP fetch capability the router drives:
//! buffered and streaming fetches with cache-bypass control.

pub mod fetch;

pub use fetch::{CacheMode, FetchBody, FetchConfig, FetchResponse, HttpUpstream, Upstream};
