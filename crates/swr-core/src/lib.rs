//! swr core
//!
//! Shared vocabulary for the swr cache router: the error type, a small HTTP
//! request/response model and the port traits that storage and network
//! adapters implement. This crate has minimal dependencies so every other
//! crate in the workspace can depend on it.

pub mod error;
pub mod http;
pub mod ports;

pub use error::{Error, Result};
pub use http::{Headers, Method, Request, Response, ResponseSource};
pub use ports::{CacheStorage, Fetcher};
