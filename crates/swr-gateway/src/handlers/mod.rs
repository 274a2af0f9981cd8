//! HTTP request handlers.

pub mod control;
pub mod health;
pub mod proxy;
