//! Library crate for port-grab: a concurrent TCP connect scanner with banner capture.
pub mod config;
pub mod logging;
pub mod pool;
pub mod ports;
pub mod scanner;
pub mod sink;
pub mod types;
