pub mod config;
pub mod error;
pub mod invocation;
pub mod mapping;
pub mod prompt;
pub mod records;
pub mod response;
pub mod server;
pub mod transport;

pub use error::{Error, Result};
