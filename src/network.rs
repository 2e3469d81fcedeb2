// HTTP/1.1 reporting endpoint

pub mod connection;
pub mod request;
pub mod response;
pub mod server;

pub use connection::{route, Connection};
pub use request::Request;
pub use response::{Response, Status};
pub use server::Server;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum NetworkError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Request header exceeds {0} bytes")]
    RequestTooLarge(usize),

    #[error("Connection closed")]
    ConnectionClosed,
}

pub type Result<T> = std::result::Result<T, NetworkError>;

// Default HTTP port
pub const DEFAULT_PORT: u16 = 8080;

// Path of the reporting endpoint
pub const ADS_PATH: &str = "/api/v1/ads";

// Upper bound on the size of a request head
pub const MAX_HEADER_SIZE: usize = 64 * 1024;
