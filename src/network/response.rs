// HTTP responses with JSON bodies

use crate::executor::ResultRow;
use crate::query::QueryError;
use bytes::{BufMut, BytesMut};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    BadRequest,
    NotFound,
    MethodNotAllowed,
    InternalServerError,
}

impl Status {
    pub fn code(&self) -> u16 {
        match self {
            Status::Ok => 200,
            Status::BadRequest => 400,
            Status::NotFound => 404,
            Status::MethodNotAllowed => 405,
            Status::InternalServerError => 500,
        }
    }

    pub fn reason(&self) -> &'static str {
        match self {
            Status::Ok => "OK",
            Status::BadRequest => "Bad Request",
            Status::NotFound => "Not Found",
            Status::MethodNotAllowed => "Method Not Allowed",
            Status::InternalServerError => "Internal Server Error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: Status,
    pub body: String,
}

impl Response {
    /// 200 with the rows as a JSON array of objects
    pub fn rows(rows: &[ResultRow]) -> Self {
        match serde_json::to_string(rows) {
            Ok(body) => Self {
                status: Status::Ok,
                body,
            },
            Err(err) => Self::error(Status::InternalServerError, &err.to_string()),
        }
    }

    /// Error response whose body is a one-element JSON array of the message
    pub fn error(status: Status, message: &str) -> Self {
        let body = serde_json::to_string(&[message]).unwrap_or_else(|_| "[]".to_string());
        Self { status, body }
    }

    /// Map a pipeline failure to a response
    pub fn query_error(err: &QueryError) -> Self {
        let status = match err {
            QueryError::AliasMismatch { .. } => Status::InternalServerError,
            _ => Status::BadRequest,
        };
        Self::error(status, &err.to_string())
    }

    /// Serialize status line, headers and body
    pub fn encode(&self, buf: &mut BytesMut) {
        let head = format!(
            "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            self.status.code(),
            self.status.reason(),
            self.body.len()
        );
        buf.reserve(head.len() + self.body.len());
        buf.put_slice(head.as_bytes());
        buf.put_slice(self.body.as_bytes());
    }
}
