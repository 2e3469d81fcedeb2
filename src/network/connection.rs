// Per-connection request handling: one request, one response, then close

use crate::executor::QueryBackend;
use crate::service::AdsService;
use bytes::BytesMut;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use super::{
    request::Request,
    response::{Response, Status},
    NetworkError, Result, ADS_PATH, MAX_HEADER_SIZE,
};

const HEADER_TERMINATOR: &[u8] = b"\r\n\r\n";

pub struct Connection<B> {
    stream: TcpStream,
    read_buffer: BytesMut,
    write_buffer: BytesMut,
    service: Arc<AdsService<B>>,
}

impl<B: QueryBackend + 'static> Connection<B> {
    pub fn new(stream: TcpStream, service: Arc<AdsService<B>>) -> Self {
        Self {
            stream,
            read_buffer: BytesMut::with_capacity(8192),
            write_buffer: BytesMut::with_capacity(8192),
            service,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        let response = match self.read_head().await {
            Ok(head) => match Request::parse(&head) {
                Ok(request) => route(&self.service, &request).await,
                Err(err) => Response::error(Status::BadRequest, &err.to_string()),
            },
            Err(NetworkError::ConnectionClosed) => return Ok(()),
            Err(err @ NetworkError::RequestTooLarge(_)) => {
                Response::error(Status::BadRequest, &err.to_string())
            }
            Err(err) => return Err(err),
        };

        self.send_response(&response).await
    }

    /// Read until the blank line that ends the request head
    async fn read_head(&mut self) -> Result<String> {
        loop {
            if let Some(end) = find_terminator(&self.read_buffer) {
                let head = self.read_buffer.split_to(end);
                return Ok(String::from_utf8_lossy(&head).into_owned());
            }
            if self.read_buffer.len() > MAX_HEADER_SIZE {
                return Err(NetworkError::RequestTooLarge(MAX_HEADER_SIZE));
            }

            let n = self.stream.read_buf(&mut self.read_buffer).await?;
            if n == 0 {
                return Err(NetworkError::ConnectionClosed);
            }
        }
    }

    async fn send_response(&mut self, response: &Response) -> Result<()> {
        self.write_buffer.clear();
        response.encode(&mut self.write_buffer);
        self.stream.write_all(&self.write_buffer).await?;
        self.stream.flush().await?;
        self.stream.shutdown().await?;
        Ok(())
    }
}

fn find_terminator(buf: &[u8]) -> Option<usize> {
    buf.windows(HEADER_TERMINATOR.len())
        .position(|window| window == HEADER_TERMINATOR)
}

/// Dispatch a parsed request to the query service.
///
/// Queries scan the whole store, so they run on the blocking pool rather
/// than on the task serving the connection.
pub async fn route<B: QueryBackend + 'static>(
    service: &Arc<AdsService<B>>,
    request: &Request,
) -> Response {
    if request.path != ADS_PATH {
        log::info!("{} {} -> 404", request.method, request.path);
        return Response::error(Status::NotFound, &format!("No route for {}", request.path));
    }
    if request.method != "GET" {
        log::info!("{} {} -> 405", request.method, request.path);
        return Response::error(
            Status::MethodNotAllowed,
            &format!("Method {} not allowed", request.method),
        );
    }

    let params = request.query_params();
    let service = Arc::clone(service);
    let outcome = tokio::task::spawn_blocking(move || service.query_params(&params)).await;
    match outcome {
        Ok(Ok(rows)) => {
            log::info!("GET {}?{} -> {} rows", request.path, request.query, rows.len());
            Response::rows(&rows)
        }
        Ok(Err(err)) => {
            log::info!("GET {}?{} -> {}", request.path, request.query, err);
            Response::query_error(&err)
        }
        Err(err) => {
            log::error!("GET {}?{} -> query task failed: {}", request.path, request.query, err);
            Response::error(Status::InternalServerError, "Query execution failed")
        }
    }
}
