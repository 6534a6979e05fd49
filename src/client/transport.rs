use http_body_util::{combinators::BoxBody, BodyExt, Empty};
use hyper::body::Bytes;
use hyper::client::conn::http1;
use hyper::{Method, Request, Response};
use hyper_util::rt::TokioIo;
use tokio::net::TcpStream;

use super::types::{BoxError, RequestParts};

/// One client-side transport configuration, fixed for the lifetime of a run.
///
/// The single knob is `keep_alive`: when set, the transport caches one
/// connection and reuses it for as long as the server leaves it open; when
/// unset, every request dials a fresh connection. Pooling policy beyond that
/// is delegated to hyper.
pub struct Transport {
    addr: String,
    keep_alive: bool,
    sender: Option<http1::SendRequest<BoxBody<Bytes, BoxError>>>,
}

impl Transport {
    pub fn new(addr: &str, keep_alive: bool) -> Self {
        Transport {
            addr: addr.to_owned(),
            keep_alive,
            sender: None,
        }
    }

    pub fn keep_alive(&self) -> bool {
        self.keep_alive
    }

    /// Issues a GET for `path`, reusing the cached connection when the reuse
    /// policy allows and the server has not closed it.
    pub async fn send(&mut self, path: &str) -> Result<Response<hyper::body::Incoming>, BoxError> {
        let parts = RequestParts::parse(&self.addr, path, None)?;

        let mut sender = match self.sender.take() {
            Some(sender) if !sender.is_closed() => sender,
            _ => handshake(&parts).await?,
        };
        sender.ready().await?;

        let req = Request::builder()
            .method(Method::GET)
            .uri(&parts.uri)
            .header(hyper::header::HOST, &parts.host_header)
            .header(hyper::header::USER_AGENT, "conn-probe/0.1")
            .header(hyper::header::ACCEPT, "*/*")
            .body(empty())?;

        let res = sender.send_request(req).await?;
        if self.keep_alive {
            self.sender = Some(sender);
        }
        Ok(res)
    }
}

async fn handshake(
    parts: &RequestParts,
) -> Result<http1::SendRequest<BoxBody<Bytes, BoxError>>, BoxError> {
    let stream = TcpStream::connect((parts.host.as_str(), parts.port)).await?;
    let io = TokioIo::new(stream);
    let (sender, conn) = http1::handshake(io).await?;

    tokio::spawn(async move {
        if let Err(e) = conn.await {
            tracing::debug!("connection closed with error: {}", e);
        }
    });

    Ok(sender)
}

fn empty() -> BoxBody<Bytes, BoxError> {
    Empty::<Bytes>::new()
        .map_err(|never| match never {})
        .boxed()
}
