use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use http_body_util::{combinators::BoxBody, BodyExt, Full};
use hyper::body::Bytes;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::TokioIo;

use crate::listener::Listener;

type BoxError = Box<dyn std::error::Error + Send + Sync>;
type HTTPResult = Result<Response<BoxBody<Bytes, BoxError>>, BoxError>;

/// Time spent "working" on each request before the response is written.
pub const HANDLER_DELAY: Duration = Duration::from_millis(100);

const HELLO_BODY: &str = "Hello World";

enum Route {
    Hello,
    HelloClose,
}

/// Route table handed to the serve loop at startup. Every path gets the same
/// hello handler; paths matching `close_path` additionally get a
/// `Connection: close` directive on the response.
#[derive(Clone)]
pub struct Router {
    close_path: Arc<str>,
    hits: Arc<AtomicU64>,
}

impl Router {
    pub fn new() -> Self {
        Router {
            close_path: Arc::from("/close"),
            hits: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Number of requests handled so far.
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    fn route(&self, path: &str) -> Route {
        if path == &*self.close_path {
            Route::HelloClose
        } else {
            Route::Hello
        }
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

async fn handle(router: Router, req: Request<hyper::body::Incoming>) -> HTTPResult {
    tracing::info!("request: {} {}", req.method(), req.uri().path());
    router.hits.fetch_add(1, Ordering::Relaxed);

    tokio::time::sleep(HANDLER_DELAY).await;

    let mut builder = Response::builder().status(StatusCode::OK);
    if let Route::HelloClose = router.route(req.uri().path()) {
        // hyper closes the connection after writing a response that carries
        // this directive
        builder = builder.header(hyper::header::CONNECTION, "close");
    }

    Ok(builder.body(full(HELLO_BODY))?)
}

pub async fn serve(mut listener: Listener, router: Router) -> Result<(), BoxError> {
    println!("probe server listening on {}", listener);
    loop {
        let (stream, _) = listener.accept().await?;
        let io = TokioIo::new(stream);
        let router = router.clone();
        tokio::task::spawn(async move {
            if let Err(err) = http1::Builder::new()
                .serve_connection(io, service_fn(move |req| handle(router.clone(), req)))
                .await
            {
                // NotConnected is hyper's way of saying the client hung up
                if crate::error::io_error_kind(&err) != Some(std::io::ErrorKind::NotConnected) {
                    tracing::error!("error serving connection: {:?}", err);
                }
            }
        });
    }
}

fn full<T: Into<Bytes>>(chunk: T) -> BoxBody<Bytes, BoxError> {
    Full::new(chunk.into())
        .map_err(|never| match never {})
        .boxed()
}
