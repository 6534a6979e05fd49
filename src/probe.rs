use std::time::{Duration, Instant};

use bytes::Bytes;
use http_body_util::BodyExt;
use hyper::StatusCode;

use crate::client::Transport;
use crate::error::Error;

/// What one probe request observed.
#[derive(Debug)]
pub struct ProbeRecord {
    pub seq: u32,
    pub status: StatusCode,
    /// Round trip time, measured from just before the request is issued to
    /// after the body is fully drained.
    pub elapsed: Duration,
    /// Value of the server's `Connection` response header, if present.
    pub connection: Option<String>,
    pub body: Bytes,
}

/// Drives `requests` strictly sequential GETs through one transport, printing
/// a report line per request.
///
/// With reuse disabled the `/close` route is targeted, so the server tears
/// the connection down after every response; with reuse enabled the default
/// route is targeted and the transport keeps one connection open across the
/// whole run.
///
/// A failed request is logged and the loop moves on; no retries. This can
/// mask a dead server mid-run, but it keeps the run's report aligned with
/// what each individual request observed.
pub async fn run(
    addr: &str,
    keep_alive: bool,
    requests: u32,
) -> Result<Vec<ProbeRecord>, Error> {
    let mut transport = Transport::new(addr, keep_alive);
    let path = if transport.keep_alive() { "" } else { "close" };

    println!(
        "probing {} with connection reuse {}:",
        addr,
        if keep_alive { "enabled" } else { "disabled" }
    );

    let mut records = Vec::with_capacity(requests as usize);
    for seq in 1..=requests {
        let start = Instant::now();

        let res = match transport.send(path).await {
            Ok(res) => res,
            Err(err) => {
                tracing::error!("request {} failed: {}", seq, err);
                continue;
            }
        };

        // Drain the body fully before timing; under the persistent policy the
        // connection is only reusable once the body has been consumed.
        let (parts, body) = res.into_parts();
        let body = match body.collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(err) => {
                tracing::warn!("request {}: error draining body: {}", seq, err);
                continue;
            }
        };

        let connection = parts
            .headers
            .get(hyper::header::CONNECTION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);

        let record = ProbeRecord {
            seq,
            status: parts.status,
            elapsed: start.elapsed(),
            connection,
            body,
        };
        println!(
            "request {}: status={} elapsed={:?} connection={}",
            record.seq,
            record.status,
            record.elapsed,
            record.connection.as_deref().unwrap_or("")
        );
        records.push(record);
    }

    Ok(records)
}
