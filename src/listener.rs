use std::io;
use std::net::SocketAddr;

use tokio::net::{TcpListener, TcpStream};

/// A bound TCP listener for the probe server.
pub struct Listener(TcpListener);

impl Listener {
    /// Binds to `addr`, either [HOST]:PORT or a bare :PORT shorthand for
    /// 127.0.0.1.
    pub async fn bind(addr: &str) -> io::Result<Self> {
        let mut addr = addr.to_owned();
        if addr.starts_with(':') {
            addr = format!("127.0.0.1{}", addr);
        };
        let listener = TcpListener::bind(addr).await?;
        Ok(Listener(listener))
    }

    pub async fn accept(&mut self) -> io::Result<(TcpStream, SocketAddr)> {
        self.0.accept().await
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.0.local_addr()
    }

    #[cfg(test)]
    pub async fn connect(&self) -> io::Result<TcpStream> {
        TcpStream::connect(self.0.local_addr()?).await
    }
}

impl std::fmt::Display for Listener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0.local_addr() {
            Ok(addr) => write!(f, "{}:{}", addr.ip(), addr.port()),
            Err(_) => write!(f, "<unbound>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tokio::io::AsyncReadExt;
    use tokio::io::AsyncWriteExt;

    #[tokio::test]
    async fn test_bind_and_accept() {
        let mut listener = Listener::bind(":0").await.unwrap();
        let mut client = listener.connect().await.unwrap();

        let (mut serve, _) = listener.accept().await.unwrap();
        let want = b"Hello from server!";
        serve.write_all(want).await.unwrap();
        drop(serve);

        let mut got = Vec::new();
        client.read_to_end(&mut got).await.unwrap();
        assert_eq!(want.to_vec(), got);
    }

    #[tokio::test]
    async fn test_display_reports_bound_addr() {
        let listener = Listener::bind(":0").await.unwrap();
        let shown = listener.to_string();
        assert!(shown.starts_with("127.0.0.1:"));
        assert_ne!(shown, "127.0.0.1:0");
    }
}
