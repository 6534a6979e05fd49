pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, PartialEq)]
pub struct RequestParts {
    pub uri: String,
    pub host_header: String,
    pub host: String,
    pub port: u16,
}

impl RequestParts {
    pub fn parse(addr: &str, path: &str, query: Option<&str>) -> Result<Self, BoxError> {
        // Normalize URL
        let addr = if addr.starts_with(':') {
            format!("http://127.0.0.1{addr}")
        } else if !addr.contains("://") {
            format!("http://{addr}")
        } else {
            addr.to_string()
        };

        let url = url::Url::parse(&addr)?;
        if url.scheme() != "http" {
            return Err(format!("unsupported scheme: {}", url.scheme()).into());
        }

        let host = url.host_str().ok_or("Missing host")?.to_string();
        let port = url.port().unwrap_or(80);
        let port_str = if port == 80 {
            "".to_string()
        } else {
            format!(":{port}")
        };

        let uri = if let Some(q) = query {
            format!("http://{host}{port_str}/{path}?{q}")
        } else {
            format!("http://{host}{port_str}/{path}")
        };

        Ok(RequestParts {
            uri,
            host_header: format!("{host}{port_str}"),
            host,
            port,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_only() {
        let parts = RequestParts::parse(":8080", "close", None).unwrap();
        assert_eq!(parts.uri, "http://127.0.0.1:8080/close");
        assert_eq!(parts.host_header, "127.0.0.1:8080");
        assert_eq!(parts.host, "127.0.0.1");
        assert_eq!(parts.port, 8080);
    }

    #[test]
    fn test_host_and_port() {
        let parts = RequestParts::parse("localhost:8080", "", Some("q=1")).unwrap();
        assert_eq!(parts.uri, "http://localhost:8080/?q=1");
        assert_eq!(parts.host_header, "localhost:8080");
        assert_eq!(parts.host, "localhost");
        assert_eq!(parts.port, 8080);
    }

    #[test]
    fn test_default_port() {
        let parts = RequestParts::parse("http://example.com", "", None).unwrap();
        assert_eq!(parts.uri, "http://example.com/");
        assert_eq!(parts.host_header, "example.com");
        assert_eq!(parts.port, 80);
    }

    #[test]
    fn test_https_rejected() {
        assert!(RequestParts::parse("https://example.com", "", None).is_err());
    }
}
