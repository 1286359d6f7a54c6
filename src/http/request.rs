use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: String,
    /// Raw (still percent-encoded) path, without the query string
    pub path: String,
    /// Everything after the first `?`, empty when absent
    pub query: String,
    pub version: String,
    pub headers: HashMap<String, String>,
}

impl HttpRequest {
    /// Build a request from a method and a request target
    /// such as `/docs/?C=N;O=D`.
    pub fn new(method: &str, target: &str) -> Self {
        let (path, query) = split_target(target);
        Self {
            method: method.to_string(),
            path,
            query,
            version: "HTTP/1.1".to_string(),
            headers: HashMap::new(),
        }
    }

    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers.insert(key.to_string(), value.to_string());
        self
    }

    /// Parse HTTP request from buffer.
    /// Returns None while the buffer does not hold a complete request yet.
    pub fn parse(buffer: &[u8]) -> Option<Self> {
        Self::parse_with_len(buffer).map(|(request, _)| request)
    }

    /// Like [`parse`](Self::parse), also returning how many bytes of
    /// `buffer` the request took, head and `Content-Length` body included.
    /// Bytes past that belong to the next pipelined request.
    pub fn parse_with_len(buffer: &[u8]) -> Option<(Self, usize)> {
        let headers_end = find_double_crlf(buffer)?;
        let header_text = std::str::from_utf8(&buffer[..headers_end]).ok()?;
        let mut lines = header_text.lines();

        let (method, target, version) = parse_request_line(lines.next()?)?;
        let headers = parse_headers(lines);

        // no handler reads a body, it is only skipped over
        let body_start = headers_end + 4;
        let body_len = match header_value(&headers, "Content-Length") {
            Some(len) => len.parse().ok()?,
            None => 0,
        };
        if buffer.len() < body_start + body_len {
            return None;
        }

        let (path, query) = split_target(target);
        let request = HttpRequest {
            method: method.to_string(),
            path,
            query,
            version: version.to_string(),
            headers,
        };
        Some((request, body_start + body_len))
    }

    /// Case-insensitive header lookup
    pub fn header(&self, name: &str) -> Option<&str> {
        header_value(&self.headers, name)
    }

    pub fn host(&self) -> &str {
        self.header("Host").unwrap_or("")
    }

    /// Path plus `?query` when a query string was sent
    pub fn target(&self) -> String {
        if self.query.is_empty() {
            self.path.clone()
        } else {
            format!("{}?{}", self.path, self.query)
        }
    }

    pub fn is_head(&self) -> bool {
        self.method.eq_ignore_ascii_case("HEAD")
    }
}

fn header_value<'a>(headers: &'a HashMap<String, String>, name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

fn find_double_crlf(buffer: &[u8]) -> Option<usize> {
    buffer.windows(4).position(|w| w == b"\r\n\r\n")
}

fn parse_request_line(line: &str) -> Option<(&str, &str, &str)> {
    let mut parts = line.split_whitespace();
    let method = parts.next()?;
    let target = parts.next()?;
    let version = parts.next()?;
    Some((method, target, version))
}

fn split_target(target: &str) -> (String, String) {
    match target.split_once('?') {
        Some((p, q)) => (p.to_string(), q.to_string()),
        None => (target.to_string(), String::new()),
    }
}

fn parse_headers<'a>(lines: impl Iterator<Item = &'a str>) -> HashMap<String, String> {
    let mut headers = HashMap::new();
    for line in lines {
        if let Some((key, value)) = line.split_once(':') {
            headers.insert(key.trim().to_string(), value.trim().to_string());
        }
    }
    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_request_line_and_query() {
        let raw = b"GET /docs/?C=S;O=D HTTP/1.1\r\nHost: example.org\r\n\r\n";
        let req = HttpRequest::parse(raw).unwrap();

        assert_eq!(req.method, "GET");
        assert_eq!(req.path, "/docs/");
        assert_eq!(req.query, "C=S;O=D");
        assert_eq!(req.host(), "example.org");
        assert_eq!(req.target(), "/docs/?C=S;O=D");
    }

    #[test]
    fn incomplete_headers_wait_for_more_data() {
        assert!(HttpRequest::parse(b"GET / HTTP/1.1\r\nHost: x\r\n").is_none());
    }

    #[test]
    fn waits_for_content_length_body() {
        let partial = b"POST / HTTP/1.1\r\nContent-Length: 5\r\n\r\nab";
        assert!(HttpRequest::parse(partial).is_none());

        let full = b"POST / HTTP/1.1\r\nContent-Length: 5\r\n\r\nabcde";
        let (req, used) = HttpRequest::parse_with_len(full).unwrap();
        assert_eq!(req.method, "POST");
        assert_eq!(used, full.len());
    }

    #[test]
    fn consumed_length_stops_at_the_first_request() {
        let first = b"GET /a HTTP/1.1\r\nContent-Length: 2\r\n\r\nxy";
        let mut buffer = first.to_vec();
        buffer.extend_from_slice(b"GET /b HTTP/1.0\r\n\r\n");

        let (req, used) = HttpRequest::parse_with_len(&buffer).unwrap();
        assert_eq!(req.path, "/a");
        assert_eq!(used, first.len());

        let next = HttpRequest::parse(&buffer[used..]).unwrap();
        assert_eq!(next.path, "/b");
        assert_eq!(next.version, "HTTP/1.0");
    }

    #[test]
    fn header_lookup_ignores_case() {
        let req = HttpRequest::new("GET", "/").with_header("host", "localhost:8080");
        assert_eq!(req.header("HOST"), Some("localhost:8080"));
        assert_eq!(req.host(), "localhost:8080");
    }
}
