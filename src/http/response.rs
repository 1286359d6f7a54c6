use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status_code: u16,
    pub status_text: String,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status_code: u16, status_text: &str) -> Self {
        Self {
            status_code,
            status_text: status_text.to_string(),
            headers: HashMap::new(),
            body: Vec::new(),
        }
    }

    pub fn set_header(&mut self, key: &str, value: &str) {
        self.headers.insert(key.to_string(), value.to_string());
    }

    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    pub fn set_body(&mut self, text: &str) {
        self.body = text.as_bytes().to_vec();
    }

    pub fn set_body_bytes(&mut self, bytes: Vec<u8>) {
        self.body = bytes;
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Serialize for the wire. `Content-Length` always reflects the body,
    /// even when `omit_body` drops it (HEAD).
    pub fn to_bytes(&self, omit_body: bool) -> Vec<u8> {
        let mut output = Vec::with_capacity(self.body.len() + 256);

        output.extend_from_slice(
            format!("HTTP/1.1 {} {}\r\n", self.status_code, self.status_text).as_bytes(),
        );

        let mut keys: Vec<&String> = self.headers.keys().collect();
        keys.sort();
        for key in keys {
            output.extend_from_slice(format!("{}: {}\r\n", key, self.headers[key]).as_bytes());
        }

        if self.header("Content-Length").is_none() {
            output.extend_from_slice(format!("Content-Length: {}\r\n", self.body.len()).as_bytes());
        }

        output.extend_from_slice(b"\r\n");
        if !omit_body {
            output.extend_from_slice(&self.body);
        }
        output
    }

    // Quick constructors for common responses

    pub fn ok() -> Self {
        Self::new(200, "OK")
    }

    pub fn moved_permanently() -> Self {
        Self::new(301, "Moved Permanently")
    }

    pub fn bad_request() -> Self {
        Self::new(400, "Bad Request")
    }

    pub fn forbidden() -> Self {
        Self::new(403, "Forbidden")
    }

    pub fn not_found() -> Self {
        Self::new(404, "Not Found")
    }

    pub fn internal_error() -> Self {
        Self::new(500, "Internal Server Error")
    }
}
