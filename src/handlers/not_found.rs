use std::fs;
use std::path::PathBuf;

use tracing::warn;

use super::Handler;
use crate::Result;
use crate::http::{HttpRequest, HttpResponse};

/// End of the chain: a 404, using `<error_path>/404.html` when one exists.
#[derive(Debug, Default, Clone)]
pub struct NotFound {
    error_path: Option<PathBuf>,
}

impl NotFound {
    pub fn new(error_path: Option<PathBuf>) -> Self {
        Self { error_path }
    }

    fn error_page(&self) -> Option<Vec<u8>> {
        let page = self.error_path.as_ref()?.join("404.html");
        match fs::read(&page) {
            Ok(content) => Some(content),
            Err(e) => {
                warn!(page = %page.display(), error = %e, "could not read error page");
                None
            }
        }
    }
}

impl Handler for NotFound {
    fn handle(&self, _request: &HttpRequest) -> Result<HttpResponse> {
        let mut response = HttpResponse::not_found();
        response.set_header("Content-Type", "text/html; charset=utf-8");
        match self.error_page() {
            Some(content) => response.set_body_bytes(content),
            None => response.set_body("<h1>404 - Not Found</h1>"),
        }
        Ok(response)
    }
}
