use std::path::PathBuf;

use tracing::debug;

use super::Handler;
use crate::Result;
use crate::http::{HttpRequest, HttpResponse};
use crate::listing::{
    DirectorySource, GuessMime, LISTING_CONTENT_TYPE, Listing, LocalFs, MimeLookup, Page,
    Resolution, SortSpec, read_entries, render_page, resolve, sort_entries,
};

const REDIRECT_CACHE_CONTROL: &str = "must-revalidate, max-age=3600";

/// Answers requests for directories under `root` with an HTML index and
/// hands everything else to `next`.
pub struct DirectoryIndex {
    root: PathBuf,
    source: Box<dyn DirectorySource>,
    mime: Box<dyn MimeLookup>,
    next: Box<dyn Handler>,
}

impl DirectoryIndex {
    pub fn new(root: impl Into<PathBuf>, next: Box<dyn Handler>) -> Self {
        Self {
            root: root.into(),
            source: Box::new(LocalFs),
            mime: Box::new(GuessMime),
            next,
        }
    }

    pub fn with_source(mut self, source: Box<dyn DirectorySource>) -> Self {
        self.source = source;
        self
    }

    pub fn with_mime(mut self, mime: Box<dyn MimeLookup>) -> Self {
        self.mime = mime;
        self
    }

    fn list(&self, request: &HttpRequest, dir: PathBuf, title: &str) -> Result<HttpResponse> {
        let sort = SortSpec::from_query(&request.query);
        let mut entries = read_entries(self.source.as_ref(), self.mime.as_ref(), &dir, &request.path)?;
        sort_entries(&mut entries, sort);

        debug!(dir = %dir.display(), entries = entries.len(), sort = %sort.query(), "rendering listing");

        let listing = Listing::new(entries);
        let html = render_page(&Page {
            title,
            host: request.host(),
            listing: &listing,
            sort,
        });

        let mut response = HttpResponse::ok();
        response.set_header("Content-Type", LISTING_CONTENT_TYPE);
        response.set_body(&html);
        Ok(response)
    }
}

impl Handler for DirectoryIndex {
    fn handle(&self, request: &HttpRequest) -> Result<HttpResponse> {
        match resolve(self.source.as_ref(), &self.root, request) {
            Resolution::NotADirectory => self.next.handle(request),
            Resolution::Forbidden => {
                debug!(path = %request.path, "refusing path outside root");
                let mut response = HttpResponse::forbidden();
                response.set_header("Content-Type", "text/html; charset=utf-8");
                response.set_body("<h1>403 - Forbidden</h1>");
                Ok(response)
            }
            Resolution::Redirect { location } => {
                debug!(from = %request.path, to = %location, "adding trailing slash");
                Ok(moved_permanently(&location))
            }
            Resolution::Directory { path, title } => self.list(request, path, &title),
        }
    }
}

fn moved_permanently(location: &str) -> HttpResponse {
    let href = html_escape::encode_quoted_attribute(location);
    let body = format!(
        "<html><head><title>Moved Permanently</title></head>\
         <body><h1>Moved Permanently</h1>\
         <p>The document has moved <a href=\"{href}\">here</a>.</p></body></html>\n"
    );

    let mut response = HttpResponse::moved_permanently();
    response.set_header("Location", location);
    response.set_header("Content-Type", "text/html; charset=UTF-8");
    response.set_header("Cache-Control", REDIRECT_CACHE_CONTROL);
    response.set_body(&body);
    response
}
