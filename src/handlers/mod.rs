mod directory;
mod not_found;

use crate::Result;
use crate::http::{HttpRequest, HttpResponse};

pub use directory::DirectoryIndex;
pub use not_found::NotFound;

/// One link of the request chain.
///
/// A handler either answers the request itself or passes it on to the next
/// handler it owns. An `Err` is a fault the server turns into a 500.
pub trait Handler: Send + Sync {
    fn handle(&self, request: &HttpRequest) -> Result<HttpResponse>;
}
