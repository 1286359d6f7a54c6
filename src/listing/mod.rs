//! Directory listing engine: read, classify, sort and render the children
//! of one directory for one request.

mod classify;
mod entry;
mod path;
mod render;
mod sort;

pub use classify::{IconClass, classify};
pub use entry::{
    DirectorySource, Entry, GuessMime, Listing, LocalFs, MimeLookup, RawEntry, read_entries,
};
pub use path::{Resolution, resolve};
pub use render::{LISTING_CONTENT_TYPE, Page, render_page};
pub use sort::{SortDirection, SortField, SortSpec, sort_entries};
