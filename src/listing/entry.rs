use std::borrow::Cow;
use std::ffi::{OsStr, OsString};
use std::fs;
use std::io;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Utc};
use tracing::debug;

use super::classify::{IconClass, classify};

/// Content type recorded for subdirectories
pub const DIRECTORY_TYPE: &str = "directory";

/// Used when the MIME lookup has no answer for a file
pub const DEFAULT_TYPE: &str = "text/plain";

/// What the filesystem reports about one directory child.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEntry {
    /// Name exactly as the filesystem returned it
    pub name: OsString,
    pub is_dir: bool,
    pub size: u64,
    /// Modification time, seconds since the epoch
    pub modified: i64,
}

/// Directory enumeration and type checks.
pub trait DirectorySource: Send + Sync {
    fn is_dir(&self, path: &Path) -> bool;

    /// Children of `dir`, excluding `.` and `..`.
    fn list(&self, dir: &Path) -> io::Result<Vec<RawEntry>>;
}

/// Path → MIME type. `None` means unknown.
pub trait MimeLookup: Send + Sync {
    fn content_type(&self, path: &Path) -> Option<String>;
}

/// The real filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalFs;

impl DirectorySource for LocalFs {
    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn list(&self, dir: &Path) -> io::Result<Vec<RawEntry>> {
        let mut children = Vec::new();

        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let name = entry.file_name();
            if name == "." || name == ".." {
                continue;
            }

            // stat follows symlinks, so a link to a directory lists as one
            let meta = match fs::metadata(entry.path()) {
                Ok(meta) => meta,
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    debug!(entry = %name.to_string_lossy(), "entry vanished while listing, skipping");
                    continue;
                }
                Err(e) => return Err(e),
            };

            let modified = meta.modified().map(epoch_seconds).unwrap_or(0);

            children.push(RawEntry {
                name,
                is_dir: meta.is_dir(),
                size: meta.len(),
                modified,
            });
        }

        Ok(children)
    }
}

/// Extension based lookup through `mime_guess`.
#[derive(Debug, Default, Clone, Copy)]
pub struct GuessMime;

impl MimeLookup for GuessMime {
    fn content_type(&self, path: &Path) -> Option<String> {
        mime_guess::from_path(path).first().map(|m| m.to_string())
    }
}

/// One row of a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Name as shown, with a trailing `/` for directories
    pub display_name: String,
    /// Request-relative, percent-encoded link
    pub url: String,
    pub content_type: String,
    /// `None` for directories and the parent row
    pub size: Option<u64>,
    /// `DD-Mon-YYYY HH:MM`, UTC
    pub modified: String,
    pub modified_epoch: i64,
    pub icon: IconClass,
}

impl Entry {
    /// The synthetic "Parent Directory" row.
    pub fn parent() -> Self {
        Self {
            display_name: "Parent Directory".to_string(),
            url: "../".to_string(),
            content_type: String::new(),
            size: None,
            modified: String::new(),
            modified_epoch: 0,
            icon: IconClass::Parent,
        }
    }

    fn from_raw(raw: RawEntry, dir: &Path, url_prefix: &str, mime: &dyn MimeLookup) -> Self {
        let mut display_name = raw.name.to_string_lossy().into_owned();
        let mut url = format!("{}{}", url_prefix, encode_name(&raw.name));

        let (content_type, size) = if raw.is_dir {
            display_name.push('/');
            url.push('/');
            (DIRECTORY_TYPE.to_string(), None)
        } else {
            let content_type = mime
                .content_type(&dir.join(&raw.name))
                .unwrap_or_else(|| DEFAULT_TYPE.to_string());
            (content_type, Some(raw.size))
        };

        Self {
            icon: classify(&content_type),
            display_name,
            url,
            content_type,
            size,
            modified: format_mtime(raw.modified),
            modified_epoch: raw.modified,
        }
    }
}

/// Everything rendered for one directory: the parent row, then the
/// (sorted) children.
#[derive(Debug, Clone)]
pub struct Listing {
    pub parent: Entry,
    pub entries: Vec<Entry>,
}

impl Listing {
    pub fn new(entries: Vec<Entry>) -> Self {
        Self {
            parent: Entry::parent(),
            entries,
        }
    }

    pub fn rows(&self) -> impl Iterator<Item = &Entry> {
        std::iter::once(&self.parent).chain(self.entries.iter())
    }
}

/// Read the unsorted children of `dir`. `url_prefix` is the request path
/// of `dir` itself, ending in `/`.
pub fn read_entries(
    source: &dyn DirectorySource,
    mime: &dyn MimeLookup,
    dir: &Path,
    url_prefix: &str,
) -> io::Result<Vec<Entry>> {
    let entries = source
        .list(dir)?
        .into_iter()
        .filter(|raw| raw.name != "." && raw.name != "..")
        .map(|raw| Entry::from_raw(raw, dir, url_prefix, mime))
        .collect();
    Ok(entries)
}

/// Percent-encode the raw name bytes, so names that are not valid UTF-8
/// still link to the right file.
#[cfg(unix)]
fn encode_name(name: &OsStr) -> Cow<'_, str> {
    use std::os::unix::ffi::OsStrExt;
    urlencoding::encode_binary(name.as_bytes())
}

#[cfg(not(unix))]
fn encode_name(name: &OsStr) -> Cow<'_, str> {
    Cow::Owned(urlencoding::encode(&name.to_string_lossy()).into_owned())
}

/// Seconds since the epoch, negative for times before 1970.
fn epoch_seconds(time: SystemTime) -> i64 {
    match time.duration_since(UNIX_EPOCH) {
        Ok(after) => after.as_secs() as i64,
        Err(before) => -(before.duration().as_secs() as i64),
    }
}

pub(crate) fn format_mtime(epoch: i64) -> String {
    DateTime::<Utc>::from_timestamp(epoch, 0)
        .map(|dt| dt.format("%d-%b-%Y %H:%M").to_string())
        .unwrap_or_default()
}
