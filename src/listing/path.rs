use std::path::{Component, Path, PathBuf};

use super::entry::DirectorySource;
use crate::http::HttpRequest;

/// What a request path turns out to be, relative to the listing root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Missing, a plain file, or undecodable: someone else's job
    NotADirectory,
    /// The path tried to climb out of the root with `..`
    Forbidden,
    /// A directory requested without its trailing slash
    Redirect { location: String },
    /// A directory, ready to be listed
    Directory { path: PathBuf, title: String },
}

pub fn resolve(source: &dyn DirectorySource, root: &Path, request: &HttpRequest) -> Resolution {
    let Ok(decoded) = urlencoding::decode(&request.path) else {
        return Resolution::NotADirectory;
    };

    let Some(candidate) = join_under_root(root, &decoded) else {
        return Resolution::Forbidden;
    };

    if !source.is_dir(&candidate) {
        return Resolution::NotADirectory;
    }

    if !request.path.ends_with('/') {
        let mut location = format!("{}/", request.path);
        if !request.query.is_empty() {
            location.push('?');
            location.push_str(&request.query);
        }
        return Resolution::Redirect { location };
    }

    Resolution::Directory {
        path: candidate,
        title: decoded.into_owned(),
    }
}

/// Join a decoded request path onto `root`, refusing anything but plain
/// segments.
fn join_under_root(root: &Path, relative: &str) -> Option<PathBuf> {
    let mut result = root.to_path_buf();

    for component in Path::new(relative).components() {
        match component {
            Component::Normal(segment) => result.push(segment),
            Component::RootDir | Component::CurDir => {}
            Component::ParentDir | Component::Prefix(_) => return None,
        }
    }

    Some(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::RawEntry;
    use std::io;

    /// Only `/srv/docs` and `/srv/a b` are directories
    struct Dirs;

    impl DirectorySource for Dirs {
        fn is_dir(&self, path: &Path) -> bool {
            path == Path::new("/srv")
                || path == Path::new("/srv/docs")
                || path == Path::new("/srv/a b")
        }

        fn list(&self, _dir: &Path) -> io::Result<Vec<RawEntry>> {
            Ok(Vec::new())
        }
    }

    fn resolve_target(target: &str) -> Resolution {
        resolve(&Dirs, Path::new("/srv"), &HttpRequest::new("GET", target))
    }

    #[test]
    fn directory_with_slash_is_listed() {
        assert_eq!(
            resolve_target("/docs/"),
            Resolution::Directory {
                path: PathBuf::from("/srv/docs"),
                title: "/docs/".to_string(),
            }
        );
    }

    #[test]
    fn root_is_listed() {
        assert_eq!(
            resolve_target("/"),
            Resolution::Directory {
                path: PathBuf::from("/srv"),
                title: "/".to_string(),
            }
        );
    }

    #[test]
    fn missing_slash_redirects_and_keeps_query() {
        assert_eq!(
            resolve_target("/docs"),
            Resolution::Redirect {
                location: "/docs/".to_string()
            }
        );
        assert_eq!(
            resolve_target("/docs?foo=bar"),
            Resolution::Redirect {
                location: "/docs/?foo=bar".to_string()
            }
        );
    }

    #[test]
    fn encoded_names_are_decoded_for_lookup_only() {
        assert_eq!(
            resolve_target("/a%20b"),
            Resolution::Redirect {
                location: "/a%20b/".to_string()
            }
        );
        assert_eq!(
            resolve_target("/a%20b/"),
            Resolution::Directory {
                path: PathBuf::from("/srv/a b"),
                title: "/a b/".to_string(),
            }
        );
    }

    #[test]
    fn non_directories_are_delegated() {
        assert_eq!(resolve_target("/docs/readme.txt"), Resolution::NotADirectory);
        assert_eq!(resolve_target("/nope/"), Resolution::NotADirectory);
        assert_eq!(resolve_target("/%FF/"), Resolution::NotADirectory);
    }

    #[test]
    fn parent_segments_are_refused() {
        assert_eq!(resolve_target("/docs/../"), Resolution::Forbidden);
        assert_eq!(resolve_target("/%2e%2e/etc/"), Resolution::Forbidden);
    }
}
