use html_escape::encode_quoted_attribute as escape;

use super::entry::{Entry, Listing};
use super::sort::{SortField, SortSpec};

pub const LISTING_CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// Page shell, filled once per request
const PAGE_TEMPLATE: &str = include_str!("page.html");

const ROW_TEMPLATE: &str = "<tr><td class=\"name {{icon}}\"><a href=\"{{url}}\">{{name}}</a></td>\
<td class=\"mtime\">{{mtime}}</td><td class=\"size\">{{size}}</td><td class=\"type\">{{type}}</td></tr>\n";

/// Inputs for one rendered listing.
#[derive(Debug, Clone, Copy)]
pub struct Page<'a> {
    /// Decoded request path, shown as title and heading
    pub title: &'a str,
    /// `Host` header of the request
    pub host: &'a str,
    pub listing: &'a Listing,
    pub sort: SortSpec,
}

pub fn render_page(page: &Page<'_>) -> String {
    let mut rows = String::new();
    for entry in page.listing.rows() {
        rows.push_str(&render_row(entry));
    }

    let title = escape(page.title).into_owned();
    let host = escape(page.host).into_owned();
    let link = |field: SortField| page.sort.toggled_for(field).query();
    let sort_n = link(SortField::Name);
    let sort_m = link(SortField::Modified);
    let sort_s = link(SortField::Size);
    let sort_d = link(SortField::Type);
    let sort_field = page.sort.field.code().to_string();
    let sort_order = page.sort.direction.code().to_string();

    fill(PAGE_TEMPLATE, |key| match key {
        "title" => Some(title.as_str()),
        "host" => Some(host.as_str()),
        "rows" => Some(rows.as_str()),
        "sort_N" => Some(sort_n.as_str()),
        "sort_M" => Some(sort_m.as_str()),
        "sort_S" => Some(sort_s.as_str()),
        "sort_D" => Some(sort_d.as_str()),
        "sort_field" => Some(sort_field.as_str()),
        "sort_order" => Some(sort_order.as_str()),
        _ => None,
    })
}

fn render_row(entry: &Entry) -> String {
    let size = entry.size.map(|s| s.to_string()).unwrap_or_default();
    let icon = escape(entry.icon.css_class()).into_owned();
    let url = escape(&entry.url).into_owned();
    let name = escape(&entry.display_name).into_owned();
    let mtime = escape(&entry.modified).into_owned();
    let content_type = escape(&entry.content_type).into_owned();

    fill(ROW_TEMPLATE, |key| match key {
        "icon" => Some(icon.as_str()),
        "url" => Some(url.as_str()),
        "name" => Some(name.as_str()),
        "mtime" => Some(mtime.as_str()),
        "size" => Some(size.as_str()),
        "type" => Some(content_type.as_str()),
        _ => None,
    })
}

/// Single pass `{{key}}` substitution. Substituted values are never scanned
/// again; unknown keys are kept as written.
fn fill<'v, F>(template: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<&'v str>,
{
    let mut out = String::with_capacity(template.len() * 2);
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find("}}") {
            Some(end) => {
                let key = &after[..end];
                match lookup(key) {
                    Some(value) => out.push_str(value),
                    None => out.push_str(&rest[start..start + 2 + end + 2]),
                }
                rest = &after[end + 2..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::{IconClass, SortDirection};

    fn entry(name: &str, content_type: &str, size: Option<u64>) -> Entry {
        Entry {
            display_name: name.to_string(),
            url: format!("/files/{name}"),
            content_type: content_type.to_string(),
            size,
            modified: "04-Mar-2021 05:06".to_string(),
            modified_epoch: 1_614_834_367,
            icon: crate::listing::classify(content_type),
        }
    }

    fn page(listing: &Listing, sort: SortSpec) -> String {
        render_page(&Page {
            title: "/files/",
            host: "example.org",
            listing,
            sort,
        })
    }

    #[test]
    fn fill_is_single_pass() {
        let out = fill("a {{x}} b {{y}} {{unknown}} {{open", |key| match key {
            "x" => Some("{{y}}"),
            "y" => Some("Y"),
            _ => None,
        });
        assert_eq!(out, "a {{y}} b Y {{unknown}} {{open");
    }

    #[test]
    fn renders_rows_with_parent_first() {
        let listing = Listing::new(vec![entry("a.txt", "text/plain", Some(20))]);
        let html = page(&listing, SortSpec::default());

        let parent = html.find("Parent Directory").unwrap();
        let child = html.find(">a.txt</a>").unwrap();
        assert!(parent < child);
        assert!(html.contains("class=\"name ft_parent\"><a href=\"../\">"));
        assert!(html.contains("<td class=\"size\">20</td>"));
        assert!(html.contains("<td class=\"mtime\">04-Mar-2021 05:06</td>"));
        assert!(html.contains("<td class=\"type\">text/plain</td>"));
    }

    #[test]
    fn escapes_html_sensitive_fields() {
        let listing = Listing::new(vec![entry("<b>&\"q\".html", "text/html", Some(1))]);
        let html = render_page(&Page {
            title: "/<script>/",
            host: "<evil>",
            listing: &listing,
            sort: SortSpec::default(),
        });

        assert!(!html.contains("<b>&"));
        assert!(html.contains("&lt;b&gt;&amp;&quot;q&quot;.html"));
        assert!(html.contains("Index of /&lt;script&gt;/"));
        assert!(!html.contains("<script>/"));
        assert!(html.contains("<address>&lt;evil&gt;</address>"));
        assert!(html.contains("class=\"name ft_html\""));
    }

    #[test]
    fn default_sort_links_toggle_name_only() {
        let listing = Listing::new(Vec::new());
        let html = page(&listing, SortSpec::default());

        assert!(html.contains("href=\"?C=N;O=D\">Name"));
        assert!(html.contains("href=\"?C=M;O=A\">Last modified"));
        assert!(html.contains("href=\"?C=S;O=A\">Size"));
        assert!(html.contains("href=\"?C=D;O=A\">Type"));
    }

    #[test]
    fn descending_column_proposes_ascending() {
        let listing = Listing::new(Vec::new());
        let sort = SortSpec {
            field: SortField::Modified,
            direction: SortDirection::Descending,
        };
        let html = page(&listing, sort);

        assert!(html.contains("href=\"?C=M;O=A\">Last modified"));
        assert!(html.contains("href=\"?C=N;O=A\">Name"));
        assert!(html.contains("data-sort-field=\"M\" data-sort-order=\"D\""));
    }

    #[test]
    fn directories_render_empty_size() {
        let mut dir = entry("sub/", "directory", None);
        dir.icon = IconClass::Directory;
        let listing = Listing::new(vec![dir]);
        let html = page(&listing, SortSpec::default());

        assert!(html.contains("class=\"name ft_directory\"><a href=\"/files/sub/\">sub/</a>"));
        assert!(html.contains("<td class=\"size\"></td><td class=\"type\">directory</td>"));
    }

    #[test]
    fn rendering_is_deterministic() {
        let listing = Listing::new(vec![
            entry("b.txt", "text/plain", Some(3)),
            entry("a.png", "image/png", Some(9)),
        ]);
        let sort = SortSpec::from_query("C=S;O=D");
        assert_eq!(page(&listing, sort), page(&listing, sort));
    }
}
