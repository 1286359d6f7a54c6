use std::cmp::Ordering;

use super::entry::Entry;

/// Sortable column, keyed by its `C=` query letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    /// `N`: display name, byte order
    Name,
    /// `M`: modification time, numeric
    Modified,
    /// `S`: size, numeric
    Size,
    /// `D`: raw content-type string, byte order
    Type,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortField {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "N" => Some(SortField::Name),
            "M" => Some(SortField::Modified),
            "S" => Some(SortField::Size),
            "D" => Some(SortField::Type),
            _ => None,
        }
    }

    pub fn code(self) -> char {
        match self {
            SortField::Name => 'N',
            SortField::Modified => 'M',
            SortField::Size => 'S',
            SortField::Type => 'D',
        }
    }

    fn compare(self, a: &Entry, b: &Entry) -> Ordering {
        match self {
            SortField::Name => a.display_name.cmp(&b.display_name),
            SortField::Modified => a.modified_epoch.cmp(&b.modified_epoch),
            SortField::Size => a.size.unwrap_or(0).cmp(&b.size.unwrap_or(0)),
            SortField::Type => a.content_type.cmp(&b.content_type),
        }
    }
}

impl SortDirection {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "A" => Some(SortDirection::Ascending),
            "D" => Some(SortDirection::Descending),
            _ => None,
        }
    }

    pub fn code(self) -> char {
        match self {
            SortDirection::Ascending => 'A',
            SortDirection::Descending => 'D',
        }
    }

    pub fn inverted(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

impl Default for SortSpec {
    fn default() -> Self {
        Self {
            field: SortField::Name,
            direction: SortDirection::Ascending,
        }
    }
}

impl SortSpec {
    /// Decode the `C=<field>;O=<dir>` pair from a raw query string.
    ///
    /// The first `C=x;O=y` run, where `x` and `y` are single word
    /// characters, is used wherever it sits in the query. An unknown field
    /// or direction letter in that run, or no run at all, yields the default
    /// name-ascending order.
    pub fn from_query(query: &str) -> Self {
        query
            .match_indices("C=")
            .find_map(|(at, _)| sort_pair(&query[at..]))
            .and_then(|(column, order)| {
                Some(Self {
                    field: SortField::from_code(column)?,
                    direction: SortDirection::from_code(order)?,
                })
            })
            .unwrap_or_default()
    }

    /// Query string selecting this order, e.g. `C=M;O=D`
    pub fn query(self) -> String {
        format!("C={};O={}", self.field.code(), self.direction.code())
    }

    /// The order a click on `field`'s header should request: the inverse of
    /// the current direction for the active column, ascending otherwise.
    pub fn toggled_for(self, field: SortField) -> Self {
        let direction = if field == self.field {
            self.direction.inverted()
        } else {
            SortDirection::Ascending
        };
        Self { field, direction }
    }

    pub fn compare(self, a: &Entry, b: &Entry) -> Ordering {
        let ord = self.field.compare(a, b);
        match self.direction {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        }
    }
}

/// `C=x;O=y` at the start of `s`, returning `x` and `y`.
fn sort_pair(s: &str) -> Option<(&str, &str)> {
    let bytes = s.as_bytes();
    let is_word = |b: u8| b.is_ascii_alphanumeric() || b == b'_';
    let matched = bytes.len() >= 7
        && is_word(bytes[2])
        && &bytes[3..6] == b";O="
        && is_word(bytes[6]);
    matched.then(|| (&s[2..3], &s[6..7]))
}

/// Stable sort; entries that compare equal keep their enumeration order in
/// both directions.
pub fn sort_entries(entries: &mut [Entry], spec: SortSpec) {
    entries.sort_by(|a, b| spec.compare(a, b));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::IconClass;

    fn file(name: &str, size: u64, modified: i64, content_type: &str) -> Entry {
        Entry {
            display_name: name.to_string(),
            url: format!("/{name}"),
            content_type: content_type.to_string(),
            size: Some(size),
            modified: String::new(),
            modified_epoch: modified,
            icon: IconClass::Other,
        }
    }

    fn names(entries: &[Entry]) -> Vec<&str> {
        entries.iter().map(|e| e.display_name.as_str()).collect()
    }

    fn spec(field: SortField, direction: SortDirection) -> SortSpec {
        SortSpec { field, direction }
    }

    #[test]
    fn parses_every_field_and_direction() {
        assert_eq!(
            SortSpec::from_query("C=M;O=D"),
            spec(SortField::Modified, SortDirection::Descending)
        );
        assert_eq!(
            SortSpec::from_query("C=S;O=A"),
            spec(SortField::Size, SortDirection::Ascending)
        );
        assert_eq!(
            SortSpec::from_query("C=D;O=D"),
            spec(SortField::Type, SortDirection::Descending)
        );
        assert_eq!(
            SortSpec::from_query("foo=bar&C=N;O=D"),
            spec(SortField::Name, SortDirection::Descending)
        );
    }

    #[test]
    fn pair_is_found_anywhere_in_the_query() {
        let descending = spec(SortField::Name, SortDirection::Descending);
        assert_eq!(SortSpec::from_query("x=1;C=N;O=D"), descending);
        assert_eq!(SortSpec::from_query("a=b&x=1;C=N;O=D;y=2"), descending);
        assert_eq!(SortSpec::from_query("C=N;O=DD"), descending);
        assert_eq!(
            SortSpec::from_query("C=NN;C=S;O=D"),
            spec(SortField::Size, SortDirection::Descending)
        );
    }

    #[test]
    fn malformed_queries_fall_back_to_default() {
        for query in ["", "C=N", "O=D;C=N", "C=N&O=D", "C=X;O=D", "C=N;O=Z", "C=;O=", "C=NN;O=D"] {
            assert_eq!(SortSpec::from_query(query), SortSpec::default(), "query {query:?}");
        }
    }

    #[test]
    fn name_sort_is_case_sensitive_byte_order() {
        let mut entries = vec![
            file("bravo", 1, 0, "text/plain"),
            file("Zulu", 1, 0, "text/plain"),
            file("alpha", 1, 0, "text/plain"),
        ];
        sort_entries(&mut entries, SortSpec::default());
        assert_eq!(names(&entries), ["Zulu", "alpha", "bravo"]);

        sort_entries(&mut entries, spec(SortField::Name, SortDirection::Descending));
        assert_eq!(names(&entries), ["bravo", "alpha", "Zulu"]);
    }

    #[test]
    fn size_sort_is_numeric() {
        let mut entries = vec![file("big", 100, 0, "text/plain"), file("small", 20, 0, "text/plain")];
        sort_entries(&mut entries, spec(SortField::Size, SortDirection::Ascending));
        assert_eq!(names(&entries), ["small", "big"]);
    }

    #[test]
    fn modified_sort_is_numeric() {
        let mut entries = vec![
            file("new", 0, 1_000_000_000, "text/plain"),
            file("old", 0, 999, "text/plain"),
        ];
        sort_entries(&mut entries, spec(SortField::Modified, SortDirection::Ascending));
        assert_eq!(names(&entries), ["old", "new"]);
    }

    #[test]
    fn type_sort_compares_raw_content_type() {
        let mut entries = vec![
            file("page", 0, 0, "text/html"),
            file("pic", 0, 0, "image/png"),
            file("doc", 0, 0, "application/pdf"),
        ];
        sort_entries(&mut entries, spec(SortField::Type, SortDirection::Ascending));
        assert_eq!(names(&entries), ["doc", "pic", "page"]);
    }

    #[test]
    fn ties_keep_enumeration_order_in_both_directions() {
        let mut entries = vec![
            file("first", 10, 0, "text/plain"),
            file("second", 10, 0, "text/plain"),
            file("third", 5, 0, "text/plain"),
        ];
        sort_entries(&mut entries, spec(SortField::Size, SortDirection::Descending));
        assert_eq!(names(&entries), ["first", "second", "third"]);

        sort_entries(&mut entries, spec(SortField::Size, SortDirection::Ascending));
        assert_eq!(names(&entries), ["third", "first", "second"]);
    }

    #[test]
    fn header_toggle_inverts_only_the_active_column() {
        let active = spec(SortField::Size, SortDirection::Ascending);
        assert_eq!(active.toggled_for(SortField::Size).query(), "C=S;O=D");
        assert_eq!(active.toggled_for(SortField::Name).query(), "C=N;O=A");

        let descending = spec(SortField::Name, SortDirection::Descending);
        assert_eq!(descending.toggled_for(SortField::Name).query(), "C=N;O=A");
    }
}
