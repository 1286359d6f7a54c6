/// Display category of a listing row, emitted as its CSS icon class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IconClass {
    Directory,
    Image,
    Pdf,
    Html,
    Other,
    /// Only ever assigned to the synthetic "Parent Directory" row
    Parent,
}

impl IconClass {
    pub fn css_class(self) -> &'static str {
        match self {
            IconClass::Directory => "ft_directory",
            IconClass::Image => "ft_image",
            IconClass::Pdf => "ft_pdf",
            IconClass::Html => "ft_html",
            IconClass::Other => "",
            IconClass::Parent => "ft_parent",
        }
    }
}

/// First matching rule wins.
pub fn classify(content_type: &str) -> IconClass {
    if content_type == "directory" {
        IconClass::Directory
    } else if content_type.starts_with("image/") {
        IconClass::Image
    } else if content_type.ends_with("pdf") {
        IconClass::Pdf
    } else if content_type.ends_with("html") {
        IconClass::Html
    } else {
        IconClass::Other
    }
}
