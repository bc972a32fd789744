/// The PackUri value type for part names within an OPC package.
///
/// Pack URIs always begin with a forward slash and use forward slashes
/// as path separators, following the OPC specification.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackUri {
    uri: String,
}

/// The URI for the [Content_Types].xml part.
pub const CONTENT_TYPES_URI: &str = "/[Content_Types].xml";

/// The package pseudo-partname, representing the package itself.
pub const PACKAGE_URI: &str = "/";

impl PackUri {
    /// Create a new PackUri from a string that begins with a slash.
    pub fn new<S: Into<String>>(uri: S) -> Result<Self, String> {
        let uri = uri.into();
        if !uri.starts_with('/') {
            return Err(format!("pack URI must begin with slash, got '{}'", uri));
        }
        Ok(PackUri { uri })
    }

    /// Resolve a relative reference against a base URI (a directory such
    /// as "/ppt/slides").
    ///
    /// Fails when the reference climbs above the package root, which
    /// callers report as a `relationship.escape` finding.
    pub fn from_rel_ref(base_uri: &str, relative_ref: &str) -> Result<Self, String> {
        if relative_ref.starts_with('/') {
            return Self::new(normalize_path(relative_ref)?);
        }
        let joined = if base_uri.ends_with('/') {
            format!("{}{}", base_uri, relative_ref)
        } else {
            format!("{}/{}", base_uri, relative_ref)
        };
        Self::new(normalize_path(&joined)?)
    }

    /// The directory portion, e.g. "/ppt/slides" for
    /// "/ppt/slides/slide1.xml". Returns "/" for top-level parts.
    pub fn base_uri(&self) -> &str {
        if self.uri == "/" {
            return "/";
        }
        match self.uri.rfind('/') {
            Some(0) => "/",
            Some(pos) => &self.uri[..pos],
            None => "/",
        }
    }

    /// The filename portion, e.g. "slide1.xml".
    pub fn filename(&self) -> &str {
        match self.uri.rfind('/') {
            Some(pos) => &self.uri[pos + 1..],
            None => "",
        }
    }

    /// The extension without the leading period, e.g. "xml".
    pub fn ext(&self) -> &str {
        let filename = self.filename();
        match filename.rfind('.') {
            Some(pos) => &filename[pos + 1..],
            None => "",
        }
    }

    /// The ZIP member name: the URI with the leading slash stripped.
    pub fn membername(&self) -> &str {
        if self.uri == "/" {
            ""
        } else {
            &self.uri[1..]
        }
    }

    /// The PackUri of the .rels part for this part, e.g.
    /// "/ppt/_rels/presentation.xml.rels".
    pub fn rels_uri(&self) -> PackUri {
        let base_uri = self.base_uri();
        let rels_uri_str = if base_uri == "/" {
            format!("/_rels/{}.rels", self.filename())
        } else {
            format!("{}/_rels/{}.rels", base_uri, self.filename())
        };
        PackUri { uri: rels_uri_str }
    }

    pub fn as_str(&self) -> &str {
        &self.uri
    }
}

/// Normalize a slash-separated path, resolving "." and "..".
///
/// Errors when ".." would climb above the root.
fn normalize_path(path: &str) -> Result<String, String> {
    let mut parts: Vec<&str> = Vec::new();
    for part in path.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                if parts.pop().is_none() {
                    return Err(format!("path '{}' escapes the package root", path));
                }
            }
            _ => parts.push(part),
        }
    }
    if parts.is_empty() {
        return Ok("/".to_string());
    }
    Ok(format!("/{}", parts.join("/")))
}

impl std::fmt::Display for PackUri {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.uri)
    }
}

impl AsRef<str> for PackUri {
    fn as_ref(&self) -> &str {
        &self.uri
    }
}
