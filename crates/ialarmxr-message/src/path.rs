use std::fmt;

/// One step of a [`ResponsePath`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// A child element name.
    Name(String),
    /// A zero-based position among repeated sibling elements.
    Index(usize),
}

/// A slash-delimited address into a message tree, e.g. `/Root/Host/GetNet/Mac`.
///
/// Segments made only of ASCII digits are indices; everything else is a
/// field name. Empty segments (leading, trailing or doubled slashes) are
/// skipped, so parsing never fails.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResponsePath {
    segments: Vec<Segment>,
}

impl ResponsePath {
    pub fn parse(path: &str) -> Self {
        let segments = path
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(|segment| {
                if segment.bytes().all(|b| b.is_ascii_digit()) {
                    segment
                        .parse()
                        .map(Segment::Index)
                        .unwrap_or_else(|_| Segment::Name(segment.to_string()))
                } else {
                    Segment::Name(segment.to_string())
                }
            })
            .collect();
        Self { segments }
    }

    /// A new path with `name` appended.
    pub fn child(&self, name: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.extend(ResponsePath::parse(name).segments);
        Self { segments }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// The field names of this path, or `None` if it contains an index.
    ///
    /// Request roots must be plain names.
    pub fn names(&self) -> Option<Vec<&str>> {
        self.segments
            .iter()
            .map(|segment| match segment {
                Segment::Name(name) => Some(name.as_str()),
                Segment::Index(_) => None,
            })
            .collect()
    }
}

impl From<&str> for ResponsePath {
    fn from(path: &str) -> Self {
        ResponsePath::parse(path)
    }
}

impl fmt::Display for ResponsePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("/");
        }
        for segment in &self.segments {
            match segment {
                Segment::Name(name) => write!(f, "/{name}")?,
                Segment::Index(index) => write!(f, "/{index}")?,
            }
        }
        Ok(())
    }
}
