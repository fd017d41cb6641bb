use crate::path::{ResponsePath, Segment};
use crate::scalar::Scalar;

/// A field value: a leaf, a nested node, or repeated siblings.
///
/// A leaf of `None` is written as an empty element. In a request that asks
/// the panel to fill the field in; in a response it means the panel sent
/// the element without text.
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    Scalar(Option<Scalar>),
    Node(Node),
    /// Serialized as sibling elements that all share the field's tag.
    List(Vec<Field>),
}

impl Field {
    /// An empty leaf.
    pub fn null() -> Self {
        Field::Scalar(None)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Field::Scalar(None))
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Field::Scalar(value) => value.as_ref(),
            _ => None,
        }
    }

    pub fn as_node(&self) -> Option<&Node> {
        match self {
            Field::Node(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Field]> {
        match self {
            Field::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        self.as_scalar().and_then(Scalar::as_i32)
    }

    pub fn as_str(&self) -> Option<&str> {
        self.as_scalar().and_then(Scalar::as_str)
    }

    fn step(&self, segment: &Segment) -> Option<&Field> {
        match (self, segment) {
            (Field::Node(node), Segment::Name(name)) => node.get(name),
            (Field::List(items), Segment::Index(index)) => items.get(*index),
            // A lone element is a one-item list.
            (Field::Scalar(_) | Field::Node(_), Segment::Index(0)) => Some(self),
            _ => None,
        }
    }
}

impl From<Scalar> for Field {
    fn from(value: Scalar) -> Self {
        Field::Scalar(Some(value))
    }
}

impl From<Option<Scalar>> for Field {
    fn from(value: Option<Scalar>) -> Self {
        Field::Scalar(value)
    }
}

impl From<Node> for Field {
    fn from(node: Node) -> Self {
        Field::Node(node)
    }
}

impl From<Vec<Node>> for Field {
    fn from(nodes: Vec<Node>) -> Self {
        Field::List(nodes.into_iter().map(Field::Node).collect())
    }
}

/// An ordered mapping from field name to [`Field`].
///
/// Insertion order is preserved because the panel firmware expects request
/// fields in a fixed order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Node {
    fields: Vec<(String, Field)>,
}

impl Node {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Node::insert`].
    pub fn with(mut self, name: impl Into<String>, field: impl Into<Field>) -> Self {
        self.insert(name, field);
        self
    }

    /// Builder shorthand for an empty leaf.
    pub fn with_null(self, name: impl Into<String>) -> Self {
        self.with(name, Field::null())
    }

    /// Set `name`, replacing an existing value in place or appending a new one.
    pub fn insert(&mut self, name: impl Into<String>, field: impl Into<Field>) {
        let name = name.into();
        let field = field.into();
        match self.fields.iter_mut().find(|(key, _)| *key == name) {
            Some((_, slot)) => *slot = field,
            None => self.fields.push((name, field)),
        }
    }

    /// Add `field` under `name`, turning a repeated name into a [`Field::List`].
    pub fn append(&mut self, name: impl Into<String>, field: Field) {
        let name = name.into();
        match self.fields.iter_mut().find(|(key, _)| *key == name) {
            Some((_, Field::List(items))) => items.push(field),
            Some((_, slot)) => {
                let first = std::mem::replace(slot, Field::List(Vec::new()));
                *slot = Field::List(vec![first, field]);
            }
            None => self.fields.push((name, field)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, field)| field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Field)> {
        self.fields.iter().map(|(name, field)| (name.as_str(), field))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Resolve `path` from this node.
    ///
    /// Any segment that cannot be followed yields `None`; panels omit
    /// optional fields, so absence is an ordinary outcome.
    pub fn resolve(&self, path: &ResponsePath) -> Option<&Field> {
        let (first, rest) = path.segments().split_first()?;
        let start = match first {
            Segment::Name(name) => self.get(name)?,
            Segment::Index(_) => return None,
        };
        rest.iter()
            .try_fold(start, |field, segment| field.step(segment))
    }

    /// [`Node::resolve`] with a path string.
    pub fn select(&self, path: &str) -> Option<&Field> {
        self.resolve(&ResponsePath::parse(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Node {
        let zones = vec![
            Node::new().with("Name", Scalar::string("door")),
            Node::new().with("Name", Scalar::string("hall")),
        ];
        let host = Node::new().with(
            "GetByWay",
            Node::new()
                .with("Total", Scalar::int(2))
                .with("Zone", zones)
                .with_null("Err"),
        );
        Node::new().with("Root", Node::new().with("Host", host))
    }

    #[test]
    fn resolves_names_and_indices() {
        let doc = sample();
        assert_eq!(doc.select("/Root/Host/GetByWay/Total").and_then(Field::as_i32), Some(2));
        assert_eq!(
            doc.select("/Root/Host/GetByWay/Zone/1/Name")
                .and_then(Field::as_str),
            Some("hall")
        );
        assert!(doc.select("/Root/Host/GetByWay/Err").unwrap().is_null());
    }

    #[test]
    fn absent_segments_resolve_to_none() {
        let doc = sample();
        for path in [
            "/Root/Host/GetNet/Mac",
            "/Root/Host/GetByWay/Zone/5",
            "/Root/Host/GetByWay/Zone/Name",
            "/Root/Host/GetByWay/Total/Deeper",
            "/0/Root",
            "",
        ] {
            assert!(doc.select(path).is_none(), "{path}");
        }
    }

    #[test]
    fn index_zero_on_single_element() {
        let doc = sample();
        assert_eq!(
            doc.select("/Root/Host/0/GetByWay/Total/0").and_then(Field::as_i32),
            Some(2)
        );
        assert!(doc.select("/Root/Host/1").is_none());
    }

    #[test]
    fn insert_keeps_order_and_replaces() {
        let mut node = Node::new()
            .with_null("DevStatus")
            .with_null("Err");
        node.insert("DevStatus", Scalar::type_enum("ARM", 0));
        let names: Vec<&str> = node.iter().map(|(name, _)| name).collect();
        assert_eq!(names, ["DevStatus", "Err"]);
        assert_eq!(node.get("DevStatus").and_then(Field::as_i32), Some(0));
        assert_eq!(node.len(), 2);
    }

    #[test]
    fn append_collects_repeats_into_list() {
        let mut node = Node::new();
        node.append("L", Field::from(Scalar::int(1)));
        assert!(node.get("L").unwrap().as_list().is_none());
        node.append("L", Field::from(Scalar::int(2)));
        node.append("L", Field::null());
        let items = node.get("L").unwrap().as_list().unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[1].as_i32(), Some(2));
        assert!(items[2].is_null());
    }
}
