//! The container shape shared by assets and requirements (§3).
//!
//! A task exposes zero or more assets, and depends on zero or more
//! requirements, in one of three shapes: a single scalar value, an ordered
//! sequence, or a string-keyed mapping — plus the degenerate "none" case.
//! `Shape<T>` is generic so the same type describes both an
//! [`Asset`](crate::asset::Asset) container and a requirements container of
//! `Arc<Node>`.

use indexmap::IndexMap;

/// A labeled entry in a `Shape`, used when a caller needs to report on or
/// rebuild individual elements (diagnostics, dot rendering, dedup rewrite).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Label<'a> {
    /// The element is the shape's only (scalar) value.
    None,
    /// The element's position in a sequence.
    Index(usize),
    /// The element's key in a mapping.
    Key(&'a str),
}

impl std::fmt::Display for Label<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Label::None => Ok(()),
            Label::Index(i) => write!(f, "[{i}]"),
            Label::Key(k) => write!(f, "[{k}]"),
        }
    }
}

/// The shape-preserving container of §3: `None`, `Scalar`, `Seq`, or `Map`.
#[derive(Debug, Clone)]
pub enum Shape<T> {
    /// No elements at all.
    None,
    /// A single element.
    Scalar(T),
    /// A position-keyed sequence of elements.
    Seq(Vec<T>),
    /// A string-keyed mapping of elements, order-preserving.
    Map(IndexMap<String, T>),
}

impl<T> Default for Shape<T> {
    fn default() -> Self {
        Shape::None
    }
}

impl<T> Shape<T> {
    /// True if this shape holds no elements.
    pub fn is_empty(&self) -> bool {
        matches!(self, Shape::None)
    }

    /// The number of elements held.
    pub fn len(&self) -> usize {
        match self {
            Shape::None => 0,
            Shape::Scalar(_) => 1,
            Shape::Seq(v) => v.len(),
            Shape::Map(m) => m.len(),
        }
    }

    /// Iterates over the elements in canonical order, without labels.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        let slice: Box<dyn Iterator<Item = &T>> = match self {
            Shape::None => Box::new(std::iter::empty()),
            Shape::Scalar(v) => Box::new(std::iter::once(v)),
            Shape::Seq(v) => Box::new(v.iter()),
            Shape::Map(m) => Box::new(m.values()),
        };
        slice
    }

    /// Iterates over the elements paired with their [`Label`].
    pub fn labeled(&self) -> impl Iterator<Item = (Label<'_>, &T)> {
        let slice: Box<dyn Iterator<Item = (Label<'_>, &T)>> = match self {
            Shape::None => Box::new(std::iter::empty()),
            Shape::Scalar(v) => Box::new(std::iter::once((Label::None, v))),
            Shape::Seq(v) => Box::new(v.iter().enumerate().map(|(i, t)| (Label::Index(i), t))),
            Shape::Map(m) => Box::new(m.iter().map(|(k, t)| (Label::Key(k.as_str()), t))),
        };
        slice
    }

    /// Transforms every element, preserving the shape and, for `Map`, the
    /// keys. Used to rewrite a requirements shape during dedup (§4.3) and
    /// to project an assets shape into its `ref`s (§3's shape-preservation
    /// invariant).
    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> Shape<U> {
        match self {
            Shape::None => Shape::None,
            Shape::Scalar(v) => Shape::Scalar(f(v)),
            Shape::Seq(v) => Shape::Seq(v.into_iter().map(f).collect()),
            Shape::Map(m) => Shape::Map(m.into_iter().map(|(k, v)| (k, f(v))).collect()),
        }
    }

    /// Like [`Shape::map`], but operating on borrowed elements.
    pub fn map_ref<U>(&self, mut f: impl FnMut(&T) -> U) -> Shape<U> {
        match self {
            Shape::None => Shape::None,
            Shape::Scalar(v) => Shape::Scalar(f(v)),
            Shape::Seq(v) => Shape::Seq(v.iter().map(&mut f).collect()),
            Shape::Map(m) => Shape::Map(m.iter().map(|(k, v)| (k.clone(), f(v))).collect()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_none_is_empty() {
        let shape: Shape<i32> = Shape::None;
        assert!(shape.is_empty());
        assert_eq!(shape.len(), 0);
        assert_eq!(shape.iter().count(), 0);
    }

    #[test]
    fn test_scalar_roundtrip() {
        let shape = Shape::Scalar(42);
        assert_eq!(shape.len(), 1);
        assert_eq!(shape.iter().collect::<Vec<_>>(), vec![&42]);
    }

    #[test]
    fn test_seq_preserves_order() {
        let shape = Shape::Seq(vec![1, 2, 3]);
        let doubled = shape.map(|v| v * 2);
        match doubled {
            Shape::Seq(v) => assert_eq!(v, vec![2, 4, 6]),
            _ => panic!("expected Seq"),
        }
    }

    #[test]
    fn test_map_preserves_keys() {
        let mut m = IndexMap::new();
        m.insert("a".to_string(), 1);
        m.insert("b".to_string(), 2);
        let shape = Shape::Map(m);
        let doubled = shape.map(|v| v * 2);
        match doubled {
            Shape::Map(m) => {
                assert_eq!(m.get("a"), Some(&2));
                assert_eq!(m.get("b"), Some(&4));
                assert_eq!(m.keys().collect::<Vec<_>>(), vec!["a", "b"]);
            }
            _ => panic!("expected Map"),
        }
    }

    #[test]
    fn test_labeled_index() {
        let shape = Shape::Seq(vec!["x", "y"]);
        let labels: Vec<_> = shape.labeled().map(|(l, _)| l).collect();
        assert_eq!(labels, vec![Label::Index(0), Label::Index(1)]);
    }
}
