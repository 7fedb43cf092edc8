//! Names and class identifiers

use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of the special constructor member.
pub const INIT_NAME: &str = "<init>";

/// A simple declaration name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Name(String);

impl Name {
    /// Create a name from a string.
    pub fn new(name: impl Into<String>) -> Self {
        Name(name.into())
    }

    /// The special constructor marker name.
    pub fn init() -> Self {
        Name(INIT_NAME.to_string())
    }

    /// Whether this is the constructor marker name.
    pub fn is_init(&self) -> bool {
        self.0 == INIT_NAME
    }

    /// The name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Name {
    fn from(name: &str) -> Self {
        Name::new(name)
    }
}

/// Identifier of a class-like declaration: a package plus the chain of
/// nested class names from the outermost class inward.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClassId {
    package: String,
    segments: Vec<Name>,
}

impl ClassId {
    /// Identifier for a top-level class in `package`.
    pub fn top_level(package: impl Into<String>, name: impl Into<String>) -> Self {
        ClassId {
            package: package.into(),
            segments: vec![Name::new(name)],
        }
    }

    /// Identifier for a class nested directly under this one.
    pub fn nested(&self, name: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(Name::new(name));
        ClassId {
            package: self.package.clone(),
            segments,
        }
    }

    /// Identifier of the directly enclosing class, if any.
    pub fn outer(&self) -> Option<ClassId> {
        if self.segments.len() <= 1 {
            return None;
        }
        Some(ClassId {
            package: self.package.clone(),
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }

    /// Enclosing-class chain starting with `self` and walking outward.
    pub fn outer_chain(&self) -> impl Iterator<Item = ClassId> {
        std::iter::successors(Some(self.clone()), |id| id.outer())
    }

    /// The class's own (innermost) name.
    pub fn name(&self) -> &Name {
        self.segments.last().expect("ClassId has at least one segment")
    }

    /// The package the class lives in.
    pub fn package(&self) -> &str {
        &self.package
    }

    /// Whether the class is not nested inside another class.
    pub fn is_top_level(&self) -> bool {
        self.segments.len() == 1
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.package.is_empty() {
            write!(f, "{}.", self.package)?;
        }
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            write!(f, "{}", segment)?;
        }
        Ok(())
    }
}

/// Byte range of a declaration in its source file.
///
/// Carried for diagnostics only; a synthesized declaration keeps the dummy
/// span.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    /// Start byte offset.
    pub start: u32,
    /// End byte offset (exclusive).
    pub end: u32,
}

impl Span {
    /// Create a span.
    pub fn new(start: u32, end: u32) -> Self {
        Span { start, end }
    }

    /// The zero span used for synthesized declarations.
    pub fn dummy() -> Self {
        Span::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_id_display() {
        let id = ClassId::top_level("foo.bar", "State").nested("Immutable");
        assert_eq!(id.to_string(), "foo.bar.State.Immutable");
        assert_eq!(id.name().as_str(), "Immutable");
        assert_eq!(id.package(), "foo.bar");
        assert!(!id.is_top_level());
    }

    #[test]
    fn test_outer_chain_walks_to_top_level() {
        let id = ClassId::top_level("foo", "A").nested("B").nested("C");
        let chain: Vec<String> = id.outer_chain().map(|c| c.to_string()).collect();
        assert_eq!(chain, vec!["foo.A.B.C", "foo.A.B", "foo.A"]);
        assert!(ClassId::top_level("foo", "A").outer().is_none());
    }

    #[test]
    fn test_init_name() {
        assert!(Name::init().is_init());
        assert!(!Name::new("update").is_init());
    }
}
