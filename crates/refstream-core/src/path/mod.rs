//! Path algebra for addressing nodes within a document.
//!
//! A [`Path`] identifies a node's location from the document root as a sequence
//! of (name, occurrence-index) segments, rendered `/root/item[2]`-style.
//! Relative paths use `..` ancestor segments; [`Path::relative_to`] and
//! [`Path::apply`] are exact inverses, which is what lets a back-reference be
//! written as a relative path and resolved again on the reading side.

mod tracker;

pub use tracker::{PathTracker, PathTrackingReader, PathTrackingWriter};

use std::fmt;

use crate::StreamError;

/// One segment of a [`Path`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// `..` — one step towards the root. Only valid in relative paths.
    Up,
    /// A named step. `index` is the 1-based occurrence among same-named
    /// siblings; an index of 1 is omitted when displayed.
    Node { name: String, index: usize },
}

impl PathSegment {
    pub fn node(name: impl Into<String>, index: usize) -> Self {
        PathSegment::Node {
            name: name.into(),
            index,
        }
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Up => write!(f, ".."),
            PathSegment::Node { name, index } => {
                if *index > 1 {
                    write!(f, "{name}[{index}]")
                } else {
                    write!(f, "{name}")
                }
            }
        }
    }
}

/// An absolute or relative location in the node hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Path {
    absolute: bool,
    segments: Vec<PathSegment>,
}

impl Path {
    /// The document root, `/`.
    pub fn root() -> Self {
        Self {
            absolute: true,
            segments: Vec::new(),
        }
    }

    /// The empty relative path, `.`.
    pub fn dot() -> Self {
        Self {
            absolute: false,
            segments: Vec::new(),
        }
    }

    pub(crate) fn from_segments(absolute: bool, segments: Vec<PathSegment>) -> Self {
        Self { absolute, segments }
    }

    pub fn is_absolute(&self) -> bool {
        self.absolute
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// Parses a path string: `/a/b[2]` (absolute), `../b[2]` (relative), or
    /// `.` (the empty relative path).
    pub fn parse(text: &str) -> Result<Self, StreamError> {
        if text == "." {
            return Ok(Self::dot());
        }
        let (absolute, rest) = match text.strip_prefix('/') {
            Some(rest) => (true, rest),
            None => (false, text),
        };
        if rest.is_empty() {
            if absolute {
                return Ok(Self::root());
            }
            return Err(StreamError::Malformed("empty path".into()));
        }
        let mut segments = Vec::new();
        for part in rest.split('/') {
            segments.push(Self::parse_segment(part)?);
        }
        Ok(Self { absolute, segments })
    }

    fn parse_segment(part: &str) -> Result<PathSegment, StreamError> {
        if part.is_empty() {
            return Err(StreamError::Malformed("empty path segment".into()));
        }
        if part == ".." {
            return Ok(PathSegment::Up);
        }
        if let Some(open) = part.find('[') {
            let name = &part[..open];
            let index = part[open + 1..]
                .strip_suffix(']')
                .and_then(|digits| digits.parse::<usize>().ok())
                .filter(|index| *index >= 1)
                .ok_or_else(|| {
                    StreamError::Malformed(format!("invalid path segment `{part}`"))
                })?;
            if name.is_empty() {
                return Err(StreamError::Malformed(format!(
                    "invalid path segment `{part}`"
                )));
            }
            return Ok(PathSegment::node(name, index));
        }
        Ok(PathSegment::node(part, 1))
    }

    /// Returns `true` when `self` is an ancestor of `other` or equal to it.
    pub fn is_ancestor(&self, other: &Path) -> bool {
        self.absolute == other.absolute
            && self.segments.len() <= other.segments.len()
            && other.segments[..self.segments.len()] == self.segments[..]
    }

    /// Relative path from `self` to `target`: walk up to the common ancestor,
    /// then down. `self.apply(&self.relative_to(target))` yields `target`.
    pub fn relative_to(&self, target: &Path) -> Path {
        let common = self
            .segments
            .iter()
            .zip(&target.segments)
            .take_while(|(a, b)| a == b)
            .count();
        let mut segments = Vec::with_capacity(self.segments.len() + target.segments.len() - 2 * common);
        for _ in common..self.segments.len() {
            segments.push(PathSegment::Up);
        }
        segments.extend(target.segments[common..].iter().cloned());
        Path {
            absolute: false,
            segments,
        }
    }

    /// Resolves a relative path against `self`. An absolute argument is
    /// returned as-is. Errors when the relative path climbs past the root.
    pub fn apply(&self, relative: &Path) -> Result<Path, StreamError> {
        if relative.absolute {
            return Ok(relative.clone());
        }
        let mut segments = self.segments.clone();
        for segment in &relative.segments {
            match segment {
                PathSegment::Up => {
                    segments.pop().ok_or_else(|| {
                        StreamError::Malformed(format!(
                            "relative path `{relative}` escapes the document root"
                        ))
                    })?;
                }
                node => segments.push(node.clone()),
            }
        }
        Ok(Path {
            absolute: self.absolute,
            segments,
        })
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return write!(f, "{}", if self.absolute { "/" } else { "." });
        }
        for (i, segment) in self.segments.iter().enumerate() {
            if self.absolute || i > 0 {
                write!(f, "/")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}
