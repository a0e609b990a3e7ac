use std::fmt;

/// A sequence of indices locating a sub-value within a nested value tree.
///
/// Paths exist for diagnostics only; decoding never consults them. Each
/// descent into a nested structure produces a new path with the parent as
/// its prefix; a path is never mutated in place, so sibling fields can
/// extend the same parent independently.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Path {
    indices: Vec<usize>,
}

impl Path {
    /// The empty path, addressing the message body itself.
    pub fn root() -> Self {
        Self::default()
    }

    /// A new path extending `self` by one index.
    pub fn child(&self, index: usize) -> Self {
        let mut indices = Vec::with_capacity(self.indices.len() + 1);
        indices.extend_from_slice(&self.indices);
        indices.push(index);
        Self { indices }
    }

    /// The terminal index: the position this path addresses within its
    /// innermost container.
    pub fn last(&self) -> Option<usize> {
        self.indices.last().copied()
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

impl From<&[usize]> for Path {
    fn from(indices: &[usize]) -> Self {
        Self {
            indices: indices.to_vec(),
        }
    }
}

impl<const N: usize> From<[usize; N]> for Path {
    fn from(indices: [usize; N]) -> Self {
        Self {
            indices: indices.to_vec(),
        }
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (position, index) in self.indices.iter().enumerate() {
            if position > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{index}")?;
        }
        write!(f, "]")
    }
}
