use std::fmt;

use crate::arena::ArenaHandle;

macro_rules! impl_arena_handle {
    ($name:ident, $prefix:expr) => {
        impl ArenaHandle for $name {
            #[inline]
            fn from_parts(index: u32, generation: u32) -> Self {
                $name { index, generation }
            }

            #[inline]
            fn slot(self) -> usize {
                self.index as usize
            }

            #[inline]
            fn generation(self) -> u32 {
                self.generation
            }
        }

        impl $name {
            /// The arena slot this handle points into. Slots are
            /// reused after deletion, so two handles with the same
            /// index are only equal if their generations match too.
            #[inline]
            pub fn index(self) -> usize {
                self.index as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}{}.{}", $prefix, self.index, self.generation)
            }
        }
    };
}

/// Generation-checked handle to a vertex in a
/// [`Graph`](crate::graph::Graph).
///
/// A handle keeps pointing at the vertex it was created for; once the
/// vertex is deleted every lookup through the handle fails, even if the
/// slot has been reused by a later vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VertexId {
    index: u32,
    generation: u32,
}

impl_arena_handle!(VertexId, "v");

/// Generation-checked handle to an edge in a
/// [`Graph`](crate::graph::Graph).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EdgeId {
    index: u32,
    generation: u32,
}

impl_arena_handle!(EdgeId, "e");

/// The graph element a k-mer currently lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Owner {
    Vertex(VertexId),
    Edge(EdgeId),
}

impl Owner {
    #[inline]
    pub fn vertex(self) -> Option<VertexId> {
        match self {
            Owner::Vertex(v) => Some(v),
            Owner::Edge(_) => None,
        }
    }

    #[inline]
    pub fn edge(self) -> Option<EdgeId> {
        match self {
            Owner::Vertex(_) => None,
            Owner::Edge(e) => Some(e),
        }
    }
}

impl From<VertexId> for Owner {
    #[inline]
    fn from(v: VertexId) -> Owner {
        Owner::Vertex(v)
    }
}

impl From<EdgeId> for Owner {
    #[inline]
    fn from(e: EdgeId) -> Owner {
        Owner::Edge(e)
    }
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Owner::Vertex(v) => v.fmt(f),
            Owner::Edge(e) => e.fmt(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_differ_by_generation() {
        let a = VertexId::from_parts(3, 0);
        let b = VertexId::from_parts(3, 1);
        assert_ne!(a, b);
        assert_eq!(a.index(), b.index());
        assert_eq!(a.to_string(), "v3.0");
        assert_eq!(EdgeId::from_parts(7, 2).to_string(), "e7.2");
    }

    #[test]
    fn owner_projections() {
        let v = VertexId::from_parts(1, 0);
        let e = EdgeId::from_parts(1, 0);
        assert_eq!(Owner::from(v).vertex(), Some(v));
        assert_eq!(Owner::from(v).edge(), None);
        assert_eq!(Owner::from(e).edge(), Some(e));
        assert_ne!(Owner::from(v), Owner::from(e));
    }
}
