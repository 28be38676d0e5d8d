//! Hierarchical node labels.
//!
//! A label is the path from the base simplex down to a node: one
//! `(vertex, segment type)` pair per level. Labels are immutable values;
//! children and ancestors are always new labels built from the parent.

use std::fmt;

/// Kind of subdivision a pair records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SegmentType {
    /// A visible node (encoded as 0)
    Node,
    /// First recursive tile toward a non-origin vertex (encoded as 1)
    TileA,
    /// Second recursive tile toward a non-origin vertex (encoded as 2)
    TileB,
}

impl SegmentType {
    pub fn as_u8(self) -> u8 {
        match self {
            SegmentType::Node => 0,
            SegmentType::TileA => 1,
            SegmentType::TileB => 2,
        }
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(SegmentType::Node),
            1 => Some(SegmentType::TileA),
            2 => Some(SegmentType::TileB),
            _ => None,
        }
    }
}

/// One level of a label: the simplex vertex taken and how it was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pair {
    /// Vertex index, 1-based
    pub vertex: u16,
    pub segment: SegmentType,
}

impl Pair {
    pub const fn new(vertex: u16, segment: SegmentType) -> Self {
        Self { vertex, segment }
    }

    pub const fn node(vertex: u16) -> Self {
        Self::new(vertex, SegmentType::Node)
    }
}

/// Hierarchical address of a node or frontier segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Label(Vec<Pair>);

impl Label {
    /// Level-1 label `(vertex, 0)`.
    pub fn root(vertex: u16) -> Self {
        Self(vec![Pair::node(vertex)])
    }

    pub fn from_pairs(pairs: Vec<Pair>) -> Self {
        Self(pairs)
    }

    pub fn pairs(&self) -> &[Pair] {
        &self.0
    }

    /// Number of pairs; level 1 is the base simplex.
    pub fn level(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn last(&self) -> Option<&Pair> {
        self.0.last()
    }

    pub fn last_vertex(&self) -> Option<u16> {
        self.0.last().map(|pair| pair.vertex)
    }

    /// True when the label names a visible node rather than a tile segment.
    pub fn is_node(&self) -> bool {
        matches!(self.last(), Some(pair) if pair.segment == SegmentType::Node)
    }

    /// Builds `self ++ pair` as a new label.
    pub fn child(&self, pair: Pair) -> Label {
        let mut pairs = Vec::with_capacity(self.0.len() + 1);
        pairs.extend_from_slice(&self.0);
        pairs.push(pair);
        Label(pairs)
    }

    /// The first `levels` pairs. Saturates at the full label.
    pub fn prefix(&self, levels: usize) -> Label {
        Label(self.0[..levels.min(self.0.len())].to_vec())
    }

    /// Label with the trailing pair dropped, `None` at level 1.
    pub fn parent(&self) -> Option<Label> {
        if self.0.len() <= 1 {
            return None;
        }
        Some(self.prefix(self.0.len() - 1))
    }

    /// Level-1 ancestor (the label's own first pair).
    pub fn base(&self) -> Option<Label> {
        self.0.first().map(|pair| Label(vec![*pair]))
    }

    /// Length of the longest prefix on which both labels agree pairwise.
    pub fn common_prefix_len(&self, other: &Label) -> usize {
        self.0
            .iter()
            .zip(other.0.iter())
            .take_while(|(a, b)| a == b)
            .count()
    }

    /// True when `self` is a (non-strict) prefix of `other`.
    pub fn is_ancestor_of(&self, other: &Label) -> bool {
        self.common_prefix_len(other) == self.0.len()
    }

    /// A segment that doubles back: its last vertex repeats the vertex one
    /// level up (`label[-4] == label[-2]` in flattened form).
    pub fn is_folded(&self) -> bool {
        let n = self.0.len();
        n >= 2 && self.0[n - 2].vertex == self.0[n - 1].vertex
    }

    /// Flattened `[vertex, segment, vertex, segment, ...]` form.
    pub fn flatten(&self) -> Vec<u32> {
        self.0
            .iter()
            .flat_map(|pair| [u32::from(pair.vertex), u32::from(pair.segment.as_u8())])
            .collect()
    }
}

/// Renders the canonical node key, e.g. `[1 0 2 1]`.
impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, pair) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{} {}", pair.vertex, pair.segment.as_u8())?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label(flat: &[(u16, u8)]) -> Label {
        Label::from_pairs(
            flat.iter()
                .map(|&(v, s)| Pair::new(v, SegmentType::from_u8(s).unwrap()))
                .collect(),
        )
    }

    #[test]
    fn test_display_matches_key_format() {
        assert_eq!(Label::root(3).to_string(), "[3 0]");
        assert_eq!(label(&[(4, 0), (3, 2), (4, 0)]).to_string(), "[4 0 3 2 4 0]");
    }

    #[test]
    fn test_parent_and_base() {
        let l = label(&[(1, 0), (2, 1), (3, 0)]);
        assert_eq!(l.level(), 3);
        assert_eq!(l.parent(), Some(label(&[(1, 0), (2, 1)])));
        assert_eq!(l.base(), Some(Label::root(1)));
        assert_eq!(Label::root(1).parent(), None);
    }

    #[test]
    fn test_common_prefix_len() {
        let a = label(&[(1, 0), (2, 0)]);
        let b = label(&[(1, 0), (3, 0)]);
        let c = label(&[(2, 0), (3, 0)]);
        assert_eq!(a.common_prefix_len(&b), 1);
        assert_eq!(a.common_prefix_len(&a), 2);
        assert_eq!(a.common_prefix_len(&c), 0);
        assert!(Label::root(1).is_ancestor_of(&a));
        assert!(!a.is_ancestor_of(&b));
    }

    #[test]
    fn test_folded_segments() {
        assert!(label(&[(2, 0), (2, 0)]).is_folded());
        assert!(label(&[(1, 0), (2, 1), (2, 2)]).is_folded());
        assert!(!label(&[(1, 0), (2, 1)]).is_folded());
        assert!(!Label::root(1).is_folded());
    }

    #[test]
    fn test_child_leaves_parent_untouched() {
        let parent = Label::root(2);
        let child = parent.child(Pair::new(3, SegmentType::TileB));
        assert_eq!(parent.level(), 1);
        assert_eq!(child.flatten(), vec![2, 0, 3, 2]);
        assert!(!child.is_node());
        assert!(parent.is_node());
    }
}
