use super::models::ids::{AtomId, BondIndex};

/// A single ring, described by the atoms and bonds it passes through.
///
/// Ring perception (SSSR or similar) is not performed by this library; the
/// caller supplies its result. Only membership and size are consulted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ring {
    pub atoms: Vec<AtomId>,
    pub bonds: Vec<BondIndex>,
}

impl Ring {
    pub fn new(atoms: Vec<AtomId>, bonds: Vec<BondIndex>) -> Self {
        Self { atoms, bonds }
    }

    pub fn size(&self) -> usize {
        self.atoms.len()
    }

    pub fn contains_bond(&self, index: BondIndex) -> bool {
        self.bonds.contains(&index)
    }
}

/// A caller-supplied set of smallest rings.
///
/// Used exclusively to order the resolver's branching: bonds outside every
/// ring are exocyclic, ring bonds are ranked by the size of the smallest
/// ring containing them. Supplying no ring set changes no outcome, only
/// the exploration order.
#[derive(Debug, Clone, Default)]
pub struct RingSet {
    rings: Vec<Ring>,
}

impl RingSet {
    pub fn new(rings: Vec<Ring>) -> Self {
        Self { rings }
    }

    pub fn rings(&self) -> &[Ring] {
        &self.rings
    }

    pub fn is_empty(&self) -> bool {
        self.rings.is_empty()
    }

    /// Size of the smallest ring containing the given bond.
    ///
    /// # Return
    ///
    /// Returns `None` when the bond is exocyclic (in no supplied ring).
    pub fn smallest_ring_with_bond(&self, index: BondIndex) -> Option<usize> {
        self.rings
            .iter()
            .filter(|r| r.contains_bond(index))
            .map(Ring::size)
            .min()
    }
}
