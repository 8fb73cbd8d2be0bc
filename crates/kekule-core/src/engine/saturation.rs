use crate::core::models::atom::{Atom, AtomKind};
use crate::core::models::graph::MolecularGraph;
use crate::core::models::ids::AtomId;
use crate::core::valence::table::ValenceTable;
use crate::engine::error::EngineError;
use tracing::trace;

/// Checks whether atoms have exactly consumed their bonding capacity.
///
/// Saturation is an equality, not an upper bound: an atom is saturated iff
/// its bond order sum plus its implicit hydrogens plus twice its unpaired
/// electrons equals a legal capacity for its element and formal charge.
///
/// The valence table is injected at construction; the checker holds no
/// state of its own and is freely shareable.
#[derive(Debug, Clone, Copy)]
pub struct SaturationChecker<'a> {
    valences: &'a ValenceTable,
}

impl<'a> SaturationChecker<'a> {
    pub fn new(valences: &'a ValenceTable) -> Self {
        Self { valences }
    }

    /// The units of bonding capacity the atom has already used.
    ///
    /// Bond order contributions plus the implicit hydrogen count (unknown
    /// counts as zero) plus two units per unpaired electron.
    pub fn used_capacity(&self, atom: &Atom, graph: &MolecularGraph, id: AtomId) -> u32 {
        graph.bond_order_sum(id)
            + u32::from(atom.implicit_hydrogens.unwrap_or(0))
            + 2 * u32::from(atom.unpaired_electrons)
    }

    /// Three-valued saturation: `Some(bool)` when the element is known,
    /// `None` when it is not (unknown cannot assert unsaturation).
    ///
    /// Pseudo-atoms are always reported saturated; no lookup is attempted
    /// for them.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::AtomNotFound`] when the atom is not in the
    /// graph.
    pub fn saturation_status(
        &self,
        id: AtomId,
        graph: &MolecularGraph,
    ) -> Result<Option<bool>, EngineError> {
        let atom = graph.atom(id).ok_or(EngineError::AtomNotFound { atom: id })?;
        if atom.kind == AtomKind::Pseudo {
            return Ok(Some(true));
        }
        let used = self.used_capacity(atom, graph, id);
        let verdict = self
            .valences
            .is_legal_capacity(&atom.symbol, atom.formal_charge, used);
        trace!(
            symbol = %atom.symbol,
            charge = atom.formal_charge,
            used,
            ?verdict,
            "saturation check"
        );
        Ok(verdict)
    }

    /// Whether the atom's capacity is exactly consumed.
    ///
    /// # Errors
    ///
    /// [`EngineError::AtomNotFound`] for an atom outside the graph;
    /// [`EngineError::UnknownValence`] when saturation is requested for an
    /// element the table does not know.
    pub fn is_saturated(&self, id: AtomId, graph: &MolecularGraph) -> Result<bool, EngineError> {
        match self.saturation_status(id, graph)? {
            Some(saturated) => Ok(saturated),
            None => {
                let atom = graph.atom(id).ok_or(EngineError::AtomNotFound { atom: id })?;
                Err(EngineError::UnknownValence {
                    symbol: atom.symbol.clone(),
                    charge: atom.formal_charge,
                })
            }
        }
    }

    /// Whether every atom in the graph is saturated.
    ///
    /// Short-circuits on the first unsaturated atom. Atoms with an unknown
    /// element are skipped: the table cannot assert their unsaturation.
    pub fn all_saturated(&self, graph: &MolecularGraph) -> bool {
        graph.atoms_iter().all(|(id, _)| {
            self.saturation_status(id, graph)
                .map(|status| status != Some(false))
                .unwrap_or(false)
        })
    }

    /// The number of implicit hydrogens the atom needs to reach a legal
    /// capacity, floored at zero.
    ///
    /// The expected capacity is the smallest legal one that accommodates
    /// the bonding already in place (a tetravalent sulfur resolves against
    /// capacity 4, not 2). A bond-less neutral hydrogen needs one partner;
    /// a bare proton needs none; each unpaired electron reduces the count
    /// by its two-unit contribution.
    ///
    /// # Errors
    ///
    /// [`EngineError::AtomNotFound`] for an atom outside the graph;
    /// [`EngineError::UnknownValence`] for an element the table does not
    /// know. Pseudo-atoms yield 0 without a lookup.
    pub fn implicit_hydrogen_count(
        &self,
        id: AtomId,
        graph: &MolecularGraph,
    ) -> Result<u8, EngineError> {
        let atom = graph.atom(id).ok_or(EngineError::AtomNotFound { atom: id })?;
        if atom.kind == AtomKind::Pseudo {
            return Ok(0);
        }

        let used = graph.bond_order_sum(id) + 2 * u32::from(atom.unpaired_electrons);
        let capacities = self
            .valences
            .capacities(&atom.symbol, atom.formal_charge)
            .ok_or_else(|| EngineError::UnknownValence {
                symbol: atom.symbol.clone(),
                charge: atom.formal_charge,
            })?;
        let expected = capacities
            .iter()
            .map(|&v| u32::from(v))
            .find(|&v| v >= used)
            .or_else(|| capacities.iter().map(|&v| u32::from(v)).max())
            .unwrap_or(0);
        let missing = expected.saturating_sub(used);
        trace!(symbol = %atom.symbol, used, expected, missing, "implicit hydrogen count");
        Ok(missing as u8)
    }
}
