use crate::core::models::atom::AtomKind;
use crate::core::models::graph::MolecularGraph;
use crate::core::models::ids::AtomId;
use crate::core::valence::table::ValenceTable;
use crate::engine::error::EngineError;
use crate::engine::saturation::SaturationChecker;
use tracing::{debug, instrument, trace};

/// Fills in unknown implicit-hydrogen counts once bond orders are final.
///
/// Only atoms whose count is still unknown are touched; a count the parser
/// already supplied is never recomputed. Pseudo-atoms are passed through
/// entirely (their count stays unknown), and atoms of an element the
/// valence table does not know get a count of zero rather than an error —
/// an unknown type simply does not lack hydrogens.
#[derive(Debug, Clone, Copy)]
pub struct HydrogenAdder<'a> {
    valences: &'a ValenceTable,
}

impl<'a> HydrogenAdder<'a> {
    pub fn new(valences: &'a ValenceTable) -> Self {
        Self { valences }
    }

    /// Sets the implicit-hydrogen count of every atom that lacks one.
    ///
    /// # Errors
    ///
    /// Never fails on unknown element types; see
    /// [`add_implicit_hydrogens_for`](Self::add_implicit_hydrogens_for)
    /// for the per-atom behavior.
    #[instrument(skip_all, name = "hydrogen_addition", fields(atoms = graph.atom_count()))]
    pub fn add_implicit_hydrogens(&self, graph: &mut MolecularGraph) -> Result<(), EngineError> {
        let ids: Vec<AtomId> = graph.atoms_iter().map(|(id, _)| id).collect();
        for id in ids {
            self.add_implicit_hydrogens_for(graph, id)?;
        }
        debug!("implicit hydrogen counts filled in");
        Ok(())
    }

    /// Sets the implicit-hydrogen count of a single atom, if unknown.
    ///
    /// Used incrementally while an upstream parser is still building the
    /// graph, one atom at a time.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::AtomNotFound`] when the atom is not part of
    /// the graph.
    pub fn add_implicit_hydrogens_for(
        &self,
        graph: &mut MolecularGraph,
        id: AtomId,
    ) -> Result<(), EngineError> {
        let atom = graph.atom(id).ok_or(EngineError::AtomNotFound { atom: id })?;
        if atom.kind == AtomKind::Pseudo || atom.implicit_hydrogens.is_some() {
            return Ok(());
        }

        let checker = SaturationChecker::new(self.valences);
        let count = match checker.implicit_hydrogen_count(id, graph) {
            Ok(count) => count,
            Err(EngineError::UnknownValence { symbol, .. }) => {
                trace!(%symbol, "unknown element type, defaulting to zero hydrogens");
                0
            }
            Err(other) => return Err(other),
        };
        if let Some(atom) = graph.atom_mut(id) {
            atom.implicit_hydrogens = Some(count);
        }
        Ok(())
    }
}
