use crate::core::models::graph::MolecularGraph;
use crate::core::rings::RingSet;
use crate::core::valence::table::ValenceTable;
use crate::engine::config::ResolutionConfig;
use crate::engine::error::EngineError;
use crate::engine::hydrogenate::HydrogenAdder;
use crate::engine::progress::ProgressReporter;
use crate::engine::resolver::BondOrderResolver;
use crate::engine::saturation::SaturationChecker;
use tracing::{info, instrument};

/// Runs the complete saturation pipeline on a graph, in place.
///
/// Phase 1 resolves every ambiguous bond to a concrete order; phase 2
/// fills in the implicit-hydrogen counts the parser left unknown. On
/// success the graph satisfies the saturation equality for every atom the
/// valence table knows.
///
/// # Errors
///
/// Propagates [`EngineError`] from either phase. On error the graph keeps
/// whatever was already mutated and must be discarded by the caller.
#[instrument(skip_all, name = "saturation_workflow")]
pub fn run(
    graph: &mut MolecularGraph,
    valences: &ValenceTable,
    config: &ResolutionConfig,
    reporter: &ProgressReporter,
) -> Result<(), EngineError> {
    run_with_rings(graph, valences, None, config, reporter)
}

/// Same as [`run`], with a caller-supplied smallest-ring set to order the
/// resolver's branching.
pub fn run_with_rings(
    graph: &mut MolecularGraph,
    valences: &ValenceTable,
    rings: Option<&RingSet>,
    config: &ResolutionConfig,
    reporter: &ProgressReporter,
) -> Result<(), EngineError> {
    reporter.phase_start("Bond order resolution");
    info!(
        atoms = graph.atom_count(),
        bonds = graph.bond_count(),
        "resolving bond orders"
    );
    let mut resolver = BondOrderResolver::new(valences);
    if let Some(rings) = rings {
        resolver = resolver.with_rings(rings);
    }
    resolver.resolve(graph, config)?;
    reporter.phase_finish();

    reporter.phase_start("Hydrogen addition");
    HydrogenAdder::new(valences).add_implicit_hydrogens(graph)?;
    reporter.phase_finish();

    let checker = SaturationChecker::new(valences);
    info!(
        saturated = checker.all_saturated(graph),
        "saturation workflow complete"
    );
    Ok(())
}
