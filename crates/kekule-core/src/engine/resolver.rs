use crate::core::models::atom::{AtomKind, Hybridization};
use crate::core::models::bond::BondOrder;
use crate::core::models::graph::MolecularGraph;
use crate::core::models::ids::{AtomId, BondIndex};
use crate::core::rings::RingSet;
use crate::core::valence::table::ValenceTable;
use crate::engine::config::ResolutionConfig;
use crate::engine::error::EngineError;
use std::collections::HashMap;
use tracing::{debug, instrument, trace};

/// Decides concrete orders for the ambiguous bonds of a molecular graph.
///
/// Every ambiguous bond receives an order such that each touched atom's
/// bonding capacity is consumed *exactly* (the saturation equality), via
/// constraint propagation and, where propagation alone cannot decide, a
/// backtracking search over an explicit stack of decision frames. The host
/// call stack is never used for the search, so depth is bounded by the
/// number of ambiguous bonds and failure diagnostics are deterministic.
///
/// A ring-perception result may be attached to steer branching order; it
/// never changes which assignments are valid.
#[derive(Debug, Clone, Copy)]
pub struct BondOrderResolver<'a> {
    valences: &'a ValenceTable,
    rings: Option<&'a RingSet>,
}

/// Extra order units a bond carries on top of single: 0 = single,
/// 1 = double, 2 = triple.
type Extra = u8;

struct Candidate {
    bond: BondIndex,
    atoms: [AtomId; 2],
    /// Positions of the endpoints in the ledger's touched-atom list.
    pos: [usize; 2],
    /// Most extra order this bond may carry. Ring-system bonds are capped
    /// at double; plain undecided chain bonds may go to triple.
    cap: Extra,
    /// Branching rank: exocyclic before ring-internal, smaller rings
    /// first, then insertion order.
    priority: (u8, usize, usize),
}

/// The immutable part of one resolution run: the ambiguous bond set and
/// the per-atom capacity deficits derived from the valence table.
struct Ledger {
    candidates: Vec<Candidate>,
    /// Touched atoms in first-encounter order.
    atoms: Vec<AtomId>,
    /// Candidate indices incident to each touched atom.
    incident: Vec<Vec<usize>>,
    /// Initial capacity deficit per touched atom; `None` for atoms that
    /// constrain nothing (pseudo-atoms, unknown elements).
    deficit: Vec<Option<u32>>,
    /// Whether the atom's deficit is an equality. Atoms with an unknown
    /// implicit-hydrogen count only bound their bonds from above; the
    /// leftover is absorbed later by the hydrogen adder.
    exact: Vec<bool>,
}

/// The mutable search state: tentative extras and per-atom remaining
/// deficits. Cloned into each decision frame so backtracking is a plain
/// restore.
#[derive(Clone)]
struct SearchState {
    assignment: Vec<Option<Extra>>,
    remaining: Vec<Option<u32>>,
}

/// One branch point: the saved pre-decision state and the alternatives
/// still untried for the chosen bond.
struct Frame {
    saved: SearchState,
    candidate: usize,
    alternatives: Vec<Extra>,
    next: usize,
}

#[derive(Debug, Clone, Copy)]
struct Contradiction {
    bond: Option<BondIndex>,
    atom: Option<AtomId>,
}

impl<'a> BondOrderResolver<'a> {
    pub fn new(valences: &'a ValenceTable) -> Self {
        Self {
            valences,
            rings: None,
        }
    }

    /// Attaches a caller-supplied smallest-ring set for branching order.
    pub fn with_rings(mut self, rings: &'a RingSet) -> Self {
        self.rings = Some(rings);
        self
    }

    /// Resolves all bonds flagged single-or-double (and bonds with no
    /// order at all) to concrete orders.
    ///
    /// # Arguments
    ///
    /// * `graph` - The graph to mutate in place.
    /// * `exocyclic_first` - Branch on bonds leaving a ring before
    ///   ring-internal bonds.
    ///
    /// # Errors
    ///
    /// [`EngineError::Unresolvable`] when no assignment satisfies every
    /// touched atom. The graph keeps whatever was already written; callers
    /// must discard it on error.
    pub fn decide_bond_orders(
        &self,
        graph: &mut MolecularGraph,
        exocyclic_first: bool,
    ) -> Result<(), EngineError> {
        self.resolve(
            graph,
            &ResolutionConfig::new().with_exocyclic_first(exocyclic_first),
        )
    }

    /// Resolves the ambiguous bond set in the widest sense: flagged bonds,
    /// order-less bonds, and aromatic-flagged bonds that were never marked
    /// single-or-double (exocyclic and chain conjugation).
    pub fn saturate(&self, graph: &mut MolecularGraph) -> Result<(), EngineError> {
        self.resolve(
            graph,
            &ResolutionConfig::new().with_unflagged_aromatic(true),
        )
    }

    /// Full-control entry point behind the two convenience methods.
    #[instrument(skip_all, name = "bond_order_resolution", fields(bonds = graph.bond_count()))]
    pub fn resolve(
        &self,
        graph: &mut MolecularGraph,
        config: &ResolutionConfig,
    ) -> Result<(), EngineError> {
        let ledger = self.build_ledger(graph, config)?;
        if ledger.candidates.is_empty() {
            debug!("no ambiguous bonds, nothing to resolve");
            return Ok(());
        }
        debug!(
            ambiguous = ledger.candidates.len(),
            touched = ledger.atoms.len(),
            "resolving ambiguous bond set"
        );

        let mut state = SearchState {
            assignment: vec![None; ledger.candidates.len()],
            remaining: ledger.deficit.clone(),
        };
        propagate(&ledger, &mut state).map_err(unresolvable)?;

        let order = branch_order(&ledger);
        let mut stack: Vec<Frame> = Vec::new();
        let mut decisions: u64 = 0;
        let mut last_conflict: Option<Contradiction> = None;

        loop {
            let Some(pick) = pick_candidate(&ledger, &state, &order) else {
                write_back(&ledger, &state, graph);
                debug!(decisions, "assignment complete");
                return Ok(());
            };
            stack.push(Frame {
                saved: state.clone(),
                candidate: pick,
                alternatives: alternatives(&ledger, &state, pick),
                next: 0,
            });

            // Advance to the next consistent alternative anywhere on the
            // stack, popping exhausted frames.
            loop {
                let Some((candidate, extra, saved)) = next_alternative(&mut stack) else {
                    let conflict = last_conflict.unwrap_or(Contradiction {
                        bond: Some(ledger.candidates[pick].bond),
                        atom: None,
                    });
                    return Err(unresolvable(conflict));
                };

                decisions += 1;
                if let Some(budget) = config.max_decisions {
                    if decisions > budget {
                        return Err(EngineError::BudgetExhausted { decisions: budget });
                    }
                }

                state = saved;
                trace!(
                    bond = ledger.candidates[candidate].bond,
                    extra,
                    depth = stack.len(),
                    "trying alternative"
                );
                let attempt = apply(&ledger, &mut state, candidate, extra)
                    .and_then(|()| propagate(&ledger, &mut state));
                match attempt {
                    Ok(()) => break,
                    Err(conflict) => {
                        trace!(?conflict, "contradiction, backtracking");
                        last_conflict = Some(conflict);
                    }
                }
            }
        }
    }

    /// Collects the ambiguous bond set and derives each touched atom's
    /// capacity deficit.
    fn build_ledger(
        &self,
        graph: &MolecularGraph,
        config: &ResolutionConfig,
    ) -> Result<Ledger, EngineError> {
        let mut candidates = Vec::new();
        for (index, bond) in graph.bonds().iter().enumerate() {
            let ambiguous = bond.single_or_double
                || bond.order.is_none()
                || (config.include_unflagged_aromatic && bond.is_aromatic);
            if !ambiguous {
                continue;
            }
            let in_ring_system = bond.single_or_double || bond.is_aromatic;
            candidates.push(Candidate {
                bond: index,
                atoms: [bond.atom1_id, bond.atom2_id],
                pos: [0, 0],
                cap: if in_ring_system { 1 } else { 2 },
                priority: self.priority(graph, index, config),
            });
        }

        let mut atoms: Vec<AtomId> = Vec::new();
        let mut atom_pos: HashMap<AtomId, usize> = HashMap::new();
        let mut incident: Vec<Vec<usize>> = Vec::new();
        for k in 0..candidates.len() {
            for slot in 0..2 {
                let atom_id = candidates[k].atoms[slot];
                let pos = *atom_pos.entry(atom_id).or_insert_with(|| {
                    atoms.push(atom_id);
                    incident.push(Vec::new());
                    atoms.len() - 1
                });
                candidates[k].pos[slot] = pos;
                incident[pos].push(k);
            }
        }

        let candidate_bonds: Vec<BondIndex> = candidates.iter().map(|c| c.bond).collect();
        let mut deficit = Vec::with_capacity(atoms.len());
        let mut exact = Vec::with_capacity(atoms.len());
        for (pos, &atom_id) in atoms.iter().enumerate() {
            deficit.push(self.atom_deficit(
                graph,
                atom_id,
                incident[pos].len() as u32,
                &candidate_bonds,
            )?);
            exact.push(
                graph
                    .atom(atom_id)
                    .is_some_and(|a| a.implicit_hydrogens.is_some()),
            );
        }

        Ok(Ledger {
            candidates,
            atoms,
            incident,
            deficit,
            exact,
        })
    }

    /// The extra bond order an atom must still receive from the ambiguous
    /// set, or `None` when the atom constrains nothing.
    fn atom_deficit(
        &self,
        graph: &MolecularGraph,
        atom_id: AtomId,
        ambiguous_degree: u32,
        candidate_bonds: &[BondIndex],
    ) -> Result<Option<u32>, EngineError> {
        let atom = graph
            .atom(atom_id)
            .ok_or(EngineError::AtomNotFound { atom: atom_id })?;
        if atom.kind == AtomKind::Pseudo {
            return Ok(None);
        }

        let fixed: u32 = graph
            .incident_bonds(atom_id)
            .unwrap_or(&[])
            .iter()
            .filter(|&&i| !candidate_bonds.contains(&i))
            .map(|&i| u32::from(graph.bond(i).map_or(1, |b| b.order_contribution())))
            .sum();
        let min_usage = fixed
            + ambiguous_degree
            + u32::from(atom.implicit_hydrogens.unwrap_or(0))
            + 2 * u32::from(atom.unpaired_electrons);

        let Some(capacities) = self.valences.capacities(&atom.symbol, atom.formal_charge) else {
            return Ok(None);
        };
        let Some(expected) = capacities
            .iter()
            .map(|&v| u32::from(v))
            .find(|&v| v >= min_usage)
        else {
            // Already over every legal capacity: not even an all-single
            // assignment can satisfy the equality.
            return Err(EngineError::Unresolvable {
                bond: None,
                atom: Some(atom_id),
            });
        };
        let deficit = expected - min_usage;

        if deficit > atom_extra_cap(atom.hybridization, atom.is_aromatic) {
            return Err(EngineError::Unresolvable {
                bond: None,
                atom: Some(atom_id),
            });
        }
        Ok(Some(deficit))
    }

    fn priority(
        &self,
        graph: &MolecularGraph,
        index: BondIndex,
        config: &ResolutionConfig,
    ) -> (u8, usize, usize) {
        if !config.exocyclic_first {
            return (0, 0, index);
        }
        match self.rings {
            Some(rings) => match rings.smallest_ring_with_bond(index) {
                None => (0, 0, index),
                Some(size) => (1, size, index),
            },
            // Without ring perception, a bond whose endpoints are both
            // aromatic is assumed ring-internal.
            None => {
                let bond = &graph.bonds()[index];
                let both_aromatic = graph.atom(bond.atom1_id).is_some_and(|a| a.is_aromatic)
                    && graph.atom(bond.atom2_id).is_some_and(|a| a.is_aromatic);
                if both_aromatic {
                    (1, 0, index)
                } else {
                    (0, 0, index)
                }
            }
        }
    }
}

/// The most extra order an atom may accept in total, from its
/// hybridization and the one-double-per-ring-atom rule.
fn atom_extra_cap(hybridization: Option<Hybridization>, is_aromatic: bool) -> u32 {
    let hybrid_cap = match hybridization {
        Some(Hybridization::S) | Some(Hybridization::Sp3) => 0,
        Some(Hybridization::Sp2) => 1,
        Some(Hybridization::Sp) => 2,
        Some(Hybridization::Sp3d) | Some(Hybridization::Sp3d2) | None => u32::MAX,
    };
    if is_aromatic {
        hybrid_cap.min(1)
    } else {
        hybrid_cap
    }
}

/// Candidate indices sorted by branching priority.
fn branch_order(ledger: &Ledger) -> Vec<usize> {
    let mut order: Vec<usize> = (0..ledger.candidates.len()).collect();
    order.sort_by_key(|&k| ledger.candidates[k].priority);
    order
}

/// Highest extra the candidate can still take: its own cap bounded by both
/// endpoints' remaining deficits (unconstrained endpoints bound nothing).
fn high(ledger: &Ledger, state: &SearchState, k: usize) -> Extra {
    let candidate = &ledger.candidates[k];
    let mut hi = u32::from(candidate.cap);
    for &pos in &candidate.pos {
        if let Some(rem) = state.remaining[pos] {
            hi = hi.min(rem);
        }
    }
    hi as Extra
}

/// Records a tentative extra for a candidate, debiting both endpoints.
fn apply(
    ledger: &Ledger,
    state: &mut SearchState,
    k: usize,
    extra: Extra,
) -> Result<(), Contradiction> {
    state.assignment[k] = Some(extra);
    if extra == 0 {
        return Ok(());
    }
    let candidate = &ledger.candidates[k];
    for &pos in &candidate.pos {
        if let Some(rem) = state.remaining[pos] {
            let debit = u32::from(extra);
            if debit > rem {
                return Err(Contradiction {
                    bond: Some(candidate.bond),
                    atom: Some(ledger.atoms[pos]),
                });
            }
            state.remaining[pos] = Some(rem - debit);
        }
    }
    Ok(())
}

/// Runs the two forcing rules to a fixed point.
///
/// Rule 1: a candidate that can no longer take any extra is a single bond.
/// Rule 2: an atom whose undecided candidates can only just meet its
/// remaining deficit forces them to their maxima; a lone undecided
/// candidate takes exactly the remainder. An atom whose deficit exceeds
/// what its candidates can still supply is a contradiction.
fn propagate(ledger: &Ledger, state: &mut SearchState) -> Result<(), Contradiction> {
    loop {
        let mut changed = false;

        for k in 0..ledger.candidates.len() {
            if state.assignment[k].is_none() && high(ledger, state, k) == 0 {
                apply(ledger, state, k, 0)?;
                changed = true;
            }
        }

        for pos in 0..ledger.atoms.len() {
            // Only atoms with a known hydrogen count demand equality; the
            // rest merely bound their bonds through `high`.
            if !ledger.exact[pos] {
                continue;
            }
            let Some(rem) = state.remaining[pos] else {
                continue;
            };
            if rem == 0 {
                continue;
            }
            let undecided: Vec<usize> = ledger.incident[pos]
                .iter()
                .copied()
                .filter(|&k| state.assignment[k].is_none())
                .collect();
            let supply: u32 = undecided
                .iter()
                .map(|&k| u32::from(high(ledger, state, k)))
                .sum();
            if supply < rem {
                return Err(Contradiction {
                    bond: undecided.first().map(|&k| ledger.candidates[k].bond),
                    atom: Some(ledger.atoms[pos]),
                });
            }
            if undecided.len() == 1 {
                apply(ledger, state, undecided[0], rem as Extra)?;
                changed = true;
            } else if supply == rem {
                // Every undecided candidate must go to its maximum; force
                // one and let the fixed point pick up the rest.
                for &k in &undecided {
                    let hi = high(ledger, state, k);
                    if hi > 0 {
                        apply(ledger, state, k, hi)?;
                        changed = true;
                        break;
                    }
                }
            }
        }

        if !changed {
            return Ok(());
        }
    }
}

/// The most constrained undecided candidate, ties broken by branch
/// priority. `None` when the assignment is complete.
fn pick_candidate(ledger: &Ledger, state: &SearchState, order: &[usize]) -> Option<usize> {
    let mut best: Option<(usize, usize)> = None; // (alternatives, rank)
    for (rank, &k) in order.iter().enumerate() {
        if state.assignment[k].is_some() {
            continue;
        }
        let alts = usize::from(high(ledger, state, k)) + 1;
        if best.is_none_or(|(b, _)| alts < b) {
            best = Some((alts, rank));
        }
    }
    best.map(|(_, rank)| order[rank])
}

/// Alternatives for a branch, most-bonded first (DOUBLE before SINGLE).
/// A bond touching an unconstrained atom defaults the other way round:
/// nothing there ever demands a double, so try the single assignment first.
fn alternatives(ledger: &Ledger, state: &SearchState, k: usize) -> Vec<Extra> {
    let candidate = &ledger.candidates[k];
    let hi = high(ledger, state, k);
    let constrained = candidate.pos.iter().all(|&pos| state.remaining[pos].is_some());
    if constrained {
        (0..=hi).rev().collect()
    } else {
        (0..=hi).collect()
    }
}

/// Pops exhausted frames and yields the next untried alternative together
/// with a copy of its frame's saved state.
fn next_alternative(stack: &mut Vec<Frame>) -> Option<(usize, Extra, SearchState)> {
    loop {
        let frame = stack.last_mut()?;
        if frame.next < frame.alternatives.len() {
            let extra = frame.alternatives[frame.next];
            frame.next += 1;
            return Some((frame.candidate, extra, frame.saved.clone()));
        }
        stack.pop();
    }
}

/// Writes the final extras back to the graph as concrete orders.
fn write_back(ledger: &Ledger, state: &SearchState, graph: &mut MolecularGraph) {
    for (k, candidate) in ledger.candidates.iter().enumerate() {
        let order = match state.assignment[k] {
            Some(1) => BondOrder::Double,
            Some(2) => BondOrder::Triple,
            _ => BondOrder::Single,
        };
        if let Some(bond) = graph.bond_mut(candidate.bond) {
            bond.order = Some(order);
        }
    }
    debug_assert!(
        state
            .remaining
            .iter()
            .zip(&ledger.exact)
            .all(|(r, &exact)| !exact || r.is_none_or(|v| v == 0)),
        "complete assignment leaves no deficit on exact atoms"
    );
}

fn unresolvable(conflict: Contradiction) -> EngineError {
    EngineError::Unresolvable {
        bond: conflict.bond,
        atom: conflict.atom,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::Atom;
    use crate::core::rings::Ring;
    use crate::engine::saturation::SaturationChecker;

    fn aromatic_carbon(hydrogens: u8) -> Atom {
        let mut atom = Atom::new("C");
        atom.hybridization = Some(Hybridization::Sp2);
        atom.implicit_hydrogens = Some(hydrogens);
        atom.is_aromatic = true;
        atom.single_or_double = true;
        atom
    }

    fn aromatic_hetero(symbol: &str, hydrogens: u8) -> Atom {
        let mut atom = Atom::new(symbol);
        atom.hybridization = Some(Hybridization::Sp2);
        atom.implicit_hydrogens = Some(hydrogens);
        atom.is_aromatic = true;
        atom.single_or_double = true;
        atom
    }

    /// Closes an ambiguous ring over the given atoms, returning the bond
    /// indices in ring order.
    fn ambiguous_ring(graph: &mut MolecularGraph, atoms: &[AtomId]) -> Vec<BondIndex> {
        let mut bonds = Vec::new();
        for i in 0..atoms.len() {
            let j = (i + 1) % atoms.len();
            let index = graph.add_bond(atoms[i], atoms[j], None).unwrap();
            let bond = graph.bond_mut(index).unwrap();
            bond.single_or_double = true;
            bond.is_aromatic = true;
            bonds.push(index);
        }
        bonds
    }

    fn ambiguous_chain_bond(graph: &mut MolecularGraph, a: AtomId, b: AtomId) -> BondIndex {
        let index = graph.add_bond(a, b, None).unwrap();
        graph.bond_mut(index).unwrap().single_or_double = true;
        index
    }

    fn orders(graph: &MolecularGraph) -> Vec<Option<BondOrder>> {
        graph.bonds().iter().map(|b| b.order).collect()
    }

    fn double_count(graph: &MolecularGraph) -> usize {
        graph
            .bonds()
            .iter()
            .filter(|b| b.order == Some(BondOrder::Double))
            .count()
    }

    fn benzene() -> MolecularGraph {
        let mut graph = MolecularGraph::new();
        let atoms: Vec<AtomId> = (0..6).map(|_| graph.add_atom(aromatic_carbon(1))).collect();
        ambiguous_ring(&mut graph, &atoms);
        graph
    }

    mod ring_systems {
        use super::*;

        #[test]
        fn benzene_alternates_starting_with_a_double() {
            let table = ValenceTable::default();
            let mut graph = benzene();
            BondOrderResolver::new(&table)
                .decide_bond_orders(&mut graph, false)
                .unwrap();

            let expected = [
                BondOrder::Double,
                BondOrder::Single,
                BondOrder::Double,
                BondOrder::Single,
                BondOrder::Double,
                BondOrder::Single,
            ];
            assert_eq!(
                orders(&graph),
                expected.iter().map(|&o| Some(o)).collect::<Vec<_>>()
            );
        }

        #[test]
        fn no_ring_atom_carries_two_doubles() {
            let table = ValenceTable::default();
            let mut graph = benzene();
            BondOrderResolver::new(&table)
                .decide_bond_orders(&mut graph, true)
                .unwrap();

            for (id, _) in graph.atoms_iter() {
                let doubles = graph
                    .incident_bonds(id)
                    .unwrap()
                    .iter()
                    .filter(|&&i| graph.bond(i).unwrap().order == Some(BondOrder::Double))
                    .count();
                assert!(doubles <= 1, "atom {id:?} received {doubles} doubles");
            }
        }

        #[test]
        fn cyclobutadiene_alternates() {
            let table = ValenceTable::default();
            let mut graph = MolecularGraph::new();
            let atoms: Vec<AtomId> = (0..4).map(|_| graph.add_atom(aromatic_carbon(1))).collect();
            ambiguous_ring(&mut graph, &atoms);
            BondOrderResolver::new(&table)
                .decide_bond_orders(&mut graph, true)
                .unwrap();

            assert_eq!(
                orders(&graph),
                vec![
                    Some(BondOrder::Double),
                    Some(BondOrder::Single),
                    Some(BondOrder::Double),
                    Some(BondOrder::Single),
                ]
            );
        }

        #[test]
        fn quinone_is_forced_entirely_by_propagation() {
            let table = ValenceTable::default();
            let mut graph = MolecularGraph::new();

            // O=c1ccc(=O)cc1, bonds in parse order: the exocyclic C=O
            // first, then the ring walked from the carbonyl carbon.
            let mut carbonyl_oxygen = Atom::new("O");
            carbonyl_oxygen.hybridization = Some(Hybridization::Sp2);
            carbonyl_oxygen.implicit_hydrogens = Some(0);
            let o0 = graph.add_atom(carbonyl_oxygen.clone());
            let c1 = graph.add_atom(aromatic_carbon(0));
            let c2 = graph.add_atom(aromatic_carbon(1));
            let c3 = graph.add_atom(aromatic_carbon(1));
            let c4 = graph.add_atom(aromatic_carbon(0));
            let o5 = graph.add_atom(carbonyl_oxygen);
            let c6 = graph.add_atom(aromatic_carbon(1));
            let c7 = graph.add_atom(aromatic_carbon(1));

            graph.add_bond(o0, c1, Some(BondOrder::Double)).unwrap(); // 0
            ambiguous_chain_bond(&mut graph, c1, c2); // 1
            ambiguous_chain_bond(&mut graph, c2, c3); // 2
            ambiguous_chain_bond(&mut graph, c3, c4); // 3
            graph.add_bond(c4, o5, Some(BondOrder::Double)).unwrap(); // 4
            ambiguous_chain_bond(&mut graph, c4, c6); // 5
            ambiguous_chain_bond(&mut graph, c6, c7); // 6
            ambiguous_chain_bond(&mut graph, c7, c1); // 7

            // Budget 0 proves no branching decision is ever needed.
            BondOrderResolver::new(&table)
                .resolve(
                    &mut graph,
                    &ResolutionConfig::new().with_max_decisions(Some(0)),
                )
                .unwrap();

            assert_eq!(
                orders(&graph),
                vec![
                    Some(BondOrder::Double), // exocyclic C=O
                    Some(BondOrder::Single),
                    Some(BondOrder::Double),
                    Some(BondOrder::Single),
                    Some(BondOrder::Double), // the other C=O
                    Some(BondOrder::Single),
                    Some(BondOrder::Double),
                    Some(BondOrder::Single),
                ]
            );
            assert_eq!(double_count(&graph), 4);
        }

        #[test]
        fn pyrrole_nitrogen_receives_no_double_bond() {
            let table = ValenceTable::default();
            let mut graph = MolecularGraph::new();
            // c1c[nH]cc1 with the nitrogen at position 2.
            let c0 = graph.add_atom(aromatic_carbon(1));
            let c1 = graph.add_atom(aromatic_carbon(1));
            let n2 = graph.add_atom(aromatic_hetero("N", 1));
            let c3 = graph.add_atom(aromatic_carbon(1));
            let c4 = graph.add_atom(aromatic_carbon(1));
            ambiguous_ring(&mut graph, &[c0, c1, n2, c3, c4]);

            BondOrderResolver::new(&table)
                .decide_bond_orders(&mut graph, true)
                .unwrap();

            assert_eq!(
                orders(&graph),
                vec![
                    Some(BondOrder::Double),
                    Some(BondOrder::Single),
                    Some(BondOrder::Single),
                    Some(BondOrder::Double),
                    Some(BondOrder::Single),
                ]
            );
        }

        #[test]
        fn furan_oxygen_receives_no_double_bond() {
            let table = ValenceTable::default();
            let mut graph = MolecularGraph::new();
            // c1cocc1 with the oxygen at position 2.
            let c0 = graph.add_atom(aromatic_carbon(1));
            let c1 = graph.add_atom(aromatic_carbon(1));
            let o2 = graph.add_atom(aromatic_hetero("O", 0));
            let c3 = graph.add_atom(aromatic_carbon(1));
            let c4 = graph.add_atom(aromatic_carbon(1));
            ambiguous_ring(&mut graph, &[c0, c1, o2, c3, c4]);

            BondOrderResolver::new(&table)
                .decide_bond_orders(&mut graph, true)
                .unwrap();

            assert_eq!(
                orders(&graph),
                vec![
                    Some(BondOrder::Double),
                    Some(BondOrder::Single),
                    Some(BondOrder::Single),
                    Some(BondOrder::Double),
                    Some(BondOrder::Single),
                ]
            );
            assert_eq!(double_count(&graph), 2);
        }

        #[test]
        fn indolizine_fusion_nitrogen_keeps_all_three_bonds_single() {
            let table = ValenceTable::default();
            let mut graph = MolecularGraph::new();
            // c1ccn2cccc2c1: the nitrogen bridges both rings.
            let a: Vec<AtomId> = (0..10)
                .map(|i| {
                    if i == 3 {
                        graph.add_atom(aromatic_hetero("N", 0))
                    } else {
                        let hydrogens = if i == 7 { 0 } else { 1 };
                        graph.add_atom(aromatic_carbon(hydrogens))
                    }
                })
                .collect();
            for (i, j) in [(0, 1), (1, 2), (2, 3), (3, 4), (4, 5), (5, 6), (6, 7)] {
                ambiguous_chain_bond(&mut graph, a[i], a[j]);
            }
            ambiguous_chain_bond(&mut graph, a[7], a[3]); // five-ring closure
            ambiguous_chain_bond(&mut graph, a[7], a[8]);
            ambiguous_chain_bond(&mut graph, a[8], a[9]);
            ambiguous_chain_bond(&mut graph, a[9], a[0]); // six-ring closure

            BondOrderResolver::new(&table)
                .decide_bond_orders(&mut graph, true)
                .unwrap();

            for &index in graph.incident_bonds(a[3]).unwrap() {
                assert_eq!(
                    graph.bond(index).unwrap().order,
                    Some(BondOrder::Single),
                    "nitrogen bond {index} should be single"
                );
            }
            assert_eq!(double_count(&graph), 4);
        }

        #[test]
        fn azulene_fusion_bond_stays_single() {
            let table = ValenceTable::default();
            let mut graph = MolecularGraph::new();
            // c12c(ccccc2)ccc1: a0/a1 are the fusion carbons.
            let a0 = graph.add_atom(aromatic_carbon(0));
            let a1 = graph.add_atom(aromatic_carbon(0));
            let periphery: Vec<AtomId> =
                (0..8).map(|_| graph.add_atom(aromatic_carbon(1))).collect();

            let fusion = ambiguous_chain_bond(&mut graph, a0, a1);
            // Seven-membered ring: the fusion bond plus five periphery carbons.
            let mut prev = a1;
            for &atom in &periphery[0..5] {
                ambiguous_chain_bond(&mut graph, prev, atom);
                prev = atom;
            }
            ambiguous_chain_bond(&mut graph, prev, a0);
            // Five-membered ring: the fusion bond plus three periphery carbons.
            prev = a1;
            for &atom in &periphery[5..8] {
                ambiguous_chain_bond(&mut graph, prev, atom);
                prev = atom;
            }
            ambiguous_chain_bond(&mut graph, prev, a0);

            BondOrderResolver::new(&table)
                .decide_bond_orders(&mut graph, true)
                .unwrap();

            assert_eq!(graph.bond(fusion).unwrap().order, Some(BondOrder::Single));
            assert_eq!(double_count(&graph), 5);
        }

        #[test]
        fn odd_ring_without_relief_is_unresolvable() {
            let table = ValenceTable::default();
            let mut graph = MolecularGraph::new();
            let atoms: Vec<AtomId> = (0..5).map(|_| graph.add_atom(aromatic_carbon(1))).collect();
            ambiguous_ring(&mut graph, &atoms);

            let err = BondOrderResolver::new(&table)
                .decide_bond_orders(&mut graph, true)
                .unwrap_err();
            match err {
                EngineError::Unresolvable { bond, atom } => {
                    assert!(
                        bond.is_some() || atom.is_some(),
                        "diagnostics should name an offender"
                    );
                }
                other => panic!("expected Unresolvable, got {other:?}"),
            }
        }

        #[test]
        fn charged_cyclopentadienyl_resolves() {
            let table = ValenceTable::default();
            let mut graph = MolecularGraph::new();
            // [cH-]1cccc1: the anionic carbon is already complete.
            let mut anion = aromatic_carbon(1);
            anion.formal_charge = -1;
            let c0 = graph.add_atom(anion);
            let rest: Vec<AtomId> = (0..4).map(|_| graph.add_atom(aromatic_carbon(1))).collect();
            let mut atoms = vec![c0];
            atoms.extend(rest);
            ambiguous_ring(&mut graph, &atoms);

            BondOrderResolver::new(&table)
                .decide_bond_orders(&mut graph, true)
                .unwrap();
            assert_eq!(double_count(&graph), 2);
            for &index in graph.incident_bonds(c0).unwrap() {
                assert_eq!(graph.bond(index).unwrap().order, Some(BondOrder::Single));
            }
        }

        #[test]
        fn resolving_twice_gives_identical_saturated_results() {
            let table = ValenceTable::default();
            let resolver = BondOrderResolver::new(&table);
            let mut graph = benzene();

            resolver.decide_bond_orders(&mut graph, true).unwrap();
            let first = orders(&graph);
            let checker = SaturationChecker::new(&table);
            assert!(checker.all_saturated(&graph));

            resolver.decide_bond_orders(&mut graph, true).unwrap();
            assert_eq!(orders(&graph), first);
            assert!(checker.all_saturated(&graph));
        }
    }

    mod chains {
        use super::*;

        fn sp2_chain_carbon(hydrogens: u8) -> Atom {
            let mut atom = Atom::new("C");
            atom.hybridization = Some(Hybridization::Sp2);
            atom.implicit_hydrogens = Some(hydrogens);
            atom
        }

        #[test]
        fn single_atom_graph_is_untouched() {
            let table = ValenceTable::default();
            let mut graph = MolecularGraph::new();
            graph.add_atom(Atom::new("C"));

            BondOrderResolver::new(&table)
                .decide_bond_orders(&mut graph, true)
                .unwrap();
            assert_eq!(graph.bond_count(), 0);
        }

        #[test]
        fn open_chain_butadiene_alternates_without_any_ring() {
            let table = ValenceTable::default();
            let mut graph = MolecularGraph::new();
            let a0 = graph.add_atom(sp2_chain_carbon(2));
            let a1 = graph.add_atom(sp2_chain_carbon(1));
            let a2 = graph.add_atom(sp2_chain_carbon(1));
            let a3 = graph.add_atom(sp2_chain_carbon(2));
            ambiguous_chain_bond(&mut graph, a0, a1);
            ambiguous_chain_bond(&mut graph, a1, a2);
            ambiguous_chain_bond(&mut graph, a2, a3);

            BondOrderResolver::new(&table)
                .decide_bond_orders(&mut graph, true)
                .unwrap();
            assert_eq!(
                orders(&graph),
                vec![
                    Some(BondOrder::Double),
                    Some(BondOrder::Single),
                    Some(BondOrder::Double),
                ]
            );
        }

        #[test]
        fn saturate_resolves_order_less_chain_to_a_triple() {
            let table = ValenceTable::default();
            let mut graph = MolecularGraph::new();
            let mut methine = Atom::new("C");
            methine.implicit_hydrogens = Some(1);
            let a = graph.add_atom(methine.clone());
            let b = graph.add_atom(methine);
            graph.add_bond(a, b, None).unwrap();

            BondOrderResolver::new(&table).saturate(&mut graph).unwrap();
            assert_eq!(orders(&graph), vec![Some(BondOrder::Triple)]);
        }

        #[test]
        fn cumulated_diene_center_takes_two_doubles() {
            let table = ValenceTable::default();
            let mut graph = MolecularGraph::new();
            let mut terminal = Atom::new("C");
            terminal.implicit_hydrogens = Some(2);
            let mut center = Atom::new("C");
            center.implicit_hydrogens = Some(0);
            let a = graph.add_atom(terminal.clone());
            let m = graph.add_atom(center);
            let b = graph.add_atom(terminal);
            graph.add_bond(a, m, None).unwrap();
            graph.add_bond(m, b, None).unwrap();

            BondOrderResolver::new(&table).saturate(&mut graph).unwrap();
            assert_eq!(
                orders(&graph),
                vec![Some(BondOrder::Double), Some(BondOrder::Double)]
            );
        }

        #[test]
        fn unknown_hydrogen_counts_bound_but_never_force() {
            let table = ValenceTable::default();
            let mut graph = MolecularGraph::new();
            // Raw connectivity only: no hydrogen counts anywhere. The
            // oxygen caps the bond at a double; the carbon's leftover is
            // for the hydrogen adder, not the resolver.
            let c = graph.add_atom(Atom::new("C"));
            let o = graph.add_atom(Atom::new("O"));
            graph.add_bond(c, o, None).unwrap();

            BondOrderResolver::new(&table).saturate(&mut graph).unwrap();
            assert_eq!(orders(&graph), vec![Some(BondOrder::Double)]);
        }

        #[test]
        fn flagged_ring_system_bond_never_becomes_triple() {
            let table = ValenceTable::default();
            let mut graph = MolecularGraph::new();
            // Two bare aromatic carbons would each need two extra units,
            // which a single-or-double bond cannot supply.
            let mut bare = Atom::new("C");
            bare.implicit_hydrogens = Some(0);
            bare.is_aromatic = true;
            let a = graph.add_atom(bare.clone());
            let b = graph.add_atom(bare);
            ambiguous_chain_bond(&mut graph, a, b);

            assert!(matches!(
                BondOrderResolver::new(&table).decide_bond_orders(&mut graph, true),
                Err(EngineError::Unresolvable { .. })
            ));
        }

        #[test]
        fn unknown_elements_default_to_single_bonds() {
            let table = ValenceTable::default();
            let mut graph = MolecularGraph::new();
            let a = graph.add_atom(Atom::new("Fe"));
            let b = graph.add_atom(Atom::new("Fe"));
            ambiguous_chain_bond(&mut graph, a, b);

            BondOrderResolver::new(&table)
                .decide_bond_orders(&mut graph, true)
                .unwrap();
            assert_eq!(orders(&graph), vec![Some(BondOrder::Single)]);
        }

        #[test]
        fn pseudo_atom_bonds_resolve_without_a_table_lookup() {
            let table = ValenceTable::empty();
            let mut graph = MolecularGraph::new();
            let a = graph.add_atom(Atom::pseudo("R1"));
            let b = graph.add_atom(Atom::pseudo("R2"));
            ambiguous_chain_bond(&mut graph, a, b);

            BondOrderResolver::new(&table)
                .decide_bond_orders(&mut graph, true)
                .unwrap();
            assert_eq!(orders(&graph), vec![Some(BondOrder::Single)]);
        }
    }

    mod search_behavior {
        use super::*;

        /// p-quinodimethane: an ambiguous ring with two exocyclic CH2
        /// groups. Only the quinoid assignment (both exocyclic bonds
        /// double) satisfies every atom.
        fn para_quinodimethane() -> (MolecularGraph, [BondIndex; 2], RingSet) {
            let mut graph = MolecularGraph::new();
            let ring: Vec<AtomId> = (0..6)
                .map(|i| {
                    let hydrogens = if i == 0 || i == 3 { 0 } else { 1 };
                    graph.add_atom(aromatic_carbon(hydrogens))
                })
                .collect();
            let ring_bonds = ambiguous_ring(&mut graph, &ring);

            let mut methylene = Atom::new("C");
            methylene.hybridization = Some(Hybridization::Sp2);
            methylene.implicit_hydrogens = Some(2);
            let x0 = graph.add_atom(methylene.clone());
            let x3 = graph.add_atom(methylene);
            let exo0 = ambiguous_chain_bond(&mut graph, ring[0], x0);
            let exo3 = ambiguous_chain_bond(&mut graph, ring[3], x3);

            let rings = RingSet::new(vec![Ring::new(ring, ring_bonds)]);
            (graph, [exo0, exo3], rings)
        }

        #[test]
        fn exocyclic_bonds_branch_first_and_shrink_the_search() {
            let table = ValenceTable::default();
            let (mut graph, exo, rings) = para_quinodimethane();

            BondOrderResolver::new(&table)
                .with_rings(&rings)
                .resolve(
                    &mut graph,
                    &ResolutionConfig::new().with_max_decisions(Some(2)),
                )
                .unwrap();

            assert_eq!(graph.bond(exo[0]).unwrap().order, Some(BondOrder::Double));
            assert_eq!(graph.bond(exo[1]).unwrap().order, Some(BondOrder::Double));
            assert_eq!(double_count(&graph), 4);
        }

        #[test]
        fn ring_first_ordering_needs_a_larger_budget_here() {
            let table = ValenceTable::default();
            let (mut graph, _, rings) = para_quinodimethane();

            let err = BondOrderResolver::new(&table)
                .with_rings(&rings)
                .resolve(
                    &mut graph,
                    &ResolutionConfig::new()
                        .with_exocyclic_first(false)
                        .with_max_decisions(Some(2)),
                )
                .unwrap_err();
            assert_eq!(err, EngineError::BudgetExhausted { decisions: 2 });
        }

        #[test]
        fn benzene_needs_exactly_one_branching_decision() {
            let table = ValenceTable::default();
            let mut graph = benzene();
            assert!(matches!(
                BondOrderResolver::new(&table).resolve(
                    &mut graph,
                    &ResolutionConfig::new().with_max_decisions(Some(0)),
                ),
                Err(EngineError::BudgetExhausted { .. })
            ));

            let mut graph = benzene();
            BondOrderResolver::new(&table)
                .resolve(
                    &mut graph,
                    &ResolutionConfig::new().with_max_decisions(Some(1)),
                )
                .unwrap();
        }

        /// Linearly fused aromatic rings (an acene), built as a ladder:
        /// two rows of `2 * rings + 1` carbons plus a rung bond at every
        /// even column.
        fn linear_acene(rings: usize) -> MolecularGraph {
            let mut graph = MolecularGraph::new();
            let cols = 2 * rings + 1;
            let row = |graph: &mut MolecularGraph| -> Vec<AtomId> {
                (0..cols)
                    .map(|i| {
                        let fused = i % 2 == 0 && i != 0 && i != cols - 1;
                        graph.add_atom(aromatic_carbon(if fused { 0 } else { 1 }))
                    })
                    .collect()
            };
            let top = row(&mut graph);
            let bottom = row(&mut graph);
            for i in 0..cols - 1 {
                ambiguous_chain_bond(&mut graph, top[i], top[i + 1]);
                ambiguous_chain_bond(&mut graph, bottom[i], bottom[i + 1]);
            }
            for i in (0..cols).step_by(2) {
                ambiguous_chain_bond(&mut graph, top[i], bottom[i]);
            }
            graph
        }

        #[test]
        fn large_fused_ring_system_resolves_deterministically() {
            let table = ValenceTable::default();
            let resolver = BondOrderResolver::new(&table);

            let mut first = linear_acene(23);
            resolver.decide_bond_orders(&mut first, true).unwrap();
            // A perfect matching over all 4 * 23 + 2 carbons.
            assert_eq!(double_count(&first), 2 * 23 + 1);

            let mut second = linear_acene(23);
            resolver.decide_bond_orders(&mut second, true).unwrap();
            assert_eq!(orders(&first), orders(&second));

            let checker = SaturationChecker::new(&table);
            assert!(checker.all_saturated(&first));
        }

        #[test]
        fn anthracene_sized_system_matches_the_known_count() {
            let table = ValenceTable::default();
            let mut graph = linear_acene(3);
            BondOrderResolver::new(&table)
                .decide_bond_orders(&mut graph, true)
                .unwrap();
            assert_eq!(double_count(&graph), 7);
        }
    }
}
