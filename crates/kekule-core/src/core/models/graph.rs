use super::atom::Atom;
use super::bond::{Bond, BondOrder};
use super::ids::{AtomId, BondIndex};
use slotmap::{SecondaryMap, SlotMap};

/// Represents a molecular graph of atoms and bonds.
///
/// This struct serves as the central data structure of the library. Atoms
/// live in a slot map for stable IDs; bonds live in a vector so that their
/// insertion order is preserved (parsers and tests refer to bonds by
/// index). An adjacency cache maps each atom to the indices of its
/// incident bonds.
///
/// The graph is created by an external parser with partial state (bond
/// orders possibly unset, hydrogen counts possibly unknown) and mutated in
/// place by the engine towards a fully resolved structure.
#[derive(Debug, Clone, Default)]
pub struct MolecularGraph {
    /// Primary storage for atoms using a slot map for efficient ID management.
    atoms: SlotMap<AtomId, Atom>,
    /// All bonds in the graph, in insertion order.
    bonds: Vec<Bond>,
    /// Cached incident-bond indices per atom.
    adjacency: SecondaryMap<AtomId, Vec<BondIndex>>,
}

impl MolecularGraph {
    /// Creates a new, empty molecular graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an atom to the graph.
    ///
    /// # Arguments
    ///
    /// * `atom` - The atom to add.
    ///
    /// # Return
    ///
    /// The ID assigned to the new atom.
    pub fn add_atom(&mut self, atom: Atom) -> AtomId {
        let atom_id = self.atoms.insert(atom);
        self.adjacency.insert(atom_id, Vec::new());
        atom_id
    }

    /// Retrieves an immutable reference to an atom by its ID.
    ///
    /// # Return
    ///
    /// Returns `Some(&Atom)` if the atom exists, otherwise `None`.
    pub fn atom(&self, id: AtomId) -> Option<&Atom> {
        self.atoms.get(id)
    }

    /// Retrieves a mutable reference to an atom by its ID.
    ///
    /// # Return
    ///
    /// Returns `Some(&mut Atom)` if the atom exists, otherwise `None`.
    pub fn atom_mut(&mut self, id: AtomId) -> Option<&mut Atom> {
        self.atoms.get_mut(id)
    }

    /// Returns whether the given atom ID belongs to this graph.
    pub fn contains_atom(&self, id: AtomId) -> bool {
        self.atoms.contains_key(id)
    }

    /// Returns an iterator over all atoms in the graph.
    ///
    /// # Return
    ///
    /// An iterator yielding `(AtomId, &Atom)` pairs in insertion order.
    pub fn atoms_iter(&self) -> impl Iterator<Item = (AtomId, &Atom)> {
        self.atoms.iter()
    }

    /// Returns a mutable iterator over all atoms in the graph.
    pub fn atoms_iter_mut(&mut self) -> impl Iterator<Item = (AtomId, &mut Atom)> {
        self.atoms.iter_mut()
    }

    /// Returns the number of atoms in the graph.
    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    /// Adds a bond between two atoms.
    ///
    /// This method is idempotent with respect to connectivity; adding a
    /// bond between two already-bonded atoms returns the existing bond
    /// index without creating a duplicate.
    ///
    /// # Arguments
    ///
    /// * `atom1_id` - ID of the first atom.
    /// * `atom2_id` - ID of the second atom.
    /// * `order` - The order of the bond, or `None` if not yet decided.
    ///
    /// # Return
    ///
    /// Returns `Some(BondIndex)` if successful, otherwise `None` (e.g., if
    /// either atom does not exist).
    pub fn add_bond(
        &mut self,
        atom1_id: AtomId,
        atom2_id: AtomId,
        order: Option<BondOrder>,
    ) -> Option<BondIndex> {
        if !self.atoms.contains_key(atom1_id) || !self.atoms.contains_key(atom2_id) {
            return None;
        }

        if let Some(existing) = self.bond_between(atom1_id, atom2_id) {
            return Some(existing);
        }

        let index = self.bonds.len();
        self.bonds.push(Bond::new(atom1_id, atom2_id, order));
        self.adjacency[atom1_id].push(index);
        self.adjacency[atom2_id].push(index);
        Some(index)
    }

    /// Retrieves an immutable reference to a bond by its index.
    pub fn bond(&self, index: BondIndex) -> Option<&Bond> {
        self.bonds.get(index)
    }

    /// Retrieves a mutable reference to a bond by its index.
    pub fn bond_mut(&mut self, index: BondIndex) -> Option<&mut Bond> {
        self.bonds.get_mut(index)
    }

    /// Returns a slice of all bonds in the graph.
    pub fn bonds(&self) -> &[Bond] {
        &self.bonds
    }

    /// Returns the number of bonds in the graph.
    pub fn bond_count(&self) -> usize {
        self.bonds.len()
    }

    /// Finds the bond connecting two atoms, if any.
    ///
    /// # Return
    ///
    /// Returns `Some(BondIndex)` if the atoms are directly bonded,
    /// otherwise `None`.
    pub fn bond_between(&self, atom1_id: AtomId, atom2_id: AtomId) -> Option<BondIndex> {
        let incident = self.adjacency.get(atom1_id)?;
        incident
            .iter()
            .copied()
            .find(|&i| self.bonds[i].contains(atom2_id))
    }

    /// Retrieves the indices of the bonds incident to an atom.
    ///
    /// # Return
    ///
    /// Returns `Some(&[BondIndex])` if the atom exists, otherwise `None`.
    pub fn incident_bonds(&self, atom_id: AtomId) -> Option<&[BondIndex]> {
        self.adjacency.get(atom_id).map(|v| v.as_slice())
    }

    /// Retrieves the bonded neighbors of an atom.
    ///
    /// # Return
    ///
    /// Returns `Some(Vec<AtomId>)` if the atom exists, otherwise `None`.
    pub fn bonded_neighbors(&self, atom_id: AtomId) -> Option<Vec<AtomId>> {
        let incident = self.adjacency.get(atom_id)?;
        Some(
            incident
                .iter()
                .filter_map(|&i| self.bonds[i].partner(atom_id))
                .collect(),
        )
    }

    /// Returns the number of bonds incident to an atom.
    pub fn degree(&self, atom_id: AtomId) -> usize {
        self.adjacency.get(atom_id).map_or(0, |v| v.len())
    }

    /// Sums the order contributions of all bonds incident to an atom.
    ///
    /// Undecided bonds contribute a single bond each; see
    /// [`Bond::order_contribution`].
    pub fn bond_order_sum(&self, atom_id: AtomId) -> u32 {
        self.adjacency.get(atom_id).map_or(0, |incident| {
            incident
                .iter()
                .map(|&i| u32::from(self.bonds[i].order_contribution()))
                .sum()
        })
    }

    /// Returns the highest concrete order among an atom's bonds.
    ///
    /// # Return
    ///
    /// Returns `None` when the atom has no bonds with a decided order.
    pub fn maximum_bond_order(&self, atom_id: AtomId) -> Option<BondOrder> {
        self.adjacency
            .get(atom_id)?
            .iter()
            .filter_map(|&i| self.bonds[i].order)
            .max()
    }
}
