use phf::{Map, phf_map};

/// Bonding capacities of the neutral main-group elements, ascending.
///
/// Multi-valent elements list every legal capacity (sulfur can bond as a
/// sulfide, a sulfoxide, or a sulfone). Metals that only occur in salt
/// form carry their covalent single-bond capacity; their ionic forms are
/// listed in [`CHARGED_CAPACITIES`].
pub(super) static NEUTRAL_CAPACITIES: Map<&'static str, &'static [u8]> = phf_map! {
    "H" => &[1],
    "Li" => &[1],
    "Be" => &[2],
    "B" => &[3],
    "C" => &[4],
    "N" => &[3],
    "O" => &[2],
    "F" => &[1],
    "Na" => &[1],
    "Mg" => &[2],
    "Al" => &[3],
    "Si" => &[4],
    "P" => &[3, 5],
    "S" => &[2, 4, 6],
    "Cl" => &[1],
    "K" => &[1],
    "Ca" => &[2],
    "Ge" => &[4],
    "As" => &[3, 5],
    "Se" => &[2, 4, 6],
    "Br" => &[1],
    "Sn" => &[2, 4],
    "Sb" => &[3, 5],
    "Te" => &[2, 4, 6],
    "I" => &[1, 3, 5, 7],
};

/// Explicit capacities for the common charged forms, keyed by element.
///
/// These override the neutral-capacity-plus-charge fallback where the
/// shifted value would be wrong: a sodium cation bonds to nothing, a
/// protonated hydrogen has no capacity left, an oxide anion holds a single
/// bond.
pub(super) static CHARGED_CAPACITIES: Map<&'static str, &'static [(i8, &'static [u8])]> = phf_map! {
    "H" => &[(1, &[0]), (-1, &[0])],
    "Li" => &[(1, &[0])],
    "B" => &[(-1, &[4])],
    "C" => &[(1, &[3]), (-1, &[3])],
    "N" => &[(1, &[4]), (-1, &[2])],
    "O" => &[(1, &[3]), (-1, &[1])],
    "F" => &[(-1, &[0])],
    "Na" => &[(1, &[0])],
    "Mg" => &[(2, &[0])],
    "P" => &[(1, &[4])],
    "S" => &[(1, &[3]), (-1, &[1])],
    "Cl" => &[(-1, &[0])],
    "K" => &[(1, &[0])],
    "Ca" => &[(2, &[0])],
    "Br" => &[(-1, &[0])],
    "I" => &[(-1, &[0])],
};
