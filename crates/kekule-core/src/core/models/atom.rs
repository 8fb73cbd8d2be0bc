use std::str::FromStr;

/// Distinguishes real chemical elements from pseudo-atoms.
///
/// Pseudo-atoms (attachment points, R-groups, "any" atoms from query
/// formats) carry no element identity, so valence accounting cannot apply
/// to them. All saturation and hydrogen logic pattern-matches on this kind
/// and passes pseudo-atoms through untouched, never attempting a valence
/// table lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum AtomKind {
    /// A real chemical element, identified by the atom's symbol.
    #[default]
    Element,
    /// A placeholder with no element identity (R-group, attachment point).
    Pseudo,
}

/// Orbital hybridization of an atom, when known.
///
/// Supplied by an upstream perception step. The resolver uses it to bound
/// how much extra bond order an atom may accept: an `Sp3` atom takes no
/// double bonds, an `Sp2` atom at most one, an `Sp` atom up to two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hybridization {
    /// Pure s orbital (e.g. a lone hydrogen).
    S,
    /// sp, linear.
    Sp,
    /// sp2, trigonal planar.
    Sp2,
    /// sp3, tetrahedral.
    Sp3,
    /// sp3d, trigonal bipyramidal.
    Sp3d,
    /// sp3d2, octahedral.
    Sp3d2,
}

/// Represents an atom in a molecular graph.
///
/// This struct carries the partial state produced by an upstream parser:
/// the bond-order resolver and hydrogen adder mutate it in place towards a
/// fully resolved structure. `implicit_hydrogens` and `hybridization` use
/// `Option` because "not yet known" is a meaningful parser output distinct
/// from zero.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// The element symbol (e.g. "C", "N", "Cl"), or a free-form label for
    /// pseudo-atoms.
    pub symbol: String,
    /// Whether this is a real element or a pseudo-atom.
    pub kind: AtomKind,
    /// Formal charge in elementary charge units.
    pub formal_charge: i8,
    /// Orbital hybridization, if perceived upstream.
    pub hybridization: Option<Hybridization>,
    /// Number of implicit (unrepresented) hydrogens; `None` = not yet known.
    pub implicit_hydrogens: Option<u8>,
    /// Number of unpaired electrons (0 for closed-shell atoms).
    pub unpaired_electrons: u8,
    /// Whether the atom is part of an aromatic system.
    pub is_aromatic: bool,
    /// Whether the atom touches at least one ambiguous (single-or-double) bond.
    pub single_or_double: bool,
}

impl Atom {
    /// Creates a new element atom with default values for most fields.
    ///
    /// The atom starts neutral, closed-shell, with unknown hybridization
    /// and an unknown implicit hydrogen count.
    ///
    /// # Arguments
    ///
    /// * `symbol` - The element symbol.
    pub fn new(symbol: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            kind: AtomKind::Element,
            formal_charge: 0,
            hybridization: None,
            implicit_hydrogens: None,
            unpaired_electrons: 0,
            is_aromatic: false,
            single_or_double: false,
        }
    }

    /// Creates a new pseudo-atom with the given label.
    ///
    /// # Arguments
    ///
    /// * `label` - A free-form label (e.g. "R1", "*").
    pub fn pseudo(label: &str) -> Self {
        Self {
            kind: AtomKind::Pseudo,
            ..Self::new(label)
        }
    }
}

impl FromStr for Hybridization {
    type Err = ();

    /// Parses a string into a `Hybridization`.
    ///
    /// Case-insensitive; accepts the common textual spellings found in
    /// structure file formats ("sp2", "SP3D2", "s").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "s" => Ok(Hybridization::S),
            "sp" | "sp1" => Ok(Hybridization::Sp),
            "sp2" => Ok(Hybridization::Sp2),
            "sp3" => Ok(Hybridization::Sp3),
            "sp3d" => Ok(Hybridization::Sp3d),
            "sp3d2" => Ok(Hybridization::Sp3d2),
            _ => Err(()),
        }
    }
}
