use super::ids::AtomId;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum BondOrder {
    Single = 1,
    Double = 2,
    Triple = 3,
}

impl BondOrder {
    /// The contribution of this order to an atom's bond order sum.
    pub fn value(self) -> u8 {
        self as u8
    }
}

impl Default for BondOrder {
    fn default() -> Self {
        BondOrder::Single
    }
}

#[derive(Debug, Error)]
#[error("Invalid bond order string")]
pub struct ParseBondOrderError;

impl FromStr for BondOrder {
    type Err = ParseBondOrderError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "1" | "s" | "single" => Ok(Self::Single),
            "2" | "d" | "double" => Ok(Self::Double),
            "3" | "t" | "triple" => Ok(Self::Triple),
            _ => Err(ParseBondOrderError),
        }
    }
}

impl fmt::Display for BondOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Single => "Single",
                Self::Double => "Double",
                Self::Triple => "Triple",
            }
        )
    }
}

/// A bond between two atoms.
///
/// The order is `None` while the bond is still unresolved (an upstream
/// parser knew the connectivity but not the order). Aromaticity and
/// single-or-double ambiguity are flags rather than order variants: a
/// resolved aromatic bond keeps its flag but carries a concrete Kekulé
/// order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Bond {
    pub atom1_id: AtomId,
    pub atom2_id: AtomId,
    /// Concrete order, or `None` while undecided.
    pub order: Option<BondOrder>,
    /// Part of an aromatic ring system.
    pub is_aromatic: bool,
    /// Marked by the parser as "single or double, to be decided".
    pub single_or_double: bool,
}

impl Bond {
    pub fn new(atom1_id: AtomId, atom2_id: AtomId, order: Option<BondOrder>) -> Self {
        Self {
            atom1_id,
            atom2_id,
            order,
            is_aromatic: false,
            single_or_double: false,
        }
    }

    pub fn contains(&self, atom_id: AtomId) -> bool {
        self.atom1_id == atom_id || self.atom2_id == atom_id
    }

    /// The endpoint of this bond that is not `atom_id`.
    ///
    /// Returns `None` when `atom_id` is not an endpoint at all.
    pub fn partner(&self, atom_id: AtomId) -> Option<AtomId> {
        if self.atom1_id == atom_id {
            Some(self.atom2_id)
        } else if self.atom2_id == atom_id {
            Some(self.atom1_id)
        } else {
            None
        }
    }

    /// The contribution of this bond to an atom's bond order sum.
    ///
    /// An undecided bond still connects two atoms, so it contributes at
    /// least a single bond.
    pub fn order_contribution(&self) -> u8 {
        self.order.map_or(1, BondOrder::value)
    }
}
