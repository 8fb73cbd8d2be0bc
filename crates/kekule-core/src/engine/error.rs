use thiserror::Error;

use crate::core::models::ids::{AtomId, BondIndex};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Atom {atom:?} is not part of the graph")]
    AtomNotFound { atom: AtomId },

    #[error("No valence entry for element '{symbol}' with formal charge {charge}")]
    UnknownValence { symbol: String, charge: i8 },

    #[error(
        "No consistent bond order assignment exists (stuck at bond {bond:?}, atom {atom:?})"
    )]
    Unresolvable {
        bond: Option<BondIndex>,
        atom: Option<AtomId>,
    },

    #[error("Bond order search exceeded the decision budget of {decisions}")]
    BudgetExhausted { decisions: u64 },
}
