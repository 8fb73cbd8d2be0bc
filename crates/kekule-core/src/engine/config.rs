/// Configuration for bond order resolution.
///
/// The defaults reproduce the baseline behavior: exocyclic bonds first,
/// only flagged bonds considered ambiguous, unbounded search.
#[derive(Debug, Clone)]
pub struct ResolutionConfig {
    /// Resolve bonds leaving a ring before ring-internal bonds. Exocyclic
    /// bonds are usually forced outright and shrink the in-ring search.
    pub exocyclic_first: bool,
    /// Also treat aromatic-flagged bonds that were never marked
    /// single-or-double as ambiguous (the `saturate` entry point).
    pub include_unflagged_aromatic: bool,
    /// Upper bound on branching decisions before the search gives up with
    /// a budget-exhausted error. `None` searches exhaustively.
    pub max_decisions: Option<u64>,
}

impl Default for ResolutionConfig {
    fn default() -> Self {
        Self {
            exocyclic_first: true,
            include_unflagged_aromatic: false,
            max_decisions: None,
        }
    }
}

impl ResolutionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_exocyclic_first(mut self, enabled: bool) -> Self {
        self.exocyclic_first = enabled;
        self
    }

    pub fn with_unflagged_aromatic(mut self, enabled: bool) -> Self {
        self.include_unflagged_aromatic = enabled;
        self
    }

    pub fn with_max_decisions(mut self, budget: Option<u64>) -> Self {
        self.max_decisions = budget;
        self
    }
}
