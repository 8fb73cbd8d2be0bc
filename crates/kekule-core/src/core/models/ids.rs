use slotmap::new_key_type;

new_key_type! {
    pub struct AtomId;
}

/// Index of a bond in a graph's bond list.
///
/// Bonds are stored in insertion order and are never removed by this
/// library, so a plain index is a stable handle. Upstream parsers rely on
/// this ordering when they refer to "bond 0", "bond 1", and so on.
pub type BondIndex = usize;
