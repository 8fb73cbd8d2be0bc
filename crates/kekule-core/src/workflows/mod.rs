//! # Workflows Module
//!
//! The user-facing layer: complete procedures tying the engine components
//! together. [`saturate::run`] is the one-call entry point that resolves
//! every ambiguous bond and then fills in implicit hydrogens.

pub mod saturate;
