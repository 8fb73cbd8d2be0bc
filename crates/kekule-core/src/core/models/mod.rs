//! # Core Models Module
//!
//! This module contains the fundamental data structures used to represent
//! partially resolved molecular graphs, providing the foundation for bond
//! order resolution and hydrogen assignment.
//!
//! ## Overview
//!
//! The models module defines the core abstractions for molecular
//! structure as it arrives from an upstream parser: atoms whose
//! hybridization or hydrogen count may still be unknown, bonds whose order
//! may still be undecided, and the graph tying them together. These models
//! are designed to:
//!
//! - **Represent partial knowledge** - `Option` fields for everything a
//!   parser may legitimately not know yet
//! - **Support in-place resolution** - the engine mutates atoms and bonds
//!   towards a terminal, fully decided state
//! - **Maintain stable handles** - slot-map atom IDs and insertion-ordered
//!   bond indices survive all engine passes
//!
//! ## Key Components
//!
//! - [`atom`] - Atom representation with element kind, charge, and flags
//! - [`bond`] - Bond orders and the ambiguity flags driving resolution
//! - [`graph`] - The molecular graph with adjacency and order-sum queries
//! - [`ids`] - Identifier types for atoms and bonds

pub mod atom;
pub mod bond;
pub mod graph;
pub mod ids;
