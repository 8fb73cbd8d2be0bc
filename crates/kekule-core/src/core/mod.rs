//! # Core Module
//!
//! This module provides the stateless building blocks for Kekulé bond
//! order resolution: the molecular graph models, the valence capacity
//! table, and the ring-membership types used to steer the search.
//!
//! ## Architecture
//!
//! - **Molecular Representation** ([`models`]) - Atoms, bonds, and the
//!   graph with its adjacency caches
//! - **Valence Knowledge** ([`valence`]) - (element, charge) → legal
//!   bonding capacities, builtin or loaded from TOML
//! - **Ring Membership** ([`rings`]) - caller-supplied smallest-ring sets,
//!   consumed only as a branching-order hint
//!
//! Everything in this layer is plain data with no resolution logic; the
//! [`engine`](crate::engine) layer consumes it.

pub mod models;
pub mod rings;
pub mod valence;
