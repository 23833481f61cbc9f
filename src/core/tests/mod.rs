//! Core module tests
//!
//! Contains test suites for core functionality:
//! - Gesture parsing and canonical rendering
//! - Conflict detection (linear scan and reverse index)
//! - Catalog operations: clones, sharing, restore, dispatch
//! - Script command reconciliation
//! - Property tests for round-trip and symmetry

#[cfg(test)]
mod property_tests;
#[cfg(test)]
mod script_tests;
