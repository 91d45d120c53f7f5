//! Outer surfaces: flat-file dumps of the ledger.

pub mod dump;
