//! Application layer: the wallet service orchestrating the storage ports
//! and the parallel engine.

pub mod service;
