//! Shared helpers for binaries and embedders.

pub mod bootstrap;
