//! Application layer containing the settlement and statistics logic.
//!
//! The calculator and aggregator are pure functions over snapshots. `Ledger`
//! wires them to the store ports and is the entry point used by the CLI.

pub mod calculator;
pub mod ledger;
pub mod stats;
