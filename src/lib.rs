//! Evoked response peak extraction for repeated electrophysiology sweeps.
//!
//! Sweeps are averaged, scanned in scheduled windows for local minima and
//! maxima, forced to alternate, and paired into an amplitude table.
pub mod analysis;
pub mod config;
