//! Building energy models described by IDD schemas, their translation to and from EnergyPlus
//! input files, and a project database for recording analyses of them.
#![warn(missing_docs)]
pub mod cli;
pub mod energyplus;
pub mod handle;
pub mod idd;
pub mod idf;
pub mod log;
pub mod model;
pub mod project;
pub mod settings;

#[cfg(test)]
mod fixture;
