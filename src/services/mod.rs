// src/services/mod.rs - Background service layer
pub mod registry_seed;
pub mod snapshot_writer;
