// Test Helpers Module
//
// Shared doubles for unit and integration tests.

pub mod memory_store;

pub use memory_store::{InMemoryProbeStore, PRIMARY_ADDRESS, REPLICA_ADDRESS};
