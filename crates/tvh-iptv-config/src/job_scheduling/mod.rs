//! Periodic timers driving the reconciliation core
//!
//! - mux publishing: reload cached playlist listings, then reconcile muxes
//! - service mapping: map all services to channels, then remove
//!   placeholder-named channels

pub mod scheduler;

pub use scheduler::SyncScheduler;
