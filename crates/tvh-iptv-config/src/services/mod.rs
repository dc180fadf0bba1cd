//! The reconciliation core
//!
//! - [`source_diff`] plans a channel's new source list
//! - [`ChannelService`] settles and deletes channels
//! - [`MuxReconciler`] pushes the enabled catalog to Tvheadend
//! - [`SentinelCleanup`] removes placeholder-named Tvheadend channels
//! - [`ChannelSyncService`] serialises all of the above

pub mod channel_service;
pub mod channel_sync;
pub mod mux_reconciler;
pub mod sentinel_cleanup;
pub mod source_diff;

pub use channel_service::ChannelService;
pub use channel_sync::ChannelSyncService;
pub use mux_reconciler::{MuxReconciler, ReconciliationReport};
pub use sentinel_cleanup::SentinelCleanup;
pub use source_diff::{SourceDiff, plan_sources};
