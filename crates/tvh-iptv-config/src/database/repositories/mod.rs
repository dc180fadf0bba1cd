//! SeaORM repository implementations
//!
//! Repositories work across SQLite, PostgreSQL, and MySQL. `SeaOrmCatalogStore`
//! composes them behind the `CatalogStore` trait consumed by the services.

pub mod catalog;
pub mod channel;
pub mod epg;
pub mod playlist;
pub mod traits;

// Re-export for convenience
pub use catalog::SeaOrmCatalogStore;
pub use channel::ChannelSeaOrmRepository;
pub use epg::EpgSeaOrmRepository;
pub use playlist::PlaylistSeaOrmRepository;
pub use traits::CatalogStore;
