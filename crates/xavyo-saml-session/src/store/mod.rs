//! Session-scoped storage of suspended requests
//!
//! The browser session owns the authoritative map of pending requests. The
//! [`CorrelationStore`] never keeps a copy: each call reads the map from the
//! [`SessionAttributeStore`], changes it and writes it back.

pub mod attributes;
pub mod correlation;
pub mod handle;
pub mod postgres;

pub use attributes::{InMemorySessionAttributeStore, SessionAttributeStore, StorageError};
pub use correlation::{CorrelationEntries, CorrelationEntry, CorrelationStore};
pub use handle::SessionHandle;
pub use postgres::PostgresSessionAttributeStore;
