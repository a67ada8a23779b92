//! Infrastructure Layer
//!
//! Object store backends, the repositories built on them, and the bounded
//! in-memory session store.

pub mod backend;
pub mod blob;
pub mod kv;
pub mod local_fs;
pub mod memory_session;
pub mod object_store;

pub use backend::{SessionBackend, StorageBackend};
pub use object_store::{ObjectStore, StorageError};
