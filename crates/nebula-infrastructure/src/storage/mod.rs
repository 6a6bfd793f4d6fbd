//! Storage layer: key-value stores and configuration files.

mod config_storage;
mod json_file_store;
mod memory_store;
mod secret_storage;

pub use config_storage::ConfigStorage;
pub use json_file_store::JsonFileStore;
pub use memory_store::MemoryStore;
pub use secret_storage::{SecretStorage, SecretStorageError};
