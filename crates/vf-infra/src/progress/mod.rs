mod file_store;
mod memory_store;

pub use file_store::{FileProgressStore, DEFAULT_PROGRESS_DIR};
pub use memory_store::InMemoryProgressStore;
