pub mod backing_store;
pub mod file;
pub mod memory;
pub mod message;
pub mod topic;

pub use backing_store::BackingStore;
pub use file::FileBackingStore;
pub use memory::MemoryBackingStore;
pub use message::StoredMessage;
