mod memory;
mod sql;
mod store;

pub use memory::MemoryRecordStore;
pub use sql::SqlRecordStore;
pub use store::RecordStore;
