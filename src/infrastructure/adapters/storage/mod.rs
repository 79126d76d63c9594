//! Storage Adapter - 运行产物存储

mod file_storage;

pub use file_storage::FileRunStorage;
