//! Storage Adapter - 输出文件存储实现

mod file_storage;

pub use file_storage::FileOutputStorage;
