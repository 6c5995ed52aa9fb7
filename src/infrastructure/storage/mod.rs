mod core;
mod fs_store;
mod s3_store;
mod timeout;

pub use core::*;
pub use fs_store::FsObjectStore;
pub use s3_store::S3ObjectStore;
pub use timeout::TimeoutObjectStore;
