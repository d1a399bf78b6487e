// src/infrastructure/mod.rs
pub mod config;
pub mod file_writer;
pub mod markdown;
pub mod remote_snapshot;
pub mod tag_index;

pub use remote_snapshot::RemoteSnapshot;
pub use tag_index::TagIndex;
