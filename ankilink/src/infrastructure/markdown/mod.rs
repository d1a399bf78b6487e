pub mod block_scanner;

pub use block_scanner::{scan_blocks, ScannedBlock};
