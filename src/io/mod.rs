//! Reading the source table from disk.
//!
//! - [`table`] parses a delimited file with a header row into a [`Table`](crate::Table).
//! - [`compression`] transparently decompresses `.gz`/`.zst`/`.bz2`/`.xz` sources
//!   (each behind its `compression-*` feature).

pub mod compression;
pub mod table;
