//! Core import/export pipeline - framework-agnostic codec, archive, validation and
//! persistence logic. The HTTP layer only calls into [`catalog`].

/// ZIP bundle extraction and packaging
pub mod archive;
/// End-to-end import and export flows
pub mod catalog;
/// Row ⇄ record conversion
pub mod codec;
/// Transactional access to the `prices` table
pub mod gateway;
/// Import summary → JSON payload
pub mod summary;
/// CSV table reading and writing
pub mod table;
