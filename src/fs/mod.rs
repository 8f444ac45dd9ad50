//! Filesystem facade consumed by the script engine.
//!
//! This module provides the per-plugin [`PluginFileSystem`] together with the
//! value types its operations hand out:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Module Access Flow                       │
//! ├─────────────────────────────────────────────────────────────┤
//! │                                                             │
//! │  &str ──► parse_path() ──► VirtualPath                      │
//! │                               │                             │
//! │           check_access() ─────┤                             │
//! │                               │                             │
//! │           new_byte_channel() ─┼─► Disk        ──► File      │
//! │           new_reader()        ├─► InnerModule ──► cache     │
//! │                               └─► HostClass   ──► exporter  │
//! │                                                             │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod attributes;
mod channel;
mod dir;
mod facade;

pub use channel::{ByteChannel, ModuleReader, OpenOptions};
pub use dir::{DirFilter, DirectoryStream};
pub use facade::PluginFileSystem;
