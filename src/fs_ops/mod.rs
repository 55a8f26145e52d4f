//! Filesystem operations on [`SuperPath`](crate::SuperPath): traversal,
//! collision-free naming, moves, deletes, archives and temp lifecycle.

mod archive;
mod copy;
mod duplicate;
mod entry;
mod find;
pub mod helpers;
mod metadata;
mod remove;
mod rename;
mod temp;
mod util;

pub use archive::{ArchiveFormat, UnpackOptions};
pub use copy::move_across_devices;
pub use find::{Find, FindIntoIter, FindIter};
pub use remove::RmtreeOptions;
pub use temp::{TempOptions, TempPath};
