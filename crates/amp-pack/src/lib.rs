//! Turning a walked file list into something a package manager can install.
//!
//! - [`materialize`] writes [`FileEntry`](amp_tree::FileEntry) values into a
//!   fresh temp directory under a single `package/` root.
//! - [`archive`] packs that directory into `package.tgz` beside it.
//!
//! Both return scoped handles. Dropping a handle removes its temp directory;
//! [`release`](MaterializedPackage::release) does the same explicitly and
//! reports failures. Calling it more than once is a no-op.

pub mod archive;
pub mod config;
pub mod error;
pub mod materialize;

pub use archive::{archive, read_entries, ArchiveHandle, ARCHIVE_NAME};
pub use config::{PackConfig, DEFAULT_MODE, DEFAULT_TEMP_PREFIX};
pub use error::{PackError, PackResult};
pub use materialize::{materialize, MaterializedPackage, PACKAGE_DIR};
