/// Filesystem transport helpers.
pub mod fs;
