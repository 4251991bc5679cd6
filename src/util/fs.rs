use std::io;
use std::path::Path;

use tempfile::{Builder, NamedTempFile};

use crate::util::path::get_file_name;

/// Creates a uniquely named `.name.XXXXXX.part` file beside `destination`.
/// Dropping it without [`commit`] removes it again.
pub fn staging_file(destination: &Path) -> io::Result<NamedTempFile> {
    let dir = match destination.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    Builder::new()
        .prefix(&format!(".{}.", get_file_name(destination)))
        .suffix(".part")
        .tempfile_in(dir)
}

/// Renames the staged file over `destination`.
pub fn commit(staged: NamedTempFile, destination: &Path) -> io::Result<()> {
    staged
        .persist(destination)
        .map(|_| ())
        .map_err(|e| e.error)
}
