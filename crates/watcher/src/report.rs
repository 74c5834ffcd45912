//! Flush reports

use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Paths that changed since the previous flush, in table order
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Report {
    paths: Vec<PathBuf>,
}

impl Report {
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub(crate) fn push(&mut self, path: PathBuf) {
        self.paths.push(path);
    }
}

/// Write `path` as one line, byte for byte as given, and flush
pub fn write_line<W: Write + ?Sized>(out: &mut W, path: &Path) -> io::Result<()> {
    write_path(out, path)?;
    out.write_all(b"\n")?;
    out.flush()
}

#[cfg(unix)]
fn write_path<W: Write + ?Sized>(out: &mut W, path: &Path) -> io::Result<()> {
    use std::os::unix::ffi::OsStrExt;

    out.write_all(path.as_os_str().as_bytes())
}

#[cfg(not(unix))]
fn write_path<W: Write + ?Sized>(out: &mut W, path: &Path) -> io::Result<()> {
    write!(out, "{}", path.display())
}
