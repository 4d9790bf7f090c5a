//! Writing the rendered table to disk.

use std::{
  fs,
  path::{Path, PathBuf},
};

use crate::{Error, Result};

/// Write `contents` to `path` via a sibling temporary file and a rename, so
/// the destination either holds the whole report or is left untouched.
pub fn write_atomic(path: impl AsRef<Path>, contents: &str) -> Result<()> {
  let path = path.as_ref();
  let tmp = temp_sibling(path);
  let io_err = |source| Error::Io { path: path.to_path_buf(), source };

  if let Err(e) = fs::write(&tmp, contents) {
    fs::remove_file(&tmp).ok();
    return Err(io_err(e));
  }
  fs::rename(&tmp, path).map_err(|e| {
    fs::remove_file(&tmp).ok();
    io_err(e)
  })
}

fn temp_sibling(path: &Path) -> PathBuf {
  let name = path
    .file_name()
    .map(|n| n.to_string_lossy().into_owned())
    .unwrap_or_else(|| "report".to_owned());
  path.with_file_name(format!(".{name}.tmp"))
}
