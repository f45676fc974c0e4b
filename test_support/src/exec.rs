//! Helpers for writing executable stubs in tests.

use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// Write `script` to `root/name` and mark it executable.
///
/// # Errors
///
/// Returns an error when the file cannot be written or its permissions set.
pub fn write_script(root: &Utf8Path, name: &str, script: &str) -> Result<Utf8PathBuf> {
    let path = root.join(name);
    fs::write(path.as_std_path(), script).with_context(|| format!("write script {path}"))?;
    make_executable(&path)?;
    Ok(path)
}

/// Mark an existing file as executable on Unix; no-op elsewhere.
///
/// # Errors
///
/// Returns an error when the file's metadata cannot be read or updated.
pub fn make_executable(path: &Utf8Path) -> Result<()> {
    #[cfg(unix)]
    {
        let mut perms = fs::metadata(path.as_std_path())
            .with_context(|| format!("stat {path}"))?
            .permissions();
        perms.set_mode(0o755);
        fs::set_permissions(path.as_std_path(), perms).with_context(|| format!("chmod {path}"))?;
    }

    #[cfg(not(unix))]
    let _ = path;

    Ok(())
}
