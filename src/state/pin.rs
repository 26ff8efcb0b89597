//! The write-once interpreter pin.
//!
//! `<install-root>/.python_cmd` holds one line: the invocation downstream
//! build tooling uses for Python. It is created by the first successful
//! resolution and never rewritten. Absence is checked by the final no-clobber
//! link itself, so two concurrent runs cannot both write it.

use crate::error::Result;
use crate::requirements::Invocation;
use anyhow::Context;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// File name of the pin, relative to the install root.
pub const PIN_FILE: &str = ".python_cmd";

/// What [`write_once`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PinOutcome {
    /// The pin did not exist and now holds `line`.
    Written { path: PathBuf, line: String },
    /// A pin already existed; it was left untouched.
    AlreadyPinned { path: PathBuf, existing: String },
}

impl PinOutcome {
    /// The invocation line the pin holds after the write.
    pub fn line(&self) -> &str {
        match self {
            PinOutcome::Written { line, .. } => line,
            PinOutcome::AlreadyPinned { existing, .. } => existing,
        }
    }
}

/// Location of the pin under `root`.
pub fn pin_path(root: &Path) -> PathBuf {
    root.join(PIN_FILE)
}

/// Write `invocation` to the pin unless one already exists.
///
/// The line is written to a temporary file next to the pin and linked into
/// place without clobbering, so the pin is never observed half-written. A
/// blank pin left by an older interrupted run counts as absent.
pub fn write_once(root: &Path, invocation: &Invocation) -> Result<PinOutcome> {
    fs::create_dir_all(root)
        .with_context(|| format!("Failed to create install root {}", root.display()))?;
    let path = pin_path(root);
    let line = invocation.to_string();

    let mut staged = NamedTempFile::new_in(root)
        .with_context(|| format!("Failed to stage {}", path.display()))?;
    writeln!(staged, "{}", line).with_context(|| format!("Failed to write {}", path.display()))?;

    let staged = match staged.persist_noclobber(&path) {
        Ok(_) => {
            tracing::debug!("Pinned '{}' in {}", line, path.display());
            return Ok(PinOutcome::Written { path, line });
        }
        Err(e) if e.error.kind() == ErrorKind::AlreadyExists => e.file,
        Err(e) => {
            return Err(anyhow::Error::new(e.error)
                .context(format!("Failed to create {}", path.display()))
                .into())
        }
    };

    let existing = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?
        .trim()
        .to_string();
    if !existing.is_empty() {
        tracing::debug!("{} already pins '{}'", path.display(), existing);
        return Ok(PinOutcome::AlreadyPinned { path, existing });
    }

    tracing::warn!("{} is blank; replacing it", path.display());
    staged.persist(&path).map_err(|e| {
        anyhow::Error::new(e.error).context(format!("Failed to write {}", path.display()))
    })?;
    Ok(PinOutcome::Written { path, line })
}

/// Read the pinned invocation, `None` if there is no pin.
pub fn read_pin(root: &Path) -> Result<Option<Invocation>> {
    let path = pin_path(root);
    match fs::read_to_string(&path) {
        Ok(contents) => Ok(Invocation::parse(&contents)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}
