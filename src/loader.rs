//! Locating and loading the ngspice shared library.

use std::path::{Path, PathBuf};

use libloading::Library;
use log::debug;

use crate::error::NgSpiceError;
use crate::Result;

/// File names the simulator is conventionally installed under, most
/// specific first.
fn candidate_names() -> &'static [&'static str] {
    if cfg!(target_os = "windows") {
        &["ngspice.dll", "libngspice-0.dll", "libngspice.dll"]
    } else if cfg!(target_os = "macos") {
        &["libngspice.dylib", "libngspice.0.dylib"]
    } else {
        &["libngspice.so", "libngspice.so.0"]
    }
}

/// Directories tried when the dynamic linker's own search comes up empty.
fn search_dirs() -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    if let Ok(dir) = std::env::var("NGSPICE_LIBRARY_PATH") {
        dirs.push(PathBuf::from(dir));
    }
    if cfg!(target_os = "macos") {
        dirs.push(PathBuf::from("/usr/local/lib"));
        dirs.push(PathBuf::from("/opt/homebrew/lib"));
        dirs.push(PathBuf::from("/opt/local/lib"));
    } else if !cfg!(target_os = "windows") {
        dirs.push(PathBuf::from("/usr/lib"));
        dirs.push(PathBuf::from("/usr/local/lib"));
        dirs.push(PathBuf::from("/usr/lib/x86_64-linux-gnu"));
        dirs.push(PathBuf::from("/usr/lib/aarch64-linux-gnu"));
    }
    dirs
}

/// Load the library from an explicit path, or discover it by conventional
/// name: first hand each bare name to the dynamic linker (which applies
/// `LD_LIBRARY_PATH`, the linker cache and friends), then probe well-known
/// library directories directly.
pub(crate) fn load(path: Option<&Path>) -> Result<(Library, PathBuf)> {
    if let Some(path) = path {
        let lib = unsafe { Library::new(path) }.map_err(|e| NgSpiceError::LoadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        debug!("loaded ngspice from {}", path.display());
        return Ok((lib, path.to_path_buf()));
    }

    for name in candidate_names() {
        if let Ok(lib) = unsafe { Library::new(name) } {
            debug!("loaded ngspice via linker search as {}", name);
            return Ok((lib, PathBuf::from(name)));
        }
        for dir in search_dirs() {
            let full = dir.join(name);
            if !full.exists() {
                continue;
            }
            if let Ok(lib) = unsafe { Library::new(&full) } {
                debug!("loaded ngspice from {}", full.display());
                return Ok((lib, full));
            }
        }
    }

    Err(NgSpiceError::LibraryNotFound)
}
