//! The seam between the safe connector API and the native library.
//!
//! Foreign calls are isolated behind [`SpiceBackend`] so the forwarding
//! behaviour can be exercised against a recording stub in tests, and so the
//! boundary can later gain validation or crash isolation without touching
//! the public contract.

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::path::{Path, PathBuf};

use libloading::{Library, Symbol};
use log::debug;

use crate::callbacks;
use crate::error::NgSpiceError;
use crate::ffi;
use crate::loader;
use crate::vectors::{Complex, Vector, VectorData};
use crate::Result;

/// The native entry points the connector forwards text to and reads
/// results from.
pub(crate) trait SpiceBackend {
    /// Forward one command line to the simulator, verbatim.
    fn command(&self, cmd: &str) -> Result<()>;

    /// Forward one circuit-definition line to the simulator, verbatim.
    fn circuit_line(&self, line: &str) -> Result<()>;

    fn current_plot(&self) -> Result<String>;

    fn all_plots(&self) -> Result<Vec<String>>;

    fn all_vecs(&self, plot: &str) -> Result<Vec<String>>;

    fn vector(&self, name: &str) -> Result<Vector>;
}

/// Production backend: owns the loaded shared library.
///
/// Construction resolves every required symbol and registers the output
/// callbacks, so a `NativeBackend` is either fully usable or never exists.
pub(crate) struct NativeBackend {
    lib: Library,
    path: PathBuf,
}

impl NativeBackend {
    pub(crate) fn open(path: Option<&Path>) -> Result<Self> {
        let (lib, path) = loader::load(path)?;
        let backend = NativeBackend { lib, path };

        backend.symbol::<ffi::NgSpiceInit>(ffi::SYM_INIT)?;
        backend.symbol::<ffi::NgSpiceCommand>(ffi::SYM_COMMAND)?;
        backend.symbol::<ffi::NgSpiceCurPlot>(ffi::SYM_CUR_PLOT)?;
        backend.symbol::<ffi::NgSpiceAllPlots>(ffi::SYM_ALL_PLOTS)?;
        backend.symbol::<ffi::NgSpiceAllVecs>(ffi::SYM_ALL_VECS)?;
        backend.symbol::<ffi::NgGetVecInfo>(ffi::SYM_VEC_INFO)?;

        backend.init()?;
        Ok(backend)
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    fn symbol<T>(&self, name: &'static str) -> Result<Symbol<'_, T>> {
        unsafe { self.lib.get(name.as_bytes()) }.map_err(|_| NgSpiceError::MissingSymbol(name))
    }

    /// Registers the output callbacks. Must run once before any command is
    /// forwarded; ngspice holds the function pointers for the process
    /// lifetime.
    fn init(&self) -> Result<()> {
        let init = self.symbol::<ffi::NgSpiceInit>(ffi::SYM_INIT)?;
        let ret = unsafe {
            init(
                Some(callbacks::send_char),
                Some(callbacks::send_stat),
                Some(callbacks::controlled_exit),
                Some(callbacks::send_data),
                Some(callbacks::send_init_data),
                Some(callbacks::bg_thread_running),
                std::ptr::null_mut(),
            )
        };
        debug!("ngSpice_Init returned {}", ret);
        Ok(())
    }
}

impl SpiceBackend for NativeBackend {
    fn command(&self, cmd: &str) -> Result<()> {
        let cmd = CString::new(cmd).map_err(|_| NgSpiceError::InteriorNul)?;
        let command = self.symbol::<ffi::NgSpiceCommand>(ffi::SYM_COMMAND)?;
        unsafe { command(cmd.as_ptr()) };
        Ok(())
    }

    fn circuit_line(&self, line: &str) -> Result<()> {
        // ngspice's line-by-line circuit entry is the `circbyline` control
        // command; ngSpice_Circ wants the whole deck in a single call.
        let cmd =
            CString::new(format!("circbyline {line}")).map_err(|_| NgSpiceError::InteriorNul)?;
        let command = self.symbol::<ffi::NgSpiceCommand>(ffi::SYM_COMMAND)?;
        let ret = unsafe { command(cmd.as_ptr()) };
        if ret != 0 {
            return Err(NgSpiceError::CircuitRejected(line.to_string()));
        }
        Ok(())
    }

    fn current_plot(&self) -> Result<String> {
        let cur_plot = self.symbol::<ffi::NgSpiceCurPlot>(ffi::SYM_CUR_PLOT)?;
        let ptr = unsafe { cur_plot() };
        Ok(owned_string(ptr).unwrap_or_default())
    }

    fn all_plots(&self) -> Result<Vec<String>> {
        let all_plots = self.symbol::<ffi::NgSpiceAllPlots>(ffi::SYM_ALL_PLOTS)?;
        let arr = unsafe { all_plots() };
        Ok(unsafe { owned_string_array(arr) })
    }

    fn all_vecs(&self, plot: &str) -> Result<Vec<String>> {
        let plot = CString::new(plot).map_err(|_| NgSpiceError::InteriorNul)?;
        let all_vecs = self.symbol::<ffi::NgSpiceAllVecs>(ffi::SYM_ALL_VECS)?;
        let arr = unsafe { all_vecs(plot.as_ptr()) };
        Ok(unsafe { owned_string_array(arr) })
    }

    fn vector(&self, name: &str) -> Result<Vector> {
        let cname = CString::new(name).map_err(|_| NgSpiceError::InteriorNul)?;
        let vec_info = self.symbol::<ffi::NgGetVecInfo>(ffi::SYM_VEC_INFO)?;
        let info = unsafe { vec_info(cname.as_ptr()) };
        if info.is_null() {
            return Err(NgSpiceError::VectorNotFound(name.to_string()));
        }

        // The VectorInfo storage belongs to ngspice and is only valid until
        // the next command, so everything is copied out here.
        let info = unsafe { &*info };
        let len = info.v_length.max(0) as usize;
        let data = if info.v_flags & ffi::VF_COMPLEX != 0 && !info.v_compdata.is_null() {
            let samples = unsafe { std::slice::from_raw_parts(info.v_compdata, len) };
            VectorData::Complex(
                samples
                    .iter()
                    .map(|c| Complex {
                        re: c.cx_real,
                        im: c.cx_imag,
                    })
                    .collect(),
            )
        } else if !info.v_realdata.is_null() {
            let samples = unsafe { std::slice::from_raw_parts(info.v_realdata, len) };
            VectorData::Real(samples.to_vec())
        } else {
            VectorData::Real(Vec::new())
        };

        let name = owned_string(info.v_name).unwrap_or_else(|| name.to_string());
        Ok(Vector { name, data })
    }
}

fn owned_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    Some(unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned())
}

/// Walks a NULL-terminated `char**` as returned by `ngSpice_AllPlots` and
/// `ngSpice_AllVecs`.
unsafe fn owned_string_array(ptr: *const *const c_char) -> Vec<String> {
    let mut out = Vec::new();
    if ptr.is_null() {
        return out;
    }
    let mut i = 0;
    loop {
        let entry = *ptr.add(i);
        if entry.is_null() {
            break;
        }
        if let Some(s) = owned_string(entry) {
            out.push(s);
        }
        i += 1;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_with_bad_path_produces_no_backend() {
        let result = NativeBackend::open(Some(Path::new("/nonexistent/libngspice.so")));
        assert!(matches!(result, Err(NgSpiceError::LoadFailed { .. })));
    }
}
