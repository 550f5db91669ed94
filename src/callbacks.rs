//! Callbacks handed to `ngSpice_Init`.
//!
//! ngspice reports console output, simulation progress and lifecycle events
//! through these. They are free functions rather than closures: the native
//! library keeps the pointers for the lifetime of the process, and the crate
//! assumes a single connector per process.

use std::ffi::CStr;
use std::os::raw::{c_char, c_int, c_void};

use lazy_static::lazy_static;
use log::{debug, error, info, trace, warn};
use regex::Regex;

use crate::ffi::{VecInfoAll, VecValuesAll};

lazy_static! {
    // Progress lines look like "tran: 12.5%".
    static ref STAT_PROGRESS: Regex = Regex::new(r"(\w+):\s+([0-9]*\.?[0-9]*)%\s*$").unwrap();
}

fn cstr_to_owned(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    Some(unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned())
}

/// Console output. ngspice prefixes each line with "stdout" or "stderr".
pub(crate) unsafe extern "C" fn send_char(msg: *mut c_char, _id: c_int, _user: *mut c_void) -> c_int {
    if let Some(line) = cstr_to_owned(msg) {
        if let Some(rest) = line.strip_prefix("stdout") {
            info!(target: "ngspice", "{}", rest.trim_start());
        } else if let Some(rest) = line.strip_prefix("stderr") {
            error!(target: "ngspice", "{}", rest.trim_start());
        } else {
            info!(target: "ngspice", "{}", line);
        }
    }
    0
}

/// Simulation statistics, including percentage progress of a running
/// analysis.
pub(crate) unsafe extern "C" fn send_stat(msg: *mut c_char, _id: c_int, _user: *mut c_void) -> c_int {
    if let Some(line) = cstr_to_owned(msg) {
        if let Some((analysis, percent)) = parse_progress(&line) {
            debug!(target: "ngspice", "{} {:.1}%", analysis, percent);
        } else {
            info!(target: "ngspice", "{}", line);
        }
    }
    0
}

/// Called when the simulator wants the host to exit, e.g. on `quit`.
/// The request is logged and otherwise ignored; the library stays mapped.
pub(crate) unsafe extern "C" fn controlled_exit(
    status: c_int,
    unload: bool,
    exit: bool,
    _id: c_int,
    _user: *mut c_void,
) -> c_int {
    warn!(
        target: "ngspice",
        "controlled exit requested: status={} unload={} exit={}",
        status, unload, exit
    );
    0
}

/// Called at every simulated data point. Results are pulled via the vector
/// query API instead, so per-point values are not collected here.
pub(crate) unsafe extern "C" fn send_data(
    _values: *mut VecValuesAll,
    _count: c_int,
    _id: c_int,
    _user: *mut c_void,
) -> c_int {
    0
}

/// Called once at simulation start with the vector layout.
pub(crate) unsafe extern "C" fn send_init_data(
    info: *mut VecInfoAll,
    _id: c_int,
    _user: *mut c_void,
) -> c_int {
    if !info.is_null() {
        let info = &*info;
        if let Some(name) = cstr_to_owned(info.name) {
            debug!(target: "ngspice", "plot {} with {} vectors", name, info.veccount);
        }
    }
    0
}

pub(crate) unsafe extern "C" fn bg_thread_running(
    is_running: bool,
    _id: c_int,
    _user: *mut c_void,
) -> c_int {
    trace!(target: "ngspice", "background thread running: {}", is_running);
    0
}

fn parse_progress(line: &str) -> Option<(&str, f64)> {
    let captures = STAT_PROGRESS.captures(line)?;
    let analysis = captures.get(1)?.as_str();
    let percent: f64 = captures.get(2)?.as_str().parse().ok()?;
    Some((analysis, percent))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_progress_line() {
        let (analysis, percent) = parse_progress("tran: 12.5%").unwrap();
        assert_eq!(analysis, "tran");
        assert_eq!(percent, 12.5);
    }

    #[test]
    fn test_parse_progress_integer_percentage() {
        let (analysis, percent) = parse_progress("op: 100%  ").unwrap();
        assert_eq!(analysis, "op");
        assert_eq!(percent, 100.0);
    }

    #[test]
    fn test_parse_progress_rejects_plain_text() {
        assert!(parse_progress("Note: starting transient analysis").is_none());
        assert!(parse_progress("").is_none());
    }
}
