//! Raw FFI declarations matching ngspice's `sharedspice.h`.

use std::os::raw::{c_char, c_int, c_short, c_void};

// Exported symbol names, looked up with libloading.
pub const SYM_INIT: &str = "ngSpice_Init";
pub const SYM_COMMAND: &str = "ngSpice_Command";
pub const SYM_CUR_PLOT: &str = "ngSpice_CurPlot";
pub const SYM_ALL_PLOTS: &str = "ngSpice_AllPlots";
pub const SYM_ALL_VECS: &str = "ngSpice_AllVecs";
pub const SYM_VEC_INFO: &str = "ngGet_Vec_Info";

// dvec flags on VectorInfo::v_flags.
pub const VF_REAL: c_short = 1 << 0;
pub const VF_COMPLEX: c_short = 1 << 1;

/// Complex sample as laid out by ngspice.
#[repr(C)]
pub struct NgComplex {
    pub cx_real: f64,
    pub cx_imag: f64,
}

/// Data and metadata of one simulated vector, returned by `ngGet_Vec_Info`.
/// The pointed-to storage is owned by ngspice and only valid until the next
/// command is executed.
#[repr(C)]
pub struct VectorInfo {
    pub v_name: *const c_char,
    pub v_type: c_int,
    pub v_flags: c_short,
    pub v_realdata: *const f64,
    pub v_compdata: *const NgComplex,
    pub v_length: c_int,
}

#[repr(C)]
pub struct VecInfo {
    pub number: c_int,
    pub vecname: *const c_char,
    pub is_real: bool,
    pub pdvec: *mut c_void,
    pub pdvecscale: *mut c_void,
}

/// Passed to the init-data callback when a simulation starts.
#[repr(C)]
pub struct VecInfoAll {
    pub name: *const c_char,
    pub title: *const c_char,
    pub date: *const c_char,
    pub plot_type: *const c_char,
    pub veccount: c_int,
    pub vecs: *const *mut VecInfo,
}

#[repr(C)]
pub struct VecValues {
    pub name: *const c_char,
    pub creal: f64,
    pub cimag: f64,
    pub is_scale: bool,
    pub is_complex: bool,
}

/// Passed to the data callback at every simulated point.
#[repr(C)]
pub struct VecValuesAll {
    pub veccount: c_int,
    pub vecindex: c_int,
    pub vecsa: *const *mut VecValues,
}

// Callback signatures registered through ngSpice_Init.
pub type SendChar = unsafe extern "C" fn(*mut c_char, c_int, *mut c_void) -> c_int;
pub type SendStat = unsafe extern "C" fn(*mut c_char, c_int, *mut c_void) -> c_int;
pub type ControlledExit = unsafe extern "C" fn(c_int, bool, bool, c_int, *mut c_void) -> c_int;
pub type SendData = unsafe extern "C" fn(*mut VecValuesAll, c_int, c_int, *mut c_void) -> c_int;
pub type SendInitData = unsafe extern "C" fn(*mut VecInfoAll, c_int, *mut c_void) -> c_int;
pub type BgThreadRunning = unsafe extern "C" fn(bool, c_int, *mut c_void) -> c_int;

// Exported entry points.
pub type NgSpiceInit = unsafe extern "C" fn(
    Option<SendChar>,
    Option<SendStat>,
    Option<ControlledExit>,
    Option<SendData>,
    Option<SendInitData>,
    Option<BgThreadRunning>,
    *mut c_void,
) -> c_int;
pub type NgSpiceCommand = unsafe extern "C" fn(*const c_char) -> c_int;
pub type NgSpiceCurPlot = unsafe extern "C" fn() -> *const c_char;
pub type NgSpiceAllPlots = unsafe extern "C" fn() -> *const *const c_char;
pub type NgSpiceAllVecs = unsafe extern "C" fn(*const c_char) -> *const *const c_char;
pub type NgGetVecInfo = unsafe extern "C" fn(*const c_char) -> *const VectorInfo;
