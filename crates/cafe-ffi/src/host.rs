//! Host-registered platform.
//!
//! The native video backend fills a [`CafeHost`] table with its SDK entry
//! points; [`HostPlatform`] adapts that table to the service traits the
//! session is written against.

use std::ffi::{CString, c_char, c_void};
use std::ptr::NonNull;

use cafe_platform::{
    FsService, McpHandle, ProductArea, ProductSettingsService, SwkbdService, UcHandle,
    UserConfigService,
};
use cafe_types::error::{CafeError, Result};
use cafe_types::input::ControllerInfo;
use cafe_types::swkbd::{AppearArg, CreateArg, FsClient, InputFormState};

use crate::LOG_TARGET;
use crate::abi::{self, CafeAppearArg, CafeControllerInfo, CafeCreateArg};

/// Platform entry points supplied by the host. Every field must be set.
///
/// Functions returning `i32` report success as `0`. `user` is passed back
/// unchanged on every call.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct CafeHost {
    pub user: *mut c_void,

    pub swkbd_work_memory_size: extern "C" fn(user: *mut c_void, mode: u32) -> usize,
    pub swkbd_create: extern "C" fn(user: *mut c_void, arg: *const CafeCreateArg) -> bool,
    pub swkbd_destroy: extern "C" fn(user: *mut c_void),
    pub swkbd_appear: extern "C" fn(user: *mut c_void, arg: *const CafeAppearArg) -> bool,
    pub swkbd_disappear: extern "C" fn(user: *mut c_void) -> bool,
    pub swkbd_calc: extern "C" fn(user: *mut c_void, info: *const CafeControllerInfo),
    pub swkbd_need_calc_font: extern "C" fn(user: *mut c_void) -> bool,
    pub swkbd_need_calc_predict: extern "C" fn(user: *mut c_void) -> bool,
    pub swkbd_calc_font: extern "C" fn(user: *mut c_void),
    pub swkbd_calc_predict: extern "C" fn(user: *mut c_void),
    pub swkbd_input_form_state: extern "C" fn(user: *mut c_void) -> u32,
    pub swkbd_decide_ok: extern "C" fn(user: *mut c_void) -> bool,
    pub swkbd_decide_cancel: extern "C" fn(user: *mut c_void) -> bool,
    /// Zero-terminated UTF-16, valid until the next calc or destroy. May
    /// return null.
    pub swkbd_input_form_string: extern "C" fn(user: *mut c_void) -> *const u16,
    pub swkbd_draw_tv: extern "C" fn(user: *mut c_void),
    pub swkbd_draw_drc: extern "C" fn(user: *mut c_void),

    pub fs_init: extern "C" fn(user: *mut c_void),
    pub fs_shutdown: extern "C" fn(user: *mut c_void),
    pub fs_add_client: extern "C" fn(user: *mut c_void, client: *mut c_void) -> i32,
    pub fs_del_client: extern "C" fn(user: *mut c_void, client: *mut c_void),

    pub uc_open: extern "C" fn(user: *mut c_void, handle: *mut i32) -> i32,
    pub uc_read_u32:
        extern "C" fn(user: *mut c_void, handle: i32, key: *const c_char, out: *mut u32) -> i32,
    pub uc_close: extern "C" fn(user: *mut c_void, handle: i32),

    pub mcp_open: extern "C" fn(user: *mut c_void, handle: *mut i32) -> i32,
    pub mcp_product_area: extern "C" fn(user: *mut c_void, handle: i32, out: *mut u32) -> i32,
    pub mcp_close: extern "C" fn(user: *mut c_void, handle: i32),
}

/// [`CafeHost`] behind the session's service traits.
#[derive(Debug)]
pub struct HostPlatform {
    host: CafeHost,
}

impl HostPlatform {
    pub fn new(host: CafeHost) -> Self {
        Self { host }
    }
}

fn status(what: &str, code: i32) -> Result<()> {
    if code == 0 {
        Ok(())
    } else {
        Err(CafeError::Platform(format!("{what} failed: {code}")))
    }
}

impl SwkbdService for HostPlatform {
    fn work_memory_size(&self, mode: u32) -> usize {
        (self.host.swkbd_work_memory_size)(self.host.user, mode)
    }

    fn create(&mut self, arg: &CreateArg) -> bool {
        let raw = CafeCreateArg::from_arg(arg);
        (self.host.swkbd_create)(self.host.user, &raw)
    }

    fn destroy(&mut self) {
        (self.host.swkbd_destroy)(self.host.user);
    }

    fn appear_input_form(&mut self, arg: &AppearArg<'_>) -> bool {
        let raw = CafeAppearArg::from_arg(arg);
        (self.host.swkbd_appear)(self.host.user, &raw)
    }

    fn disappear_input_form(&mut self) -> bool {
        (self.host.swkbd_disappear)(self.host.user)
    }

    fn calc(&mut self, info: &ControllerInfo) {
        let raw = CafeControllerInfo::from_info(info);
        (self.host.swkbd_calc)(self.host.user, &raw);
    }

    fn is_need_calc_sub_thread_font(&self) -> bool {
        (self.host.swkbd_need_calc_font)(self.host.user)
    }

    fn is_need_calc_sub_thread_predict(&self) -> bool {
        (self.host.swkbd_need_calc_predict)(self.host.user)
    }

    fn calc_sub_thread_font(&mut self) {
        (self.host.swkbd_calc_font)(self.host.user);
    }

    fn calc_sub_thread_predict(&mut self) {
        (self.host.swkbd_calc_predict)(self.host.user);
    }

    fn input_form_state(&self) -> InputFormState {
        let raw = (self.host.swkbd_input_form_state)(self.host.user);
        InputFormState::try_from(raw).unwrap_or_else(|_| {
            log::error!(target: LOG_TARGET, "unknown input form state {raw}");
            InputFormState::Hidden
        })
    }

    fn is_decide_ok_button(&self) -> bool {
        (self.host.swkbd_decide_ok)(self.host.user)
    }

    fn is_decide_cancel_button(&self) -> bool {
        (self.host.swkbd_decide_cancel)(self.host.user)
    }

    fn input_form_string(&self) -> Option<&[u16]> {
        let p = (self.host.swkbd_input_form_string)(self.host.user);
        if p.is_null() {
            return None;
        }
        // SAFETY: the host contract guarantees a zero-terminated string
        // that outlives this borrow of the platform.
        unsafe { Some(std::slice::from_raw_parts(p, abi::utf16_strlen(p) + 1)) }
    }

    fn draw_tv(&mut self) {
        (self.host.swkbd_draw_tv)(self.host.user);
    }

    fn draw_drc(&mut self) {
        (self.host.swkbd_draw_drc)(self.host.user);
    }
}

impl FsService for HostPlatform {
    fn fs_init(&mut self) {
        (self.host.fs_init)(self.host.user);
    }

    fn fs_shutdown(&mut self) {
        (self.host.fs_shutdown)(self.host.user);
    }

    fn add_client(&mut self, client: NonNull<FsClient>) -> Result<()> {
        status(
            "FSAddClient",
            (self.host.fs_add_client)(self.host.user, client.as_ptr().cast()),
        )
    }

    fn del_client(&mut self, client: NonNull<FsClient>) {
        (self.host.fs_del_client)(self.host.user, client.as_ptr().cast());
    }
}

impl UserConfigService for HostPlatform {
    fn uc_open(&mut self) -> Result<UcHandle> {
        let mut handle: i32 = 0;
        status("UCOpen", (self.host.uc_open)(self.host.user, &mut handle))?;
        Ok(UcHandle(handle))
    }

    fn uc_read_u32(&mut self, handle: &UcHandle, key: &str) -> Result<u32> {
        let key = CString::new(key).map_err(|e| CafeError::InvalidArgument(e.to_string()))?;
        let mut value: u32 = 0;
        status(
            "UCReadSysConfig",
            (self.host.uc_read_u32)(self.host.user, handle.0, key.as_ptr(), &mut value),
        )?;
        Ok(value)
    }

    fn uc_close(&mut self, handle: UcHandle) {
        (self.host.uc_close)(self.host.user, handle.0);
    }
}

impl ProductSettingsService for HostPlatform {
    fn mcp_open(&mut self) -> Result<McpHandle> {
        let mut handle: i32 = 0;
        status("MCP_Open", (self.host.mcp_open)(self.host.user, &mut handle))?;
        Ok(McpHandle(handle))
    }

    fn mcp_product_area(&mut self, handle: &McpHandle) -> Result<ProductArea> {
        let mut area: u32 = 0;
        status(
            "MCP_GetSysProdSettings",
            (self.host.mcp_product_area)(self.host.user, handle.0, &mut area),
        )?;
        Ok(ProductArea::from_bits_truncate(area))
    }

    fn mcp_close(&mut self, handle: McpHandle) {
        (self.host.mcp_close)(self.host.user, handle.0);
    }
}
