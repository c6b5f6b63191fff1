//! Scriptable in-process platform.
//!
//! `SimPlatform` behaves like the console's keyboard library closely enough
//! to drive the session end to end: appear makes the form visible, a
//! scripted OK or cancel is reported by the next `calc`, and OK hides the
//! form on its own. Every call is appended to [`SimPlatform::calls`].

use std::collections::HashSet;
use std::ptr::NonNull;

use cafe_types::error::{CafeError, Result};
use cafe_types::input::{ControllerInfo, KeyEvent};
use cafe_types::swkbd::{
    AppearArg, ControllerType, CreateArg, FsClient, InputFormState, KeyboardMode, Language,
    PasswordMode, Region,
};

use crate::services::{
    FsService, KeyCallback, KeyboardService, McpHandle, ProductArea, ProductSettingsService,
    ScanOutService, ScanTarget, SurfaceFormat, SwkbdService, UcHandle, UserConfigService,
};

/// Work memory size reported by default (matches the console's mode 0).
pub const DEFAULT_WORK_MEMORY_SIZE: usize = 0x2A_0000;

/// A recorded platform call.
#[derive(Debug, Clone, PartialEq)]
pub enum SimCall {
    Create { region: Region },
    Destroy,
    Appear(AppearSnapshot),
    Disappear,
    Calc(ControllerInfo),
    CalcSubThreadFont,
    CalcSubThreadPredict,
    DrawTv,
    DrawDrc,
    FsInit,
    FsShutdown,
    AddClient,
    DelClient,
    UcOpen,
    UcClose,
    McpOpen,
    McpClose,
    ResetContextState,
    RestoreContextState,
    SetColorBufferFormat(SurfaceFormat),
    CopyToScanBuffer(ScanTarget),
    SwapScanBuffers,
    Flush,
    SetTvEnable(bool),
    SetDrcEnable(bool),
}

/// Owned copy of an appear argument, taken at `appear_input_form` time.
#[derive(Debug, Clone, PartialEq)]
pub struct AppearSnapshot {
    pub language: Language,
    pub layout: u32,
    pub mode: KeyboardMode,
    pub controller: ControllerType,
    pub ok_label: Option<Vec<u16>>,
    pub show_word_suggestions: bool,
    pub draw_wii_pointer: bool,
    pub initial_text: Option<Vec<u16>>,
    pub hint_text: Option<Vec<u16>>,
    pub password_mode: PasswordMode,
    pub highlight_initial_text: bool,
    pub show_copy_paste_buttons: bool,
}

impl AppearSnapshot {
    fn capture(arg: &AppearArg<'_>) -> Self {
        Self {
            language: arg.keyboard.language,
            layout: arg.keyboard.layout,
            mode: arg.keyboard.mode,
            controller: arg.keyboard.controller,
            ok_label: arg.keyboard.ok_label.map(<[u16]>::to_vec),
            show_word_suggestions: arg.keyboard.show_word_suggestions,
            draw_wii_pointer: arg.keyboard.draw_wii_pointer,
            initial_text: arg.input_form.initial_text.map(<[u16]>::to_vec),
            hint_text: arg.input_form.hint_text.map(<[u16]>::to_vec),
            password_mode: arg.input_form.password_mode,
            highlight_initial_text: arg.input_form.highlight_initial_text,
            show_copy_paste_buttons: arg.input_form.show_copy_paste_buttons,
        }
    }
}

/// Scriptable platform double.
pub struct SimPlatform {
    /// Every call, in order.
    pub calls: Vec<SimCall>,

    // Keyboard library
    pub work_memory_size: usize,
    pub fail_create: bool,
    pub need_font: bool,
    pub need_predict: bool,
    created: bool,
    state: InputFormState,
    work_memory: Option<NonNull<u8>>,
    text: Vec<u16>,
    pending_ok: bool,
    pending_cancel: bool,
    decided_ok: bool,
    decided_cancel: bool,

    // Filesystem
    pub fail_add_client: bool,
    fs_initialized: bool,
    clients: HashSet<usize>,

    // System settings
    pub system_language: Result<u32>,
    pub product_area: Result<ProductArea>,
    pub fail_uc_open: bool,
    pub fail_mcp_open: bool,

    // Scan-out
    color_format: SurfaceFormat,

    // USB keyboard
    key_callback: Option<KeyCallback>,
}

impl SimPlatform {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            work_memory_size: DEFAULT_WORK_MEMORY_SIZE,
            fail_create: false,
            need_font: false,
            need_predict: false,
            created: false,
            state: InputFormState::Hidden,
            work_memory: None,
            text: vec![0],
            pending_ok: false,
            pending_cancel: false,
            decided_ok: false,
            decided_cancel: false,
            fail_add_client: false,
            fs_initialized: false,
            clients: HashSet::new(),
            system_language: Ok(Language::English.into()),
            product_area: Ok(ProductArea::EUROPE),
            fail_uc_open: false,
            fail_mcp_open: false,
            color_format: SurfaceFormat::UnormRgba8,
            key_callback: None,
        }
    }

    // -- Scripting --

    /// Type `text` and press OK; reported by the next `calc`.
    pub fn commit(&mut self, text: &str) {
        self.text = text.encode_utf16().chain(std::iter::once(0)).collect();
        self.pending_ok = true;
    }

    /// Replace the input form contents with raw UTF-16 and press OK.
    pub fn commit_raw(&mut self, units: &[u16]) {
        self.text = units.to_vec();
        if self.text.last() != Some(&0) {
            self.text.push(0);
        }
        self.pending_ok = true;
    }

    /// Press cancel; reported by the next `calc`.
    pub fn cancel(&mut self) {
        self.pending_cancel = true;
    }

    /// Force the reported input form state.
    pub fn set_state(&mut self, state: InputFormState) {
        self.state = state;
    }

    pub fn set_color_format(&mut self, format: SurfaceFormat) {
        self.color_format = format;
    }

    /// Deliver a key event through the registered USB keyboard callback.
    pub fn press_key(&self, event: KeyEvent) -> bool {
        match &self.key_callback {
            Some(cb) => {
                cb(event);
                true
            },
            None => false,
        }
    }

    // -- Inspection --

    pub fn is_created(&self) -> bool {
        self.created
    }

    pub fn fs_initialized(&self) -> bool {
        self.fs_initialized
    }

    /// Number of registered filesystem clients.
    pub fn client_count(&self) -> usize {
        self.clients.len()
    }

    /// Work memory the live keyboard was created with.
    pub fn work_memory(&self) -> Option<NonNull<u8>> {
        self.work_memory
    }

    /// Regions passed to each `create`, in order.
    pub fn created_regions(&self) -> Vec<Region> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                SimCall::Create { region } => Some(*region),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, pred: impl Fn(&SimCall) -> bool) -> usize {
        self.calls.iter().filter(|&c| pred(c)).count()
    }

    /// Last appear argument received.
    pub fn last_appear(&self) -> Option<&AppearSnapshot> {
        self.calls.iter().rev().find_map(|c| match c {
            SimCall::Appear(snap) => Some(snap),
            _ => None,
        })
    }

    /// Controller input passed to the last `calc`.
    pub fn last_calc_input(&self) -> Option<&ControllerInfo> {
        self.calls.iter().rev().find_map(|c| match c {
            SimCall::Calc(info) => Some(info),
            _ => None,
        })
    }
}

impl Default for SimPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl SwkbdService for SimPlatform {
    fn work_memory_size(&self, _mode: u32) -> usize {
        self.work_memory_size
    }

    fn create(&mut self, arg: &CreateArg) -> bool {
        self.calls.push(SimCall::Create { region: arg.region });
        if self.fail_create || arg.work_memory.is_none() || arg.fs_client.is_none() {
            return false;
        }
        self.created = true;
        self.work_memory = arg.work_memory;
        self.state = InputFormState::Hidden;
        true
    }

    fn destroy(&mut self) {
        self.calls.push(SimCall::Destroy);
        self.created = false;
        self.work_memory = None;
        self.state = InputFormState::Hidden;
    }

    fn appear_input_form(&mut self, arg: &AppearArg<'_>) -> bool {
        self.calls.push(SimCall::Appear(AppearSnapshot::capture(arg)));
        if !self.created {
            return false;
        }
        self.state = InputFormState::Visible;
        true
    }

    fn disappear_input_form(&mut self) -> bool {
        self.calls.push(SimCall::Disappear);
        self.state = InputFormState::Hidden;
        true
    }

    fn calc(&mut self, info: &ControllerInfo) {
        self.calls.push(SimCall::Calc(*info));
        self.decided_ok = std::mem::take(&mut self.pending_ok);
        self.decided_cancel = std::mem::take(&mut self.pending_cancel);
        if self.decided_ok {
            // OK closes the form by itself; cancel leaves that to the caller.
            self.state = InputFormState::Hidden;
        }
    }

    fn is_need_calc_sub_thread_font(&self) -> bool {
        self.need_font
    }

    fn is_need_calc_sub_thread_predict(&self) -> bool {
        self.need_predict
    }

    fn calc_sub_thread_font(&mut self) {
        self.calls.push(SimCall::CalcSubThreadFont);
        self.need_font = false;
    }

    fn calc_sub_thread_predict(&mut self) {
        self.calls.push(SimCall::CalcSubThreadPredict);
        self.need_predict = false;
    }

    fn input_form_state(&self) -> InputFormState {
        self.state
    }

    fn is_decide_ok_button(&self) -> bool {
        self.decided_ok
    }

    fn is_decide_cancel_button(&self) -> bool {
        self.decided_cancel
    }

    fn input_form_string(&self) -> Option<&[u16]> {
        if self.text.is_empty() {
            None
        } else {
            Some(&self.text)
        }
    }

    fn draw_tv(&mut self) {
        self.calls.push(SimCall::DrawTv);
    }

    fn draw_drc(&mut self) {
        self.calls.push(SimCall::DrawDrc);
    }
}

impl FsService for SimPlatform {
    fn fs_init(&mut self) {
        self.calls.push(SimCall::FsInit);
        self.fs_initialized = true;
    }

    fn fs_shutdown(&mut self) {
        self.calls.push(SimCall::FsShutdown);
        self.fs_initialized = false;
    }

    fn add_client(&mut self, client: NonNull<FsClient>) -> Result<()> {
        self.calls.push(SimCall::AddClient);
        if self.fail_add_client {
            return Err(CafeError::Platform("FSAddClient() failed".into()));
        }
        self.clients.insert(client.as_ptr() as usize);
        Ok(())
    }

    fn del_client(&mut self, client: NonNull<FsClient>) {
        self.calls.push(SimCall::DelClient);
        self.clients.remove(&(client.as_ptr() as usize));
    }
}

impl UserConfigService for SimPlatform {
    fn uc_open(&mut self) -> Result<UcHandle> {
        self.calls.push(SimCall::UcOpen);
        if self.fail_uc_open {
            return Err(CafeError::Platform("UCOpen() returned: -1".into()));
        }
        Ok(UcHandle(1))
    }

    fn uc_read_u32(&mut self, _handle: &UcHandle, key: &str) -> Result<u32> {
        if key != "cafe.language" {
            return Err(CafeError::Platform(format!("unknown system config key {key}")));
        }
        match &self.system_language {
            Ok(v) => Ok(*v),
            Err(e) => Err(CafeError::Platform(e.to_string())),
        }
    }

    fn uc_close(&mut self, _handle: UcHandle) {
        self.calls.push(SimCall::UcClose);
    }
}

impl ProductSettingsService for SimPlatform {
    fn mcp_open(&mut self) -> Result<McpHandle> {
        self.calls.push(SimCall::McpOpen);
        if self.fail_mcp_open {
            return Err(CafeError::Platform("MCP_Open() failed".into()));
        }
        Ok(McpHandle(1))
    }

    fn mcp_product_area(&mut self, _handle: &McpHandle) -> Result<ProductArea> {
        match &self.product_area {
            Ok(area) => Ok(*area),
            Err(e) => Err(CafeError::Platform(e.to_string())),
        }
    }

    fn mcp_close(&mut self, _handle: McpHandle) {
        self.calls.push(SimCall::McpClose);
    }
}

impl ScanOutService for SimPlatform {
    fn reset_context_state(&mut self) {
        self.calls.push(SimCall::ResetContextState);
    }

    fn restore_context_state(&mut self) {
        self.calls.push(SimCall::RestoreContextState);
    }

    fn color_buffer_format(&self) -> SurfaceFormat {
        self.color_format
    }

    fn set_color_buffer_format(&mut self, format: SurfaceFormat) {
        self.calls.push(SimCall::SetColorBufferFormat(format));
        self.color_format = format;
    }

    fn copy_to_scan_buffer(&mut self, target: ScanTarget) {
        self.calls.push(SimCall::CopyToScanBuffer(target));
    }

    fn swap_scan_buffers(&mut self) {
        self.calls.push(SimCall::SwapScanBuffers);
    }

    fn flush(&mut self) {
        self.calls.push(SimCall::Flush);
    }

    fn set_tv_enable(&mut self, enable: bool) {
        self.calls.push(SimCall::SetTvEnable(enable));
    }

    fn set_drc_enable(&mut self, enable: bool) {
        self.calls.push(SimCall::SetDrcEnable(enable));
    }
}

impl KeyboardService for SimPlatform {
    fn kbd_setup(&mut self, on_key: KeyCallback) -> Result<()> {
        if self.key_callback.is_some() {
            return Err(CafeError::Platform("KBDSetup() called twice".into()));
        }
        self.key_callback = Some(on_key);
        Ok(())
    }

    fn kbd_teardown(&mut self) -> Result<()> {
        match self.key_callback.take() {
            Some(_) => Ok(()),
            None => Err(CafeError::Platform("KBDTeardown() without setup".into())),
        }
    }
}
