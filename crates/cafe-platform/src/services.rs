//! Platform service traits.

use std::ptr::NonNull;

use bitflags::bitflags;

use cafe_types::error::Result;
use cafe_types::input::{ControllerInfo, KeyEvent};
use cafe_types::swkbd::{AppearArg, CreateArg, FsClient, InputFormState};

// ---------------------------------------------------------------------------
// Software keyboard library
// ---------------------------------------------------------------------------

/// The platform's native software keyboard.
///
/// Only [`work_memory_size`](Self::work_memory_size) and
/// [`create`](Self::create) may be called before a keyboard exists; every
/// other call requires a successful `create` first.
pub trait SwkbdService {
    /// Bytes of work memory `create` needs.
    fn work_memory_size(&self, mode: u32) -> usize;

    /// Create the keyboard. `arg.work_memory` and `arg.fs_client` must be
    /// filled in and stay valid until [`destroy`](Self::destroy).
    fn create(&mut self, arg: &CreateArg) -> bool;

    fn destroy(&mut self);

    /// Start showing the input form.
    fn appear_input_form(&mut self, arg: &AppearArg<'_>) -> bool;

    /// Start hiding the input form.
    fn disappear_input_form(&mut self) -> bool;

    /// Advance one frame with the given controller input.
    fn calc(&mut self, info: &ControllerInfo);

    fn is_need_calc_sub_thread_font(&self) -> bool;
    fn is_need_calc_sub_thread_predict(&self) -> bool;
    fn calc_sub_thread_font(&mut self);
    fn calc_sub_thread_predict(&mut self);

    fn input_form_state(&self) -> InputFormState;

    /// Whether the user pressed OK during the last `calc`.
    fn is_decide_ok_button(&self) -> bool;

    /// Whether the user cancelled during the last `calc`.
    fn is_decide_cancel_button(&self) -> bool;

    /// Current contents of the input form, zero-terminated UTF-16.
    fn input_form_string(&self) -> Option<&[u16]>;

    fn draw_tv(&mut self);
    fn draw_drc(&mut self);
}

// ---------------------------------------------------------------------------
// Filesystem
// ---------------------------------------------------------------------------

/// Filesystem library and client registration.
pub trait FsService {
    /// Initialize the filesystem library.
    fn fs_init(&mut self);

    /// Shut the filesystem library down.
    fn fs_shutdown(&mut self);

    /// Register a client block, reporting every error class.
    fn add_client(&mut self, client: NonNull<FsClient>) -> Result<()>;

    /// Unregister a client block.
    fn del_client(&mut self, client: NonNull<FsClient>);
}

// ---------------------------------------------------------------------------
// System settings
// ---------------------------------------------------------------------------

/// Open user-config handle.
#[derive(Debug, PartialEq, Eq)]
pub struct UcHandle(pub i32);

/// Per-user system configuration store.
pub trait UserConfigService {
    fn uc_open(&mut self) -> Result<UcHandle>;

    /// Read an unsigned integer setting such as `cafe.language`.
    fn uc_read_u32(&mut self, handle: &UcHandle, key: &str) -> Result<u32>;

    fn uc_close(&mut self, handle: UcHandle);
}

bitflags! {
    /// `product_area` bits of the system product settings.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct ProductArea: u32 {
        const JAPAN = 0x01;
        const USA = 0x02;
        const EUROPE = 0x04;
        const CHINA = 0x10;
        const KOREA = 0x20;
        const TAIWAN = 0x40;
    }
}

/// Open product-settings handle.
#[derive(Debug, PartialEq, Eq)]
pub struct McpHandle(pub i32);

/// Console product settings.
pub trait ProductSettingsService {
    fn mcp_open(&mut self) -> Result<McpHandle>;

    fn mcp_product_area(&mut self, handle: &McpHandle) -> Result<ProductArea>;

    fn mcp_close(&mut self, handle: McpHandle);
}

/// Everything the keyboard session needs from the platform.
pub trait SwkbdPlatform: SwkbdService + FsService + UserConfigService + ProductSettingsService {}

impl<T> SwkbdPlatform for T where T: SwkbdService + FsService + UserConfigService + ProductSettingsService {}

// ---------------------------------------------------------------------------
// Scan-out
// ---------------------------------------------------------------------------

/// Display a color buffer can be copied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanTarget {
    Tv,
    Drc,
}

/// Color buffer surface format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceFormat {
    UnormRgba8,
    SrgbRgba8,
    Other(u32),
}

/// GPU operations of the renderer's present call.
pub trait ScanOutService {
    /// Drop to the system context state so system UI can draw.
    fn reset_context_state(&mut self);

    /// Rebind the renderer's own context state.
    fn restore_context_state(&mut self);

    fn color_buffer_format(&self) -> SurfaceFormat;

    /// Re-initialize and rebind the color buffer with a new format.
    fn set_color_buffer_format(&mut self, format: SurfaceFormat);

    fn copy_to_scan_buffer(&mut self, target: ScanTarget);
    fn swap_scan_buffers(&mut self);
    fn flush(&mut self);
    fn set_tv_enable(&mut self, enable: bool);
    fn set_drc_enable(&mut self, enable: bool);
}

// ---------------------------------------------------------------------------
// USB keyboard
// ---------------------------------------------------------------------------

/// Callback invoked by the platform for each key event, possibly from
/// another thread.
pub type KeyCallback = Box<dyn Fn(KeyEvent) + Send + Sync>;

/// Physical USB keyboard driver.
pub trait KeyboardService {
    fn kbd_setup(&mut self, on_key: KeyCallback) -> Result<()>;

    fn kbd_teardown(&mut self) -> Result<()>;
}
