//! C-side mirrors of the session's argument and event types.

use std::ffi::{CString, c_char, c_void};
use std::ptr::{self, NonNull};

use cafe_types::error::{CafeError, Result};
use cafe_types::event::{CafeEvent, EventSink, SysWmEvent};
use cafe_types::input::{ControllerInfo, KPAD_CHANNELS, KpadStatus, VpadStatus};
use cafe_types::swkbd::{
    AppearArg, ControllerType, CreateArg, InputFormArg, KeyboardArg, KeyboardMode, Language,
    PasswordMode, Region,
};
use cafe_types::window::{Window, WindowFlags};

/// Create argument as the host passes it. Null pointers ask the session
/// to supply its own buffers.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct CafeCreateArg {
    pub region: u32,
    pub work_memory: *mut u8,
    pub fs_client: *mut c_void,
}

impl CafeCreateArg {
    pub(crate) fn from_arg(arg: &CreateArg) -> Self {
        Self {
            region: arg.region.into(),
            work_memory: arg.work_memory.map_or(ptr::null_mut(), NonNull::as_ptr),
            fs_client: arg
                .fs_client
                .map_or(ptr::null_mut(), |p| p.as_ptr().cast()),
        }
    }

    pub(crate) fn to_arg(&self) -> Result<CreateArg> {
        let region = Region::try_from(self.region)
            .map_err(|_| CafeError::InvalidArgument(format!("region {}", self.region)))?;
        Ok(CreateArg {
            region,
            work_memory: NonNull::new(self.work_memory),
            fs_client: NonNull::new(self.fs_client.cast()),
        })
    }
}

/// Appear argument as the host passes it. Strings are zero-terminated
/// UTF-16 or null.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct CafeAppearArg {
    pub language: u32,
    pub layout: u32,
    pub keyboard_mode: u32,
    pub controller: u32,
    pub ok_label: *const u16,
    pub show_word_suggestions: bool,
    pub draw_wii_pointer: bool,
    pub initial_text: *const u16,
    pub hint_text: *const u16,
    pub password_mode: u32,
    pub highlight_initial_text: bool,
    pub show_copy_paste_buttons: bool,
}

impl CafeAppearArg {
    /// View of `arg`. Pointers borrow from `arg`.
    pub(crate) fn from_arg(arg: &AppearArg<'_>) -> Self {
        let ptr_of = |s: Option<&[u16]>| s.map_or(ptr::null(), <[u16]>::as_ptr);
        Self {
            language: arg.keyboard.language.into(),
            layout: arg.keyboard.layout,
            keyboard_mode: arg.keyboard.mode.into(),
            controller: arg.keyboard.controller.into(),
            ok_label: ptr_of(arg.keyboard.ok_label),
            show_word_suggestions: arg.keyboard.show_word_suggestions,
            draw_wii_pointer: arg.keyboard.draw_wii_pointer,
            initial_text: ptr_of(arg.input_form.initial_text),
            hint_text: ptr_of(arg.input_form.hint_text),
            password_mode: arg.input_form.password_mode.into(),
            highlight_initial_text: arg.input_form.highlight_initial_text,
            show_copy_paste_buttons: arg.input_form.show_copy_paste_buttons,
        }
    }
}

/// Owned copy of a host appear argument, kept until replaced.
#[derive(Debug, Clone, PartialEq)]
pub struct OwnedAppearArg {
    language: Language,
    layout: u32,
    mode: KeyboardMode,
    controller: ControllerType,
    ok_label: Option<Vec<u16>>,
    show_word_suggestions: bool,
    draw_wii_pointer: bool,
    initial_text: Option<Vec<u16>>,
    hint_text: Option<Vec<u16>>,
    password_mode: PasswordMode,
    highlight_initial_text: bool,
    show_copy_paste_buttons: bool,
}

impl OwnedAppearArg {
    /// Copy `raw` and the strings it points to.
    ///
    /// # Safety
    ///
    /// Every non-null string pointer in `raw` must point to a readable,
    /// zero-terminated UTF-16 string.
    pub(crate) unsafe fn copy_from(raw: &CafeAppearArg) -> Result<Self> {
        let invalid = |what: &str, v: u32| CafeError::InvalidArgument(format!("{what} {v}"));
        // SAFETY: forwarded from the caller.
        let (ok_label, initial_text, hint_text) = unsafe {
            (
                copy_utf16(raw.ok_label),
                copy_utf16(raw.initial_text),
                copy_utf16(raw.hint_text),
            )
        };
        Ok(Self {
            language: Language::try_from(raw.language)
                .map_err(|_| invalid("language", raw.language))?,
            layout: raw.layout,
            mode: KeyboardMode::try_from(raw.keyboard_mode)
                .map_err(|_| invalid("keyboard mode", raw.keyboard_mode))?,
            controller: ControllerType::try_from(raw.controller)
                .map_err(|_| invalid("controller", raw.controller))?,
            ok_label,
            show_word_suggestions: raw.show_word_suggestions,
            draw_wii_pointer: raw.draw_wii_pointer,
            initial_text,
            hint_text,
            password_mode: PasswordMode::try_from(raw.password_mode)
                .map_err(|_| invalid("password mode", raw.password_mode))?,
            highlight_initial_text: raw.highlight_initial_text,
            show_copy_paste_buttons: raw.show_copy_paste_buttons,
        })
    }

    pub(crate) fn as_arg(&self) -> AppearArg<'_> {
        AppearArg {
            keyboard: KeyboardArg {
                language: self.language,
                layout: self.layout,
                mode: self.mode,
                controller: self.controller,
                ok_label: self.ok_label.as_deref(),
                show_word_suggestions: self.show_word_suggestions,
                draw_wii_pointer: self.draw_wii_pointer,
            },
            input_form: InputFormArg {
                initial_text: self.initial_text.as_deref(),
                hint_text: self.hint_text.as_deref(),
                password_mode: self.password_mode,
                highlight_initial_text: self.highlight_initial_text,
                show_copy_paste_buttons: self.show_copy_paste_buttons,
            },
        }
    }
}

/// Length in code units of a zero-terminated UTF-16 string, terminator
/// excluded.
///
/// # Safety
///
/// `p` must point to a readable, zero-terminated UTF-16 string.
pub(crate) unsafe fn utf16_strlen(p: *const u16) -> usize {
    let mut len = 0;
    // SAFETY: the string is terminated, so every read up to the
    // terminator is in bounds.
    while unsafe { *p.add(len) } != 0 {
        len += 1;
    }
    len
}

/// Copy a zero-terminated UTF-16 string, terminator included.
///
/// # Safety
///
/// `p` must be null or point to a readable, zero-terminated UTF-16 string.
unsafe fn copy_utf16(p: *const u16) -> Option<Vec<u16>> {
    if p.is_null() {
        return None;
    }
    // SAFETY: forwarded from the caller; `len + 1` covers the terminator.
    let units = unsafe { std::slice::from_raw_parts(p, utf16_strlen(p) + 1) };
    Some(units.to_vec())
}

/// Controller snapshots for one keyboard frame. Null means "not routed".
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct CafeControllerInfo {
    pub vpad: *const VpadStatus,
    pub kpad: [*const KpadStatus; KPAD_CHANNELS],
}

impl CafeControllerInfo {
    /// View of `info`. Pointers borrow from `info`.
    pub(crate) fn from_info(info: &ControllerInfo) -> Self {
        let mut kpad = [ptr::null(); KPAD_CHANNELS];
        for (dst, src) in kpad.iter_mut().zip(&info.kpad) {
            *dst = src.as_ref().map_or(ptr::null(), ptr::from_ref);
        }
        Self {
            vpad: info.vpad.as_ref().map_or(ptr::null(), ptr::from_ref),
            kpad,
        }
    }
}

/// Window handle as the host passes it.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct CafeWindow {
    pub id: u32,
    /// `WindowFlags` bits; unknown bits are ignored.
    pub flags: u32,
}

impl From<CafeWindow> for Window {
    fn from(w: CafeWindow) -> Self {
        Window::new(w.id, WindowFlags::from_bits_truncate(w.flags))
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

pub const CAFE_EVENT_SYSWM: u32 = 0;
pub const CAFE_EVENT_TEXT: u32 = 1;
pub const CAFE_EVENT_KEY: u32 = 2;

pub const CAFE_SYSWM_SWKBD_OK_START: u32 = 0;
pub const CAFE_SYSWM_SWKBD_OK_FINISH: u32 = 1;
pub const CAFE_SYSWM_SWKBD_CANCEL: u32 = 2;

/// One posted event. Only the fields of `kind` are meaningful; `text` is
/// zero-terminated UTF-8, valid for the duration of the callback.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct CafeEventC {
    pub kind: u32,
    pub syswm: u32,
    pub text: *const c_char,
    pub pressed: bool,
    pub scancode: u32,
}

/// Host callback receiving posted events.
pub type CafeEventFn = extern "C" fn(user: *mut c_void, event: *const CafeEventC);

/// [`EventSink`] forwarding to a host callback.
pub(crate) struct CallbackSink {
    pub post: CafeEventFn,
    pub user: *mut c_void,
}

impl EventSink for CallbackSink {
    fn post(&mut self, event: CafeEvent) {
        let mut raw = CafeEventC {
            kind: CAFE_EVENT_SYSWM,
            syswm: 0,
            text: ptr::null(),
            pressed: false,
            scancode: 0,
        };
        // Keeps the text alive across the callback.
        let text;
        match event {
            CafeEvent::SysWm(e) => {
                raw.syswm = match e {
                    SysWmEvent::SwkbdOkStart => CAFE_SYSWM_SWKBD_OK_START,
                    SysWmEvent::SwkbdOkFinish => CAFE_SYSWM_SWKBD_OK_FINISH,
                    SysWmEvent::SwkbdCancel => CAFE_SYSWM_SWKBD_CANCEL,
                };
            },
            CafeEvent::KeyboardText(s) => {
                text = match CString::new(s) {
                    Ok(t) => t,
                    Err(e) => {
                        log::error!(target: crate::LOG_TARGET, "text event with interior NUL: {e}");
                        return;
                    },
                };
                raw.kind = CAFE_EVENT_TEXT;
                raw.text = text.as_ptr();
            },
            CafeEvent::Key { pressed, scancode } => {
                raw.kind = CAFE_EVENT_KEY;
                raw.pressed = pressed;
                raw.scancode = scancode;
            },
        }
        (self.post)(self.user, &raw);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_arg_round_trip() {
        let mut mem = [0u8; 4];
        let arg = CreateArg {
            region: Region::Japan,
            work_memory: NonNull::new(mem.as_mut_ptr()),
            fs_client: None,
        };
        let raw = CafeCreateArg::from_arg(&arg);
        assert_eq!(raw.region, 0);
        assert!(raw.fs_client.is_null());
        assert_eq!(raw.to_arg().unwrap(), arg);
    }

    #[test]
    fn create_arg_bad_region() {
        let raw = CafeCreateArg {
            region: 9,
            work_memory: ptr::null_mut(),
            fs_client: ptr::null_mut(),
        };
        assert!(matches!(raw.to_arg(), Err(CafeError::InvalidArgument(_))));
    }

    #[test]
    fn appear_arg_copy_owns_strings() {
        let label: Vec<u16> = "Go\0".encode_utf16().collect();
        let view = AppearArg {
            keyboard: KeyboardArg {
                ok_label: Some(label.as_slice()),
                language: Language::German,
                ..Default::default()
            },
            ..Default::default()
        };
        let raw = CafeAppearArg::from_arg(&view);
        let owned = unsafe { OwnedAppearArg::copy_from(&raw) }.unwrap();
        drop(label);
        let arg = owned.as_arg();
        assert_eq!(arg.keyboard.language, Language::German);
        assert_eq!(
            arg.keyboard.ok_label,
            Some(&[u16::from(b'G'), u16::from(b'o'), 0][..])
        );
        assert!(arg.input_form.hint_text.is_none());
    }

    #[test]
    fn appear_arg_bad_enum_rejected() {
        let mut raw = CafeAppearArg::from_arg(&AppearArg::default());
        raw.password_mode = 7;
        assert!(unsafe { OwnedAppearArg::copy_from(&raw) }.is_err());
    }

    #[test]
    fn controller_info_view() {
        let mut info = ControllerInfo::default();
        info.kpad[2] = Some(KpadStatus::default());
        let raw = CafeControllerInfo::from_info(&info);
        assert!(raw.vpad.is_null());
        assert!(raw.kpad[0].is_null());
        assert!(!raw.kpad[2].is_null());
    }

    #[test]
    fn window_flags_truncated() {
        let w: Window = CafeWindow {
            id: 4,
            flags: 0x0100_0000 | 0x1,
        }
        .into();
        assert!(w.is_tv_only());
        assert_eq!(w.flags, WindowFlags::TV_ONLY);
    }
}
