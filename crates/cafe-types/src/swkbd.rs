//! Software keyboard vocabulary.
//!
//! Mirrors the enums and argument blocks of the platform's native keyboard
//! library. Discriminants match the native values so they can cross the C
//! boundary unchanged.

use std::ptr::NonNull;

use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Keyboard language. Values `0..=11` are the ones the system settings
/// may report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[repr(u32)]
pub enum Language {
    Japanese = 0,
    English = 1,
    French = 2,
    German = 3,
    Italian = 4,
    Spanish = 5,
    SimplifiedChinese = 6,
    Korean = 7,
    Dutch = 8,
    Portuguese = 9,
    Russian = 10,
    TraditionalChinese = 11,
}

/// Keyboard region. Fixed for the lifetime of a created keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[repr(u32)]
pub enum Region {
    Japan = 0,
    Usa = 1,
    Europe = 2,
    China = 3,
    Korea = 4,
    Taiwan = 5,
}

/// Keyboard mode shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[repr(u32)]
pub enum KeyboardMode {
    Full = 0,
    Numpad = 1,
    /// Restricted character set (the native UTF-8 mode).
    Restricted = 2,
    /// Network ID entry.
    Nnid = 3,
}

/// How typed characters are displayed in the input form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[repr(u32)]
pub enum PasswordMode {
    /// Characters are shown in clear.
    Show = 0,
    Hide = 1,
    /// Each character is shown briefly, then masked.
    Fade = 2,
}

/// Controller that drives the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[repr(u32)]
pub enum ControllerType {
    WiiRemote0 = 0,
    WiiRemote1 = 1,
    WiiRemote2 = 2,
    WiiRemote3 = 3,
    DrcGamepad = 4,
}

/// Input form state as reported by the keyboard library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[repr(u32)]
pub enum InputFormState {
    Hidden = 0,
    FadeIn = 1,
    Visible = 2,
    FadeOut = 3,
}

// Defaults are written out by hand: num_enum treats a `#[default]` variant
// as a catch-all for unknown raw values, which would defeat validation.
impl Default for Region {
    fn default() -> Self {
        Self::Europe
    }
}

impl Default for KeyboardMode {
    fn default() -> Self {
        Self::Full
    }
}

impl Default for PasswordMode {
    fn default() -> Self {
        Self::Show
    }
}

impl Default for ControllerType {
    fn default() -> Self {
        Self::DrcGamepad
    }
}

impl Default for InputFormState {
    fn default() -> Self {
        Self::Hidden
    }
}

/// Size of the opaque filesystem client block the platform expects.
pub const FS_CLIENT_SIZE: usize = 0x1700;

/// Opaque filesystem client storage, registered with the platform before
/// the keyboard is created.
#[repr(C, align(4))]
pub struct FsClient {
    _opaque: [u8; FS_CLIENT_SIZE],
}

impl FsClient {
    /// Zero-filled client block, ready to be registered.
    pub const fn zeroed() -> Self {
        Self {
            _opaque: [0u8; FS_CLIENT_SIZE],
        }
    }
}

impl std::fmt::Debug for FsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("FsClient { .. }")
    }
}

/// Argument block for creating the keyboard.
///
/// `work_memory` and `fs_client` are borrowed: whoever fills them keeps the
/// memory alive for as long as the keyboard exists. Left as `None`, the
/// session supplies its own.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CreateArg {
    pub region: Region,
    pub work_memory: Option<NonNull<u8>>,
    pub fs_client: Option<NonNull<FsClient>>,
}

/// Keyboard half of the appear argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyboardArg<'a> {
    pub language: Language,
    /// Layout id, see `to_keyboard_layout`.
    pub layout: u32,
    pub mode: KeyboardMode,
    pub controller: ControllerType,
    /// Zero-terminated UTF-16 label for the OK button.
    pub ok_label: Option<&'a [u16]>,
    pub show_word_suggestions: bool,
    pub draw_wii_pointer: bool,
}

impl Default for KeyboardArg<'_> {
    fn default() -> Self {
        Self {
            language: Language::English,
            layout: 0,
            mode: KeyboardMode::Full,
            controller: ControllerType::DrcGamepad,
            ok_label: None,
            show_word_suggestions: true,
            draw_wii_pointer: true,
        }
    }
}

/// Input form half of the appear argument.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputFormArg<'a> {
    /// Zero-terminated UTF-16 text.
    pub initial_text: Option<&'a [u16]>,
    /// Zero-terminated UTF-16 text.
    pub hint_text: Option<&'a [u16]>,
    pub password_mode: PasswordMode,
    pub highlight_initial_text: bool,
    pub show_copy_paste_buttons: bool,
}

/// Argument block for showing the keyboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AppearArg<'a> {
    pub keyboard: KeyboardArg<'a>,
    pub input_form: InputFormArg<'a>,
}
