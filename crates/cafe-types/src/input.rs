//! Controller snapshots and hardware keyboard events.
//!
//! The host reads the gamepad (VPAD) and up to four remotes (KPAD) once per
//! frame. While the software keyboard is visible those snapshots are handed
//! to it instead of the application.

/// Number of remote (KPAD) channels.
pub const KPAD_CHANNELS: usize = 4;

/// A 2D analog value.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

/// Gamepad touch panel sample.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TouchSample {
    pub x: u16,
    pub y: u16,
    pub touched: u16,
    pub validity: u16,
}

/// One gamepad (VPAD) snapshot.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct VpadStatus {
    pub hold: u32,
    pub trigger: u32,
    pub release: u32,
    pub left_stick: Vec2,
    pub right_stick: Vec2,
    pub touch: TouchSample,
}

/// One remote (KPAD) snapshot.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct KpadStatus {
    pub hold: u32,
    pub trigger: u32,
    pub release: u32,
    /// Pointer position in normalized screen space.
    pub pos: Vec2,
    /// Non-zero when the pointer is aimed at the screen.
    pub pos_valid: i8,
}

/// Controller input accumulated between two keyboard `calc` calls.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ControllerInfo {
    pub vpad: Option<VpadStatus>,
    pub kpad: [Option<KpadStatus>; KPAD_CHANNELS],
}

impl ControllerInfo {
    /// Whether no snapshot has been routed since the last reset.
    pub fn is_empty(&self) -> bool {
        self.vpad.is_none() && self.kpad.iter().all(Option::is_none)
    }

    /// Drop every stored snapshot.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// A key event from a USB keyboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyEvent {
    pub channel: u8,
    pub pressed: bool,
    /// USB HID usage code (matches the scancode numbering).
    pub hid_code: u32,
    /// UCS-2 symbol produced by the key, `0xFFFF` if none.
    pub symbol: u16,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn controller_info_starts_empty() {
        assert!(ControllerInfo::default().is_empty());
    }

    #[test]
    fn controller_info_vpad_not_empty() {
        let info = ControllerInfo {
            vpad: Some(VpadStatus::default()),
            ..Default::default()
        };
        assert!(!info.is_empty());
    }

    #[test]
    fn controller_info_kpad_not_empty() {
        let mut info = ControllerInfo::default();
        info.kpad[3] = Some(KpadStatus::default());
        assert!(!info.is_empty());
    }

    #[test]
    fn controller_info_clear() {
        let mut info = ControllerInfo::default();
        info.vpad = Some(VpadStatus {
            hold: 0x8000,
            ..Default::default()
        });
        info.kpad[0] = Some(KpadStatus::default());
        info.clear();
        assert!(info.is_empty());
    }
}
