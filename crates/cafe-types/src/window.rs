//! Window handles as seen by the keyboard and present path.

use bitflags::bitflags;

bitflags! {
    /// Output routing flags of a window.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct WindowFlags: u32 {
        /// Only shown on the TV.
        const TV_ONLY = 0x0100_0000;
        /// Only shown on the gamepad screen.
        const GAMEPAD_ONLY = 0x0200_0000;
    }
}

/// Host-assigned window identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowId(pub u32);

/// A borrowed view of a host window. Identity is the id.
#[derive(Debug, Clone, Copy)]
pub struct Window {
    pub id: WindowId,
    pub flags: WindowFlags,
}

impl Window {
    pub fn new(id: u32, flags: WindowFlags) -> Self {
        Self {
            id: WindowId(id),
            flags,
        }
    }

    pub fn is_tv_only(&self) -> bool {
        self.flags.contains(WindowFlags::TV_ONLY)
    }

    pub fn is_gamepad_only(&self) -> bool {
        self.flags.contains(WindowFlags::GAMEPAD_ONLY)
    }
}

impl PartialEq for Window {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Window {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_ignores_flags() {
        let a = Window::new(1, WindowFlags::empty());
        let b = Window::new(1, WindowFlags::TV_ONLY);
        assert_eq!(a, b);
        assert_ne!(a, Window::new(2, WindowFlags::empty()));
    }

    #[test]
    fn routing_flags() {
        let tv = Window::new(1, WindowFlags::TV_ONLY);
        assert!(tv.is_tv_only());
        assert!(!tv.is_gamepad_only());
        let pad = Window::new(2, WindowFlags::GAMEPAD_ONLY);
        assert!(pad.is_gamepad_only());
        assert!(!pad.is_tv_only());
    }
}
