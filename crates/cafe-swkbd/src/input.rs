//! Controller input routing.
//!
//! While the keyboard is visible the host hands its per-frame controller
//! snapshots here instead of processing them itself. They are consumed by
//! the next `calc`.

use cafe_types::input::{ControllerInfo, KPAD_CHANNELS, KpadStatus, VpadStatus};

/// Snapshots accumulated since the last `calc`.
#[derive(Debug, Default)]
pub struct InputRouter {
    info: ControllerInfo,
}

impl InputRouter {
    /// Store a gamepad snapshot if the keyboard is `visible`. Returns
    /// whether it was taken.
    pub fn feed_vpad(&mut self, visible: bool, status: &VpadStatus) -> bool {
        if !visible {
            return false;
        }
        self.info.vpad = Some(*status);
        true
    }

    /// Store a remote snapshot for `channel` if the keyboard is `visible`.
    /// Channels outside `0..4` are never taken.
    pub fn feed_kpad(&mut self, visible: bool, channel: i32, status: &KpadStatus) -> bool {
        let Some(slot) = usize::try_from(channel)
            .ok()
            .filter(|&c| c < KPAD_CHANNELS)
        else {
            return false;
        };
        if !visible {
            return false;
        }
        self.info.kpad[slot] = Some(*status);
        true
    }

    /// Hand over everything accumulated and start empty.
    pub fn take(&mut self) -> ControllerInfo {
        std::mem::take(&mut self.info)
    }

    pub fn pending(&self) -> &ControllerInfo {
        &self.info
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hidden_keyboard_takes_nothing() {
        let mut router = InputRouter::default();
        assert!(!router.feed_vpad(false, &VpadStatus::default()));
        assert!(!router.feed_kpad(false, 0, &KpadStatus::default()));
        assert!(router.pending().is_empty());
    }

    #[test]
    fn visible_keyboard_takes_snapshots() {
        let mut router = InputRouter::default();
        let vpad = VpadStatus {
            hold: 1,
            ..Default::default()
        };
        assert!(router.feed_vpad(true, &vpad));
        assert!(router.feed_kpad(true, 3, &KpadStatus::default()));
        let info = router.take();
        assert_eq!(info.vpad, Some(vpad));
        assert!(info.kpad[3].is_some());
        assert!(info.kpad[0].is_none());
        assert!(router.pending().is_empty());
    }

    #[test]
    fn out_of_range_channels() {
        let mut router = InputRouter::default();
        assert!(!router.feed_kpad(true, 4, &KpadStatus::default()));
        assert!(!router.feed_kpad(true, -1, &KpadStatus::default()));
        assert!(!router.feed_kpad(true, i32::MAX, &KpadStatus::default()));
        assert!(router.pending().is_empty());
    }

    #[test]
    fn later_snapshot_replaces_earlier() {
        let mut router = InputRouter::default();
        let first = VpadStatus {
            trigger: 1,
            ..Default::default()
        };
        let second = VpadStatus {
            trigger: 2,
            ..Default::default()
        };
        router.feed_vpad(true, &first);
        router.feed_vpad(true, &second);
        assert_eq!(router.take().vpad, Some(second));
    }
}
