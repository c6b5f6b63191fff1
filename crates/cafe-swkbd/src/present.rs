//! Present path with keyboard compositing.
//!
//! The keyboard is drawn into the window's color buffer right before it is
//! copied to the scan buffers. It renders gamma-correct colors only into an
//! sRGB target, so an 8-bit UNORM buffer is temporarily switched to sRGB
//! for the draw.

use cafe_platform::{ScanOutService, ScanTarget, SurfaceFormat, SwkbdPlatform};
use cafe_types::window::Window;

use crate::LOG_TARGET;
use crate::session::Session;

/// Per-renderer present state.
#[derive(Debug, Default)]
pub struct Presenter {
    outputs_enabled: bool,
    frames: u64,
}

impl Presenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames presented so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Composite the keyboard if it is shown for `window`, then scan out.
    ///
    /// TV-only windows skip the gamepad copy and gamepad-only windows skip
    /// the TV copy. Both outputs are switched on after the first frame.
    pub fn present<P>(&mut self, session: &mut Session<P>, window: &Window)
    where
        P: SwkbdPlatform + ScanOutService,
    {
        if session.is_shown(window) {
            session.platform_mut().reset_context_state();
            let format = session.platform().color_buffer_format();
            if format == SurfaceFormat::UnormRgba8 {
                session
                    .platform_mut()
                    .set_color_buffer_format(SurfaceFormat::SrgbRgba8);
                session.draw(window);
                session.platform_mut().set_color_buffer_format(format);
            } else {
                session.draw(window);
            }
        }

        let platform = session.platform_mut();
        if !window.is_gamepad_only() {
            platform.copy_to_scan_buffer(ScanTarget::Tv);
        }
        if !window.is_tv_only() {
            platform.copy_to_scan_buffer(ScanTarget::Drc);
        }
        platform.swap_scan_buffers();
        platform.flush();
        platform.restore_context_state();

        if !self.outputs_enabled {
            platform.set_tv_enable(true);
            platform.set_drc_enable(true);
            self.outputs_enabled = true;
            log::debug!(target: LOG_TARGET, "scan-out enabled after first frame");
        }
        self.frames += 1;
    }
}
