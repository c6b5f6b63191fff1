//! Cursor compositor walkthrough on a recording GPU.

use anyhow::{Context, Result, ensure};

use cafe_cursor::{Cursor, CursorCompositor, FrameInfo, GxCall, IrState, Pointer, RecordingGx};
use cafe_types::config::CursorConfig;

const SCREEN_W: u16 = 640;
const SCREEN_H: u16 = 480;

/// Simulate an application that presents only when its content changes
/// while the remote moves the pointer.
pub fn run(config: &CursorConfig) -> Result<()> {
    let mut compositor = CursorCompositor::new(config.clone());
    let mut gx = RecordingGx::new();
    let cursor = Cursor::default_cursor().context("no default cursor")?;
    let mut pointer = Pointer {
        shown: true,
        x: 320,
        y: 240,
        is_default_cursor: true,
        ir: IrState {
            angle: 0.0,
            valid: true,
        },
    };

    // The application presents one frame.
    let mut now = 0u32;
    compositor.draw(&mut gx, &FrameInfo::new(now, SCREEN_W, SCREEN_H), &pointer, Some(&cursor));

    // Then the video layer keeps asking whether it may redraw, at 60 Hz.
    let mut redraws = 0;
    for step in 0..120 {
        now += 16;
        pointer.x = 320 + step;
        pointer.ir.angle = step as f32;
        let frame = FrameInfo::new(now, SCREEN_W, SCREEN_H);
        if step == 20 {
            // Content changed: a regular present, which now also saves
            // the pixels under the cursor.
            compositor.draw(&mut gx, &frame, &pointer, Some(&cursor));
            continue;
        }
        if compositor.prep_draw(&mut gx, &frame) {
            compositor.draw(&mut gx, &frame, &pointer, Some(&cursor));
            redraws += 1;
        }
    }

    let restores = gx.count(|c| matches!(c, GxCall::PixModeSync));
    log::info!(
        "cursor: redraw-on-demand {}, {redraws} extra redraws, {restores} background restores",
        if compositor.extra_draw_enabled() { "on" } else { "off" },
    );
    ensure!(compositor.extra_draw_enabled(), "redraw-on-demand never enabled");
    ensure!(redraws > 0, "no extra redraws");
    // Extra redraws are throttled well below the 60 Hz polling rate.
    ensure!(redraws <= 120 / 2, "{redraws} redraws exceed the throttle");
    Ok(())
}
