use proptest::prelude::*;

use super::*;
use crate::gx::{GxCall, RecordingGx};

fn square_cursor(side: u16) -> Cursor {
    let pixels = vec![255u8; usize::from(side) * usize::from(side) * 4];
    Cursor::from_rgba(&pixels, side, side, usize::from(side) * 4, 0, 0).unwrap()
}

fn frame(now_ms: u32) -> FrameInfo {
    FrameInfo::new(now_ms, 640, 480)
}

fn pointer(x: i32, y: i32) -> Pointer {
    Pointer {
        shown: true,
        x,
        y,
        is_default_cursor: false,
        ir: IrState::default(),
    }
}

/// Drive the heuristic until redraw-on-demand switches on.
fn enabled() -> (CursorCompositor, RecordingGx) {
    let mut comp = CursorCompositor::default();
    let mut gx = RecordingGx::new();
    for _ in 0..12 {
        comp.prep_draw(&mut gx, &frame(0));
    }
    assert!(comp.extra_draw_enabled());
    (comp, gx)
}

// ---------------------------------------------------------------------------
// Auto-enable heuristic
// ---------------------------------------------------------------------------

#[test]
fn eleven_repeats_stay_passive() {
    let mut comp = CursorCompositor::default();
    let mut gx = RecordingGx::new();
    for _ in 0..11 {
        assert!(!comp.prep_draw(&mut gx, &frame(1000)));
    }
    assert!(!comp.extra_draw_enabled());
    comp.prep_draw(&mut gx, &frame(1000));
    assert!(comp.extra_draw_enabled());
    assert!(gx.calls.is_empty());
}

#[test]
fn new_frame_resets_call_counter() {
    let mut comp = CursorCompositor::default();
    let mut gx = RecordingGx::new();
    for _ in 0..8 {
        comp.prep_draw(&mut gx, &frame(0));
    }
    comp.draw(&mut gx, &frame(0), &pointer(10, 10), None);
    for _ in 0..11 {
        assert!(!comp.prep_draw(&mut gx, &frame(0)));
    }
    assert!(!comp.extra_draw_enabled());
    comp.prep_draw(&mut gx, &frame(0));
    assert!(comp.extra_draw_enabled());
}

#[test]
fn threshold_comes_from_config() {
    let config = CursorConfig {
        auto_enable_calls: 2,
        ..CursorConfig::default()
    };
    let mut comp = CursorCompositor::new(config);
    let mut gx = RecordingGx::new();
    for _ in 0..3 {
        comp.prep_draw(&mut gx, &frame(0));
    }
    assert!(!comp.extra_draw_enabled());
    comp.prep_draw(&mut gx, &frame(0));
    assert!(comp.extra_draw_enabled());
}

#[test]
fn render_target_and_gl_abort_early() {
    let mut comp = CursorCompositor::default();
    let mut gx = RecordingGx::new();
    let mut offscreen = frame(0);
    offscreen.render_target_set = true;
    let mut not_ready = frame(0);
    not_ready.gl_ready = Some(false);
    for _ in 0..20 {
        assert!(!comp.prep_draw(&mut gx, &offscreen));
        assert!(!comp.prep_draw(&mut gx, &not_ready));
    }
    assert!(!comp.extra_draw_enabled());
}

// ---------------------------------------------------------------------------
// Restore and throttle
// ---------------------------------------------------------------------------

#[test]
fn nothing_saved_means_no_draw() {
    let (mut comp, mut gx) = enabled();
    assert!(!comp.prep_draw(&mut gx, &frame(1000)));
}

#[test]
fn throttled_to_min_interval() {
    let (mut comp, mut gx) = enabled();
    let cursor = square_cursor(16);
    comp.draw(&mut gx, &frame(990), &pointer(100, 100), Some(&cursor));
    assert!(comp.prep_draw(&mut gx, &frame(1000)));

    comp.draw(&mut gx, &frame(1010), &pointer(110, 100), Some(&cursor));
    assert!(!comp.prep_draw(&mut gx, &frame(1020)));
    assert!(comp.prep_draw(&mut gx, &frame(1033)));
}

#[test]
fn restore_paints_saved_rect() {
    let (mut comp, mut gx) = enabled();
    let cursor = square_cursor(16);
    comp.draw(&mut gx, &frame(0), &pointer(101, 50), Some(&cursor));
    gx.calls.clear();

    let mut f = frame(100);
    f.renderer_viewport = Some(Viewport {
        x: 0,
        y: 0,
        w: 320,
        h: 240,
    });
    assert!(comp.prep_draw(&mut gx, &f));
    assert_eq!(
        gx.calls,
        vec![
            GxCall::Setup2d(Viewport {
                x: 0,
                y: 0,
                w: 640,
                h: 480
            }),
            GxCall::PixModeSync,
            GxCall::LoadTexture {
                len: 5184,
                w: 36,
                h: 36
            },
            GxCall::LoadPositionMatrix(Affine2::IDENTITY),
            GxCall::DrawQuad {
                x: 84,
                y: 32,
                w: 36,
                h: 36
            },
        ]
    );

    // The draw that follows reuses the 2D setup and restores afterwards.
    gx.calls.clear();
    comp.draw(&mut gx, &f, &pointer(120, 60), Some(&cursor));
    assert_eq!(gx.count(|c| matches!(c, GxCall::Setup2d(_))), 0);
    let n = gx.calls.len();
    assert_eq!(
        &gx.calls[n - 3..],
        &[
            GxCall::DrawDone,
            GxCall::RestoreDefaultState,
            GxCall::SetViewport(Viewport {
                x: 0,
                y: 0,
                w: 320,
                h: 240
            }),
        ]
    );
}

#[test]
fn hidden_pointer_leaves_nothing_to_restore() {
    let (mut comp, mut gx) = enabled();
    let cursor = square_cursor(16);
    comp.draw(&mut gx, &frame(0), &pointer(100, 100), Some(&cursor));
    assert!(comp.saved_rect().is_some());

    let mut hidden = pointer(100, 100);
    hidden.shown = false;
    comp.draw(&mut gx, &frame(0), &hidden, Some(&cursor));
    assert_eq!(comp.saved_rect(), None);

    gx.calls.clear();
    assert!(comp.prep_draw(&mut gx, &frame(500)));
    assert!(gx.calls.is_empty());
}

// ---------------------------------------------------------------------------
// Background rectangle
// ---------------------------------------------------------------------------

fn saved_after_draw(x: i32, y: i32) -> (SavedRect, usize) {
    let (mut comp, mut gx) = enabled();
    comp.draw(&mut gx, &frame(0), &pointer(x, y), Some(&square_cursor(16)));
    let len = gx
        .calls
        .iter()
        .find_map(|c| match c {
            GxCall::CopyFramebuffer { len, .. } => Some(*len),
            _ => None,
        })
        .unwrap();
    (comp.saved_rect().unwrap(), len)
}

#[test]
fn rect_around_pointer() {
    let (rect, len) = saved_after_draw(101, 50);
    assert_eq!(
        rect,
        SavedRect {
            x: 84,
            y: 32,
            w: 36,
            h: 36
        }
    );
    assert_eq!(len, 5184);
}

#[test]
fn rect_clipped_top_left() {
    let (rect, _) = saved_after_draw(5, 5);
    assert_eq!(
        rect,
        SavedRect {
            x: 0,
            y: 0,
            w: 24,
            h: 24
        }
    );
}

#[test]
fn rect_clipped_bottom_right() {
    let (rect, _) = saved_after_draw(630, 470);
    assert_eq!(
        rect,
        SavedRect {
            x: 612,
            y: 452,
            w: 28,
            h: 28
        }
    );
}

#[test]
fn passive_mode_saves_nothing() {
    let mut comp = CursorCompositor::default();
    let mut gx = RecordingGx::new();
    comp.draw(&mut gx, &frame(0), &pointer(100, 100), Some(&square_cursor(16)));
    assert_eq!(comp.saved_rect(), None);
    assert_eq!(
        gx.count(|c| matches!(c, GxCall::CopyFramebuffer { .. })),
        0
    );
    assert_eq!(gx.count(|c| matches!(c, GxCall::DrawQuad { .. })), 1);
}

// ---------------------------------------------------------------------------
// Cursor draw
// ---------------------------------------------------------------------------

#[test]
fn invalid_ir_hides_default_cursor() {
    let mut comp = CursorCompositor::default();
    let mut gx = RecordingGx::new();
    let mut p = pointer(100, 100);
    p.is_default_cursor = true;
    comp.draw(&mut gx, &frame(0), &p, Cursor::default_cursor().as_ref());
    assert!(gx.calls.is_empty());
    assert_eq!(comp.draw_counter(), 1);
}

#[test]
fn offscreen_or_missing_cursor_skips() {
    let mut comp = CursorCompositor::default();
    let mut gx = RecordingGx::new();
    let cursor = square_cursor(8);
    comp.draw(&mut gx, &frame(0), &pointer(-1, 10), Some(&cursor));
    comp.draw(&mut gx, &frame(0), &pointer(10, 480), Some(&cursor));
    comp.draw(&mut gx, &frame(0), &pointer(10, 10), None);
    assert!(gx.calls.is_empty());
    assert_eq!(comp.draw_counter(), 3);
}

#[test]
fn matrix_scales_to_logical_space() {
    let mut comp = CursorCompositor::default();
    let mut gx = RecordingGx::new();
    let f = FrameInfo::new(0, 1280, 720);
    comp.draw(&mut gx, &f, &pointer(100, 200), Some(&square_cursor(16)));
    let m = gx.last_matrix().unwrap();
    let (x0, y0) = m.apply(0.0, 0.0);
    let (x1, y1) = m.apply(10.0, 10.0);
    assert!((x0 - 100.0).abs() < 1e-4 && (y0 - 200.0).abs() < 1e-4);
    assert!((x1 - 120.0).abs() < 1e-4 && (y1 - 215.0).abs() < 1e-4);
}

#[test]
fn default_cursor_follows_remote_roll() {
    let mut comp = CursorCompositor::default();
    let mut gx = RecordingGx::new();
    let mut p = pointer(100, 200);
    p.is_default_cursor = true;
    p.ir = IrState {
        angle: 90.0,
        valid: true,
    };
    let cursor = Cursor::default_cursor().unwrap();
    comp.draw(&mut gx, &frame(0), &p, Some(&cursor));
    let (x, y) = gx.last_matrix().unwrap().apply(10.0, 0.0);
    assert!((x - 100.0).abs() < 1e-4 && (y - 210.0).abs() < 1e-4);
    assert!(gx.calls.contains(&GxCall::DrawQuad {
        x: -5,
        y: 0,
        w: 16,
        h: 16
    }));
}

#[test]
fn draw_sequence() {
    let mut comp = CursorCompositor::default();
    let mut gx = RecordingGx::new();
    let cursor = square_cursor(8);
    comp.draw(&mut gx, &frame(0), &pointer(50, 60), Some(&cursor));
    assert!(matches!(gx.calls[0], GxCall::LoadTexture { w: 8, h: 8, .. }));
    assert!(matches!(gx.calls[1], GxCall::LoadPositionMatrix(_)));
    assert_eq!(
        &gx.calls[2..],
        &[
            GxCall::Setup2d(Viewport {
                x: 0,
                y: 0,
                w: 640,
                h: 480
            }),
            GxCall::DrawQuad {
                x: 0,
                y: 0,
                w: 8,
                h: 8
            },
            GxCall::DrawDone,
            GxCall::RestoreDefaultState,
        ]
    );
}

proptest! {
    #[test]
    fn saved_rect_is_aligned(x in 0i32..640, y in 0i32..480, side in 1u16..=32) {
        let (mut comp, mut gx) = enabled();
        comp.draw(&mut gx, &frame(0), &pointer(x, y), Some(&square_cursor(side)));
        let rect = comp.saved_rect().unwrap();
        prop_assert!(rect.x >= 0 && rect.y >= 0);
        prop_assert_eq!(rect.x % 2, 0);
        prop_assert_eq!(rect.y % 2, 0);
        prop_assert!(rect.w > 0 && rect.h > 0);
        prop_assert_eq!(rect.w % 4, 0);
        prop_assert_eq!(rect.h % 4, 0);
        prop_assert!(i32::from(rect.x) < 640 && i32::from(rect.y) < 480);
    }
}
