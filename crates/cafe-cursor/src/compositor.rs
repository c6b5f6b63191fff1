//! Two-phase cursor overlay around the renderer's present.
//!
//! [`CursorCompositor::draw`] runs during every present: it saves the
//! framebuffer pixels under the cursor (once redraw-on-demand is active)
//! and draws the cursor on top. [`CursorCompositor::prep_draw`] runs before
//! an extra swap the video layer wants to issue on its own, e.g. because
//! the pointer moved: it paints the saved pixels back so the old cursor
//! disappears, and tells the caller whether to go ahead.
//!
//! The saved background is either empty or valid for the rectangle of the
//! cursor drawn in the previous frame. Its `x` is set to [`SENTINEL_X`]
//! at the start of each draw until a fresh save replaces it.

use cafe_types::config::CursorConfig;

use crate::LOG_TARGET;
use crate::cursor::Cursor;
use crate::gx::{CursorGx, Viewport};
use crate::matrix::Affine2;
use crate::texture;

/// Background origin meaning "nothing to restore this frame".
pub const SENTINEL_X: i16 = i16::MIN;

/// Per-call view of the display and renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInfo {
    /// Monotonic milliseconds.
    pub now_ms: u32,
    pub screen_w: u16,
    pub screen_h: u16,
    /// The renderer is drawing into an offscreen target.
    pub render_target_set: bool,
    /// `Some(ready)` when a GL layer is loaded.
    pub gl_ready: Option<bool>,
    /// Viewport to hand back to the renderer after the overlay.
    pub renderer_viewport: Option<Viewport>,
}

impl FrameInfo {
    pub fn new(now_ms: u32, screen_w: u16, screen_h: u16) -> Self {
        Self {
            now_ms,
            screen_w,
            screen_h,
            render_target_set: false,
            gl_ready: None,
            renderer_viewport: None,
        }
    }

    fn screen_viewport(&self) -> Viewport {
        Viewport {
            x: 0,
            y: 0,
            w: i32::from(self.screen_w),
            h: i32::from(self.screen_h),
        }
    }
}

/// Remote pointer orientation.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct IrState {
    /// Roll in degrees.
    pub angle: f32,
    /// The remote is pointed at the screen.
    pub valid: bool,
}

/// Pointer state sampled by the input layer, in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pointer {
    pub shown: bool,
    pub x: i32,
    pub y: i32,
    /// The application has not set a cursor of its own. The default
    /// cursor follows the remote's roll and hides when the remote points
    /// away from the screen.
    pub is_default_cursor: bool,
    pub ir: IrState,
}

/// Framebuffer rectangle saved from under the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SavedRect {
    pub x: i16,
    pub y: i16,
    pub w: u16,
    pub h: u16,
}

#[derive(Debug)]
struct Background {
    texels: Vec<u8>,
    rect: SavedRect,
    max_side: u16,
}

impl Default for Background {
    fn default() -> Self {
        Self {
            texels: Vec::new(),
            rect: SavedRect {
                x: SENTINEL_X,
                y: 0,
                w: 0,
                h: 0,
            },
            max_side: 0,
        }
    }
}

/// Cursor overlay state for one display.
#[derive(Debug)]
pub struct CursorCompositor {
    config: CursorConfig,
    background: Background,
    draw_counter: u32,
    call_counter: u32,
    last_draw_counter: u32,
    last_draw_ms: u32,
    extra_draw_enabled: bool,
    viewport_2d_ready: bool,
}

impl CursorCompositor {
    pub fn new(config: CursorConfig) -> Self {
        Self {
            config,
            background: Background::default(),
            draw_counter: 0,
            call_counter: 0,
            last_draw_counter: 0,
            last_draw_ms: 0,
            extra_draw_enabled: false,
            viewport_2d_ready: false,
        }
    }

    /// Redraw-on-demand has been detected.
    pub fn extra_draw_enabled(&self) -> bool {
        self.extra_draw_enabled
    }

    /// Presents seen so far.
    pub fn draw_counter(&self) -> u32 {
        self.draw_counter
    }

    /// Rectangle that the next [`prep_draw`](Self::prep_draw) will restore.
    pub fn saved_rect(&self) -> Option<SavedRect> {
        let rect = self.background.rect;
        (!self.background.texels.is_empty() && rect.x != SENTINEL_X).then_some(rect)
    }

    /// Erase the previous cursor before an extra swap.
    ///
    /// Returns whether the caller should draw the cursor and swap now.
    /// Nothing is drawn until the application is seen presenting the same
    /// frame repeatedly, and extra swaps are throttled to
    /// `min_frame_interval_ms`.
    pub fn prep_draw<G: CursorGx + ?Sized>(&mut self, gx: &mut G, frame: &FrameInfo) -> bool {
        if frame.render_target_set || frame.gl_ready == Some(false) {
            return false;
        }

        if !self.extra_draw_enabled {
            if self.last_draw_counter != self.draw_counter {
                self.call_counter = 1;
                self.last_draw_counter = self.draw_counter;
                return false;
            }
            let calls = self.call_counter;
            self.call_counter += 1;
            if calls <= self.config.auto_enable_calls {
                return false;
            }
            self.extra_draw_enabled = true;
            log::debug!(
                target: LOG_TARGET,
                "{calls} presents without a new frame, cursor redraw-on-demand enabled"
            );
        }

        let elapsed = frame.now_ms.wrapping_sub(self.last_draw_ms);
        if elapsed < self.config.min_frame_interval_ms {
            return false;
        }

        if self.background.texels.is_empty() {
            return false;
        }

        let rect = self.background.rect;
        if rect.x != SENTINEL_X {
            self.setup_2d(gx, frame);
            gx.pix_mode_sync();
            let len = texture::texture_size(rect.w, rect.h);
            gx.load_texture(&self.background.texels[..len], rect.w, rect.h);
            gx.load_position_matrix(&Affine2::IDENTITY);
            gx.draw_quad(rect.x, rect.y, rect.w, rect.h);
            self.last_draw_ms = frame.now_ms;
        }
        true
    }

    /// Draw `cursor` at the pointer, then hand the viewport back to the
    /// renderer.
    pub fn draw<G: CursorGx + ?Sized>(
        &mut self,
        gx: &mut G,
        frame: &FrameInfo,
        pointer: &Pointer,
        cursor: Option<&Cursor>,
    ) {
        self.draw_counter = self.draw_counter.wrapping_add(1);
        self.background.rect.x = SENTINEL_X;

        if let Some(cursor) = cursor {
            self.draw_cursor(gx, frame, pointer, cursor);
        }
        if self.viewport_2d_ready {
            self.restore_viewport(gx, frame);
        }
    }

    fn draw_cursor<G: CursorGx + ?Sized>(
        &mut self,
        gx: &mut G,
        frame: &FrameInfo,
        pointer: &Pointer,
        cursor: &Cursor,
    ) {
        if !pointer.shown
            || pointer.x < 0
            || pointer.y < 0
            || pointer.x >= i32::from(frame.screen_w)
            || pointer.y >= i32::from(frame.screen_h)
        {
            return;
        }

        let mut angle = 0.0;
        if pointer.is_default_cursor {
            if !pointer.ir.valid {
                return;
            }
            angle = pointer.ir.angle;
        }

        if self.extra_draw_enabled {
            self.save_background(gx, frame, pointer, cursor);
        }

        gx.load_texture(cursor.texels(), cursor.width(), cursor.height());

        let mut mv = Affine2::scale(
            f32::from(frame.screen_w) / self.config.logical_width,
            f32::from(frame.screen_h) / self.config.logical_height,
        );
        if angle != 0.0 {
            mv = mv.concat(&Affine2::rotation_deg(angle));
        }
        mv.translate(pointer.x as f32, pointer.y as f32);
        gx.load_position_matrix(&mv);

        self.setup_2d(gx, frame);
        let (hot_x, hot_y) = cursor.hot_spot();
        gx.draw_quad(-hot_x, -hot_y, cursor.width(), cursor.height());
        gx.draw_done();
    }

    /// Copy the square around the pointer that any rotation of `cursor`
    /// fits in.
    fn save_background<G: CursorGx + ?Sized>(
        &mut self,
        gx: &mut G,
        frame: &FrameInfo,
        pointer: &Pointer,
        cursor: &Cursor,
    ) {
        let (screen_w, screen_h) = (i32::from(frame.screen_w), i32::from(frame.screen_h));
        // +1 covers rounding the origin down to even.
        let radius = i32::from(cursor.width().max(cursor.height())) + 1;
        let mut x = pointer.x - radius;
        let mut y = pointer.y - radius;
        if x % 2 != 0 {
            x -= 1;
        }
        if y % 2 != 0 {
            y -= 1;
        }
        let mut side = radius * 2;
        let (mut w, mut h) = (side, side);
        if x < 0 {
            w += x;
            x = 0;
        } else if x + w > screen_w {
            w = screen_w - x;
        }
        if y < 0 {
            h += y;
            y = 0;
        } else if y + h > screen_h {
            h = screen_h - y;
        }
        if w <= 0 || h <= 0 {
            return;
        }
        side = texture::align4(side);
        w = texture::align4(w);
        h = texture::align4(h);

        let (Ok(side), Ok(w), Ok(h), Ok(x), Ok(y)) = (
            u16::try_from(side),
            u16::try_from(w),
            u16::try_from(h),
            i16::try_from(x),
            i16::try_from(y),
        ) else {
            log::warn!(target: LOG_TARGET, "cursor background out of range");
            return;
        };

        let bg = &mut self.background;
        if bg.texels.is_empty() || side > bg.max_side {
            bg.texels = vec![0; texture::texture_size(side, side)];
            bg.max_side = side;
        }
        let rect = SavedRect { x, y, w, h };
        let len = texture::texture_size(w, h);
        gx.copy_framebuffer(rect, &mut bg.texels[..len]);
        bg.rect = rect;
    }

    fn setup_2d<G: CursorGx + ?Sized>(&mut self, gx: &mut G, frame: &FrameInfo) {
        if self.viewport_2d_ready {
            return;
        }
        gx.setup_2d(frame.screen_viewport());
        self.viewport_2d_ready = true;
    }

    /// Give the renderer back its state and viewport.
    pub fn restore_viewport<G: CursorGx + ?Sized>(&mut self, gx: &mut G, frame: &FrameInfo) {
        self.viewport_2d_ready = false;
        gx.restore_default_state();
        if let Some(viewport) = frame.renderer_viewport {
            gx.set_viewport(viewport);
        }
    }
}

impl Default for CursorCompositor {
    fn default() -> Self {
        Self::new(CursorConfig::default())
    }
}

#[cfg(test)]
mod tests;
