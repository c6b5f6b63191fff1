//! GPU calls issued by the cursor compositor.

use crate::compositor::SavedRect;
use crate::matrix::Affine2;

/// Pixel rectangle in framebuffer coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

/// Fixed-function GPU operations needed to erase and draw the cursor.
///
/// Textures are passed in the tiled RGBA8 layout produced by
/// [`crate::texture`].
pub trait CursorGx {
    /// Orthographic 2D projection covering `viewport`, textured quads,
    /// alpha blending.
    fn setup_2d(&mut self, viewport: Viewport);
    /// Wait for pending pixel writes before touching the framebuffer.
    fn pix_mode_sync(&mut self);
    fn load_texture(&mut self, texels: &[u8], w: u16, h: u16);
    fn load_position_matrix(&mut self, matrix: &Affine2);
    /// Draw the bound texture as a `w` x `h` quad at `(x, y)` in model space.
    fn draw_quad(&mut self, x: i16, y: i16, w: u16, h: u16);
    /// Copy a framebuffer rectangle into `dst` as a tiled texture.
    fn copy_framebuffer(&mut self, rect: SavedRect, dst: &mut [u8]);
    fn draw_done(&mut self);
    /// Put back the renderer's own vertex format and blend state.
    fn restore_default_state(&mut self);
    fn set_viewport(&mut self, viewport: Viewport);
}

/// One recorded [`CursorGx`] call.
#[derive(Debug, Clone, PartialEq)]
pub enum GxCall {
    Setup2d(Viewport),
    PixModeSync,
    LoadTexture { len: usize, w: u16, h: u16 },
    LoadPositionMatrix(Affine2),
    DrawQuad { x: i16, y: i16, w: u16, h: u16 },
    CopyFramebuffer { rect: SavedRect, len: usize },
    DrawDone,
    RestoreDefaultState,
    SetViewport(Viewport),
}

/// Recording [`CursorGx`] for tests and the demo.
///
/// Framebuffer copies fill the destination with `fill`.
#[derive(Debug, Default)]
pub struct RecordingGx {
    pub calls: Vec<GxCall>,
    pub fill: u8,
}

impl RecordingGx {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, f: impl Fn(&GxCall) -> bool) -> usize {
        self.calls.iter().filter(|c| f(c)).count()
    }

    pub fn last_matrix(&self) -> Option<Affine2> {
        self.calls.iter().rev().find_map(|c| match c {
            GxCall::LoadPositionMatrix(m) => Some(*m),
            _ => None,
        })
    }
}

impl CursorGx for RecordingGx {
    fn setup_2d(&mut self, viewport: Viewport) {
        self.calls.push(GxCall::Setup2d(viewport));
    }

    fn pix_mode_sync(&mut self) {
        self.calls.push(GxCall::PixModeSync);
    }

    fn load_texture(&mut self, texels: &[u8], w: u16, h: u16) {
        self.calls.push(GxCall::LoadTexture {
            len: texels.len(),
            w,
            h,
        });
    }

    fn load_position_matrix(&mut self, matrix: &Affine2) {
        self.calls.push(GxCall::LoadPositionMatrix(*matrix));
    }

    fn draw_quad(&mut self, x: i16, y: i16, w: u16, h: u16) {
        self.calls.push(GxCall::DrawQuad { x, y, w, h });
    }

    fn copy_framebuffer(&mut self, rect: SavedRect, dst: &mut [u8]) {
        dst.fill(self.fill);
        self.calls.push(GxCall::CopyFramebuffer {
            rect,
            len: dst.len(),
        });
    }

    fn draw_done(&mut self) {
        self.calls.push(GxCall::DrawDone);
    }

    fn restore_default_state(&mut self) {
        self.calls.push(GxCall::RestoreDefaultState);
    }

    fn set_viewport(&mut self, viewport: Viewport) {
        self.calls.push(GxCall::SetViewport(viewport));
    }
}
