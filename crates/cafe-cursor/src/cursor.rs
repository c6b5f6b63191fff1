//! Cursor images.

use cafe_types::error::{CafeError, Result};

use crate::LOG_TARGET;
use crate::texture;

/// A cursor image uploaded in tiled RGBA8 layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor {
    texels: Vec<u8>,
    w: u16,
    h: u16,
    hot_x: i16,
    hot_y: i16,
}

/// Cursor shapes a windowing layer may ask for by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SystemCursor {
    Arrow,
    IBeam,
    Wait,
    Crosshair,
    WaitArrow,
    SizeNwse,
    SizeNesw,
    SizeWe,
    SizeNs,
    SizeAll,
    No,
    Hand,
}

impl Cursor {
    /// Build a cursor from linear RGBA8 pixels with `pitch` bytes per row.
    ///
    /// Rows must be tightly packed and the hot spot must lie inside the
    /// image.
    pub fn from_rgba(
        pixels: &[u8],
        w: u16,
        h: u16,
        pitch: usize,
        hot_x: i16,
        hot_y: i16,
    ) -> Result<Self> {
        let row = usize::from(w) * 4;
        if pitch != row {
            return Err(CafeError::InvalidArgument(format!(
                "cursor pitch {pitch} != {row}"
            )));
        }
        if !(0..i32::from(w)).contains(&i32::from(hot_x))
            || !(0..i32::from(h)).contains(&i32::from(hot_y))
        {
            return Err(CafeError::InvalidArgument(format!(
                "cursor hot spot ({hot_x}, {hot_y}) outside {w}x{h}"
            )));
        }
        let needed = row * usize::from(h);
        if pixels.len() < needed {
            return Err(CafeError::InvalidArgument(format!(
                "cursor needs {needed} bytes, got {}",
                pixels.len()
            )));
        }
        Ok(Self {
            texels: texture::rgba_to_tiled(pixels, w, h),
            w,
            h,
            hot_x,
            hot_y,
        })
    }

    /// Built-in cursor for `id`. Only the arrow and hand exist.
    pub fn system(id: SystemCursor) -> Option<Self> {
        let (bitmap, hot_x, hot_y) = match id {
            SystemCursor::Arrow => (&ARROW, 0, 0),
            SystemCursor::Hand => (&HAND, 5, 0),
            other => {
                log::warn!(target: LOG_TARGET, "unhandled system cursor {other:?}");
                return None;
            },
        };
        let pixels = expand(bitmap);
        Self::from_rgba(&pixels, SIDE as u16, SIDE as u16, SIDE * 4, hot_x, hot_y).ok()
    }

    /// Cursor drawn when the application sets none.
    pub fn default_cursor() -> Option<Self> {
        Self::system(SystemCursor::Hand)
    }

    pub fn texels(&self) -> &[u8] {
        &self.texels
    }

    pub fn width(&self) -> u16 {
        self.w
    }

    pub fn height(&self) -> u16 {
        self.h
    }

    pub fn hot_spot(&self) -> (i16, i16) {
        (self.hot_x, self.hot_y)
    }
}

// ---------------------------------------------------------------------------
// Built-in bitmaps
// ---------------------------------------------------------------------------

const SIDE: usize = 16;

// 0 = transparent, 1 = fill, 2 = outline.
#[rustfmt::skip]
const ARROW: [[u8; SIDE]; SIDE] = [
    [2,2,0,0,0,0,0,0,0,0,0,0,0,0,0,0],
    [2,1,2,0,0,0,0,0,0,0,0,0,0,0,0,0],
    [2,1,1,2,0,0,0,0,0,0,0,0,0,0,0,0],
    [2,1,1,1,2,0,0,0,0,0,0,0,0,0,0,0],
    [2,1,1,1,1,2,0,0,0,0,0,0,0,0,0,0],
    [2,1,1,1,1,1,2,0,0,0,0,0,0,0,0,0],
    [2,1,1,1,1,1,1,2,0,0,0,0,0,0,0,0],
    [2,1,1,1,1,1,1,1,2,0,0,0,0,0,0,0],
    [2,1,1,1,1,1,1,1,1,2,0,0,0,0,0,0],
    [2,1,1,1,1,1,1,2,2,2,2,0,0,0,0,0],
    [2,1,1,2,1,1,2,0,0,0,0,0,0,0,0,0],
    [2,1,2,0,2,1,1,2,0,0,0,0,0,0,0,0],
    [2,2,0,0,2,1,1,2,0,0,0,0,0,0,0,0],
    [0,0,0,0,0,2,1,1,2,0,0,0,0,0,0,0],
    [0,0,0,0,0,2,1,1,2,0,0,0,0,0,0,0],
    [0,0,0,0,0,0,2,2,0,0,0,0,0,0,0,0],
];

#[rustfmt::skip]
const HAND: [[u8; SIDE]; SIDE] = [
    [0,0,0,0,2,2,0,0,0,0,0,0,0,0,0,0],
    [0,0,0,2,1,1,2,0,0,0,0,0,0,0,0,0],
    [0,0,0,2,1,1,2,0,0,0,0,0,0,0,0,0],
    [0,0,0,2,1,1,2,0,0,0,0,0,0,0,0,0],
    [0,0,0,2,1,1,2,2,2,0,0,0,0,0,0,0],
    [0,0,0,2,1,1,2,1,1,2,2,0,0,0,0,0],
    [0,2,2,2,1,1,2,1,1,2,1,2,2,0,0,0],
    [2,1,1,2,1,1,1,1,1,2,1,2,1,2,0,0],
    [2,1,1,2,1,1,1,1,1,1,1,1,1,2,0,0],
    [0,2,1,1,1,1,1,1,1,1,1,1,1,2,0,0],
    [0,0,2,1,1,1,1,1,1,1,1,1,1,2,0,0],
    [0,0,2,1,1,1,1,1,1,1,1,1,2,0,0,0],
    [0,0,0,2,1,1,1,1,1,1,1,1,2,0,0,0],
    [0,0,0,0,2,1,1,1,1,1,1,2,0,0,0,0],
    [0,0,0,0,2,1,1,1,1,1,1,2,0,0,0,0],
    [0,0,0,0,2,2,2,2,2,2,2,2,0,0,0,0],
];

fn expand(bitmap: &[[u8; SIDE]; SIDE]) -> Vec<u8> {
    let mut pixels = vec![0u8; SIDE * SIDE * 4];
    for (y, row) in bitmap.iter().enumerate() {
        for (x, &val) in row.iter().enumerate() {
            let px = &mut pixels[(y * SIDE + x) * 4..][..4];
            match val {
                1 => px.copy_from_slice(&[255, 255, 255, 255]),
                2 => px.copy_from_slice(&[0, 0, 0, 255]),
                _ => {},
            }
        }
    }
    pixels
}
