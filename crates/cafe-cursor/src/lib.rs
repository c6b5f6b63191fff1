//! Pointer cursor overlay.
//!
//! Some applications only present when their content changes, which would
//! leave a remote-driven pointer frozen between presents. The
//! [`CursorCompositor`] notices that pattern and redraws the cursor on its
//! own: before each extra swap it paints back the pixels it saved from
//! under the previous cursor, then draws the cursor at its new position.

pub mod compositor;
pub mod cursor;
pub mod gx;
pub mod matrix;
pub mod texture;

pub use compositor::{CursorCompositor, FrameInfo, IrState, Pointer, SavedRect};
pub use cursor::{Cursor, SystemCursor};
pub use gx::{CursorGx, GxCall, RecordingGx, Viewport};
pub use matrix::Affine2;

pub(crate) const LOG_TARGET: &str = "video";
