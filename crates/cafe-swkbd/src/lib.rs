//! Software keyboard integration.
//!
//! [`Session`] owns the platform keyboard: it creates it lazily on the
//! first show, routes controller input to it while it is visible, turns
//! OK/cancel into application events, and releases every large buffer when
//! the feature is switched off. All buffers are charged to one [`Heap`].
//!
//! Per frame the host calls, in order: [`Session::set_vpad`] /
//! [`Session::set_kpad`], [`Session::calc`], then [`Presenter::present`]
//! (or [`Session::draw`] from its own present).

pub mod appearance;
pub mod codec;
pub mod heap;
pub mod hwkbd;
pub mod input;
pub mod locale;
pub mod present;
pub mod session;
pub mod settings;

pub use heap::{Heap, HeapBox, HeapVec, TrackingAllocator};
pub use hwkbd::KeyboardPump;
pub use present::Presenter;
pub use session::{Session, SessionState};

/// Log target shared by everything in the video subsystem.
pub(crate) const LOG_TARGET: &str = "video";
