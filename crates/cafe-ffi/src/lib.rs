//! C ABI for native video backends.
//!
//! The backend registers its SDK entry points once with
//! [`cafe_swkbd_init`], then drives the keyboard through the
//! `cafe_swkbd_*` functions from its main thread. The session lives in a
//! thread-local; calls from another thread see no session and do nothing.
//! At most one thread holds a session at a time: [`cafe_swkbd_init`] on
//! a second thread returns [`CAFE_ERR_BUSY`] until the first one quits.
//!
//! Panics are caught at every entry point and logged; they never unwind
//! into the host.

use std::cell::RefCell;
use std::ffi::{CStr, c_char, c_void};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};

use cafe_swkbd::Session;
use cafe_types::input::{KpadStatus, VpadStatus};
use cafe_types::window::Window;

pub mod abi;
pub mod host;

pub use abi::{
    CafeAppearArg, CafeControllerInfo, CafeCreateArg, CafeEventC, CafeEventFn, CafeWindow,
};
pub use host::{CafeHost, HostPlatform};

use abi::{CallbackSink, OwnedAppearArg};

pub(crate) const LOG_TARGET: &str = "video";

/// Status codes returned to the host.
pub const CAFE_OK: i32 = 0;
pub const CAFE_ERR_NULL: i32 = -1;
pub const CAFE_ERR_BUSY: i32 = -2;
pub const CAFE_ERR_PANIC: i32 = -3;

/// Set while some thread owns the session.
static SESSION_LIVE: AtomicBool = AtomicBool::new(false);

/// Claim on [`SESSION_LIVE`], released on drop. Thread exit drops the
/// thread-local state and with it the claim.
struct LiveGuard(());

impl LiveGuard {
    fn acquire() -> Option<Self> {
        SESSION_LIVE
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(()))
    }
}

impl Drop for LiveGuard {
    fn drop(&mut self) {
        SESSION_LIVE.store(false, Ordering::Release);
    }
}

struct FfiState {
    session: Session<HostPlatform>,
    /// Host appear argument copied at set time; takes precedence over
    /// the pending options on show.
    appear_arg: Option<OwnedAppearArg>,
    live: LiveGuard,
}

thread_local! {
    static STATE: RefCell<Option<FfiState>> = const { RefCell::new(None) };
}

/// Run `f` on this thread's session. Returns `default` when there is no
/// session, when called re-entrantly from a host callback, or when `f`
/// panics.
fn with_state<R>(name: &str, default: R, f: impl FnOnce(&mut FfiState) -> R) -> R {
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        STATE.with(|cell| {
            let Ok(mut slot) = cell.try_borrow_mut() else {
                log::error!(target: LOG_TARGET, "{name}: re-entrant call ignored");
                return None;
            };
            match slot.as_mut() {
                Some(state) => Some(f(state)),
                None => {
                    log::error!(target: LOG_TARGET, "{name}: keyboard not initialized");
                    None
                },
            }
        })
    }));
    match result {
        Ok(Some(value)) => value,
        Ok(None) => default,
        Err(_) => {
            log::error!(target: LOG_TARGET, "{name}: panic caught at FFI boundary");
            default
        },
    }
}

/// Borrow a C string, treating null as absent.
///
/// # Safety
///
/// `p` must be null or a valid zero-terminated string.
unsafe fn opt_cstr<'a>(p: *const c_char) -> Option<&'a CStr> {
    // SAFETY: forwarded from the caller.
    (!p.is_null()).then(|| unsafe { CStr::from_ptr(p) })
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

/// Route `log` output through `env_logger`. Safe to call more than once.
#[unsafe(no_mangle)]
pub extern "C" fn cafe_swkbd_init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
}

/// Create this thread's session over `host`, replacing any previous one.
/// Returns [`CAFE_ERR_BUSY`] while another thread holds a session.
///
/// # Safety
///
/// `host` must be null or point to a fully populated [`CafeHost`] whose
/// functions stay callable until [`cafe_swkbd_quit`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cafe_swkbd_init(host: *const CafeHost) -> i32 {
    if host.is_null() {
        log::error!(target: LOG_TARGET, "cafe_swkbd_init: null host");
        return CAFE_ERR_NULL;
    }
    // SAFETY: checked non-null; validity is the caller's contract.
    let host = unsafe { *host };
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        STATE.with(|cell| {
            let Ok(mut slot) = cell.try_borrow_mut() else {
                return CAFE_ERR_BUSY;
            };
            let live = match slot.take() {
                Some(FfiState { session, live, .. }) => {
                    // Release the platform keyboard before the new session
                    // can create it again.
                    drop(session);
                    live
                },
                None => match LiveGuard::acquire() {
                    Some(live) => live,
                    None => {
                        log::error!(target: LOG_TARGET, "cafe_swkbd_init: session live on another thread");
                        return CAFE_ERR_BUSY;
                    },
                },
            };
            *slot = Some(FfiState {
                session: Session::new(HostPlatform::new(host)),
                appear_arg: None,
                live,
            });
            log::info!(target: LOG_TARGET, "swkbd session initialized");
            CAFE_OK
        })
    }));
    result.unwrap_or(CAFE_ERR_PANIC)
}

/// Destroy this thread's session, releasing every keyboard resource.
#[unsafe(no_mangle)]
pub extern "C" fn cafe_swkbd_quit() {
    let result = panic::catch_unwind(|| {
        STATE.with(|cell| match cell.try_borrow_mut() {
            Ok(mut slot) => {
                if slot.take().is_some() {
                    log::info!(target: LOG_TARGET, "swkbd session destroyed");
                }
            },
            Err(_) => log::error!(target: LOG_TARGET, "cafe_swkbd_quit: re-entrant call ignored"),
        })
    });
    if result.is_err() {
        log::error!(target: LOG_TARGET, "cafe_swkbd_quit: panic caught at FFI boundary");
    }
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[unsafe(no_mangle)]
pub extern "C" fn cafe_swkbd_set_enabled(enabled: bool) {
    with_state("cafe_swkbd_set_enabled", (), |s| {
        s.session.set_enabled(enabled);
        if !enabled {
            s.appear_arg = None;
        }
    });
}

#[unsafe(no_mangle)]
pub extern "C" fn cafe_swkbd_has_screen_keyboard_support() -> bool {
    with_state("cafe_swkbd_has_screen_keyboard_support", false, |s| {
        s.session.has_screen_keyboard_support()
    })
}

/// Set the `language_COUNTRY` locale; null resets to the system settings.
///
/// # Safety
///
/// `locale` must be null or a valid zero-terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cafe_swkbd_set_locale(locale: *const c_char) {
    // SAFETY: forwarded from the caller.
    let locale = unsafe { opt_cstr(locale) };
    with_state("cafe_swkbd_set_locale", (), |s| match locale.map(CStr::to_str) {
        None => s.session.set_locale(None),
        Some(Ok(text)) => s.session.set_locale(Some(text)),
        Some(Err(e)) => log::error!(target: LOG_TARGET, "locale is not UTF-8: {e}"),
    });
}

/// Use a host-built create argument; null restores the default.
///
/// # Safety
///
/// `arg` must be null or point to a valid [`CafeCreateArg`]. Buffers it
/// names must stay valid until the argument is replaced or the session
/// quits.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cafe_swkbd_set_create_arg(arg: *const CafeCreateArg) {
    // SAFETY: forwarded from the caller.
    let raw = unsafe { arg.as_ref() }.copied();
    with_state("cafe_swkbd_set_create_arg", (), |s| match raw {
        None => s.session.set_create_arg(None),
        Some(raw) => match raw.to_arg() {
            Ok(arg) => s.session.set_create_arg(Some(arg)),
            Err(e) => log::error!(target: LOG_TARGET, "rejected create arg: {e}"),
        },
    });
}

/// Use a host-built appear argument; null restores the pending options.
/// The argument and its strings are copied.
///
/// # Safety
///
/// `arg` must be null or point to a valid [`CafeAppearArg`] whose string
/// pointers are null or zero-terminated UTF-16.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cafe_swkbd_set_appear_arg(arg: *const CafeAppearArg) {
    // SAFETY: forwarded from the caller.
    let owned = match unsafe { arg.as_ref() } {
        None => Ok(None),
        // SAFETY: forwarded from the caller.
        Some(raw) => unsafe { OwnedAppearArg::copy_from(raw) }.map(Some),
    };
    with_state("cafe_swkbd_set_appear_arg", (), |s| {
        if !s.session.is_enabled() {
            return;
        }
        match owned {
            Ok(arg) => s.appear_arg = arg,
            Err(e) => log::error!(target: LOG_TARGET, "rejected appear arg: {e}"),
        }
    });
}

#[unsafe(no_mangle)]
pub extern "C" fn cafe_swkbd_set_keyboard_mode(mode: u32) {
    with_state("cafe_swkbd_set_keyboard_mode", (), |s| {
        s.session.set_keyboard_mode_raw(mode)
    });
}

#[unsafe(no_mangle)]
pub extern "C" fn cafe_swkbd_set_password_mode(mode: u32) {
    with_state("cafe_swkbd_set_password_mode", (), |s| {
        s.session.set_password_mode_raw(mode)
    });
}

/// # Safety
///
/// `label` must be null or a valid zero-terminated UTF-8 string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cafe_swkbd_set_ok_label(label: *const c_char) {
    // SAFETY: forwarded from the caller.
    let label = unsafe { opt_cstr(label) };
    with_state("cafe_swkbd_set_ok_label", (), |s| {
        s.session.set_ok_label_bytes(label.map(CStr::to_bytes))
    });
}

/// # Safety
///
/// `text` must be null or a valid zero-terminated UTF-8 string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cafe_swkbd_set_initial_text(text: *const c_char) {
    // SAFETY: forwarded from the caller.
    let text = unsafe { opt_cstr(text) };
    with_state("cafe_swkbd_set_initial_text", (), |s| {
        s.session.set_initial_text_bytes(text.map(CStr::to_bytes))
    });
}

/// # Safety
///
/// `text` must be null or a valid zero-terminated UTF-8 string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cafe_swkbd_set_hint_text(text: *const c_char) {
    // SAFETY: forwarded from the caller.
    let text = unsafe { opt_cstr(text) };
    with_state("cafe_swkbd_set_hint_text", (), |s| {
        s.session.set_hint_text_bytes(text.map(CStr::to_bytes))
    });
}

#[unsafe(no_mangle)]
pub extern "C" fn cafe_swkbd_set_show_word_suggestions(show: bool) {
    with_state("cafe_swkbd_set_show_word_suggestions", (), |s| {
        s.session.set_show_word_suggestions(show)
    });
}

#[unsafe(no_mangle)]
pub extern "C" fn cafe_swkbd_set_highlight_initial_text(highlight: bool) {
    with_state("cafe_swkbd_set_highlight_initial_text", (), |s| {
        s.session.set_highlight_initial_text(highlight)
    });
}

#[unsafe(no_mangle)]
pub extern "C" fn cafe_swkbd_set_show_copy_paste_buttons(show: bool) {
    with_state("cafe_swkbd_set_show_copy_paste_buttons", (), |s| {
        s.session.set_show_copy_paste_buttons(show)
    });
}

#[unsafe(no_mangle)]
pub extern "C" fn cafe_swkbd_set_draw_wii_pointer(draw: bool) {
    with_state("cafe_swkbd_set_draw_wii_pointer", (), |s| {
        s.session.set_draw_wii_pointer(draw)
    });
}

// ---------------------------------------------------------------------------
// Show / hide
// ---------------------------------------------------------------------------

#[unsafe(no_mangle)]
pub extern "C" fn cafe_swkbd_show(window: CafeWindow) {
    let window = Window::from(window);
    with_state("cafe_swkbd_show", (), |s| match &s.appear_arg {
        Some(arg) => s.session.show_with(&window, &arg.as_arg()),
        None => s.session.show(&window),
    });
}

#[unsafe(no_mangle)]
pub extern "C" fn cafe_swkbd_hide() {
    with_state("cafe_swkbd_hide", (), |s| s.session.hide());
}

#[unsafe(no_mangle)]
pub extern "C" fn cafe_swkbd_is_shown(window: CafeWindow) -> bool {
    let window = Window::from(window);
    with_state("cafe_swkbd_is_shown", false, |s| {
        s.session.is_shown(&window)
    })
}

// ---------------------------------------------------------------------------
// Per-frame
// ---------------------------------------------------------------------------

/// Route a gamepad snapshot. Returns `true` if the keyboard consumed it.
///
/// # Safety
///
/// `status` must be null or point to a valid [`VpadStatus`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cafe_swkbd_set_vpad(status: *const VpadStatus) -> bool {
    // SAFETY: forwarded from the caller.
    let Some(status) = (unsafe { status.as_ref() }).copied() else {
        return false;
    };
    with_state("cafe_swkbd_set_vpad", false, |s| {
        s.session.set_vpad(&status)
    })
}

/// Route a remote snapshot for `channel`. Returns `true` if the keyboard
/// consumed it.
///
/// # Safety
///
/// `status` must be null or point to a valid [`KpadStatus`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cafe_swkbd_set_kpad(channel: i32, status: *const KpadStatus) -> bool {
    // SAFETY: forwarded from the caller.
    let Some(status) = (unsafe { status.as_ref() }).copied() else {
        return false;
    };
    with_state("cafe_swkbd_set_kpad", false, |s| {
        s.session.set_kpad(channel, &status)
    })
}

/// Advance the keyboard one frame. Events are delivered through `post`
/// before this returns.
#[unsafe(no_mangle)]
pub extern "C" fn cafe_swkbd_calc(post: CafeEventFn, user: *mut c_void) {
    with_state("cafe_swkbd_calc", (), |s| {
        let mut sink = CallbackSink { post, user };
        s.session.calc(&mut sink);
    });
}

#[unsafe(no_mangle)]
pub extern "C" fn cafe_swkbd_draw(window: CafeWindow) {
    let window = Window::from(window);
    with_state("cafe_swkbd_draw", (), |s| s.session.draw(&window));
}
