//! The keyboard session.
//!
//! One [`Session`] wraps the platform keyboard for the whole process. The
//! platform object is created lazily by the first show and destroyed by
//! [`Session::finalize`]; work memory and the filesystem client survive a
//! finalize so a region switch does not reallocate them. Only switching
//! the session off releases everything.
//!
//! ```text
//! Uncreated --show--> Hidden --show--> Visible
//!     ^                  |  ^             |
//!     +----finalize------+  +-hide/OK/cancel
//! ```

use cafe_platform::SwkbdPlatform;
use cafe_types::config::SwkbdConfig;
use cafe_types::error::{CafeError, Result};
use cafe_types::event::{CafeEvent, EventSink, SysWmEvent};
use cafe_types::input::{KpadStatus, VpadStatus};
use cafe_types::swkbd::{
    AppearArg, ControllerType, CreateArg, FsClient, InputFormState, KeyboardMode, Language,
    PasswordMode, Region,
};
use cafe_types::window::Window;

use crate::LOG_TARGET;
use crate::appearance::Appearance;
use crate::codec;
use crate::heap::{Heap, HeapBox, HeapVec};
use crate::input::InputRouter;
use crate::locale;
use crate::settings::SystemSettings;

/// Coarse session state, as seen from outside.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No platform keyboard exists.
    Uncreated,
    /// Created, input form hidden.
    Hidden,
    /// Created, input form on screen (including fade animations).
    Visible,
}

/// Software keyboard session over a platform `P`.
pub struct Session<P: SwkbdPlatform> {
    platform: P,
    heap: Heap,
    enabled: bool,
    created: bool,
    fs_lib_initialized: bool,
    region: Option<Region>,
    work_memory: HeapVec<u8>,
    fs_client: Option<HeapBox<FsClient>>,
    locale: Option<String>,
    locale_used_at_create: Option<String>,
    custom_create: Option<CreateArg>,
    custom_appear: Option<AppearArg<'static>>,
    appearance: Appearance,
    active_window: Option<Window>,
    input: InputRouter,
    settings: SystemSettings,
}

impl<P: SwkbdPlatform> Session<P> {
    /// Enabled session allocating from the process allocator.
    pub fn new(platform: P) -> Self {
        Self::with_heap(platform, Heap::system())
    }

    pub fn with_heap(platform: P, heap: Heap) -> Self {
        Self {
            platform,
            enabled: true,
            created: false,
            fs_lib_initialized: false,
            region: None,
            work_memory: HeapVec::new_in(&heap),
            fs_client: None,
            locale: None,
            locale_used_at_create: None,
            custom_create: None,
            custom_appear: None,
            appearance: Appearance::new(&heap),
            active_window: None,
            input: InputRouter::default(),
            settings: SystemSettings::default(),
            heap,
        }
    }

    /// Apply the `[swkbd]` configuration section.
    pub fn apply_config(&mut self, config: &SwkbdConfig) {
        self.set_enabled(config.enabled);
        self.set_locale(config.locale.as_deref());
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }

    pub fn heap(&self) -> &Heap {
        &self.heap
    }

    // -----------------------------------------------------------------------
    // Switches and overrides
    // -----------------------------------------------------------------------

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Whether the host should advertise screen keyboard support.
    pub fn has_screen_keyboard_support(&self) -> bool {
        self.enabled
    }

    /// Master switch. Turning the session off destroys the keyboard and
    /// frees every buffer it owns; while off, every other operation is a
    /// no-op.
    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled == enabled {
            return;
        }
        self.enabled = enabled;
        if !enabled {
            self.finalize();
            self.release_buffers();
            log::info!(target: LOG_TARGET, "software keyboard disabled");
        }
    }

    /// Current locale override, if any.
    pub fn locale(&self) -> Option<&str> {
        self.locale.as_deref()
    }

    /// Locale the current keyboard was created with.
    pub fn locale_used_at_create(&self) -> Option<&str> {
        self.locale_used_at_create.as_deref()
    }

    /// Set the `language_COUNTRY` locale. `None` and `""` both clear it.
    /// A different locale destroys the keyboard so the next show recreates
    /// it for the new region.
    pub fn set_locale(&mut self, locale: Option<&str>) {
        if !self.enabled {
            return;
        }
        let locale = locale.filter(|l| !l.is_empty());
        if self.locale.as_deref() == locale {
            return;
        }
        self.finalize();
        self.locale = locale.map(str::to_owned);
        log::debug!(target: LOG_TARGET, "swkbd locale set to {:?}", self.locale);
    }

    /// Replace region and buffer resolution with a caller-built argument.
    /// Always destroys the keyboard.
    pub fn set_create_arg(&mut self, arg: Option<CreateArg>) {
        if !self.enabled {
            return;
        }
        self.custom_create = arg;
        self.finalize();
    }

    /// Replace appearance resolution with a caller-built argument.
    pub fn set_appear_arg(&mut self, arg: Option<AppearArg<'static>>) {
        if !self.enabled {
            return;
        }
        self.custom_appear = arg;
    }

    // -----------------------------------------------------------------------
    // Appearance options
    // -----------------------------------------------------------------------

    /// Pending options for the next show.
    pub fn appearance(&self) -> &Appearance {
        &self.appearance
    }

    pub fn set_keyboard_mode(&mut self, mode: KeyboardMode) {
        if self.enabled {
            self.appearance.set_keyboard_mode(mode);
        }
    }

    /// Raw variant; unknown values are logged and ignored.
    pub fn set_keyboard_mode_raw(&mut self, raw: u32) {
        if self.enabled {
            log_setter("keyboard mode", self.appearance.set_keyboard_mode_raw(raw));
        }
    }

    pub fn set_password_mode(&mut self, mode: PasswordMode) {
        if self.enabled {
            self.appearance.set_password_mode(mode);
        }
    }

    /// Raw variant; unknown values are logged and ignored.
    pub fn set_password_mode_raw(&mut self, raw: u32) {
        if self.enabled {
            log_setter("password mode", self.appearance.set_password_mode_raw(raw));
        }
    }

    pub fn set_ok_label(&mut self, label: Option<&str>) {
        if self.enabled {
            log_setter("OK label", self.appearance.set_ok_label(label));
        }
    }

    pub fn set_initial_text(&mut self, text: Option<&str>) {
        if self.enabled {
            log_setter("initial text", self.appearance.set_initial_text(text));
        }
    }

    pub fn set_hint_text(&mut self, text: Option<&str>) {
        if self.enabled {
            log_setter("hint text", self.appearance.set_hint_text(text));
        }
    }

    pub fn set_ok_label_bytes(&mut self, label: Option<&[u8]>) {
        if self.enabled {
            log_setter("OK label", self.appearance.set_ok_label_bytes(label));
        }
    }

    pub fn set_initial_text_bytes(&mut self, text: Option<&[u8]>) {
        if self.enabled {
            log_setter("initial text", self.appearance.set_initial_text_bytes(text));
        }
    }

    pub fn set_hint_text_bytes(&mut self, text: Option<&[u8]>) {
        if self.enabled {
            log_setter("hint text", self.appearance.set_hint_text_bytes(text));
        }
    }

    pub fn set_show_word_suggestions(&mut self, show: bool) {
        if self.enabled {
            self.appearance.set_show_word_suggestions(show);
        }
    }

    pub fn set_highlight_initial_text(&mut self, highlight: bool) {
        if self.enabled {
            self.appearance.set_highlight_initial_text(highlight);
        }
    }

    pub fn set_show_copy_paste_buttons(&mut self, show: bool) {
        if self.enabled {
            self.appearance.set_show_copy_paste_buttons(show);
        }
    }

    pub fn set_draw_wii_pointer(&mut self, draw: bool) {
        if self.enabled {
            self.appearance.set_draw_wii_pointer(draw);
        }
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    pub fn is_created(&self) -> bool {
        self.created
    }

    /// Region the current keyboard was created with.
    pub fn region(&self) -> Option<Region> {
        self.region
    }

    pub fn state(&self) -> SessionState {
        if !self.created {
            return SessionState::Uncreated;
        }
        match self.platform.input_form_state() {
            InputFormState::Hidden => SessionState::Hidden,
            _ => SessionState::Visible,
        }
    }

    /// Create the platform keyboard if it does not exist yet.
    pub fn ensure_created(&mut self) -> Result<()> {
        if self.created || !self.enabled {
            return Ok(());
        }
        if !self.fs_lib_initialized {
            self.platform.fs_init();
            self.fs_lib_initialized = true;
        }

        let mut arg = match self.custom_create {
            Some(custom) => custom,
            None => CreateArg {
                region: self.resolve_region(),
                ..CreateArg::default()
            },
        };

        match arg.fs_client {
            None => {
                if self.fs_client.is_none() {
                    self.fs_client = Some(self.new_fs_client()?);
                }
                arg.fs_client = self.fs_client.as_ref().map(HeapBox::as_non_null);
            },
            Some(_) => self.release_fs_client(),
        }

        match arg.work_memory {
            None => {
                let size = self.platform.work_memory_size(0);
                if self.work_memory.len() != size {
                    self.work_memory.resize(size, 0)?;
                    self.work_memory.shrink_to_fit()?;
                }
                arg.work_memory = self.work_memory.as_non_null();
            },
            Some(_) => self.work_memory.release(),
        }

        if !self.platform.create(&arg) {
            return Err(CafeError::Platform("nn::swkbd::Create() failed".into()));
        }
        self.region = Some(arg.region);
        self.locale_used_at_create = self.locale.clone();
        self.created = true;
        log::info!(target: LOG_TARGET, "swkbd created for region {:?}", arg.region);
        Ok(())
    }

    /// Destroy the platform keyboard, keeping buffers for the next create.
    pub fn finalize(&mut self) {
        if !self.created {
            return;
        }
        self.platform.destroy();
        self.active_window = None;
        self.region = None;
        self.created = false;
        log::debug!(target: LOG_TARGET, "swkbd destroyed");
    }

    fn resolve_region(&mut self) -> Region {
        let (language, country) = locale::parse_locale(self.locale.as_deref().unwrap_or(""));
        match locale::to_region(language, country) {
            Some(region) => region,
            None => self.settings.region(&mut self.platform),
        }
    }

    fn resolve_language(&mut self) -> Language {
        let (language, country) = locale::parse_locale(self.locale.as_deref().unwrap_or(""));
        match locale::to_language(language, country) {
            Some(language) => language,
            None => self.settings.language(&mut self.platform),
        }
    }

    fn new_fs_client(&mut self) -> Result<HeapBox<FsClient>> {
        let client = HeapBox::new_in(FsClient::zeroed(), &self.heap)?;
        self.platform.add_client(client.as_non_null())?;
        Ok(client)
    }

    fn release_fs_client(&mut self) {
        if let Some(client) = self.fs_client.take() {
            self.platform.del_client(client.as_non_null());
        }
    }

    /// Free every buffer charged to the session heap.
    fn release_buffers(&mut self) {
        debug_assert!(!self.created);
        self.region = None;
        self.release_fs_client();
        self.work_memory.release();
        self.appearance.reset();
    }

    // -----------------------------------------------------------------------
    // Show / hide
    // -----------------------------------------------------------------------

    /// Window the keyboard is bound to.
    pub fn active_window(&self) -> Option<&Window> {
        self.active_window.as_ref()
    }

    /// Show the keyboard for `window`, using the custom appear argument if
    /// one is set and the pending options otherwise.
    pub fn show(&mut self, window: &Window) {
        match self.custom_appear {
            Some(arg) => self.show_with(window, &arg),
            None => self.show_inner(window, None),
        }
    }

    /// Show the keyboard with an explicit appear argument.
    pub fn show_with(&mut self, window: &Window, arg: &AppearArg<'_>) {
        self.show_inner(window, Some(arg));
    }

    fn show_inner(&mut self, window: &Window, custom: Option<&AppearArg<'_>>) {
        if !self.enabled {
            return;
        }
        if let Err(e) = self.ensure_created() {
            log::error!(target: LOG_TARGET, "swkbd show aborted: {e}");
            return;
        }
        if self.active_window.is_none() {
            self.active_window = Some(*window);
        }

        let appeared = match custom {
            Some(arg) => self.platform.appear_input_form(arg),
            None => {
                let language = self.resolve_language();
                let layout = locale::to_keyboard_layout(
                    language,
                    self.region.unwrap_or(Region::Europe),
                );
                let controller = if window.is_tv_only() {
                    ControllerType::WiiRemote0
                } else {
                    ControllerType::DrcGamepad
                };
                let arg = self.appearance.appear_arg(language, layout, controller);
                self.platform.appear_input_form(&arg)
            },
        };
        if appeared {
            self.appearance.reset();
        } else {
            log::error!(target: LOG_TARGET, "nn::swkbd::AppearInputForm() failed");
        }
    }

    /// Start hiding the input form. The window binding is dropped by the
    /// next [`calc`](Self::calc) that sees the form hidden.
    pub fn hide(&mut self) {
        if !self.created {
            return;
        }
        self.platform.disappear_input_form();
    }

    /// Whether the keyboard is on screen for `window`.
    pub fn is_shown(&self, window: &Window) -> bool {
        self.created
            && self.active_window.as_ref() == Some(window)
            && self.platform.input_form_state() != InputFormState::Hidden
    }

    /// Whether the keyboard is on screen for any window.
    pub fn is_visible(&self) -> bool {
        self.created && self.platform.input_form_state() != InputFormState::Hidden
    }

    // -----------------------------------------------------------------------
    // Per-frame
    // -----------------------------------------------------------------------

    fn accepts_input(&self) -> bool {
        self.enabled && self.created && self.platform.input_form_state() == InputFormState::Visible
    }

    /// Route a gamepad snapshot to the keyboard. Returns `true` if the
    /// keyboard took it and the application should ignore it.
    pub fn set_vpad(&mut self, status: &VpadStatus) -> bool {
        let visible = self.accepts_input();
        self.input.feed_vpad(visible, status)
    }

    /// Route a remote snapshot for `channel` (`0..4`) to the keyboard.
    pub fn set_kpad(&mut self, channel: i32, status: &KpadStatus) -> bool {
        let visible = self.accepts_input();
        self.input.feed_kpad(visible, channel, status)
    }

    /// Advance the keyboard one frame and post commit/cancel events.
    ///
    /// A commit posts `SwkbdOkStart`, the text, then `SwkbdOkFinish`; text
    /// that fails to convert is dropped but both markers are still sent. A
    /// cancel hides the keyboard and posts `SwkbdCancel`.
    pub fn calc<E: EventSink + ?Sized>(&mut self, events: &mut E) {
        if !self.created || !self.enabled {
            return;
        }

        let info = self.input.take();
        self.platform.calc(&info);

        if self.platform.is_need_calc_sub_thread_font() {
            self.platform.calc_sub_thread_font();
        }
        if self.platform.is_need_calc_sub_thread_predict() {
            self.platform.calc_sub_thread_predict();
        }

        if self.active_window.is_some()
            && self.platform.input_form_state() == InputFormState::Hidden
        {
            self.active_window = None;
        }

        if self.platform.is_decide_ok_button() {
            events.post(CafeEvent::SysWm(SysWmEvent::SwkbdOkStart));
            if let Some(units) = self.platform.input_form_string() {
                match codec::to_utf8(units) {
                    Ok(text) if text.is_empty() => {},
                    Ok(text) => events.post(CafeEvent::KeyboardText(text)),
                    Err(e) => {
                        log::error!(target: LOG_TARGET, "could not convert utf-16 to utf-8: {e}")
                    },
                }
            }
            events.post(CafeEvent::SysWm(SysWmEvent::SwkbdOkFinish));
        }

        if self.platform.is_decide_cancel_button() {
            self.hide();
            events.post(CafeEvent::SysWm(SysWmEvent::SwkbdCancel));
        }
    }

    /// Render the keyboard into `window`'s screen: the TV for TV-only
    /// windows, the gamepad otherwise.
    pub fn draw(&mut self, window: &Window) {
        if !self.enabled || !self.is_shown(window) {
            return;
        }
        if window.is_tv_only() {
            self.platform.draw_tv();
        } else {
            self.platform.draw_drc();
        }
    }
}

impl<P: SwkbdPlatform> Drop for Session<P> {
    fn drop(&mut self) {
        self.finalize();
        self.release_buffers();
        if self.fs_lib_initialized {
            self.platform.fs_shutdown();
        }
    }
}

impl<P: SwkbdPlatform> std::fmt::Debug for Session<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("enabled", &self.enabled)
            .field("created", &self.created)
            .field("region", &self.region)
            .field("locale", &self.locale)
            .field("active_window", &self.active_window)
            .finish_non_exhaustive()
    }
}

fn log_setter(what: &str, result: Result<()>) {
    if let Err(e) = result {
        log::error!(target: LOG_TARGET, "set swkbd {what} failed: {e}");
    }
}
