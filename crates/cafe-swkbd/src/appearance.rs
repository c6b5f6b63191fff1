//! Pending appearance options, applied on the next show.

use cafe_types::error::{CafeError, Result};
use cafe_types::swkbd::{
    AppearArg, ControllerType, InputFormArg, KeyboardArg, KeyboardMode, Language, PasswordMode,
};

use crate::codec;
use crate::heap::{Heap, HeapVec};

/// Options the application set since the last show.
///
/// Strings are stored as zero-terminated UTF-16 from the session heap. An
/// empty string is stored as no string at all.
#[derive(Debug)]
pub struct Appearance {
    heap: Heap,
    keyboard_mode: KeyboardMode,
    ok_label: Option<HeapVec<u16>>,
    show_word_suggestions: bool,
    initial_text: Option<HeapVec<u16>>,
    hint_text: Option<HeapVec<u16>>,
    password_mode: PasswordMode,
    highlight_initial_text: bool,
    show_copy_paste_buttons: bool,
    draw_wii_pointer: bool,
}

impl Appearance {
    pub fn new(heap: &Heap) -> Self {
        Self {
            heap: heap.clone(),
            keyboard_mode: KeyboardMode::Full,
            ok_label: None,
            show_word_suggestions: true,
            initial_text: None,
            hint_text: None,
            password_mode: PasswordMode::Show,
            highlight_initial_text: false,
            show_copy_paste_buttons: false,
            draw_wii_pointer: true,
        }
    }

    /// Back to defaults, freeing every string.
    pub fn reset(&mut self) {
        *self = Self::new(&self.heap);
    }

    pub fn keyboard_mode(&self) -> KeyboardMode {
        self.keyboard_mode
    }

    pub fn set_keyboard_mode(&mut self, mode: KeyboardMode) {
        self.keyboard_mode = mode;
    }

    /// Set the mode from its raw value. Unknown values leave it unchanged.
    pub fn set_keyboard_mode_raw(&mut self, raw: u32) -> Result<()> {
        let mode = KeyboardMode::try_from(raw)
            .map_err(|_| CafeError::InvalidArgument(format!("keyboard mode {raw}")))?;
        self.keyboard_mode = mode;
        Ok(())
    }

    pub fn password_mode(&self) -> PasswordMode {
        self.password_mode
    }

    pub fn set_password_mode(&mut self, mode: PasswordMode) {
        self.password_mode = mode;
    }

    /// Set the password mode from its raw value. Unknown values leave it
    /// unchanged.
    pub fn set_password_mode_raw(&mut self, raw: u32) -> Result<()> {
        let mode = PasswordMode::try_from(raw)
            .map_err(|_| CafeError::InvalidArgument(format!("password mode {raw}")))?;
        self.password_mode = mode;
        Ok(())
    }

    pub fn ok_label(&self) -> Option<&[u16]> {
        self.ok_label.as_deref()
    }

    pub fn initial_text(&self) -> Option<&[u16]> {
        self.initial_text.as_deref()
    }

    pub fn hint_text(&self) -> Option<&[u16]> {
        self.hint_text.as_deref()
    }

    /// `None` clears the label. On conversion failure the old label stays.
    pub fn set_ok_label(&mut self, label: Option<&str>) -> Result<()> {
        self.ok_label = self.encode(label)?;
        Ok(())
    }

    pub fn set_initial_text(&mut self, text: Option<&str>) -> Result<()> {
        self.initial_text = self.encode(text)?;
        Ok(())
    }

    pub fn set_hint_text(&mut self, text: Option<&str>) -> Result<()> {
        self.hint_text = self.encode(text)?;
        Ok(())
    }

    /// Byte variants for C callers; invalid UTF-8 is a conversion error.
    pub fn set_ok_label_bytes(&mut self, label: Option<&[u8]>) -> Result<()> {
        self.ok_label = self.encode_bytes(label)?;
        Ok(())
    }

    pub fn set_initial_text_bytes(&mut self, text: Option<&[u8]>) -> Result<()> {
        self.initial_text = self.encode_bytes(text)?;
        Ok(())
    }

    pub fn set_hint_text_bytes(&mut self, text: Option<&[u8]>) -> Result<()> {
        self.hint_text = self.encode_bytes(text)?;
        Ok(())
    }

    pub fn show_word_suggestions(&self) -> bool {
        self.show_word_suggestions
    }

    pub fn set_show_word_suggestions(&mut self, show: bool) {
        self.show_word_suggestions = show;
    }

    pub fn highlight_initial_text(&self) -> bool {
        self.highlight_initial_text
    }

    pub fn set_highlight_initial_text(&mut self, highlight: bool) {
        self.highlight_initial_text = highlight;
    }

    pub fn show_copy_paste_buttons(&self) -> bool {
        self.show_copy_paste_buttons
    }

    pub fn set_show_copy_paste_buttons(&mut self, show: bool) {
        self.show_copy_paste_buttons = show;
    }

    pub fn draw_wii_pointer(&self) -> bool {
        self.draw_wii_pointer
    }

    pub fn set_draw_wii_pointer(&mut self, draw: bool) {
        self.draw_wii_pointer = draw;
    }

    /// Whether every option is at its default.
    pub fn is_default(&self) -> bool {
        self.keyboard_mode == KeyboardMode::Full
            && self.ok_label.is_none()
            && self.show_word_suggestions
            && self.initial_text.is_none()
            && self.hint_text.is_none()
            && self.password_mode == PasswordMode::Show
            && !self.highlight_initial_text
            && !self.show_copy_paste_buttons
            && self.draw_wii_pointer
    }

    /// Appear argument carrying these options. Strings are borrowed from
    /// `self`.
    pub fn appear_arg(
        &self,
        language: Language,
        layout: u32,
        controller: ControllerType,
    ) -> AppearArg<'_> {
        AppearArg {
            keyboard: KeyboardArg {
                language,
                layout,
                mode: self.keyboard_mode,
                controller,
                ok_label: self.ok_label(),
                show_word_suggestions: self.show_word_suggestions,
                draw_wii_pointer: self.draw_wii_pointer,
            },
            input_form: InputFormArg {
                initial_text: self.initial_text(),
                hint_text: self.hint_text(),
                password_mode: self.password_mode,
                highlight_initial_text: self.highlight_initial_text,
                show_copy_paste_buttons: self.show_copy_paste_buttons,
            },
        }
    }

    fn encode(&self, text: Option<&str>) -> Result<Option<HeapVec<u16>>> {
        match text {
            None | Some("") => Ok(None),
            Some(text) => {
                let units = codec::to_utf16(text, &self.heap)?;
                Ok((codec::utf16_len(&units) != 0).then_some(units))
            },
        }
    }

    fn encode_bytes(&self, bytes: Option<&[u8]>) -> Result<Option<HeapVec<u16>>> {
        match bytes {
            None => Ok(None),
            Some(bytes) => {
                let text = std::str::from_utf8(bytes)
                    .map_err(|e| CafeError::Conversion(format!("invalid UTF-8: {e}")))?;
                self.encode(Some(text))
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::heap::{RawAllocator, TrackingAllocator};

    fn utf16z(s: &str) -> Vec<u16> {
        s.encode_utf16().chain(std::iter::once(0)).collect()
    }

    #[test]
    fn defaults() {
        let a = Appearance::new(&Heap::system());
        assert!(a.is_default());
        assert!(a.show_word_suggestions());
        assert!(a.draw_wii_pointer());
        assert_eq!(a.keyboard_mode(), KeyboardMode::Full);
        assert_eq!(a.password_mode(), PasswordMode::Show);
    }

    #[test]
    fn strings_are_stored_terminated() {
        let mut a = Appearance::new(&Heap::system());
        a.set_ok_label(Some("Go")).unwrap();
        a.set_hint_text(Some("name")).unwrap();
        assert_eq!(a.ok_label(), Some(utf16z("Go").as_slice()));
        assert_eq!(a.hint_text(), Some(utf16z("name").as_slice()));
        assert!(a.initial_text().is_none());
    }

    #[test]
    fn none_and_empty_clear() {
        let mut a = Appearance::new(&Heap::system());
        a.set_initial_text(Some("x")).unwrap();
        a.set_initial_text(None).unwrap();
        assert!(a.initial_text().is_none());
        a.set_initial_text(Some("x")).unwrap();
        a.set_initial_text(Some("")).unwrap();
        assert!(a.initial_text().is_none());
    }

    #[test]
    fn invalid_bytes_keep_previous_value() {
        let mut a = Appearance::new(&Heap::system());
        a.set_hint_text_bytes(Some(b"old")).unwrap();
        assert!(a.set_hint_text_bytes(Some(&[0xC3, 0x28])).is_err());
        assert_eq!(a.hint_text(), Some(utf16z("old").as_slice()));
    }

    #[test]
    fn raw_modes_are_validated() {
        let mut a = Appearance::new(&Heap::system());
        a.set_keyboard_mode_raw(1).unwrap();
        assert_eq!(a.keyboard_mode(), KeyboardMode::Numpad);
        assert!(matches!(
            a.set_keyboard_mode_raw(7),
            Err(CafeError::InvalidArgument(_))
        ));
        assert_eq!(a.keyboard_mode(), KeyboardMode::Numpad);

        a.set_password_mode_raw(2).unwrap();
        assert!(a.set_password_mode_raw(3).is_err());
        assert_eq!(a.password_mode(), PasswordMode::Fade);
    }

    #[test]
    fn appear_arg_reflects_options() {
        let mut a = Appearance::new(&Heap::system());
        a.set_keyboard_mode(KeyboardMode::Nnid);
        a.set_ok_label(Some("Sign in")).unwrap();
        a.set_password_mode(PasswordMode::Hide);
        a.set_highlight_initial_text(true);
        a.set_show_word_suggestions(false);
        let arg = a.appear_arg(Language::French, 6, ControllerType::WiiRemote0);
        assert_eq!(arg.keyboard.language, Language::French);
        assert_eq!(arg.keyboard.layout, 6);
        assert_eq!(arg.keyboard.mode, KeyboardMode::Nnid);
        assert_eq!(arg.keyboard.controller, ControllerType::WiiRemote0);
        assert_eq!(arg.keyboard.ok_label, Some(utf16z("Sign in").as_slice()));
        assert!(!arg.keyboard.show_word_suggestions);
        assert_eq!(arg.input_form.password_mode, PasswordMode::Hide);
        assert!(arg.input_form.highlight_initial_text);
        assert!(arg.input_form.initial_text.is_none());
    }

    #[test]
    fn reset_frees_strings() {
        let tracker = Rc::new(TrackingAllocator::new());
        let heap = Heap::from_rc(Rc::clone(&tracker) as Rc<dyn RawAllocator>);
        let mut a = Appearance::new(&heap);
        a.set_ok_label(Some("OK")).unwrap();
        a.set_initial_text(Some("hello")).unwrap();
        a.set_show_copy_paste_buttons(true);
        a.set_draw_wii_pointer(false);
        assert!(tracker.live_bytes() > 0);
        a.reset();
        assert!(a.is_default());
        assert_eq!(tracker.live_bytes(), 0);
    }
}
