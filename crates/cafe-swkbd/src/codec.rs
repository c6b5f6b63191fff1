//! UTF-8 / UTF-16 conversion for keyboard strings.
//!
//! The keyboard library speaks zero-terminated UTF-16. Strings going in are
//! allocated from the session [`Heap`]; committed text coming out becomes an
//! ordinary `String` for the application's event queue.

use cafe_types::error::{CafeError, Result};

use crate::heap::{Heap, HeapVec};

/// Code units before the first terminator (or the whole slice if none).
pub fn utf16_len(units: &[u16]) -> usize {
    units.iter().position(|&u| u == 0).unwrap_or(units.len())
}

/// Encode `text` as zero-terminated UTF-16. Text after an interior NUL is
/// dropped, as it would be for a C string.
pub fn to_utf16(text: &str, heap: &Heap) -> Result<HeapVec<u16>> {
    let text = text.split('\0').next().unwrap_or_default();
    let mut out = HeapVec::new_in(heap);
    out.reserve_exact(text.encode_utf16().count() + 1)?;
    for unit in text.encode_utf16() {
        out.try_push(unit)?;
    }
    out.try_push(0)?;
    Ok(out)
}

/// [`to_utf16`] for raw bytes from a C caller.
pub fn to_utf16_bytes(bytes: &[u8], heap: &Heap) -> Result<HeapVec<u16>> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| CafeError::Conversion(format!("invalid UTF-8: {e}")))?;
    to_utf16(text, heap)
}

/// Decode zero-terminated UTF-16 into UTF-8.
///
/// Fails on an unpaired surrogate.
pub fn to_utf8(units: &[u16]) -> Result<String> {
    let units = &units[..utf16_len(units)];
    char::decode_utf16(units.iter().copied())
        .collect::<std::result::Result<String, _>>()
        .map_err(|e| {
            CafeError::Conversion(format!(
                "unpaired surrogate {:#06x}",
                e.unpaired_surrogate()
            ))
        })
}

/// Character for a UCS-2 key symbol from the USB keyboard driver.
///
/// Private-use symbols (`0xE000..=0xF8FF`) name non-printing keys and
/// `0xFFFF` means "no symbol"; both yield `None`, as do lone surrogates.
pub fn key_symbol_char(symbol: u16) -> Option<char> {
    match symbol {
        0 | 0xE000..=0xF8FF | 0xFFFF => None,
        s => char::from_u32(u32::from(s)),
    }
}
