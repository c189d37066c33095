//! Quoting rules for text output
//!
//! A value is written raw when it cannot be confused with the surrounding
//! `key=value` syntax, and as an escaped double-quoted string otherwise.

use std::borrow::Cow;

/// Printable ASCII minus `"`. Space and `=` are rejected separately in
/// [`needs_quoting`].
static SAFE_SET: [bool; 128] = {
    let mut set = [false; 128];
    let mut b = b' ';
    while b <= b'~' {
        set[b as usize] = true;
        b += 1;
    }
    set[b'"' as usize] = false;
    set[0x7f] = true;
    set
};

/// Reports whether `s` must be quoted in text output.
///
/// Tab and newline are checked first: a string containing either is written
/// as-is, whatever else it contains. Backslash never forces quoting.
pub fn needs_quoting(s: &str) -> bool {
    if s.is_empty() {
        return true;
    }
    if s.bytes().any(|b| b == b'\t' || b == b'\n') {
        return false;
    }
    for c in s.chars() {
        if c.is_ascii() {
            let b = c as u8;
            if b != b'\\' && (b == b' ' || b == b'=' || !SAFE_SET[b as usize]) {
                return true;
            }
            continue;
        }
        if c.is_whitespace() || !is_printable(c) {
            return true;
        }
    }
    false
}

/// Quote `s` if [`needs_quoting`] says so, otherwise borrow it unchanged.
pub fn quote(s: &str) -> Cow<'_, str> {
    if needs_quoting(s) {
        Cow::Owned(format!("{:?}", s))
    } else {
        Cow::Borrowed(s)
    }
}

/// Non-ASCII printability, using the same tables as `str::escape_debug`.
///
/// The char is probed after a leading ASCII letter, so combining marks (which
/// `escape_debug` only escapes at the start of a string) count as printable.
fn is_printable(c: char) -> bool {
    if c.is_control() {
        return false;
    }
    let mut probe = [0u8; 5];
    probe[0] = b'x';
    let len = c.encode_utf8(&mut probe[1..]).len();
    match std::str::from_utf8(&probe[..=len]) {
        Ok(s) => s.escape_debug().nth(1) == Some(c),
        Err(_) => false,
    }
}
