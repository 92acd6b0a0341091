//! Code page 437, the native 8-bit text encoding of classic clients.
//!
//! Printable ASCII maps to itself. Control bytes and the upper half map to
//! the glyphs the classic font draws for them.

/// Glyphs drawn for bytes `0x00..0x20`.
const CONTROL_CHARS: [char; 32] = [
    '\0', '☺', '☻', '♥', '♦', '♣', '♠', '•', '◘', '○', '◙', '♂', '♀', '♪', '♫', '☼', '►', '◄', '↕',
    '‼', '¶', '§', '▬', '↨', '↑', '↓', '→', '←', '∟', '↔', '▲', '▼',
];

/// Glyphs for bytes `0x80..=0xFF`.
const EXTENDED_CHARS: [char; 128] = [
    'Ç', 'ü', 'é', 'â', 'ä', 'à', 'å', 'ç', 'ê', 'ë', 'è', 'ï', 'î', 'ì', 'Ä', 'Å', //
    'É', 'æ', 'Æ', 'ô', 'ö', 'ò', 'û', 'ù', 'ÿ', 'Ö', 'Ü', '¢', '£', '¥', '₧', 'ƒ', //
    'á', 'í', 'ó', 'ú', 'ñ', 'Ñ', 'ª', 'º', '¿', '⌐', '¬', '½', '¼', '¡', '«', '»', //
    '░', '▒', '▓', '│', '┤', '╡', '╢', '╖', '╕', '╣', '║', '╗', '╝', '╜', '╛', '┐', //
    '└', '┴', '┬', '├', '─', '┼', '╞', '╟', '╚', '╔', '╩', '╦', '╠', '═', '╬', '╧', //
    '╨', '╤', '╥', '╙', '╘', '╒', '╓', '╫', '╪', '┘', '┌', '█', '▄', '▌', '▐', '▀', //
    'α', 'ß', 'Γ', 'π', 'Σ', 'σ', 'µ', 'τ', 'Φ', 'Θ', 'Ω', 'δ', '∞', 'φ', 'ε', '∩', //
    '≡', '±', '≥', '≤', '⌠', '⌡', '÷', '≈', '°', '∙', '·', '√', 'ⁿ', '²', '■', '\u{a0}',
];

/// Byte substituted for characters with no CP437 equivalent.
pub const REPLACEMENT: u8 = b'?';

/// Maps a CP437 byte to the character it represents.
pub fn to_unicode(byte: u8) -> char {
    match byte {
        0x00..=0x1F => CONTROL_CHARS[byte as usize],
        0x7F => '⌂',
        0x80..=0xFF => EXTENDED_CHARS[(byte - 0x80) as usize],
        _ => byte as char,
    }
}

/// Maps a character to its CP437 byte, or [`REPLACEMENT`] if it has none.
pub fn from_unicode(c: char) -> u8 {
    if (' '..'\u{7f}').contains(&c) {
        return c as u8;
    }
    if c == '⌂' {
        return 0x7F;
    }
    if let Some(i) = CONTROL_CHARS.iter().position(|&g| g == c) {
        return i as u8;
    }
    match EXTENDED_CHARS.iter().position(|&g| g == c) {
        Some(i) => 0x80 + i as u8,
        None => REPLACEMENT,
    }
}

/// Decodes CP437 bytes into a string.
pub fn decode(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| to_unicode(b)).collect()
}

/// Encodes a string as CP437 bytes, lossily.
pub fn encode(text: &str) -> Vec<u8> {
    text.chars().map(from_unicode).collect()
}

/// Round-trips a character through CP437, so text only holds representable glyphs.
pub fn normalize(c: char) -> char {
    to_unicode(from_unicode(c))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_is_identity() {
        for b in 0x20u8..0x7F {
            assert_eq!(to_unicode(b), b as char);
            assert_eq!(from_unicode(b as char), b);
        }
    }

    #[test]
    fn every_byte_round_trips() {
        for b in 1u8..=255 {
            assert_eq!(from_unicode(to_unicode(b)), b, "byte {b:#04x}");
        }
    }

    #[test]
    fn unmappable_becomes_replacement() {
        assert_eq!(from_unicode('日'), REPLACEMENT);
        assert_eq!(normalize('日'), '?');
    }

    #[test]
    fn decode_encode_extended() {
        let bytes = [b'a', 0x80, 0xE1, 0x03];
        let text = decode(&bytes);
        assert_eq!(text, "aÇß♥");
        assert_eq!(encode(&text), bytes);
    }
}
