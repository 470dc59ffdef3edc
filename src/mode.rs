//! Payload encoding modes and input classification.

use encoding_rs::{Encoding, SHIFT_JIS};

/// QR code encoding modes.
///
/// Different modes trade generality for density: numeric input packs three
/// characters into ten bits, while byte mode spends a full octet per byte.
/// `Eci` is not a payload mode; it only ever appears as a header prefix
/// announcing a non-default byte-mode charset.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Digits 0-9. 3.33 bits/char
    Numeric,
    /// 0-9, A-Z, space, $ % * + - . / : at 5.5 bits/char
    Alphanumeric,
    /// Arbitrary 8-bit data in the declared charset
    Byte,
    /// Shift_JIS double-byte characters, 13 bits each
    Kanji,
    /// Extended Channel Interpretation header marker
    Eci,
}

impl Mode {
    /// Four-bit mode indicator written at the start of the header.
    pub fn indicator(self) -> u32 {
        match self {
            Mode::Numeric => 0b0001,
            Mode::Alphanumeric => 0b0010,
            Mode::Byte => 0b0100,
            Mode::Kanji => 0b1000,
            Mode::Eci => 0b0111,
        }
    }

    /// Width of the character count field for a version.
    ///
    /// The width steps up at versions 10 and 27. `Eci` carries no count
    /// field.
    pub fn character_count_bits(self, version: u8) -> usize {
        let band = if version <= 9 {
            0
        } else if version <= 26 {
            1
        } else {
            2
        };
        match self {
            Mode::Numeric => [10, 12, 14][band],
            Mode::Alphanumeric => [9, 11, 13][band],
            Mode::Byte => [8, 16, 16][band],
            Mode::Kanji => [8, 10, 12][band],
            Mode::Eci => 0,
        }
    }
}

/// Alphanumeric values for ASCII codes 0x20..0x60, -1 where the character
/// is outside the 45-character set.
const ALPHANUMERIC_TABLE: [i8; 64] = [
    36, -1, -1, -1, 37, 38, -1, -1, -1, -1, 39, 40, -1, 41, 42, 43, // 0x20-0x2F
    0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 44, -1, -1, -1, -1, -1, // 0x30-0x3F
    -1, 10, 11, 12, 13, 14, 15, 16, 17, 18, 19, 20, 21, 22, 23, 24, // 0x40-0x4F
    25, 26, 27, 28, 29, 30, 31, 32, 33, 34, 35, -1, -1, -1, -1, -1, // 0x50-0x5F
];

/// Value of a character in the alphanumeric set, or -1.
pub fn alphanumeric_code(c: char) -> i8 {
    let code = c as u32;
    if (0x20..0x60).contains(&code) {
        ALPHANUMERIC_TABLE[(code - 0x20) as usize]
    } else {
        -1
    }
}

/// Pick the densest mode able to carry `content`.
///
/// Kanji is only eligible when the caller declared Shift_JIS and the whole
/// input survives as double-byte Shift_JIS; a single ASCII character in the
/// middle demotes the input to byte mode.
pub fn choose_mode(content: &str, charset: &'static Encoding) -> Mode {
    if charset == SHIFT_JIS && is_only_double_byte_kanji(content) {
        return Mode::Kanji;
    }

    let mut has_numeric = false;
    let mut has_alphanumeric = false;
    for c in content.chars() {
        if c.is_ascii_digit() {
            has_numeric = true;
        } else if alphanumeric_code(c) >= 0 {
            has_alphanumeric = true;
        } else {
            return Mode::Byte;
        }
    }
    if has_alphanumeric {
        Mode::Alphanumeric
    } else if has_numeric {
        Mode::Numeric
    } else {
        Mode::Byte
    }
}

/// True iff `content` encodes to Shift_JIS as a whole number of two-byte
/// pairs whose lead bytes all sit in the double-byte ranges.
pub fn is_only_double_byte_kanji(content: &str) -> bool {
    let (bytes, _, had_errors) = SHIFT_JIS.encode(content);
    if had_errors || bytes.is_empty() || bytes.len() % 2 != 0 {
        return false;
    }
    bytes.chunks_exact(2).all(|pair| {
        let b1 = pair[0];
        (0x81..=0x9F).contains(&b1) || (0xE0..=0xEB).contains(&b1)
    })
}
