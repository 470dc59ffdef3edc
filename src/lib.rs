//! # QR Code Symbol Encoder
//!
//! An encoder for **ISO/IEC 18004** (JIS X 0510) QR Code symbols: it turns
//! a text string and an error correction level into the final matrix of
//! dark and light modules. Rendering that matrix to pixels is the caller's
//! job; string renderers (SVG, terminal blocks) are provided for
//! convenience.
//!
//! ## Library Organization
//!
//! ```text
//! lib.rs        Public API: QrCode::encode(), hints, renderers
//! mode.rs       Mode classification (Numeric/Alphanumeric/Byte/Kanji)
//! bits.rs       BitStream accumulating the data bit sequence
//! encoder.rs    Header/ECI, version fitting, termination, interleaving
//! gf256.rs      GF(2^8) arithmetic and Reed-Solomon encoding
//! version.rs    Capacity, block and alignment tables; BCH info words
//! matrix.rs     Function patterns and zig-zag data placement
//! mask.rs       Eight mask patterns, four penalty rules
//! ```
//!
//! ## Encoding Pipeline
//!
//! ```text
//! text ──> choose mode ──> pack segment bits
//!                            │
//!              [ECI?][mode][count][data] ──> pick smallest version
//!                            │
//!              terminator + pad codewords (0xEC, 0x11)
//!                            │
//!              split into RS blocks ──> EC codewords ──> interleave
//!                            │
//!              8 masked matrices ──> penalty scoring ──> best mask
//!                            │
//!                         QrCode
//! ```
//!
//! The character count field width depends on the version, and the version
//! depends on the total bit count, so version selection runs twice: once
//! with the narrowest width, once with the width of the first estimate.
//!
//! ## Example
//!
//! ```
//! use qr_encoder::{QrCode, ErrorCorrectionLevel};
//!
//! let qr = QrCode::encode("Hello", ErrorCorrectionLevel::M).unwrap();
//! let svg = qr.to_svg(10); // 10 pixels per module
//! assert!(svg.starts_with("<svg"));
//! ```

mod bits;
mod encoder;
mod error;
mod gf256;
mod mask;
mod matrix;
mod mode;
mod version;

pub use error::{QrError, Result};
pub use mode::Mode;

use matrix::Matrix;

/// QR Code error correction levels.
///
/// Higher levels can recover more damage but leave less room for data.
/// The percentages indicate roughly how much of the symbol can be damaged
/// while still being readable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorCorrectionLevel {
    /// Low: ~7% error recovery. Best for clean environments.
    L = 0,
    /// Medium: ~15% error recovery. Good balance.
    M = 1,
    /// Quartile: ~25% error recovery.
    Q = 2,
    /// High: ~30% error recovery. Best for harsh environments.
    H = 3,
}

impl ErrorCorrectionLevel {
    /// Format info indicator bits, ISO 18004 Table C.1.
    ///
    /// The encoding differs from the natural enum ordering:
    /// L = 01, M = 00, Q = 11, H = 10.
    pub(crate) fn format_bits(self) -> u32 {
        match self {
            ErrorCorrectionLevel::L => 0b01,
            ErrorCorrectionLevel::M => 0b00,
            ErrorCorrectionLevel::Q => 0b11,
            ErrorCorrectionLevel::H => 0b10,
        }
    }
}

/// Optional encoding hints.
///
/// `charset` is any WHATWG encoding label (default UTF-8); declaring
/// `Shift_JIS` makes Kanji mode eligible. `version` forces a symbol size
/// instead of picking the smallest that fits.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EncodeHints {
    pub charset: Option<String>,
    pub version: Option<u8>,
}

/// A finished QR code symbol.
///
/// Immutable after encoding. The matrix is square; side length is
/// `4 * version + 17` modules.
#[derive(Clone, Debug)]
pub struct QrCode {
    matrix: Matrix,
    mode: Mode,
    error_correction: ErrorCorrectionLevel,
    version: u8,
    mask: u8,
}

impl QrCode {
    /// Encode `content` at the given error correction level.
    ///
    /// The densest mode able to carry the content is chosen, then the
    /// smallest version able to hold it.
    pub fn encode(content: &str, level: ErrorCorrectionLevel) -> Result<Self> {
        encoder::encode(content, level, &EncodeHints::default())
    }

    /// Encode with an explicit charset and/or forced version.
    pub fn encode_with_hints(
        content: &str,
        level: ErrorCorrectionLevel,
        hints: &EncodeHints,
    ) -> Result<Self> {
        encoder::encode(content, level, hints)
    }

    pub(crate) fn new(
        matrix: Matrix,
        mode: Mode,
        error_correction: ErrorCorrectionLevel,
        version: u8,
        mask: u8,
    ) -> Self {
        Self {
            matrix,
            mode,
            error_correction,
            version,
            mask,
        }
    }

    /// Modules per side: `4 * version + 17`.
    pub fn size(&self) -> usize {
        self.matrix.size()
    }

    /// Module colour at (row, col). true = dark.
    pub fn get(&self, row: usize, col: usize) -> bool {
        self.matrix.get(row, col)
    }

    /// Symbol version, 1..=40.
    pub fn version(&self) -> u8 {
        self.version
    }

    /// The payload mode the content was packed with.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn error_correction(&self) -> ErrorCorrectionLevel {
        self.error_correction
    }

    /// The mask pattern applied, 0..=7.
    pub fn mask(&self) -> u8 {
        self.mask
    }

    /// Coordinates of every dark module, row-major.
    fn dark_modules(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let size = self.size();
        (0..size)
            .flat_map(move |row| (0..size).map(move |col| (row, col)))
            .filter(|&(row, col)| self.get(row, col))
    }

    /// Render the symbol as an SVG string, one rect per dark module on a
    /// white background with the standard four-module quiet zone.
    pub fn to_svg(&self, module_size: u32) -> String {
        use std::fmt::Write;

        let quiet_zone = 4;
        let scale = module_size as usize;
        let side = (self.size() + 2 * quiet_zone) * scale;

        let mut svg = format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" \
             viewBox=\"0 0 {side} {side}\" width=\"{side}\" height=\"{side}\">\
             <rect width=\"{side}\" height=\"{side}\" fill=\"white\"/>"
        );
        for (row, col) in self.dark_modules() {
            let _ = write!(
                svg,
                "<rect x=\"{}\" y=\"{}\" width=\"{scale}\" height=\"{scale}\" fill=\"black\"/>",
                (col + quiet_zone) * scale,
                (row + quiet_zone) * scale,
            );
        }
        svg.push_str("</svg>");
        svg
    }

    /// Render the symbol as ASCII art for terminal display.
    ///
    /// Each module is two characters wide for a near-square aspect ratio,
    /// with a two-module quiet zone.
    pub fn to_ascii(&self) -> String {
        let quiet_zone = 2;
        let margin = "  ".repeat(quiet_zone);
        let blank_line = format!("{}\n", "  ".repeat(self.size() + 2 * quiet_zone));

        let mut art = blank_line.repeat(quiet_zone);
        for row in 0..self.size() {
            art.push_str(&margin);
            art.extend((0..self.size()).map(|col| {
                if self.get(row, col) {
                    "\u{2588}\u{2588}"
                } else {
                    "  "
                }
            }));
            art.push_str(&margin);
            art.push('\n');
        }
        art.push_str(&blank_line.repeat(quiet_zone));
        art
    }

    /// Render the symbol compactly using half-block characters, two module
    /// rows per text line.
    pub fn to_ascii_compact(&self) -> String {
        let size = self.size();
        let quiet_zone = 2;
        let mut result = String::new();

        let module = |row: usize, col: usize| -> bool {
            if row >= quiet_zone
                && row < size + quiet_zone
                && col >= quiet_zone
                && col < size + quiet_zone
            {
                self.get(row - quiet_zone, col - quiet_zone)
            } else {
                false
            }
        };

        let mut row = 0;
        while row < size + 2 * quiet_zone {
            for col in 0..size + 2 * quiet_zone {
                let top = module(row, col);
                let bottom = module(row + 1, col);
                let ch = match (top, bottom) {
                    (true, true) => '\u{2588}',  // Full block
                    (true, false) => '\u{2580}', // Upper half block
                    (false, true) => '\u{2584}', // Lower half block
                    (false, false) => ' ',
                };
                result.push(ch);
            }
            result.push('\n');
            row += 2;
        }

        result
    }
}
