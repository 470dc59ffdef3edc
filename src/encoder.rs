//! Payload assembly: segment packing, version fitting, termination,
//! error correction and interleaving.
//!
//! The assembly order is fixed by the standard: an optional ECI header,
//! the mode indicator, the character count, the packed segment data, a
//! terminator, padding up to the version's data capacity, and finally the
//! Reed-Solomon blocks interleaved codeword by codeword.

use encoding_rs::{Encoding, SHIFT_JIS, UTF_8};
use tracing::debug;

use crate::bits::BitStream;
use crate::error::{QrError, Result};
use crate::gf256::rs_encode;
use crate::mask::choose_mask;
use crate::mode::{alphanumeric_code, choose_mode, Mode};
use crate::version::{
    ec_blocks, num_data_codewords, total_codewords, MAX_VERSION, MIN_VERSION,
};
use crate::{EncodeHints, ErrorCorrectionLevel, QrCode};

/// Encode `content` into a finished symbol.
pub fn encode(
    content: &str,
    level: ErrorCorrectionLevel,
    hints: &EncodeHints,
) -> Result<QrCode> {
    let charset = resolve_charset(hints.charset.as_deref())?;
    let mode = choose_mode(content, charset);

    let mut data_bits = BitStream::new();
    match mode {
        Mode::Numeric => append_numeric(content, &mut data_bits)?,
        Mode::Alphanumeric => append_alphanumeric(content, &mut data_bits)?,
        Mode::Byte => append_bytes(content, charset, &mut data_bits)?,
        Mode::Kanji => append_kanji(content, &mut data_bits)?,
        Mode::Eci => unreachable!("ECI is a header marker, not a payload mode"),
    }

    let mut header_bits = BitStream::new();
    if mode == Mode::Byte && charset != UTF_8 {
        append_eci(charset, &mut header_bits)?;
    }
    header_bits.append_bits(mode.indicator(), 4);

    let version = match hints.version {
        Some(v) => {
            if !(MIN_VERSION..=MAX_VERSION).contains(&v) {
                return Err(QrError::InvalidContent(format!(
                    "version hint {} is outside 1..=40",
                    v
                )));
            }
            let needed = bits_needed(&header_bits, mode, &data_bits, v);
            if !will_fit(needed, v, level) {
                return Err(QrError::CapacityExceeded(format!(
                    "payload needs {} bits, more than version {} holds at {:?}",
                    needed, v, level
                )));
            }
            v
        }
        None => recommend_version(level, mode, &header_bits, &data_bits)?,
    };
    debug!(?mode, version, "selected mode and version");

    let mut content_bits = BitStream::new();
    content_bits.append_stream(&header_bits);
    let num_letters = if mode == Mode::Byte {
        data_bits.len_in_bytes()
    } else {
        content.chars().count()
    };
    append_length_info(num_letters, version, mode, &mut content_bits)?;
    content_bits.append_stream(&data_bits);

    let num_data_bytes = num_data_codewords(version, level);
    terminate_bits(num_data_bytes, &mut content_bits)?;

    let final_bits = interleave_with_ec_bytes(
        &content_bits,
        total_codewords(version),
        num_data_bytes,
        ec_blocks(version, level).num_blocks(),
    )?;

    let (mask, matrix) = choose_mask(&final_bits, level, version);
    debug!(mask, "selected mask pattern");

    Ok(QrCode::new(matrix, mode, level, version, mask))
}

/// Resolve a charset hint label, defaulting to UTF-8.
///
/// Labels go through the WHATWG registry; encodings without a usable
/// encoder (the UTF-16 family) are rejected rather than silently encoded
/// as UTF-8.
fn resolve_charset(label: Option<&str>) -> Result<&'static Encoding> {
    let Some(label) = label else {
        return Ok(UTF_8);
    };
    let encoding = Encoding::for_label(label.trim().as_bytes()).ok_or_else(|| {
        QrError::UnsupportedCharset(format!("unknown charset label {:?}", label))
    })?;
    if encoding.output_encoding() != encoding {
        return Err(QrError::UnsupportedCharset(format!(
            "{} has no byte encoder",
            encoding.name()
        )));
    }
    Ok(encoding)
}

/// ECI Assignment number for a charset.
///
/// The WHATWG registry folds the ISO-8859-1 label into windows-1252; the
/// designator written for it is 3 (Latin-1), which every deployed reader
/// understands and which covers the Latin-1 rows windows-1252 extends.
fn eci_designator(encoding: &'static Encoding) -> Result<u32> {
    let value = match encoding.name() {
        "windows-1252" => 3,
        "ISO-8859-2" => 4,
        "ISO-8859-3" => 5,
        "ISO-8859-4" => 6,
        "ISO-8859-5" => 7,
        "ISO-8859-6" => 8,
        "ISO-8859-7" => 9,
        "ISO-8859-8" => 10,
        "ISO-8859-10" => 12,
        "ISO-8859-13" => 15,
        "ISO-8859-14" => 16,
        "ISO-8859-15" => 17,
        "ISO-8859-16" => 18,
        "Shift_JIS" => 20,
        "windows-1250" => 21,
        "windows-1251" => 22,
        "windows-1256" => 24,
        "UTF-8" => 26,
        "Big5" => 28,
        "gb18030" => 29,
        "EUC-KR" => 30,
        other => {
            return Err(QrError::UnsupportedCharset(format!(
                "no ECI designator for {}",
                other
            )))
        }
    };
    // Only the single-byte designator form is emitted
    if value > 127 {
        return Err(QrError::UnsupportedCharset(format!(
            "ECI designator {} does not fit a single byte",
            value
        )));
    }
    Ok(value)
}

fn append_eci(charset: &'static Encoding, bits: &mut BitStream) -> Result<()> {
    let designator = eci_designator(charset)?;
    bits.append_bits(Mode::Eci.indicator(), 4);
    bits.append_bits(designator, 8);
    Ok(())
}

/// Character count field. Counts that overflow the field width cannot be
/// represented at this version.
fn append_length_info(
    num_letters: usize,
    version: u8,
    mode: Mode,
    bits: &mut BitStream,
) -> Result<()> {
    let width = mode.character_count_bits(version);
    if num_letters >= 1 << width {
        return Err(QrError::CapacityExceeded(format!(
            "{} characters overflow the {}-bit count field",
            num_letters, width
        )));
    }
    bits.append_bits(num_letters as u32, width);
    Ok(())
}

/// Digits in groups of three (10 bits), two (7 bits), one (4 bits).
fn append_numeric(content: &str, bits: &mut BitStream) -> Result<()> {
    let digits = content.as_bytes();
    let digit = |b: u8| -> Result<u32> {
        if b.is_ascii_digit() {
            Ok((b - b'0') as u32)
        } else {
            Err(QrError::InvalidContent(format!(
                "byte {:#04x} is not a decimal digit",
                b
            )))
        }
    };

    let mut i = 0;
    while i < digits.len() {
        let d1 = digit(digits[i])?;
        if i + 2 < digits.len() {
            let d2 = digit(digits[i + 1])?;
            let d3 = digit(digits[i + 2])?;
            bits.append_bits(d1 * 100 + d2 * 10 + d3, 10);
            i += 3;
        } else if i + 1 < digits.len() {
            let d2 = digit(digits[i + 1])?;
            bits.append_bits(d1 * 10 + d2, 7);
            i += 2;
        } else {
            bits.append_bits(d1, 4);
            i += 1;
        }
    }
    Ok(())
}

/// Character pairs as c1*45 + c2 in 11 bits, a trailing single in 6.
fn append_alphanumeric(content: &str, bits: &mut BitStream) -> Result<()> {
    let mut codes = Vec::with_capacity(content.len());
    for c in content.chars() {
        let code = alphanumeric_code(c);
        if code < 0 {
            return Err(QrError::InvalidContent(format!(
                "character {:?} is not in the alphanumeric set",
                c
            )));
        }
        codes.push(code as u32);
    }
    for pair in codes.chunks(2) {
        match *pair {
            [c1, c2] => bits.append_bits(c1 * 45 + c2, 11),
            [c1] => bits.append_bits(c1, 6),
            _ => unreachable!(),
        }
    }
    Ok(())
}

/// One 8-bit codeword per byte of the charset-encoded payload.
fn append_bytes(
    content: &str,
    charset: &'static Encoding,
    bits: &mut BitStream,
) -> Result<()> {
    let (bytes, _, had_errors) = charset.encode(content);
    if had_errors {
        return Err(QrError::UnsupportedCharset(format!(
            "{} cannot encode the content",
            charset.name()
        )));
    }
    for &byte in bytes.iter() {
        bits.append_bits(byte as u32, 8);
    }
    Ok(())
}

/// Shift_JIS double-byte pairs mapped to 13-bit values.
fn append_kanji(content: &str, bits: &mut BitStream) -> Result<()> {
    let (bytes, _, had_errors) = SHIFT_JIS.encode(content);
    if had_errors {
        return Err(QrError::InvalidContent(
            "content is not representable in Shift_JIS".into(),
        ));
    }
    if bytes.is_empty() || bytes.len() % 2 != 0 {
        return Err(QrError::InvalidContent(
            "Kanji payload must be double-byte Shift_JIS".into(),
        ));
    }
    for pair in bytes.chunks_exact(2) {
        let code = (pair[0] as u32) << 8 | pair[1] as u32;
        let subtracted = if (0x8140..=0x9FFC).contains(&code) {
            code - 0x8140
        } else if (0xE040..=0xEBBF).contains(&code) {
            code - 0xC140
        } else {
            return Err(QrError::InvalidContent(format!(
                "Shift_JIS code {:#06x} is outside the Kanji ranges",
                code
            )));
        };
        bits.append_bits((subtracted >> 8) * 0xC0 + (subtracted & 0xFF), 13);
    }
    Ok(())
}

fn bits_needed(header: &BitStream, mode: Mode, data: &BitStream, version: u8) -> usize {
    header.len() + mode.character_count_bits(version) + data.len()
}

/// Whether `num_input_bits` fit the data capacity of (version, level).
/// Bits round up to whole codewords.
fn will_fit(num_input_bits: usize, version: u8, level: ErrorCorrectionLevel) -> bool {
    let total_input_bytes = (num_input_bits + 7) / 8;
    num_data_codewords(version, level) as usize >= total_input_bytes
}

fn choose_version(num_input_bits: usize, level: ErrorCorrectionLevel) -> Result<u8> {
    for version in MIN_VERSION..=MAX_VERSION {
        if will_fit(num_input_bits, version, level) {
            return Ok(version);
        }
    }
    Err(QrError::CapacityExceeded(format!(
        "{} bits exceed every version at {:?}",
        num_input_bits, level
    )))
}

/// Two-pass version choice.
///
/// The character count width depends on the version, so a first estimate
/// uses the narrowest width (version 1); recomputing at that estimate is
/// sufficient because the width is monotonic and only steps at versions
/// 10 and 27.
fn recommend_version(
    level: ErrorCorrectionLevel,
    mode: Mode,
    header: &BitStream,
    data: &BitStream,
) -> Result<u8> {
    let provisional = choose_version(bits_needed(header, mode, data, 1), level)?;
    choose_version(bits_needed(header, mode, data, provisional), level)
}

/// Terminator, byte alignment and pad codewords.
///
/// On success the stream holds exactly `num_data_bytes * 8` bits.
fn terminate_bits(num_data_bytes: u32, bits: &mut BitStream) -> Result<()> {
    let capacity = num_data_bytes as usize * 8;
    if bits.len() > capacity {
        return Err(QrError::CapacityExceeded(format!(
            "data bits {} exceed capacity {}",
            bits.len(),
            capacity
        )));
    }

    // Terminator: up to four zero bits, never past capacity
    for _ in 0..4 {
        if bits.len() >= capacity {
            break;
        }
        bits.append_bit(false);
    }

    // Zero-fill the last partial codeword
    let partial = bits.len() % 8;
    if partial > 0 {
        for _ in partial..8 {
            bits.append_bit(false);
        }
    }

    // Alternating pad codewords fill the remaining capacity
    let num_pad_bytes = num_data_bytes as usize - bits.len_in_bytes();
    for i in 0..num_pad_bytes {
        bits.append_bits(if i % 2 == 0 { 0xEC } else { 0x11 }, 8);
    }

    if bits.len() != capacity {
        return Err(QrError::InternalInvariant(format!(
            "termination produced {} bits, capacity is {}",
            bits.len(),
            capacity
        )));
    }
    Ok(())
}

/// One Reed-Solomon block: its data codewords and their EC codewords.
struct BlockPair {
    data: Vec<u8>,
    ec: Vec<u8>,
}

/// Data and EC byte counts for one block.
///
/// The last `num_total_bytes % num_rs_blocks` blocks carry one extra data
/// byte; the EC count is identical for every block, and the static tables
/// guarantee it (checked here because a transcription error would
/// otherwise corrupt symbols silently).
fn block_byte_counts(
    num_total_bytes: u32,
    num_data_bytes: u32,
    num_rs_blocks: u32,
    block_id: u32,
) -> Result<(u32, u32)> {
    let blocks_in_group2 = num_total_bytes % num_rs_blocks;
    let blocks_in_group1 = num_rs_blocks - blocks_in_group2;
    let total_in_group1 = num_total_bytes / num_rs_blocks;
    let total_in_group2 = total_in_group1 + 1;
    let data_in_group1 = num_data_bytes / num_rs_blocks;
    let data_in_group2 = data_in_group1 + 1;
    let ec_in_group1 = total_in_group1 - data_in_group1;
    let ec_in_group2 = total_in_group2 - data_in_group2;

    if ec_in_group1 != ec_in_group2 {
        return Err(QrError::InternalInvariant(
            "EC codewords per block differ between groups".into(),
        ));
    }
    if num_total_bytes
        != (data_in_group1 + ec_in_group1) * blocks_in_group1
            + (data_in_group2 + ec_in_group2) * blocks_in_group2
    {
        return Err(QrError::InternalInvariant(
            "block groups do not add up to the total codeword count".into(),
        ));
    }

    Ok(if block_id < blocks_in_group1 {
        (data_in_group1, ec_in_group1)
    } else {
        (data_in_group2, ec_in_group2)
    })
}

/// Split the data stream into RS blocks, compute EC per block, and emit
/// data codewords column-wise across blocks followed by EC codewords.
fn interleave_with_ec_bytes(
    bits: &BitStream,
    num_total_bytes: u32,
    num_data_bytes: u32,
    num_rs_blocks: u32,
) -> Result<BitStream> {
    if bits.len_in_bytes() != num_data_bytes as usize {
        return Err(QrError::InternalInvariant(format!(
            "stream holds {} bytes, expected {}",
            bits.len_in_bytes(),
            num_data_bytes
        )));
    }

    let mut blocks = Vec::with_capacity(num_rs_blocks as usize);
    let mut data_bytes_offset = 0usize;
    let mut max_num_data_bytes = 0usize;
    let mut max_num_ec_bytes = 0usize;

    for block_id in 0..num_rs_blocks {
        let (num_data, num_ec) =
            block_byte_counts(num_total_bytes, num_data_bytes, num_rs_blocks, block_id)?;
        let mut data = vec![0u8; num_data as usize];
        bits.to_bytes(8 * data_bytes_offset, &mut data, 0, num_data as usize);
        let ec = rs_encode(&data, num_ec as usize);

        max_num_data_bytes = max_num_data_bytes.max(data.len());
        max_num_ec_bytes = max_num_ec_bytes.max(ec.len());
        data_bytes_offset += num_data as usize;
        blocks.push(BlockPair { data, ec });
    }
    if data_bytes_offset != num_data_bytes as usize {
        return Err(QrError::InternalInvariant(
            "blocks do not cover the data stream".into(),
        ));
    }

    let mut result = BitStream::new();
    for i in 0..max_num_data_bytes {
        for block in &blocks {
            if let Some(&byte) = block.data.get(i) {
                result.append_bits(byte as u32, 8);
            }
        }
    }
    for i in 0..max_num_ec_bytes {
        for block in &blocks {
            if let Some(&byte) = block.ec.get(i) {
                result.append_bits(byte as u32, 8);
            }
        }
    }

    if result.len_in_bytes() != num_total_bytes as usize {
        return Err(QrError::InternalInvariant(format!(
            "interleaving produced {} bytes, expected {}",
            result.len_in_bytes(),
            num_total_bytes
        )));
    }
    Ok(result)
}
