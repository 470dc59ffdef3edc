//! Per-version constants fixed by the standard.
//!
//! Everything in here is a transcription of ISO/IEC 18004 (JIS X 0510)
//! Table 9 and Annexes C/D/E: codeword totals, error correction block
//! structure, alignment pattern centres, and the BCH-protected format and
//! version information words. The tables are compile-time constants and
//! shared read-only process-wide.

use crate::ErrorCorrectionLevel;

/// Smallest symbol version.
pub const MIN_VERSION: u8 = 1;
/// Largest symbol version.
pub const MAX_VERSION: u8 = 40;

/// Symbol width/height in modules for a version.
pub fn dimension(version: u8) -> usize {
    17 + 4 * version as usize
}

/// Total codewords (data + EC) per version, ISO 18004 Table 9.
const TOTAL_CODEWORDS: [u32; 40] = [
    26, 44, 70, 100, 134, 172, 196, 242, 292, 346, // 1-10
    404, 466, 532, 581, 655, 733, 815, 901, 991, 1085, // 11-20
    1156, 1258, 1364, 1474, 1588, 1706, 1828, 1921, 2051, 2185, // 21-30
    2323, 2465, 2611, 2761, 2876, 3034, 3196, 3362, 3532, 3706, // 31-40
];

pub fn total_codewords(version: u8) -> u32 {
    TOTAL_CODEWORDS[version as usize - 1]
}

/// Error correction block structure for one (version, level) cell.
///
/// A symbol's data codewords are split into one or two groups of
/// Reed-Solomon blocks; blocks in the second group carry one more data
/// codeword than blocks in the first. The EC codeword count per block is
/// the same for every block of the symbol.
#[derive(Clone, Copy, Debug)]
pub struct EcBlocks {
    /// EC codewords appended to every block
    pub ec_codewords_per_block: u32,
    /// (block count, data codewords per block) per group
    pub groups: &'static [(u32, u32)],
}

impl EcBlocks {
    pub fn num_blocks(&self) -> u32 {
        self.groups.iter().map(|&(count, _)| count).sum()
    }

    pub fn num_data_codewords(&self) -> u32 {
        self.groups
            .iter()
            .map(|&(count, data)| count * data)
            .sum()
    }

    pub fn num_ec_codewords(&self) -> u32 {
        self.num_blocks() * self.ec_codewords_per_block
    }
}

const fn ecb(ec_codewords_per_block: u32, groups: &'static [(u32, u32)]) -> EcBlocks {
    EcBlocks {
        ec_codewords_per_block,
        groups,
    }
}

/// EC block structure per version and level [L, M, Q, H], Table 9.
const EC_BLOCKS: [[EcBlocks; 4]; 40] = [
    // Version 1
    [
        ecb(7, &[(1, 19)]),
        ecb(10, &[(1, 16)]),
        ecb(13, &[(1, 13)]),
        ecb(17, &[(1, 9)]),
    ],
    // Version 2
    [
        ecb(10, &[(1, 34)]),
        ecb(16, &[(1, 28)]),
        ecb(22, &[(1, 22)]),
        ecb(28, &[(1, 16)]),
    ],
    // Version 3
    [
        ecb(15, &[(1, 55)]),
        ecb(26, &[(1, 44)]),
        ecb(18, &[(2, 17)]),
        ecb(22, &[(2, 13)]),
    ],
    // Version 4
    [
        ecb(20, &[(1, 80)]),
        ecb(18, &[(2, 32)]),
        ecb(26, &[(2, 24)]),
        ecb(16, &[(4, 9)]),
    ],
    // Version 5
    [
        ecb(26, &[(1, 108)]),
        ecb(24, &[(2, 43)]),
        ecb(18, &[(2, 15), (2, 16)]),
        ecb(22, &[(2, 11), (2, 12)]),
    ],
    // Version 6
    [
        ecb(18, &[(2, 68)]),
        ecb(16, &[(4, 27)]),
        ecb(24, &[(4, 19)]),
        ecb(28, &[(4, 15)]),
    ],
    // Version 7
    [
        ecb(20, &[(2, 78)]),
        ecb(18, &[(4, 31)]),
        ecb(18, &[(2, 14), (4, 15)]),
        ecb(26, &[(4, 13), (1, 14)]),
    ],
    // Version 8
    [
        ecb(24, &[(2, 97)]),
        ecb(22, &[(2, 38), (2, 39)]),
        ecb(22, &[(4, 18), (2, 19)]),
        ecb(26, &[(4, 14), (2, 15)]),
    ],
    // Version 9
    [
        ecb(30, &[(2, 116)]),
        ecb(22, &[(3, 36), (2, 37)]),
        ecb(20, &[(4, 16), (4, 17)]),
        ecb(24, &[(4, 12), (4, 13)]),
    ],
    // Version 10
    [
        ecb(18, &[(2, 68), (2, 69)]),
        ecb(26, &[(4, 43), (1, 44)]),
        ecb(24, &[(6, 19), (2, 20)]),
        ecb(28, &[(6, 15), (2, 16)]),
    ],
    // Version 11
    [
        ecb(20, &[(4, 81)]),
        ecb(30, &[(1, 50), (4, 51)]),
        ecb(28, &[(4, 22), (4, 23)]),
        ecb(24, &[(3, 12), (8, 13)]),
    ],
    // Version 12
    [
        ecb(24, &[(2, 92), (2, 93)]),
        ecb(22, &[(6, 36), (2, 37)]),
        ecb(26, &[(4, 20), (6, 21)]),
        ecb(28, &[(7, 14), (4, 15)]),
    ],
    // Version 13
    [
        ecb(26, &[(4, 107)]),
        ecb(22, &[(8, 37), (1, 38)]),
        ecb(24, &[(8, 20), (4, 21)]),
        ecb(22, &[(12, 11), (4, 12)]),
    ],
    // Version 14
    [
        ecb(30, &[(3, 115), (1, 116)]),
        ecb(24, &[(4, 40), (5, 41)]),
        ecb(20, &[(11, 16), (5, 17)]),
        ecb(24, &[(11, 12), (5, 13)]),
    ],
    // Version 15
    [
        ecb(22, &[(5, 87), (1, 88)]),
        ecb(24, &[(5, 41), (5, 42)]),
        ecb(30, &[(5, 24), (7, 25)]),
        ecb(24, &[(11, 12), (7, 13)]),
    ],
    // Version 16
    [
        ecb(24, &[(5, 98), (1, 99)]),
        ecb(28, &[(7, 45), (3, 46)]),
        ecb(24, &[(15, 19), (2, 20)]),
        ecb(30, &[(3, 15), (13, 16)]),
    ],
    // Version 17
    [
        ecb(28, &[(1, 107), (5, 108)]),
        ecb(28, &[(10, 46), (1, 47)]),
        ecb(28, &[(1, 22), (15, 23)]),
        ecb(28, &[(2, 14), (17, 15)]),
    ],
    // Version 18
    [
        ecb(30, &[(5, 120), (1, 121)]),
        ecb(26, &[(9, 43), (4, 44)]),
        ecb(28, &[(17, 22), (1, 23)]),
        ecb(28, &[(2, 14), (19, 15)]),
    ],
    // Version 19
    [
        ecb(28, &[(3, 113), (4, 114)]),
        ecb(26, &[(3, 44), (11, 45)]),
        ecb(26, &[(17, 21), (4, 22)]),
        ecb(26, &[(9, 13), (16, 14)]),
    ],
    // Version 20
    [
        ecb(28, &[(3, 107), (5, 108)]),
        ecb(26, &[(3, 41), (13, 42)]),
        ecb(30, &[(15, 24), (5, 25)]),
        ecb(28, &[(15, 15), (10, 16)]),
    ],
    // Version 21
    [
        ecb(28, &[(4, 116), (4, 117)]),
        ecb(26, &[(17, 42)]),
        ecb(28, &[(17, 22), (6, 23)]),
        ecb(30, &[(19, 16), (6, 17)]),
    ],
    // Version 22
    [
        ecb(28, &[(2, 111), (7, 112)]),
        ecb(28, &[(17, 46)]),
        ecb(30, &[(7, 24), (16, 25)]),
        ecb(24, &[(34, 13)]),
    ],
    // Version 23
    [
        ecb(30, &[(4, 121), (5, 122)]),
        ecb(28, &[(4, 47), (14, 48)]),
        ecb(30, &[(11, 24), (14, 25)]),
        ecb(30, &[(16, 15), (14, 16)]),
    ],
    // Version 24
    [
        ecb(30, &[(6, 117), (4, 118)]),
        ecb(28, &[(6, 45), (14, 46)]),
        ecb(30, &[(11, 24), (16, 25)]),
        ecb(30, &[(30, 16), (2, 17)]),
    ],
    // Version 25
    [
        ecb(26, &[(8, 106), (4, 107)]),
        ecb(28, &[(8, 47), (13, 48)]),
        ecb(30, &[(7, 24), (22, 25)]),
        ecb(30, &[(22, 15), (13, 16)]),
    ],
    // Version 26
    [
        ecb(28, &[(10, 114), (2, 115)]),
        ecb(28, &[(19, 46), (4, 47)]),
        ecb(28, &[(28, 22), (6, 23)]),
        ecb(30, &[(33, 16), (4, 17)]),
    ],
    // Version 27
    [
        ecb(30, &[(8, 122), (4, 123)]),
        ecb(28, &[(22, 45), (3, 46)]),
        ecb(30, &[(8, 23), (26, 24)]),
        ecb(30, &[(12, 15), (28, 16)]),
    ],
    // Version 28
    [
        ecb(30, &[(3, 117), (10, 118)]),
        ecb(28, &[(3, 45), (23, 46)]),
        ecb(30, &[(4, 24), (31, 25)]),
        ecb(30, &[(11, 15), (31, 16)]),
    ],
    // Version 29
    [
        ecb(30, &[(7, 116), (7, 117)]),
        ecb(28, &[(21, 45), (7, 46)]),
        ecb(30, &[(1, 23), (37, 24)]),
        ecb(30, &[(19, 15), (26, 16)]),
    ],
    // Version 30
    [
        ecb(30, &[(5, 115), (10, 116)]),
        ecb(28, &[(19, 47), (10, 48)]),
        ecb(30, &[(15, 24), (25, 25)]),
        ecb(30, &[(23, 15), (25, 16)]),
    ],
    // Version 31
    [
        ecb(30, &[(13, 115), (3, 116)]),
        ecb(28, &[(2, 46), (29, 47)]),
        ecb(30, &[(42, 24), (1, 25)]),
        ecb(30, &[(23, 15), (28, 16)]),
    ],
    // Version 32
    [
        ecb(30, &[(17, 115)]),
        ecb(28, &[(10, 46), (23, 47)]),
        ecb(30, &[(10, 24), (35, 25)]),
        ecb(30, &[(19, 15), (35, 16)]),
    ],
    // Version 33
    [
        ecb(30, &[(17, 115), (1, 116)]),
        ecb(28, &[(14, 46), (21, 47)]),
        ecb(30, &[(29, 24), (19, 25)]),
        ecb(30, &[(11, 15), (46, 16)]),
    ],
    // Version 34
    [
        ecb(30, &[(13, 115), (6, 116)]),
        ecb(28, &[(14, 46), (23, 47)]),
        ecb(30, &[(44, 24), (7, 25)]),
        ecb(30, &[(59, 16), (1, 17)]),
    ],
    // Version 35
    [
        ecb(30, &[(12, 121), (7, 122)]),
        ecb(28, &[(12, 47), (26, 48)]),
        ecb(30, &[(39, 24), (14, 25)]),
        ecb(30, &[(22, 15), (41, 16)]),
    ],
    // Version 36
    [
        ecb(30, &[(6, 121), (14, 122)]),
        ecb(28, &[(6, 47), (34, 48)]),
        ecb(30, &[(46, 24), (10, 25)]),
        ecb(30, &[(2, 15), (64, 16)]),
    ],
    // Version 37
    [
        ecb(30, &[(17, 122), (4, 123)]),
        ecb(28, &[(29, 46), (14, 47)]),
        ecb(30, &[(49, 24), (10, 25)]),
        ecb(30, &[(24, 15), (46, 16)]),
    ],
    // Version 38
    [
        ecb(30, &[(4, 122), (18, 123)]),
        ecb(28, &[(13, 46), (32, 47)]),
        ecb(30, &[(48, 24), (14, 25)]),
        ecb(30, &[(42, 15), (32, 16)]),
    ],
    // Version 39
    [
        ecb(30, &[(20, 117), (4, 118)]),
        ecb(28, &[(40, 47), (7, 48)]),
        ecb(30, &[(43, 24), (22, 25)]),
        ecb(30, &[(10, 15), (67, 16)]),
    ],
    // Version 40
    [
        ecb(30, &[(19, 118), (6, 119)]),
        ecb(28, &[(18, 47), (31, 48)]),
        ecb(30, &[(34, 24), (34, 25)]),
        ecb(30, &[(20, 15), (61, 16)]),
    ],
];

/// Block structure for a (version, level) pair.
pub fn ec_blocks(version: u8, level: ErrorCorrectionLevel) -> &'static EcBlocks {
    &EC_BLOCKS[version as usize - 1][level as usize]
}

/// Data codewords available at a (version, level) pair.
pub fn num_data_codewords(version: u8, level: ErrorCorrectionLevel) -> u32 {
    ec_blocks(version, level).num_data_codewords()
}

/// Alignment pattern centre coordinates per version, ISO 18004 Annex E.
///
/// Centres apply to both rows and columns; version 1 has none.
const ALIGNMENT_CENTERS: [&[usize]; 40] = [
    &[],
    &[6, 18],
    &[6, 22],
    &[6, 26],
    &[6, 30],
    &[6, 34],
    &[6, 22, 38],
    &[6, 24, 42],
    &[6, 26, 46],
    &[6, 28, 52],
    &[6, 30, 56],
    &[6, 32, 60],
    &[6, 34, 64],
    &[6, 26, 46, 66],
    &[6, 26, 48, 70],
    &[6, 26, 50, 74],
    &[6, 30, 54, 78],
    &[6, 30, 56, 82],
    &[6, 30, 58, 86],
    &[6, 34, 62, 90],
    &[6, 28, 50, 72, 94],
    &[6, 26, 50, 74, 98],
    &[6, 30, 54, 78, 102],
    &[6, 28, 54, 80, 106],
    &[6, 32, 58, 84, 110],
    &[6, 30, 58, 86, 114],
    &[6, 34, 62, 90, 118],
    &[6, 26, 50, 74, 98, 122],
    &[6, 30, 54, 78, 102, 126],
    &[6, 26, 52, 78, 104, 130],
    &[6, 30, 56, 82, 108, 134],
    &[6, 34, 60, 86, 112, 138],
    &[6, 30, 58, 86, 114, 142],
    &[6, 34, 62, 90, 118, 146],
    &[6, 30, 54, 78, 102, 126, 150],
    &[6, 24, 50, 76, 102, 128, 154],
    &[6, 28, 54, 80, 106, 132, 158],
    &[6, 32, 58, 84, 110, 136, 162],
    &[6, 26, 54, 82, 110, 138, 166],
    &[6, 30, 58, 86, 114, 142, 170],
];

pub fn alignment_centers(version: u8) -> &'static [usize] {
    ALIGNMENT_CENTERS[version as usize - 1]
}

/// BCH(15,5) format information word for (level, mask).
///
/// Five data bits (two level bits, three mask bits) gain ten BCH check
/// bits computed with generator x^10 + x^8 + x^5 + x^4 + x^2 + x + 1
/// (0x537), and the result is XORed with 0x5412 so no level/mask choice
/// yields an all-zero strip.
pub fn format_info_bits(level: ErrorCorrectionLevel, mask: u8) -> u32 {
    debug_assert!(mask < 8);
    let data = (level.format_bits() << 3) | mask as u32;

    let mut rem = data << 10;
    for i in (0..=4).rev() {
        if (rem >> (i + 10)) & 1 == 1 {
            rem ^= 0x537 << i;
        }
    }

    ((data << 10) | rem) ^ 0b101010000010010
}

/// BCH(18,6) version information word, defined for versions 7..=40.
///
/// Generator x^12 + x^11 + x^10 + x^9 + x^8 + x^5 + x^2 + 1 (0x1F25),
/// no XOR mask.
pub fn version_info_bits(version: u8) -> u32 {
    debug_assert!(version >= 7);
    let mut rem = (version as u32) << 12;
    for i in (0..=5).rev() {
        if (rem >> (i + 12)) & 1 == 1 {
            rem ^= 0x1F25 << i;
        }
    }

    ((version as u32) << 12) | rem
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorCorrectionLevel::{H, L, M, Q};

    #[test]
    fn dimension_is_17_plus_4v() {
        assert_eq!(dimension(1), 21);
        assert_eq!(dimension(6), 41);
        assert_eq!(dimension(40), 177);
    }

    /// Every (version, level) cell's block groups must add up to the
    /// version's total codeword count. A mismatch anywhere means a typo in
    /// the transcription.
    #[test]
    fn block_structure_matches_total_codewords() {
        for version in MIN_VERSION..=MAX_VERSION {
            for level in [L, M, Q, H] {
                let blocks = ec_blocks(version, level);
                let sum: u32 = blocks
                    .groups
                    .iter()
                    .map(|&(count, data)| count * (data + blocks.ec_codewords_per_block))
                    .sum();
                assert_eq!(
                    sum,
                    total_codewords(version),
                    "block structure mismatch at v{} {:?}",
                    version,
                    level
                );
            }
        }
    }

    /// Group 2 blocks carry exactly one more data codeword than group 1.
    #[test]
    fn second_group_holds_one_extra_codeword() {
        for version in MIN_VERSION..=MAX_VERSION {
            for level in [L, M, Q, H] {
                let blocks = ec_blocks(version, level);
                if let [(_, data1), (_, data2)] = blocks.groups {
                    assert_eq!(data1 + 1, *data2, "v{} {:?}", version, level);
                }
            }
        }
    }

    #[test]
    fn known_data_capacities() {
        assert_eq!(num_data_codewords(1, L), 19);
        assert_eq!(num_data_codewords(1, M), 16);
        assert_eq!(num_data_codewords(1, H), 9);
        assert_eq!(num_data_codewords(5, Q), 62);
        assert_eq!(num_data_codewords(40, L), 2956);
    }

    /// Data plus EC codewords must account for the whole symbol.
    #[test]
    fn data_and_ec_partition_the_codewords() {
        for version in MIN_VERSION..=MAX_VERSION {
            for level in [L, M, Q, H] {
                let blocks = ec_blocks(version, level);
                assert_eq!(
                    blocks.num_data_codewords() + blocks.num_ec_codewords(),
                    total_codewords(version),
                    "v{} {:?}",
                    version,
                    level
                );
            }
        }
    }

    #[test]
    fn alignment_centers_match_annex_e() {
        assert_eq!(alignment_centers(1), &[] as &[usize]);
        assert_eq!(alignment_centers(2), &[6, 18]);
        assert_eq!(alignment_centers(7), &[6, 22, 38]);
        assert_eq!(alignment_centers(32), &[6, 34, 60, 86, 112, 138]);
        assert_eq!(alignment_centers(40), &[6, 30, 58, 86, 114, 142, 170]);
    }

    /// Centres are symmetric: first is always 6, last is always D - 7.
    #[test]
    fn alignment_centers_span_the_symbol() {
        for version in 2..=MAX_VERSION {
            let centers = alignment_centers(version);
            assert_eq!(centers[0], 6);
            assert_eq!(*centers.last().unwrap(), dimension(version) - 7);
        }
    }

    /// Format words from ISO 18004 Table C.2.
    #[test]
    fn format_bits_known_values() {
        let cases = [
            (M, 0, 0b101010000010010),
            (M, 1, 0b101000100100101),
            (M, 2, 0b101111001111100),
            (L, 0, 0b111011111000100),
            (L, 1, 0b111001011110011),
            (H, 0, 0b001011010001001),
            (H, 1, 0b001001110111110),
            (Q, 0, 0b011010101011111),
            (Q, 1, 0b011000001101000),
        ];
        for (level, mask, expected) in cases {
            assert_eq!(
                format_info_bits(level, mask),
                expected,
                "format word mismatch for {:?}-{}",
                level,
                mask
            );
        }
    }

    /// Version words from ISO 18004 Table D.1.
    #[test]
    fn version_bits_known_values() {
        assert_eq!(version_info_bits(7), 0x07C94);
        assert_eq!(version_info_bits(8), 0x085BC);
        assert_eq!(version_info_bits(21), 0x15683);
        assert_eq!(version_info_bits(40), 0x28C69);
    }
}
