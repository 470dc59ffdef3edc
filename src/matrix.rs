//! Module matrix construction: function patterns, info strips, data layout.

use crate::bits::BitStream;
use crate::mask::mask_bit;
use crate::version::{alignment_centers, dimension, format_info_bits, version_info_bits};
use crate::ErrorCorrectionLevel;

/// A square grid of modules under construction.
///
/// `modules` holds the colour (true = dark); the parallel `is_function`
/// grid records which cells belong to finder/timing/alignment/format/
/// version structures and therefore never carry data and never get masked.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Matrix {
    modules: Vec<Vec<bool>>,
    is_function: Vec<Vec<bool>>,
    size: usize,
}

impl Matrix {
    fn new(size: usize) -> Self {
        Self {
            modules: vec![vec![false; size]; size],
            is_function: vec![vec![false; size]; size],
            size,
        }
    }

    /// Modules per side.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Colour at (row, col). true = dark.
    pub fn get(&self, row: usize, col: usize) -> bool {
        self.modules[row][col]
    }

    /// Whether (row, col) is part of a function pattern.
    pub fn is_function(&self, row: usize, col: usize) -> bool {
        self.is_function[row][col]
    }

    /// Count of dark modules in the whole symbol.
    pub fn count_dark(&self) -> usize {
        self.modules.iter().flatten().filter(|&&m| m).count()
    }

    fn set_function(&mut self, row: usize, col: usize, dark: bool) {
        self.modules[row][col] = dark;
        self.is_function[row][col] = true;
    }
}

/// Build the complete symbol for one mask candidate.
///
/// The matrix comes out finished: function patterns, both format strips,
/// version blocks for v7+, and the data stream laid out with `mask`
/// already applied. The mask selector scores these complete matrices, so
/// the format bits participate in the penalty like they do in the printed
/// symbol.
pub fn build_matrix(
    bits: &BitStream,
    level: ErrorCorrectionLevel,
    version: u8,
    mask: u8,
) -> Matrix {
    let mut matrix = Matrix::new(dimension(version));
    place_function_patterns(&mut matrix, version);
    place_format_info(&mut matrix, level, mask);
    if version >= 7 {
        place_version_info(&mut matrix, version);
    }
    place_data_bits(&mut matrix, bits, mask);
    matrix
}

fn place_function_patterns(matrix: &mut Matrix, version: u8) {
    let size = matrix.size();

    // Finder patterns with their one-module separators at three corners
    place_finder_pattern(matrix, 0, 0);
    place_finder_pattern(matrix, 0, size - 7);
    place_finder_pattern(matrix, size - 7, 0);

    // Alignment before timing: centres on row/column 6 share cells with
    // the timing pattern and must win them
    for &row in alignment_centers(version) {
        for &col in alignment_centers(version) {
            // Centres under a finder pattern are omitted
            if matrix.is_function(row, col) {
                continue;
            }
            place_alignment_pattern(matrix, row, col);
        }
    }

    place_timing_patterns(matrix);

    reserve_format_areas(matrix);

    // Dark module, always present next to the lower-left finder
    matrix.set_function(size - 8, 8, true);
}

/// 7x7 finder pattern with its light separator ring.
///
/// ```text
/// #######
/// #.....#
/// #.###.#
/// #.###.#
/// #.###.#
/// #.....#
/// #######
/// ```
fn place_finder_pattern(matrix: &mut Matrix, row: usize, col: usize) {
    let size = matrix.size();
    for dr in 0..7 {
        for dc in 0..7 {
            let is_edge = dr == 0 || dr == 6 || dc == 0 || dc == 6;
            let is_center = (2..=4).contains(&dr) && (2..=4).contains(&dc);
            matrix.set_function(row + dr, col + dc, is_edge || is_center);
        }
    }

    // Separator: the light band between the finder and the rest
    let r0 = row.saturating_sub(1);
    let r1 = (row + 7).min(size - 1);
    let c0 = col.saturating_sub(1);
    let c1 = (col + 7).min(size - 1);
    for r in r0..=r1 {
        for c in c0..=c1 {
            if !matrix.is_function(r, c) {
                matrix.set_function(r, c, false);
            }
        }
    }
}

/// Alternating dark/light line in row 6 and column 6.
fn place_timing_patterns(matrix: &mut Matrix) {
    let size = matrix.size();
    for i in 8..size - 8 {
        let dark = i % 2 == 0;
        if !matrix.is_function(6, i) {
            matrix.set_function(6, i, dark);
        }
        if !matrix.is_function(i, 6) {
            matrix.set_function(i, 6, dark);
        }
    }
}

/// 5x5 concentric pattern centred on an Annex E coordinate pair.
fn place_alignment_pattern(matrix: &mut Matrix, center_row: usize, center_col: usize) {
    for dr in 0..5 {
        for dc in 0..5 {
            let is_edge = dr == 0 || dr == 4 || dc == 0 || dc == 4;
            let is_center = dr == 2 && dc == 2;
            matrix.set_function(
                center_row + dr - 2,
                center_col + dc - 2,
                is_edge || is_center,
            );
        }
    }
}

/// Mark the format strips as function cells so data placement skips them.
/// The actual bits are written by `place_format_info`.
fn reserve_format_areas(matrix: &mut Matrix) {
    let size = matrix.size();
    for i in 0..9 {
        if i != 6 {
            if !matrix.is_function(8, i) {
                matrix.set_function(8, i, false);
            }
            if !matrix.is_function(i, 8) {
                matrix.set_function(i, 8, false);
            }
        }
    }
    for i in 0..8 {
        if !matrix.is_function(8, size - 1 - i) {
            matrix.set_function(8, size - 1 - i, false);
        }
        if !matrix.is_function(size - 1 - i, 8) {
            matrix.set_function(size - 1 - i, 8, false);
        }
    }
}

/// Write the 15 format bits along both standard paths.
///
/// Bit 0 is the least significant bit of the BCH word. The first copy
/// wraps around the top-left finder; the second is split between the
/// top-right and bottom-left finders.
fn place_format_info(matrix: &mut Matrix, level: ErrorCorrectionLevel, mask: u8) {
    let size = matrix.size();
    let format = format_info_bits(level, mask);
    let bit = |i: usize| (format >> i) & 1 == 1;

    // First copy, around the top-left finder
    for i in 0..6 {
        matrix.set_function(i, 8, bit(i));
    }
    matrix.set_function(7, 8, bit(6));
    matrix.set_function(8, 8, bit(7));
    matrix.set_function(8, 7, bit(8));
    for i in 9..15 {
        matrix.set_function(8, 14 - i, bit(i));
    }

    // Second copy: low bits under the top-right finder, high bits beside
    // the bottom-left finder
    for i in 0..8 {
        matrix.set_function(8, size - 1 - i, bit(i));
    }
    for i in 8..15 {
        matrix.set_function(size - 15 + i, 8, bit(i));
    }
}

/// Write the 18 version bits into the two 6x3 blocks (v7+).
fn place_version_info(matrix: &mut Matrix, version: u8) {
    let size = matrix.size();
    let info = version_info_bits(version);
    for i in 0..18 {
        let bit = (info >> i) & 1 == 1;
        let row = i / 3;
        let col = i % 3;
        // Bottom-left block, transposed top-right block
        matrix.set_function(size - 11 + col, row, bit);
        matrix.set_function(row, size - 11 + col, bit);
    }
}

/// Lay out the final bit stream in the zig-zag pattern, masking at write
/// time.
///
/// Column pairs are walked right to left, alternating upward and downward,
/// with the timing column 6 skipped entirely. Cells beyond the end of the
/// stream carry a 0 bit; the mask still applies to them.
fn place_data_bits(matrix: &mut Matrix, bits: &BitStream, mask: u8) {
    let size = matrix.size();
    let mut bit_index = 0;
    let mut going_up = true;

    let mut col = size - 1;
    loop {
        if col == 6 {
            col -= 1;
        }
        let rows: Vec<usize> = if going_up {
            (0..size).rev().collect()
        } else {
            (0..size).collect()
        };
        for row in rows {
            for dc in 0..2 {
                let c = col - dc;
                if matrix.is_function(row, c) {
                    continue;
                }
                let mut bit = if bit_index < bits.len() {
                    bit_index += 1;
                    bits.get(bit_index - 1)
                } else {
                    false
                };
                if mask_bit(mask, row, c) {
                    bit = !bit;
                }
                matrix.modules[row][c] = bit;
            }
        }
        going_up = !going_up;
        if col < 2 {
            break;
        }
        col -= 2;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::num_data_codewords;
    use crate::ErrorCorrectionLevel::L;

    fn dummy_bits(version: u8) -> BitStream {
        let mut bits = BitStream::new();
        for i in 0..num_data_codewords(version, L) {
            bits.append_bits((i % 256) as u32, 8);
        }
        bits
    }

    #[test]
    fn finder_patterns_sit_at_three_corners() {
        let m = build_matrix(&dummy_bits(1), L, 1, 0);
        for (row, col) in [(0, 0), (0, 14), (14, 0)] {
            // Outer ring dark, inner ring light, centre dark
            assert!(m.get(row, col));
            assert!(m.get(row + 6, col + 6));
            assert!(!m.get(row + 1, col + 1));
            assert!(m.get(row + 3, col + 3));
        }
        // Separators are light
        assert!(!m.get(7, 0));
        assert!(!m.get(0, 7));
        assert!(!m.get(13, 0));
        assert!(!m.get(7, 20));
    }

    #[test]
    fn timing_pattern_alternates() {
        let m = build_matrix(&dummy_bits(1), L, 1, 0);
        for i in 8..13 {
            assert_eq!(m.get(6, i), i % 2 == 0, "horizontal timing at {}", i);
            assert_eq!(m.get(i, 6), i % 2 == 0, "vertical timing at {}", i);
        }
    }

    #[test]
    fn dark_module_is_always_dark() {
        for mask in 0..8 {
            let m = build_matrix(&dummy_bits(1), L, 1, mask);
            assert!(m.get(m.size() - 8, 8));
        }
    }

    #[test]
    fn version_1_has_no_alignment_pattern() {
        let m = build_matrix(&dummy_bits(1), L, 1, 0);
        // (18, 18) would be the v2 centre; in v1 that cell is data
        assert!(!m.is_function(18, 18));
    }

    #[test]
    fn version_2_alignment_pattern_at_18_18() {
        let m = build_matrix(&dummy_bits(2), L, 2, 0);
        assert!(m.get(18, 18));
        assert!(!m.get(17, 18));
        assert!(m.get(16, 16));
        for dr in 0..5 {
            for dc in 0..5 {
                assert!(m.is_function(16 + dr, 16 + dc));
            }
        }
    }

    #[test]
    fn version_7_carries_version_info_blocks() {
        let m = build_matrix(&dummy_bits(7), L, 7, 0);
        let size = m.size();
        let info = version_info_bits(7);
        for i in 0..18 {
            let expected = (info >> i) & 1 == 1;
            assert_eq!(m.get(size - 11 + i % 3, i / 3), expected);
            assert_eq!(m.get(i / 3, size - 11 + i % 3), expected);
        }
    }

    /// The format strips must decode back to the (level, mask) that built
    /// the matrix.
    #[test]
    fn format_strips_round_trip() {
        for mask in 0..8 {
            let m = build_matrix(&dummy_bits(1), L, 1, mask);
            let expected = format_info_bits(L, mask);
            let mut copy1 = 0u32;
            for i in 0..6 {
                copy1 |= (m.get(i, 8) as u32) << i;
            }
            copy1 |= (m.get(7, 8) as u32) << 6;
            copy1 |= (m.get(8, 8) as u32) << 7;
            copy1 |= (m.get(8, 7) as u32) << 8;
            for i in 9..15 {
                copy1 |= (m.get(8, 14 - i) as u32) << i;
            }
            assert_eq!(copy1, expected, "first copy, mask {}", mask);

            let size = m.size();
            let mut copy2 = 0u32;
            for i in 0..8 {
                copy2 |= (m.get(8, size - 1 - i) as u32) << i;
            }
            for i in 8..15 {
                copy2 |= (m.get(size - 15 + i, 8) as u32) << i;
            }
            assert_eq!(copy2, expected, "second copy, mask {}", mask);
        }
    }

    /// Complementary masks flip every data cell relative to each other
    /// only where the mask predicates differ; function cells never move.
    #[test]
    fn function_cells_are_mask_invariant() {
        let a = build_matrix(&dummy_bits(1), L, 1, 0);
        let b = build_matrix(&dummy_bits(1), L, 1, 1);
        for row in 0..a.size() {
            for col in 0..a.size() {
                // Format strips differ by construction; skip them
                let in_format = (row == 8 || col == 8) && a.is_function(row, col);
                if a.is_function(row, col) && !in_format {
                    assert_eq!(a.get(row, col), b.get(row, col), "({}, {})", row, col);
                }
            }
        }
    }
}
