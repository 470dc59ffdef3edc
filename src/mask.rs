//! Mask patterns and penalty scoring.
//!
//! Masking XORs the data region with one of eight parametric patterns to
//! break up module arrangements that scan poorly: large same-colour areas
//! and runs, and anything resembling a finder pattern. Every mask is tried
//! and the complete candidate symbol is scored under the standard's four
//! penalty rules; the lowest total wins.

use crate::bits::BitStream;
use crate::matrix::{build_matrix, Matrix};
use crate::ErrorCorrectionLevel;

/// Whether mask `mask` flips the module at (row, col).
///
/// The eight predicates (i = row, j = col):
/// - 0: (i + j) mod 2 = 0
/// - 1: i mod 2 = 0
/// - 2: j mod 3 = 0
/// - 3: (i + j) mod 3 = 0
/// - 4: (i/2 + j/3) mod 2 = 0
/// - 5: (i*j) mod 2 + (i*j) mod 3 = 0
/// - 6: ((i*j) mod 2 + (i*j) mod 3) mod 2 = 0
/// - 7: ((i+j) mod 2 + (i*j) mod 3) mod 2 = 0
pub fn mask_bit(mask: u8, row: usize, col: usize) -> bool {
    let i = row;
    let j = col;
    match mask {
        0 => (i + j) % 2 == 0,
        1 => i % 2 == 0,
        2 => j % 3 == 0,
        3 => (i + j) % 3 == 0,
        4 => (i / 2 + j / 3) % 2 == 0,
        5 => (i * j) % 2 + (i * j) % 3 == 0,
        6 => ((i * j) % 2 + (i * j) % 3) % 2 == 0,
        7 => ((i + j) % 2 + (i * j) % 3) % 2 == 0,
        _ => unreachable!("mask patterns run 0..=7"),
    }
}

/// Build all eight candidates and return the (mask, matrix) pair with the
/// lowest penalty. Strict comparison breaks ties toward the lowest index.
pub fn choose_mask(
    bits: &BitStream,
    level: ErrorCorrectionLevel,
    version: u8,
) -> (u8, Matrix) {
    let mut best: Option<(u8, Matrix)> = None;
    let mut best_penalty = u32::MAX;

    for mask in 0..8 {
        let candidate = build_matrix(bits, level, version, mask);
        let penalty = calculate_penalty(&candidate);
        if penalty < best_penalty {
            best_penalty = penalty;
            best = Some((mask, candidate));
        }
    }

    best.expect("at least one mask candidate exists")
}

/// Total penalty: the sum of the four rules.
pub fn calculate_penalty(matrix: &Matrix) -> u32 {
    penalty_runs(matrix)
        + penalty_blocks(matrix)
        + penalty_finder_like(matrix)
        + penalty_balance(matrix)
}

/// Rule 1: every run of five or more same-coloured modules in a row or
/// column scores its length minus two.
fn penalty_runs(matrix: &Matrix) -> u32 {
    let size = matrix.size();
    let mut penalty = 0;
    for row in 0..size {
        penalty += run_penalty((0..size).map(|col| matrix.get(row, col)));
    }
    for col in 0..size {
        penalty += run_penalty((0..size).map(|row| matrix.get(row, col)));
    }
    penalty
}

fn run_penalty(line: impl Iterator<Item = bool>) -> u32 {
    let mut penalty = 0u32;
    let mut run_color = false;
    let mut run_len = 0usize;

    for module in line {
        if module == run_color && run_len > 0 {
            run_len += 1;
        } else {
            if run_len >= 5 {
                penalty += (run_len - 2) as u32;
            }
            run_color = module;
            run_len = 1;
        }
    }
    if run_len >= 5 {
        penalty += (run_len - 2) as u32;
    }

    penalty
}

/// Rule 2: three points for every 2x2 block of one colour. Overlapping
/// blocks count independently.
fn penalty_blocks(matrix: &Matrix) -> u32 {
    let size = matrix.size();
    let mut penalty = 0;
    for row in 0..size - 1 {
        for col in 0..size - 1 {
            let color = matrix.get(row, col);
            if color == matrix.get(row, col + 1)
                && color == matrix.get(row + 1, col)
                && color == matrix.get(row + 1, col + 1)
            {
                penalty += 3;
            }
        }
    }
    penalty
}

/// The finder ratio 1:1:3:1:1 flanked by four light modules, and its
/// mirror image.
const FINDER_RUN: [bool; 11] = [
    true, false, true, true, true, false, true, false, false, false, false,
];
const FINDER_RUN_REV: [bool; 11] = [
    false, false, false, false, true, false, true, true, true, false, true,
];

/// Rule 3: forty points for every 11-module window that reproduces a
/// finder pattern with its quiet flank, in any row or column.
fn penalty_finder_like(matrix: &Matrix) -> u32 {
    let size = matrix.size();
    if size < 11 {
        return 0;
    }
    let mut penalty = 0;
    for row in 0..size {
        for col in 0..=size - 11 {
            let window = |i: usize| matrix.get(row, col + i);
            if matches_finder_run(window) {
                penalty += 40;
            }
        }
    }
    for col in 0..size {
        for row in 0..=size - 11 {
            let window = |i: usize| matrix.get(row + i, col);
            if matches_finder_run(window) {
                penalty += 40;
            }
        }
    }
    penalty
}

fn matches_finder_run(window: impl Fn(usize) -> bool) -> bool {
    let forward = (0..11).all(|i| window(i) == FINDER_RUN[i]);
    forward || (0..11).all(|i| window(i) == FINDER_RUN_REV[i])
}

/// Rule 4: ten points for every five percentage points the dark-module
/// share strays from fifty percent. Integer arithmetic throughout.
fn penalty_balance(matrix: &Matrix) -> u32 {
    let size = matrix.size();
    let dark = matrix.count_dark();
    let total = size * size;
    let percent = dark * 100 / total;
    let deviation = (percent as i32 - 50).unsigned_abs();
    (deviation / 5) * 10
}
