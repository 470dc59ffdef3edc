//! GF(2^8) arithmetic and Reed-Solomon error correction.
//!
//! The field is the QR code field: polynomials over GF(2) modulo the
//! primitive polynomial x^8 + x^4 + x^3 + x^2 + 1 (0x11D).
//!
//! - Addition: XOR (no carry, mod 2 coefficients)
//! - Multiplication: via log/antilog tables, a * b = exp(log(a) + log(b))
//!
//! The antilog table is doubled to 512 entries (exp[i] = exp[i % 255]) so a
//! sum of two logs never needs a modulo reduction.

use std::sync::OnceLock;

/// GF(2^8) arithmetic via compile-time log/antilog tables.
pub struct GF256;

impl GF256 {
    /// Logarithm table (index 1-255 -> exponent)
    const LOG: [u8; 256] = Self::generate_log_table();

    /// Antilogarithm table, folded: EXP[i] = alpha^(i mod 255)
    const EXP: [u8; 512] = Self::generate_exp_table();

    const fn generate_exp_table() -> [u8; 512] {
        let mut table = [0u8; 512];
        let mut x = 1u16;

        let mut i = 0;
        while i < 255 {
            table[i] = x as u8;
            table[i + 255] = x as u8;
            x <<= 1;
            if x >= 256 {
                x ^= 0x11D; // Reduce by primitive polynomial
            }
            i += 1;
        }

        table[510] = table[0];
        table[511] = table[1];
        table
    }

    const fn generate_log_table() -> [u8; 256] {
        let exp = Self::generate_exp_table();
        let mut table = [0u8; 256];

        let mut i = 0;
        while i < 255 {
            table[exp[i] as usize] = i as u8;
            i += 1;
        }

        table
    }

    /// Multiply two elements in GF(2^8).
    pub fn mul(a: u8, b: u8) -> u8 {
        if a == 0 || b == 0 {
            0
        } else {
            Self::EXP[Self::LOG[a as usize] as usize + Self::LOG[b as usize] as usize]
        }
    }

    /// alpha^n, with the exponent folded mod 255.
    pub fn exp(n: usize) -> u8 {
        Self::EXP[n % 255]
    }

    /// Discrete log of a non-zero element.
    #[cfg(test)]
    pub fn log(a: u8) -> u8 {
        assert!(a != 0, "log(0) is undefined in GF(2^8)");
        Self::LOG[a as usize]
    }

    /// Multiplicative inverse of a non-zero element.
    ///
    /// inv(a) = alpha^(255 - log(a)), since alpha^255 = 1.
    pub fn inv(a: u8) -> u8 {
        assert!(a != 0, "cannot invert zero in GF(2^8)");
        Self::EXP[255 - Self::LOG[a as usize] as usize]
    }

    /// a / b = a * inv(b)
    pub fn div(a: u8, b: u8) -> u8 {
        Self::mul(a, Self::inv(b))
    }
}

/// A polynomial over GF(2^8), coefficients in descending degree order.
///
/// The leading coefficient is non-zero except for the zero polynomial,
/// which is represented as a single zero coefficient.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GfPoly {
    coefficients: Vec<u8>,
}

impl GfPoly {
    /// Build from coefficients in descending degree order, stripping
    /// leading zeros.
    pub fn new(coefficients: &[u8]) -> Self {
        assert!(!coefficients.is_empty(), "polynomial needs coefficients");
        let first_nonzero = coefficients.iter().position(|&c| c != 0);
        match first_nonzero {
            Some(i) => Self {
                coefficients: coefficients[i..].to_vec(),
            },
            None => Self {
                coefficients: vec![0],
            },
        }
    }

    /// The monomial `coefficient * x^degree`.
    pub fn monomial(degree: usize, coefficient: u8) -> Self {
        if coefficient == 0 {
            return Self {
                coefficients: vec![0],
            };
        }
        let mut coefficients = vec![0u8; degree + 1];
        coefficients[0] = coefficient;
        Self { coefficients }
    }

    pub fn is_zero(&self) -> bool {
        self.coefficients[0] == 0
    }

    pub fn degree(&self) -> usize {
        self.coefficients.len() - 1
    }

    pub fn leading_coefficient(&self) -> u8 {
        self.coefficients[0]
    }

    /// Coefficient of the x^degree term.
    pub fn coefficient(&self, degree: usize) -> u8 {
        self.coefficients[self.coefficients.len() - 1 - degree]
    }

    /// Evaluate the polynomial at a point by Horner's rule.
    pub fn evaluate_at(&self, x: u8) -> u8 {
        if x == 0 {
            return self.coefficient(0);
        }
        self.coefficients
            .iter()
            .fold(0u8, |acc, &c| GF256::mul(acc, x) ^ c)
    }

    /// Polynomial addition, which in GF(2^8) is coefficient-wise XOR.
    pub fn add(&self, other: &GfPoly) -> GfPoly {
        if self.is_zero() {
            return other.clone();
        }
        if other.is_zero() {
            return self.clone();
        }

        let (smaller, larger) = if self.coefficients.len() <= other.coefficients.len() {
            (&self.coefficients, &other.coefficients)
        } else {
            (&other.coefficients, &self.coefficients)
        };
        let offset = larger.len() - smaller.len();
        let mut sum = larger.clone();
        for (i, &c) in smaller.iter().enumerate() {
            sum[offset + i] ^= c;
        }
        GfPoly::new(&sum)
    }

    pub fn multiply(&self, other: &GfPoly) -> GfPoly {
        if self.is_zero() || other.is_zero() {
            return GfPoly::new(&[0]);
        }
        let mut product = vec![0u8; self.coefficients.len() + other.coefficients.len() - 1];
        for (i, &a) in self.coefficients.iter().enumerate() {
            for (j, &b) in other.coefficients.iter().enumerate() {
                product[i + j] ^= GF256::mul(a, b);
            }
        }
        GfPoly::new(&product)
    }

    pub fn multiply_by_monomial(&self, degree: usize, coefficient: u8) -> GfPoly {
        if coefficient == 0 || self.is_zero() {
            return GfPoly::new(&[0]);
        }
        let mut product = vec![0u8; self.coefficients.len() + degree];
        for (i, &c) in self.coefficients.iter().enumerate() {
            product[i] = GF256::mul(c, coefficient);
        }
        GfPoly::new(&product)
    }

    /// Remainder of dividing `self` by `divisor` (long division).
    pub fn remainder(&self, divisor: &GfPoly) -> GfPoly {
        assert!(!divisor.is_zero(), "division by the zero polynomial");
        let mut remainder = self.clone();
        while !remainder.is_zero() && remainder.degree() >= divisor.degree() {
            let degree_diff = remainder.degree() - divisor.degree();
            let scale = GF256::div(
                remainder.leading_coefficient(),
                divisor.leading_coefficient(),
            );
            remainder = remainder.add(&divisor.multiply_by_monomial(degree_diff, scale));
        }
        remainder
    }
}

/// Highest EC-codewords-per-block value in the standard's block table.
const MAX_EC_CODEWORDS: usize = 30;

/// Generator polynomial for `ec_count` error correction codewords.
///
/// g(x) = (x - alpha^0)(x - alpha^1)...(x - alpha^(ec_count-1))
///
/// All generators the standard can ask for are built in one shot on first
/// use and shared process-wide; the table is immutable once published.
fn generator(ec_count: usize) -> &'static GfPoly {
    static GENERATORS: OnceLock<Vec<GfPoly>> = OnceLock::new();
    let generators = GENERATORS.get_or_init(|| {
        let mut cache = Vec::with_capacity(MAX_EC_CODEWORDS + 1);
        cache.push(GfPoly::new(&[1])); // degree 0, unused
        let mut g = GfPoly::new(&[1]);
        for i in 0..MAX_EC_CODEWORDS {
            g = g.multiply(&GfPoly::new(&[1, GF256::exp(i)]));
            cache.push(g.clone());
        }
        cache
    });
    assert!(
        (1..=MAX_EC_CODEWORDS).contains(&ec_count),
        "no generator for {} EC codewords",
        ec_count
    );
    &generators[ec_count]
}

/// Compute `ec_count` Reed-Solomon codewords for `data` (systematic code).
///
/// The data polynomial is shifted up by x^ec_count and reduced modulo the
/// generator; the remainder's coefficients, left-padded with zeros to
/// exactly `ec_count` bytes, are the EC codewords.
pub fn rs_encode(data: &[u8], ec_count: usize) -> Vec<u8> {
    assert!(ec_count > 0, "at least one EC codeword is required");
    assert!(!data.is_empty(), "cannot encode an empty block");

    let message = GfPoly::new(data).multiply_by_monomial(ec_count, 1);
    let remainder = message.remainder(generator(ec_count));

    let coefficients = &remainder.coefficients;
    let num_zeros = if remainder.is_zero() {
        ec_count
    } else {
        ec_count - coefficients.len()
    };
    let mut ec_bytes = vec![0u8; num_zeros];
    if !remainder.is_zero() {
        ec_bytes.extend_from_slice(coefficients);
    }
    ec_bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Property: Multiplicative identity
    /// For all a in GF(2^8): a * 1 = a
    #[test]
    fn multiplicative_identity() {
        for a in 0u8..=255 {
            assert_eq!(GF256::mul(a, 1), a, "identity failed for a = {}", a);
        }
    }

    /// Property: Zero absorbs multiplication
    #[test]
    fn zero_absorbs() {
        for a in 0u8..=255 {
            assert_eq!(GF256::mul(a, 0), 0);
            assert_eq!(GF256::mul(0, a), 0);
        }
    }

    /// Property: Commutativity of multiplication
    #[test]
    fn commutativity() {
        for a in 0u8..=255 {
            for b in 0u8..=255 {
                assert_eq!(GF256::mul(a, b), GF256::mul(b, a));
            }
        }
    }

    /// Property: Associativity of multiplication, on sampled triples
    #[test]
    fn associativity() {
        let samples: [u8; 16] = [
            0, 1, 2, 3, 7, 15, 31, 63, 127, 128, 200, 250, 253, 254, 255, 42,
        ];

        for &a in &samples {
            for &b in &samples {
                for &c in &samples {
                    let lhs = GF256::mul(GF256::mul(a, b), c);
                    let rhs = GF256::mul(a, GF256::mul(b, c));
                    assert_eq!(lhs, rhs, "associativity failed for {} {} {}", a, b, c);
                }
            }
        }
    }

    /// Property: Distributivity of multiplication over addition (XOR)
    #[test]
    fn distributivity() {
        let samples: [u8; 16] = [
            0, 1, 2, 3, 7, 15, 31, 63, 127, 128, 200, 250, 253, 254, 255, 42,
        ];

        for &a in &samples {
            for &b in &samples {
                for &c in &samples {
                    let lhs = GF256::mul(a, b ^ c);
                    let rhs = GF256::mul(a, b) ^ GF256::mul(a, c);
                    assert_eq!(lhs, rhs, "distributivity failed for {} {} {}", a, b, c);
                }
            }
        }
    }

    /// Property: Multiplicative inverse
    /// For all a in GF(2^8) \ {0}: a * inv(a) = 1
    #[test]
    fn multiplicative_inverse() {
        for a in 1u8..=255 {
            assert_eq!(GF256::mul(a, GF256::inv(a)), 1, "inverse failed for {}", a);
        }
    }

    /// Property: LOG and EXP tables are inverses
    #[test]
    fn log_exp_inverse() {
        for a in 1u8..=255 {
            assert_eq!(GF256::exp(GF256::log(a) as usize), a);
        }
    }

    /// Property: table multiplication matches direct polynomial
    /// multiplication reduced modulo 0x11D.
    #[test]
    fn mul_matches_polynomial_multiplication() {
        fn poly_mul(a: u8, b: u8) -> u8 {
            let mut result = 0u16;
            let mut a_shifted = a as u16;
            for i in 0..8 {
                if (b >> i) & 1 == 1 {
                    result ^= a_shifted;
                }
                a_shifted <<= 1;
            }
            for i in (8..=14).rev() {
                if (result >> i) & 1 == 1 {
                    result ^= 0x11D << (i - 8);
                }
            }
            result as u8
        }

        for a in 0u8..=255 {
            for b in 0u8..=255 {
                assert_eq!(
                    GF256::mul(a, b),
                    poly_mul(a, b),
                    "table and direct multiplication disagree for {} * {}",
                    a,
                    b
                );
            }
        }
    }

    /// Property: EXP generates every non-zero element exactly once
    #[test]
    fn exp_generates_all_elements() {
        let mut seen = [false; 256];
        for i in 0usize..255 {
            let val = GF256::exp(i);
            assert!(!seen[val as usize], "duplicate exp({}) = {}", i, val);
            seen[val as usize] = true;
        }
        for val in 1u8..=255 {
            assert!(seen[val as usize], "value {} never generated", val);
        }
    }

    #[test]
    fn monomial_and_accessors() {
        let p = GfPoly::monomial(3, 5);
        assert_eq!(p.degree(), 3);
        assert_eq!(p.leading_coefficient(), 5);
        assert_eq!(p.coefficient(3), 5);
        assert_eq!(p.coefficient(0), 0);
        assert!(GfPoly::monomial(4, 0).is_zero());
    }

    #[test]
    fn new_strips_leading_zeros() {
        let p = GfPoly::new(&[0, 0, 7, 1]);
        assert_eq!(p.degree(), 1);
        assert_eq!(p.leading_coefficient(), 7);
        assert!(GfPoly::new(&[0, 0, 0]).is_zero());
    }

    #[test]
    fn evaluate_at_zero_reads_constant_term() {
        let p = GfPoly::new(&[3, 0, 9]);
        assert_eq!(p.evaluate_at(0), 9);
    }

    /// (x + 1)(x + 2) = x^2 + 3x + 2 in GF(2^8)
    #[test]
    fn multiply_small_polynomials() {
        let a = GfPoly::new(&[1, 1]);
        let b = GfPoly::new(&[1, 2]);
        assert_eq!(a.multiply(&b), GfPoly::new(&[1, 3, 2]));
    }

    /// Property: for any message, every root of the generator is a root of
    /// the full (data || ec) codeword polynomial.
    #[test]
    fn codeword_vanishes_at_generator_roots() {
        let data: [u8; 9] = [64, 21, 102, 87, 38, 230, 70, 38, 230];
        for ec_count in [7usize, 10, 13, 17, 30] {
            let ec = rs_encode(&data, ec_count);
            assert_eq!(ec.len(), ec_count);

            let mut codeword = data.to_vec();
            codeword.extend_from_slice(&ec);
            let poly = GfPoly::new(&codeword);
            for i in 0..ec_count {
                assert_eq!(
                    poly.evaluate_at(GF256::exp(i)),
                    0,
                    "codeword not divisible by (x - alpha^{}) for d = {}",
                    i,
                    ec_count
                );
            }
        }
    }

    /// Known-answer: the v1-M "HELLO WORLD" reference block.
    ///
    /// Data codewords and their ten EC codewords as published in the
    /// standard's worked example (and reproduced by every conformant
    /// encoder).
    #[test]
    fn reference_block_v1m() {
        let data: [u8; 16] = [
            32, 91, 11, 120, 209, 114, 220, 77, 67, 64, 236, 17, 236, 17, 236, 17,
        ];
        let expected: [u8; 10] = [196, 35, 39, 119, 235, 215, 231, 226, 93, 23];
        assert_eq!(rs_encode(&data, 10), expected);
    }

    /// Generator for d EC codewords has degree d and is monic.
    #[test]
    fn generators_are_monic_with_expected_degree() {
        for d in 1..=MAX_EC_CODEWORDS {
            let g = generator(d);
            assert_eq!(g.degree(), d);
            assert_eq!(g.leading_coefficient(), 1);
            for i in 0..d {
                assert_eq!(g.evaluate_at(GF256::exp(i)), 0, "alpha^{} not a root", i);
            }
        }
    }
}
