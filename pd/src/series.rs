//! Chudnovsky binary splitting
//!
//! Evaluates the series over a term range `[a, b)` as three exact integers
//! `(P, Q, T)`. Nothing is rounded here; the only division happens later in
//! [`crate::digits`].

use num_bigint::BigInt;
use num_traits::One;
use tracing::debug;

/// Decimal digits contributed by each term of the series
pub const DIGITS_PER_TERM: f64 = 14.181647462725477;

/// 640320^3 / 24
pub const C3_OVER_24: u64 = 10_939_058_860_032_000;

/// Constant term of the linear factor in each series term
const TERM_A: u64 = 13_591_409;

/// Slope of the linear factor in each series term
const TERM_B: u64 = 545_140_134;

/// Partial product/sum over a term range
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Triple {
    pub p: BigInt,
    pub q: BigInt,
    pub t: BigInt,
}

impl Triple {
    /// Single term contribution at index `a`
    pub fn term(a: u64) -> Self {
        let (p, q) = if a == 0 {
            (BigInt::one(), BigInt::one())
        } else {
            let a_big = BigInt::from(a);
            let p = BigInt::from(6 * a - 5) * BigInt::from(2 * a - 1) * BigInt::from(6 * a - 1);
            let q = &a_big * &a_big * &a_big * BigInt::from(C3_OVER_24);
            (p, q)
        };

        let mut t = &p * (BigInt::from(TERM_A) + BigInt::from(TERM_B) * BigInt::from(a));
        if a % 2 == 1 {
            t = -t;
        }

        Self { p, q, t }
    }

    /// Combine the triple for `[a, m)` with the one for `[m, b)`
    pub fn combine(self, right: Triple) -> Self {
        let t = self.t * &right.q + &self.p * right.t;
        Self {
            p: self.p * right.p,
            q: self.q * right.q,
            t,
        }
    }
}

/// Number of series terms needed for `digits` decimal digits
pub fn terms_for_digits(digits: u64) -> u64 {
    (digits as f64 / DIGITS_PER_TERM).ceil() as u64 + 1
}

enum Work {
    Split(u64, u64),
    Merge,
}

/// Evaluate the series over `[a, b)`
///
/// Walks the split tree with an explicit work stack, so neither the call
/// stack nor the value stack grow beyond O(log(b - a)).
///
/// # Panics
///
/// Panics if `b <= a`.
pub fn binary_split(a: u64, b: u64) -> Triple {
    assert!(b > a, "empty term range [{a}, {b})");
    debug!(a, b, "binary_split: called");

    let mut work = vec![Work::Split(a, b)];
    let mut values: Vec<Triple> = Vec::new();

    while let Some(item) = work.pop() {
        match item {
            Work::Split(lo, hi) if hi - lo == 1 => values.push(Triple::term(lo)),
            Work::Split(lo, hi) => {
                let mid = lo + (hi - lo) / 2;
                // Left half is popped first, so its value lands below the right one.
                work.push(Work::Merge);
                work.push(Work::Split(mid, hi));
                work.push(Work::Split(lo, mid));
            }
            Work::Merge => {
                let right = values.pop().expect("merge without right operand");
                let left = values.pop().expect("merge without left operand");
                values.push(left.combine(right));
            }
        }
    }

    values.pop().expect("split tree produced no value")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recursive_split(a: u64, b: u64) -> Triple {
        if b - a == 1 {
            return Triple::term(a);
        }
        let m = (a + b) / 2;
        recursive_split(a, m).combine(recursive_split(m, b))
    }

    #[test]
    fn test_first_term() {
        let t = Triple::term(0);
        assert_eq!(t.p, BigInt::one());
        assert_eq!(t.q, BigInt::one());
        assert_eq!(t.t, BigInt::from(13_591_409));
    }

    #[test]
    fn test_odd_term_is_negative() {
        let t = Triple::term(1);
        // (6-5)(2-1)(6-1) = 5
        assert_eq!(t.p, BigInt::from(5));
        assert_eq!(t.q, BigInt::from(C3_OVER_24));
        assert_eq!(t.t, BigInt::from(-5 * (13_591_409i64 + 545_140_134)));

        let t = Triple::term(2);
        assert!(t.t > BigInt::from(0));
    }

    #[test]
    fn test_c3_over_24() {
        assert_eq!(C3_OVER_24, 640_320u64.pow(3) / 24);
    }

    #[test]
    fn test_iterative_matches_recursive() {
        for b in 1..20 {
            assert_eq!(binary_split(0, b), recursive_split(0, b), "range [0, {b})");
        }
        assert_eq!(binary_split(3, 11), recursive_split(3, 11));
    }

    #[test]
    fn test_terms_for_digits() {
        assert_eq!(terms_for_digits(1), 2);
        assert_eq!(terms_for_digits(14), 2);
        assert_eq!(terms_for_digits(15), 3);
        assert_eq!(terms_for_digits(100), 9);
        assert_eq!(terms_for_digits(1_000_000), 70_515);
    }

    #[test]
    #[should_panic(expected = "empty term range")]
    fn test_empty_range_panics() {
        binary_split(5, 5);
    }
}
