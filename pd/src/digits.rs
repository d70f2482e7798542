//! Decimal digit extraction from the series triple

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::Pow;
use tracing::{debug, info, warn};

use crate::error::{CorpusError, Result};
use crate::series::{binary_split, terms_for_digits};

/// 426880 = 640320^(3/2) / 12 / sqrt(10005)
const CHUDNOVSKY_C: u64 = 426_880;

/// Radicand of the series constant
const SQRT_RADICAND: u64 = 10_005;

/// Integer part and fractional digits of pi
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PiDigits {
    /// Digits before the decimal point; "3" unless precision was lost
    pub integer: String,
    /// Exactly the requested number of fractional digits
    pub fractional: String,
}

impl PiDigits {
    /// Whether the integer part came out as "3"
    ///
    /// Anything else means the guard digits were too few to absorb rounding.
    pub fn integer_part_ok(&self) -> bool {
        self.integer == "3"
    }
}

/// Compute `digits` fractional digits of pi carrying `guard` extra digits
pub fn compute_pi_digits(digits: u64, guard: u32) -> Result<PiDigits> {
    if digits == 0 {
        return Err(CorpusError::Config("digits must be positive".to_string()));
    }

    let terms = terms_for_digits(digits);
    info!(digits, guard, terms, "Evaluating series");
    let triple = binary_split(0, terms);

    let result = extract_digits(digits, guard, &triple.q, &triple.t)?;
    if !result.integer_part_ok() {
        warn!(
            integer = %result.integer,
            guard,
            "Unexpected integer part; guard digits may be too small"
        );
    }
    Ok(result)
}

/// Turn `(Q, T)` into `digits` fractional digits
pub fn extract_digits(digits: u64, guard: u32, q: &BigInt, t: &BigInt) -> Result<PiDigits> {
    let needed = usize::try_from(digits)
        .ok()
        .and_then(|d| d.checked_add(1))
        .ok_or_else(|| CorpusError::Config(format!("digit count {} exceeds addressable memory", digits)))?;

    let scale: BigInt = Pow::pow(BigInt::from(10u8), digits + u64::from(guard));
    let sqrt_c = (BigInt::from(SQRT_RADICAND) * &scale * &scale).sqrt();
    let pi_scaled = (BigInt::from(CHUDNOVSKY_C) * sqrt_c * q).div_floor(t);

    let mut s = pi_scaled.to_string();
    s.truncate(s.len().saturating_sub(guard as usize));
    if s.len() < needed {
        s = format!("{}{}", "0".repeat(needed - s.len()), s);
    }
    s.truncate(needed);
    debug!(len = s.len(), "extract_digits: rendered");

    let fractional = s.split_off(1);
    Ok(PiDigits { integer: s, fractional })
}

#[cfg(test)]
mod tests {
    use super::*;

    const PI_100: &str = "1415926535897932384626433832795028841971693993751058209749445923078164062862089986280348253421170679";

    #[test]
    fn test_first_hundred_digits() {
        let pi = compute_pi_digits(100, 10).unwrap();
        assert_eq!(pi.integer, "3");
        assert_eq!(pi.fractional, PI_100);
        assert!(pi.integer_part_ok());
    }

    #[test]
    fn test_fractional_length_is_exact() {
        for digits in 1..=40 {
            for guard in [0, 1, 10] {
                let pi = compute_pi_digits(digits, guard).unwrap();
                assert_eq!(pi.fractional.len() as u64, digits, "digits={digits} guard={guard}");
                assert_eq!(pi.integer.len(), 1);
            }
        }
    }

    #[test]
    fn test_prefixes_agree() {
        for digits in [1u64, 7, 15, 33, 64] {
            let pi = compute_pi_digits(digits, 10).unwrap();
            assert_eq!(pi.fractional, &PI_100[..digits as usize]);
        }
    }

    #[test]
    fn test_zero_digits_rejected() {
        let err = compute_pi_digits(0, 10).unwrap_err();
        assert!(matches!(err, CorpusError::Config(_)));
    }

    #[test]
    fn test_short_render_is_left_padded() {
        // q/t tiny: the scaled value has fewer digits than requested
        let pi = extract_digits(5, 0, &BigInt::from(1), &BigInt::from(1_000_000_000u64)).unwrap();
        assert_eq!(pi.fractional.len(), 5);
        assert_eq!(pi.integer, "0");
        assert!(!pi.integer_part_ok());
    }

    #[test]
    fn test_guard_larger_than_render() {
        let t: BigInt = Pow::pow(BigInt::from(10u8), 60u32);
        let pi = extract_digits(3, 40, &BigInt::from(1), &t).unwrap();
        assert_eq!(pi.integer, "0");
        assert_eq!(pi.fractional, "000");
    }
}
