/* ************************************************************************ **
** This file is part of xtal-rational, and is licensed under EITHER the     **
** MIT license or the Apache 2.0 license, at your option.                   **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

use ::std::cmp::Ordering;
use ::std::fmt;
use ::std::ops::{Add, Div, Mul, Neg, Sub};
use ::std::str;

use ::failure::Backtrace;
use ::num_integer::Integer;

/// An exact fraction `num/den` over `i64`.
///
/// Invariants (canonical form):
///  - `gcd(|num|, den) == 1`
///  - `den > 0`
///  - zero is uniquely `0/1`
///
/// Every constructor and operator re-establishes canonical form, so two
/// `Rational`s are equal iff their representations are identical; the
/// derived `PartialEq`/`Hash` rely on this.
///
/// There is no widening.  A product that does not fit in `i64` is reported
/// (with both operands) and the process panics.  Fixed-width overflow here
/// means a lattice-relationship search would return a wrong answer with no
/// other symptom, so crashing loudly is the contract.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Rational {
    num: i64,
    den: i64,
}

/// The single canonicalization choke point.
fn reduced(num: i64, den: i64) -> Rational {
    if num == 0 {
        return Rational { num: 0, den: 1 };
    }

    let g = num.gcd(&den);
    debug_assert!(g != 0);
    let (mut num, mut den) = (num / g, den / g);
    if den < 0 {
        num = -num;
        den = -den;
    }
    Rational { num, den }
}

#[cold]
fn overflow(c: i64, a: i64, b: i64) -> ! {
    error!("Overflow detected in rational number library.");
    error!("{} < {} * {}", c, a, b);
    panic!("rational overflow: {} * {} wrapped to {}", a, b, c);
}

/// `a * b`, aborting on (detected) wraparound.
///
/// The detection is a magnitude heuristic: a nonzero-by-nonzero product
/// whose magnitude dropped below either operand has wrapped, and a product
/// involving zero must be exactly zero.  A wrap that still exceeds both
/// operands in magnitude slips through; callers keep their values small
/// enough that this does not arise in practice.
fn guarded_mul(a: i64, b: i64) -> i64 {
    let c = a.wrapping_mul(b);
    if a == 0 || b == 0 {
        if c != 0 {
            overflow(c, a, b);
        }
    } else if c.wrapping_abs() < a.wrapping_abs() || c.wrapping_abs() < b.wrapping_abs() {
        overflow(c, a, b);
    }
    c
}

impl Rational {
    /// The canonical zero, `0/1`.
    #[inline]
    pub fn zero() -> Rational
    { Rational { num: 0, den: 1 } }

    #[inline]
    pub fn one() -> Rational
    { Rational { num: 1, den: 1 } }

    /// Construct `num/den`, reduced to canonical form.
    ///
    /// A zero denominator with a nonzero numerator is a precondition
    /// violation and panics.  (`new(0, 0)` is accepted and is zero,
    /// matching the canonical-zero rule.)
    pub fn new(num: i64, den: i64) -> Rational {
        assert!(num == 0 || den != 0, "rational with zero denominator");
        reduced(num, den)
    }

    #[inline]
    pub fn num(&self) -> i64
    { self.num }

    #[inline]
    pub fn den(&self) -> i64
    { self.den }

    #[inline]
    pub fn is_zero(&self) -> bool
    { self.num == 0 }

    #[inline]
    pub fn is_integer(&self) -> bool
    { self.den == 1 }

    /// Lossy conversion for display and estimation only.  Exact questions
    /// go through `Ord`/`PartialEq`.
    #[inline]
    pub fn to_f64(&self) -> f64
    { self.num as f64 / self.den as f64 }

    pub fn abs(self) -> Rational {
        // canonical form puts the sign on the numerator
        Rational { num: self.num.abs(), den: self.den }
    }

    /// The reciprocal.  Panics on zero.
    pub fn recip(self) -> Rational {
        assert!(self.num != 0, "reciprocal of zero rational");
        reduced(self.den, self.num)
    }
}

impl Default for Rational {
    #[inline]
    fn default() -> Rational
    { Rational::zero() }
}

impl From<i64> for Rational {
    #[inline]
    fn from(n: i64) -> Rational
    { Rational { num: n, den: 1 } }
}

impl Mul for Rational {
    type Output = Rational;

    fn mul(self, b: Rational) -> Rational {
        let num = guarded_mul(self.num, b.num);
        let den = guarded_mul(self.den, b.den);
        reduced(num, den)
    }
}

impl Div for Rational {
    type Output = Rational;

    fn div(self, b: Rational) -> Rational
    { self * b.recip() }
}

impl Add for Rational {
    type Output = Rational;

    fn add(self, b: Rational) -> Rational {
        let n1 = guarded_mul(self.num, b.den);
        let n2 = guarded_mul(b.num, self.den);
        let den = guarded_mul(self.den, b.den);
        // only the three products are guarded; their sum is not
        reduced(n1 + n2, den)
    }
}

impl Sub for Rational {
    type Output = Rational;

    fn sub(self, b: Rational) -> Rational
    { self + -b }
}

impl Neg for Rational {
    type Output = Rational;

    fn neg(self) -> Rational
    { Rational { num: -self.num, den: self.den } }
}

impl Ord for Rational {
    /// Three-way comparison by cross-multiplication.
    ///
    /// Deliberately NOT overflow-guarded, unlike the arithmetic operators.
    /// Comparisons are assumed to run on small canonical values (in this
    /// crate: pivot selection during elimination, where pivoting itself
    /// keeps magnitudes down).
    fn cmp(&self, b: &Rational) -> Ordering
    { (self.num * b.den).cmp(&(b.num * self.den)) }
}

impl PartialOrd for Rational {
    #[inline]
    fn partial_cmp(&self, b: &Rational) -> Option<Ordering>
    { Some(self.cmp(b)) }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.den {
            1 => write!(f, "{}", self.num),
            _ => write!(f, "{}/{}", self.num, self.den),
        }
    }
}

#[derive(Debug, Fail)]
#[fail(display = "Unable to parse rational: {:?}", text)]
pub struct ParseRationalError {
    text: String,
    backtrace: Backtrace,
}

impl ParseRationalError {
    fn new(s: &str) -> Self
    { ParseRationalError {
        text: s.to_string(),
        backtrace: Backtrace::new(),
    }}
}

impl str::FromStr for Rational {
    type Err = ParseRationalError;

    /// Accepts `"3"`, `"-3"`, and `"3/4"` forms.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse_int = |t: &str| t.trim().parse::<i64>().map_err(|_| ParseRationalError::new(s));
        match s.find('/') {
            None => Ok(Rational::from(parse_int(s)?)),
            Some(pos) => {
                let num = parse_int(&s[..pos])?;
                let den = parse_int(&s[pos + 1..])?;
                if den == 0 {
                    return Err(ParseRationalError::new(s));
                }
                Ok(Rational::new(num, den))
            }
        }
    }
}

#[cfg(feature = "serde")]
mod serde_impls {
    use super::*;
    use serde::{ser, de};

    // (num, den) pairs on the wire; deserialization re-canonicalizes so a
    // hand-written "2/4" comes back as "1/2".
    impl ser::Serialize for Rational {
        fn serialize<S: ser::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            ser::Serialize::serialize(&(self.num, self.den), serializer)
        }
    }

    impl<'de> de::Deserialize<'de> for Rational {
        fn deserialize<D: de::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            let (num, den): (i64, i64) = de::Deserialize::deserialize(deserializer)?;
            if num != 0 && den == 0 {
                return Err(de::Error::invalid_value(
                    de::Unexpected::Signed(den),
                    &"a nonzero denominator",
                ));
            }
            Ok(Rational::new(num, den))
        }
    }
}
