/* ************************************************************************ **
** This file is part of xtal-rational, and is licensed under EITHER the     **
** MIT license or the Apache 2.0 license, at your option.                   **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

//! Axis-recipe parsing.
//!
//! A cell transformation is written the way crystallographers write it:
//! three comma-separated expressions giving the new axes in terms of the
//! old ones, e.g. `"a,b,c"` (identity), `"a-b,a+b,c"` (45-degree cell),
//! `"a,b,c/2"` (halved c axis), `"1/2a+1/2b,b,c"`.  Each term is an
//! optional rational coefficient followed by an axis letter, optionally
//! followed by a `/n` divisor.

use ::std::iter::Peekable;
use ::std::str::Chars;

use ::failure::Backtrace;

use crate::matrix::RationalMatrix;
use crate::rational::Rational;

#[derive(Debug, Fail)]
#[fail(display = "Invalid cell transformation {:?}: {}", text, reason)]
pub struct ParseTransformError {
    text: String,
    reason: &'static str,
    backtrace: Backtrace,
}

impl ParseTransformError {
    fn new(text: &str, reason: &'static str) -> Self
    { ParseTransformError {
        text: text.to_string(),
        reason,
        backtrace: Backtrace::new(),
    }}
}

/// Parse an axis recipe into the 3x3 transformation matrix whose row `i`
/// holds the coefficients of the i-th new axis in the old `a,b,c` basis.
pub fn parse_transformation(text: &str) -> Result<RationalMatrix, ParseTransformError> {
    let fail = |reason| ParseTransformError::new(text, reason);

    let components: Vec<&str> = text.split(',').collect();
    if components.len() != 3 {
        return Err(fail("expected three comma-separated axis expressions"));
    }

    let mut m = RationalMatrix::new(3, 3);
    for (i, component) in components.iter().enumerate() {
        let stripped: String = component.chars().filter(|c| !c.is_whitespace()).collect();
        let row = parse_component(&stripped).map_err(fail)?;
        for (j, &coeff) in row.iter().enumerate() {
            m.set(i, j, coeff);
        }
    }
    Ok(m)
}

/// One expression, e.g. `-a+1/2b` or `c/2`.  Whitespace already stripped.
fn parse_component(text: &str) -> Result<[Rational; 3], &'static str> {
    let mut row = [Rational::zero(); 3];
    let mut chars = text.chars().peekable();

    if chars.peek().is_none() {
        return Err("empty axis expression");
    }

    while chars.peek().is_some() {
        let mut sign = 1i64;
        while let Some(&c) = chars.peek() {
            match c {
                '+' => { chars.next(); }
                '-' => { sign = -sign; chars.next(); }
                _ => break,
            }
        }
        if chars.peek().is_none() {
            return Err("dangling sign");
        }

        // optional leading coefficient: "2", "1/2", "3/4"
        let mut num = 1;
        let mut den = 1;
        if let Some(n) = take_integer(&mut chars)? {
            num = n;
            if chars.peek() == Some(&'/') {
                // "1/2b" has the divisor before the letter; "b/2" is
                // handled after the letter below
                let mut lookahead = chars.clone();
                lookahead.next();
                if let Some(d) = take_integer(&mut lookahead)? {
                    if d == 0 {
                        return Err("zero divisor");
                    }
                    den = d;
                    chars = lookahead;
                }
            }
        }

        let axis = match chars.next() {
            Some('a') => 0,
            Some('b') => 1,
            Some('c') => 2,
            _ => return Err("expected an axis letter a, b or c"),
        };

        // optional trailing divisor: "c/2"
        if chars.peek() == Some(&'/') {
            chars.next();
            match take_integer(&mut chars)? {
                Some(0) => return Err("zero divisor"),
                Some(d) => den *= d,
                None => return Err("missing divisor after '/'"),
            }
        }

        row[axis] = row[axis] + Rational::new(sign * num, den);
    }

    Ok(row)
}

fn take_integer(chars: &mut Peekable<Chars<'_>>) -> Result<Option<i64>, &'static str> {
    let mut value: Option<i64> = None;
    while let Some(&c) = chars.peek() {
        match c.to_digit(10) {
            Some(d) => {
                let shifted = value
                    .unwrap_or(0)
                    .checked_mul(10)
                    .and_then(|v| v.checked_add(i64::from(d)))
                    .ok_or("coefficient out of range")?;
                value = Some(shifted);
                chars.next();
            }
            None => break,
        }
    }
    Ok(value)
}
