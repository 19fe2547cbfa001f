/* ************************************************************************ **
** This file is part of xtal-rational, and is licensed under EITHER the     **
** MIT license or the Apache 2.0 license, at your option.                   **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

//! Exact rational arithmetic for unit-cell transformation search.
//!
//! Searching for an integer (or rational) basis transformation between two
//! lattices is an exact question; doing it in floating point produces
//! plausible-looking but wrong answers with no symptom.  This crate keeps
//! everything in fractions:
//!
//! * [`Rational`]: an `i64/i64` fraction in lowest terms.  Arithmetic that
//!   would overflow the representation is **fatal** (the process panics
//!   after reporting the operands) rather than silently wrapping.
//! * [`RationalMatrix`]: a dense matrix of `Rational` with an exact
//!   cofactor determinant and an exact Gaussian-elimination solver.
//! * [`IntMatrix`]: the plain-integer transform type (e.g. a centering or
//!   symmetry operator), convertible into a `RationalMatrix`.
//! * [`parse_transformation`]: turns an axis recipe like `"a-b,a+b,c/2"`
//!   into the corresponding 3x3 `RationalMatrix`.

#[macro_use] extern crate log;
#[macro_use] extern crate failure;
extern crate itertools;
extern crate num_integer;
#[cfg(feature = "serde")] extern crate serde;
#[cfg(test)] extern crate rand;
#[cfg(all(test, feature = "serde"))] extern crate serde_json;

/// Recoverable failures from the linear-algebra entry points.
///
/// Overflow is deliberately NOT here; it is fatal by contract (see the
/// [`Rational`] docs).
#[derive(Debug, Fail, Clone, PartialEq, Eq)]
pub enum LinAlgError {
    #[fail(display = "matrix is not square ({}x{})", rows, cols)]
    NotSquare { rows: usize, cols: usize },

    #[fail(display = "matrix is singular")]
    Singular,
}

mod rational;
mod matrix;
mod intmat;
mod parse;

pub use crate::rational::{Rational, ParseRationalError};
pub use crate::matrix::RationalMatrix;
pub use crate::intmat::IntMatrix;
pub use crate::parse::{parse_transformation, ParseTransformError};
