/* ************************************************************************ **
** This file is part of xtal-rational, and is licensed under EITHER the     **
** MIT license or the Apache 2.0 license, at your option.                   **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

use ::std::fmt;
use ::std::ops::{Index, IndexMut};

use ::itertools::Itertools;

/// A dense matrix of plain integers, for basis transforms that are genuinely
/// integral: centering operations, symmetry operators, supercell choices.
///
/// A transform taken from here is trusted as lattice-preserving only when
/// `det().abs() == 1` (unimodular); callers gate on that before use.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IntMatrix {
    v: Vec<i32>,
    rows: usize,
    cols: usize,
}

impl IntMatrix {
    /// A zero-filled `rows` x `cols` matrix.  Dimensions must be positive.
    pub fn new(rows: usize, cols: usize) -> IntMatrix {
        assert!(rows > 0 && cols > 0, "empty matrix dimensions ({}x{})", rows, cols);
        IntMatrix { v: vec![0; rows * cols], rows, cols }
    }

    /// The `n` x `n` identity.
    pub fn identity(n: usize) -> IntMatrix {
        let mut m = IntMatrix::new(n, n);
        for i in 0..n {
            m.set(i, i, 1);
        }
        m
    }

    #[inline]
    pub fn rows(&self) -> usize
    { self.rows }

    #[inline]
    pub fn cols(&self) -> usize
    { self.cols }

    #[inline]
    pub fn size(&self) -> (usize, usize)
    { (self.rows, self.cols) }

    #[inline]
    pub fn is_square(&self) -> bool
    { self.rows == self.cols }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> i32
    { self.v[j + self.cols * i] }

    #[inline]
    pub fn set(&mut self, i: usize, j: usize, value: i32) {
        self.v[j + self.cols * i] = value;
    }

    pub fn is_identity(&self) -> bool {
        self.is_square()
            && (0..self.rows).all(|i| {
                (0..self.cols).all(|j| self.get(i, j) == if i == j { 1 } else { 0 })
            })
    }

    /// Write the matrix to stderr, one `[ v1 v2 ... ]` line per row.
    pub fn print(&self) {
        eprint!("{}", self);
    }

    fn minor(&self, di: usize, dj: usize) -> IntMatrix {
        let mut n = IntMatrix::new(self.rows - 1, self.cols - 1);
        for i in 0..n.rows {
            for j in 0..n.cols {
                let gi = if i >= di { i + 1 } else { i };
                let gj = if j >= dj { j + 1 } else { j };
                n.set(i, j, self.get(gi, gj));
            }
        }
        n
    }

    /// Determinant by cofactor expansion, in `i64` so that no plausible
    /// transform entry can overflow the accumulation.
    ///
    /// Panics if the matrix is not square (caller precondition).
    pub fn det(&self) -> i64 {
        assert!(self.is_square(), "determinant of a {}x{} matrix", self.rows, self.cols);

        match self.rows {
            1 => i64::from(self.get(0, 0)),
            2 => {
                i64::from(self.get(0, 0)) * i64::from(self.get(1, 1))
                    - i64::from(self.get(0, 1)) * i64::from(self.get(1, 0))
            }
            _ => {
                (0..self.cols)
                    .map(|j| {
                        let sign = if j % 2 == 1 { -1 } else { 1 };
                        sign * i64::from(self.get(0, j)) * self.minor(0, j).det()
                    })
                    .sum()
            }
        }
    }
}

impl Index<(usize, usize)> for IntMatrix {
    type Output = i32;

    #[inline]
    fn index(&self, (i, j): (usize, usize)) -> &i32
    { &self.v[j + self.cols * i] }
}

impl IndexMut<(usize, usize)> for IntMatrix {
    #[inline]
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut i32
    { &mut self.v[j + self.cols * i] }
}

impl fmt::Display for IntMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in 0..self.rows {
            let row = &self.v[self.cols * i..self.cols * (i + 1)];
            writeln!(
                f,
                "[ {} ]",
                row.iter().format_with(" ", |x, f| f(&format_args!("{:>4}", x))),
            )?;
        }
        Ok(())
    }
}

#[cfg(feature = "serde")]
mod serde_impls {
    use super::*;
    use serde::{ser, de};

    // same (rows, cols, elements) encoding as RationalMatrix
    impl ser::Serialize for IntMatrix {
        fn serialize<S: ser::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            ser::Serialize::serialize(&(self.rows, self.cols, &self.v), serializer)
        }
    }

    impl<'de> de::Deserialize<'de> for IntMatrix {
        fn deserialize<D: de::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            let (rows, cols, v): (usize, usize, Vec<i32>) =
                de::Deserialize::deserialize(deserializer)?;
            if rows == 0 || cols == 0 || rows.checked_mul(cols) != Some(v.len()) {
                return Err(de::Error::custom(format_args!(
                    "bad matrix shape: {}x{} with {} elements", rows, cols, v.len(),
                )));
            }
            Ok(IntMatrix { v, rows, cols })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_rows(rows: &[&[i32]]) -> IntMatrix {
        let mut m = IntMatrix::new(rows.len(), rows[0].len());
        for (i, row) in rows.iter().enumerate() {
            for (j, &x) in row.iter().enumerate() {
                m.set(i, j, x);
            }
        }
        m
    }

    #[test]
    fn identity_properties() {
        let m = IntMatrix::identity(3);
        assert!(m.is_identity());
        assert_eq!(m.det(), 1);

        let mut n = m.clone();
        n.set(0, 1, 1);
        assert!(!n.is_identity());
        // a shear is still unimodular
        assert_eq!(n.det(), 1);
    }

    #[test]
    fn permutation_is_unimodular() {
        // cyclic axis permutation a,b,c -> b,c,a
        let m = from_rows(&[
            &[0, 1, 0],
            &[0, 0, 1],
            &[1, 0, 0],
        ]);
        assert_eq!(m.det(), 1);

        // a single swap flips orientation
        let m = from_rows(&[
            &[0, 1, 0],
            &[1, 0, 0],
            &[0, 0, 1],
        ]);
        assert_eq!(m.det(), -1);
    }

    #[test]
    fn det_general() {
        let m = from_rows(&[
            &[2, 0, 1],
            &[1, 3, 0],
            &[0, 1, 4],
        ]);
        // 2*(12-0) - 0*(4-0) + 1*(1-0)
        assert_eq!(m.det(), 25);
    }

    #[test]
    fn index_sugar() {
        let mut m = IntMatrix::new(2, 2);
        m[(1, 0)] = -3;
        assert_eq!(m.get(1, 0), -3);
        assert_eq!(m[(1, 0)], -3);
    }

    #[test]
    fn display_rows() {
        let m = from_rows(&[
            &[1, -2],
            &[0, 12],
        ]);
        assert_eq!(m.to_string(), "[    1   -2 ]\n[    0   12 ]\n");
    }
}
