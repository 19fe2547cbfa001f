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

use crate::LinAlgError;
use crate::intmat::IntMatrix;
use crate::rational::Rational;

/// A dense matrix of [`Rational`] with C layout.
///
/// All arithmetic on it is exact; the determinant and the solver never
/// leave the rationals, so "almost singular" does not exist here.  A
/// matrix is singular or it is not.
// please resist the urge to go n-dimensional
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RationalMatrix {
    // c-contiguous, row-contiguous data
    v: Vec<Rational>,
    // invariant: rows * cols == v.len(), both positive
    rows: usize,
    cols: usize,
}

impl RationalMatrix {
    /// A zero-filled `rows` x `cols` matrix.  Dimensions must be positive.
    pub fn new(rows: usize, cols: usize) -> RationalMatrix {
        assert!(rows > 0 && cols > 0, "empty matrix dimensions ({}x{})", rows, cols);
        RationalMatrix { v: vec![Rational::zero(); rows * cols], rows, cols }
    }

    /// The `n` x `n` identity.
    pub fn identity(n: usize) -> RationalMatrix {
        let mut m = RationalMatrix::new(n, n);
        for i in 0..n {
            m.set(i, i, Rational::one());
        }
        m
    }

    /// Promote an integer matrix; every entry gets denominator 1.
    pub fn from_int_matrix(im: &IntMatrix) -> RationalMatrix {
        let (rows, cols) = im.size();
        let mut m = RationalMatrix::new(rows, cols);
        for i in 0..rows {
            for j in 0..cols {
                m.set(i, j, Rational::from(i64::from(im.get(i, j))));
            }
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
    pub fn get(&self, i: usize, j: usize) -> Rational
    { self.v[j + self.cols * i] }

    #[inline]
    pub fn set(&mut self, i: usize, j: usize, value: Rational) {
        self.v[j + self.cols * i] = value;
    }

    #[inline]
    pub fn row(&self, i: usize) -> &[Rational]
    { &self.v[self.cols * i..self.cols * (i + 1)] }

    fn swap_rows(&mut self, a: usize, b: usize) {
        if a == b { return; }
        for j in 0..self.cols {
            self.v.swap(j + self.cols * a, j + self.cols * b);
        }
    }

    /// The minor: this matrix with row `di` and column `dj` deleted.
    fn minor(&self, di: usize, dj: usize) -> RationalMatrix {
        let mut n = RationalMatrix::new(self.rows - 1, self.cols - 1);
        for i in 0..n.rows {
            for j in 0..n.cols {
                let gi = if i >= di { i + 1 } else { i };
                let gj = if j >= dj { j + 1 } else { j };
                n.set(i, j, self.get(gi, gj));
            }
        }
        n
    }

    fn cofactor(&self, i: usize, j: usize) -> Rational {
        let sign = match (i + j) % 2 {
            0 => Rational::one(),
            _ => Rational::from(-1),
        };
        sign * self.minor(i, j).det()
    }

    /// The exact determinant, by Laplace expansion along row 0.
    ///
    /// Cofactor expansion needs no division at all, which is exactly why
    /// it is used here instead of an LU-style determinant: there is no
    /// "divide by pivot" step to go wrong on an exactly-zero pivot.  The
    /// cost is exponential in the dimension, which is fine for the 3x3
    /// basis transforms this crate exists for.
    ///
    /// Panics if the matrix is not square (caller precondition).
    pub fn det(&self) -> Rational {
        assert!(self.is_square(), "determinant of a {}x{} matrix", self.rows, self.cols);

        match self.rows {
            1 => self.get(0, 0),
            2 => {
                self.get(0, 0) * self.get(1, 1) - self.get(0, 1) * self.get(1, 0)
            }
            _ => {
                let mut det = Rational::zero();
                for j in 0..self.cols {
                    det = det + self.get(0, j) * self.cofactor(0, j);
                }
                det
            }
        }
    }

    /// Solve `self * x = rhs` exactly, by Gaussian elimination with
    /// partial pivoting and back-substitution.  The inputs are not
    /// mutated; elimination runs on working copies.
    ///
    /// Pivot choice cannot affect *correctness* in exact arithmetic; the
    /// largest-magnitude pivot is taken to keep intermediate numerators
    /// and denominators small, which is what keeps the overflow guard
    /// quiet.
    ///
    /// Errors with [`LinAlgError::NotSquare`] for a non-square matrix and
    /// [`LinAlgError::Singular`] when back-substitution meets a zero
    /// diagonal entry.
    ///
    /// Panics if `rhs.len() != self.rows()`.
    pub fn solve(&self, rhs: &[Rational]) -> Result<Vec<Rational>, LinAlgError> {
        if !self.is_square() {
            return Err(LinAlgError::NotSquare { rows: self.rows, cols: self.cols });
        }
        assert_eq!(rhs.len(), self.rows, "right-hand side length mismatch");

        let mut m = self.clone();
        let mut vec = rhs.to_vec();

        let (mut h, mut k) = (0, 0);
        while h < m.rows && k < m.cols {
            // find the row with the largest value in column k
            let mut prow = h;
            let mut pval = Rational::zero();
            for i in h..m.rows {
                let a = m.get(i, k).abs();
                if a > pval {
                    pval = a;
                    prow = i;
                }
            }

            // an all-zero tail in this column: nothing to eliminate,
            // move to the next column without consuming a pivot row
            if pval.is_zero() {
                k += 1;
                continue;
            }

            m.swap_rows(h, prow);
            vec.swap(h, prow);

            for i in h + 1..m.rows {
                let d = m.get(i, k) / m.get(h, k);
                for j in 0..m.cols {
                    let t = m.get(i, j) - d * m.get(h, j);
                    m.set(i, j, t);
                }
                vec[i] = vec[i] - d * vec[h];
            }

            h += 1;
            k += 1;
        }

        // back-substitution
        let mut ans = vec![Rational::zero(); m.cols];
        for i in (0..m.rows).rev() {
            let mut sum = Rational::zero();
            for j in i + 1..m.cols {
                sum = sum + m.get(i, j) * ans[j];
            }
            let pivot = m.get(i, i);
            if pivot.is_zero() {
                return Err(LinAlgError::Singular);
            }
            ans[i] = (vec[i] - sum) / pivot;
        }

        Ok(ans)
    }

    /// Write the matrix to stderr, one `[ v1 v2 ... ]` line per row.
    pub fn print(&self) {
        eprint!("{}", self);
    }

    /// Dense matrix-vector product.  Panics if `vec.len() != self.cols()`.
    pub fn mult_vec(&self, vec: &[Rational]) -> Vec<Rational> {
        assert_eq!(vec.len(), self.cols, "vector length mismatch");
        (0..self.rows)
            .map(|i| {
                (0..self.cols)
                    .fold(Rational::zero(), |acc, j| acc + self.get(i, j) * vec[j])
            })
            .collect()
    }
}

impl Index<(usize, usize)> for RationalMatrix {
    type Output = Rational;

    #[inline]
    fn index(&self, (i, j): (usize, usize)) -> &Rational
    { &self.v[j + self.cols * i] }
}

impl IndexMut<(usize, usize)> for RationalMatrix {
    #[inline]
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut Rational
    { &mut self.v[j + self.cols * i] }
}

/// One `[ v1 v2 ... ]` line per row, entries right-aligned to at least
/// four columns.
impl fmt::Display for RationalMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in 0..self.rows {
            writeln!(
                f,
                "[ {} ]",
                self.row(i)
                    .iter()
                    .format_with(" ", |x, f| f(&format_args!("{:>4}", x.to_string()))),
            )?;
        }
        Ok(())
    }
}

#[cfg(feature = "serde")]
mod serde_impls {
    use super::*;
    use serde::{ser, de};

    // (rows, cols, row-major elements) on the wire, mirroring the pair
    // encoding of Rational; deserialization re-validates the shape
    // invariant so hand-written data cannot produce a ragged matrix.
    impl ser::Serialize for RationalMatrix {
        fn serialize<S: ser::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            ser::Serialize::serialize(&(self.rows, self.cols, &self.v), serializer)
        }
    }

    impl<'de> de::Deserialize<'de> for RationalMatrix {
        fn deserialize<D: de::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            let (rows, cols, v): (usize, usize, Vec<Rational>) =
                de::Deserialize::deserialize(deserializer)?;
            if rows == 0 || cols == 0 || rows.checked_mul(cols) != Some(v.len()) {
                return Err(de::Error::custom(format_args!(
                    "bad matrix shape: {}x{} with {} elements", rows, cols, v.len(),
                )));
            }
            Ok(RationalMatrix { v, rows, cols })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(num: i64, den: i64) -> Rational
    { Rational::new(num, den) }

    fn from_rows(rows: &[&[Rational]]) -> RationalMatrix {
        let mut m = RationalMatrix::new(rows.len(), rows[0].len());
        for (i, row) in rows.iter().enumerate() {
            for (j, &x) in row.iter().enumerate() {
                m.set(i, j, x);
            }
        }
        m
    }

    fn ints(rows: &[&[i64]]) -> RationalMatrix {
        let mut m = RationalMatrix::new(rows.len(), rows[0].len());
        for (i, row) in rows.iter().enumerate() {
            for (j, &x) in row.iter().enumerate() {
                m.set(i, j, Rational::from(x));
            }
        }
        m
    }

    #[test]
    fn new_is_zero_filled() {
        let m = RationalMatrix::new(2, 3);
        assert_eq!(m.size(), (2, 3));
        for i in 0..2 {
            for j in 0..3 {
                assert!(m.get(i, j).is_zero());
            }
        }
    }

    #[test]
    #[should_panic(expected = "empty matrix")]
    fn zero_dimension() {
        let _ = RationalMatrix::new(0, 3);
    }

    #[test]
    fn index_sugar() {
        let mut m = RationalMatrix::new(2, 2);
        m[(0, 1)] = r(1, 2);
        assert_eq!(m.get(0, 1), r(1, 2));
        assert_eq!(m[(0, 1)], r(1, 2));
    }

    #[test]
    fn clone_is_deep() {
        let mut m = RationalMatrix::identity(2);
        let n = m.clone();
        m.set(0, 0, r(5, 1));
        assert_eq!(n.get(0, 0), Rational::one());
        assert_eq!(m.get(0, 0), r(5, 1));
    }

    #[test]
    fn conversion_from_int_matrix() {
        let mut im = IntMatrix::new(2, 3);
        let mut x = 0;
        for i in 0..2 {
            for j in 0..3 {
                im.set(i, j, x - 3);
                x += 1;
            }
        }
        let m = RationalMatrix::from_int_matrix(&im);
        assert_eq!(m.size(), (2, 3));
        for i in 0..2 {
            for j in 0..3 {
                assert_eq!(m.get(i, j), Rational::from(i64::from(im.get(i, j))));
            }
        }
    }

    #[test]
    fn det_2x2() {
        // [[a, b], [c, d]] -> ad - bc, exactly
        let m = from_rows(&[
            &[r(1, 2), r(1, 3)],
            &[r(1, 4), r(1, 5)],
        ]);
        assert_eq!(m.det(), r(1, 10) - r(1, 12));
        assert_eq!(m.det(), r(1, 60));
    }

    #[test]
    fn det_3x3_unimodular() {
        // elementary shear: determinant +1
        let mut im = IntMatrix::identity(3);
        im.set(0, 1, 1);
        let m = RationalMatrix::from_int_matrix(&im);
        assert_eq!(m.det(), Rational::one());
    }

    #[test]
    fn det_3x3_known() {
        let m = ints(&[
            &[2, 0, 0],
            &[0, 3, 0],
            &[0, 0, 4],
        ]);
        assert_eq!(m.det(), Rational::from(24));

        let m = ints(&[
            &[1, 2, 3],
            &[4, 5, 6],
            &[7, 8, 9],
        ]);
        assert!(m.det().is_zero());
    }

    #[test]
    fn det_4x4_recurses() {
        let mut m = RationalMatrix::identity(4);
        m.set(1, 1, r(1, 2));
        m.set(2, 2, r(3, 1));
        assert_eq!(m.det(), r(3, 2));
    }

    #[test]
    fn det_1x1() {
        let mut m = RationalMatrix::new(1, 1);
        m.set(0, 0, r(7, 3));
        assert_eq!(m.det(), r(7, 3));
    }

    #[test]
    #[should_panic(expected = "determinant")]
    fn det_non_square() {
        let _ = RationalMatrix::new(2, 3).det();
    }

    #[test]
    fn solve_identity() {
        let m = RationalMatrix::identity(3);
        let b = [r(1, 2), r(-3, 4), r(5, 1)];
        assert_eq!(m.solve(&b).unwrap(), b.to_vec());
    }

    #[test]
    fn solve_exact_3x3() {
        // needs a row swap (zero leading entry) and fractional elimination
        let m = from_rows(&[
            &[Rational::zero(), r(1, 1), r(1, 2)],
            &[r(2, 1), r(1, 1), r(1, 1)],
            &[r(1, 1), r(-1, 1), r(1, 3)],
        ]);
        // chosen solution x = (1, -2, 3)
        let x = [r(1, 1), r(-2, 1), r(3, 1)];
        let b = m.mult_vec(&x);
        assert_eq!(m.solve(&b).unwrap(), x.to_vec());
    }

    #[test]
    fn solve_exact_is_bit_exact() {
        // 1/3-flavored entries would accumulate error in floating point;
        // here the recovered solution must compare equal outright
        let m = from_rows(&[
            &[r(1, 3), r(1, 7)],
            &[r(1, 2), r(-2, 5)],
        ]);
        let x = [r(22, 7), r(-5, 13)];
        let b = m.mult_vec(&x);
        assert_eq!(m.solve(&b).unwrap(), x.to_vec());
    }

    #[test]
    fn solve_singular() {
        let m = ints(&[
            &[1, 2],
            &[2, 4],
        ]);
        // consistent rhs: (1, 2) is in the column space
        let b = [Rational::one(), Rational::from(2)];
        assert_eq!(m.solve(&b), Err(LinAlgError::Singular));
    }

    #[test]
    fn solve_non_square() {
        let m = RationalMatrix::new(2, 3);
        let b = [Rational::zero(), Rational::zero()];
        assert_eq!(m.solve(&b), Err(LinAlgError::NotSquare { rows: 2, cols: 3 }));
    }

    #[test]
    fn solve_does_not_mutate_inputs() {
        let m = ints(&[
            &[1, 2],
            &[3, 4],
        ]);
        let b = [Rational::one(), Rational::one()];
        let before = m.clone();
        let _ = m.solve(&b).unwrap();
        assert_eq!(m, before);
        assert_eq!(b, [Rational::one(), Rational::one()]);
    }

    #[test]
    fn mult_vec_basic() {
        let m = ints(&[
            &[1, 2],
            &[3, 4],
        ]);
        let v = [r(1, 2), r(1, 4)];
        assert_eq!(m.mult_vec(&v), vec![r(1, 1), r(5, 2)]);
    }

    #[test]
    fn display_rows() {
        let mut m = RationalMatrix::identity(2);
        m.set(0, 1, r(1, 2));
        assert_eq!(m.to_string(), "[    1  1/2 ]\n[    0    1 ]\n");
    }
}
