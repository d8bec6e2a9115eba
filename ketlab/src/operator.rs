// ketlab - state vectors, operators and measurement for small qubit systems
// Copyright (C) 2026 - The ketlab developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//    http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Unitary operators on `n` qubits, stored as dense `2^n × 2^n` matrices.

use approx::AbsDiffEq;
use itertools::Itertools;
use ndarray::linalg::kron;
use ndarray::prelude::*;
use num::complex::Complex64;
use num::{One, Zero};
use std::fmt;

use crate::error::{QError, Result};
use crate::limits::{num_qubits_for_dim, Limits, DEFAULT_TOLERANCE};
use crate::state::fmt_complex;

/// A unitary matrix acting on `n` qubits.
///
/// Row and column indices use the same basis ordering as
/// [StateVector](crate::state::StateVector): bit `k` of an index is qubit
/// `k`.
#[derive(Debug, Clone, PartialEq)]
pub struct Operator {
    mat: Array2<Complex64>,
    nqubits: usize,
}

/// True if `m` is square and `m† m` is the identity within `tolerance`.
pub fn is_unitary(m: &Array2<Complex64>, tolerance: f64) -> bool {
    if m.nrows() != m.ncols() {
        return false;
    }
    let prod = m.t().mapv(|c| c.conj()).dot(m);
    prod.indexed_iter().all(|((i, j), c)| {
        let target = if i == j { Complex64::one() } else { Complex64::zero() };
        (c - target).norm() <= tolerance
    })
}

impl Operator {
    /// Builds an operator from a literal matrix using the default [Limits].
    pub fn new(mat: Array2<Complex64>) -> Result<Operator> {
        Operator::new_with(mat, &Limits::default())
    }

    pub fn new_with(mat: Array2<Complex64>, limits: &Limits) -> Result<Operator> {
        let (rows, cols) = mat.dim();
        if rows != cols {
            return Err(QError::InvalidOperator(format!(
                "matrix is {rows}x{cols}, expected a square matrix"
            )));
        }
        let nqubits = num_qubits_for_dim(rows).ok_or_else(|| {
            QError::InvalidOperator(format!("dimension {rows} is not a power of two"))
        })?;
        limits.check_qubits(nqubits)?;
        if !is_unitary(&mat, limits.tolerance) {
            return Err(QError::InvalidOperator("matrix is not unitary".to_string()));
        }
        Ok(Operator { mat, nqubits })
    }

    /// Builds an operator from a list of rows.
    pub fn from_rows(rows: Vec<Vec<Complex64>>) -> Result<Operator> {
        let n = rows.len();
        if let Some(r) = rows.iter().find(|r| r.len() != n) {
            return Err(QError::InvalidOperator(format!(
                "row of length {} in a matrix with {} rows",
                r.len(),
                n
            )));
        }
        let flat: Vec<Complex64> = rows.into_iter().flatten().collect();
        let mat = Array2::from_shape_vec((n, n), flat)
            .map_err(|e| QError::InvalidOperator(e.to_string()))?;
        Operator::new(mat)
    }

    /// Builds an operator from real-valued rows.
    pub fn from_real_rows(rows: &[&[f64]]) -> Result<Operator> {
        Operator::from_rows(
            rows.iter()
                .map(|r| r.iter().map(|&x| Complex64::new(x, 0.0)).collect())
                .collect(),
        )
    }

    /// Wraps a matrix that is unitary by construction.
    pub(crate) fn from_array_unchecked(mat: Array2<Complex64>) -> Operator {
        let nqubits = mat.nrows().trailing_zeros() as usize;
        Operator { mat, nqubits }
    }

    pub fn identity(nqubits: usize) -> Result<Operator> {
        Limits::default().check_qubits(nqubits)?;
        Ok(Operator {
            mat: Array2::eye(1 << nqubits),
            nqubits,
        })
    }

    pub fn num_qubits(&self) -> usize {
        self.nqubits
    }

    /// Number of rows (and columns), `2^num_qubits`.
    pub fn dim(&self) -> usize {
        self.mat.nrows()
    }

    pub fn matrix(&self) -> &Array2<Complex64> {
        &self.mat
    }

    /// The conjugate transpose.
    pub fn adjoint(&self) -> Operator {
        Operator {
            mat: self.mat.t().mapv(|c| c.conj()),
            nqubits: self.nqubits,
        }
    }

    fn check_same_dim(&self, other: &Operator) -> Result<()> {
        if self.dim() != other.dim() {
            Err(QError::DimensionMismatch {
                expected: self.dim(),
                found: other.dim(),
            })
        } else {
            Ok(())
        }
    }

    /// Sequential composition: apply `self`, then `other`.
    ///
    /// The result is the matrix product `other · self`, so for gates applied
    /// in the order `g0, g1, g2` the combined operator is
    /// `g0.compose(&g1)?.compose(&g2)?`, i.e. `g2 · g1 · g0`.
    pub fn compose(&self, other: &Operator) -> Result<Operator> {
        other.dot(self)
    }

    /// The matrix product `self · other`: apply `other`, then `self`.
    pub fn dot(&self, other: &Operator) -> Result<Operator> {
        self.check_same_dim(other)?;
        Ok(Operator {
            mat: self.mat.dot(&other.mat),
            nqubits: self.nqubits,
        })
    }

    /// Kronecker product `self ⊗ other`, with `self` on the high qubits.
    ///
    /// Consistent with [StateVector::tensor](crate::state::StateVector::tensor):
    /// `(A ⊗ B)(u ⊗ v) = Au ⊗ Bv`.
    pub fn tensor(&self, other: &Operator) -> Result<Operator> {
        self.tensor_with(other, &Limits::default())
    }

    pub fn tensor_with(&self, other: &Operator, limits: &Limits) -> Result<Operator> {
        let nqubits = self.nqubits + other.nqubits;
        limits.check_qubits(nqubits)?;
        Ok(Operator {
            mat: kron(&self.mat, &other.mat),
            nqubits,
        })
    }

    /// True if the operators agree up to a global phase.
    pub fn equiv(&self, other: &Operator) -> bool {
        if self.dim() != other.dim() {
            return false;
        }
        // rescale by the ratio of the first entries that are nonzero in self
        let Some((idx, a)) = self.mat.indexed_iter().find(|(_, c)| c.norm() > DEFAULT_TOLERANCE)
        else {
            return false;
        };
        let phase = other.mat[idx] / a;
        if (phase.norm() - 1.0).abs() > DEFAULT_TOLERANCE {
            return false;
        }
        self.mat
            .iter()
            .zip(other.mat.iter())
            .all(|(x, y)| (x * phase - y).norm() <= DEFAULT_TOLERANCE)
    }
}

impl AbsDiffEq for Operator {
    type Epsilon = f64;

    fn default_epsilon() -> Self::Epsilon {
        DEFAULT_TOLERANCE
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        self.dim() == other.dim()
            && self.mat.iter().zip(other.mat.iter()).all(|(a, b)| {
                f64::abs_diff_eq(&a.re, &b.re, epsilon) && f64::abs_diff_eq(&a.im, &b.im, epsilon)
            })
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.mat.rows() {
            writeln!(f, "[ {} ]", row.iter().map(fmt_complex).join(", "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::StateVector;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::FRAC_1_SQRT_2;

    fn c(re: f64, im: f64) -> Complex64 {
        Complex64::new(re, im)
    }

    fn x() -> Operator {
        Operator::from_real_rows(&[&[0.0, 1.0], &[1.0, 0.0]]).unwrap()
    }

    fn h() -> Operator {
        let s = FRAC_1_SQRT_2;
        Operator::from_real_rows(&[&[s, s], &[s, -s]]).unwrap()
    }

    fn s_gate() -> Operator {
        Operator::from_rows(vec![vec![c(1.0, 0.0), c(0.0, 0.0)], vec![c(0.0, 0.0), c(0.0, 1.0)]])
            .unwrap()
    }

    #[test]
    fn literal_operators() {
        let y = Operator::from_rows(vec![
            vec![c(0.0, 0.0), c(0.0, -1.0)],
            vec![c(0.0, 1.0), c(0.0, 0.0)],
        ])
        .unwrap();
        assert_eq!(y.num_qubits(), 1);
        let t = Operator::from_rows(vec![
            vec![c(1.0, 0.0), c(0.0, 0.0)],
            vec![c(0.0, 0.0), c(FRAC_1_SQRT_2, FRAC_1_SQRT_2)],
        ])
        .unwrap();
        assert_abs_diff_eq!(t.dot(&t).unwrap(), s_gate(), epsilon = 1e-12);
        let cnot = Operator::from_real_rows(&[
            &[1.0, 0.0, 0.0, 0.0],
            &[0.0, 1.0, 0.0, 0.0],
            &[0.0, 0.0, 0.0, 1.0],
            &[0.0, 0.0, 1.0, 0.0],
        ])
        .unwrap();
        assert_eq!(cnot.num_qubits(), 2);
    }

    #[test]
    fn non_unitary() {
        let r = Operator::from_real_rows(&[&[1.0, 1.0], &[0.0, 1.0]]);
        assert!(matches!(r, Err(QError::InvalidOperator(_))));
    }

    #[test]
    fn malformed() {
        let r = Operator::from_real_rows(&[&[1.0, 0.0], &[0.0]]);
        assert!(matches!(r, Err(QError::InvalidOperator(_))));
        let r = Operator::new(Array2::eye(3));
        assert!(matches!(r, Err(QError::InvalidOperator(_))));
        let r = Operator::new(Array2::zeros((2, 4)));
        assert!(matches!(r, Err(QError::InvalidOperator(_))));
    }

    #[test]
    fn adjoint_inverts() {
        let s = s_gate();
        let id = Operator::identity(1).unwrap();
        assert_abs_diff_eq!(s.dot(&s.adjoint()).unwrap(), id, epsilon = 1e-12);
        assert_abs_diff_eq!(h().adjoint(), h(), epsilon = 1e-12);
    }

    #[test]
    fn compose_order() {
        // apply X, then S: S·X maps |0> to i|1>
        let xs = x().compose(&s_gate()).unwrap();
        let expected = s_gate().dot(&x()).unwrap();
        assert_abs_diff_eq!(xs, expected, epsilon = 1e-12);
        assert_eq!(xs.matrix()[[1, 0]], c(0.0, 1.0));
        assert_eq!(xs.matrix()[[0, 1]], c(1.0, 0.0));
        assert!(x().compose(&Operator::identity(2).unwrap()).is_err());
    }

    #[test]
    fn tensor_layout() {
        let id = Operator::identity(1).unwrap();
        let xi = x().tensor(&id).unwrap();
        // X on the high qubit swaps |00> and |10>
        assert_eq!(xi.matrix()[[2, 0]], c(1.0, 0.0));
        assert_eq!(xi.matrix()[[0, 2]], c(1.0, 0.0));
        assert_eq!(xi.matrix()[[1, 0]], c(0.0, 0.0));
    }

    #[test]
    fn tensor_matches_states() {
        let u = StateVector::from_label("+").unwrap();
        let v = StateVector::new(vec![c(0.6, 0.0), c(0.0, 0.8)]).unwrap();
        let a = h();
        let b = s_gate();
        let lhs = a.tensor(&b).unwrap().matrix().dot(u.tensor(&v).unwrap().amplitudes());
        let au = a.matrix().dot(u.amplitudes());
        let bv = b.matrix().dot(v.amplitudes());
        let rhs = StateVector::new(au)
            .unwrap()
            .tensor(&StateVector::new(bv).unwrap())
            .unwrap();
        assert_abs_diff_eq!(StateVector::new(lhs).unwrap(), rhs, epsilon = 1e-12);
    }

    #[test]
    fn tensor_associative() {
        let a = h();
        let b = s_gate();
        let cc = x();
        let left = a.tensor(&b).unwrap().tensor(&cc).unwrap();
        let right = a.tensor(&b.tensor(&cc).unwrap()).unwrap();
        assert_abs_diff_eq!(left, right, epsilon = 1e-12);
        assert_eq!(left.num_qubits(), 3);
    }

    #[test]
    fn global_phase() {
        let minus_x = Operator::from_real_rows(&[&[0.0, -1.0], &[-1.0, 0.0]]).unwrap();
        assert!(x().equiv(&minus_x));
        assert!(!x().equiv(&h()));
        assert!(!x().equiv(&Operator::identity(2).unwrap()));
    }

    #[test]
    fn display() {
        assert_eq!(x().to_string(), "[ 0.00000, 1.00000 ]\n[ 1.00000, 0.00000 ]\n");
    }
}
