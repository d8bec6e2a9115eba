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

//! Pure states as normalised complex amplitude vectors.
//!
//! Basis index bit `k` holds qubit `k`, so kets are written
//! `|q_{n-1} ... q_1 q_0⟩` and [StateVector::tensor] places its receiver on
//! the high qubits.

use approx::AbsDiffEq;
use itertools::Itertools;
use ndarray::prelude::*;
use num::complex::Complex64;
use num::Zero;
use std::f64::consts::FRAC_1_SQRT_2;
use std::fmt;

use crate::error::{QError, Result};
use crate::limits::{num_qubits_for_dim, Limits, DEFAULT_TOLERANCE};

/// A normalised pure state on `n` qubits, stored as `2^n` amplitudes.
#[derive(Debug, Clone, PartialEq)]
pub struct StateVector {
    amps: Array1<Complex64>,
    nqubits: usize,
}

/// True if the squared magnitudes of `amps` sum to one within `tolerance`.
///
/// Returns false for vectors containing NaN.
fn is_normalized(amps: &Array1<Complex64>, tolerance: f64) -> bool {
    let norm: f64 = amps.iter().map(|a| a.norm_sqr()).sum();
    (norm - 1.0).abs() <= tolerance
}

impl StateVector {
    /// Builds a state from literal amplitudes using the default [Limits].
    pub fn new(amps: impl Into<Array1<Complex64>>) -> Result<StateVector> {
        StateVector::new_with(amps, &Limits::default())
    }

    pub fn new_with(amps: impl Into<Array1<Complex64>>, limits: &Limits) -> Result<StateVector> {
        let amps = amps.into();
        let nqubits = num_qubits_for_dim(amps.len()).ok_or_else(|| {
            QError::InvalidState(format!(
                "length {} is not a power of two",
                amps.len()
            ))
        })?;
        limits.check_qubits(nqubits)?;

        if !is_normalized(&amps, limits.tolerance) {
            let norm: f64 = amps.iter().map(|a| a.norm_sqr()).sum();
            return Err(QError::InvalidState(format!(
                "squared norm is {norm}, expected 1"
            )));
        }

        Ok(StateVector { amps, nqubits })
    }

    /// Builds a state from real amplitudes.
    pub fn from_real(amps: &[f64]) -> Result<StateVector> {
        StateVector::new(amps.iter().map(|&x| Complex64::new(x, 0.0)).collect::<Array1<_>>())
    }

    /// Wraps amplitudes that are already known to be normalised, e.g. the
    /// output of a unitary or a renormalised projection.
    pub(crate) fn from_array_unchecked(amps: Array1<Complex64>) -> StateVector {
        let nqubits = amps.len().trailing_zeros() as usize;
        StateVector { amps, nqubits }
    }

    /// The all-zero basis state `|0...0⟩`.
    pub fn zero(nqubits: usize) -> Result<StateVector> {
        StateVector::basis(nqubits, 0)
    }

    /// The computational basis state with the given index.
    pub fn basis(nqubits: usize, index: usize) -> Result<StateVector> {
        Limits::default().check_qubits(nqubits)?;
        let dim = 1 << nqubits;
        if index >= dim {
            return Err(QError::InvalidState(format!(
                "basis index {index} out of range for {nqubits} qubits"
            )));
        }
        let mut amps = Array1::zeros(dim);
        amps[index] = Complex64::new(1.0, 0.0);
        Ok(StateVector { amps, nqubits })
    }

    /// Builds a product state from a label with one character per qubit,
    /// highest qubit first.
    ///
    /// Recognised characters are `0`, `1`, `+`, `-`, `r` (`|+i⟩`) and `l`
    /// (`|-i⟩`).
    pub fn from_label(label: &str) -> Result<StateVector> {
        let mut chars = label.chars();
        let first = chars
            .next()
            .ok_or_else(|| QError::InvalidState("empty label".to_string()))?;
        let mut state = StateVector::single_qubit(first)?;
        for c in chars {
            state = state.tensor(&StateVector::single_qubit(c)?)?;
        }
        Ok(state)
    }

    fn single_qubit(c: char) -> Result<StateVector> {
        let s = FRAC_1_SQRT_2;
        let (a, b) = match c {
            '0' => (Complex64::new(1.0, 0.0), Complex64::zero()),
            '1' => (Complex64::zero(), Complex64::new(1.0, 0.0)),
            '+' => (Complex64::new(s, 0.0), Complex64::new(s, 0.0)),
            '-' => (Complex64::new(s, 0.0), Complex64::new(-s, 0.0)),
            'r' => (Complex64::new(s, 0.0), Complex64::new(0.0, s)),
            'l' => (Complex64::new(s, 0.0), Complex64::new(0.0, -s)),
            _ => {
                return Err(QError::InvalidState(format!(
                    "'{c}' is not a state label. Expected one of '0', '1', '+', '-', 'r', 'l'."
                )))
            }
        };
        Ok(StateVector {
            amps: array![a, b],
            nqubits: 1,
        })
    }

    pub fn num_qubits(&self) -> usize {
        self.nqubits
    }

    /// Number of amplitudes, `2^num_qubits`.
    pub fn dim(&self) -> usize {
        self.amps.len()
    }

    pub fn amplitudes(&self) -> &Array1<Complex64> {
        &self.amps
    }

    /// Sum of squared magnitudes.
    pub fn norm_sqr(&self) -> f64 {
        self.amps.iter().map(|a| a.norm_sqr()).sum()
    }

    /// Checks the unit-norm invariant with the default tolerance.
    pub fn is_valid(&self) -> bool {
        self.is_valid_with(DEFAULT_TOLERANCE)
    }

    pub fn is_valid_with(&self, tolerance: f64) -> bool {
        is_normalized(&self.amps, tolerance)
    }

    /// Kronecker product `self ⊗ other`.
    ///
    /// `self` occupies the high qubits: index `i * other.dim() + j` holds
    /// `self[i] * other[j]`.
    pub fn tensor(&self, other: &StateVector) -> Result<StateVector> {
        self.tensor_with(other, &Limits::default())
    }

    pub fn tensor_with(&self, other: &StateVector, limits: &Limits) -> Result<StateVector> {
        let nqubits = self.nqubits + other.nqubits;
        limits.check_qubits(nqubits)?;
        let d = other.dim();
        let amps = Array1::from_shape_fn(self.dim() * d, |k| self.amps[k / d] * other.amps[k % d]);
        Ok(StateVector { amps, nqubits })
    }

    /// Probability of each basis state.
    pub fn probabilities(&self) -> Array1<f64> {
        self.amps.mapv(|a| a.norm_sqr())
    }

    /// The inner product `⟨self|other⟩`.
    pub fn inner(&self, other: &StateVector) -> Result<Complex64> {
        if self.dim() != other.dim() {
            return Err(QError::DimensionMismatch {
                expected: self.dim(),
                found: other.dim(),
            });
        }
        Ok(self
            .amps
            .iter()
            .zip(other.amps.iter())
            .map(|(a, b)| a.conj() * b)
            .sum())
    }

    /// True if the two states differ only by a global phase.
    pub fn equiv(&self, other: &StateVector) -> bool {
        match self.inner(other) {
            Ok(ip) => (ip.norm() - 1.0).abs() <= DEFAULT_TOLERANCE,
            Err(_) => false,
        }
    }

    /// Renders a basis index as an `n`-character bit string, highest qubit
    /// first.
    pub fn basis_label(index: usize, nqubits: usize) -> String {
        (0..nqubits)
            .rev()
            .map(|q| if (index >> q) & 1 == 1 { '1' } else { '0' })
            .collect()
    }
}

impl std::ops::Index<usize> for StateVector {
    type Output = Complex64;
    fn index(&self, idx: usize) -> &Self::Output {
        &self.amps[idx]
    }
}

impl AbsDiffEq for StateVector {
    type Epsilon = f64;

    fn default_epsilon() -> Self::Epsilon {
        DEFAULT_TOLERANCE
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        self.dim() == other.dim()
            && self.amps.iter().zip(other.amps.iter()).all(|(a, b)| {
                f64::abs_diff_eq(&a.re, &b.re, epsilon) && f64::abs_diff_eq(&a.im, &b.im, epsilon)
            })
    }
}

/// Formats a complex number compactly, dropping zero parts.
pub(crate) fn fmt_complex(c: &Complex64) -> String {
    let eps = 1e-10;
    match (c.re.abs() < eps, c.im.abs() < eps) {
        (_, true) => format!("{:.5}", c.re),
        (true, false) => format!("{:.5}i", c.im),
        (false, false) => format!("({:.5}{:+.5}i)", c.re, c.im),
    }
}

impl fmt::Display for StateVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let terms = self
            .amps
            .iter()
            .enumerate()
            .filter(|(_, a)| a.norm_sqr() > 1e-20)
            .map(|(i, a)| {
                let label = StateVector::basis_label(i, self.nqubits);
                format!("{}|{label}⟩", fmt_complex(a))
            })
            .join(" + ");
        if terms.is_empty() {
            write!(f, "0")
        } else {
            write!(f, "{terms}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rstest::rstest;

    fn c(re: f64, im: f64) -> Complex64 {
        Complex64::new(re, im)
    }

    #[test]
    fn literal_states() {
        let s = FRAC_1_SQRT_2;
        let u = StateVector::from_real(&[s, s]).unwrap();
        assert_eq!(u.num_qubits(), 1);
        assert!(u.is_valid());

        let v = StateVector::new(vec![c(1.0 / 3.0, 2.0 / 3.0), c(-2.0 / 3.0, 0.0)]).unwrap();
        assert!(v.is_valid());

        let w = StateVector::from_real(&[1.0 / 3.0, 2.0 / 3.0]);
        assert!(matches!(w, Err(QError::InvalidState(_))));
        assert!(!is_normalized(&array![c(1.0 / 3.0, 0.0), c(2.0 / 3.0, 0.0)], 1e-8));
        assert!(!is_normalized(&array![c(f64::NAN, 0.0), c(1.0, 0.0)], 1e-8));
    }

    #[test]
    fn bad_lengths() {
        let r = StateVector::from_real(&[1.0, 0.0, 0.0]);
        assert!(matches!(r, Err(QError::InvalidState(_))));
        let r = StateVector::new(Vec::<Complex64>::new());
        assert!(matches!(r, Err(QError::InvalidState(_))));
    }

    #[test]
    fn nan_is_invalid() {
        let r = StateVector::new(vec![c(f64::NAN, 0.0), c(0.0, 0.0)]);
        assert!(matches!(r, Err(QError::InvalidState(_))));
    }

    #[test]
    fn resource_limit() {
        let mut limits = Limits::default();
        limits.with_max_qubits(2);
        let mut amps = vec![c(0.0, 0.0); 8];
        amps[0] = c(1.0, 0.0);
        assert_eq!(
            StateVector::new_with(amps, &limits),
            Err(QError::ResourceLimit {
                requested: 3,
                max: 2
            })
        );

        let a = StateVector::from_label("00").unwrap();
        assert!(a.tensor_with(&a, &limits).is_err());
        assert!(StateVector::zero(40).is_err());
    }

    #[test]
    fn tensor_zero_one() {
        let zero = StateVector::from_label("0").unwrap();
        let one = StateVector::from_label("1").unwrap();
        let t = zero.tensor(&one).unwrap();
        assert_eq!(t.num_qubits(), 2);
        assert_abs_diff_eq!(t, StateVector::from_real(&[0.0, 1.0, 0.0, 0.0]).unwrap());
        assert_eq!(t, StateVector::basis(2, 1).unwrap());
        assert_eq!(t, StateVector::from_label("01").unwrap());
    }

    #[test]
    fn tensor_plus_i() {
        let s = FRAC_1_SQRT_2;
        let plus = StateVector::from_label("+").unwrap();
        let i_state = StateVector::new(vec![c(s, 0.0), c(0.0, s)]).unwrap();
        let psi = plus.tensor(&i_state).unwrap();
        let expected =
            StateVector::new(vec![c(0.5, 0.0), c(0.0, 0.5), c(0.5, 0.0), c(0.0, 0.5)]).unwrap();
        assert_abs_diff_eq!(psi, expected, epsilon = 1e-12);
        assert_abs_diff_eq!(psi, StateVector::from_label("+r").unwrap(), epsilon = 1e-12);
    }

    #[test]
    fn tensor_associative() {
        let a = StateVector::from_label("+").unwrap();
        let b = StateVector::new(vec![c(0.6, 0.0), c(0.0, 0.8)]).unwrap();
        let cc = StateVector::from_label("l").unwrap();
        let left = a.tensor(&b).unwrap().tensor(&cc).unwrap();
        let right = a.tensor(&b.tensor(&cc).unwrap()).unwrap();
        assert_abs_diff_eq!(left, right, epsilon = 1e-12);
    }

    #[rstest]
    #[case("0", 0)]
    #[case("1", 1)]
    #[case("10", 2)]
    #[case("011", 3)]
    #[case("110", 6)]
    fn labels_are_basis_states(#[case] label: &str, #[case] index: usize) {
        let s = StateVector::from_label(label).unwrap();
        assert_eq!(s, StateVector::basis(label.len(), index).unwrap());
        assert_eq!(StateVector::basis_label(index, label.len()), label);
    }

    #[test]
    fn bad_labels() {
        assert!(matches!(StateVector::from_label(""), Err(QError::InvalidState(_))));
        assert!(matches!(StateVector::from_label("0x"), Err(QError::InvalidState(_))));
        assert!(StateVector::basis(2, 4).is_err());
    }

    #[test]
    fn probabilities_and_inner() {
        let v = StateVector::new(vec![c(0.6, 0.0), c(0.0, 0.8)]).unwrap();
        let p = v.probabilities();
        assert_abs_diff_eq!(p[0], 0.36, epsilon = 1e-12);
        assert_abs_diff_eq!(p[1], 0.64, epsilon = 1e-12);
        assert_abs_diff_eq!(v.inner(&v).unwrap().re, 1.0, epsilon = 1e-12);

        let minus_v = StateVector::new(vec![c(0.0, 0.6), c(-0.8, 0.0)]).unwrap();
        assert!(v.equiv(&minus_v));
        assert!(!v.equiv(&StateVector::from_label("0").unwrap()));
        assert!(v.inner(&StateVector::zero(2).unwrap()).is_err());
    }

    #[test]
    fn display() {
        let s = StateVector::from_label("+0").unwrap();
        assert_eq!(s.to_string(), "0.70711|00⟩ + 0.70711|10⟩");
        let r = StateVector::from_label("l").unwrap();
        assert_eq!(r.to_string(), "0.70711|0⟩ + -0.70711i|1⟩");
    }
}
