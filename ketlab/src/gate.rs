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

use ndarray::prelude::*;
use num::complex::Complex64;
use num::{One, Zero};
use std::f64::consts::{FRAC_1_SQRT_2, FRAC_PI_4};

use crate::error::{QError, Result};
use crate::operator::Operator;

#[derive(PartialEq, Eq, Clone, Copy, Debug, Hash)]
pub enum GType {
    NOT,
    Y,
    Z,
    HAD,
    S,
    Sdg,
    T,
    Tdg,
    XPhase,
    YPhase,
    ZPhase,
    Phase,
    U,
    CNOT,
    CZ,
    SWAP,
    TOFF,
    CCZ,
}

pub use GType::*;

impl GType {
    pub fn from_qasm_name(s: &str) -> Option<GType> {
        let t = match s {
            "x" => NOT,
            "y" => Y,
            "z" => Z,
            "h" => HAD,
            "s" => S,
            "sdg" => Sdg,
            "t" => T,
            "tdg" => Tdg,
            "rx" => XPhase,
            "ry" => YPhase,
            "rz" => ZPhase,
            "p" | "u1" => Phase,
            "u" | "u3" | "U" => U,
            "cx" | "CX" => CNOT,
            "cz" => CZ,
            "swap" => SWAP,
            "ccx" => TOFF,
            "ccz" => CCZ,
            _ => return None,
        };
        Some(t)
    }

    pub fn qasm_name(&self) -> &'static str {
        match self {
            NOT => "x",
            Y => "y",
            Z => "z",
            HAD => "h",
            S => "s",
            Sdg => "sdg",
            T => "t",
            Tdg => "tdg",
            XPhase => "rx",
            YPhase => "ry",
            ZPhase => "rz",
            Phase => "p",
            U => "u",
            CNOT => "cx",
            CZ => "cz",
            SWAP => "swap",
            TOFF => "ccx",
            CCZ => "ccz",
        }
    }

    /// number of qubits the gate acts on
    pub fn num_qubits(&self) -> usize {
        match self {
            CNOT | CZ | SWAP => 2,
            TOFF | CCZ => 3,
            _ => 1,
        }
    }

    /// number of angle parameters, in radians
    pub fn num_params(&self) -> usize {
        match self {
            XPhase | YPhase | ZPhase | Phase => 1,
            U => 3,
            _ => 0,
        }
    }

    /// The gate's matrix on its own qubits.
    ///
    /// Local qubit `j` is bit `j` of the row/column index and corresponds to
    /// the `j`-th entry of [Gate::qs]. For the controlled gates the controls
    /// come first, so `CNOT` on `[c, t]` flips bit 1 when bit 0 is set.
    ///
    /// `params` must hold at least [GType::num_params] angles.
    pub(crate) fn matrix(&self, params: &[f64]) -> Array2<Complex64> {
        let one = Complex64::one();
        let zero = Complex64::zero();
        let i = Complex64::i();
        let r = Complex64::new(FRAC_1_SQRT_2, 0.0);
        match self {
            NOT => array![[zero, one], [one, zero]],
            Y => array![[zero, -i], [i, zero]],
            Z => Array2::from_diag(&array![one, -one]),
            HAD => array![[r, r], [r, -r]],
            S => Array2::from_diag(&array![one, i]),
            Sdg => Array2::from_diag(&array![one, -i]),
            T => Array2::from_diag(&array![one, Complex64::from_polar(1.0, FRAC_PI_4)]),
            Tdg => Array2::from_diag(&array![one, Complex64::from_polar(1.0, -FRAC_PI_4)]),
            XPhase => {
                let (s, c) = (params[0] / 2.0).sin_cos();
                array![
                    [Complex64::new(c, 0.0), Complex64::new(0.0, -s)],
                    [Complex64::new(0.0, -s), Complex64::new(c, 0.0)]
                ]
            }
            YPhase => {
                let (s, c) = (params[0] / 2.0).sin_cos();
                array![
                    [Complex64::new(c, 0.0), Complex64::new(-s, 0.0)],
                    [Complex64::new(s, 0.0), Complex64::new(c, 0.0)]
                ]
            }
            ZPhase => Array2::from_diag(&array![
                Complex64::from_polar(1.0, -params[0] / 2.0),
                Complex64::from_polar(1.0, params[0] / 2.0)
            ]),
            Phase => Array2::from_diag(&array![one, Complex64::from_polar(1.0, params[0])]),
            U => {
                let (theta, phi, lambda) = (params[0], params[1], params[2]);
                let (s, c) = (theta / 2.0).sin_cos();
                array![
                    [Complex64::new(c, 0.0), -Complex64::from_polar(s, lambda)],
                    [Complex64::from_polar(s, phi), Complex64::from_polar(c, phi + lambda)]
                ]
            }
            CNOT => permutation(4, |k| if k & 1 == 1 { k ^ 2 } else { k }),
            CZ => Array2::from_diag(&Array1::from_shape_fn(4, |k| if k == 3 { -one } else { one })),
            SWAP => permutation(4, |k| ((k & 1) << 1) | (k >> 1)),
            TOFF => permutation(8, |k| if k & 3 == 3 { k ^ 4 } else { k }),
            CCZ => Array2::from_diag(&Array1::from_shape_fn(8, |k| {
                if k == 7 {
                    -one
                } else {
                    one
                }
            })),
        }
    }

    /// The operator of a parameter-free gate on its own qubits.
    pub fn operator(&self) -> Result<Operator> {
        Gate::new(*self, (0..self.num_qubits()).collect()).operator()
    }
}

/// The permutation matrix sending basis state `k` to `f(k)`.
fn permutation(dim: usize, f: impl Fn(usize) -> usize) -> Array2<Complex64> {
    let mut m = Array2::zeros((dim, dim));
    for k in 0..dim {
        m[[f(k), k]] = Complex64::one();
    }
    m
}

#[derive(PartialEq, Clone, Debug)]
pub struct Gate {
    pub t: GType,
    pub qs: Vec<usize>,
    pub params: Vec<f64>,
}

impl Gate {
    pub fn new(t: GType, qs: Vec<usize>) -> Gate {
        Gate {
            t,
            qs,
            params: vec![],
        }
    }

    pub fn new_with_params(t: GType, qs: Vec<usize>, params: Vec<f64>) -> Gate {
        Gate { t, qs, params }
    }

    pub fn qasm_name(&self) -> &'static str {
        self.t.qasm_name()
    }

    pub fn to_qasm(&self) -> String {
        let mut s = String::from(self.qasm_name());

        if !self.params.is_empty() {
            let ps: Vec<String> = self.params.iter().map(|p| format!("{p}")).collect();
            s += &format!("({})", ps.join(", "));
        }

        s += " ";
        let qs: Vec<String> = self.qs.iter().map(|i| format!("q[{i}]")).collect();
        s += &qs.join(", ");

        s
    }

    pub fn adjoint(&mut self) {
        match self.t {
            XPhase | YPhase | ZPhase | Phase => {
                for p in &mut self.params {
                    *p = -*p;
                }
            }
            U => {
                if let [theta, phi, lambda] = self.params[..] {
                    self.params = vec![-theta, -lambda, -phi];
                }
            }
            S => self.t = Sdg,
            T => self.t = Tdg,
            Sdg => self.t = S,
            Tdg => self.t = T,
            _ => {} // everything else is self-adjoint
        }
    }

    pub fn to_adjoint(&self) -> Gate {
        let mut g = self.clone();
        g.adjoint();
        g
    }

    /// Checks that the gate has as many qubits and angles as its type needs.
    pub fn check(&self) -> Result<()> {
        if self.qs.len() != self.t.num_qubits() {
            return Err(QError::InvalidOperator(format!(
                "'{}' acts on {} qubits, but {} were given",
                self.qasm_name(),
                self.t.num_qubits(),
                self.qs.len()
            )));
        }
        if self.params.len() != self.t.num_params() {
            return Err(QError::InvalidOperator(format!(
                "'{}' takes {} parameters, but {} were given",
                self.qasm_name(),
                self.t.num_params(),
                self.params.len()
            )));
        }
        Ok(())
    }

    /// The gate's local operator, acting on `qs.len()` qubits.
    pub fn operator(&self) -> Result<Operator> {
        self.check()?;
        Ok(Operator::from_array_unchecked(self.t.matrix(&self.params)))
    }
}
