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

//! Applying operators and gates to states.
//!
//! Every function here returns a new [StateVector]; inputs are never
//! modified.

use ndarray::prelude::*;
use num::complex::Complex64;
use num::Zero;

use crate::circuit::Circuit;
use crate::error::{check_qubits, QError, Result};
use crate::gate::Gate;
use crate::limits::Limits;
use crate::operator::Operator;
use crate::state::StateVector;

/// Returns `op · state`.
pub fn evolve(state: &StateVector, op: &Operator) -> Result<StateVector> {
    if op.dim() != state.dim() {
        return Err(QError::DimensionMismatch {
            expected: state.dim(),
            found: op.dim(),
        });
    }
    Ok(StateVector::from_array_unchecked(
        op.matrix().dot(state.amplitudes()),
    ))
}

/// Applies a `k`-qubit operator to the given qubits of `state`.
///
/// Local qubit `j` of `op` acts on `qubits[j]`. Only `2^k × 2^k` entries are
/// touched per amplitude block, so the full `2^n` matrix is never built.
pub fn evolve_on(state: &StateVector, op: &Operator, qubits: &[usize]) -> Result<StateVector> {
    check_qubits(qubits, state.num_qubits())?;
    let local_dim = 1 << qubits.len();
    if op.dim() != local_dim {
        return Err(QError::DimensionMismatch {
            expected: local_dim,
            found: op.dim(),
        });
    }
    Ok(StateVector::from_array_unchecked(apply_local(
        state.amplitudes(),
        op.matrix(),
        qubits,
    )))
}

/// Applies a single gate.
pub fn evolve_gate(state: &StateVector, gate: &Gate) -> Result<StateVector> {
    log::trace!("applying {}", gate.to_qasm());
    evolve_on(state, &gate.operator()?, &gate.qs)
}

/// Applies the gates in the order given.
pub fn evolve_gates<'a>(
    state: &StateVector,
    gates: impl IntoIterator<Item = &'a Gate>,
) -> Result<StateVector> {
    let mut s = state.clone();
    for g in gates {
        s = evolve_gate(&s, g)?;
    }
    Ok(s)
}

/// Runs every gate of `circ` on `state`, first gate first.
pub fn evolve_circuit(state: &StateVector, circ: &Circuit) -> Result<StateVector> {
    Limits::default().check_qubits(circ.num_qubits())?;
    if circ.num_qubits() != state.num_qubits() {
        return Err(QError::DimensionMismatch {
            expected: state.dim(),
            found: 1 << circ.num_qubits(),
        });
    }
    log::debug!(
        "evolving a {}-qubit state through {} gates",
        state.num_qubits(),
        circ.num_gates()
    );
    evolve_gates(state, &circ.gates)
}

/// Lifts a local operator on `qubits` to an operator on all `nqubits`.
pub fn embed(op: &Operator, qubits: &[usize], nqubits: usize) -> Result<Operator> {
    Limits::default().check_qubits(nqubits)?;
    check_qubits(qubits, nqubits)?;
    let local_dim = 1 << qubits.len();
    if op.dim() != local_dim {
        return Err(QError::DimensionMismatch {
            expected: local_dim,
            found: op.dim(),
        });
    }
    let id: Array2<Complex64> = Array2::eye(1 << nqubits);
    let mut full = Array2::zeros(id.dim());
    for (col, e) in id.columns().into_iter().enumerate() {
        full.column_mut(col)
            .assign(&apply_local(&e.to_owned(), op.matrix(), qubits));
    }
    Ok(Operator::from_array_unchecked(full))
}

/// The state index offset of each local basis index of `qubits`.
fn local_offsets(qubits: &[usize]) -> Vec<usize> {
    (0..1usize << qubits.len())
        .map(|l| {
            qubits
                .iter()
                .enumerate()
                .fold(0, |acc, (j, &q)| acc | (((l >> j) & 1) << q))
        })
        .collect()
}

fn apply_local(
    amps: &Array1<Complex64>,
    m: &Array2<Complex64>,
    qubits: &[usize],
) -> Array1<Complex64> {
    let offsets = local_offsets(qubits);
    let mask = qubits.iter().fold(0, |acc, &q| acc | (1 << q));
    let mut out = Array1::zeros(amps.len());
    let mut local = vec![Complex64::zero(); offsets.len()];

    for base in (0..amps.len()).filter(|i| i & mask == 0) {
        for (l, off) in offsets.iter().enumerate() {
            local[l] = amps[base | off];
        }
        for (r, off) in offsets.iter().enumerate() {
            out[base | off] = m
                .row(r)
                .iter()
                .zip(local.iter())
                .map(|(a, b)| a * b)
                .sum::<Complex64>();
        }
    }
    out
}
