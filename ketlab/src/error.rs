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

//! Errors produced by state, operator and measurement routines.

use std::error::Error;

/// Errors produced by ketlab.
///
/// Every routine that can fail returns one of these immediately; nothing is
/// retried or silently corrected.
#[derive(Debug, Clone, PartialEq, derive_more::Display)]
pub enum QError {
    /// Malformed or non-normalised amplitude vector.
    #[display("invalid state vector: {_0}")]
    InvalidState(String),
    /// Non-square, wrongly sized or non-unitary matrix.
    #[display("invalid operator: {_0}")]
    InvalidOperator(String),
    /// An operator was applied to a state (or composed with an operator) of
    /// a different dimension.
    #[display("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },
    /// A qubit index past the end of the state.
    #[display("qubit {qubit} is out of range for a {num_qubits}-qubit state")]
    QubitOutOfRange { qubit: usize, num_qubits: usize },
    /// The same qubit was named twice in one request.
    #[display("qubit {_0} is referenced more than once")]
    DuplicateQubit(usize),
    /// The state carries no probability mass to draw from.
    #[display("state vector has no nonzero amplitudes")]
    EmptyState,
    /// Two registers with the same name were added to one builder.
    #[display("a register named '{_0}' already exists")]
    DuplicateRegisterName(String),
    /// Lookup of a register that was never added.
    #[display("no register named '{_0}'")]
    UnknownRegister(String),
    /// The qubit count exceeds the configured maximum.
    #[display("{requested} qubits requested, but at most {max} are allowed")]
    ResourceLimit { requested: usize, max: usize },
    /// An OpenQASM source could not be turned into a gate sequence.
    #[display("error parsing input circuit: {_0}")]
    QasmParse(String),
}

impl Error for QError {}

impl QError {
    /// True for both flavours of bad qubit reference (out of range or
    /// duplicated).
    pub fn is_invalid_qubit_index(&self) -> bool {
        matches!(
            self,
            QError::QubitOutOfRange { .. } | QError::DuplicateQubit(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, QError>;

/// Checks that every entry of `qubits` is below `num_qubits` and that no
/// entry repeats.
pub(crate) fn check_qubits(qubits: &[usize], num_qubits: usize) -> Result<()> {
    for (i, &q) in qubits.iter().enumerate() {
        if q >= num_qubits {
            return Err(QError::QubitOutOfRange {
                qubit: q,
                num_qubits,
            });
        }
        if qubits[..i].contains(&q) {
            return Err(QError::DuplicateQubit(q));
        }
    }
    Ok(())
}
