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

//! Numerical tolerance and size limits shared by the constructors.

use serde::{Deserialize, Serialize};

use crate::error::{QError, Result};

/// Largest state, in qubits, accepted by default. A dense vector of this
/// size holds 2^24 complex amplitudes (256 MiB).
pub const DEFAULT_MAX_QUBITS: usize = 24;

/// Default tolerance for the unit-norm and unitarity checks.
pub const DEFAULT_TOLERANCE: f64 = 1e-8;

/// Limits applied when validating states and operators.
///
/// Constructors without a `_with` suffix use [`Limits::default`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    pub max_qubits: usize,
    pub tolerance: f64,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_qubits: DEFAULT_MAX_QUBITS,
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

impl Limits {
    pub fn with_max_qubits(&mut self, max_qubits: usize) -> &mut Self {
        self.max_qubits = max_qubits;
        self
    }

    pub fn with_tolerance(&mut self, tolerance: f64) -> &mut Self {
        self.tolerance = tolerance;
        self
    }

    /// Returns a [`QError::ResourceLimit`] if `qubits` is over the limit.
    pub fn check_qubits(&self, qubits: usize) -> Result<()> {
        if qubits > self.max_qubits {
            Err(QError::ResourceLimit {
                requested: qubits,
                max: self.max_qubits,
            })
        } else {
            Ok(())
        }
    }
}

/// The number of qubits `n` with `2^n == dim`, if `dim` is a power of two.
pub fn num_qubits_for_dim(dim: usize) -> Option<usize> {
    if dim.is_power_of_two() {
        Some(dim.trailing_zeros() as usize)
    } else {
        None
    }
}
