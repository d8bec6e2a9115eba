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

//! Named registers over one joint state.
//!
//! A [StateBuilder] tensors component states together and remembers which
//! qubits each one landed on, so callers can write `("alice", 0)` instead of
//! working out raw indices. The first register added takes the lowest qubit
//! indices.

use rand::Rng;
use rustc_hash::FxHashMap;
use std::fmt;

use crate::error::{QError, Result};
use crate::evolve::evolve_on;
use crate::limits::Limits;
use crate::measure::{measure, Outcome};
use crate::operator::Operator;
use crate::state::StateVector;

/// A contiguous block of qubits in a [CompositeState].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Register {
    name: String,
    offset: usize,
    len: usize,
}

impl Register {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Index of the register's qubit 0 in the joint state.
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Joint-state indices of the register's qubits, in order.
    pub fn qubits(&self) -> Vec<usize> {
        (self.offset..self.offset + self.len).collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct StateBuilder {
    components: Vec<(String, StateVector)>,
    nqubits: usize,
    limits: Limits,
}

impl StateBuilder {
    pub fn new() -> StateBuilder {
        StateBuilder::default()
    }

    pub fn with_limits(limits: Limits) -> StateBuilder {
        StateBuilder {
            limits,
            ..Default::default()
        }
    }

    /// Adds a register holding `state` above all registers added so far.
    pub fn register(mut self, name: impl Into<String>, state: StateVector) -> Result<StateBuilder> {
        let name = name.into();
        if self.components.iter().any(|(n, _)| *n == name) {
            return Err(QError::DuplicateRegisterName(name));
        }
        self.limits.check_qubits(self.nqubits + state.num_qubits())?;
        self.nqubits += state.num_qubits();
        self.components.push((name, state));
        Ok(self)
    }

    pub fn num_qubits(&self) -> usize {
        self.nqubits
    }

    /// Tensors the registers into one state.
    pub fn build(self) -> Result<CompositeState> {
        let mut state = StateVector::zero(0)?;
        let mut registers = Vec::with_capacity(self.components.len());
        let mut index = FxHashMap::default();
        let mut offset = 0;
        for (name, s) in self.components {
            // later registers go on the high qubits
            state = s.tensor_with(&state, &self.limits)?;
            index.insert(name.clone(), registers.len());
            registers.push(Register {
                name,
                offset,
                len: s.num_qubits(),
            });
            offset += s.num_qubits();
        }
        Ok(CompositeState {
            state,
            registers,
            index,
        })
    }
}

/// A joint state together with its register layout.
#[derive(Debug, Clone)]
pub struct CompositeState {
    state: StateVector,
    registers: Vec<Register>,
    index: FxHashMap<String, usize>,
}

impl CompositeState {
    pub fn state(&self) -> &StateVector {
        &self.state
    }

    pub fn num_qubits(&self) -> usize {
        self.state.num_qubits()
    }

    /// Registers in the order they were added.
    pub fn registers(&self) -> &[Register] {
        &self.registers
    }

    pub fn register(&self, name: &str) -> Result<&Register> {
        self.index
            .get(name)
            .map(|&i| &self.registers[i])
            .ok_or_else(|| QError::UnknownRegister(name.to_string()))
    }

    /// Joint index of qubit `i` of register `name`.
    pub fn qubit(&self, name: &str, i: usize) -> Result<usize> {
        let r = self.register(name)?;
        if i >= r.len {
            return Err(QError::QubitOutOfRange {
                qubit: i,
                num_qubits: r.len,
            });
        }
        Ok(r.offset + i)
    }

    pub fn qubits(&self, name: &str) -> Result<Vec<usize>> {
        Ok(self.register(name)?.qubits())
    }

    /// Resolves a list of `(register, qubit)` pairs to joint indices.
    pub fn resolve(&self, targets: &[(&str, usize)]) -> Result<Vec<usize>> {
        targets
            .iter()
            .map(|&(name, i)| self.qubit(name, i))
            .collect()
    }

    /// Applies `op` to the named qubits, local qubit `j` on `targets[j]`.
    pub fn evolve_on(&self, op: &Operator, targets: &[(&str, usize)]) -> Result<CompositeState> {
        let qubits = self.resolve(targets)?;
        Ok(CompositeState {
            state: evolve_on(&self.state, op, &qubits)?,
            ..self.clone()
        })
    }

    /// Measures the named qubits and returns the outcome with the collapsed
    /// state. The register layout is unchanged.
    pub fn measure<R: Rng + ?Sized>(
        &self,
        targets: &[(&str, usize)],
        rng: &mut R,
    ) -> Result<(Outcome, CompositeState)> {
        let qubits = self.resolve(targets)?;
        let m = measure(&self.state, &qubits, rng)?;
        Ok((
            m.outcome,
            CompositeState {
                state: m.state,
                ..self.clone()
            },
        ))
    }
}

impl fmt::Display for CompositeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for r in &self.registers {
            writeln!(f, "{}: q[{}..{}]", r.name, r.offset, r.offset + r.len)?;
        }
        write!(f, "{}", self.state)
    }
}
