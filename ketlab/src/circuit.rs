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

use openqasm::{ast::Symbol, translate::Value, GenericError, ProgramVisitor};
use std::collections::VecDeque;
use std::f64::consts::PI;
use std::fmt;

use crate::error::{check_qubits, QError, Result};
use crate::evolve::embed;
use crate::gate::*;
use crate::operator::Operator;

/// An ordered sequence of unitary gates on a fixed number of qubits.
///
/// Gates run front to back. The equivalent operator is the product of the
/// gate matrices in the *opposite* order, see [Circuit::to_operator].
#[derive(PartialEq, Clone, Debug)]
pub struct Circuit {
    nqubits: usize,
    pub gates: VecDeque<Gate>,
}

impl Circuit {
    pub fn new(nqubits: usize) -> Circuit {
        Circuit {
            gates: VecDeque::new(),
            nqubits,
        }
    }

    pub fn num_qubits(&self) -> usize {
        self.nqubits
    }

    pub fn num_gates(&self) -> usize {
        self.gates.len()
    }

    pub fn num_gates_of_type(&self, t: GType) -> usize {
        self.gates.iter().filter(|g| g.t == t).count()
    }

    pub fn push(&mut self, g: Gate) {
        self.gates.push_back(g);
    }

    /// Appends a gate given by its QASM name.
    pub fn add_gate(&mut self, name: &str, qs: Vec<usize>) -> Result<()> {
        self.add_gate_with_params(name, qs, vec![])
    }

    pub fn add_gate_with_params(
        &mut self,
        name: &str,
        qs: Vec<usize>,
        params: Vec<f64>,
    ) -> Result<()> {
        let t = GType::from_qasm_name(name)
            .ok_or_else(|| QError::InvalidOperator(format!("unknown gate '{name}'")))?;
        self.push(Gate::new_with_params(t, qs, params));
        Ok(())
    }

    /// Appends all gates of `other`, sending its qubit `i` to `qubits[i]`.
    pub fn append_on(&mut self, other: &Circuit, qubits: &[usize]) -> Result<()> {
        if qubits.len() != other.num_qubits() {
            return Err(QError::DimensionMismatch {
                expected: other.num_qubits(),
                found: qubits.len(),
            });
        }
        check_qubits(qubits, self.nqubits)?;
        other.check()?;
        for g in &other.gates {
            let mut g = g.clone();
            for q in &mut g.qs {
                *q = qubits[*q];
            }
            self.push(g);
        }
        Ok(())
    }

    /// Appends all gates of a circuit of the same width.
    pub fn append(&mut self, other: &Circuit) -> Result<()> {
        let qubits: Vec<usize> = (0..other.num_qubits()).collect();
        self.append_on(other, &qubits)
    }

    pub fn reverse(&mut self) {
        self.gates.make_contiguous().reverse();
    }

    pub fn adjoint(&mut self) {
        self.reverse();
        for g in &mut self.gates {
            g.adjoint();
        }
    }

    pub fn to_adjoint(&self) -> Circuit {
        let mut c = self.clone();
        c.adjoint();
        c
    }

    /// Checks every gate's arity and qubit indices against this circuit.
    pub fn check(&self) -> Result<()> {
        for g in &self.gates {
            g.check()?;
            check_qubits(&g.qs, self.nqubits)?;
        }
        Ok(())
    }

    /// The operator implemented by the circuit.
    ///
    /// Built as `g0.compose(g1).compose(g2)...`, so the first gate applied is
    /// the rightmost factor: `U = g_{m-1} · ... · g1 · g0`.
    pub fn to_operator(&self) -> Result<Operator> {
        self.check()?;
        let mut u = Operator::identity(self.nqubits)?;
        for g in &self.gates {
            u = u.compose(&embed(&g.operator()?, &g.qs, self.nqubits)?)?;
        }
        Ok(u)
    }

    pub fn to_qasm(&self) -> String {
        String::from("OPENQASM 2.0;\ninclude \"qelib1.inc\";\n") + &self.to_string()
    }

    fn from_qasm_parser(read: impl FnOnce(&mut openqasm::Parser)) -> Result<Circuit> {
        let mut cache = openqasm::SourceCache::new();
        let mut parser = openqasm::Parser::new(&mut cache)
            .with_file_policy(openqasm::parser::FilePolicy::Ignore);
        read(&mut parser);
        parser.parse_source::<String>(
            "
            opaque x q;
            opaque y q;
            opaque z q;
            opaque h q;
            opaque s q;
            opaque sdg q;
            opaque t q;
            opaque tdg q;
            opaque rx(theta) q;
            opaque ry(theta) q;
            opaque rz(theta) q;
            opaque p(lambda) q;
            opaque u1(lambda) q;
            opaque u(theta, phi, lambda) q;
            opaque u3(theta, phi, lambda) q;
            opaque cx a, b;
            opaque cz a, b;
            opaque swap a, b;
            opaque ccx a, b, c;
            opaque ccz a, b, c;
        "
            .to_string(),
            None,
        );

        let program = parser.done().to_errors().map_err(|e| QError::QasmParse(e.to_string()))?;
        program.type_check().to_errors().map_err(|e| QError::QasmParse(e.to_string()))?;

        let mut writer = CircuitWriter {
            circuit: Circuit::new(0),
        };
        let mut linearize = openqasm::Linearize::new(&mut writer, usize::MAX);
        linearize
            .visit_program(&program)
            .to_errors()
            .map_err(|e| QError::QasmParse(e.to_string()))?;

        log::debug!(
            "read {} gates on {} qubits",
            writer.circuit.num_gates(),
            writer.circuit.num_qubits()
        );
        Ok(writer.circuit)
    }

    pub fn from_qasm(source: &str) -> Result<Circuit> {
        Circuit::from_qasm_parser(|parser| parser.parse_source::<String>(source.to_string(), None))
    }

    pub fn from_file(name: &str) -> Result<Circuit> {
        Circuit::from_qasm_parser(|parser| parser.parse_file(name))
    }
}

/// Concatenation. Widths must agree, so the sum is a [Result].
impl std::ops::Add<&Circuit> for &Circuit {
    type Output = Result<Circuit>;
    fn add(self, rhs: &Circuit) -> Self::Output {
        if self.num_qubits() != rhs.num_qubits() {
            return Err(QError::DimensionMismatch {
                expected: self.num_qubits(),
                found: rhs.num_qubits(),
            });
        }
        let mut c = self.clone();
        c.gates.extend(rhs.gates.iter().cloned());
        Ok(c)
    }
}

impl fmt::Display for Circuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "qreg q[{}];", self.num_qubits())?;

        for g in &self.gates {
            writeln!(f, "{};", g.to_qasm())?;
        }

        Ok(())
    }
}

struct CircuitWriter {
    circuit: Circuit,
}

#[derive(Debug)]
#[allow(clippy::enum_variant_names)]
enum CircuitWriterError {
    ResetNotSupported,
    MeasureNotSupported,
    ConditionalNotSupported,
    UnknownGate(String),
}

impl std::fmt::Display for CircuitWriterError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            CircuitWriterError::ResetNotSupported => write!(f, "resets are not supported"),
            CircuitWriterError::MeasureNotSupported => {
                write!(f, "measurements are not supported in gate sequences")
            }
            CircuitWriterError::ConditionalNotSupported => {
                write!(f, "conditionals are not supported in gate sequences")
            }
            CircuitWriterError::UnknownGate(name) => write!(f, "unknown gate '{name}'"),
        }
    }
}

impl std::error::Error for CircuitWriterError {}

/// Angles arrive as `a + b·π` with rational `a` and `b`.
fn value_to_radians(value: &Value) -> f64 {
    let a = *value.a.numer() as f64 / *value.a.denom() as f64;
    let b = *value.b.numer() as f64 / *value.b.denom() as f64;
    a + b * PI
}

impl openqasm::GateWriter for &mut CircuitWriter {
    type Error = CircuitWriterError;

    fn initialize(
        &mut self,
        qubits: &[Symbol],
        _: &[Symbol],
    ) -> std::result::Result<(), Self::Error> {
        self.circuit = Circuit::new(qubits.len());
        Ok(())
    }

    fn write_cx(&mut self, a: usize, b: usize) -> std::result::Result<(), Self::Error> {
        self.circuit.push(Gate::new(CNOT, vec![a, b]));
        Ok(())
    }

    fn write_opaque(
        &mut self,
        name: &Symbol,
        params: &[Value],
        regs: &[usize],
    ) -> std::result::Result<(), Self::Error> {
        let t = GType::from_qasm_name(name.as_str())
            .ok_or_else(|| CircuitWriterError::UnknownGate(name.as_str().to_string()))?;
        let params = params.iter().map(value_to_radians).collect();
        self.circuit
            .push(Gate::new_with_params(t, regs.to_vec(), params));
        Ok(())
    }

    fn write_u(
        &mut self,
        theta: Value,
        phi: Value,
        lambda: Value,
        reg: usize,
    ) -> std::result::Result<(), Self::Error> {
        let params = vec![
            value_to_radians(&theta),
            value_to_radians(&phi),
            value_to_radians(&lambda),
        ];
        self.circuit.push(Gate::new_with_params(U, vec![reg], params));
        Ok(())
    }

    // barriers only matter to optimisers; a gate sequence has nothing to fence
    fn write_barrier(&mut self, _: &[usize]) -> std::result::Result<(), Self::Error> {
        Ok(())
    }

    fn write_reset(&mut self, _: usize) -> std::result::Result<(), Self::Error> {
        Err(CircuitWriterError::ResetNotSupported)
    }

    fn write_measure(&mut self, _: usize, _: usize) -> std::result::Result<(), Self::Error> {
        Err(CircuitWriterError::MeasureNotSupported)
    }

    fn start_conditional(
        &mut self,
        _: usize,
        _: usize,
        _: u64,
    ) -> std::result::Result<(), Self::Error> {
        Err(CircuitWriterError::ConditionalNotSupported)
    }

    fn end_conditional(&mut self) -> std::result::Result<(), Self::Error> {
        Err(CircuitWriterError::ConditionalNotSupported)
    }
}
