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

//! A walk through single and multi-qubit states, operators and measurement.

use ketlab::circuit::Circuit;
use ketlab::evolve::{evolve, evolve_circuit};
use ketlab::gate::*;
use ketlab::measure::{measure, sample};
use ketlab::{Operator, StateVector};
use num::complex::Complex64;
use std::f64::consts::FRAC_1_SQRT_2;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let mut rng = rand::rng();

    println!("== single qubits ==");
    let u = StateVector::from_real(&[FRAC_1_SQRT_2, FRAC_1_SQRT_2])?;
    let v = StateVector::new(vec![
        Complex64::new(1.0 / 3.0, 2.0 / 3.0),
        Complex64::new(-2.0 / 3.0, 0.0),
    ])?;
    println!("u = {u}");
    println!("v = {v}");
    match StateVector::from_real(&[1.0 / 3.0, 2.0 / 3.0]) {
        Ok(w) => println!("w = {w}"),
        Err(e) => println!("w is rejected: {e}"),
    }

    let m = measure(&v, &[0], &mut rng)?;
    println!("measuring v gave {} (p = {:.4})", m.outcome, m.probability);
    println!("1000 samples of v: {}", sample(&v, 1000, &mut rng)?);

    println!("\n== operators ==");
    let h = Operator::from_real_rows(&[
        &[FRAC_1_SQRT_2, FRAC_1_SQRT_2],
        &[FRAC_1_SQRT_2, -FRAC_1_SQRT_2],
    ])?;
    let t = T.operator()?;
    let z = Z.operator()?;
    println!("H =\n{h}");

    let mut s = StateVector::zero(1)?;
    for op in [&h, &t, &h, &t, &z] {
        s = evolve(&s, op)?;
    }
    println!("ZTHTH|0⟩ = {s}");

    let mut circ = Circuit::new(1);
    for name in ["h", "t", "h", "t", "z"] {
        circ.add_gate(name, vec![0])?;
    }
    print!("as a circuit:\n{circ}");
    let s = evolve_circuit(&StateVector::zero(1)?, &circ)?;
    println!("gives {s}");
    println!("4000 samples: {}", sample(&s, 4000, &mut rng)?);

    println!("\n== multiple qubits ==");
    let zero = StateVector::from_label("0")?;
    let one = StateVector::from_label("1")?;
    println!("|0⟩⊗|1⟩ = {}", zero.tensor(&one)?);

    let plus = StateVector::from_label("+")?;
    let i_state = StateVector::from_label("r")?;
    let psi = plus.tensor(&i_state)?;
    println!("psi = {psi}");

    let x = NOT.operator()?;
    let id = Operator::identity(1)?;
    println!("(I⊗X) psi = {}", evolve(&psi, &id.tensor(&x)?)?);

    let cnot = Operator::from_real_rows(&[
        &[1.0, 0.0, 0.0, 0.0],
        &[0.0, 1.0, 0.0, 0.0],
        &[0.0, 0.0, 0.0, 1.0],
        &[0.0, 0.0, 1.0, 0.0],
    ])?;
    println!("CNOT psi = {}", evolve(&psi, &cnot)?);

    let third = 1.0 / 3f64.sqrt();
    let w = StateVector::from_real(&[0.0, third, third, 0.0, third, 0.0, 0.0, 0.0])?;
    println!("W = {w}");
    let m = measure(&w, &[0], &mut rng)?;
    println!("measured qubit 0: {}, state after measurement: {}", m.outcome, m.state);

    Ok(())
}
