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

//! Superdense coding: two classical bits sent through one qubit of a shared
//! ebit.

use ketlab::circuit::Circuit;
use ketlab::evolve::evolve_circuit;
use ketlab::gate::*;
use ketlab::measure::{measure, sample, Counts, Outcome};
use ketlab::registers::StateBuilder;
use ketlab::{Result, StateVector};
use rand::Rng;

/// The protocol circuit on two qubits. Alice holds qubit 0, Bob qubit 1.
fn protocol(a: bool, b: bool) -> Result<Circuit> {
    let mut c = Circuit::new(2);
    c.add_gate("h", vec![0])?;
    c.add_gate("cx", vec![0, 1])?;

    if b {
        c.add_gate("z", vec![0])?;
    }
    if a {
        c.add_gate("x", vec![0])?;
    }

    c.add_gate("cx", vec![0, 1])?;
    c.add_gate("h", vec![0])?;
    Ok(c)
}

/// Alice's bits come from measuring a randomiser qubit twice; Bob decodes
/// them again. Outcome strings read `Bob a, Bob b, Alice a, Alice b`.
fn self_test<R: Rng + ?Sized>(shots: usize, rng: &mut R) -> Result<Counts> {
    let h = HAD.operator()?;
    let cx = CNOT.operator()?;
    let mut counts = Counts::new();
    for _ in 0..shots {
        let cs = StateBuilder::new()
            .register("randomizer", StateVector::zero(1)?)?
            .register("A", StateVector::zero(1)?)?
            .register("B", StateVector::zero(1)?)?
            .build()?
            .evolve_on(&h, &[("A", 0)])?
            .evolve_on(&cx, &[("A", 0), ("B", 0)])?;

        let (alice_a, cs) = cs
            .evolve_on(&h, &[("randomizer", 0)])?
            .measure(&[("randomizer", 0)], rng)?;
        let (alice_b, mut cs) = cs
            .evolve_on(&h, &[("randomizer", 0)])?
            .measure(&[("randomizer", 0)], rng)?;
        let (alice_a, alice_b) = (alice_a.bit(0), alice_b.bit(0));

        if alice_b {
            cs = cs.evolve_on(&Z.operator()?, &[("A", 0)])?;
        }
        if alice_a {
            cs = cs.evolve_on(&NOT.operator()?, &[("A", 0)])?;
        }
        let cs = cs
            .evolve_on(&cx, &[("A", 0), ("B", 0)])?
            .evolve_on(&h, &[("A", 0)])?;

        let m = measure(cs.state(), &cs.resolve(&[("A", 0), ("B", 0)])?, rng)?;
        let (bob_b, bob_a) = (m.outcome.bit(0), m.outcome.bit(1));
        counts.add(&Outcome::new(vec![alice_b, alice_a, bob_b, bob_a]), 1);
    }
    Ok(counts)
}

/// Shots where Bob's bits differ from Alice's.
fn decoding_errors(counts: &Counts) -> usize {
    counts
        .iter()
        .filter(|(k, _)| k[..2] != k[2..])
        .map(|(_, n)| n)
        .sum()
}

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let mut rng = rand::rng();

    for (a, b) in [(false, false), (false, true), (true, false), (true, true)] {
        let c = protocol(a, b)?;
        let s = evolve_circuit(&StateVector::zero(2)?, &c)?;
        let counts = sample(&s, 1000, &mut rng)?;
        println!("sent a = {}, b = {}", a as u8, b as u8);
        for (outcome, n) in counts.iter() {
            println!("  measured {outcome} with frequency {n}");
        }
    }

    let counts = self_test(1000, &mut rng)?;
    println!("\nself-test counts: {counts}");
    println!("decoding errors: {}", decoding_errors(&counts));
    Ok(())
}
