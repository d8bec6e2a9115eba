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

//! Quantum teleportation, first of a random qubit state and then as a
//! self-check through an auxiliary qubit, repeated over many shots.

use ketlab::evolve::evolve;
use ketlab::gate::*;
use ketlab::measure::{measure, Counts, Outcome};
use ketlab::registers::{CompositeState, StateBuilder};
use ketlab::{Result, StateVector};
use rand::Rng;
use std::f64::consts::PI;

/// Shares an ebit between `A` and `B`, then runs Alice's half of the
/// protocol on `Q` and `A`.
fn alice(cs: &CompositeState) -> Result<CompositeState> {
    let h = HAD.operator()?;
    let cx = CNOT.operator()?;
    cs.evolve_on(&h, &[("A", 0)])?
        .evolve_on(&cx, &[("A", 0), ("B", 0)])?
        .evolve_on(&cx, &[("Q", 0), ("A", 0)])?
        .evolve_on(&h, &[("Q", 0)])
}

/// Bob's corrections, conditioned on Alice's bits.
fn bob(mut cs: CompositeState, a: bool, b: bool) -> Result<CompositeState> {
    if a {
        cs = cs.evolve_on(&NOT.operator()?, &[("B", 0)])?;
    }
    if b {
        cs = cs.evolve_on(&Z.operator()?, &[("B", 0)])?;
    }
    Ok(cs)
}

/// Teleports a random state and returns it with what Bob received.
fn teleport_random_state<R: Rng + ?Sized>(rng: &mut R) -> Result<(StateVector, StateVector)> {
    let angles = vec![
        rng.random::<f64>() * PI,
        rng.random::<f64>() * 2.0 * PI,
        rng.random::<f64>() * 2.0 * PI,
    ];
    let u = Gate::new_with_params(U, vec![0], angles).operator()?;
    let input = evolve(&StateVector::zero(1)?, &u)?;
    println!("Q = {input}");

    let cs = StateBuilder::new()
        .register("Q", input.clone())?
        .register("A", StateVector::zero(1)?)?
        .register("B", StateVector::zero(1)?)?
        .build()?;
    let cs = alice(&cs)?;

    let m = measure(cs.state(), &cs.resolve(&[("A", 0), ("Q", 0)])?, rng)?;
    let (a, b) = (m.outcome.bit(0), m.outcome.bit(1));
    println!("Alice measured a = {}, b = {}", a as u8, b as u8);

    // only B is left once A and Q are dropped
    let mut received = m.remaining();
    if a {
        received = evolve(&received, &NOT.operator()?)?;
    }
    if b {
        received = evolve(&received, &Z.operator()?)?;
    }
    println!("B = {received}");
    Ok((input, received))
}

/// Entangles `R` with `Q`, teleports `Q` to `B` and checks that `(B, R)` is
/// back in a Bell state. The test bit should always read 0.
fn self_test<R: Rng + ?Sized>(shots: usize, rng: &mut R) -> Result<Counts> {
    let h = HAD.operator()?;
    let cx = CNOT.operator()?;
    let mut counts = Counts::new();
    for _ in 0..shots {
        let cs = StateBuilder::new()
            .register("R", StateVector::zero(1)?)?
            .register("Q", StateVector::zero(1)?)?
            .register("A", StateVector::zero(1)?)?
            .register("B", StateVector::zero(1)?)?
            .build()?
            .evolve_on(&h, &[("R", 0)])?
            .evolve_on(&cx, &[("R", 0), ("Q", 0)])?;

        let (o, cs) = alice(&cs)?.measure(&[("A", 0), ("Q", 0)], rng)?;
        let (a, b) = (o.bit(0), o.bit(1));
        let cs = bob(cs, a, b)?
            .evolve_on(&cx, &[("R", 0), ("B", 0)])?
            .evolve_on(&h, &[("R", 0)])?;
        let (test, _) = cs.measure(&[("R", 0)], rng)?;

        counts.add(&Outcome::new(vec![a, b, test.bit(0)]), 1);
    }
    Ok(counts)
}

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let mut rng = rand::rng();

    let (input, received) = teleport_random_state(&mut rng)?;
    println!("matches Q up to global phase: {}", received.equiv(&input));

    let counts = self_test(1000, &mut rng)?;
    println!("\nself-test counts (test b a): {counts}");
    println!("test result only: {}", counts.marginal(&[2])?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;
    use rstest::rstest;

    #[rstest]
    fn random_states_arrive(#[values(0, 1, 2, 3, 4, 5, 6, 7)] seed: u64) {
        let mut rng = SmallRng::seed_from_u64(seed);
        let (input, received) = teleport_random_state(&mut rng).unwrap();
        assert!(received.equiv(&input), "sent {input}, received {received}");
    }

    #[test]
    fn self_test_always_passes() {
        let mut rng = SmallRng::seed_from_u64(2024);
        let counts = self_test(200, &mut rng).unwrap();
        let test_only = counts.marginal(&[2]).unwrap();
        assert_eq!(test_only.get("0"), 200);
        assert_eq!(test_only.get("1"), 0);
        // Alice's two bits are uniformly random
        assert_eq!(counts.marginal(&[0, 1]).unwrap().len(), 4);
    }
}
