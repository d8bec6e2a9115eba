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

//! Projective measurement in the computational basis.
//!
//! [measure] draws a single outcome and collapses the state. [sample] draws
//! many outcomes from the same distribution and leaves the state alone, the
//! way a backend reports shot counts.

use itertools::Itertools;
use ndarray::prelude::*;
use num::complex::Complex64;
use rand::distr::weighted::WeightedIndex;
use rand::distr::Distribution;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{check_qubits, QError, Result};
use crate::state::StateVector;

/// Outcome probabilities below this are treated as exactly zero, so that
/// rounding noise from cancelling amplitudes is never reported.
pub const PROBABILITY_CUTOFF: f64 = 1e-12;

/// The classical result of measuring a list of qubits.
///
/// `bits()[j]` is the result for the `j`-th measured qubit. The string form
/// lists the last measured qubit first, so measuring `[0, 1, 2]` prints as
/// `q2 q1 q0`, matching ket labels.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Outcome {
    bits: Vec<bool>,
}

impl Outcome {
    pub fn new(bits: Vec<bool>) -> Outcome {
        Outcome { bits }
    }

    /// Unpacks the low `len` bits of `index`, bit `j` going to position `j`.
    pub fn from_index(index: usize, len: usize) -> Outcome {
        Outcome {
            bits: (0..len).map(|j| (index >> j) & 1 == 1).collect(),
        }
    }

    pub fn to_index(&self) -> usize {
        self.bits
            .iter()
            .enumerate()
            .fold(0, |acc, (j, &b)| acc | ((b as usize) << j))
    }

    pub fn bits(&self) -> &[bool] {
        &self.bits
    }

    /// The result for the `j`-th measured qubit.
    pub fn bit(&self, j: usize) -> bool {
        self.bits[j]
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in self.bits.iter().rev() {
            write!(f, "{}", if b { '1' } else { '0' })?;
        }
        Ok(())
    }
}

#[derive(Debug, derive_more::Display)]
#[display("'{_0}' is not a valid bit. Expected sequence of 0s and 1s.")]
pub struct OutcomeParseError(char);

impl std::error::Error for OutcomeParseError {}

impl FromStr for Outcome {
    type Err = OutcomeParseError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut bits = s
            .chars()
            .map(|c| match c {
                '0' => Ok(false),
                '1' => Ok(true),
                _ => Err(OutcomeParseError(c)),
            })
            .collect::<std::result::Result<Vec<bool>, _>>()?;
        bits.reverse();
        Ok(Outcome { bits })
    }
}

/// A single collapsing measurement.
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    pub outcome: Outcome,
    /// Probability the outcome had before the measurement.
    pub probability: f64,
    /// The post-measurement state on all qubits, renormalised.
    pub state: StateVector,
    qubits: Vec<usize>,
}

impl Measurement {
    /// The qubits that were measured, in request order.
    pub fn qubits(&self) -> &[usize] {
        &self.qubits
    }

    /// The post-measurement state with the measured qubits removed.
    ///
    /// The unmeasured qubits keep their relative order and are renumbered
    /// from 0.
    pub fn remaining(&self) -> StateVector {
        let n = self.state.num_qubits();
        let kept: Vec<usize> = (0..n).filter(|q| !self.qubits.contains(q)).collect();
        let fixed = self
            .qubits
            .iter()
            .zip(self.outcome.bits())
            .fold(0, |acc, (&q, &b)| acc | ((b as usize) << q));
        let amps = Array1::from_shape_fn(1 << kept.len(), |r| {
            let full = kept
                .iter()
                .enumerate()
                .fold(fixed, |acc, (j, &q)| acc | (((r >> j) & 1) << q));
            self.state[full]
        });
        StateVector::from_array_unchecked(amps)
    }
}

/// Outcome frequencies over a number of shots, keyed by outcome string.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Counts(BTreeMap<String, usize>);

impl Counts {
    pub fn new() -> Counts {
        Counts::default()
    }

    /// Adds `n` observations of `outcome`.
    pub fn add(&mut self, outcome: &Outcome, n: usize) {
        *self.0.entry(outcome.to_string()).or_insert(0) += n;
    }

    /// Frequency of an outcome string, zero if it was never observed.
    pub fn get(&self, outcome: &str) -> usize {
        self.0.get(outcome).copied().unwrap_or(0)
    }

    /// Total number of shots.
    pub fn total(&self) -> usize {
        self.0.values().sum()
    }

    /// Number of distinct outcomes observed.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> + '_ {
        self.0.iter().map(|(k, &v)| (k.as_str(), v))
    }

    /// Restricts the counts to some positions of the outcome.
    ///
    /// `positions` are indices into [Outcome::bits], i.e. counted from the
    /// right-hand end of the outcome string.
    pub fn marginal(&self, positions: &[usize]) -> Result<Counts> {
        let mut m = Counts::new();
        for (key, n) in self.iter() {
            let outcome: Outcome = key
                .parse()
                .map_err(|e: OutcomeParseError| QError::InvalidState(e.to_string()))?;
            check_qubits(positions, outcome.len())?;
            let bits = positions.iter().map(|&p| outcome.bit(p)).collect();
            m.add(&Outcome::new(bits), n);
        }
        Ok(m)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl fmt::Display for Counts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{{}}}",
            self.iter().map(|(k, v)| format!("'{k}': {v}")).join(", ")
        )
    }
}

/// Probability of each joint outcome of `qubits`, indexed as in
/// [Outcome::to_index].
pub fn marginal_probabilities(state: &StateVector, qubits: &[usize]) -> Result<Vec<f64>> {
    check_qubits(qubits, state.num_qubits())?;
    let mut probs = vec![0.0; 1 << qubits.len()];
    for (i, a) in state.amplitudes().iter().enumerate() {
        probs[local_index(i, qubits)] += a.norm_sqr();
    }
    for p in &mut probs {
        if *p < PROBABILITY_CUTOFF {
            *p = 0.0;
        }
    }
    Ok(probs)
}

/// The outcome index of `qubits` that basis state `i` is consistent with.
fn local_index(i: usize, qubits: &[usize]) -> usize {
    qubits
        .iter()
        .enumerate()
        .fold(0, |acc, (j, &q)| acc | (((i >> q) & 1) << j))
}

fn distribution(probs: &[f64]) -> Result<WeightedIndex<f64>> {
    WeightedIndex::new(probs).map_err(|_| QError::EmptyState)
}

/// Measures `qubits`, drawing the outcome with `rng`, and collapses the
/// state onto it.
pub fn measure<R: Rng + ?Sized>(
    state: &StateVector,
    qubits: &[usize],
    rng: &mut R,
) -> Result<Measurement> {
    let probs = marginal_probabilities(state, qubits)?;
    let idx = distribution(&probs)?.sample(rng);
    let probability = probs[idx];
    let scale = probability.sqrt();

    let amps = state
        .amplitudes()
        .iter()
        .enumerate()
        .map(|(i, a)| {
            if local_index(i, qubits) == idx {
                *a / scale
            } else {
                Complex64::new(0.0, 0.0)
            }
        })
        .collect::<Array1<_>>();

    let outcome = Outcome::from_index(idx, qubits.len());
    log::debug!("measured qubits {qubits:?}: {outcome} (p = {probability:.6})");
    Ok(Measurement {
        outcome,
        probability,
        state: StateVector::from_array_unchecked(amps),
        qubits: qubits.to_vec(),
    })
}

/// Measures every qubit, qubit 0 first.
pub fn measure_all<R: Rng + ?Sized>(state: &StateVector, rng: &mut R) -> Result<Measurement> {
    let qubits: Vec<usize> = (0..state.num_qubits()).collect();
    measure(state, &qubits, rng)
}

/// Draws `shots` outcomes over all qubits from one distribution.
///
/// The state is not collapsed between draws. Counts always sum to `shots`
/// and only outcomes with nonzero probability appear.
pub fn sample<R: Rng + ?Sized>(state: &StateVector, shots: usize, rng: &mut R) -> Result<Counts> {
    let qubits: Vec<usize> = (0..state.num_qubits()).collect();
    sample_qubits(state, &qubits, shots, rng)
}

/// Like [sample], but only over the given qubits.
pub fn sample_qubits<R: Rng + ?Sized>(
    state: &StateVector,
    qubits: &[usize],
    shots: usize,
    rng: &mut R,
) -> Result<Counts> {
    let probs = marginal_probabilities(state, qubits)?;
    let dist = distribution(&probs)?;

    let mut freq = vec![0usize; probs.len()];
    for _ in 0..shots {
        freq[dist.sample(rng)] += 1;
    }

    let mut counts = Counts::new();
    for (idx, &n) in freq.iter().enumerate() {
        if n > 0 {
            counts.add(&Outcome::from_index(idx, qubits.len()), n);
        }
    }
    log::debug!("{shots} shots over qubits {qubits:?}: {counts}");
    Ok(counts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;
    use rstest::{fixture, rstest};
    use std::f64::consts::FRAC_1_SQRT_2;

    #[fixture]
    fn rng() -> SmallRng {
        SmallRng::seed_from_u64(1234)
    }

    fn w_state() -> StateVector {
        let t = 1.0 / 3f64.sqrt();
        StateVector::from_real(&[0.0, t, t, 0.0, t, 0.0, 0.0, 0.0]).unwrap()
    }

    #[test]
    fn outcome_strings() {
        let o = Outcome::new(vec![true, false, false]);
        assert_eq!(o.to_string(), "001");
        assert_eq!(o.to_index(), 1);
        assert_eq!("001".parse::<Outcome>().unwrap(), o);
        assert_eq!(Outcome::from_index(6, 3).to_string(), "110");
        assert_eq!(
            "0a".parse::<Outcome>().unwrap_err().to_string(),
            "'a' is not a valid bit. Expected sequence of 0s and 1s."
        );
    }

    #[rstest]
    fn equal_superposition(mut rng: SmallRng) {
        let s = StateVector::from_real(&[FRAC_1_SQRT_2, FRAC_1_SQRT_2]).unwrap();
        let counts = sample(&s, 1000, &mut rng).unwrap();
        assert_eq!(counts.total(), 1000);
        assert!((450..=550).contains(&counts.get("0")), "{counts}");
        assert!((450..=550).contains(&counts.get("1")), "{counts}");
    }

    #[rstest]
    fn counts_sum_to_shots(mut rng: SmallRng, #[values(0, 1, 7, 100, 4000)] shots: usize) {
        let counts = sample(&w_state(), shots, &mut rng).unwrap();
        assert_eq!(counts.total(), shots);
        for (k, _) in counts.iter() {
            assert!(["001", "010", "100"].contains(&k), "unexpected outcome {k}");
        }
    }

    #[rstest]
    fn measure_w_qubit_0(mut rng: SmallRng) {
        let w = w_state();
        for _ in 0..20 {
            let m = measure(&w, &[0], &mut rng).unwrap();
            assert!(m.state.is_valid());
            if m.outcome.bit(0) {
                assert_abs_diff_eq!(m.probability, 1.0 / 3.0, epsilon = 1e-12);
                let collapsed = StateVector::from_label("001").unwrap();
                assert_abs_diff_eq!(m.state, collapsed, epsilon = 1e-12);
                let rest = StateVector::from_label("00").unwrap();
                assert_abs_diff_eq!(m.remaining(), rest, epsilon = 1e-12);
            } else {
                assert_abs_diff_eq!(m.probability, 2.0 / 3.0, epsilon = 1e-12);
                let expected =
                    StateVector::from_real(&[0.0, FRAC_1_SQRT_2, FRAC_1_SQRT_2, 0.0]).unwrap();
                assert_abs_diff_eq!(m.remaining(), expected, epsilon = 1e-12);
                assert_abs_diff_eq!(m.state[2].re, FRAC_1_SQRT_2, epsilon = 1e-12);
                assert_eq!(m.state[1], Complex64::new(0.0, 0.0));
            }
        }
    }

    #[rstest]
    fn measure_is_deterministic_on_basis_states(mut rng: SmallRng) {
        let s = StateVector::from_label("10").unwrap();
        let m = measure_all(&s, &mut rng).unwrap();
        assert_eq!(m.outcome.to_string(), "10");
        assert_eq!(m.probability, 1.0);
        assert_eq!(m.state, s);
        assert_eq!(m.remaining().num_qubits(), 0);
        assert_eq!(m.qubits(), &[0, 1]);
    }

    #[rstest]
    fn measure_subset_order(mut rng: SmallRng) {
        // |q2 q1 q0> = |110>, measure [2, 0]: bits are [1, 0], printed "01"
        let s = StateVector::from_label("110").unwrap();
        let m = measure(&s, &[2, 0], &mut rng).unwrap();
        assert_eq!(m.outcome.bits(), &[true, false]);
        assert_eq!(m.outcome.to_string(), "01");
        assert_eq!(m.remaining(), StateVector::from_label("1").unwrap());
    }

    #[rstest]
    fn measurement_leaves_input(mut rng: SmallRng) {
        let s = StateVector::from_label("+").unwrap();
        let _ = measure(&s, &[0], &mut rng).unwrap();
        assert_eq!(s, StateVector::from_label("+").unwrap());
    }

    #[rstest]
    fn bad_qubits(mut rng: SmallRng) {
        let s = StateVector::zero(2).unwrap();
        assert!(measure(&s, &[2], &mut rng).unwrap_err().is_invalid_qubit_index());
        assert_eq!(measure(&s, &[0, 0], &mut rng), Err(QError::DuplicateQubit(0)));
        assert!(sample_qubits(&s, &[5], 10, &mut rng).is_err());
    }

    #[test]
    fn zero_weight_is_empty() {
        assert!(matches!(
            distribution(&[0.0, 0.0]),
            Err(QError::EmptyState)
        ));
    }

    #[rstest]
    fn marginal_sampling(mut rng: SmallRng) {
        let probs = marginal_probabilities(&w_state(), &[2]).unwrap();
        assert_abs_diff_eq!(probs[0], 2.0 / 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(probs[1], 1.0 / 3.0, epsilon = 1e-12);

        let counts = sample_qubits(&w_state(), &[2], 300, &mut rng).unwrap();
        assert_eq!(counts.total(), 300);
        assert_eq!(counts.len(), 2);
    }

    #[test]
    fn cancelled_amplitudes_are_dropped() {
        let s = StateVector::new(vec![
            Complex64::new(1.0, 0.0),
            Complex64::new(1e-9, 0.0),
        ])
        .unwrap();
        let probs = marginal_probabilities(&s, &[0]).unwrap();
        assert_eq!(probs[1], 0.0);
    }

    #[test]
    fn counts_marginal_and_json() {
        let mut c = Counts::new();
        c.add(&"101".parse().unwrap(), 3);
        c.add(&"001".parse().unwrap(), 2);
        c.add(&"110".parse().unwrap(), 5);
        let top = c.marginal(&[2]).unwrap();
        assert_eq!(top.get("1"), 8);
        assert_eq!(top.get("0"), 2);
        assert!(c.marginal(&[3]).is_err());

        assert_eq!(c.to_json().unwrap(), r#"{"001":2,"101":3,"110":5}"#);
        let back: Counts = serde_json::from_str(&c.to_json().unwrap()).unwrap();
        assert_eq!(back, c);
        assert_eq!(c.to_string(), "{'001': 2, '101': 3, '110': 5}");
    }
}
