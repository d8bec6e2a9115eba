use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use ketlab::circuit::Circuit;
use ketlab::evolve::{evolve, evolve_circuit};
use ketlab::measure::sample;
use ketlab::StateVector;
use rand::rngs::SmallRng;
use rand::SeedableRng;

/// Hadamards on every qubit followed by a CNOT ladder, `layers` times.
fn layered_circuit(nqubits: usize, layers: usize) -> Circuit {
    let mut c = Circuit::new(nqubits);
    for _ in 0..layers {
        for q in 0..nqubits {
            c.add_gate("h", vec![q]).unwrap();
            c.add_gate_with_params("rz", vec![q], vec![0.1 * q as f64]).unwrap();
        }
        for q in 1..nqubits {
            c.add_gate("cx", vec![q - 1, q]).unwrap();
        }
    }
    c
}

fn benchmark_evolution(c: &mut Criterion) {
    for n in [4, 8, 12] {
        let circ = layered_circuit(n, 4);
        let zero = StateVector::zero(n).unwrap();
        c.bench_function(&format!("evolve_circuit_{n}_qubits"), |b| {
            b.iter(|| std::hint::black_box(evolve_circuit(&zero, &circ).unwrap()));
        });
    }

    let circ = layered_circuit(6, 4);
    let zero = StateVector::zero(6).unwrap();
    c.bench_function("to_operator_then_evolve_6_qubits", |b| {
        b.iter(|| {
            let u = circ.to_operator().unwrap();
            std::hint::black_box(evolve(&zero, &u).unwrap())
        });
    });
}

fn benchmark_sampling(c: &mut Criterion) {
    let state = evolve_circuit(&StateVector::zero(10).unwrap(), &layered_circuit(10, 2)).unwrap();
    c.bench_function("sample_10_qubits_10000_shots", |b| {
        b.iter_batched_ref(
            || SmallRng::seed_from_u64(0),
            |rng| std::hint::black_box(sample(&state, 10_000, rng).unwrap()),
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(benches, benchmark_evolution, benchmark_sampling);
criterion_main!(benches);
