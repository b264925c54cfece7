// -*- mode: rust; -*-
//
// This file is part of x25519-kex.
// See LICENSE for licensing information.

//! Benchmark the Diffie-Hellman operation.

use criterion::{criterion_group, criterion_main, Criterion};

use x25519_kex::EphemeralSecret;
use x25519_kex::PublicKey;

fn bench_diffie_hellman(c: &mut Criterion) {
    let bob_secret = EphemeralSecret::random();
    let bob_public = PublicKey::from(&bob_secret);

    c.bench_function("diffie_hellman", move |b| {
        b.iter_with_setup(
            EphemeralSecret::random,
            |alice_secret| alice_secret.diffie_hellman(&bob_public),
        )
    });
}

fn bench_pubkey_constructor(c: &mut Criterion) {
    let bob_secret = EphemeralSecret::random();

    c.bench_function("PublicKey::from", move |b| {
        b.iter(|| PublicKey::from(&bob_secret))
    });
}

criterion_group! {
    name = x25519_benches;
    config = Criterion::default();
    targets =
        bench_diffie_hellman,
        bench_pubkey_constructor,
}
criterion_main! {
    x25519_benches,
}
