//! # Warp Relay Benchmarks
//!
//! | Component | Operation | Target |
//! |-----------|-----------|--------|
//! | wr-01 Signing Backend | `get_signature` cache hit | < 10µs |
//! | wr-01 Signing Backend | `get_signature` cache miss (load + sign) | < 2ms |
//! | wr-02 Relay | `combine_shares` over a 100-validator quorum | < 10ms |
//! | wr-02 Relay | arena `record` per share (below threshold) | < 5µs |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::Rng;
use shared_crypto::BlsKeyPair;
use shared_types::{SignatureShare, UnsignedMessage, ValidatorIndex};
use std::collections::BTreeMap;
use std::time::Duration;
use wr_01_signing_backend::test_utils::{DESTINATION_CHAIN, SOURCE_CHAIN};
use wr_01_signing_backend::{BlsWarpSigner, InMemoryMessageStore, SigningBackend, WarpBackend};
use wr_02_relay::{combine_shares, AggregationArena, AggregatorConfig, ShareEvent};

fn random_message(rng: &mut impl Rng) -> UnsignedMessage {
    let mut payload = vec![0u8; 256];
    rng.fill(payload.as_mut_slice());
    UnsignedMessage::new(SOURCE_CHAIN, DESTINATION_CHAIN, payload).expect("payload within limit")
}

// ============================================================================
// WR-01: Signing Backend
// ============================================================================

fn bench_signing_backend(c: &mut Criterion) {
    let mut group = c.benchmark_group("wr-01-signing-backend");
    group.measurement_time(Duration::from_secs(10));

    let mut rng = rand::thread_rng();
    let backend = SigningBackend::new(
        InMemoryMessageStore::new(),
        BlsWarpSigner::new(BlsKeyPair::generate(), SOURCE_CHAIN),
        1024,
    );
    let message = random_message(&mut rng);
    backend.add_message(&message).expect("add message");
    let id = message.id();

    group.bench_function("get_signature_cache_hit", |b| {
        b.iter(|| black_box(backend.get_signature(&id).expect("share")))
    });

    group.bench_function("get_signature_cache_miss", |b| {
        b.iter(|| {
            backend.clear_cache();
            black_box(backend.get_signature(&id).expect("share"))
        })
    });

    group.bench_function("add_message", |b| {
        b.iter_batched(
            || random_message(&mut rng),
            |message| backend.add_message(&message).expect("add message"),
            criterion::BatchSize::SmallInput,
        )
    });

    group.finish();
}

// ============================================================================
// WR-02: Share Combination
// ============================================================================

fn bench_combine_shares(c: &mut Criterion) {
    let mut group = c.benchmark_group("wr-02-combine-shares");
    let message = random_message(&mut rand::thread_rng());

    for size in [4u32, 16, 67, 100] {
        let shares: BTreeMap<ValidatorIndex, SignatureShare> = (0..size)
            .map(|i| {
                let share = BlsKeyPair::generate().sign(message.bytes()).to_bytes();
                (ValidatorIndex(i), SignatureShare::new(share))
            })
            .collect();

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("combine", size), &shares, |b, shares| {
            b.iter(|| black_box(combine_shares(shares, size as usize).expect("combine")))
        });
    }

    group.finish();
}

// ============================================================================
// WR-02: Aggregation Arena
// ============================================================================

fn bench_arena_record(c: &mut Criterion) {
    let mut group = c.benchmark_group("wr-02-arena");
    let mut rng = rand::thread_rng();

    for messages in [100usize, 1_000] {
        // Threshold is never reached, so every record stays on the bookkeeping path
        let events: Vec<ShareEvent> = (0..messages)
            .flat_map(|_| {
                let id = random_message(&mut rng).id();
                (0..3).map(move |v| ShareEvent {
                    message_id: id,
                    validator: ValidatorIndex(v),
                    share: SignatureShare::new([0u8; 96]),
                })
            })
            .collect();
        let config = AggregatorConfig {
            threshold: 4,
            validator_count: 5,
            expected_messages: messages,
        };

        group.throughput(Throughput::Elements(events.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("record_below_threshold", messages),
            &events,
            |b, events| {
                b.iter(|| {
                    let mut arena = AggregationArena::new(&config);
                    for event in events {
                        black_box(arena.record(*event));
                    }
                })
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_signing_backend,
    bench_combine_shares,
    bench_arena_record,
);

criterion_main!(benches);
