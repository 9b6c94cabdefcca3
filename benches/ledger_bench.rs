//! Ledger Domain Benchmarks — Hot-Path Performance Validation
//!
//! Benchmarks the pure domain functions every deposit and settlement
//! runs through: proportional share math, five-way fee allocation, and
//! the handicap settle rule.
//!
//! Run with: cargo bench --bench ledger_bench

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use equalbets_ledger::domain::fees::HouseEdgeSplit;
use equalbets_ledger::domain::handicap::{Side, settle};
use equalbets_ledger::domain::shares::{amount_for_shares, shares_for_deposit};
use equalbets_ledger::domain::token::UNIT;

/// Benchmark proportional share minting.
fn bench_shares_for_deposit(c: &mut Criterion) {
    c.bench_function("shares_for_deposit", |b| {
        b.iter(|| {
            let _shares = shares_for_deposit(
                black_box(10 * UNIT),
                black_box(20 * UNIT),
                black_box(20 * UNIT),
            );
        });
    });
}

/// Benchmark proportional share redemption.
fn bench_amount_for_shares(c: &mut Criterion) {
    c.bench_function("amount_for_shares", |b| {
        b.iter(|| {
            let _amount = amount_for_shares(
                black_box(10 * UNIT),
                black_box(30 * UNIT),
                black_box(45 * UNIT),
            );
        });
    });
}

/// Benchmark the five-way house-edge allocation.
fn bench_fee_allocation(c: &mut Criterion) {
    let split = HouseEdgeSplit::even();

    c.bench_function("house_edge_allocate", |b| {
        b.iter(|| {
            let _alloc = split.allocate(black_box(UNIT / 5));
        });
    });
}

/// Benchmark the handicap settle rule with a quarter line.
fn bench_settle(c: &mut Criterion) {
    c.bench_function("handicap_settle_quarter_line", |b| {
        b.iter(|| {
            let _outcome = settle(
                black_box(2),
                black_box(1),
                black_box(Some(Side::Home)),
                black_box(25),
            );
        });
    });
}

criterion_group!(
    benches,
    bench_shares_for_deposit,
    bench_amount_for_shares,
    bench_fee_allocation,
    bench_settle
);
criterion_main!(benches);
