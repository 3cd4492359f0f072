//! Benchmarks for repository operations over a JSON file store.
//!
//! Every operation reads (and mutations rewrite) the whole document, so
//! cost grows with collection size. Measured at 100, 1,000 and 10,000 records.

// Criterion macros generate items without docs - this is expected for benchmarks
// Benchmarks use expect/unwrap for simplicity - panics are acceptable in benchmarks
#![allow(missing_docs)]
#![allow(clippy::expect_used, clippy::unwrap_used)]

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use std::time::Duration;
use tempfile::TempDir;

use vehiclestore::{
    ConcurrencyMode, JsonFileStore, NewVehicle, Vehicle, VehicleId, VehiclePatch,
    VehicleRepository,
};

const SIZES: [u64; 3] = [100, 1_000, 10_000];

// ============================================================================
// Helper Functions
// ============================================================================

/// Creates a repository over a document holding `count` vehicles.
fn seeded_repository(temp_dir: &TempDir, count: u64) -> VehicleRepository<JsonFileStore> {
    let categories = ["Sedan", "Luxo", "Truck", "Hatch"];
    let vehicles: Vec<Vehicle> = (1..=count)
        .map(|id| {
            let category = categories[usize::try_from(id).unwrap() % categories.len()];
            Vehicle::from_new(
                VehicleId::new(id),
                NewVehicle::new(format!("Vehicle {id}"), "benchmark fixture", category, true)
                    .with_price(i64::try_from(id).unwrap() * 1_000)
                    .with_license_plate(format!("BEN{id:04}")),
            )
        })
        .collect();

    let path = temp_dir.path().join("vehicles.json");
    let doc = serde_json::json!({ "vehicles": vehicles });
    std::fs::write(&path, serde_json::to_vec(&doc).unwrap()).expect("Failed to seed store");

    VehicleRepository::new(JsonFileStore::new(path), ConcurrencyMode::Serialized)
}

// ============================================================================
// Benchmarks
// ============================================================================

fn bench_reads(c: &mut Criterion) {
    let mut group = c.benchmark_group("repository_reads");
    group.measurement_time(Duration::from_secs(10));

    for count in SIZES {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let repo = seeded_repository(&temp_dir, count);
        group.throughput(Throughput::Elements(count));

        group.bench_with_input(BenchmarkId::new("list_all", count), &count, |b, _| {
            b.iter(|| black_box(repo.list_all().unwrap()));
        });

        group.bench_with_input(BenchmarkId::new("find_by_id", count), &count, |b, &count| {
            let id = VehicleId::new(count / 2);
            b.iter(|| black_box(repo.find_by_id(id).unwrap()));
        });

        group.bench_with_input(
            BenchmarkId::new("find_by_category", count),
            &count,
            |b, _| {
                b.iter(|| black_box(repo.find_by_category("Luxo").unwrap()));
            },
        );
    }

    group.finish();
}

fn bench_mutations(c: &mut Criterion) {
    let mut group = c.benchmark_group("repository_mutations");
    group.measurement_time(Duration::from_secs(10));
    group.sample_size(20);

    for count in SIZES {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let repo = seeded_repository(&temp_dir, count);
        group.throughput(Throughput::Elements(count));

        // Create followed by delete keeps the collection at `count` records.
        group.bench_with_input(
            BenchmarkId::new("create_delete", count),
            &count,
            |b, &count| {
                b.iter(|| {
                    let vehicles = repo
                        .create(NewVehicle::new("Bench", "transient", "Sedan", true))
                        .unwrap();
                    black_box(vehicles.len());
                    repo.delete(VehicleId::new(count + 1)).unwrap()
                });
            },
        );

        group.bench_with_input(
            BenchmarkId::new("partial_update", count),
            &count,
            |b, &count| {
                let id = VehicleId::new(count / 2);
                let mut active = false;
                b.iter(|| {
                    active = !active;
                    black_box(
                        repo.partial_update(id, VehiclePatch::new().with_active(active))
                            .unwrap(),
                    )
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_reads, bench_mutations);
criterion_main!(benches);
