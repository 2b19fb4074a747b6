//! Stress tests for the catalog engine.
//!
//! These tests verify:
//! 1. Every operation agrees with a naive reference model
//! 2. All cross-index invariants hold under long random workloads
//! 3. Determinism is preserved across runs
//! 4. Buckets and categories are pruned as items leave
//!
//! ## Running Stress Tests
//!
//! ```bash
//! # Run all stress tests (release mode recommended)
//! cargo test --release --test stress_test -- --nocapture
//!
//! # Run specific test
//! cargo test --release --test stress_test stress_model_check -- --nocapture
//! ```

use std::collections::BTreeMap;
use std::io::Cursor;
use std::time::Instant;

use aisle_catalog::{Catalog, CategoryId, CommandProcessor, InsertOutcome, ItemId, Price};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

// ============================================================================
// TEST CONSTANTS
// ============================================================================

/// Operations for the main model-check run
const MODEL_OP_COUNT: usize = 200_000;

/// Item ids are drawn from 0..ID_SPACE so updates and deletes hit often
const ID_SPACE: u64 = 5_000;

/// Category ids are drawn from 0..CATEGORY_SPACE
const CATEGORY_SPACE: u64 = 40;

/// Prices are drawn from 0..PRICE_SPACE cents; a small space forces
/// shared buckets
const PRICE_SPACE: u64 = 2_000;

/// Full consistency audit every N operations
const AUDIT_INTERVAL: usize = 5_000;

// ============================================================================
// REFERENCE MODEL
// ============================================================================

/// Naive catalog: a sorted map scanned linearly for every query.
#[derive(Default)]
struct Model {
    items: BTreeMap<ItemId, (Price, Vec<CategoryId>)>,
}

impl Model {
    fn insert(&mut self, id: ItemId, price: Price, categories: Option<&[CategoryId]>) -> InsertOutcome {
        if let Some(entry) = self.items.get_mut(&id) {
            entry.0 = price;
            if let Some(categories) = categories {
                entry.1 = categories.to_vec();
            }
            return InsertOutcome::Updated;
        }

        let categories = categories.unwrap_or(&[]).to_vec();
        self.items.insert(id, (price, categories));
        InsertOutcome::Created
    }

    fn delete(&mut self, id: ItemId) -> u64 {
        self.items
            .remove(&id)
            .map_or(0, |(_, categories)| categories.iter().sum())
    }

    fn find(&self, id: ItemId) -> Option<Price> {
        self.items.get(&id).map(|&(price, _)| price)
    }

    fn prices_in(&self, category: CategoryId) -> impl Iterator<Item = Price> + '_ {
        self.items
            .values()
            .filter(move |(_, categories)| categories.contains(&category))
            .map(|&(price, _)| price)
    }

    fn find_min_price(&self, category: CategoryId) -> Option<Price> {
        self.prices_in(category).min()
    }

    fn find_max_price(&self, category: CategoryId) -> Option<Price> {
        self.prices_in(category).max()
    }

    fn find_price_range(&self, category: CategoryId, lo: Price, hi: Price) -> usize {
        self.prices_in(category)
            .filter(|price| (lo..=hi).contains(price))
            .count()
    }

    fn price_hike(&mut self, lo: ItemId, hi: ItemId, percent: u32) -> u64 {
        if percent == 0 || percent > 100 || lo > hi {
            return 0;
        }
        let mut total = 0;
        for (_, (price, _)) in self.items.range_mut(lo..=hi) {
            let increment = *price * u64::from(percent) / 100;
            *price += increment;
            total += increment;
        }
        total
    }
}

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

fn random_categories(rng: &mut ChaCha8Rng) -> Vec<CategoryId> {
    // Up to 6 so some items spill past the inline table; repeats allowed
    let count = rng.gen_range(1..=6);
    (0..count).map(|_| rng.gen_range(0..CATEGORY_SPACE)).collect()
}

/// Apply one random operation to both the catalog and the model and
/// assert the results agree.
fn step(rng: &mut ChaCha8Rng, catalog: &mut Catalog, model: &mut Model) {
    let id = rng.gen_range(0..ID_SPACE);
    let category = rng.gen_range(0..CATEGORY_SPACE);

    match rng.gen_range(0..100) {
        0..=34 => {
            let price = rng.gen_range(0..PRICE_SPACE);
            let categories = random_categories(rng);
            assert_eq!(
                catalog.insert(id, price, Some(categories.as_slice())),
                model.insert(id, price, Some(categories.as_slice())),
                "insert {id}"
            );
        }
        35..=49 => {
            let price = rng.gen_range(0..PRICE_SPACE);
            assert_eq!(
                catalog.insert(id, price, None),
                model.insert(id, price, None),
                "price update {id}"
            );
        }
        50..=64 => {
            assert_eq!(catalog.delete(id), model.delete(id), "delete {id}");
        }
        65..=74 => {
            assert_eq!(catalog.find(id), model.find(id), "find {id}");
        }
        75..=82 => {
            assert_eq!(
                catalog.find_min_price(category),
                model.find_min_price(category),
                "min {category}"
            );
            assert_eq!(
                catalog.find_max_price(category),
                model.find_max_price(category),
                "max {category}"
            );
        }
        83..=94 => {
            let lo = rng.gen_range(0..PRICE_SPACE * 2);
            let hi = rng.gen_range(0..PRICE_SPACE * 2);
            assert_eq!(
                catalog.find_price_range(category, lo, hi),
                model.find_price_range(category, lo, hi),
                "range {category} [{lo}, {hi}]"
            );
        }
        _ => {
            let hi = id.saturating_add(rng.gen_range(0..50));
            // Occasionally out of range to exercise rejection
            let percent = rng.gen_range(0..=110);
            assert_eq!(
                catalog.price_hike(id, hi, percent),
                model.price_hike(id, hi, percent),
                "hike [{id}, {hi}] {percent}%"
            );
        }
    }
}

/// Run a deterministic operation sequence and return the final state root.
fn run_deterministic_sequence(seed: u64, count: usize) -> [u8; 32] {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut catalog = Catalog::with_capacity(ID_SPACE as usize);
    let mut model = Model::default();

    for _ in 0..count {
        step(&mut rng, &mut catalog, &mut model);
    }

    catalog.compute_state_root()
}

// ============================================================================
// STRESS TESTS
// ============================================================================

/// Main stress test: random workload checked against the reference model.
///
/// # Verification
/// - Every operation result matches the model
/// - Periodic full consistency audits pass
/// - Final item count and per-category extremes match the model
#[test]
fn stress_model_check() {
    println!("\n=== STRESS TEST: Model Check ===\n");

    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let mut catalog = Catalog::with_capacity(ID_SPACE as usize);
    let mut model = Model::default();

    let start = Instant::now();
    for i in 0..MODEL_OP_COUNT {
        step(&mut rng, &mut catalog, &mut model);

        if i % AUDIT_INTERVAL == 0 {
            if let Err(err) = catalog.check_consistency() {
                panic!("consistency audit failed after {i} operations: {err}");
            }
        }
    }
    let elapsed = start.elapsed();

    catalog.check_consistency().unwrap();
    assert_eq!(catalog.len(), model.items.len());
    for category in 0..CATEGORY_SPACE {
        assert_eq!(catalog.find_min_price(category), model.find_min_price(category));
        assert_eq!(catalog.find_max_price(category), model.find_max_price(category));
    }

    println!("=== RESULTS ===");
    println!("  Operations:        {:>12}", MODEL_OP_COUNT);
    println!("  Final items:       {:>12}", catalog.len());
    println!("  Categories:        {:>12}", catalog.category_count());
    println!("  Elapsed time:      {:>12.2?}", elapsed);
    println!("  State root:        {}", catalog.state_root_hex());

    println!("\n=== MODEL CHECK PASSED ===\n");
}

/// Verify determinism: Same sequence produces identical state root.
#[test]
fn verify_determinism() {
    println!("\n=== DETERMINISM TEST ===\n");

    const TEST_COUNT: usize = 20_000;
    const SEED: u64 = 12345;

    let root1 = run_deterministic_sequence(SEED, TEST_COUNT);
    let root2 = run_deterministic_sequence(SEED, TEST_COUNT);

    println!("  Run 1 state root: {}", hex::encode(root1));
    println!("  Run 2 state root: {}", hex::encode(root2));

    assert_eq!(root1, root2, "State roots must match for determinism");

    let root3 = run_deterministic_sequence(SEED + 1, TEST_COUNT);
    println!("  Different seed:   {}", hex::encode(root3));
    assert_ne!(root1, root3, "Different seeds should produce different roots");

    println!("\n=== DETERMINISM VERIFIED ===\n");
}

/// Bucket membership is conserved: per category, the range count over all
/// prices equals the number of items carrying that category.
#[test]
fn stress_conservation() {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let mut catalog = Catalog::new();
    let mut model = Model::default();

    for _ in 0..30_000 {
        step(&mut rng, &mut catalog, &mut model);
    }

    for category in 0..CATEGORY_SPACE {
        let carriers = model
            .items
            .values()
            .filter(|(_, categories)| categories.contains(&category))
            .count();
        assert_eq!(catalog.find_price_range(category, 0, u64::MAX), carriers);
    }
}

/// Deleting everything leaves no bucket or category behind.
#[test]
fn stress_drain() {
    let mut rng = ChaCha8Rng::seed_from_u64(99);
    let mut catalog = Catalog::with_capacity(10_000);
    let mut ids: Vec<ItemId> = Vec::new();

    for id in 0..10_000u64 {
        let categories = random_categories(&mut rng);
        catalog.insert(id, rng.gen_range(0..PRICE_SPACE), Some(categories.as_slice()));
        ids.push(id);
    }
    catalog.price_hike(0, 5_000, 25);

    // Delete in random order
    while !ids.is_empty() {
        let idx = rng.gen_range(0..ids.len());
        let id = ids.swap_remove(idx);
        let expected: u64 = catalog.get(id).unwrap().categories.iter().sum();
        assert_eq!(catalog.delete(id), expected);
    }

    assert!(catalog.is_empty());
    assert_eq!(catalog.category_count(), 0);
    for category in 0..CATEGORY_SPACE {
        assert_eq!(catalog.bucket_count(category), 0);
        assert!(catalog.find_min_price(category).is_none());
    }
    catalog.check_consistency().unwrap();
}

/// Worked end-to-end command script.
#[test]
fn command_script_total() {
    let script = "\
# seed the catalog
Insert 1 10.00 100 200 0
Insert 2 20.00 100 0
Insert 3 30.00 200 0
Insert 3 35.00 0
FindMinPrice 100
FindMaxPrice 200
FindPriceRange 200 0.00 40.00
PriceHike 1 2 10
Find 2
Delete 1
FindMinPrice 100
";
    let mut processor = CommandProcessor::new(Catalog::new());
    let total = processor.run(Cursor::new(script)).unwrap();

    // 3 creations + 10.00 + 35.00 + 2 + 3.00 + 22.00 + 300 + 22.00
    assert_eq!(format!("{total:.2}"), "397.00");
    assert_eq!(processor.executed(), 11);
    processor.catalog().check_consistency().unwrap();
}
