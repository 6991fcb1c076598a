//! End-to-end loading scenarios.
//!
//! Tests the full pipeline: Item/Container → Packer::pack() → audit, cost and
//! utilization, plus the ordering search on top.

use approx::assert_relative_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use uldpack_d3::{
    optimize, utilization, Container, CostBreakdown, Item, Orientation, Packer, PackerConfig,
    SearchConfig, Strategy, DEFAULT_PRIORITY_PENALTY, PRIORITY_COST,
};

/// Helper: a reproducible mixed instance; two of the three containers have weight limits.
fn random_instance(seed: u64, count: usize) -> (Vec<Item>, Vec<Container>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let items = (0..count)
        .map(|i| {
            let dims = (
                rng.gen_range(10.0..80.0),
                rng.gen_range(10.0..80.0),
                rng.gen_range(10.0..80.0),
            );
            if rng.gen_bool(0.15) {
                Item::priority(format!("P{i}"), dims.0, dims.1, dims.2)
                    .with_weight(rng.gen_range(1.0..50.0))
            } else {
                Item::new(format!("E{i}"), dims.0, dims.1, dims.2)
                    .with_weight(rng.gen_range(1.0..50.0))
                    .with_cost(rng.gen_range(1.0..100.0))
            }
        })
        .collect();
    let containers = vec![
        Container::new("U1", 200.0, 150.0, 160.0).with_weight_limit(400.0),
        Container::new("U2", 150.0, 150.0, 150.0).with_weight_limit(300.0),
        Container::new("U3", 120.0, 100.0, 100.0),
    ];
    (items, containers)
}

#[test]
fn test_single_item_at_origin() {
    let items = vec![Item::new("E1", 10.0, 20.0, 30.0).with_weight(5.0).with_cost(9.0)];
    let containers = vec![Container::new("U1", 100.0, 100.0, 100.0).with_weight_limit(50.0)];

    let solution = Packer::default_config().pack(&items, &containers).unwrap();
    let placement = solution.placement(0).unwrap();

    assert_eq!(placement.container, 0);
    assert_relative_eq!(placement.position.norm(), 0.0);
    assert_eq!(placement.orientation, Orientation::Lwh);
    assert_relative_eq!(solution.total_cost(), 0.0);
}

fn ake() -> Vec<Container> {
    vec![Container::new("AKE1", 244.0, 318.0, 285.0).with_weight_limit(3500.0)]
}

#[test]
fn test_one_cube_in_uld() {
    let items = vec![Item::new("E1", 200.0, 200.0, 200.0).with_weight(100.0).with_cost(50.0)];
    let solution = Packer::default_config().pack(&items, &ake()).unwrap();

    assert!(solution.is_placed(0));
    assert_relative_eq!(solution.placement(0).unwrap().position.norm(), 0.0);
    assert_relative_eq!(solution.total_cost(), 0.0);
}

#[test]
fn test_two_cubes_only_one_fits() {
    let items = vec![
        Item::new("E1", 200.0, 200.0, 200.0).with_weight(100.0).with_cost(50.0),
        Item::new("E2", 200.0, 200.0, 200.0).with_weight(100.0).with_cost(50.0),
    ];
    let containers = ake();

    let solution = Packer::default_config().pack(&items, &containers).unwrap();

    assert_eq!(solution.placed_count(), 1);
    assert_eq!(solution.unassigned().len(), 1);
    assert_relative_eq!(solution.total_cost(), 50.0);
}

#[test]
fn test_unplaceable_priority_item_dominates() {
    let items = vec![
        Item::priority("P1", 300.0, 300.0, 300.0),
        Item::new("E1", 10.0, 10.0, 10.0).with_cost(3.0),
    ];
    let containers = vec![Container::new("U1", 200.0, 200.0, 200.0)];

    let solution = Packer::default_config().pack(&items, &containers).unwrap();

    assert!(!solution.is_placed(0));
    assert!(solution.is_placed(1));
    assert_eq!(solution.priority_container_count(&items), 0);
    assert_relative_eq!(solution.total_cost(), PRIORITY_COST);
}

#[test]
fn test_empty_container_list() {
    let items = vec![Item::new("E1", 1.0, 1.0, 1.0).with_cost(2.0)];
    let solution = Packer::default_config().pack(&items, &[]).unwrap();

    assert_eq!(solution.placed_count(), 0);
    assert_relative_eq!(solution.total_cost(), 2.0);
}

#[test]
fn test_random_instances_pass_audit() {
    for seed in 0..6 {
        let (items, containers) = random_instance(seed, 40);
        for config in [
            PackerConfig::default(),
            PackerConfig::default().with_defragment(false),
            PackerConfig::default().with_min_support_ratio(0.75),
            PackerConfig::default().with_container_ordering(3),
        ] {
            let solution = Packer::new(config).pack(&items, &containers).unwrap();
            assert!(
                solution.audit(&items, &containers).is_ok(),
                "audit failed for seed {seed}"
            );

            for (c, container) in containers.iter().enumerate() {
                if let Some(limit) = container.weight_limit() {
                    assert!(solution.load_weight(c) <= limit + 1e-9);
                }
                let holds_priority = solution
                    .items_in(c)
                    .iter()
                    .any(|&i| items[i].is_priority());
                assert_eq!(solution.is_priority(c, &items), holds_priority);
            }
        }
    }
}

#[test]
fn test_cost_accounting() {
    let (items, containers) = random_instance(11, 50);
    let solution = Packer::default_config().pack(&items, &containers).unwrap();

    let unplaced: f64 = solution
        .unassigned()
        .iter()
        .map(|&i| items[i].cost())
        .sum();
    let expected =
        unplaced + DEFAULT_PRIORITY_PENALTY * solution.priority_container_count(&items) as f64;

    assert_relative_eq!(solution.total_cost(), expected);
    let breakdown = CostBreakdown::compute(&solution, &items, DEFAULT_PRIORITY_PENALTY);
    assert_relative_eq!(breakdown.total, expected);
}

#[test]
fn test_pack_is_deterministic() {
    let (items, containers) = random_instance(5, 40);
    let packer = Packer::default_config();

    let a = packer.pack(&items, &containers).unwrap();
    let b = packer.pack(&items, &containers).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_metrics_leave_solution_untouched() {
    let (items, containers) = random_instance(8, 30);
    let solution = Packer::default_config().pack(&items, &containers).unwrap();
    let before = solution.clone();

    let first = utilization(&solution, &items, &containers, DEFAULT_PRIORITY_PENALTY);
    let second = utilization(&solution, &items, &containers, DEFAULT_PRIORITY_PENALTY);

    assert_eq!(first, second);
    assert_eq!(solution, before);
    assert_eq!(first.placed_items, solution.placed_count());
    assert_eq!(first.priority_total + first.economy_total, items.len());
    assert_relative_eq!(first.cost.total, solution.total_cost());
}

#[test]
fn test_output_rows() {
    let items = vec![
        Item::new("E1", 10.0, 10.0, 10.0).with_weight(4.0).with_cost(1.0),
        Item::new("E2", 50.0, 50.0, 50.0).with_weight(4.0).with_cost(1.0),
    ];
    let containers = vec![Container::new("U1", 20.0, 20.0, 20.0)];
    let solution = Packer::default_config().pack(&items, &containers).unwrap();
    let rows = solution.rows(&items, &containers);

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].item_id, "E1");
    assert_eq!(rows[0].container_id, "U1");
    assert!(rows[0].is_placed());
    assert_eq!(rows[1].container_id, uldpack_d3::UNASSIGNED);
    assert!(!rows[1].is_placed());
}

#[test]
fn test_zero_iterations_for_every_strategy() {
    let (items, containers) = random_instance(3, 20);
    let packer = Packer::new(uldpack_d3::search_packer_config());
    let start = packer.pack(&items, &containers).unwrap().total_cost();

    for strategy in [
        Strategy::annealing(),
        Strategy::tabu(),
        Strategy::genetic_random_key(),
    ] {
        let config = SearchConfig::new()
            .with_strategy(strategy)
            .with_iterations(0)
            .with_seed(42);
        let result = optimize(&items, &containers, &config).unwrap();

        let identity: Vec<usize> = (0..items.len()).collect();
        assert_eq!(result.best_ordering(), identity.as_slice());
        assert_relative_eq!(result.best_cost(), start);
        assert_relative_eq!(result.outcome.current_cost, start);
        assert_eq!(result.outcome.iterations, 0);
    }
}

#[test]
fn test_search_respects_budget_and_improves() {
    let (items, containers) = random_instance(4, 25);

    for strategy in [
        Strategy::annealing(),
        Strategy::tabu(),
        Strategy::genetic_random_key(),
    ] {
        let config = SearchConfig::new()
            .with_strategy(strategy)
            .with_iterations(8)
            .with_neighbor_swaps(3)
            .with_seed(7);
        let result = optimize(&items, &containers, &config).unwrap();

        assert!(result.outcome.iterations <= 8);
        assert!(result.best_cost() <= result.outcome.history[0]);
        assert!(result
            .outcome
            .history
            .windows(2)
            .all(|pair| pair[1] <= pair[0]));
        assert_relative_eq!(result.solution.total_cost(), result.best_cost());
        assert!(result.solution.audit(&items, &containers).is_ok());
    }
}

#[test]
fn test_seeded_search_is_reproducible() {
    let (items, containers) = random_instance(9, 20);
    let config = SearchConfig::new()
        .with_strategy(Strategy::genetic_random_key())
        .with_iterations(6)
        .with_seed(123);

    let a = optimize(&items, &containers, &config).unwrap();
    let b = optimize(&items, &containers, &config).unwrap();

    assert_eq!(a.best_ordering(), b.best_ordering());
    assert_eq!(a.outcome.history, b.outcome.history);
    assert_eq!(a.solution, b.solution);
}

#[cfg(feature = "serde")]
#[test]
fn test_records_serialize() {
    let (items, containers) = random_instance(2, 10);
    let solution = Packer::default_config().pack(&items, &containers).unwrap();

    let json = serde_json::to_string(&items).unwrap();
    let back: Vec<Item> = serde_json::from_str(&json).unwrap();
    assert_eq!(back.len(), items.len());
    assert_eq!(back[0].id(), items[0].id());

    let json = serde_json::to_string(&solution).unwrap();
    let back: uldpack_d3::Solution = serde_json::from_str(&json).unwrap();
    assert_eq!(back.placed_count(), solution.placed_count());
    assert_eq!(back.container_order(), solution.container_order());
    assert_relative_eq!(back.total_cost(), solution.total_cost());

    let report = utilization(&solution, &items, &containers, DEFAULT_PRIORITY_PENALTY);
    let value = serde_json::to_value(&report).unwrap();
    assert!(value.get("containers").is_some());
}
