//! Ordering policies: item scoring and container visiting order.

use crate::boundary::Container;
use crate::geometry::Item;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Scores that decide the order in which items are offered to containers.
///
/// Larger keys go first. Sorting is stable, so items with equal keys keep
/// the order of the sequence handed to the packer.
pub trait ItemScoring: Send + Sync {
    /// Key for the priority tier during coarse assignment.
    fn priority_key(&self, item: &Item) -> f64 {
        item.volume()
    }

    /// Key for the economy tier during coarse assignment.
    fn economy_key(&self, item: &Item) -> f64;

    /// Key for the refit passes.
    fn refit_key(&self, item: &Item) -> (f64, f64);
}

/// Default scoring.
///
/// Economy items are ranked by `cost³ / (volume² + weight²)`, which favors
/// small, light, expensive items. Refits take taller items first, grouped
/// by height in bands of 10 units and then by footprint area.
#[derive(Debug, Clone, Copy, Default)]
pub struct DensityScoring;

impl ItemScoring for DensityScoring {
    fn economy_key(&self, item: &Item) -> f64 {
        let volume = item.volume();
        let weight = item.weight();
        item.cost().powi(3) / (volume * volume + weight * weight)
    }

    fn refit_key(&self, item: &Item) -> (f64, f64) {
        let height = item.height();
        ((height / 10.0).floor(), item.volume() / height)
    }
}

/// How items are ordered within each tier before coarse assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ItemOrder {
    /// Sort each tier by its scoring key.
    #[default]
    Scored,
    /// Keep the caller's sequence within each tier.
    AsGiven,
}

/// Splits `order` into priority and economy tiers and sorts each.
pub fn assignment_order<S: ItemScoring + ?Sized>(
    items: &[Item],
    order: &[usize],
    item_order: ItemOrder,
    scoring: &S,
) -> Vec<usize> {
    let (mut priority, mut economy): (Vec<usize>, Vec<usize>) =
        order.iter().partition(|&&i| items[i].is_priority());

    if item_order == ItemOrder::Scored {
        priority.sort_by(|&a, &b| {
            scoring
                .priority_key(&items[b])
                .total_cmp(&scoring.priority_key(&items[a]))
        });
        economy.sort_by(|&a, &b| {
            scoring
                .economy_key(&items[b])
                .total_cmp(&scoring.economy_key(&items[a]))
        });
    }

    priority.extend(economy);
    priority
}

/// Sorts item indices by descending refit key, stable.
pub fn sort_for_refit<S: ItemScoring + ?Sized>(items: &[Item], indices: &mut [usize], scoring: &S) {
    indices.sort_by(|&a, &b| {
        let ka = scoring.refit_key(&items[a]);
        let kb = scoring.refit_key(&items[b]);
        kb.0.total_cmp(&ka.0).then_with(|| kb.1.total_cmp(&ka.1))
    });
}

/// `n!`, saturating.
pub fn factorial(n: usize) -> usize {
    (1..=n).fold(1usize, |acc, k| acc.saturating_mul(k))
}

/// The `k`-th permutation of `0..n` in lexicographic order.
///
/// `k` is taken modulo `n!`.
pub fn nth_permutation(n: usize, k: usize) -> Vec<usize> {
    let mut pool: Vec<usize> = (0..n).collect();
    let mut k = k % factorial(n);
    let mut result = Vec::with_capacity(n);
    for remaining in (1..=n).rev() {
        let block = factorial(remaining - 1);
        let index = k / block;
        k %= block;
        result.push(pool.remove(index));
    }
    result
}

/// Splits containers into the lead tier (the `lead` largest by volume, ties
/// by input order, listed largest first) and the trail tier (the rest, in
/// input order).
pub fn container_tiers(containers: &[Container], lead: usize) -> (Vec<usize>, Vec<usize>) {
    let mut by_volume: Vec<usize> = (0..containers.len()).collect();
    by_volume.sort_by(|&a, &b| containers[b].volume().total_cmp(&containers[a].volume()));

    let lead = lead.min(containers.len());
    let lead_tier: Vec<usize> = by_volume[..lead].to_vec();
    let trail_tier: Vec<usize> = (0..containers.len())
        .filter(|i| !lead_tier.contains(i))
        .collect();
    (lead_tier, trail_tier)
}

/// Number of distinct container orderings reachable through the selector.
pub fn ordering_count(num_containers: usize, lead: usize) -> usize {
    let lead = lead.min(num_containers);
    factorial(lead).saturating_mul(factorial(num_containers - lead))
}

/// Container visiting order for `selector`.
///
/// The lead tier always comes first. The selector enumerates
/// `lead! × trail!` orderings: `selector / trail!` permutes the lead tier and
/// `selector % trail!` permutes the trail tier. Out-of-range selectors wrap.
pub fn container_order(containers: &[Container], lead: usize, selector: usize) -> Vec<usize> {
    let (lead_tier, trail_tier) = container_tiers(containers, lead);
    let count = ordering_count(containers.len(), lead);
    if selector >= count {
        log::warn!(
            "Container ordering selector {} out of range (0..{}), wrapping",
            selector,
            count
        );
    }
    let selector = selector % count;

    let trail_count = factorial(trail_tier.len());
    let lead_perm = nth_permutation(lead_tier.len(), selector / trail_count);
    let trail_perm = nth_permutation(trail_tier.len(), selector % trail_count);

    lead_perm
        .into_iter()
        .map(|i| lead_tier[i])
        .chain(trail_perm.into_iter().map(|i| trail_tier[i]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ulds() -> Vec<Container> {
        vec![
            Container::new("U1", 100.0, 100.0, 100.0),
            Container::new("U2", 100.0, 100.0, 100.0),
            Container::new("U3", 100.0, 100.0, 100.0),
            Container::new("U4", 200.0, 200.0, 200.0),
            Container::new("U5", 200.0, 200.0, 200.0),
            Container::new("U6", 200.0, 200.0, 200.0),
        ]
    }

    #[test]
    fn test_nth_permutation() {
        assert_eq!(nth_permutation(3, 0), vec![0, 1, 2]);
        assert_eq!(nth_permutation(3, 1), vec![0, 2, 1]);
        assert_eq!(nth_permutation(3, 5), vec![2, 1, 0]);
        assert_eq!(nth_permutation(3, 6), vec![0, 1, 2]);
        assert_eq!(nth_permutation(0, 0), Vec::<usize>::new());
    }

    #[test]
    fn test_thirty_six_orderings() {
        let containers = ulds();
        assert_eq!(ordering_count(6, 3), 36);

        let mut seen: Vec<Vec<usize>> = (0..36)
            .map(|s| container_order(&containers, 3, s))
            .collect();
        for order in &seen {
            let mut lead: Vec<usize> = order[..3].to_vec();
            lead.sort_unstable();
            assert_eq!(lead, vec![3, 4, 5]);
        }
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), 36);
    }

    #[test]
    fn test_selector_zero_is_largest_first() {
        assert_eq!(container_order(&ulds(), 3, 0), vec![3, 4, 5, 0, 1, 2]);
        assert_eq!(container_order(&ulds(), 3, 1), vec![3, 4, 5, 0, 2, 1]);
        assert_eq!(container_order(&ulds(), 3, 6), vec![3, 5, 4, 0, 1, 2]);
    }

    #[test]
    fn test_selector_wraps() {
        assert_eq!(
            container_order(&ulds(), 3, 36),
            container_order(&ulds(), 3, 0)
        );
    }

    #[test]
    fn test_lead_larger_than_container_count() {
        let containers = ulds();
        assert_eq!(ordering_count(2, 3), 2);
        assert_eq!(container_order(&containers[..2], 3, 1), vec![1, 0]);
    }

    #[test]
    fn test_assignment_order_tiers() {
        let items = vec![
            Item::new("E1", 10.0, 10.0, 10.0).with_cost(10.0),
            Item::priority("P1", 5.0, 5.0, 5.0),
            Item::new("E2", 1.0, 1.0, 1.0).with_cost(10.0),
            Item::priority("P2", 10.0, 10.0, 10.0),
        ];
        let order = assignment_order(&items, &[0, 1, 2, 3], ItemOrder::Scored, &DensityScoring);
        assert_eq!(order, vec![3, 1, 2, 0]);

        let given = assignment_order(&items, &[2, 1, 0, 3], ItemOrder::AsGiven, &DensityScoring);
        assert_eq!(given, vec![1, 3, 2, 0]);
    }

    #[test]
    fn test_refit_prefers_tall_items() {
        let items = vec![
            Item::new("flat", 50.0, 50.0, 5.0),
            Item::new("tall", 10.0, 10.0, 40.0),
            Item::new("mid", 20.0, 20.0, 40.0),
        ];
        let mut indices = vec![0, 1, 2];
        sort_for_refit(&items, &mut indices, &DensityScoring);
        assert_eq!(indices, vec![2, 1, 0]);
    }
}
