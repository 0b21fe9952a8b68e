//! Deterministic allocation of exam slots across item groups.
//!
//! Exam assembly picks `total` items across subject/unit groups either
//! proportionally to group size or as an even split. Rounding is
//! largest-remainder: floor every quota, then hand leftover slots out
//! by descending fractional remainder, ties broken toward the larger
//! group and then the earlier group. No randomness at this layer.

use crate::item::QuizItem;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Distribution {
    /// Slots proportional to group size.
    Proportional,
    /// Even split across groups.
    Equal,
}

/// Computes per-group slot counts.
///
/// The result never allocates more than a group holds; slots a capped
/// group cannot absorb are redistributed to later groups with spare
/// inventory. The total allocated is `min(total, sum(group_sizes))`.
pub fn allocate(group_sizes: &[usize], total: usize, distribution: Distribution) -> Vec<usize> {
    if group_sizes.is_empty() || total == 0 {
        return vec![0; group_sizes.len()];
    }

    let inventory: usize = group_sizes.iter().sum();
    let target = total.min(inventory);
    if target == 0 {
        return vec![0; group_sizes.len()];
    }

    let mut counts = match distribution {
        Distribution::Proportional => proportional_quotas(group_sizes, target, inventory),
        Distribution::Equal => equal_quotas(group_sizes.len(), target),
    };

    // Cap at inventory and redistribute what did not fit.
    let mut spill = 0;
    for (count, size) in counts.iter_mut().zip(group_sizes) {
        if *count > *size {
            spill += *count - *size;
            *count = *size;
        }
    }
    let mut index = 0;
    while spill > 0 && index < counts.len() {
        let room = group_sizes[index] - counts[index];
        let take = room.min(spill);
        counts[index] += take;
        spill -= take;
        index += 1;
    }

    counts
}

fn proportional_quotas(group_sizes: &[usize], target: usize, inventory: usize) -> Vec<usize> {
    let mut counts: Vec<usize> = group_sizes
        .iter()
        .map(|size| size * target / inventory)
        .collect();

    let assigned: usize = counts.iter().sum();
    let mut leftovers: Vec<(usize, usize)> = group_sizes
        .iter()
        .enumerate()
        // Fractional remainder of size*target/inventory, scaled to an integer.
        .map(|(i, size)| (i, (size * target) % inventory))
        .collect();
    leftovers.sort_by(|a, b| {
        b.1.cmp(&a.1)
            .then_with(|| group_sizes[b.0].cmp(&group_sizes[a.0]))
            .then_with(|| a.0.cmp(&b.0))
    });

    for (index, _) in leftovers.into_iter().take(target - assigned) {
        counts[index] += 1;
    }
    counts
}

fn equal_quotas(groups: usize, target: usize) -> Vec<usize> {
    let base = target / groups;
    let remainder = target % groups;
    (0..groups)
        .map(|i| if i < remainder { base + 1 } else { base })
        .collect()
}

/// Selects items from ordered groups according to the allocation.
/// Items are taken in stored order from the front of each group.
pub fn select_items(
    groups: &[(String, Vec<QuizItem>)],
    total: usize,
    distribution: Distribution,
) -> Vec<QuizItem> {
    let sizes: Vec<usize> = groups.iter().map(|(_, items)| items.len()).collect();
    let counts = allocate(&sizes, total, distribution);

    groups
        .iter()
        .zip(&counts)
        .flat_map(|((_, items), count)| items.iter().take(*count).cloned())
        .collect()
}
