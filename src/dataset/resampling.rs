use itertools::Itertools;
use log::debug;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::dataset::common_structs::Record;
use crate::dataset::error::DatasetError;

/// Outcome of a stratified partition over record indices.
///
/// `taken` holds the group sized by the requested fraction (validation group
/// for a split, kept group for a reduction); `rest` holds the complement.
/// Within each group, indices appear class by class in encoded-class order.
#[derive(Debug)]
pub(crate) struct Partition {
    pub rest: Vec<usize>,
    pub taken: Vec<usize>,
}

/// Partition `records` by index, stratified by `encoded_class`, shuffled with
/// `seed` (entropy-seeded when `None`).
///
/// The `taken` group totals `round(fraction * len)`, apportioned across
/// classes by largest remainder: every class contributes
/// `floor(fraction * class_size)` members and the leftover samples go to the
/// classes with the largest fractional parts, so the overall proportion stays
/// within one sample of `fraction` while each class remains proportionally
/// represented.
///
/// With `require_both`, the per-class take is clamped to `[1, class_size - 1]`
/// so every class lands in both groups, and a singleton class is a
/// stratification error. Without it, a take of zero is the error (a class
/// would vanish from the kept group) while taking a whole class is allowed.
pub(crate) fn stratified_partition(
    records: &[Record],
    fraction: f64,
    require_both: bool,
    seed: Option<u64>,
) -> Result<Partition, DatasetError> {
    if !(0.0..=1.0).contains(&fraction) {
        return Err(DatasetError::InvalidFraction { fraction });
    }
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let by_class = records
        .iter()
        .enumerate()
        .map(|(index, record)| (record.encoded_class, index))
        .into_group_map();
    let groups: Vec<(usize, Vec<usize>)> = by_class
        .into_iter()
        .sorted_by_key(|(class, _)| *class)
        .collect();

    let takes = apportion_takes(&groups, fraction);

    let mut rest = Vec::new();
    let mut taken = Vec::new();
    for ((class, mut members), mut take) in groups.into_iter().zip(takes) {
        let count = members.len();
        if require_both {
            if count < 2 {
                return Err(stratification_error(records, &members, count));
            }
            take = take.clamp(1, count - 1);
        } else if take == 0 {
            return Err(stratification_error(records, &members, count));
        }

        members.shuffle(&mut rng);
        let (class_taken, class_rest) = members.split_at(take);
        debug!("class {}: {} of {} samples taken", class, take, count);
        taken.extend_from_slice(class_taken);
        rest.extend_from_slice(class_rest);
    }

    Ok(Partition { rest, taken })
}

/// Largest-remainder apportionment of the global `round(fraction * total)`
/// target: floor per class, then hand one leftover sample each to the
/// classes with the largest fractional parts (ties broken by class order).
fn apportion_takes(groups: &[(usize, Vec<usize>)], fraction: f64) -> Vec<usize> {
    let total: usize = groups.iter().map(|(_, members)| members.len()).sum();
    let target = (fraction * total as f64).round() as usize;

    let mut takes = Vec::with_capacity(groups.len());
    let mut remainders = Vec::with_capacity(groups.len());
    for (pos, (_, members)) in groups.iter().enumerate() {
        let exact = fraction * members.len() as f64;
        let base = exact.floor();
        takes.push(base as usize);
        remainders.push((exact - base, pos));
    }

    let assigned: usize = takes.iter().sum();
    let leftover = target.saturating_sub(assigned);
    remainders.sort_by(|a, b| b.0.total_cmp(&a.0).then(a.1.cmp(&b.1)));
    for &(_, pos) in remainders.iter().take(leftover) {
        takes[pos] += 1;
    }
    takes
}

/// Move the records at `indices` (which must be distinct) out of `records`,
/// in order, dropping the rest.
pub(crate) fn take_by_index(records: Vec<Record>, indices: &[usize]) -> Vec<Record> {
    let mut slots: Vec<Option<Record>> = records.into_iter().map(Some).collect();
    indices.iter().filter_map(|&i| slots[i].take()).collect()
}

fn stratification_error(records: &[Record], members: &[usize], count: usize) -> DatasetError {
    let class = members
        .first()
        .map(|&i| records[i].class_label.clone())
        .unwrap_or_default();
    DatasetError::Stratification { class, count }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::DynamicImage;

    fn records(class_counts: &[usize]) -> Vec<Record> {
        let mut out = Vec::new();
        for (class, &count) in class_counts.iter().enumerate() {
            for _ in 0..count {
                out.push(Record {
                    rgb: DynamicImage::new_rgb8(1, 1),
                    depth: DynamicImage::new_rgb8(1, 1),
                    class_label: format!("class_{class}"),
                    encoded_class: class,
                });
            }
        }
        out
    }

    fn taken_of_class(table: &[Record], partition: &Partition, class: usize) -> usize {
        partition
            .taken
            .iter()
            .filter(|&&i| table[i].encoded_class == class)
            .count()
    }

    #[test]
    fn partition_is_proportional_per_class() {
        let table = records(&[10, 20]);
        let partition = stratified_partition(&table, 0.2, true, Some(7)).unwrap();
        assert_eq!(partition.taken.len(), 2 + 4);
        assert_eq!(partition.rest.len(), 8 + 16);
        assert_eq!(taken_of_class(&table, &partition, 0), 2);
        assert_eq!(taken_of_class(&table, &partition, 1), 4);
    }

    #[test]
    fn total_take_stays_within_one_sample_of_fraction() {
        // All three classes have fractional 1.5 takes; independent rounding
        // would take 6 of 9, drifting 1.5 samples off the requested half
        let table = records(&[3, 3, 3]);
        let partition = stratified_partition(&table, 0.5, true, Some(1)).unwrap();

        let n = table.len() as f64;
        let off = (partition.taken.len() as f64 - 0.5 * n).abs();
        assert!(off <= 1.0, "val group off by {off} samples");
        assert_eq!(partition.taken.len(), 5, "round(0.5 * 9)");

        // every class still represented on both sides
        for class in 0..3 {
            let taken = taken_of_class(&table, &partition, class);
            assert!((1..=2).contains(&taken));
        }
    }

    #[test]
    fn leftover_goes_to_largest_remainders() {
        // exact takes 3.9 / 3.3 / 7.8: floors sum to 13 against a global
        // target of round(15.0) = 15, so the two leftovers land on class 0
        // (rem .9) and class 2 (rem .8), skipping class 1 (rem .3)
        let table = records(&[13, 11, 26]);
        let partition = stratified_partition(&table, 0.3, true, Some(5)).unwrap();
        assert_eq!(partition.taken.len(), 15);
        assert_eq!(taken_of_class(&table, &partition, 0), 4);
        assert_eq!(taken_of_class(&table, &partition, 1), 3);
        assert_eq!(taken_of_class(&table, &partition, 2), 8);
    }

    #[test]
    fn partition_indices_are_disjoint_and_cover_table() {
        let table = records(&[5, 7, 4]);
        let partition = stratified_partition(&table, 0.5, true, Some(3)).unwrap();
        let mut all: Vec<usize> = partition
            .rest
            .iter()
            .chain(partition.taken.iter())
            .copied()
            .collect();
        all.sort_unstable();
        assert_eq!(all, (0..table.len()).collect::<Vec<_>>());
    }

    #[test]
    fn require_both_clamps_extreme_fractions() {
        let table = records(&[4]);
        // target round(0.9 * 4) = 4 would empty the rest group; clamp keeps one out
        let partition = stratified_partition(&table, 0.9, true, Some(1)).unwrap();
        assert_eq!(partition.taken.len(), 3);
        assert_eq!(partition.rest.len(), 1);

        // target round(0.05 * 4) = 0 would starve the taken group
        let partition = stratified_partition(&table, 0.05, true, Some(1)).unwrap();
        assert_eq!(partition.taken.len(), 1);
        assert_eq!(partition.rest.len(), 3);
    }

    #[test]
    fn singleton_class_fails_when_both_groups_required() {
        let table = records(&[3, 1]);
        let err = stratified_partition(&table, 0.5, true, Some(1)).unwrap_err();
        assert!(matches!(
            err,
            DatasetError::Stratification { count: 1, .. }
        ));
    }

    #[test]
    fn zero_take_fails_without_require_both() {
        let table = records(&[2, 40]);
        // floor(0.1 * 2) = 0 and the global target of 4 is already covered
        // by class 1's floor; class 0 would keep nothing
        let err = stratified_partition(&table, 0.1, false, Some(1)).unwrap_err();
        match err {
            DatasetError::Stratification { class, count } => {
                assert_eq!(class, "class_0");
                assert_eq!(count, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn whole_class_may_be_taken_without_require_both() {
        let table = records(&[2, 4]);
        let partition = stratified_partition(&table, 1.0, false, Some(1)).unwrap();
        assert_eq!(partition.taken.len(), 6);
        assert!(partition.rest.is_empty());
    }

    #[test]
    fn fraction_outside_unit_interval_is_rejected() {
        let table = records(&[2, 2]);
        for fraction in [-0.1, 1.5, f64::NAN] {
            for require_both in [true, false] {
                let err =
                    stratified_partition(&table, fraction, require_both, Some(1)).unwrap_err();
                assert!(matches!(err, DatasetError::InvalidFraction { .. }));
            }
        }
    }

    #[test]
    fn same_seed_gives_same_partition() {
        let table = records(&[8, 8]);
        let a = stratified_partition(&table, 0.25, true, Some(42)).unwrap();
        let b = stratified_partition(&table, 0.25, true, Some(42)).unwrap();
        assert_eq!(a.taken, b.taken);
        assert_eq!(a.rest, b.rest);
    }

    #[test]
    fn take_by_index_preserves_order() {
        let table = records(&[1, 1, 1]);
        let taken = take_by_index(table, &[2, 0]);
        assert_eq!(taken.len(), 2);
        assert_eq!(taken[0].encoded_class, 2);
        assert_eq!(taken[1].encoded_class, 0);
    }
}
