#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Generative tests for the comparison invariants.

use bimdiff_core::diff::ElementChange;
use bimdiff_core::matrix::{MatrixOptions, MultiComparisonCell};
use bimdiff_core::{
    compare_models, compare_multiple_versions_with, generate_heatmap, CancellationFlag, Element,
    ElementSnapshot, IdentityKey,
};
use proptest::prelude::*;
use std::collections::HashSet;

fn element_strategy() -> impl Strategy<Value = Element> {
    (
        0u64..8,
        proptest::option::of(0u8..6),
        proptest::sample::select(vec!["IfcWall", "IfcDoor", "IfcBeam", "IfcSlab"]),
        proptest::collection::btree_map("[a-d]", 0i64..3, 0..4),
    )
        .prop_map(|(express_id, global, element_type, properties)| {
            let mut element = Element::new(express_id, element_type);
            if let Some(g) = global {
                element = element.with_global_id(format!("g{g}"));
            }
            for (key, value) in properties {
                element = element.with_property(key, value);
            }
            element
        })
}

fn snapshot_strategy(version_id: &'static str) -> impl Strategy<Value = ElementSnapshot> {
    proptest::collection::vec(element_strategy(), 0..12)
        .prop_map(move |elements| ElementSnapshot::with_elements(version_id, elements))
}

fn keys(changes: &[ElementChange]) -> Vec<IdentityKey> {
    changes.iter().filter_map(|c| c.identity_key()).collect()
}

fn cell_strategy() -> impl Strategy<Value = MultiComparisonCell> {
    (0usize..20).prop_map(|total| MultiComparisonCell {
        total_changes: total,
        ..MultiComparisonCell::zero("a", "b")
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn reflexive_comparison_is_empty(s in snapshot_strategy("s")) {
        let result = compare_models(&s, &s).unwrap();
        prop_assert!(result.added.is_empty());
        prop_assert!(result.removed.is_empty());
        prop_assert!(result.modified.is_empty());
        prop_assert_eq!(result.statistics.total_changes, 0);
    }

    #[test]
    fn added_and_removed_are_symmetric(a in snapshot_strategy("a"), b in snapshot_strategy("b")) {
        let forward = compare_models(&a, &b).unwrap();
        let backward = compare_models(&b, &a).unwrap();
        prop_assert_eq!(keys(&forward.added), keys(&backward.removed));
        prop_assert_eq!(keys(&forward.removed), keys(&backward.added));
        prop_assert_eq!(keys(&forward.modified), keys(&backward.modified));
    }

    #[test]
    fn counts_are_consistent_and_keys_unique(a in snapshot_strategy("a"), b in snapshot_strategy("b")) {
        let result = compare_models(&a, &b).unwrap();
        let stats = result.statistics;
        prop_assert_eq!(
            stats.total_changes,
            result.added.len() + result.removed.len() + result.modified.len()
        );
        prop_assert_eq!(stats.added_count, result.added.len());
        prop_assert_eq!(stats.removed_count, result.removed.len());
        prop_assert_eq!(stats.modified_count, result.modified.len());
        for list in [&result.added, &result.removed, &result.modified] {
            let unique: HashSet<IdentityKey> = keys(list).into_iter().collect();
            prop_assert_eq!(unique.len(), list.len());
        }
        prop_assert!(result.modified.iter().all(|c| !c.property_changes().is_empty()));
    }

    #[test]
    fn matrix_diagonal_is_zero_and_cells_match_pairwise(
        snapshots in proptest::collection::vec(snapshot_strategy("v"), 1..4)
    ) {
        let snapshots: Vec<ElementSnapshot> = snapshots
            .into_iter()
            .enumerate()
            .map(|(i, s)| ElementSnapshot::with_elements(format!("v{i}"), s.elements))
            .collect();
        let result = compare_multiple_versions_with(
            &snapshots,
            &MatrixOptions::default(),
            &CancellationFlag::new(),
        )
        .unwrap();
        let n = snapshots.len();
        prop_assert_eq!(result.summary.total_comparisons, n * (n - 1));
        for i in 0..n {
            prop_assert_eq!(result.matrix[i][i].total_changes, 0);
            for j in 0..n {
                if i != j {
                    let pairwise = compare_models(&snapshots[i], &snapshots[j]).unwrap();
                    prop_assert_eq!(result.matrix[i][j].total_changes, pairwise.statistics.total_changes);
                }
            }
        }
    }

    #[test]
    fn heatmap_is_bounded_and_peaks_at_one(
        matrix in (1usize..5).prop_flat_map(|n| {
            proptest::collection::vec(proptest::collection::vec(cell_strategy(), n), n)
        })
    ) {
        let grid = generate_heatmap(&matrix);
        prop_assert_eq!(grid.len(), matrix.len());
        prop_assert!(grid.iter().flatten().all(|v| (0.0..=1.0).contains(v)));

        let off_diagonal_changed = matrix.iter().enumerate().any(|(i, row)| {
            row.iter().enumerate().any(|(j, cell)| i != j && cell.total_changes > 0)
        });
        let off_diagonal_peak = grid.iter().enumerate().any(|(i, row)| {
            row.iter().enumerate().any(|(j, v)| i != j && *v == 1.0)
        });
        prop_assert_eq!(off_diagonal_changed, off_diagonal_peak);
        if !off_diagonal_changed {
            prop_assert!(grid.iter().flatten().all(|v| *v == 0.0));
        }
    }
}
