use proptest::prelude::*;

use txnstats_types::{CollectionStats, InProgressStats, TransactionState};

proptest! {
    /// Folding queue lengths yields count, sum and extrema of the sequence.
    #[test]
    fn collection_fold_matches_sequence(queues in prop::collection::vec(0u64..10_000, 0..200)) {
        let stats = queues
            .iter()
            .copied()
            .fold(CollectionStats::default(), CollectionStats::observe);

        prop_assert_eq!(stats.doc_count, queues.len() as u64);
        prop_assert_eq!(stats.total_queued, queues.iter().sum::<u64>());
        prop_assert_eq!(stats.max_queued, queues.iter().copied().max().unwrap_or(0));
        prop_assert_eq!(stats.min_queued, queues.iter().copied().min().unwrap_or(0));
        prop_assert!(stats.min_queued <= stats.max_queued);
    }

    /// Every observed transaction lands in exactly one histogram bucket.
    #[test]
    fn state_histogram_sums_to_total(
        txns in prop::collection::vec((-3i64..12, 0u64..50), 0..200)
    ) {
        let stats = txns.iter().fold(InProgressStats::new(), |acc, (code, ops)| {
            acc.observe(TransactionState::classify(*code), *ops)
        });

        prop_assert_eq!(stats.states.values().sum::<u64>(), txns.len() as u64);
        prop_assert_eq!(stats.total_txns, txns.len() as u64);
        prop_assert!(stats.total_ops >= stats.max_ops);
        for (code, _) in &txns {
            let expected = txns.iter().filter(|(c, _)| c == code).count() as u64;
            prop_assert_eq!(stats.count(TransactionState::classify(*code)), expected);
        }
    }

    /// Classification is deterministic and round-trips the stored code.
    #[test]
    fn classify_round_trips_code(code in any::<i64>()) {
        let state = TransactionState::classify(code);
        prop_assert_eq!(state, TransactionState::classify(code));
        prop_assert_eq!(state.code(), code);
        prop_assert_eq!(matches!(state, TransactionState::Unknown(_)), !(0..7).contains(&code));
    }
}
