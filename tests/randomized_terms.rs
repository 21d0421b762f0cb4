// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! Property-style coverage for the block-size and min/max-term testable
//! properties (spec.md §8), driven over a randomly generated sorted term
//! stream the way the teacher's segment tests generate synthetic data.

mod support;

use block_tree_terms::{BlockTreeOptions, FieldInfo, TermState, Writer};
use rand::Rng;
use std::collections::BTreeSet;
use support::FixturePostingsWriter;

/// Generates a unique, sorted set of lowercase-letter term strings using
/// `nanoid`'s alphabet generator with a fixed small alphabet, so terms
/// frequently share prefixes and exercise both leaf and floor blocks.
fn random_sorted_terms(rng: &mut impl Rng, count: usize) -> Vec<String> {
    const ALPHABET: [char; 6] = ['a', 'b', 'c', 'd', 'e', 'f'];
    let mut terms = BTreeSet::new();
    while terms.len() < count {
        let len = rng.random_range(1..=4);
        let term = nanoid::nanoid!(len, &ALPHABET);
        terms.insert(term);
    }
    terms.into_iter().collect()
}

#[test]
fn random_sorted_stream_round_trips_min_max_and_counts() {
    let mut rng = rand::rng();

    for trial in 0..8 {
        let opts = BlockTreeOptions::builder()
            .with_min_items_in_block(2)
            .with_max_items_in_block(6)
            .build()
            .unwrap();
        let mut writer = Writer::new(Vec::new(), Vec::new(), FixturePostingsWriter, opts).unwrap();

        let terms = random_sorted_terms(&mut rng, 40 + trial);
        writer
            .add_field(FieldInfo {
                field_number: 0,
                has_freqs: false,
            })
            .unwrap();

        let mut sum_df = 0u64;
        for term in &terms {
            writer.start_term(term.as_bytes()).unwrap();
            writer
                .finish_term(
                    term.clone().into_bytes(),
                    TermState {
                        doc_freq: 1,
                        ..Default::default()
                    },
                )
                .unwrap();
            sum_df += 1;
        }
        writer
            .finish_field(None, sum_df, terms.len() as u32)
            .unwrap();

        let meta = &writer.field_metas()[0];
        assert_eq!(meta.num_terms, terms.len() as u64);
        assert_eq!(meta.min_term, terms.first().unwrap().as_bytes());
        assert_eq!(meta.max_term, terms.last().unwrap().as_bytes());

        writer.close().unwrap();
    }
}
