// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! Exercises the `Writer` against real `.tim`/`.tip` files on disk rather
//! than in-memory buffers, the way the teacher's segment writer tests do.

mod support;

use block_tree_terms::{BlockTreeOptions, FieldInfo, TermState, Writer};
use std::fs::File;
use support::FixturePostingsWriter;

#[test]
fn writes_tim_and_tip_files_to_a_temp_directory() {
    let dir = tempfile::tempdir().unwrap();
    let tim_path = dir.path().join("segment.tim");
    let tip_path = dir.path().join("segment.tip");

    let tim_file = File::create(&tim_path).unwrap();
    let tip_file = File::create(&tip_path).unwrap();

    let opts = BlockTreeOptions::builder().build().unwrap();
    let mut writer = Writer::new(tim_file, tip_file, FixturePostingsWriter, opts).unwrap();

    writer
        .add_field(FieldInfo {
            field_number: 0,
            has_freqs: false,
        })
        .unwrap();
    for term in ["alpha", "beta", "gamma"] {
        writer.start_term(term.as_bytes()).unwrap();
        writer
            .finish_term(
                term.as_bytes().to_vec(),
                TermState {
                    doc_freq: 1,
                    ..Default::default()
                },
            )
            .unwrap();
    }
    writer.finish_field(None, 3, 3).unwrap();
    writer.close().unwrap();

    assert!(std::fs::metadata(&tim_path).unwrap().len() > 0);
    assert!(std::fs::metadata(&tip_path).unwrap().len() > 0);
}
