//! End-to-end flow through the public API: a gallery on disk, a file-backed
//! rating database, and a display loop that picks and rates images.

use dressage::{Config, DressageError, RatingStore, SelectOptions, Session};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs;
use std::path::Path;

fn make_gallery(root: &Path, files: &[(&str, usize)]) {
    for (relative, bytes) in files {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, vec![0u8; *bytes]).unwrap();
    }
}

fn session_for(dir: &Path, table: &str, seed: u64) -> Session<StdRng> {
    let config = Config {
        source_root: dir.join("images"),
        database_path: dir.join("dressage.sqlite"),
        table: table.to_string(),
        select: SelectOptions::default(),
    };
    let store = RatingStore::open(&config.database_path, &config.table).unwrap();
    Session::with_rng(store, config, StdRng::seed_from_u64(seed))
}

#[test]
fn display_loop_rates_every_image_once_in_only_unrated_mode() {
    let dir = tempfile::tempdir().unwrap();
    make_gallery(
        &dir.path().join("images"),
        &[
            ("paddock/bay.jpg", 64),
            ("paddock/grey.JPEG", 64),
            ("arena/piaffe.png", 64),
            ("arena/passage.gif", 64),
            ("arena/notes.txt", 64),
            ("huge.bmp", 2_000_000),
        ],
    );

    let mut session = session_for(dir.path(), "ratings", 17);
    session.set_only_unrated(true);

    // Four eligible images: the text file and the oversized bitmap never show up
    for stars in [2u8, 3, 4, 5] {
        let selection = session.select_next().unwrap();
        assert_eq!(selection.rating, 0, "{} was already rated", selection.path);
        session.record_rating(&selection.path, stars).unwrap();
    }

    let ratings = session.store().read_all().unwrap();
    assert_eq!(ratings.len(), 4);
    assert!(!ratings.contains_key("arena/notes.txt"));
    assert!(!ratings.contains_key("huge.bmp"));

    // Everything is rated now, so the flag is ignored and rated images come back
    let selection = session.select_next().unwrap();
    assert!(selection.is_rated());
    assert_eq!(ratings[&selection.path].value(), selection.rating);
}

#[test]
fn ratings_survive_a_restart_and_tables_stay_separate() {
    let dir = tempfile::tempdir().unwrap();
    make_gallery(&dir.path().join("images"), &[("a.png", 8), ("b.png", 8)]);

    {
        let session = session_for(dir.path(), "ratings", 1);
        session.record_rating("a.png", 4).unwrap();
        session.record_rating("a.png", 2).unwrap();
    }

    let reopened = session_for(dir.path(), "ratings", 1);
    let ratings = reopened.store().read_all().unwrap();
    assert_eq!(ratings.len(), 1);
    assert_eq!(ratings["a.png"].value(), 2);

    let other_set = session_for(dir.path(), "second_opinion", 1);
    assert!(other_set.store().is_empty().unwrap());
}

#[test]
fn empty_directory_and_all_hidden_are_distinct_errors() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("images")).unwrap();

    let mut session = session_for(dir.path(), "ratings", 5);
    assert!(matches!(
        session.select_next(),
        Err(DressageError::EmptyCandidateSet { .. })
    ));

    make_gallery(&dir.path().join("images"), &[("only.png", 8)]);
    session.record_rating("only.png", 1).unwrap();
    assert!(matches!(
        session.select_next(),
        Err(DressageError::DegenerateWeight { candidates: 1 })
    ));

    // Raising the rating makes it eligible again
    session.record_rating("only.png", 3).unwrap();
    assert_eq!(session.select_next().unwrap().path, "only.png");
}
