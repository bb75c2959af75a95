// End to end runs over the reference lexicons in tests/data.
//
// `glove_reference_scores` needs the pretrained GloVe vectors in `word_vectors/`
// and is ignored by default: cargo test -- --ignored

use std::fs;
use std::io::Write;

use serde_json::{json, Value};
use tempfile::tempdir;
use weat_eval::config::{Config, WEAT_TEST_TOLERANCE, WORD_VECTOR_DIR};
use weat_eval::lexicon::WeatTests;
use weat_eval::{read_input, weat_score, Pipeline, WeatError, WordVectors};

const LEXICON_PATH: &str = "tests/data/weat_tests.json";

fn lexicon() -> WeatTests {
    read_input::<WeatTests>(LEXICON_PATH).unwrap()
}

/// Writes a word2vec text file where X and A words point one way and Y and B words the other.
fn write_polarized_vectors(path: &std::path::Path) {
    let tests = lexicon();
    let test = tests.get("test1").unwrap();

    let mut lines: Vec<String> = Vec::new();
    let positive = test.x.iter().chain(test.a.iter());
    let negative = test.y.iter().chain(test.b.iter());
    for (sign, words) in [(1.0, positive.collect::<Vec<&String>>()), (-1.0, negative.collect::<Vec<&String>>())] {
        for (k, word) in words.into_iter().enumerate() {
            let wobble = (k % 7) as f64 / 10.0;
            lines.push(format!("{} {} {} {}", word, sign, wobble, 0.5 - wobble));
        }
    }

    let mut f = fs::File::create(path).unwrap();
    writeln!(f, "{} 3", lines.len()).unwrap();
    for line in lines {
        writeln!(f, "{}", line).unwrap();
    }
}

#[test]
fn pipeline_scores_custom_vectors() {
    let dir = tempdir().unwrap();
    let vectors = dir.path().join("polarized.txt");
    write_polarized_vectors(&vectors);
    let output_dir = dir.path().join("results");

    let params = Config::from_json(&json!({
        "lexicon_file": LEXICON_PATH,
        "backend": "custom",
        "custom_path": vectors.to_str().unwrap(),
        "tests": ["test1", "test2"],
        "tolerance": 0.6,
        "num_threads": 2,
        "output_dir": output_dir.to_str().unwrap()
    })).unwrap().get_params();

    let outcomes = Pipeline::run(&params).unwrap();
    assert_eq!(outcomes.len(), 2);

    let first = &outcomes[0];
    assert_eq!(first.test, "test1");
    assert!(first.score.unwrap() > 1.5);
    assert_eq!(first.within_tolerance, Some(true));

    // none of the instrument or weapon words are in the file
    let second = &outcomes[1];
    assert_eq!(second.test, "test2");
    assert!(second.score.is_none());
    assert!(second.failed());

    let saved: Value = serde_json::from_str(&fs::read_to_string(output_dir.join("weat_results.json")).unwrap()).unwrap();
    assert_eq!(saved.as_array().unwrap().len(), 2);
    assert_eq!(saved[0]["test"], "test1");
    assert!(saved[1]["error"].is_string());

    match Pipeline::check(&outcomes, params.tolerance) {
        Err(WeatError::TestsFailed { failed, total, .. }) => assert_eq!((failed, total), (1, 2)),
        other => panic!("expected TestsFailed, got {:?}", other),
    }
}

#[test]
fn lexicon_holds_the_ten_replications() {
    let tests = lexicon();
    let expected = (1..=10).map(|i| format!("test{}", i)).collect::<Vec<String>>();
    assert_eq!(tests.ids(), expected);

    for id in tests.ids() {
        let test = tests.get(&id).unwrap();
        assert!(test.reference_score("glove").is_some(), "{} has no glove_result", id);
        let lists = test.lexicons_for("glove");
        assert!(!lists.x.is_empty() && !lists.y.is_empty() && !lists.a.is_empty() && !lists.b.is_empty(), "{} lost a lexicon", id);
    }
}

#[test]
#[ignore]
fn glove_reference_scores() {
    let tests = lexicon();
    let vectors = WordVectors::load("glove", WORD_VECTOR_DIR, None).unwrap();

    for id in tests.ids() {
        let test = tests.get(&id).unwrap();
        let lists = test.lexicons_for("glove");
        let result = weat_score(&lists.x, &lists.y, &lists.a, &lists.b, &vectors).unwrap();
        let reference = test.reference_score("glove").unwrap();
        assert!(
            (result.score - reference).abs() <= WEAT_TEST_TOLERANCE,
            "{}: got {}, expected {} +- {}", id, result.score, reference, WEAT_TEST_TOLERANCE
        );
    }
}
