// imports
use crate::config::RunParams;
use crate::error::WeatError;
use crate::files_handling::{read_input, save_output};
use crate::lexicon::WeatTests;
use crate::weat::weat_score;
use crate::word_vectors::{VectorGetter, WordVectors};

use rayon::{prelude::*, ThreadPoolBuilder};
use serde::Serialize;
use std::time::Instant;
use tracing::{info, warn};


/// What one reference test came out as. `score` is `None` when scoring failed,
/// `delta` and `within_tolerance` are `None` without a reference score.
#[derive(Clone, Debug, Serialize)]
pub struct TestOutcome {
    pub test: String,
    pub description: String,
    pub score: Option<f64>,
    pub statistic: Option<f64>,
    pub reference: Option<f64>,
    pub delta: Option<f64>,
    pub within_tolerance: Option<bool>,
    pub oov: Vec<String>,
    pub error: Option<String>,
}

impl TestOutcome {

    /// A test fails when it could not be scored or missed its reference.
    pub fn failed(&self) -> bool {
        self.error.is_some() || self.within_tolerance == Some(false)
    }
}

pub struct Pipeline {}

impl Pipeline {

    // runs the main procedure of 3 steps -
    // -> load the lexicons
    // -> load the embeddings, once
    // -> score every selected test against the shared embeddings
    // the outcomes come back even when tests failed, `check` turns them into a verdict

    pub fn run(params: &RunParams) -> Result<Vec<TestOutcome>, WeatError> {

        info!("{}", params);

        let tests = read_input::<WeatTests>(&params.lexicon_file)?;
        let ids = Pipeline::select_ids(&tests, params.tests.as_deref())?;
        info!("loaded {} tests from {}, running {}", tests.tests.len(), params.lexicon_file, ids.len());

        let store = WordVectors::load(&params.backend, &params.word_vector_dir, params.custom_path.as_deref())?;

        let timer = Instant::now();
        let pool = ThreadPoolBuilder::new()
            .num_threads(params.num_threads)
            .build()
            .map_err(|e| WeatError::Configuration(e.to_string()))?;
        let outcomes = pool.install(|| Pipeline::score_tests(&tests, &ids, &store, params));
        info!("scored {} tests, took {} ms", outcomes.len(), timer.elapsed().as_millis());

        if let Some(output_dir) = &params.output_dir {
            save_output(output_dir, "weat_results", &outcomes)?;
            info!("saved results to {}/weat_results.json", output_dir);
        }

        Ok(outcomes)
    }

    /// Errors with `TestsFailed` when any outcome could not be scored or missed its reference.
    pub fn check(outcomes: &[TestOutcome], tolerance: f64) -> Result<(), WeatError> {
        let failed = outcomes.iter().filter(|o| o.failed()).count();
        if failed > 0 {
            return Err(WeatError::TestsFailed { failed, total: outcomes.len(), tolerance });
        }
        Ok(())
    }

    /// The requested ids, or every id in natural order.
    pub fn select_ids(tests: &WeatTests, requested: Option<&[String]>) -> Result<Vec<String>, WeatError> {
        match requested {
            None => Ok(tests.ids()),
            Some(requested) => {
                if let Some(missing) = requested.iter().find(|id| tests.get(id).is_none()) {
                    return Err(WeatError::Configuration(format!("test '{}' is not in the lexicon file", missing)));
                }
                Ok(requested.to_vec())
            }
        }
    }

    /// Scores `ids` in parallel. The store is only read, so one instance serves every test.
    pub fn score_tests<G: VectorGetter + Sync>(tests: &WeatTests, ids: &[String], store: &G, params: &RunParams) -> Vec<TestOutcome> {

        ids.par_iter()
            .filter_map(|id| tests.get(id).map(|test| (id, test)))
            .map(|(id, test)| {

                let lexicons = if params.drop_known_oov {
                    test.lexicons_for(&params.backend)
                } else {
                    test.lexicons()
                };
                let reference = test.reference_score(&params.backend);
                let description = format!("{} / {}", test.target_words, test.attribute_words);

                let mut outcome = TestOutcome {
                    test: id.to_owned(),
                    description,
                    score: None,
                    statistic: None,
                    reference,
                    delta: None,
                    within_tolerance: None,
                    oov: Vec::new(),
                    error: None,
                };

                match weat_score(&lexicons.x, &lexicons.y, &lexicons.a, &lexicons.b, store) {
                    Ok(result) => {
                        outcome.delta = reference.map(|r| (result.score - r).abs());
                        outcome.within_tolerance = outcome.delta.map(|d| d <= params.tolerance);
                        outcome.score = Some(result.score);
                        outcome.statistic = Some(result.statistic);
                        outcome.oov = result.oov;
                    },
                    Err(e) => outcome.error = Some(e.to_string()),
                }

                Pipeline::log_outcome(&outcome);
                outcome
            })
            .collect()
    }

    fn log_outcome(outcome: &TestOutcome) {
        match (&outcome.error, outcome.score) {
            (Some(e), _) => warn!("{} could not be scored: {}", outcome.test, e),
            (None, Some(score)) => {
                if outcome.within_tolerance == Some(false) {
                    warn!("{} ({}): score {:.4} is off reference {:?} by {:.4}", outcome.test, outcome.description, score, outcome.reference, outcome.delta.unwrap_or_default());
                } else {
                    info!("{} ({}): score {:.4}, reference {:?}", outcome.test, outcome.description, score, outcome.reference);
                }
                if !outcome.oov.is_empty() {
                    info!("{} OOV tokens: {}", outcome.test, outcome.oov.join(", "));
                }
            },
            (None, None) => {},
        }
    }

}


#[cfg(test)]
mod tests {

    use super::*;
    use crate::config::Config;
    use ndarray::array;
    use serde_json::json;
    use std::collections::HashMap;

    fn store() -> WordVectors {
        let tokens = ["rose", "tulip", "ant", "wasp", "love", "peace", "filth", "death"];
        let t2i: HashMap<String, usize> = tokens.iter().enumerate().map(|(i, t)| (t.to_string(), i)).collect();
        let w = array![
            [1.0f32, 0.1], [0.9, 0.2], [-1.0, 0.1], [-0.9, -0.2],
            [1.0, 0.0], [0.8, 0.1], [-1.0, 0.0], [-0.8, 0.1]
        ];
        WordVectors::from_parts("glove", t2i, w).unwrap()
    }

    fn corpus() -> WeatTests {
        serde_json::from_value(json!({
            "test1": {
                "X": ["rose", "tulip", "aster"], "Y": ["ant", "wasp"],
                "A": ["love", "peace"], "B": ["filth", "death"],
                "target_words": "Flowers vs. Insects",
                "attribute_words": "Pleasant vs. Unpleasant",
                "out_of_vocabularies": {"glove": {"X": ["aster"], "Y": [], "A": [], "B": []}},
                "glove_result": 1.9
            },
            "test2": {
                "X": ["rose"], "Y": ["ant"], "A": ["unknown"], "B": ["death"],
                "glove_result": 1.0
            },
            "test3": {
                "X": ["rose", "tulip"], "Y": ["ant", "wasp"], "A": ["love"], "B": ["death"],
                "glove_result": -1.5
            }
        })).unwrap()
    }

    fn params(extra: serde_json::Value) -> RunParams {
        let mut json = json!({"lexicon_file": "unused.json", "num_threads": 2});
        if let (Some(base), Some(extra)) = (json.as_object_mut(), extra.as_object()) {
            base.extend(extra.clone());
        }
        Config::from_json(&json).unwrap().get_params()
    }

    #[test]
    fn scores_and_compares_to_reference() {
        let tests = corpus();
        let ids = tests.ids();
        let outcomes = Pipeline::score_tests(&tests, &ids, &store(), &params(json!({"tolerance": 0.2})));

        assert_eq!(outcomes.iter().map(|o| o.test.as_str()).collect::<Vec<&str>>(), vec!["test1", "test2", "test3"]);

        let first = &outcomes[0];
        assert!(first.score.unwrap() > 1.8);
        assert_eq!(first.within_tolerance, Some(true));
        assert!(first.oov.is_empty());
        assert!(!first.failed());

        let second = &outcomes[1];
        assert!(second.error.as_deref().unwrap().contains("out of vocabulary"));
        assert!(second.failed());

        let third = &outcomes[2];
        assert!(third.score.unwrap() > 0.0);
        assert_eq!(third.within_tolerance, Some(false));
        assert!(third.failed());
    }

    #[test]
    fn check_fails_on_errors_and_misses() {
        let tests = corpus();
        let ids = tests.ids();
        let outcomes = Pipeline::score_tests(&tests, &ids, &store(), &params(json!({"tolerance": 0.2})));

        match Pipeline::check(&outcomes, 0.2) {
            Err(WeatError::TestsFailed { failed, total, .. }) => assert_eq!((failed, total), (2, 3)),
            other => panic!("expected TestsFailed, got {:?}", other),
        }
        assert!(Pipeline::check(&outcomes[..1], 0.2).is_ok());
    }

    #[test]
    fn keeps_known_oov_when_asked() {
        let tests = corpus();
        let ids = vec!["test1".to_string()];
        let outcomes = Pipeline::score_tests(&tests, &ids, &store(), &params(json!({"drop_known_oov": false})));
        assert_eq!(outcomes[0].oov, vec!["aster"]);
    }

    #[test]
    fn selects_requested_tests() {
        let tests = corpus();
        let requested = vec!["test3".to_string()];
        assert_eq!(Pipeline::select_ids(&tests, Some(&requested)).unwrap(), requested);

        let missing = vec!["test9".to_string()];
        assert!(matches!(Pipeline::select_ids(&tests, Some(&missing)), Err(WeatError::Configuration(_))));
    }
}
