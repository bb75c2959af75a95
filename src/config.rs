
use crate::error::WeatError;
use crate::word_vectors::Backend;
use serde_json::Value;
use std::fmt::Display;
use std::fs::File;
use std::io::BufReader;

/// Allowed distance between a computed score and its published reference.
pub const WEAT_TEST_TOLERANCE: f64 = 0.03;

/// Directory holding the pre-trained word vector files.
pub const WORD_VECTOR_DIR: &str = "word_vectors";

#[derive(Clone, Debug)]
pub struct RunParams {
    pub lexicon_file: String,
    pub backend: String,
    pub word_vector_dir: String,
    pub custom_path: Option<String>,
    pub tolerance: f64,
    pub num_threads: usize,
    pub tests: Option<Vec<String>>,
    pub drop_known_oov: bool,
    pub output_dir: Option<String>,
}

impl Display for RunParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "using run params:
        lexicon_file: {}
        backend: {}
        word_vector_dir: {}
        custom_path: {:?}
        tolerance: {}
        num_threads: {}
        tests: {:?}
        drop_known_oov: {}
        output_dir: {:?}",
        self.lexicon_file, self.backend, self.word_vector_dir, self.custom_path, self.tolerance,
        self.num_threads, self.tests, self.drop_known_oov, self.output_dir)
    }
}

pub struct Config {
    params: RunParams
}

fn bad(key: &str, expected: &str) -> WeatError {
    WeatError::Configuration(format!("given {} is not {}", key, expected))
}

impl Config {

    pub fn get_params(&self) -> RunParams {
        self.params.clone()
    }

    /// Reads run parameters from a json file, see `from_json` for the keys.
    pub fn new(json_path: &str) -> Result<Config, WeatError> {
        let f = BufReader::new(File::open(json_path)?);
        let json: Value = serde_json::from_reader(f)?;
        Config::from_json(&json)
    }

    pub fn from_json(json: &Value) -> Result<Config, WeatError> {

        // the lexicon is the only required input
        let lexicon_file = json.get("lexicon_file")
            .ok_or_else(|| WeatError::Configuration("lexicon_file was not supplied through json".to_string()))?
            .as_str().ok_or_else(|| bad("lexicon_file", "a string"))?;

        // handle default vs input parameters
        let backend = match json.get("backend") {
            Some(backend) => backend.as_str().ok_or_else(|| bad("backend", "a string"))?,
            None => "glove"
        };
        let word_vector_dir = match json.get("word_vector_dir") {
            Some(dir) => dir.as_str().ok_or_else(|| bad("word_vector_dir", "a string"))?,
            None => WORD_VECTOR_DIR
        };
        let custom_path = match json.get("custom_path") {
            Some(Value::Null) | None => None,
            Some(path) => Some(path.as_str().ok_or_else(|| bad("custom_path", "a string"))?.to_owned()),
        };
        let tolerance = match json.get("tolerance") {
            Some(tolerance) => tolerance.as_f64().ok_or_else(|| bad("tolerance", "numeric"))?,
            None => WEAT_TEST_TOLERANCE
        };
        let num_threads = match json.get("num_threads") {
            Some(num_threads) => num_threads.as_u64().ok_or_else(|| bad("num_threads", "a positive integer"))?,
            None => 4
        };
        let tests = match json.get("tests") {
            Some(Value::Null) | None => None,
            Some(tests) => Some(
                tests.as_array().ok_or_else(|| bad("tests", "a list"))?
                .iter()
                .map(|t| t.as_str().map(str::to_owned).ok_or_else(|| bad("tests", "a list of strings")))
                .collect::<Result<Vec<String>, WeatError>>()?
            ),
        };
        let drop_known_oov = match json.get("drop_known_oov") {
            Some(drop) => drop.as_bool().ok_or_else(|| bad("drop_known_oov", "boolean"))?,
            None => true
        };
        let output_dir = match json.get("output_dir") {
            Some(Value::Null) | None => None,
            Some(dir) => Some(dir.as_str().ok_or_else(|| bad("output_dir", "a string"))?.to_owned()),
        };

        // fail on a bad backend now rather than after reading the lexicon
        Backend::from_selector(backend)?;
        if tolerance < 0.0 {
            return Err(bad("tolerance", "a non-negative number"));
        }
        if num_threads == 0 {
            return Err(bad("num_threads", "a positive integer"));
        }

        let params = RunParams {
            lexicon_file: lexicon_file.to_owned(),
            backend: backend.to_owned(),
            word_vector_dir: word_vector_dir.to_owned(),
            custom_path,
            tolerance,
            num_threads: num_threads as usize,
            tests,
            drop_known_oov,
            output_dir,
        };

        Ok(
            Self {
                params
            }
        )
    }

}
