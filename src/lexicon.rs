
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};


/// Tokens of each lexicon already known to be missing from one backend.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct KnownOov {
    #[serde(rename = "X", default)]
    pub x: Vec<String>,
    #[serde(rename = "Y", default)]
    pub y: Vec<String>,
    #[serde(rename = "A", default)]
    pub a: Vec<String>,
    #[serde(rename = "B", default)]
    pub b: Vec<String>,
}

/// One entry of the reference test corpus.
///
/// Reference scores are stored flat as `<backend>_result` next to the word lists,
/// everything not named here ends up in `extra`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WeatTest {
    #[serde(rename = "X")]
    pub x: Vec<String>,
    #[serde(rename = "Y")]
    pub y: Vec<String>,
    #[serde(rename = "A")]
    pub a: Vec<String>,
    #[serde(rename = "B")]
    pub b: Vec<String>,
    #[serde(default)]
    pub target_words: String,
    #[serde(default)]
    pub attribute_words: String,
    #[serde(default)]
    pub out_of_vocabularies: HashMap<String, KnownOov>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// The four word lists of a test, ready to be scored.
#[derive(Clone, Debug, PartialEq)]
pub struct Lexicons {
    pub x: Vec<String>,
    pub y: Vec<String>,
    pub a: Vec<String>,
    pub b: Vec<String>,
}

impl WeatTest {

    pub fn reference_score(&self, backend: &str) -> Option<f64> {
        self.extra.get(&format!("{}_result", backend)).and_then(Value::as_f64)
    }

    pub fn lexicons(&self) -> Lexicons {
        Lexicons { x: self.x.clone(), y: self.y.clone(), a: self.a.clone(), b: self.b.clone() }
    }

    /// The word lists without the tokens recorded as OOV for `backend`.
    pub fn lexicons_for(&self, backend: &str) -> Lexicons {

        let known = match self.out_of_vocabularies.get(backend) {
            Some(known) => known,
            None => return self.lexicons(),
        };
        let keep = |words: &[String], drop: &[String]| -> Vec<String> {
            words.iter().filter(|w| !drop.contains(*w)).cloned().collect()
        };

        Lexicons {
            x: keep(&self.x, &known.x),
            y: keep(&self.y, &known.y),
            a: keep(&self.a, &known.a),
            b: keep(&self.b, &known.b),
        }
    }
}

/// A reference test corpus, keyed by test id.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeatTests {
    pub tests: HashMap<String, WeatTest>,
}

impl WeatTests {

    pub fn get(&self, id: &str) -> Option<&WeatTest> {
        self.tests.get(id)
    }

    /// Test ids in natural order, `test2` before `test10`.
    pub fn ids(&self) -> Vec<String> {
        let mut ids = self.tests.keys().cloned().collect::<Vec<String>>();
        ids.sort_by_key(|id| natural_key(id));
        ids
    }
}

fn natural_key(id: &str) -> (String, u64, String) {
    let digits_at = id.find(|c: char| c.is_ascii_digit()).unwrap_or(id.len());
    let (prefix, rest) = id.split_at(digits_at);
    let digits_end = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
    let number = rest[..digits_end].parse::<u64>().unwrap_or(0);
    (prefix.to_owned(), number, rest[digits_end..].to_owned())
}
