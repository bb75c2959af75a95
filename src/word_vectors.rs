
use crate::error::WeatError;
use crate::files_handling::{read_input, NpyVectors, VectorTable, Word2VecBinary, Word2VecText};
use ndarray::prelude::*;
use ndarray_stats::{errors::MinMaxError, QuantileExt};
use std::collections::HashMap;
use std::fmt::Display;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};


/// How a vector file is laid out on disk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VectorFormat {
    Word2VecText,
    Word2VecBinary,
    Npy,
}

impl VectorFormat {

    /// Picks the format of a custom file from its extension.
    pub fn from_path(path: &str) -> VectorFormat {
        match Path::new(path).extension().and_then(|e| e.to_str()) {
            Some("bin") => VectorFormat::Word2VecBinary,
            Some("npy") => VectorFormat::Npy,
            _ => VectorFormat::Word2VecText,
        }
    }

    fn load(&self, path: &str) -> Result<VectorTable, WeatError> {
        match self {
            VectorFormat::Word2VecText => read_input::<Word2VecText>(path),
            VectorFormat::Word2VecBinary => read_input::<Word2VecBinary>(path),
            VectorFormat::Npy => read_input::<NpyVectors>(path),
        }
    }
}

/// One row of the backend table. `file_name` is `None` when the caller supplies the path.
#[derive(Clone, Copy, Debug)]
pub struct Backend {
    pub name: &'static str,
    pub file_name: Option<&'static str>,
    pub format: Option<VectorFormat>,
}

pub const BACKENDS: [Backend; 4] = [
    Backend { name: "word2vec", file_name: Some("GoogleNews-vectors-negative300.bin"), format: Some(VectorFormat::Word2VecBinary) },
    Backend { name: "glove", file_name: Some("glove.840B.300d_word2vec-format.txt"), format: Some(VectorFormat::Word2VecText) },
    Backend { name: "conceptnet", file_name: Some("numberbatch-en.txt"), format: Some(VectorFormat::Word2VecText) },
    Backend { name: "custom", file_name: None, format: None },
];

impl Backend {

    pub fn from_selector(selector: &str) -> Result<Backend, WeatError> {
        BACKENDS
            .iter()
            .find(|b| b.name == selector)
            .copied()
            .ok_or_else(|| WeatError::Configuration(format!(
                "unknown embedding backend '{}', expected one of: {}",
                selector,
                BACKENDS.iter().map(|b| b.name).collect::<Vec<&str>>().join(", ")
            )))
    }

    /// Resolves the file to load: the fixed name under `word_vector_dir`, or `path` for custom.
    /// An explicit `path` also overrides the fixed name of a named backend.
    fn resolve(&self, word_vector_dir: &str, path: Option<&str>) -> Result<(String, VectorFormat), WeatError> {
        let file = match (path, self.file_name) {
            (Some(path), _) => path.to_owned(),
            (None, Some(file_name)) => Path::new(word_vector_dir).join(file_name).display().to_string(),
            (None, None) => return Err(WeatError::Configuration(format!("backend '{}' needs a path to a vector file", self.name))),
        };
        let format = self.format.unwrap_or_else(|| VectorFormat::from_path(&file));
        Ok((file, format))
    }
}

/// Anything that can hand out a vector for a token.
pub trait VectorGetter {
    fn get_vector(&self, token: &str) -> Result<Array1<f32>, WeatError>;
}

/// The embedding store: one loaded vector table, read only after construction.
pub struct WordVectors {
    name: String,
    w: Array2<f32>,
    t2i: HashMap<String, usize>,
}

impl Display for WordVectors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} embeddings: {} tokens, {} dimensions", self.name, self.t2i.len(), self.dim())
    }
}

impl WordVectors {

    /// Loads the backend named by `selector`. Expensive for the pretrained files, call once.
    pub fn load(selector: &str, word_vector_dir: &str, path: Option<&str>) -> Result<WordVectors, WeatError> {

        let backend = Backend::from_selector(selector)?;
        let (file, format) = backend.resolve(word_vector_dir, path)?;

        info!("loading {} embeddings from {} ({:?})", backend.name, file, format);
        let timer = Instant::now();
        let table = format.load(&file)?;
        let store = WordVectors::from_table(backend.name, &file, table)?;
        info!("loaded {}, took {} seconds", store, timer.elapsed().as_secs());

        Ok(store)
    }

    /// Builds a store from an in-memory token map and matrix.
    pub fn from_parts(name: &str, t2i: HashMap<String, usize>, w: Array2<f32>) -> Result<WordVectors, WeatError> {
        WordVectors::from_table(name, name, VectorTable { t2i, w })
    }

    fn from_table(name: &str, source: &str, table: VectorTable) -> Result<WordVectors, WeatError> {

        match table.w.max() {
            Ok(_) => {},
            Err(MinMaxError::EmptyInput) => return Err(WeatError::format(source, "no vectors")),
            Err(MinMaxError::UndefinedOrder) => return Err(WeatError::format(source, "vectors contain NaN")),
        }
        if let Some((token, i)) = table.t2i.iter().find(|(_, i)| **i >= table.w.dim().0) {
            return Err(WeatError::format(source, format!("token '{}' points to row {} of {}", token, i, table.w.dim().0)));
        }

        Ok(Self {
            name: name.to_owned(),
            w: table.w,
            t2i: table.t2i,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dim(&self) -> usize {
        self.w.dim().1
    }

    pub fn len(&self) -> usize {
        self.t2i.len()
    }

    pub fn is_empty(&self) -> bool {
        self.t2i.is_empty()
    }

    pub fn contains(&self, token: &str) -> bool {
        self.t2i.contains_key(token)
    }

    /// Returns the vector of `token`, falling back to the mean of its space or hyphen
    /// separated parts when the token itself is unknown.
    pub fn lookup(&self, token: &str) -> Result<Array1<f32>, WeatError> {

        if let Some(i) = self.t2i.get(token) {
            return Ok(self.w.row(*i).to_owned());
        }

        let separator = if token.contains(' ') {
            ' '
        } else if token.contains('-') {
            '-'
        } else {
            return Err(WeatError::TokenNotFound(token.to_owned()));
        };

        debug!("'{}' not found in {}, trying its '{}' separated parts", token, self.name, separator);
        let mut sum: Array1<f32> = Array1::zeros(self.dim());
        let mut n = 0;
        for part in token.split(separator) {
            let vec = self.lookup(part).map_err(|_| WeatError::TokenNotFound(token.to_owned()))?;
            sum += &vec;
            n += 1;
        }

        Ok(sum / n as f32)
    }
}

impl VectorGetter for WordVectors {
    fn get_vector(&self, token: &str) -> Result<Array1<f32>, WeatError> {
        self.lookup(token)
    }
}
