// Effect size of the Word Embedding Association Test,
// see Caliskan et al. (2017), https://doi.org/10.1126/science.aal4230

use crate::error::WeatError;
use crate::similarity::associate;
use crate::word_vectors::VectorGetter;
use ndarray::{concatenate, prelude::*};
use serde::Serialize;
use tracing::debug;


/// Result of one test: the effect size, the raw test statistic and every
/// out-of-vocabulary token in X, Y, A, B order.
#[derive(Clone, Debug, Serialize)]
pub struct WeatScore {
    pub score: f64,
    pub statistic: f64,
    pub oov: Vec<String>,
}

/// Resolves `tokens` through `getter`, one matrix row per known token.
/// Unknown tokens are skipped and returned separately, in input order.
pub fn embed_token_list<G: VectorGetter + ?Sized>(tokens: &[String], getter: &G) -> Result<(Array2<f64>, Vec<String>), WeatError> {

    let mut rows: Vec<Array1<f64>> = Vec::with_capacity(tokens.len());
    let mut oov: Vec<String> = Vec::new();

    for token in tokens {
        match getter.get_vector(token) {
            Ok(vec) => rows.push(vec.mapv(f64::from)),
            Err(WeatError::TokenNotFound(_)) => {
                debug!("token '{}' is OOV, ignoring", token);
                oov.push(token.to_owned());
            },
            Err(e) => return Err(e),
        }
    }

    let dim = rows.first().map(|r| r.len()).unwrap_or(0);
    let views = rows.iter().map(|r| r.view().insert_axis(Axis(0))).collect::<Vec<ArrayView2<f64>>>();
    let matrix = if views.is_empty() {
        Array2::zeros((0, dim))
    } else {
        concatenate(Axis(0), &views).map_err(|e| WeatError::Configuration(format!("vectors of mixed dimensions: {}", e)))?
    };

    Ok((matrix, oov))
}

/// The WEAT test statistic `sum_x s(x, A, B) - sum_y s(y, A, B)`.
pub fn differential_association(
    x: &Array2<f64>,
    y: &Array2<f64>,
    a: &Array2<f64>,
    b: &Array2<f64>
) -> Result<f64, WeatError> {
    Ok(associate(x, a, b)?.sum() - associate(y, a, b)?.sum())
}

/// Effect size of the association between targets X, Y and attributes A, B,
/// `(mean_x s(x, A, B) - mean_y s(y, A, B)) / std_w s(w, A, B)` over `w` in X and Y.
///
/// Positive scores mean X is closer to A (and Y to B). Well formed inputs stay
/// within [-2, 2].
pub fn weat_score<G: VectorGetter + ?Sized>(
    target_x: &[String],
    target_y: &[String],
    attribute_a: &[String],
    attribute_b: &[String],
    getter: &G
) -> Result<WeatScore, WeatError> {

    let (xv, oov_x) = embed_token_list(target_x, getter)?;
    let (yv, oov_y) = embed_token_list(target_y, getter)?;
    let (av, oov_a) = embed_token_list(attribute_a, getter)?;
    let (bv, oov_b) = embed_token_list(attribute_b, getter)?;

    let empty = [("X", &xv), ("Y", &yv), ("A", &av), ("B", &bv)]
        .iter()
        .filter(|(_, m)| m.nrows() == 0)
        .map(|(name, _)| *name)
        .collect::<Vec<&str>>();
    if !empty.is_empty() {
        return Err(WeatError::InsufficientVocabulary(empty.join(", ")));
    }

    let association_x = associate(&xv, &av, &bv)?;
    let association_y = associate(&yv, &av, &bv)?;

    // both are non-empty here, mean() only fails on empty arrays
    let numerator = association_x.mean().unwrap_or_default() - association_y.mean().unwrap_or_default();
    let statistic = association_x.sum() - association_y.sum();

    let all = concatenate![Axis(0), association_x, association_y];
    let denominator = all.std(0.0);
    if denominator == 0.0 || !denominator.is_finite() {
        return Err(WeatError::DegenerateInput);
    }

    let oov = [oov_x, oov_y, oov_a, oov_b].concat();
    Ok(WeatScore { score: numerator / denominator, statistic, oov })
}
