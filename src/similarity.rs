
use crate::error::WeatError;
use ndarray::prelude::*;


fn normalize_rows(m: &Array2<f64>) -> Array2<f64> {

    // a zero row divides to NaN, its distances to everything are undefined
    let norms = m.map_axis(Axis(1), |row| row.dot(&row).sqrt());
    m / &norms.insert_axis(Axis(1))
}

/// Pairwise cosine distances, `1 - cos(u_i, v_j)`, of shape (u rows, v rows).
pub fn cosine_distances(u: &Array2<f64>, v: &Array2<f64>) -> Array2<f64> {
    let sims = normalize_rows(u).dot(&normalize_rows(v).t());
    sims.mapv(|s| 1.0 - s)
}

/// Association of every row of `words` to the attribute sets A and B:
/// `s(w, A, B) = mean_b cos_dist(w, b) - mean_a cos_dist(w, a)`.
///
/// Positive values mean `w` lies closer to A than to B. An empty `words` gives
/// an empty result, but both attribute sets must hold at least one vector.
pub fn associate(words: &Array2<f64>, attributes_a: &Array2<f64>, attributes_b: &Array2<f64>) -> Result<Array1<f64>, WeatError> {

    let mean_a = cosine_distances(words, attributes_a)
        .mean_axis(Axis(1))
        .ok_or_else(|| WeatError::InsufficientVocabulary("A".to_string()))?;
    let mean_b = cosine_distances(words, attributes_b)
        .mean_axis(Axis(1))
        .ok_or_else(|| WeatError::InsufficientVocabulary("B".to_string()))?;

    Ok((mean_a - mean_b) * -1.0)
}


#[cfg(test)]
mod tests {

    use super::*;
    use ndarray_rand::rand_distr::Uniform;
    use ndarray_rand::RandomExt;

    const EPS: f64 = 1e-12;

    #[test]
    fn cosine_distance_known_values() {
        let u = array![[1.0, 0.0], [1.0, 1.0]];
        let v = array![[2.0, 0.0], [0.0, 3.0], [-1.0, 0.0]];
        let d = cosine_distances(&u, &v);

        assert_eq!(d.dim(), (2, 3));
        assert!((d[[0, 0]] - 0.0).abs() < EPS);
        assert!((d[[0, 1]] - 1.0).abs() < EPS);
        assert!((d[[0, 2]] - 2.0).abs() < EPS);
        assert!((d[[1, 0]] - (1.0 - 1.0 / 2f64.sqrt())).abs() < EPS);
    }

    #[test]
    fn zero_vector_distance_is_nan() {
        let d = cosine_distances(&array![[0.0, 0.0]], &array![[1.0, 0.0]]);
        assert!(d[[0, 0]].is_nan());
    }

    #[test]
    fn one_value_per_word_in_order() {
        let words = array![[1.0, 0.0], [-1.0, 0.0], [0.0, 1.0]];
        let a = array![[1.0, 0.0]];
        let b = array![[-1.0, 0.0]];
        let s = associate(&words, &a, &b).unwrap();

        assert_eq!(s.len(), 3);
        assert!((s[0] - 2.0).abs() < EPS);
        assert!((s[1] + 2.0).abs() < EPS);
        assert!(s[2].abs() < EPS);
    }

    #[test]
    fn empty_words_give_empty_associations() {
        let words: Array2<f64> = Array2::zeros((0, 2));
        let s = associate(&words, &array![[1.0, 0.0]], &array![[0.0, 1.0]]).unwrap();
        assert!(s.is_empty());
    }

    #[test]
    fn empty_attributes_are_rejected() {
        let empty: Array2<f64> = Array2::zeros((0, 2));
        let words = array![[1.0, 0.0]];
        assert!(associate(&words, &empty, &array![[0.0, 1.0]]).is_err());
        assert!(associate(&words, &array![[0.0, 1.0]], &empty).is_err());
    }

    #[test]
    fn swapping_attributes_negates_associations() {
        let words = Array2::random((7, 16), Uniform::new(-1.0, 1.0));
        let a = Array2::random((5, 16), Uniform::new(-1.0, 1.0));
        let b = Array2::random((4, 16), Uniform::new(-1.0, 1.0));

        let ab = associate(&words, &a, &b).unwrap();
        let ba = associate(&words, &b, &a).unwrap();
        assert_eq!(ab.len(), 7);
        for (x, y) in ab.iter().zip(ba.iter()) {
            assert!((x + y).abs() < EPS);
        }
    }

    #[test]
    fn inputs_are_untouched() {
        let words = array![[3.0, 4.0]];
        let a = array![[1.0, 2.0]];
        let b = array![[-2.0, 1.0]];
        let (w0, a0, b0) = (words.clone(), a.clone(), b.clone());
        associate(&words, &a, &b).unwrap();
        assert_eq!((words, a, b), (w0, a0, b0));
    }
}
