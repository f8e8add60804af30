use super::query::Distance;

/// Reference distance between two dense vectors, computed locally so it can be
/// logged next to the score the plugin returns.
///
/// Angular distance is `1 - cos(a, b)` and is undefined for zero vectors.
/// Returns `None` for vectors of different length.
pub fn distance(distance: Distance, a: &[f64], b: &[f64]) -> Option<f64> {
    if a.len() != b.len() {
        return None;
    }

    match distance {
        Distance::Angular => {
            let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
            let norms = norm(a) * norm(b);
            if norms == 0.0 {
                return None;
            }
            Some(1.0 - dot / norms)
        }
        Distance::L1 => Some(a.iter().zip(b).map(|(x, y)| (x - y).abs()).sum()),
        Distance::L2 => Some(
            a.iter()
                .zip(b)
                .map(|(x, y)| (x - y).powi(2))
                .sum::<f64>()
                .sqrt(),
        ),
    }
}

/// The score the plugin assigns an exact match at the given distance: `2 - d`
/// (that is `1 + cos`) for angular, `1 / (1 + d)` for L1 and L2
pub fn expected_score(distance_fn: Distance, a: &[f64], b: &[f64]) -> Option<f64> {
    let d = distance(distance_fn, a, b)?;
    match distance_fn {
        Distance::Angular => Some(2.0 - d),
        Distance::L1 | Distance::L2 => Some(1.0 / (1.0 + d)),
    }
}

fn norm(v: &[f64]) -> f64 {
    v.iter().map(|x| x * x).sum::<f64>().sqrt()
}
