use crate::state::data::Rating;

/// Exponent used for files that have never been rated.
/// Sits between a "3" and a "4" so fresh images beat mediocre ones.
pub const UNRATED_EXPONENT: f64 = 3.5;

/// Sampling weight of a file given its rating.
///
/// A rating of 1 hides the file (weight 0); any other rating r gives 2^r.
pub fn weight(rating: Option<Rating>) -> f64 {
    match rating {
        Some(rating) if rating.value() == 1 => 0.0,
        Some(rating) => 2f64.powi(i32::from(rating.value())),
        None => 2f64.powf(UNRATED_EXPONENT),
    }
}

/// Divide each weight by the total. Returns None when the total is zero.
pub fn normalize(weights: &[f64]) -> Option<Vec<f64>> {
    let total: f64 = weights.iter().sum();
    if total <= 0.0 {
        return None;
    }
    Some(weights.iter().map(|w| w / total).collect())
}
