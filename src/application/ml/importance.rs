use super::model::{FittedModel, r2_score};
use crate::domain::errors::ForecastError;
use crate::domain::ml::feature_registry::FEATURE_NAMES;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::collections::BTreeMap;

const PERMUTATION_REPEATS: usize = 5;

/// Permutation importance of every feature column on held-out rows.
///
/// Each column is shuffled `PERMUTATION_REPEATS` times and the mean drop in
/// R² is recorded. Drops are floored at zero and normalised to sum to 1; when
/// no column matters at all the weight is spread evenly.
pub fn permutation_importance(
    model: &FittedModel,
    x: &[Vec<f64>],
    y: &[f64],
    seed: u64,
) -> Result<BTreeMap<String, f64>, ForecastError> {
    let baseline = r2_score(y, &model.predict(x)?);
    let mut rng = StdRng::seed_from_u64(seed);

    let mut drops = Vec::with_capacity(FEATURE_NAMES.len());
    for column in 0..FEATURE_NAMES.len() {
        let mut total = 0.0;
        for _ in 0..PERMUTATION_REPEATS {
            let mut values: Vec<f64> = x.iter().map(|row| row[column]).collect();
            values.shuffle(&mut rng);

            let permuted: Vec<Vec<f64>> = x
                .iter()
                .zip(&values)
                .map(|(row, v)| {
                    let mut row = row.clone();
                    row[column] = *v;
                    row
                })
                .collect();
            total += baseline - r2_score(y, &model.predict(&permuted)?);
        }
        drops.push((total / PERMUTATION_REPEATS as f64).max(0.0));
    }

    let sum: f64 = drops.iter().sum();
    let even = 1.0 / FEATURE_NAMES.len() as f64;
    Ok(FEATURE_NAMES
        .iter()
        .zip(drops)
        .map(|(name, drop)| {
            let weight = if sum > 0.0 { drop / sum } else { even };
            (name.to_string(), weight)
        })
        .collect())
}
