use crate::domain::config::forecast_config::ModelParams;
use crate::domain::errors::ForecastError;
use smartcore::ensemble::random_forest_regressor::{
    RandomForestRegressor, RandomForestRegressorParameters,
};
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::linear::linear_regression::{
    LinearRegression, LinearRegressionParameters, LinearRegressionSolverName,
};

/// Candidate model families, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelKind {
    RandomForest,
    LinearRegression,
}

impl ModelKind {
    pub const ALL: [ModelKind; 2] = [ModelKind::RandomForest, ModelKind::LinearRegression];

    pub fn name(&self) -> &'static str {
        match self {
            ModelKind::RandomForest => "RandomForest",
            ModelKind::LinearRegression => "LinearRegression",
        }
    }

    /// Trees split on raw values; the linear family is fitted on standardised
    /// features.
    pub fn uses_scaled_features(&self) -> bool {
        matches!(self, ModelKind::LinearRegression)
    }

    pub fn fit(
        &self,
        x: &[Vec<f64>],
        y: &[f64],
        params: &ModelParams,
    ) -> Result<FittedModel, ForecastError> {
        let matrix = to_matrix(*self, x)?;
        let y = y.to_vec();

        match self {
            ModelKind::RandomForest => {
                let rf_params = RandomForestRegressorParameters::default()
                    .with_n_trees(params.n_trees)
                    .with_max_depth(params.max_depth)
                    .with_min_samples_split(params.min_samples_split)
                    .with_seed(params.seed);
                RandomForestRegressor::fit(&matrix, &y, rf_params)
                    .map(FittedModel::RandomForest)
                    .map_err(|e| fit_failure(*self, format!("Training error: {}", e)))
            }
            ModelKind::LinearRegression => {
                let lr_params = LinearRegressionParameters::default()
                    .with_solver(LinearRegressionSolverName::SVD);
                LinearRegression::fit(&matrix, &y, lr_params)
                    .map(FittedModel::LinearRegression)
                    .map_err(|e| fit_failure(*self, format!("Training error: {}", e)))
            }
        }
    }
}

pub enum FittedModel {
    RandomForest(RandomForestRegressor<f64, f64, DenseMatrix<f64>, Vec<f64>>),
    LinearRegression(LinearRegression<f64, f64, DenseMatrix<f64>, Vec<f64>>),
}

impl FittedModel {
    pub fn kind(&self) -> ModelKind {
        match self {
            FittedModel::RandomForest(_) => ModelKind::RandomForest,
            FittedModel::LinearRegression(_) => ModelKind::LinearRegression,
        }
    }

    /// Predicts one value per input row. Non-finite outputs count as a
    /// failure of the model.
    pub fn predict(&self, x: &[Vec<f64>]) -> Result<Vec<f64>, ForecastError> {
        let kind = self.kind();
        let matrix = to_matrix(kind, x)?;

        let predictions = match self {
            FittedModel::RandomForest(model) => model.predict(&matrix),
            FittedModel::LinearRegression(model) => model.predict(&matrix),
        }
        .map_err(|e| fit_failure(kind, format!("Predict error: {}", e)))?;

        if predictions.len() != x.len() || predictions.iter().any(|p| !p.is_finite()) {
            return Err(fit_failure(kind, "non-finite prediction".to_string()));
        }
        Ok(predictions)
    }

    pub fn predict_row(&self, row: &[f64]) -> Result<f64, ForecastError> {
        let predictions = self.predict(&[row.to_vec()])?;
        predictions
            .first()
            .copied()
            .ok_or_else(|| fit_failure(self.kind(), "No prediction returned".to_string()))
    }
}

fn to_matrix(kind: ModelKind, x: &[Vec<f64>]) -> Result<DenseMatrix<f64>, ForecastError> {
    DenseMatrix::from_2d_vec(&x.to_vec())
        .map_err(|e| fit_failure(kind, format!("Matrix error: {}", e)))
}

fn fit_failure(kind: ModelKind, reason: String) -> ForecastError {
    ForecastError::ModelFitFailure {
        model: kind.name().to_string(),
        reason,
    }
}

/// Coefficient of determination.
///
/// A constant target scores 1.0 when matched exactly and 0.0 otherwise.
pub fn r2_score(actual: &[f64], predicted: &[f64]) -> f64 {
    let n = actual.len();
    if n == 0 || n != predicted.len() {
        return 0.0;
    }

    let mean = actual.iter().sum::<f64>() / n as f64;
    let ss_res: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).powi(2))
        .sum();
    let ss_tot: f64 = actual.iter().map(|a| (a - mean).powi(2)).sum();

    if ss_tot > 0.0 {
        1.0 - ss_res / ss_tot
    } else if ss_res == 0.0 {
        1.0
    } else {
        0.0
    }
}
