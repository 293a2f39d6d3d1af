pub mod importance;
pub mod model;
pub mod scaler;
pub mod trainer;

pub use model::{FittedModel, ModelKind};
pub use trainer::ModelTrainer;
