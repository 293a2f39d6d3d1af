pub mod history_period;
pub mod price;
