pub mod forecast_service;
pub mod traditional;
