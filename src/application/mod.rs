// Application layer - Use cases and orchestration
pub mod forecast_service;
pub mod reading_repository;
pub mod trainer;
