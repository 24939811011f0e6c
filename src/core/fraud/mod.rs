// Core fraud module - automated patterns and fraud flag management.

pub mod fraud_models;
pub mod fraud_service;

pub use fraud_models::*;
pub use fraud_service::*;
