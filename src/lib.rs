pub mod cronos;
pub mod engine;
