pub mod health;
pub mod prediction;
