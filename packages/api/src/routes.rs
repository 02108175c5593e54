pub mod health;
pub mod metadata;
pub mod models;
pub mod predict;
