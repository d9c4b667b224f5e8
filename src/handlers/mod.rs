// src/handlers/mod.rs

pub mod account;
pub mod exam;
pub mod history;
pub mod learn;
pub mod stats;
