// src/models/mod.rs

pub mod account;
pub mod exam;
pub mod learn;
pub mod question;
pub mod stats;
