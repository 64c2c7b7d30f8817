//! HTTP handlers

pub mod health;
pub mod review;
pub mod status;
