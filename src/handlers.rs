// src/handlers.rs

pub mod auth;
pub mod dashboard;
pub mod referrals;
pub mod rewards;
pub mod settings;
pub mod units;
pub mod users;
