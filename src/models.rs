pub mod activity;
pub mod auth;
pub mod dashboard;
pub mod pagination;
pub mod patch;
pub mod referral;
pub mod reward;
pub mod settings;
pub mod unit;
