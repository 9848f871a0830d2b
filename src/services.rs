pub mod analytics;
pub mod auth;
pub mod dashboard_service;
pub mod export_service;
pub mod notification_service;
pub mod referral_service;
pub mod referral_workflow;
pub mod reward_service;
pub mod user_service;
