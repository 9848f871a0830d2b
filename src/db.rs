pub mod user_repo;
pub use user_repo::UserRepository;
pub mod referral_repo;
pub use referral_repo::ReferralRepository;
pub mod unit_repo;
pub use unit_repo::UnitRepository;
pub mod settings_repo;
pub use settings_repo::SettingsRepository;
pub mod activity_repo;
pub use activity_repo::ActivityRepository;
pub mod reward_repo;
pub use reward_repo::RewardRepository;

#[cfg(test)]
pub mod fixtures;
