pub mod app_config;
pub mod config;
pub mod money;
pub mod pricing;
pub mod profile;

use thiserror::Error;

pub use app_config::AppConfig;
pub use config::{load_app_config, load_app_config_from_env};
pub use money::{Money, Rate};
pub use pricing::{
    DeliveryOption, FeeSchedule, PriceBreakdown, PriceSnapshot, RoundingPolicy, SnapshotError,
};
pub use profile::{
    builtin_profile, load_profile, BidSourceConfig, DeliveryRegionConfig, SiteProfile,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read site profile {path}: {source}")]
    ProfileFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse site profile: {0}")]
    ProfileParse(#[from] serde_yaml::Error),

    #[error("invalid site profile: {0}")]
    Validation(String),
}
