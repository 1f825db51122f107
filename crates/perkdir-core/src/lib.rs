pub mod app_config;
pub mod config;
pub mod error;
pub mod filter;
pub mod merchants;
pub mod perks;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use error::ConfigError;
pub use filter::{apply, summary_text, FilterCriteria, FilteredResult};
pub use merchants::{derive_options, find_option, MerchantOption};
pub use perks::{normalize_merchant, Merchant, MerchantRef, PerkRecord, Visibility};
