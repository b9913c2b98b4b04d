pub mod core;
pub mod loader;

pub use self::core::{CovstackConfig, ScanConfig};
pub use loader::{
    load_config, load_config_from, load_config_from_path, parse_and_validate_config,
    CONFIG_FILE_NAME,
};
