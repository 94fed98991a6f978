//! Default configuration values for heapscope

use serde::{Deserialize, Serialize};

/// Default configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigDefaults {
    pub scan: ScanDefaults,
    pub logging: LoggingDefaults,
}

/// Default scan configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanDefaults {
    pub top_n: usize,
    pub min_expand_size: usize,
    pub verbose: bool,
}

/// Default logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingDefaults {
    pub level: String,
    pub file: String,
}

/// Returns the default configuration
pub fn default_config() -> ConfigDefaults {
    ConfigDefaults {
        scan: ScanDefaults {
            top_n: 20,
            min_expand_size: 8,
            verbose: false,
        },
        logging: LoggingDefaults {
            level: "info".to_string(),
            file: "heapscope.log".to_string(),
        },
    }
}
