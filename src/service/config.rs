//! Service configuration.

use crate::fill::FillOptions;
use crate::store::DEFAULT_TEMPLATE_NAME;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Default listen address.
pub const DEFAULT_BIND: &str = "127.0.0.1:5000";

/// Default directory holding the uploaded template.
pub const DEFAULT_STORAGE_DIR: &str = "uploads";

/// Default prefix of the returned file name.
pub const DEFAULT_OUTPUT_PREFIX: &str = "modified_";

/// Default request body limit (50 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Options for the HTTP service.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Address to listen on
    pub bind: SocketAddr,

    /// Directory holding the template
    pub storage_dir: PathBuf,

    /// Stored template file name
    pub template_name: String,

    /// Prefix prepended to the template name for processed files
    pub output_prefix: String,

    /// Maximum request body size in bytes
    pub max_upload_bytes: usize,

    /// Substitution options
    pub fill: FillOptions,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 5000)),
            storage_dir: PathBuf::from(DEFAULT_STORAGE_DIR),
            template_name: DEFAULT_TEMPLATE_NAME.to_string(),
            output_prefix: DEFAULT_OUTPUT_PREFIX.to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            fill: FillOptions::default(),
        }
    }
}

impl ServiceConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bind(mut self, bind: SocketAddr) -> Self {
        self.bind = bind;
        self
    }

    pub fn with_storage_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.storage_dir = dir.into();
        self
    }

    pub fn with_template_name(mut self, name: impl Into<String>) -> Self {
        self.template_name = name.into();
        self
    }

    pub fn with_output_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.output_prefix = prefix.into();
        self
    }

    /// Set the request body limit in bytes.
    pub fn with_max_upload_bytes(mut self, bytes: usize) -> Self {
        self.max_upload_bytes = bytes;
        self
    }

    pub fn with_fill_options(mut self, options: FillOptions) -> Self {
        self.fill = options;
        self
    }

    /// File name reported for a processed presentation.
    pub fn output_file_name(&self) -> String {
        format!("{}{}", self.output_prefix, self.template_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fill::TableMatching;

    #[test]
    fn test_default_config() {
        let config = ServiceConfig::default();
        assert_eq!(config.bind.to_string(), DEFAULT_BIND);
        assert_eq!(config.storage_dir, PathBuf::from("uploads"));
        assert_eq!(config.max_upload_bytes, 52_428_800);
        assert_eq!(config.output_file_name(), "modified_TEMPLATE_SALES.pptx");
        assert_eq!(config.fill.table_matching, TableMatching::PerRun);
    }

    #[test]
    fn test_builder() {
        let config = ServiceConfig::new()
            .with_template_name("deck.pptx")
            .with_output_prefix("filled-")
            .with_max_upload_bytes(1024)
            .with_fill_options(FillOptions::new().with_table_matching(TableMatching::WholeCell));

        assert_eq!(config.output_file_name(), "filled-deck.pptx");
        assert_eq!(config.max_upload_bytes, 1024);
        assert_eq!(config.fill.table_matching, TableMatching::WholeCell);
    }
}
