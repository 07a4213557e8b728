//! Service configuration, from flags or `PDF_BINDER_*` environment variables

use std::path::PathBuf;
use clap::Args;

/// Default cap on a whole upload request body (50 MiB)
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Settings for the HTTP service
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Host address to bind to
    #[arg(long, env = "PDF_BINDER_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, env = "PDF_BINDER_PORT", default_value_t = 5010)]
    pub port: u16,

    /// Root directory for per-request staging directories
    #[arg(long, env = "PDF_BINDER_UPLOAD_DIR", default_value = "uploads")]
    pub upload_dir: PathBuf,

    /// Directory merged results are written to and served from
    #[arg(long, env = "PDF_BINDER_OUTPUT_DIR", default_value = "output")]
    pub output_dir: PathBuf,

    /// PDF whose first page is inserted after odd-length documents
    #[arg(long, env = "PDF_BINDER_BLANK_TEMPLATE", default_value = "Blank PDF Document.pdf")]
    pub blank_template: PathBuf,

    /// Maximum size of an upload request body in bytes
    #[arg(long, env = "PDF_BINDER_MAX_UPLOAD_BYTES", default_value_t = DEFAULT_MAX_UPLOAD_BYTES)]
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5010,
            upload_dir: PathBuf::from("uploads"),
            output_dir: PathBuf::from("output"),
            blank_template: PathBuf::from("Blank PDF Document.pdf"),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl ServerConfig {
    /// `host:port` string suitable for binding a listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        config: ServerConfig,
    }

    #[test]
    fn test_flag_overrides() {
        let cli = TestCli::try_parse_from([
            "pdf-binder",
            "--port", "8080",
            "--output-dir", "/srv/merged",
            "--max-upload-bytes", "1024",
        ]).unwrap();

        assert_eq!(cli.config.port, 8080);
        assert_eq!(cli.config.output_dir, PathBuf::from("/srv/merged"));
        assert_eq!(cli.config.max_upload_bytes, 1024);
    }

    #[test]
    fn test_default_limit_is_fifty_mebibytes() {
        assert_eq!(ServerConfig::default().max_upload_bytes, 52_428_800);
    }

    #[test]
    fn test_bind_address() {
        let config = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 9000,
            ..Default::default()
        };
        assert_eq!(config.bind_address(), "127.0.0.1:9000");
    }
}
