use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(author, version, about = "Acne detection demo with AI skincare advice", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the web server
    Serve(Config),
    /// Upload a photo to a running server and print the results
    Scan(ScanArgs),
}

#[derive(Debug, Clone, Args)]
pub struct Config {
    /// Server host to bind to
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Server port to bind to
    #[arg(long, env = "PORT", default_value = "3000")]
    pub port: u16,

    /// Base URL of the inference server exposing /detect and /health
    #[arg(long, env = "INFERENCE_BASE_URL", default_value = "http://localhost:8000")]
    pub inference_base_url: String,

    /// Base URL of the OpenAI-compatible API
    #[arg(long, env = "OPENAI_BASE_URL", default_value = "https://api.openai.com")]
    pub openai_base_url: String,

    /// Base URL of the Google Generative Language API
    #[arg(
        long,
        env = "GEMINI_BASE_URL",
        default_value = "https://generativelanguage.googleapis.com"
    )]
    pub gemini_base_url: String,

    /// Largest accepted upload, in bytes
    #[arg(long, env = "MAX_UPLOAD_BYTES", default_value = "10485760")]
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Args)]
pub struct ScanArgs {
    /// Photo to upload
    pub image: PathBuf,

    /// Address of a running `serve` instance
    #[arg(long, env = "ACNE_SCAN_SERVER", default_value = "http://localhost:3000")]
    pub server: String,

    /// Minimum detection confidence, 0.1 to 0.9
    #[arg(long, default_value = "0.25")]
    pub confidence_threshold: f64,

    /// Model used for the written analysis
    #[arg(long, default_value = "gemini-pro")]
    pub model: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_flags() {
        let cli = Cli::try_parse_from([
            "acne-scan",
            "serve",
            "--host",
            "127.0.0.1",
            "--port",
            "3100",
            "--inference-base-url",
            "http://detector:8000",
        ])
        .unwrap();
        let Command::Serve(config) = cli.command else {
            panic!("expected serve");
        };
        assert_eq!(config.server_address(), "127.0.0.1:3100");
        assert_eq!(config.inference_base_url, "http://detector:8000");
    }

    #[test]
    fn scan_arguments() {
        let cli = Cli::try_parse_from([
            "acne-scan",
            "scan",
            "face.jpg",
            "--confidence-threshold",
            "0.4",
            "--model",
            "gpt-4",
        ])
        .unwrap();
        let Command::Scan(args) = cli.command else {
            panic!("expected scan");
        };
        assert_eq!(args.image, PathBuf::from("face.jpg"));
        assert_eq!(args.confidence_threshold, 0.4);
        assert_eq!(args.model, "gpt-4");
    }
}
