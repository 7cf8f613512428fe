use crate::output::OutputFormat;
use crate::tracing::{LogLevel, TracingFormat};
use clap::{Args, Parser, Subcommand};
use get_aws_secret::{GetSecretOptions, SecretError, TextEncoding};
use miette::{Diagnostic, Report};
use thiserror::Error;

/// Exit codes for the CLI application
pub const EXIT_OK: i32 = 0;
/// CLI or configuration error exit code
pub const EXIT_CLI: i32 = 2;
/// Secret retrieval or decoding error exit code
pub const EXIT_SECRET: i32 = 3;

/// CLI-specific error types with exit code mapping
#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    /// CLI or configuration error (exit code 2)
    #[error("CLI/configuration error: {message}")]
    #[diagnostic(code(get_aws_secret::cli::config))]
    Config {
        /// The error message
        message: String,
        /// Optional help text
        #[help]
        help: Option<String>,
    },
    /// Secret could not be fetched or decoded (exit code 3)
    #[error("Secret retrieval failed")]
    #[diagnostic(
        code(get_aws_secret::cli::secret),
        help("Run with --level debug for request details")
    )]
    Secret {
        /// The library error
        #[source]
        source: SecretError,
    },
    /// Output could not be written (exit code 3)
    #[error("Failed to write secret to stdout")]
    #[diagnostic(code(get_aws_secret::cli::io))]
    Io {
        /// The I/O error
        #[source]
        source: std::io::Error,
    },
}

impl CliError {
    /// Create a new configuration error with help text
    #[must_use]
    pub fn config_with_help(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            help: Some(help.into()),
        }
    }
}

impl From<SecretError> for CliError {
    fn from(source: SecretError) -> Self {
        Self::Secret { source }
    }
}

impl From<std::io::Error> for CliError {
    fn from(source: std::io::Error) -> Self {
        Self::Io { source }
    }
}

/// Map an error to its process exit code
#[must_use]
pub const fn exit_code_for(err: &CliError) -> i32 {
    match err {
        CliError::Config { .. } => EXIT_CLI,
        CliError::Secret { .. } | CliError::Io { .. } => EXIT_SECRET,
    }
}

/// Render an error to stderr as a miette report
#[allow(clippy::print_stderr)]
pub fn render_error(err: CliError) {
    eprintln!("{:?}", Report::new(err));
}

#[derive(Parser, Debug)]
#[command(name = "get-aws-secret")]
#[command(about = "Fetch and decode secrets from AWS Secrets Manager")]
#[command(long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(
        short = 'l',
        long,
        global = true,
        help = "Set logging level",
        default_value = "warn",
        value_enum
    )]
    pub level: LogLevel,

    #[arg(
        long,
        global = true,
        help = "Log output format",
        default_value = "compact",
        value_enum
    )]
    pub log_format: TracingFormat,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(about = "Fetch a secret and write its value to stdout")]
    Get(GetArgs),
}

#[derive(Args, Debug)]
pub struct GetArgs {
    #[arg(help = "Secret name or ARN")]
    pub secret_id: String,

    #[arg(
        long,
        env = "GET_AWS_SECRET_MEMOIZE",
        help = "Reuse and store the value in an environment variable named after the secret"
    )]
    pub memoize: bool,

    #[arg(long, env = "GET_AWS_SECRET_VERSION_ID", help = "Version ID to fetch")]
    pub version_id: Option<String>,

    #[arg(
        long,
        env = "GET_AWS_SECRET_VERSION_STAGE",
        help = "Version stage to fetch (e.g. AWSCURRENT, AWSPREVIOUS)"
    )]
    pub version_stage: Option<String>,

    #[arg(long, help = "Do not base64-decode binary secrets")]
    pub no_base64_decode: bool,

    #[arg(long, help = "Do not decode binary secrets into text")]
    pub no_bytes_decode: bool,

    #[arg(
        long,
        env = "GET_AWS_SECRET_ENCODING",
        value_parser = parse_encoding,
        help = "Text encoding for binary secrets (utf-8, ascii, latin-1, utf-16-le, utf-16-be)"
    )]
    pub encoding: Option<TextEncoding>,

    #[arg(long, help = "Print JSON secrets verbatim instead of parsing them")]
    pub no_load_json: bool,

    #[arg(
        long,
        env = "GET_AWS_SECRET_OPTIONS",
        help = "JSON document of options; flags override its fields"
    )]
    pub options: Option<String>,

    #[arg(
        long,
        short = 'o',
        help = "Output format",
        default_value = "text",
        value_enum
    )]
    pub output: OutputFormat,
}

fn parse_encoding(value: &str) -> Result<TextEncoding, String> {
    value.parse().map_err(|e: SecretError| e.to_string())
}

impl GetArgs {
    /// Build lookup options from the JSON document (if any) and the flags.
    pub fn to_options(&self) -> Result<GetSecretOptions, CliError> {
        let mut options = match &self.options {
            Some(doc) => serde_json::from_str::<GetSecretOptions>(doc).map_err(|e| {
                CliError::config_with_help(
                    format!("Invalid --options document: {e}"),
                    r#"Example: --options '{"memoize": true, "versionStage": "AWSPREVIOUS"}'"#,
                )
            })?,
            None => GetSecretOptions::default(),
        };

        if self.memoize {
            options.memoize = true;
        }
        if let Some(version_id) = &self.version_id {
            options.version_id = Some(version_id.clone());
        }
        if let Some(version_stage) = &self.version_stage {
            options.version_stage = Some(version_stage.clone());
        }
        if self.no_base64_decode {
            options.base64_decode = false;
        }
        if self.no_bytes_decode {
            options.bytes_decode = false;
        }
        if let Some(encoding) = self.encoding {
            options.encoding = encoding;
        }
        if self.no_load_json {
            options.load_json = false;
        }

        Ok(options)
    }
}

/// Parse command line arguments
pub fn parse() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get_args(args: &[&str]) -> GetArgs {
        let cli = Cli::try_parse_from(["get-aws-secret", "get"].iter().chain(args)).unwrap();
        match cli.command {
            Commands::Get(args) => args,
        }
    }

    #[test]
    fn test_defaults() {
        let args = get_args(&["SECRET_KEY"]);
        assert_eq!(args.secret_id, "SECRET_KEY");
        assert_eq!(args.output, OutputFormat::Text);
        assert_eq!(args.to_options().unwrap(), GetSecretOptions::default());
    }

    #[test]
    fn test_flags_map_to_options() {
        let args = get_args(&[
            "SECRET_KEY",
            "--memoize",
            "--version-id",
            "1",
            "--version-stage",
            "AWSPREVIOUS",
            "--no-base64-decode",
            "--no-bytes-decode",
            "--encoding",
            "latin-1",
            "--no-load-json",
        ]);

        let expected = GetSecretOptions::default()
            .with_memoize(true)
            .with_version_id("1")
            .with_version_stage("AWSPREVIOUS")
            .with_base64_decode(false)
            .with_bytes_decode(false)
            .with_encoding(TextEncoding::Latin1)
            .with_load_json(false);
        assert_eq!(args.to_options().unwrap(), expected);
    }

    #[test]
    fn test_options_document_with_flag_override() {
        let args = get_args(&[
            "SECRET_KEY",
            "--options",
            r#"{"versionStage": "AWSPENDING", "encoding": "ascii", "loadJson": false}"#,
            "--version-stage",
            "AWSCURRENT",
        ]);

        let options = args.to_options().unwrap();
        assert_eq!(options.version_stage.as_deref(), Some("AWSCURRENT"));
        assert_eq!(options.encoding, TextEncoding::Ascii);
        assert!(!options.load_json);
    }

    #[test]
    fn test_invalid_options_document() {
        let args = get_args(&["SECRET_KEY", "--options", "{not json"]);
        let err = args.to_options().unwrap_err();
        assert_eq!(exit_code_for(&err), EXIT_CLI);
        assert!(err.to_string().contains("--options"));
    }

    #[test]
    fn test_invalid_encoding_rejected_by_parser() {
        let result =
            Cli::try_parse_from(["get-aws-secret", "get", "SECRET_KEY", "--encoding", "ebcdic"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_secret_error_exit_code() {
        let err = CliError::from(SecretError::EmptyEnvelope {
            secret_id: "x".to_string(),
        });
        assert_eq!(exit_code_for(&err), EXIT_SECRET);
    }
}
