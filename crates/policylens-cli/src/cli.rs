//! CLI command definitions and argument parsing.

use crate::output::OutputFormat;
use clap::{Parser, Subcommand};
use policylens_trust::ScoringScheme;
use std::path::PathBuf;

/// PolicyLens CLI - Answer policy questions and score how far answers can be trusted.
#[derive(Debug, Parser)]
#[command(name = "policylens")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path (defaults to ~/.policylens/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Ollama server URL
    #[arg(long, global = true, env = "POLICYLENS_OLLAMA_URL")]
    pub ollama_url: Option<String>,

    /// Generation model
    #[arg(long, global = true, env = "POLICYLENS_MODEL")]
    pub model: Option<String>,

    /// Embedding model
    #[arg(long, global = true, env = "POLICYLENS_EMBEDDING_MODEL")]
    pub embedding_model: Option<String>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Human-readable text (default)
    Text,
    /// JSON
    Json,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Answer a question from a corpus, or start an interactive session
    Ask(AskArgs),

    /// Score an answer against its context
    Assess(AssessArgs),

    /// Inspect or create the configuration file
    Config(ConfigArgs),
}

/// Arguments for the ask command.
#[derive(Debug, Parser)]
pub struct AskArgs {
    /// Question to answer; omit for interactive mode
    pub question: Option<String>,

    /// Corpus JSON file with documents, entities, relations, and policies
    #[arg(long, env = "POLICYLENS_CORPUS")]
    pub corpus: PathBuf,

    /// Also score the answer
    #[arg(short, long)]
    pub assess: bool,

    /// Scoring scheme used with --assess
    #[arg(short, long, value_enum)]
    pub scheme: Option<SchemeArg>,
}

/// Arguments for the assess command.
#[derive(Debug, Parser)]
pub struct AssessArgs {
    /// The question that was asked
    #[arg(short, long)]
    pub question: String,

    /// The answer to score
    #[arg(short, long)]
    pub answer: String,

    /// Context passage (repeatable)
    #[arg(short, long = "passage")]
    pub passages: Vec<String>,

    /// JSON file holding an array of context passages
    #[arg(long)]
    pub passages_file: Option<PathBuf>,

    /// Knowledge-graph entity name (repeatable)
    #[arg(short = 'e', long = "entity")]
    pub graph_entities: Vec<String>,

    /// Corpus whose graph backs relation verification
    #[arg(long)]
    pub corpus: Option<PathBuf>,

    /// Scoring scheme
    #[arg(short, long, value_enum)]
    pub scheme: Option<SchemeArg>,
}

/// Arguments for configuration management.
#[derive(Debug, Parser)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration as TOML
    Show,

    /// Print the configuration file path
    Path,

    /// Write the default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Check the configuration file
    Validate,
}

/// Scoring scheme argument.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum SchemeArg {
    /// Coverage, faithfulness, relevancy, sufficiency, hallucination
    EntityAware,
    /// Entity consistency, relation verification, content overlap, coherence
    GraphVerified,
}

impl From<CliFormat> for OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Text => OutputFormat::Text,
            CliFormat::Json => OutputFormat::Json,
        }
    }
}

impl From<SchemeArg> for ScoringScheme {
    fn from(scheme: SchemeArg) -> Self {
        match scheme {
            SchemeArg::EntityAware => ScoringScheme::EntityAware,
            SchemeArg::GraphVerified => ScoringScheme::GraphVerified,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ask_command() {
        let cli = Cli::parse_from([
            "policylens",
            "ask",
            "试验区由谁管理？",
            "--corpus",
            "corpus.json",
            "--assess",
            "--scheme",
            "graph-verified",
        ]);
        match cli.command {
            Command::Ask(args) => {
                assert_eq!(args.question.as_deref(), Some("试验区由谁管理？"));
                assert_eq!(args.corpus, PathBuf::from("corpus.json"));
                assert!(args.assess);
                assert!(matches!(args.scheme, Some(SchemeArg::GraphVerified)));
            }
            _ => panic!("Expected Ask command"),
        }
    }

    #[test]
    fn test_assess_repeated_arguments() {
        let cli = Cli::parse_from([
            "policylens",
            "--format",
            "json",
            "assess",
            "-q",
            "question",
            "-a",
            "answer",
            "-p",
            "first passage",
            "-p",
            "second passage",
            "-e",
            "试验区管委会",
        ]);
        assert!(matches!(cli.format, Some(CliFormat::Json)));
        match cli.command {
            Command::Assess(args) => {
                assert_eq!(args.passages.len(), 2);
                assert_eq!(args.graph_entities, vec!["试验区管委会".to_string()]);
                assert!(args.scheme.is_none());
            }
            _ => panic!("Expected Assess command"),
        }
    }

    #[test]
    fn test_config_init_flag() {
        let cli = Cli::parse_from(["policylens", "config", "init", "--force"]);
        assert!(matches!(
            cli.command,
            Command::Config(ConfigArgs {
                action: ConfigAction::Init { force: true }
            })
        ));
    }

    #[test]
    fn test_scheme_conversion() {
        let scheme: ScoringScheme = SchemeArg::GraphVerified.into();
        assert_eq!(scheme, ScoringScheme::GraphVerified);
    }
}
