//! Ask command implementation.

use super::{build_engine, OllamaEngine};
use crate::cli::AskArgs;
use crate::error::Result;
use crate::output::Formatter;
use crate::repl;
use policylens_engine::PolicyLensConfig;

/// Execute the ask command.
pub async fn execute_ask(args: AskArgs, config: PolicyLensConfig, formatter: &Formatter) -> Result<()> {
    let engine = build_engine(config, &args.corpus).await?;

    match args.question {
        Some(question) => answer_once(&engine, &question, args.assess, formatter).await,
        None => repl::run_repl(&engine, args.assess, formatter).await,
    }
}

/// Answer one question and print the result.
pub async fn answer_once(
    engine: &OllamaEngine,
    question: &str,
    assess: bool,
    formatter: &Formatter,
) -> Result<()> {
    let output = if assess {
        formatter.format_assessed(&engine.answer_with_assessment(question).await?)?
    } else {
        formatter.format_answer(&engine.answer(question).await?)?
    };
    println!("{}", output);
    Ok(())
}
