use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use futures::StreamExt;
use routewise_agents::{QueryInterpreter, ResponseSummarizer};
use routewise_api::{build_backend, AppConfig};
use routewise_core::function_definitions;
use routewise_observability::{init_tracing, AppMetrics};

#[derive(Debug, Parser)]
#[command(name = "routewise")]
#[command(about = "Run the routewise query interpreter and response summarizer from a shell")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Turn a free-text query into a structured route or nearby-places request.
    Interpret { text: String },
    /// Stream an HTML summary of a mapping API response.
    Summarize {
        #[arg(long)]
        prompt: String,
        /// File holding the JSON response, or `-` for stdin.
        #[arg(long)]
        json: PathBuf,
    },
    /// Print the function menu offered to the model.
    Functions,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing("routewise_cli");
    let cli = Cli::parse();

    match cli.command {
        Command::Interpret { text } => {
            let config = AppConfig::from_env()?;
            let interpreter = QueryInterpreter::new(build_backend(&config)?, AppMetrics::shared());

            let result = interpreter
                .interpret(&text)
                .await
                .context("query interpretation failed")?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Command::Summarize { prompt, json } => {
            let location_response = read_payload(&json)?;
            let config = AppConfig::from_env()?;
            let summarizer =
                ResponseSummarizer::new(build_backend(&config)?, AppMetrics::shared());

            let mut fragments = summarizer
                .summarize(&prompt, &location_response)
                .await
                .context("failed to open summary stream")?;

            let mut stdout = io::stdout().lock();
            while let Some(fragment) = fragments.next().await {
                let fragment = fragment.context("summary stream interrupted")?;
                stdout.write_all(fragment.as_bytes())?;
                stdout.flush()?;
            }
            writeln!(stdout)?;
        }
        Command::Functions => {
            println!("{}", serde_json::to_string_pretty(&function_definitions())?);
        }
    }

    Ok(())
}

fn read_payload(path: &PathBuf) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("failed reading JSON payload from stdin")?;
        return Ok(buffer);
    }

    fs::read_to_string(path).with_context(|| format!("failed reading {}", path.display()))
}
