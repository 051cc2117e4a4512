use anyhow::Context as _;
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vsysc::config::{Config, DEFAULT_MAX_IMPORT_DEPTH};
use vsysc::{Context, Executor};

#[derive(Parser)]
#[command(name = "vsysc", version, about = "vsystem container language interpreter")]
struct Cli {
    /// Timeout for custom keyword handlers, in milliseconds
    #[arg(long, env = "VSYSC_HANDLER_TIMEOUT_MS", global = true)]
    handler_timeout_ms: Option<u64>,

    #[arg(long, env = "VSYSC_MAX_IMPORT_DEPTH", default_value_t = DEFAULT_MAX_IMPORT_DEPTH, global = true)]
    max_import_depth: usize,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Execute files in order, sharing variables and exports
    Run {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Print the document built from a file without executing it
    Parse { file: PathBuf },
    /// Read blocks from stdin, each ended by an empty line
    Repl,
}

impl Cli {
    fn config(&self) -> Config {
        let config = Config::new().with_max_import_depth(self.max_import_depth);
        match self.handler_timeout_ms {
            Some(ms) => config.with_handler_timeout(Duration::from_millis(ms)),
            None => config,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vsysc=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let executor = Executor::new(Context::new(cli.config()));

    match cli.command.unwrap_or(Command::Repl) {
        Command::Run { files } => {
            for file in files {
                let source = tokio::fs::read_to_string(&file)
                    .await
                    .with_context(|| format!("failed to read {}", file.display()))?;
                let results = executor
                    .execute(&source)
                    .await
                    .with_context(|| format!("execution of {} failed", file.display()))?;
                println!("{}", serde_json::to_string(&results)?);
            }
        }
        Command::Parse { file } => {
            let source = tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("failed to read {}", file.display()))?;
            let document = executor.context().build_document(&source);
            println!("{}", serde_json::to_string_pretty(&document)?);
        }
        Command::Repl => repl(&executor).await?,
    }

    Ok(())
}

async fn repl(executor: &Executor) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut block = String::new();

    prompt(&block)?;
    while let Some(line) = lines.next_line().await? {
        let trimmed = line.trim();
        if block.is_empty() && trimmed.eq_ignore_ascii_case("exit") {
            println!("Exiting vsysc...");
            break;
        }

        if trimmed.is_empty() {
            if !block.is_empty() {
                match executor.execute(&block).await {
                    Ok(results) => println!("{}", serde_json::to_string(&results)?),
                    Err(e) => eprintln!("Execution error: {}", e),
                }
                block.clear();
            }
        } else {
            block.push_str(&line);
            block.push('\n');
        }
        prompt(&block)?;
    }

    Ok(())
}

fn prompt(block: &str) -> std::io::Result<()> {
    print!("{}", if block.is_empty() { "vsysc> " } else { "  ...> " });
    std::io::stdout().flush()
}
