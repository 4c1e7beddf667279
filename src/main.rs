use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::{error, info};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use routr::config::Config;
use routr::llm::{Message, OpenAiCompatClient};
use routr::router::{Category, KeywordSets, RouteOutcome, Router};
use routr::tools::ToolRegistry;

mod cli;

use cli::{Cli, Commands};

fn setup_logging(config: &Config) -> Result<()> {
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("routr")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("routr.log");

    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    // RUST_LOG wins over the configured level
    let level = config.log_level.as_deref().unwrap_or("info");
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

fn build_router(config: &Config, registry: &ToolRegistry) -> Result<Router> {
    let llm = OpenAiCompatClient::from_config(&config.llm).context("Failed to create LLM client")?;
    info!("Using model {} at {}", config.llm.model, config.llm.base_url);

    Ok(Router::from_registry(
        Arc::new(llm),
        registry,
        KeywordSets::from_config(&config.router),
    ))
}

async fn run_application(cli: &Cli, config: &Config) -> Result<()> {
    info!("Starting application");

    if cli.is_verbose() {
        println!("{}", "Verbose mode enabled".yellow());
    }

    match &cli.command {
        Commands::Ask { question } => handle_ask_command(question, config, cli.is_verbose()).await,
        Commands::Chat => handle_chat_command(config, cli.is_verbose()).await,
        Commands::Classify { question } => handle_classify_command(question, config),
        Commands::Tools => handle_tools_command(config),
        Commands::Tool { name, query } => handle_tool_command(name, query, config).await,
    }
}

fn print_route(outcome: &RouteOutcome, verbose: bool) {
    let route = match outcome.decision.category {
        Category::Direct => outcome.decision.category.as_str().dimmed(),
        _ => outcome.decision.category.as_str().cyan(),
    };
    println!("{} {}", "Route:".green(), route);

    if let Some(result) = &outcome.tool_result {
        if result.is_error {
            println!("{} {}", "Tool:".red(), result.content);
        } else if verbose {
            println!("{} {}", "Tool:".green(), result.content);
        }
    }
}

async fn handle_ask_command(question: &str, config: &Config, verbose: bool) -> Result<()> {
    info!("Asking: {}", question);
    let registry = ToolRegistry::standard(config)?;
    let router = build_router(config, &registry)?;

    let outcome = router.route(&[Message::user(question)]).await?;

    println!("{} {}", "Question:".green(), question);
    print_route(&outcome, verbose);
    if let Some(reply) = outcome.reply() {
        println!("\n{} {}", "Answer:".green(), reply.content);
    }
    Ok(())
}

async fn handle_chat_command(config: &Config, verbose: bool) -> Result<()> {
    let registry = ToolRegistry::standard(config)?;
    let router = build_router(config, &registry)?;

    println!("{}", "Routr chat".bold());
    println!("Type 'quit' to exit.");

    let mut conversation: Vec<Message> = Vec::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        stdout.write_all(b"\nYou: ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let input = line.trim();

        if matches!(input.to_lowercase().as_str(), "quit" | "exit" | "q") {
            println!("Goodbye!");
            break;
        }
        if input.is_empty() {
            continue;
        }

        conversation.push(Message::user(input));
        match router.route(&conversation).await {
            Ok(outcome) => {
                print_route(&outcome, verbose);
                if let Some(reply) = outcome.reply() {
                    println!("\n{} {}", "Agent:".cyan(), reply.content);
                }
                conversation = outcome.conversation;
            }
            Err(e) => {
                error!("Routing failed: {}", e);
                println!("\n{} {}", "Error:".red(), e);
                // Drop the unanswered question so the next turn starts clean
                conversation.pop();
            }
        }
    }

    Ok(())
}

fn handle_classify_command(question: &str, config: &Config) -> Result<()> {
    let decision = KeywordSets::from_config(&config.router).classify(question);
    info!("Classified '{}' as {}", question, decision.category);

    println!("{} {}", "Route:".green(), decision.category.as_str().cyan());
    if let Some(tool) = decision.category.tool_name() {
        println!("{} {}", "Tool:".green(), tool);
    }
    Ok(())
}

fn handle_tools_command(config: &Config) -> Result<()> {
    let registry = ToolRegistry::standard(config)?;
    for def in registry.definitions() {
        println!("{:<22} {}", def.name.as_str().cyan(), def.description);
    }
    Ok(())
}

async fn handle_tool_command(name: &str, query: &str, config: &Config) -> Result<()> {
    info!("Invoking tool {} with '{}'", name, query);
    let registry = ToolRegistry::standard(config)?;
    let output = registry
        .invoke(name, query)
        .await
        .with_context(|| format!("Tool {} failed", name))?;
    println!("{}", output);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration before logging so its level applies
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    setup_logging(&config).context("Failed to setup logging")?;
    info!("Starting with config from: {:?}", cli.config);

    run_application(&cli, &config).await.context("Application failed")?;

    Ok(())
}
