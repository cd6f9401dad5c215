mod display;
mod prompts;

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use aria_core::{Agent, Session};
use aria_llm::{Message, StreamEvent};
use aria_mcp::{McpClient, remote_tools};
use aria_tools::WeatherTool;
use clap::{Parser, Subcommand};
use display::StdoutDisplay;
use tokio_stream::StreamExt;
use tracing_subscriber::EnvFilter;

const DEFAULT_MCP_URL: &str = "https://docs.langchain.com/mcp";
const TEMPERATURE: f32 = 0.7;

#[derive(Parser)]
#[command(name = "aria")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Verify the GitHub Models connection with a one-shot request.
    Check,
    /// Streamed chat with history, no tools.
    Chat,
    /// Agent loop, still without tools.
    Agent,
    /// Full assistant: weather tool, optionally remote MCP tools.
    Assistant {
        /// Attach an MCP server's tools (defaults to the docs server).
        #[arg(long, value_name = "URL", num_args = 0..=1, default_missing_value = DEFAULT_MCP_URL)]
        mcp: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Command::Check => check().await,
        Command::Chat => chat().await,
        Command::Agent => agent_repl().await,
        Command::Assistant { mcp } => assistant_repl(mcp).await,
    }
}

/// One-shot round-trip to confirm the token and endpoint work.
async fn check() -> Result<(), Box<dyn std::error::Error>> {
    let token = std::env::var("GITHUB_TOKEN").unwrap_or_default();
    if token.is_empty() || token == "your_github_token_here" {
        println!("❌ Error: GITHUB_TOKEN not set in .env file");
        println!("   Please add your GitHub token to the .env file");
        return Ok(());
    }

    println!("🔄 Testing connection to GitHub Models...");

    let model = aria_llm_openai::from_env();
    let mut req = aria_llm::request();
    req.user("Say 'Hello, Workshop!' and nothing else.");
    req.temperature(TEMPERATURE);

    match model.generate(req.build()).into_result().await {
        Ok(result) => println!("✅ Success! Model responded: {}", result.text),
        Err(e) => {
            println!("❌ Error: {e}");
            println!();
            println!("Troubleshooting:");
            println!("- Make sure your GitHub token is valid");
            println!("- Check your internet connection");
            println!("- Verify the token hasn't expired");
        }
    }
    Ok(())
}

/// Streamed chat straight against the model, history managed here.
async fn chat() -> Result<(), Box<dyn std::error::Error>> {
    let model = aria_llm_openai::from_env();
    let mut history = vec![Message::system(prompts::chat())];

    println!("👋 Hi! I'm Aria. How can I help?");

    while let Some(line) = read_line("you> ")? {
        let mut req = aria_llm::request();
        req.messages(history.clone());
        req.user(&line);

        let mut events = model.generate(req.build()).events();
        let mut full_response = String::new();
        let mut failed = false;

        while let Some(event) = events.next().await {
            match event {
                Ok(StreamEvent::TextDelta(delta)) => {
                    print!("{delta}");
                    io::stdout().flush()?;
                    full_response.push_str(&delta);
                }
                Ok(_) => {}
                Err(e) => {
                    println!();
                    eprintln!("⚠️  {e}");
                    failed = true;
                    break;
                }
            }
        }
        println!();

        // A failed turn leaves history as if it never happened.
        if !failed {
            history.push(Message::user(line));
            history.push(Message::assistant(full_response));
        }
    }
    Ok(())
}

async fn agent_repl() -> Result<(), Box<dyn std::error::Error>> {
    let mut agent = Agent::new(aria_llm_openai::from_env());
    agent.system(prompts::agent());
    agent.temperature(TEMPERATURE);

    println!("👋 Hi! I'm Aria. How can I help?");
    repl(Session::new(agent)).await
}

async fn assistant_repl(mcp: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let mut agent = Agent::new(aria_llm_openai::from_env());
    agent.temperature(TEMPERATURE);
    agent.tool(WeatherTool::from_env());

    match mcp {
        Some(url) => {
            agent.system(prompts::assistant_with_mcp());
            let client = Arc::new(McpClient::connect(url).await?);
            let tools = remote_tools(client).await?;
            tracing::info!(count = tools.len(), "remote tools attached");
            for tool in tools {
                agent.erased_tool(tool);
            }
            println!("👋 Hi! I'm Aria. I can check weather, search docs, and more!");
        }
        None => {
            agent.system(prompts::assistant());
            println!(
                "👋 Hi! I'm Aria. I can check the weather for you! Try: 'What's the weather in Paris?'"
            );
        }
    }

    repl(Session::new(agent)).await
}

/// Read-eval loop over a session; failed turns keep the session intact.
async fn repl(mut session: Session) -> Result<(), Box<dyn std::error::Error>> {
    let mut display = StdoutDisplay;

    while let Some(line) = read_line("you> ")? {
        match session.send(line, &mut display).await {
            Ok(_) => println!(),
            Err(e) => {
                println!();
                eprintln!("⚠️  {e}");
            }
        }
    }
    Ok(())
}

/// Prompt and read one trimmed line; `None` on EOF or an exit command.
fn read_line(prompt: &str) -> io::Result<Option<String>> {
    print!("{prompt}");
    io::stdout().flush()?;

    let mut input = String::new();
    if io::stdin().lock().read_line(&mut input)? == 0 {
        println!();
        return Ok(None);
    }

    let line = input.trim();
    if line.is_empty() || line == "exit" || line == "quit" {
        return Ok(None);
    }
    Ok(Some(line.to_string()))
}
