use anyhow::{Context, Result};
use bat::PrettyPrinter;
use clap::Parser;
use cliclack::{input, spinner};
use console::style;
use tracing_subscriber::EnvFilter;

use salesagent::configuration::Settings;
use salesagent::router::Router;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Question to answer; starts an interactive session when omitted
    prompt: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let settings = Settings::from_env().context("Failed to load configuration")?;
    let router = Router::from_settings(&settings).context("Failed to build the router")?;

    if let Some(prompt) = cli.prompt {
        let answer = router.run_agent(prompt).await?;
        render(&answer)?;
        return Ok(());
    }

    println!(
        "Sales agent {}",
        style("- type \"exit\" to end the session").dim()
    );
    println!("\n");

    loop {
        let message_text: String = input("Question:").placeholder("").multiline().interact()?;

        if message_text.trim().eq_ignore_ascii_case("exit") {
            break;
        }

        let spin = spinner();
        spin.start("awaiting reply");
        let result = router.run_agent(message_text).await;
        spin.stop("");

        match result {
            Ok(answer) => render(&answer)?,
            Err(e) => eprintln!("{}", style(format!("Error: {}", e)).red()),
        }
        println!("\n");
    }
    Ok(())
}

fn render(content: &str) -> Result<()> {
    PrettyPrinter::new()
        .input_from_bytes(content.as_bytes())
        .language("markdown")
        .print()
        .context("Failed to render the answer")?;
    Ok(())
}
