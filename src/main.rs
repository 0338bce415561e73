//! wxo-bridge CLI binary entry point.

use std::sync::Arc;

use clap::Parser;
use wxo_bridge::auth::TokenManager;
use wxo_bridge::cli::{Cli, Commands};
use wxo_bridge::config::{AgentTable, BridgeConfig};
use wxo_bridge::orchestrate::{AgentRunner, RunResult};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    wxo_bridge::cli::logging::init(cli.verbose);

    match run(cli.command).await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

/// Returns `Ok(false)` when a run completed but reported failure.
async fn run(command: Commands) -> Result<bool, Box<dyn std::error::Error>> {
    let config = BridgeConfig::from_env();
    config.validate()?;
    let tokens = Arc::new(TokenManager::from_config(&config));
    let agents = if command.uses_agent_table() {
        config.load_agents()?
    } else {
        AgentTable::new()
    };
    let runner = AgentRunner::new(config, tokens.clone())?.with_agents(agents);

    match command {
        Commands::Token => {
            let credential = tokens.get_credential().await?;
            println!("length:     {}", credential.len());
            println!("preview:    {}", credential.preview());
            println!("expires_at: {}", credential.expires_at().to_rfc3339());
            Ok(true)
        }
        Commands::Agents => {
            let agents = runner.list_agents().await?;
            println!("{}", serde_json::to_string_pretty(&agents)?);
            Ok(true)
        }
        Commands::Routes => {
            if runner.agents().is_empty() {
                eprintln!("No agents configured (set WXO_AGENTS_FILE)");
            }
            for (key, route) in runner.agents().iter() {
                match &route.description {
                    Some(description) => println!("{key}\t{}\t{description}", route.agent_id),
                    None => println!("{key}\t{}", route.agent_id),
                }
            }
            Ok(true)
        }
        Commands::Run(args) => {
            let result = runner
                .run(&args.message, &args.agent_id, args.thread.as_deref())
                .await;
            print_result(&result)
        }
        Commands::Ask(args) => {
            let result = runner
                .run_route(&args.key, args.message.as_deref(), args.thread.as_deref())
                .await;
            print_result(&result)
        }
    }
}

fn print_result(result: &RunResult) -> Result<bool, Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(result)?);
    Ok(result.success)
}
