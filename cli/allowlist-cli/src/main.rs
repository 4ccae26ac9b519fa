#![forbid(unsafe_code)]
#![allow(unreachable_pub)]

use clap::{Parser, Subcommand};

mod build_tree;
mod prove;
mod verify;

#[derive(Parser, Debug)]
#[command(name = "allowlist")]
#[command(about = "Presale allowlist Merkle tools", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build the allowlist Merkle tree and print its root
    BuildTree(build_tree::Cli),
    /// Generate a membership proof for one address
    Prove(prove::Cli),
    /// Check a membership report against a published root
    Verify(verify::Cli),
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::BuildTree(args) => build_tree::run(&args)?,
        Commands::Prove(args) => prove::run(&args)?,
        Commands::Verify(args) => verify::run(&args)?,
    }

    Ok(())
}
