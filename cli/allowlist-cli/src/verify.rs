use anyhow::{Context, Result};
use clap::Args;
use std::fs;
use std::path::PathBuf;

use allowlist_cli::{parse_hash, verify_strict, MembershipReport};

#[derive(Args, Debug)]
pub struct Cli {
    /// Membership report JSON produced by `prove`
    #[arg(short, long)]
    proof: PathBuf,

    /// Published Merkle root (hex format)
    #[arg(short, long)]
    root: String,
}

pub fn run(cli: &Cli) -> Result<()> {
    let root = parse_hash(&cli.root).context("Invalid Merkle root")?;

    let content = fs::read_to_string(&cli.proof).context("Failed to read proof file")?;
    let report: MembershipReport =
        serde_json::from_str(&content).context("Failed to parse proof JSON")?;

    if !report.eligible {
        anyhow::bail!("Report marks {} as not eligible; nothing to verify", report.address);
    }

    // The verifier hashes the address itself rather than trusting `leaf`.
    verify_strict(report.address, &report.proof, &root)
        .with_context(|| format!("Proof for {} rejected", report.address))?;

    println!("Proof valid for {} ({} steps)", report.address, report.proof.len());
    Ok(())
}
