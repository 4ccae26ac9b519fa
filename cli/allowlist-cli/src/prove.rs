use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use tracing::info;

use allowlist_cli::{
    hex_encode, load_addresses, verify_strict, write_file_atomic, Address, MembershipReport,
    MerkleTree,
};

#[derive(Args, Debug)]
pub struct Cli {
    /// Allowlist file the published root was built from
    #[arg(short, long)]
    input: PathBuf,

    /// Address to prove (0x-prefixed)
    #[arg(short, long)]
    address: String,

    /// Output JSON file for the membership report
    #[arg(short, long)]
    output: Option<PathBuf>,
}

pub fn run(cli: &Cli) -> Result<()> {
    let address = Address::parse(&cli.address).context("Invalid address")?;

    let addresses = load_addresses(&cli.input).context("Failed to load allowlist")?;
    let tree = MerkleTree::build(&addresses).context("Failed to build Merkle tree")?;

    let membership = tree.prove(&address);
    if let (Some(leaf), Some(proof)) = (membership.leaf(), membership.clone().into_proof()) {
        verify_strict(leaf, &proof, &tree.root())
            .context("Generated proof does not verify against the tree root")?;
    }
    let report = MembershipReport::new(&tree, address, &membership);

    if let Some(path) = &cli.output {
        info!("writing membership report to {:?}", path);
        let json = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
        write_file_atomic(path, &json).context("Failed to write report")?;
    }

    println!("Address: {address}");
    println!("Merkle root: {}", hex_encode(report.root));
    if report.eligible {
        println!("Eligible: yes (leaf index {})", report.leaf_index.unwrap_or_default());
        println!("Proof: [{}]", report.siblings.join(", "));
    } else {
        println!("Eligible: no");
    }

    Ok(())
}
