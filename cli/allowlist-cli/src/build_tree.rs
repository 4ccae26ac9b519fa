use anyhow::{Context, Result};
use clap::Args;
use std::fmt::Write as _;
use std::path::PathBuf;
use tracing::info;

use allowlist_cli::{hex_encode, load_addresses, write_file_atomic, MerkleTree};

#[derive(Args, Debug)]
pub struct Cli {
    /// Allowlist file: JSON array of addresses, or one address per line
    #[arg(short, long)]
    input: PathBuf,

    /// Output file for Merkle root
    #[arg(short, long)]
    root_output: Option<PathBuf>,

    /// Output file for index map (address -> leaf index)
    #[arg(short = 'x', long)]
    index_output: Option<PathBuf>,

    /// Output file for every tree level (level:index:hash)
    #[arg(short, long)]
    tree_output: Option<PathBuf>,
}

pub fn run(cli: &Cli) -> Result<()> {
    info!("reading addresses from {:?}", cli.input);
    let addresses = load_addresses(&cli.input).context("Failed to load allowlist")?;

    info!("building Merkle tree over {} addresses", addresses.len());
    let tree = MerkleTree::build(&addresses).context("Failed to build Merkle tree")?;
    let root = hex_encode(tree.root());

    if let Some(path) = &cli.root_output {
        write_file_atomic(path, &format!("{root}\n")).context("Failed to write root")?;
    }

    if let Some(path) = &cli.index_output {
        let mut out = String::new();
        for (index, leaf) in tree.leaves().iter().enumerate() {
            writeln!(out, "{}:{}", leaf.address, index).context("Failed to format index")?;
        }
        write_file_atomic(path, &out).context("Failed to write index")?;
    }

    if let Some(path) = &cli.tree_output {
        info!("writing Merkle tree to {:?}", path);
        let mut out = String::new();
        for (level_num, level) in tree.levels().iter().enumerate() {
            for (i, hash) in level.iter().enumerate() {
                writeln!(out, "{}:{}:{}", level_num, i, hex_encode(hash))
                    .context("Failed to format tree")?;
            }
        }
        write_file_atomic(path, &out).context("Failed to write tree")?;
    }

    println!("Leaves: {}", tree.leaf_count());
    println!("Depth: {}", tree.depth());
    println!("Merkle root: {root}");
    Ok(())
}
