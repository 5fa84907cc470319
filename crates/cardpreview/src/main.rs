mod cli;
mod paths;
mod plain;
mod run;
mod sequence;

use anyhow::Result;

fn main() -> Result<()> {
    let cli = cli::parse();
    run::run(cli)
}
