use clap::Parser;
use orbscreen::{Cli, run};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args = Cli::parse();
    log::debug!("Parsed arguments: {:?}", args);

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(run(&args))?;

    println!("\nAnalysis complete.");
    Ok(())
}
