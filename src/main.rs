use clap::Parser;
use cmdrouter::cli::{run_cli, Cli};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    cmdrouter::logging::init_logging()?;

    let code = run_cli(cli)?;
    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}
