use clap::Parser;

use onehealth_lib::{run_app, Cli};

fn main() {
    let cli = Cli::parse();
    if let Err(err) = run_app(cli) {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}
