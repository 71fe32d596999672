use clap::Parser;
use mindtree::cli::commands::Cli;
use mindtree::cli::handlers;

fn main() {
    let cli = Cli::parse();

    if let Err(e) = mindtree::logging::init_logging(cli.log_level.as_deref()) {
        eprintln!("warning: {}", e);
    }

    if let Err(e) = handlers::dispatch(cli) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
