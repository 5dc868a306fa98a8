// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

use clap::Parser;

use posture_inference::cli::annotate::run_annotate;
use posture_inference::cli::args::{Cli, Commands};
use posture_inference::cli::logging;

fn main() {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Annotate(args) => {
            logging::set_level(args.log_level());
            run_annotate(args);
        }
    }
}
