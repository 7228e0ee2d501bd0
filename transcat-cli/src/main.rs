use std::process::ExitCode;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

/// Supported subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert translation files into a single output file.
    Convert {
        /// Template file whose keys name the output properties
        #[arg(short, long)]
        template: Option<String>,

        /// The output file; its extension selects the output format
        outfile: String,

        /// One or more input files to decode and concatenate
        #[arg(required = true)]
        infiles: Vec<String>,
    },
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    match args.command {
        Commands::Convert {
            template,
            outfile,
            infiles,
        } => {
            if let Err(e) = transcat::convert(outfile, &infiles, template) {
                eprintln!("Error: {}", e);
                return ExitCode::FAILURE;
            }
        }
    }
    ExitCode::SUCCESS
}
