use crate::cert::print::{print_bundle, PrintOptions};
use crate::cli::args::*;
use crate::utils::errors::{CertPrintError, Result};
use clap::CommandFactory;
use clap_complete::generate;
use std::fs;
use std::io;

pub fn handle_command(cli: Cli) -> Result<()> {
    // Initialize logging - always to stderr
    if !cli.quiet {
        let log_level = match cli.verbose {
            0 => "certprint=warn",  // Default: warnings only
            1 => "certprint=info",  // -v: info level
            2 => "certprint=debug", // -vv: debug level
            _ => "certprint=trace", // -vvv+: trace level
        };

        tracing_subscriber::fmt()
            .with_writer(io::stderr)
            .with_env_filter(log_level)
            .init();
    }

    match cli.command {
        Commands::Print {
            path,
            format,
            out_qr,
        } => {
            let bundle = fs::read(&path)
                .map_err(|e| CertPrintError::BundleRead(format!("{path}: {e}")))?;
            tracing::debug!(path = %path, bytes = bundle.len(), "read certificate bundle");

            let options = PrintOptions {
                format,
                qr_output: out_qr,
            };
            print_bundle(&bundle, &options, &mut io::stdout().lock())
        }
        Commands::Completion { command } => {
            let mut cmd = Cli::command();
            generate(command.shell(), &mut cmd, "certprint", &mut io::stdout());
            Ok(())
        }
    }
}
