use crate::utils::output::RenderFormat;
use clap::{Parser, Subcommand};
use clap_complete::Shell;

#[derive(Parser)]
#[command(name = "certprint")]
#[command(version = "1.0.0")]
#[command(about = "Inspect PEM certificate bundles and export them as QR codes")]
#[command(long_about = None)]
pub struct Cli {
    /// Enable verbose logging (repeat for more verbosity: -v INFO, -vv DEBUG, -vvv TRACE)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print details about every certificate in a PEM bundle
    Print {
        /// Path to the certificate bundle
        path: String,
        /// Output format
        #[arg(long, value_enum, default_value = "human")]
        format: RenderFormat,
        /// Write a QR code image (png) of each certificate; later certificates
        /// get the index inserted before the extension (out.png, out.1.png, ...)
        #[arg(long)]
        out_qr: Option<String>,
    },
    /// Generate shell completion scripts
    Completion {
        #[command(subcommand)]
        command: CompletionCommands,
    },
}

#[derive(Subcommand)]
pub enum CompletionCommands {
    /// Generate bash completion script
    Bash,
    /// Generate zsh completion script
    Zsh,
    /// Generate fish completion script
    Fish,
    /// Generate PowerShell completion script
    PowerShell,
}

impl CompletionCommands {
    pub fn shell(&self) -> Shell {
        match self {
            CompletionCommands::Bash => Shell::Bash,
            CompletionCommands::Zsh => Shell::Zsh,
            CompletionCommands::Fish => Shell::Fish,
            CompletionCommands::PowerShell => Shell::PowerShell,
        }
    }
}
