//! gopherd CLI Client
//!
//! Command-line interface for talking to a running gopherd server.

use std::net::TcpStream;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use gopherd::protocol::{read_response, write_command, Command, Status};

/// gopherd CLI
#[derive(Parser, Debug)]
#[command(name = "gopherd-cli")]
#[command(about = "CLI for the gopherd identifier service")]
struct Args {
    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:4311")]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Request the next identifier
    Next,

    /// Read the current counter value without incrementing
    Current,

    /// Ping the server
    Ping,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let command = match args.command {
        Commands::Next => Command::Next,
        Commands::Current => Command::Current,
        Commands::Ping => Command::Ping,
    };

    let stream = match TcpStream::connect(&args.server) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("failed to connect to {}: {}", args.server, e);
            return ExitCode::FAILURE;
        }
    };

    let mut writer = stream.try_clone().unwrap_or_else(|e| {
        eprintln!("failed to clone stream: {}", e);
        std::process::exit(1);
    });
    let mut reader = stream;

    if let Err(e) = write_command(&mut writer, &command) {
        eprintln!("failed to send command: {}", e);
        return ExitCode::FAILURE;
    }

    match read_response(&mut reader) {
        Ok(response) => match response.status {
            Status::Ok => {
                println!("{}", response.text());
                ExitCode::SUCCESS
            }
            Status::Error => {
                eprintln!("server error: {}", response.text());
                ExitCode::FAILURE
            }
        },
        Err(e) => {
            eprintln!("failed to read response: {}", e);
            ExitCode::FAILURE
        }
    }
}
