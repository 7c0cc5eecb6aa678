use clap::{Parser, Subcommand};
use std::net::SocketAddr;

use mediacork::config::Config;
use mediacork::mediatype::{AcceptHeader, all_best_matches, parse_accept_header};

type AnyError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Parser, Debug)]
#[command(name = "mediacork")]
#[command(about = "HTTP Accept header content negotiation", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the demo HTTP server
    Serve(ServeArgs),
    /// Match candidate media types against an Accept header
    Match(MatchArgs),
    /// Print the effective configuration as TOML
    Config,
}

#[derive(clap::Args, Debug)]
pub struct ServeArgs {
    /// Address to bind the HTTP server to (defaults to `server.bind_addr`)
    #[arg(long)]
    pub address: Option<SocketAddr>,
}

#[derive(clap::Args, Debug)]
pub struct MatchArgs {
    /// Accept header value; the configured default when omitted
    #[arg(long)]
    pub accept: Option<String>,
    /// Candidate media types, in preference order
    #[arg(required = true)]
    pub candidates: Vec<String>,
}

pub fn run_match(args: MatchArgs) -> Result<(), AnyError> {
    let accept: AcceptHeader = match args.accept {
        Some(header) => parse_accept_header(&header)?,
        None => parse_accept_header(&Config::load()?.negotiation.default_accept)?,
    };

    let tied = all_best_matches(&args.candidates, &accept);
    match tied.last() {
        Some(best) => {
            println!("best: {best}");
            if tied.len() > 1 {
                println!("tied: {}", tied.join(", "));
            }
        }
        None => println!("no acceptable candidate"),
    }

    Ok(())
}

pub fn print_config() -> Result<(), AnyError> {
    let config = Config::load()?;
    print!("{}", config.to_toml()?);
    Ok(())
}
