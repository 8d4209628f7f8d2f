// signed_ledger/signing_client/src/main.rs

mod connection;

use anyhow::Context;
use clap::Parser;
use clearscreen::clear;
use inquire::{CustomType, Select};
use shared_auth::{AuthConfig, Operation, PublicKeyFormat, Session, SessionCell};
use std::path::PathBuf;
use tokio::io::BufReader;
use tokio::net::TcpStream;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::connection::{Connection, Reply};

const ADD: &str = "1. Add a value to your sum";
const SUBTRACT: &str = "2. Subtract a value from your sum";
const GET: &str = "3. Get your sum";
const EXIT: &str = "4. Exit client";

/// Interactive client that signs every ledger request with a session RSA key.
#[derive(Parser, Debug)]
#[command(name = "signing_client", version)]
struct Args {
    /// Server host
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Server port
    #[arg(short, long, default_value_t = 7777)]
    port: u16,

    /// TOML file with key generation settings
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Overrides `prime_bits` from the configuration
    #[arg(long)]
    prime_bits: Option<u64>,

    /// Overrides `key_format` from the configuration (`delimited` or `concatenated`)
    #[arg(long)]
    key_format: Option<PublicKeyFormat>,
}

fn load_config(args: &Args) -> anyhow::Result<AuthConfig> {
    let mut config = match &args.config {
        Some(path) => AuthConfig::load(path)?,
        None => AuthConfig::default(),
    };
    if let Some(bits) = args.prime_bits {
        config.prime_bits = bits;
    }
    if let Some(format) = args.key_format {
        config.key_format = format;
    }
    config.validate()?;
    Ok(config)
}

fn print_public_key(session: &Session) {
    println!("The public key is:");
    println!("e: {}", session.key_pair().public_exponent());
    println!("n: {}", session.key_pair().modulus());
    println!("Your id is: {}", session.identity());
    println!();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;
    let generator = config.key_generator()?;

    let address = format!("{}:{}", args.host, args.port);
    let stream = TcpStream::connect(&address)
        .await
        .with_context(|| format!("could not connect to {}", address))?;
    info!(%address, "connected");

    let (read_half, write_half) = stream.into_split();
    let mut connection = Connection::new(BufReader::new(read_half), write_half);
    let sessions = SessionCell::new();

    clear().unwrap_or_else(|e| eprintln!("Could not clear the screen: {}", e));

    loop {
        let options = vec![ADD, SUBTRACT, GET, EXIT];
        let choice = match Select::new("What would you like to do?", options).prompt() {
            Ok(choice) => choice,
            Err(e) => {
                eprintln!("Could not read the selection: {}. Exiting.", e);
                break;
            }
        };

        let (operation, operand) = match choice {
            ADD => (Operation::Add, prompt_value("Enter value to add:")?),
            SUBTRACT => (Operation::Min, prompt_value("Enter value to subtract:")?),
            GET => (Operation::Get, 0),
            EXIT => {
                println!("Client side quitting. The remote variable server is still running.");
                break;
            }
            _ => unreachable!("unknown menu option selected"),
        };

        if sessions.get().is_none() {
            println!("Generating a {}-bit RSA key pair...", 2 * generator.prime_bits());
            let session = sessions.get_or_establish(&generator, config.key_format)?;
            print_public_key(&session);
        }

        let line = sessions.build_signed_line(operation, operand)?;
        debug!(%operation, operand, "sending signed request");

        match connection.request(&line).await? {
            Reply::Balance(balance) => println!("The result is {}\n", balance),
            Reply::Refused => println!("Error in request!\n"),
        }
    }

    Ok(())
}

fn prompt_value(message: &str) -> anyhow::Result<i64> {
    CustomType::<i64>::new(message)
        .with_error_message("Please type a whole number")
        .prompt()
        .context("could not read the value")
}
