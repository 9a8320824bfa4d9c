use std::path::PathBuf;

use basehealth_cli::commands::{hash, records, share, submit, SessionArgs};
use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "basehealth")]
#[command(about = "BaseHealth - tamper-evident medical record fingerprints on a public ledger", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Session {
    /// Connected wallet address
    #[arg(long, short, env = "BASEHEALTH_ACCOUNT")]
    account: String,

    /// Contract gateway URL (overrides BASEHEALTH_GATEWAY_URL)
    #[arg(long)]
    gateway: Option<String>,

    /// Record contract address; the zero address runs in demo mode
    #[arg(long)]
    contract: Option<String>,
}

impl From<Session> for SessionArgs {
    fn from(s: Session) -> Self {
        SessionArgs { account: s.account, gateway_url: s.gateway, contract: s.contract }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Fingerprint a file locally. Nothing leaves the machine.
    Hash {
        path: PathBuf,

        /// sha256 or blake3
        #[arg(long, default_value = "sha256")]
        algorithm: String,
    },
    /// List the account's records, newest first
    Records {
        #[command(flatten)]
        session: Session,

        /// Print the session as JSON
        #[arg(long)]
        json: bool,
    },
    /// Hash a file and store its fingerprint
    Submit {
        path: PathBuf,

        #[command(flatten)]
        session: Session,
    },
    /// Grant another address access to the account's records
    Share {
        grantee: String,

        #[command(flatten)]
        session: Session,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Hash { path, algorithm } => hash::run(&path, &algorithm).map(|_| ()),
        Commands::Records { session, json } => records::run(&session.into(), json).await.map(|_| ()),
        Commands::Submit { path, session } => submit::run(&session.into(), &path).await.map(|_| ()),
        Commands::Share { grantee, session } => share::run(&session.into(), &grantee).await.map(|_| ()),
    }
}
