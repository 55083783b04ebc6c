use clap::{Parser, Subcommand};
use commands::dispatch;
use store::Store;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

mod settings;

#[derive(Parser, Debug)]
#[command(name = "coffers")]
#[command(about = "Multi-tenant party-treasury ledger")]
struct Cli {
    /// Settings file name, without extension.
    #[arg(long, default_value = "settings")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run an interactive command session against one campaign.
    ///
    /// A chat transport would resolve the tenant and caller from incoming
    /// messages; the console pins both for local use.
    Console {
        /// Tenant (channel) id.
        #[arg(long)]
        tenant: u64,
        /// Acting user id.
        #[arg(long)]
        user: u64,
    },
    /// Add a GM to an existing campaign.
    AddGm {
        #[arg(long)]
        tenant: u64,
        /// User id to add as GM.
        #[arg(long)]
        gm: u64,
    },
    /// List known campaign ids.
    Tenants,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();
    let settings = settings::Settings::new(&cli.config)?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "coffers={level},commands={level},store={level},engine={level}",
            level = settings.app.level
        ))
        .init();

    let store = Store::open(&settings.data.path).await?;

    match cli.command {
        Command::Console { tenant, user } => run_console(&store, tenant, user).await?,
        Command::AddGm { tenant, gm } => {
            store.add_gm(tenant, gm).await?;
            println!("GM added successfully.");
        }
        Command::Tenants => {
            for id in store.tenants().await {
                println!("{id}");
            }
        }
    }

    Ok(())
}

async fn run_console(store: &Store, tenant: u64, user: u64) -> Result<(), std::io::Error> {
    tracing::info!(tenant, user, "console session started");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    stdout.write_all(b"> ").await?;
    stdout.flush().await?;
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line == "quit" {
            break;
        }
        if !line.is_empty() {
            let reply = dispatch(store, tenant, user, line).await;
            stdout.write_all(reply.as_bytes()).await?;
            stdout.write_all(b"\n").await?;
        }
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;
    }

    Ok(())
}
