//! localfire - inspect and edit a local document store from the shell.
//!
//! Operates on the directory configured by `LOCALFIRE_STORAGE_DIR` on behalf
//! of `LOCALFIRE_ACTOR` (or `--actor`).

use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use localfire::database::{NewNotification, Priority};
use localfire::sync::SimulatedTransport;
use localfire::{
    CollectionStore, Config, DataSyncService, FileStorage, Filter, RealtimeStore, Substrate,
};

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[derive(Debug, Parser)]
#[command(name = "localfire", version, about = "Local document store emulation")]
struct Cli {
    /// Acting identity (overrides LOCALFIRE_ACTOR)
    #[arg(long, global = true)]
    actor: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List collection names present in storage
    Collections,
    /// Print the documents of a collection as JSON lines
    List {
        collection: String,
        /// Only documents whose userId equals this owner
        #[arg(long)]
        owner: Option<String>,
    },
    /// Print one document
    Get { collection: String, id: String },
    /// Delete one document
    Remove { collection: String, id: String },
    /// Delete a whole collection
    #[command(name = "drop")]
    DropCollection { collection: String },
    /// Sync an appointment (JSON payload) to a patient and a doctor
    Appointment {
        #[arg(long)]
        patient: String,
        #[arg(long)]
        doctor: String,
        payload: String,
    },
    /// Raise a notification for the actor (or --owner)
    Notify {
        #[arg(long = "type")]
        kind: String,
        title: String,
        message: String,
        #[arg(long, default_value = "medium")]
        priority: String,
        #[arg(long)]
        owner: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file first (before anything else)
    dotenvy::dotenv().ok();

    // If RUST_LOG is not set, default to "info" level for our crate
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("localfire=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = Config::from_env();
    if cli.actor.is_some() {
        config.actor = cli.actor.clone();
    }

    let storage = FileStorage::open(&config.storage_dir)
        .with_context(|| format!("opening {}", config.storage_dir.display()))?;
    info!("Using storage at {}", storage.root().display());
    let substrate = Substrate::from_backend(storage);

    let needs_actor = matches!(
        cli.command,
        Command::List { .. } | Command::Get { .. } | Command::Remove { .. }
    );
    if needs_actor && config.actor.is_none() {
        bail!("no actor configured; set LOCALFIRE_ACTOR or pass --actor");
    }

    match cli.command {
        Command::Collections => {
            for name in substrate.collections() {
                println!("{name}");
            }
        }
        Command::List { collection, owner } => {
            let filters = owner.map(|o| vec![Filter::eq("userId", o)]).unwrap_or_default();
            let store = collection_store(&config, substrate, collection).with_filters(filters);
            store.load().await;
            for doc in store.data() {
                println!("{}", serde_json::to_string(&doc)?);
            }
        }
        Command::Get { collection, id } => {
            let store = collection_store(&config, substrate, collection);
            match store.get_by_id(&id).await {
                Some(doc) => println!("{}", serde_json::to_string_pretty(&doc)?),
                None => bail!("document {id} not found"),
            }
        }
        Command::Remove { collection, id } => {
            let store = collection_store(&config, substrate, collection);
            store.remove(&id).await?;
            info!("Removed {}", id);
        }
        Command::Notify {
            kind,
            title,
            message,
            priority,
            owner,
        } => {
            let priority: Priority = priority.parse().map_err(anyhow::Error::msg)?;
            let store = RealtimeStore::new(
                substrate,
                localfire::database::NOTIFICATIONS,
                config.actor.clone(),
                owner,
            )
            .with_latency(config.realtime_latency());
            let id = store
                .add_notification(NewNotification::new(kind, title, message).priority(priority))
                .await?;
            println!("{id}");
        }
        Command::DropCollection { collection } => {
            if substrate.clear(&collection)? {
                info!("Dropped {}", collection);
            } else {
                bail!("collection {collection} does not exist");
            }
        }
        Command::Appointment {
            patient,
            doctor,
            payload,
        } => {
            let payload: serde_json::Value =
                serde_json::from_str(&payload).context("payload must be JSON")?;
            let sync = DataSyncService::new(Arc::new(SimulatedTransport::new(
                config.sync_latency(),
            )));
            let (to_patient, to_doctor) = sync.sync_appointment(&patient, &doctor, payload).await?;
            println!("{}", serde_json::to_string(&to_patient)?);
            println!("{}", serde_json::to_string(&to_doctor)?);
        }
    }

    Ok(())
}

fn collection_store(config: &Config, substrate: Substrate, collection: String) -> CollectionStore {
    CollectionStore::new(substrate, collection, config.actor.clone())
        .with_latency(config.collection_latency())
}
