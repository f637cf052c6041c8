use std::sync::Arc;

use anyhow::Context;
use colored::Colorize;
use serde::Serialize;
use tokio::net::TcpListener;
use zset_server::{ServerConfig, StoreServer};
use zset_store::{KeyStore, Serialiser, Store};
use zset_transport::{strategy_for, Transport, TransportConfig};
use zset_types::encoding::encode_value;
use zset_types::{ChangeSet, FieldValueScore, Presence};

use crate::cli::*;

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    let format = cli.format;
    match cli.command {
        Command::Serve(args) => cmd_serve(args).await,
        Command::Insert(args) => {
            let remote = connect(&args.remote)?;
            let changes = remote.insert(&args.key, args.members).await?;
            emit(format, &changes, print_changes)
        }
        Command::Delete(args) => {
            let remote = connect(&args.remote)?;
            let changes = remote.delete(&args.key, args.members).await?;
            emit(format, &changes, print_changes)
        }
        Command::Select(args) => {
            let remote = connect(&args.remote)?;
            let record = remote.select(&args.key, &args.field).await?;
            emit(format, &record, print_record)
        }
        Command::Keys(args) => {
            let keys = connect(&args)?.keys().await?;
            emit(format, &keys, |keys| {
                for key in keys {
                    println!("{key}");
                }
            })
        }
        Command::Size(args) => {
            let size = connect(&args.remote)?.size(&args.key).await?;
            emit(format, &size, |size| println!("{size}"))
        }
        Command::Members(args) => {
            let fields = connect(&args.remote)?.members(&args.key).await?;
            emit(format, &fields, |fields| {
                for field in fields {
                    println!("{field}");
                }
            })
        }
        Command::Score(args) => {
            let remote = connect(&args.remote)?;
            let presence = remote.score(&args.key, &args.field).await?;
            emit(format, &presence, print_presence)
        }
    }
}

async fn cmd_serve(args: ServeArgs) -> anyhow::Result<()> {
    let mut config = match &args.config {
        Some(path) => ServerConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => ServerConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.bind_addr = bind.parse().with_context(|| format!("invalid bind address {bind:?}"))?;
    }
    if let Some(prefix) = args.prefix {
        config.path_prefix = prefix;
    }
    config.validate()?;

    let store = Serialiser::spawn(Store::new());
    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("binding {}", config.bind_addr))?;
    let server = StoreServer::new(config, Arc::new(store.clone()));
    server
        .serve_on(listener, async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    let store = store.stop().await?;
    tracing::info!(keys = store.len(), "store stopped");
    Ok(())
}

fn connect(args: &RemoteArgs) -> anyhow::Result<Arc<dyn Transport>> {
    let config = TransportConfig {
        timeout_ms: args.timeout_ms,
        path_prefix: args.prefix.clone(),
    };
    let transport = strategy_for(&args.protocol, config)?.connect(&args.remote)?;
    tracing::debug!(endpoint = transport.endpoint(), hash = transport.hash(), "connected");
    Ok(transport)
}

fn emit<T: Serialize>(format: OutputFormat, value: &T, text: impl FnOnce(&T)) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Text => text(value),
    }
    Ok(())
}

fn print_changes(changes: &ChangeSet) {
    for field in &changes.success {
        println!("{} {}", "✓".green(), field);
    }
    for field in &changes.failure {
        println!("{} {}", "✗".red(), field.to_string().dimmed());
    }
}

fn print_record(record: &FieldValueScore) {
    println!(
        "{} = {} (score {})",
        record.field.as_str().bold(),
        encode_value(&record.value),
        record.score.to_string().yellow()
    );
}

fn print_presence(presence: &Presence) {
    if presence.present {
        println!("{} score {}", "present".green(), presence.score.to_string().yellow());
    } else {
        println!("{}", "absent".dimmed());
    }
}
