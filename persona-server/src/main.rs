use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::{mpsc, watch};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use persona_common::models::CharacterConfig;
use persona_core::collector::filters::{any_message, contains_keyword, mentions_user, quotes_user};
use persona_core::{CharacterService, CollectedMessages, Error};

mod envelope;
use envelope::Envelope;

const CONFIG_ENV: &str = "PERSONA_CONFIG";

#[derive(Parser, Debug, Clone)]
#[command(name = "persona")]
#[command(author, version, about = "Persona - group chat collector feeding an in-character reply generator")]
struct Args {
    /// Path to a JSON character config (falls back to $PERSONA_CONFIG)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override maxMessages from the config
    #[arg(long)]
    max_messages: Option<usize>,

    /// Group id the persona is active in; repeat for several groups
    #[arg(long = "apply-group")]
    apply_group: Vec<String>,

    /// Bot account id; notify when it is mentioned or quoted
    #[arg(long)]
    bot_id: Option<String>,

    /// Notify when a message contains this keyword; repeatable
    #[arg(long = "keyword")]
    keywords: Vec<String>,

    /// Notify on every collected message
    #[arg(long, default_value = "false")]
    all: bool,
}

fn init_tracing() {
    let filter = EnvFilter::from_default_env()
        .add_directive("persona=info".parse().unwrap_or_default());
    let sub = fmt().with_env_filter(filter).with_writer(std::io::stderr).finish();
    tracing::subscriber::set_global_default(sub)
        .expect("Failed to set global subscriber");
}

fn resolve_config(args: &Args, env_path: Option<PathBuf>) -> Result<CharacterConfig, Error> {
    let mut config = match args.config.clone().or(env_path) {
        Some(path) => {
            info!("Loading character config from {}", path.display());
            CharacterConfig::from_path(&path)?
        }
        None => CharacterConfig::default(),
    };

    if let Some(max) = args.max_messages {
        config.max_messages = max;
    }
    if !args.apply_group.is_empty() {
        config.apply_group = args.apply_group.clone();
    }
    config.validate()?;
    Ok(config)
}

fn register_filters(service: &CharacterService, args: &Args) -> usize {
    let collector = service.collector();
    let mut count = 0;
    if let Some(bot_id) = &args.bot_id {
        collector.add_filter(Arc::new(mentions_user(bot_id)));
        collector.add_filter(Arc::new(quotes_user(bot_id.clone())));
        count += 2;
    }
    if !args.keywords.is_empty() {
        collector.add_filter(Arc::new(contains_keyword(&args.keywords)));
        count += 1;
    }
    if args.all {
        collector.add_filter(Arc::new(any_message()));
        count += 1;
    }
    count
}

async fn read_events(service: Arc<CharacterService>) -> Result<(), Error> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<Envelope>(line) {
            Ok(envelope) => envelope.dispatch(&service).await,
            Err(e) => warn!("Skipping malformed line: {}", e),
        }
    }
    info!("stdin closed");
    Ok(())
}

async fn write_collected(stdout: &mut tokio::io::Stdout, collected: &CollectedMessages) {
    let line = match serde_json::to_string(collected) {
        Ok(line) => line,
        Err(e) => {
            error!("Failed to encode collect event: {}", e);
            return;
        }
    };
    if let Err(e) = stdout.write_all(format!("{}\n", line).as_bytes()).await {
        error!("Failed to write collect event: {}", e);
        return;
    }
    let _ = stdout.flush().await;
}

/// Stands in for the reply generator: one JSON line per notification.
async fn print_collected(
    mut rx: mpsc::Receiver<CollectedMessages>,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let mut stdout = tokio::io::stdout();
    loop {
        tokio::select! {
            maybe = rx.recv() => match maybe {
                Some(collected) => write_collected(&mut stdout, &collected).await,
                None => break,
            },
            _ = shutdown_rx.changed() => break,
        }
    }
    while let Ok(collected) = rx.try_recv() {
        write_collected(&mut stdout, &collected).await;
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_tracing();
    let args = Args::parse();

    let env_path = std::env::var(CONFIG_ENV).ok().map(PathBuf::from);
    let config = resolve_config(&args, env_path)?;
    let service = Arc::new(CharacterService::new(config)?);

    if register_filters(&service, &args) == 0 {
        warn!("No filters registered; messages will be collected but never published");
    }
    info!(
        "Persona starting. groups={:?} max_messages={}",
        service.config().apply_group,
        service.config().max_messages
    );

    let rx = service.event_bus().subscribe(None);
    let printer = tokio::spawn(print_collected(rx, service.event_bus().shutdown_rx.clone()));

    tokio::select! {
        res = read_events(service.clone()) => {
            if let Err(e) = res {
                error!("Input error: {:?}", e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Ctrl-C received, shutting down");
        }
    }

    service.event_bus().shutdown();
    printer.await?;
    info!("Main finished. Goodbye!");
    Ok(())
}
