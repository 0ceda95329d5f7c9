use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use coda_core::wal::{self, LogOp};
use coda_core::{telemetry, BrokerConfig, Message, QueueConfig, QueueRegistry};

#[derive(Parser)]
#[command(name = "coda", about = "Coda embeddable message queue CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a publish/consume/acknowledge round trip against a local registry
    Demo {
        /// TOML config file with broker defaults
        #[arg(long)]
        config: Option<PathBuf>,

        /// Directory for write-ahead logs (overrides the config file)
        #[arg(long)]
        log_dir: Option<PathBuf>,
    },

    /// Decode a WAL file and print its records plus the state they replay to
    Inspect {
        /// Path to a `<queue>.log` file
        file: PathBuf,
    },
}

fn main() {
    telemetry::init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Commands::Demo { config, log_dir } => demo(config, log_dir),
        Commands::Inspect { file } => inspect(&file),
    }
}

fn demo(config: Option<PathBuf>, log_dir: Option<PathBuf>) {
    let broker_config = match config {
        Some(path) => match BrokerConfig::from_path(&path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error: {e}");
                process::exit(1);
            }
        },
        None => BrokerConfig::default(),
    };
    let mut queue_config: QueueConfig = broker_config.queue_config();
    if log_dir.is_some() {
        queue_config.log_directory = log_dir;
    }

    let registry = QueueRegistry::new();
    let queue = match registry.create_queue("orders", queue_config) {
        Ok(queue) => queue,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };

    queue.publish(Message::new("Order #1"));
    queue.publish(Message::new("Order #2"));

    for _ in 0..2 {
        match queue.consume() {
            Ok(receipt) => {
                println!("consumed: {}", String::from_utf8_lossy(receipt.payload()));
                if let Err(e) = queue.acknowledge(receipt.handle()) {
                    eprintln!("Error: {e}");
                }
            }
            Err(e) => {
                eprintln!("Error: {e}");
                process::exit(1);
            }
        }
    }

    registry.delete_queue("orders");
}

fn inspect(file: &Path) {
    let entries = match wal::read_entries(file) {
        Ok(entries) => entries,
        Err(e) => {
            eprintln!("Error: cannot read {}: {e}", file.display());
            process::exit(1);
        }
    };

    // Replay-lite: track which ids are queued and which handles are in
    // flight, without building real queue state.
    let mut queued: Vec<String> = Vec::new();
    let mut in_flight: HashMap<String, String> = HashMap::new();

    for entry in &entries {
        let op = match entry.op {
            LogOp::Publish => "PUBLISH",
            LogOp::Consume => "CONSUME",
            LogOp::Ack => "ACK",
            LogOp::Nack => "NACK",
        };
        println!(
            "{op:<8} msg_id={} handle={} retry_count={} payload={}B",
            if entry.msg_id.is_empty() { "-" } else { &entry.msg_id },
            if entry.handle.is_empty() { "-" } else { &entry.handle },
            entry.retry_count,
            entry.payload.len(),
        );

        match entry.op {
            LogOp::Publish => queued.push(entry.msg_id.clone()),
            LogOp::Consume => {
                if let Some(pos) = queued.iter().position(|id| *id == entry.msg_id) {
                    queued.remove(pos);
                    in_flight.insert(entry.handle.clone(), entry.msg_id.clone());
                }
            }
            LogOp::Ack | LogOp::Nack => {
                let msg_id = in_flight.remove(&entry.handle);
                if entry.op == LogOp::Nack {
                    if let Some(msg_id) = msg_id {
                        queued.push(msg_id);
                    }
                }
            }
        }
    }

    println!();
    println!(
        "{} records; replays to {} queued, {} in flight",
        entries.len(),
        queued.len(),
        in_flight.len(),
    );
}
