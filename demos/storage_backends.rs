//! Selecting a storage backend by name at runtime.
//!
//! Demonstrates:
//! - Declaring a registry next to the trait it produces
//! - Registering implementations with `register_class!` and `register_creator!`
//! - Picking one with a `--db` flag (or the `FACTORY_DB` environment variable)
//! - Handling an unknown name as a configuration error
//!
//! Run with: `cargo run --example storage_backends -- --db logging`
//! Try:      `cargo run --example storage_backends -- --db leveldb`

use std::collections::BTreeMap;
use std::process::ExitCode;

use clap::Parser;
use factory_registry::{define_registry, register_class, register_creator, RegistryError};
use tracing::info;
use tracing_subscriber::EnvFilter;

pub trait StorageBackend {
    fn put(&mut self, key: &str, value: &[u8]);
    fn get(&self, key: &str) -> Option<&[u8]>;
    fn len(&self) -> usize;
}

define_registry!(
    /// Every storage backend linked into this binary.
    pub storage: dyn StorageBackend
);

/// Keeps everything in an ordered map.
#[derive(Default)]
struct Memory {
    entries: BTreeMap<String, Vec<u8>>,
}

impl StorageBackend for Memory {
    fn put(&mut self, key: &str, value: &[u8]) {
        self.entries.insert(key.to_string(), value.to_vec());
    }

    fn get(&self, key: &str) -> Option<&[u8]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

register_class!(storage, "memory", Memory);

/// Memory backend that logs every write.
struct Logging(Memory);

impl StorageBackend for Logging {
    fn put(&mut self, key: &str, value: &[u8]) {
        info!(key, bytes = value.len(), "put");
        self.0.put(key, value);
    }

    fn get(&self, key: &str) -> Option<&[u8]> {
        self.0.get(key)
    }

    fn len(&self) -> usize {
        self.0.len()
    }
}

register_creator!(storage, "logging", |()| Box::new(Logging(Memory::default())));

#[derive(Debug, Parser)]
#[command(about = "Write a few records through a storage backend chosen by name")]
struct Cli {
    /// Backend to use.
    #[arg(long, env = "FACTORY_DB", default_value = "memory")]
    db: String,

    /// Print the registered backends and exit.
    #[arg(long)]
    list: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .without_time()
        .with_target(false)
        .init();

    let cli = Cli::parse();

    if cli.list {
        println!("{}", storage::registered_keys());
        return ExitCode::SUCCESS;
    }

    let mut backend = match storage::create(cli.db.as_str(), ()) {
        Ok(backend) => backend,
        Err(RegistryError::KeyNotFound { key, available, .. }) => {
            eprintln!("unknown --db `{key}`; choose one of: {}", available.join(", "));
            return ExitCode::from(2);
        }
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };

    for (i, label) in ["cifar", "mnist", "imagenet"].iter().enumerate() {
        backend.put(&format!("{i:08}"), label.as_bytes());
    }

    println!("backend `{}` holds {} records", cli.db, backend.len());
    if let Some(first) = backend.get("00000000") {
        println!("00000000 => {}", String::from_utf8_lossy(first));
    }

    ExitCode::SUCCESS
}
