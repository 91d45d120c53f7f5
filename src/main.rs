use clap::{Parser, Subcommand};
use futures::StreamExt;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{Level, debug};
use wallet::application::service::WalletService;
use wallet::config::{DEFAULT_PROGRESS_CHUNK_SIZE, EngineConfig, WalletConfig};
use wallet::domain::Money;
use wallet::interfaces::dump;
use wallet::parallel::ParallelEngine;
use wallet::telemetry::{self, LogFormat};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Maximum number of worker threads (defaults to the CPU count)
    #[arg(long, global = true, env = "WALLET_WORKERS")]
    workers: Option<usize>,

    /// Log level used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "warn")]
    log_level: Level,

    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sum the integers 0..size with the partitioned reduce
    Sum {
        #[arg(long, default_value_t = 1_000_000)]
        size: i64,
        #[arg(long, default_value_t = 10)]
        partitions: usize,
    },
    /// Stream chunk totals of 0..size as the chunks complete
    Progress {
        #[arg(long, default_value_t = 1_000_000)]
        size: i64,
        #[arg(long, default_value_t = DEFAULT_PROGRESS_CHUNK_SIZE)]
        chunk_size: usize,
    },
    /// Seed a sample ledger and report on it
    Demo {
        #[arg(long, default_value_t = 3)]
        partitions: usize,
        /// Directory to write the ledger dumps to
        #[arg(long)]
        export_dir: Option<PathBuf>,
        #[arg(long)]
        json: bool,
    },
    /// Load ledger dumps from a directory and report on them
    Import {
        #[arg(long)]
        dir: PathBuf,
        #[arg(long, default_value_t = 3)]
        partitions: usize,
        #[arg(long)]
        json: bool,
    },
}

#[derive(Serialize)]
struct LedgerReport {
    accounts: usize,
    payments: usize,
    total: Money,
    categories: BTreeMap<String, usize>,
}

impl LedgerReport {
    fn print(&self, json: bool) -> Result<()> {
        if json {
            println!("{}", serde_json::to_string(self).into_diagnostic()?);
            return Ok(());
        }
        println!("accounts={}", self.accounts);
        println!("payments={}", self.payments);
        println!("total={}", self.total);
        for (category, count) in &self.categories {
            println!("category {category}={count}");
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    if let Err(err) = telemetry::init(cli.log_level, cli.log_format) {
        eprintln!("logging disabled: {err}");
    }

    let engine_config = EngineConfig::default().with_max_workers(cli.workers);

    match cli.command {
        Command::Sum { size, partitions } => {
            let engine = ParallelEngine::new(engine_config);
            debug!(workers = engine.config().max_workers, size, partitions, "sum");
            let items: Arc<[i64]> = (0..size.max(0)).collect();
            let total = engine
                .reduce_sum(items, partitions, |v| *v)
                .await
                .into_diagnostic()?;
            println!("total={total}");
        }
        Command::Progress { size, chunk_size } => {
            let engine = ParallelEngine::new(engine_config);
            debug!(workers = engine.config().max_workers, size, chunk_size, "progress");
            let items: Arc<[i64]> = (0..size.max(0)).collect();
            let mut partials =
                engine.stream_partial_results(items, chunk_size, |chunk| chunk.iter().sum::<i64>());

            let mut total = 0;
            while let Some(partial) = partials.next().await {
                let partial = partial.into_diagnostic()?;
                println!("part={} result={}", partial.size(), partial.value);
                total += partial.value;
            }
            println!("total={total}");
        }
        Command::Demo {
            partitions,
            export_dir,
            json,
        } => {
            let service = WalletService::in_memory(WalletConfig::default().with_engine(engine_config));
            seed_sample_ledger(&service).await.into_diagnostic()?;
            if let Some(dir) = export_dir {
                dump::export(&service, &dir).await.into_diagnostic()?;
            }
            report(&service, partitions).await?.print(json)?;
        }
        Command::Import {
            dir,
            partitions,
            json,
        } => {
            let service = WalletService::in_memory(WalletConfig::default().with_engine(engine_config));
            dump::import(&service, &dir).await.into_diagnostic()?;
            report(&service, partitions).await?.print(json)?;
        }
    }

    Ok(())
}

async fn report(service: &WalletService, partitions: usize) -> Result<LedgerReport> {
    let payments = service.payments().await.into_diagnostic()?;
    let mut categories = BTreeMap::new();
    for payment in &payments {
        *categories.entry(payment.category.0.clone()).or_insert(0) += 1;
    }

    Ok(LedgerReport {
        accounts: service.accounts().await.into_diagnostic()?.len(),
        payments: payments.len(),
        total: service.sum_payments(partitions).await.into_diagnostic()?,
        categories,
    })
}

async fn seed_sample_ledger(service: &WalletService) -> wallet::error::Result<()> {
    let ledger: [(&str, i64, &[(i64, &str)]); 3] = [
        (
            "1111",
            500,
            &[
                (10, "food"),
                (10, "phone"),
                (15, "cafe"),
                (25, "auto"),
                (30, "restaurant"),
                (50, "auto"),
                (60, "bank"),
                (50, "bank"),
            ],
        ),
        ("2222", 200, &[(40, "phone")]),
        ("3333", 300, &[(36, "auto"), (12, "food"), (25, "phone")]),
    ];

    for (phone, balance, payments) in ledger {
        let account = service.register_account(phone).await?;
        service.deposit(account.id, Money(balance)).await?;
        for &(amount, category) in payments {
            service.pay(account.id, Money(amount), category).await?;
        }
    }
    Ok(())
}
