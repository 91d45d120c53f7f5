//! Semicolon-delimited dumps of accounts, payments and favorites.
//!
//! Every dump is header-less, one record per line, with fields in the
//! declaration order of the domain structs.

use crate::application::service::WalletService;
use crate::domain::account::Account;
use crate::domain::payment::{Favorite, Payment};
use crate::error::{Result, WalletError};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const ACCOUNTS_FILE: &str = "accounts.dump";
pub const PAYMENTS_FILE: &str = "payments.dump";
pub const FAVORITES_FILE: &str = "favorites.dump";

/// Record terminator of the single-file account dump.
const ACCOUNT_TERMINATOR: u8 = b'|';

/// How many records an import restored.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub accounts: usize,
    pub payments: usize,
    pub favorites: usize,
}

fn writer_builder() -> csv::WriterBuilder {
    let mut builder = csv::WriterBuilder::new();
    builder.delimiter(b';').has_headers(false);
    builder
}

fn reader_builder() -> csv::ReaderBuilder {
    let mut builder = csv::ReaderBuilder::new();
    builder
        .delimiter(b';')
        .has_headers(false)
        .trim(csv::Trim::All);
    builder
}

/// Writes `records` to `dest`, one per line.
pub fn write_records<W: Write, T: Serialize>(dest: W, records: &[T]) -> Result<()> {
    let mut writer = writer_builder().from_writer(dest);
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Reads every record from `source`. `name` identifies the source in errors.
pub fn read_records<R: Read, T: DeserializeOwned>(source: R, name: &str) -> Result<Vec<T>> {
    reader_builder()
        .from_reader(source)
        .into_deserialize()
        .map(|record| invalid_record(record, name))
        .collect()
}

fn invalid_record<T>(record: std::result::Result<T, csv::Error>, name: &str) -> Result<T> {
    record.map_err(|e| WalletError::InvalidRecord {
        file: name.to_string(),
        message: e.to_string(),
    })
}

/// Writes `records` to `path` unless there are none. Returns whether the
/// file was written.
fn write_file<T: Serialize>(path: &Path, records: &[T]) -> Result<bool> {
    if records.is_empty() {
        return Ok(false);
    }
    write_records(File::create(path)?, records)?;
    debug!(path = %path.display(), records = records.len(), "dump written");
    Ok(true)
}

/// Reads `path`, or returns `None` when it does not exist.
fn read_file<T: DeserializeOwned>(path: &Path) -> Result<Option<Vec<T>>> {
    match File::open(path) {
        Ok(file) => read_records(file, &path.display().to_string()).map(Some),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Dumps accounts, payments and favorites into `dir`. Empty collections
/// produce no file.
pub async fn export(service: &WalletService, dir: impl AsRef<Path>) -> Result<()> {
    let dir = dir.as_ref();
    write_file(&dir.join(ACCOUNTS_FILE), &service.accounts().await?)?;
    write_file(&dir.join(PAYMENTS_FILE), &service.payments().await?)?;
    write_file(&dir.join(FAVORITES_FILE), &service.favorites().await?)?;
    info!(dir = %dir.display(), "ledger exported");
    Ok(())
}

/// Loads whichever dumps exist in `dir`, replacing records with equal ids.
pub async fn import(service: &WalletService, dir: impl AsRef<Path>) -> Result<ImportSummary> {
    let dir = dir.as_ref();
    let mut summary = ImportSummary::default();

    if let Some(accounts) = read_file::<Account>(&dir.join(ACCOUNTS_FILE))? {
        summary.accounts = accounts.len();
        for account in accounts {
            service.restore_account(account).await?;
        }
    }
    if let Some(payments) = read_file::<Payment>(&dir.join(PAYMENTS_FILE))? {
        summary.payments = payments.len();
        for payment in payments {
            service.restore_payment(payment).await?;
        }
    }
    if let Some(favorites) = read_file::<Favorite>(&dir.join(FAVORITES_FILE))? {
        summary.favorites = favorites.len();
        for favorite in favorites {
            service.restore_favorite(favorite).await?;
        }
    }

    info!(
        dir = %dir.display(),
        accounts = summary.accounts,
        payments = summary.payments,
        favorites = summary.favorites,
        "ledger imported"
    );
    Ok(summary)
}

/// Writes all accounts to a single file as `id;phone;balance|` records.
pub async fn export_accounts_to_file(service: &WalletService, path: impl AsRef<Path>) -> Result<()> {
    let accounts = service.accounts().await?;
    let mut writer = writer_builder()
        .terminator(csv::Terminator::Any(ACCOUNT_TERMINATOR))
        .from_writer(File::create(path.as_ref())?);
    for account in &accounts {
        writer.serialize(account)?;
    }
    writer.flush()?;
    Ok(())
}

/// Restores accounts from a file written by [`export_accounts_to_file`].
pub async fn import_accounts_from_file(
    service: &WalletService,
    path: impl AsRef<Path>,
) -> Result<usize> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let accounts: Vec<Account> = reader_builder()
        .terminator(csv::Terminator::Any(ACCOUNT_TERMINATOR))
        .from_reader(file)
        .into_deserialize()
        .map(|record| invalid_record(record, &path.display().to_string()))
        .collect::<Result<_>>()?;

    let restored = accounts.len();
    for account in accounts {
        service.restore_account(account).await?;
    }
    Ok(restored)
}

/// Splits `payments` into files of at most `records` lines each.
///
/// Everything goes to `payments.dump` when it fits in one file, otherwise to
/// `payments1.dump`, `payments2.dump`, ... Returns the written paths.
pub fn history_to_files(
    payments: &[Payment],
    dir: impl AsRef<Path>,
    records: usize,
) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let records = records.max(1);

    if payments.is_empty() {
        return Ok(Vec::new());
    }
    if payments.len() <= records {
        let path = dir.join(PAYMENTS_FILE);
        write_file(&path, payments)?;
        return Ok(vec![path]);
    }

    let mut written = Vec::new();
    for (index, chunk) in payments.chunks(records).enumerate() {
        let path = dir.join(format!("payments{}.dump", index + 1));
        write_file(&path, chunk)?;
        written.push(path);
    }
    Ok(written)
}
