//! Record service
//!
//! Adds, removes, looks up and bulk-imports account records for one client.

use std::sync::Arc;

use crate::data::{AccountDetails, AccountRecord, Database, Overview};
use crate::error::AppError;

/// Record service
pub struct RecordService {
    db: Arc<Database>,
}

impl RecordService {
    /// Create new record service
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Graph and account pickers for the landing pages
    pub async fn overview(&self) -> Result<Overview, AppError> {
        let records = self.db.list_records().await?;
        Ok(Overview::from_records(&records))
    }

    /// Stored lists for `account` in `graph`
    ///
    /// Any failure, including a missing record, yields the empty markers.
    pub async fn account_details(&self, graph: &str, account: &str) -> AccountDetails {
        match self.db.find_record(graph, account).await {
            Ok(Some(record)) => record.into(),
            Ok(None) => AccountDetails::empty(),
            Err(error) => {
                tracing::debug!(%error, graph, account, "Account lookup failed");
                AccountDetails::empty()
            }
        }
    }

    /// Append one record
    pub async fn add(&self, record: &AccountRecord) -> Result<(), AppError> {
        self.db.insert_record(record).await?;
        tracing::info!(graph = %record.graph, account = %record.account, "Record added");
        Ok(())
    }

    /// Remove all records of a graph
    pub async fn delete_graph(&self, graph: &str) -> Result<u64, AppError> {
        let removed = self.db.delete_graph(graph).await?;
        tracing::info!(graph, removed, "Graph deleted");
        Ok(removed)
    }

    /// Remove all records of an account across graphs
    pub async fn delete_account(&self, account: &str) -> Result<u64, AppError> {
        let removed = self.db.delete_account(account).await?;
        tracing::info!(account, removed, "Account deleted");
        Ok(removed)
    }

    /// Insert every row of a headerless four-column CSV document.
    ///
    /// Rows are inserted one at a time. A malformed row stops the import;
    /// rows before it stay inserted.
    ///
    /// # Returns
    /// Number of rows inserted
    pub async fn import_csv(&self, data: &[u8]) -> Result<usize, AppError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(data);

        let mut inserted = 0;
        for (line, row) in reader.records().enumerate() {
            let row = row?;
            let record = parse_row(&row).map_err(|message| {
                AppError::Import(format!("row {}: {}", line + 1, message))
            });
            let record = match record {
                Ok(record) => record,
                Err(error) => {
                    tracing::warn!(inserted, %error, "Import stopped at malformed row");
                    return Err(error);
                }
            };
            self.db.insert_record(&record).await?;
            inserted += 1;
        }

        tracing::info!(inserted, "Records imported");
        Ok(inserted)
    }
}

fn parse_row(row: &csv::StringRecord) -> Result<AccountRecord, String> {
    if row.len() != 4 {
        return Err(format!("expected 4 columns, found {}", row.len()));
    }
    row.deserialize::<AccountRecord>(None)
        .map_err(|error| error.to_string())
}
