//! In-memory lead tracker for testing, dry runs and file-backed runs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::{TrackerError, TrackerResult};
use crate::traits::tracker::LeadTracker;
use crate::types::lead::{format_timestamp, QualifiedLead, TrackerRecord, SHEET_HEADERS};

/// First data row; row 1 is the header.
const FIRST_DATA_ROW: usize = 2;

/// One named sheet of header-keyed rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetData {
    pub name: String,
    pub rows: Vec<HashMap<String, String>>,
}

/// Sheets held in memory, in creation order.
///
/// Not suitable for production as data is lost on restart unless the
/// caller saves a [`snapshot`](Self::snapshot).
#[derive(Default)]
pub struct MemoryTracker {
    sheets: RwLock<Vec<SheetData>>,
}

impl MemoryTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a tracker holding existing sheets.
    pub fn from_sheets(sheets: Vec<SheetData>) -> Self {
        Self {
            sheets: RwLock::new(sheets),
        }
    }

    /// Copy of every sheet.
    pub fn snapshot(&self) -> Vec<SheetData> {
        self.sheets.read().unwrap().clone()
    }

    pub fn sheet_names(&self) -> Vec<String> {
        self.sheets
            .read()
            .unwrap()
            .iter()
            .map(|s| s.name.clone())
            .collect()
    }

    /// Number of data rows in a sheet (0 if missing).
    pub fn row_count(&self, sheet: &str) -> usize {
        self.sheets
            .read()
            .unwrap()
            .iter()
            .find(|s| s.name == sheet)
            .map_or(0, |s| s.rows.len())
    }
}

#[async_trait]
impl LeadTracker for MemoryTracker {
    async fn all_records(&self) -> TrackerResult<Vec<TrackerRecord>> {
        Ok(self
            .sheets
            .read()
            .unwrap()
            .iter()
            .flat_map(|sheet| sheet.rows.iter().map(TrackerRecord::from_fields))
            .collect())
    }

    async fn append_leads(
        &self,
        sheet: &str,
        leads: &[QualifiedLead],
    ) -> TrackerResult<Vec<usize>> {
        let rows = leads.iter().map(|lead| {
            SHEET_HEADERS
                .iter()
                .map(|h| h.to_string())
                .zip(lead.to_row())
                .collect::<HashMap<_, _>>()
        });

        let mut sheets = self.sheets.write().unwrap();
        let index = match sheets.iter().position(|s| s.name == sheet) {
            Some(index) => index,
            None => {
                sheets.push(SheetData {
                    name: sheet.to_string(),
                    rows: Vec::new(),
                });
                sheets.len() - 1
            }
        };
        let first = sheets[index].rows.len() + FIRST_DATA_ROW;
        sheets[index].rows.extend(rows);

        Ok((first..first + leads.len()).collect())
    }

    async fn unsent_records(&self, sheet: &str) -> TrackerResult<Vec<(usize, TrackerRecord)>> {
        let sheets = self.sheets.read().unwrap();
        let Some(data) = sheets.iter().find(|s| s.name == sheet) else {
            return Ok(Vec::new());
        };

        Ok(data
            .rows
            .iter()
            .enumerate()
            .map(|(i, fields)| (i + FIRST_DATA_ROW, TrackerRecord::from_fields(fields)))
            .filter(|(_, record)| !record.email_sent)
            .collect())
    }

    async fn mark_email_sent(
        &self,
        sheet: &str,
        row: usize,
        sent_at: DateTime<Utc>,
    ) -> TrackerResult<()> {
        let mut sheets = self.sheets.write().unwrap();
        let data = sheets
            .iter_mut()
            .find(|s| s.name == sheet)
            .ok_or_else(|| TrackerError::SheetNotFound(sheet.to_string()))?;

        let fields = row
            .checked_sub(FIRST_DATA_ROW)
            .and_then(|i| data.rows.get_mut(i))
            .ok_or_else(|| TrackerError::RowNotFound {
                sheet: sheet.to_string(),
                row,
            })?;

        fields.insert("Email Sent".to_string(), "Yes".to_string());
        fields.insert("Email Sent At".to_string(), format_timestamp(sent_at));
        Ok(())
    }
}
