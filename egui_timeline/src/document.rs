//! 文档模块
//!
//! 处理时间线文档的保存和加载，并维护按时间排序的条目集合。
//!
//! On disk a document is a JSON object:
//!
//! ```json
//! {
//!   "version": 1,
//!   "title": "Launch day",
//!   "description": "",
//!   "timeZone": "Europe/London",
//!   "tZero": "2024-03-14T09:30:00",
//!   "tZeroMode": true,
//!   "items": [
//!     { "time": "2024-03-14T09:00:00", "text": "Doors open", "isApproximate": false, "isImportant": false }
//!   ]
//! }
//! ```
//!
//! Times are wall-clock times in the document time zone, without an offset.

use crate::error::{DocumentError, DocumentResult};
use crate::layout::LabelFormat;
use crate::structure::{ItemId, TimelineItem};
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DOCUMENT_VERSION: u32 = 1;
pub const UNTITLED: &str = "Untitled Timeline";

const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DocumentFile {
    version: u32,
    title: String,
    #[serde(default)]
    description: String,
    time_zone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    t_zero: Option<String>,
    #[serde(default)]
    t_zero_mode: bool,
    #[serde(default)]
    items: Vec<ItemRecord>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ItemRecord {
    time: String,
    text: String,
    #[serde(default)]
    is_approximate: bool,
    #[serde(default)]
    is_important: bool,
}

/// A timeline document: metadata plus the item collection, kept in time
/// order.
#[derive(Clone, Debug)]
pub struct TimelineDocument {
    title: String,
    description: String,
    time_zone: Tz,
    t_zero: Option<DateTime<Utc>>,
    t_zero_mode: bool,
    items: Vec<TimelineItem>,
    file_path: Option<PathBuf>,
    has_unsaved_changes: bool,
}

impl Default for TimelineDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl TimelineDocument {
    /// An empty document in the zone named by `TZ`, or UTC.
    pub fn new() -> Self {
        let time_zone = std::env::var("TZ")
            .ok()
            .and_then(|name| name.parse::<Tz>().ok())
            .unwrap_or(Tz::UTC);
        Self::with_time_zone(time_zone)
    }

    pub fn with_time_zone(time_zone: Tz) -> Self {
        Self {
            title: UNTITLED.to_string(),
            description: String::new(),
            time_zone,
            t_zero: None,
            t_zero_mode: false,
            items: Vec::new(),
            file_path: None,
            has_unsaved_changes: false,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn time_zone(&self) -> Tz {
        self.time_zone
    }

    pub fn t_zero(&self) -> Option<DateTime<Utc>> {
        self.t_zero
    }

    pub fn t_zero_mode(&self) -> bool {
        self.t_zero_mode
    }

    /// The T-zero item labels are shown against, if relative display is on.
    pub fn display_t_zero(&self) -> Option<DateTime<Utc>> {
        if self.t_zero_mode {
            self.t_zero
        } else {
            None
        }
    }

    pub fn label_format(&self) -> LabelFormat {
        LabelFormat {
            time_zone: self.time_zone,
            t_zero: self.display_t_zero(),
        }
    }

    pub fn items(&self) -> &[TimelineItem] {
        &self.items
    }

    pub fn item(&self, id: ItemId) -> Option<&TimelineItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.item(id).is_some()
    }

    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.has_unsaved_changes
    }

    /// Title for a window or tab header, starred while there are unsaved
    /// changes.
    pub fn display_title(&self) -> String {
        let title = if self.title.is_empty() { UNTITLED } else { &self.title };
        if self.has_unsaved_changes {
            format!("* {}", title)
        } else {
            title.to_string()
        }
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
        self.has_unsaved_changes = true;
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
        self.has_unsaved_changes = true;
    }

    pub fn set_time_zone(&mut self, time_zone: Tz) {
        self.time_zone = time_zone;
        self.has_unsaved_changes = true;
    }

    pub fn set_t_zero(&mut self, t_zero: Option<DateTime<Utc>>) {
        self.t_zero = t_zero;
        self.has_unsaved_changes = true;
    }

    pub fn set_t_zero_mode(&mut self, enabled: bool) {
        self.t_zero_mode = enabled;
        self.has_unsaved_changes = true;
    }

    /// Inserts after any items with the same time.
    pub fn add_item(&mut self, item: TimelineItem) -> ItemId {
        let id = item.id;
        let index = self.items.partition_point(|existing| existing.time <= item.time);
        self.items.insert(index, item);
        self.has_unsaved_changes = true;
        id
    }

    pub fn remove_item(&mut self, id: ItemId) -> Option<TimelineItem> {
        let index = self.items.iter().position(|item| item.id == id)?;
        self.has_unsaved_changes = true;
        Some(self.items.remove(index))
    }

    pub fn set_item_time(&mut self, id: ItemId, time: DateTime<Utc>) -> bool {
        let Some(item) = self.items.iter_mut().find(|item| item.id == id) else {
            return false;
        };
        item.time = time;
        self.items.sort_by_key(|item| item.time);
        self.has_unsaved_changes = true;
        true
    }

    pub fn set_item_label(&mut self, id: ItemId, label: impl Into<String>) -> bool {
        let Some(item) = self.items.iter_mut().find(|item| item.id == id) else {
            return false;
        };
        item.label = label.into();
        self.has_unsaved_changes = true;
        true
    }

    pub fn set_item_flags(&mut self, id: ItemId, is_approximate: bool, is_important: bool) -> bool {
        let Some(item) = self.items.iter_mut().find(|item| item.id == id) else {
            return false;
        };
        item.is_approximate = is_approximate;
        item.is_important = is_important;
        self.has_unsaved_changes = true;
        true
    }

    /// Replaces the whole collection, returning the old items.
    pub fn replace_items(&mut self, mut items: Vec<TimelineItem>) -> Vec<TimelineItem> {
        items.sort_by_key(|item| item.time);
        self.has_unsaved_changes = true;
        std::mem::replace(&mut self.items, items)
    }

    pub fn to_json(&self) -> DocumentResult<String> {
        let zone = self.time_zone;
        let file = DocumentFile {
            version: DOCUMENT_VERSION,
            title: self.title.clone(),
            description: self.description.clone(),
            time_zone: zone.name().to_string(),
            t_zero: self.t_zero.map(|time| format_local(time, zone)),
            t_zero_mode: self.t_zero_mode,
            items: self
                .items
                .iter()
                .map(|item| ItemRecord {
                    time: format_local(item.time, zone),
                    text: item.label.clone(),
                    is_approximate: item.is_approximate,
                    is_important: item.is_important,
                })
                .collect(),
        };
        Ok(serde_json::to_string_pretty(&file)?)
    }

    /// Parses a document. The result has no file path and no unsaved
    /// changes.
    pub fn from_json(json: &str) -> DocumentResult<Self> {
        let file: DocumentFile = serde_json::from_str(json)?;
        if file.version != DOCUMENT_VERSION {
            return Err(DocumentError::UnsupportedVersion(file.version));
        }

        let time_zone: Tz = file
            .time_zone
            .parse()
            .map_err(|_| DocumentError::UnknownTimeZone(file.time_zone.clone()))?;

        let t_zero = file
            .t_zero
            .as_deref()
            .map(|text| parse_local(text, time_zone))
            .transpose()?;

        let mut items = file
            .items
            .into_iter()
            .map(|record| {
                Ok(TimelineItem::new(parse_local(&record.time, time_zone)?, record.text)
                    .approximate(record.is_approximate)
                    .important(record.is_important))
            })
            .collect::<DocumentResult<Vec<_>>>()?;
        items.sort_by_key(|item| item.time);

        Ok(Self {
            title: file.title,
            description: file.description,
            time_zone,
            t_zero,
            t_zero_mode: file.t_zero_mode,
            items,
            file_path: None,
            has_unsaved_changes: false,
        })
    }

    pub fn load_from_path(path: &Path) -> DocumentResult<Self> {
        let json = fs::read_to_string(path)?;
        let mut document = Self::from_json(&json)?;
        document.file_path = Some(path.to_path_buf());
        log::info!("Loaded {} items from {}", document.items.len(), path.display());
        Ok(document)
    }

    /// Saves to the path the document was loaded from or last saved to.
    pub fn save(&mut self) -> DocumentResult<()> {
        let path = self.file_path.clone().ok_or(DocumentError::NeverSaved)?;
        let json = self.to_json()?;
        fs::write(&path, json)?;
        self.has_unsaved_changes = false;
        log::info!("Saved {} items to {}", self.items.len(), path.display());
        Ok(())
    }

    pub fn save_as(&mut self, path: &Path) -> DocumentResult<()> {
        self.file_path = Some(path.to_path_buf());
        self.save()
    }
}

fn format_local(time: DateTime<Utc>, zone: Tz) -> String {
    time.with_timezone(&zone).format(TIME_FORMAT).to_string()
}

/// Ambiguous wall-clock times (DST fall-back) resolve to the earlier instant.
fn parse_local(text: &str, zone: Tz) -> DocumentResult<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(text, TIME_FORMAT)
        .ok()
        .and_then(|naive| zone.from_local_datetime(&naive).earliest())
        .map(|time| time.with_timezone(&Utc))
        .ok_or_else(|| DocumentError::InvalidTime(text.to_string()))
}
