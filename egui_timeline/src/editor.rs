//! 编辑命令和事件模块
//!
//! 定义了时间线编辑器的命令系统和事件系统，用于与宿主应用交互。

use crate::structure::{ItemId, TimelineItem, ViewRange};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;

#[derive(Clone, Debug)]
pub enum TimelineEditorCommand {
    AddItem {
        item: TimelineItem,
    },
    RemoveItem {
        item_id: ItemId,
    },
    SetItemTime {
        item_id: ItemId,
        time: DateTime<Utc>,
    },
    SetItemLabel {
        item_id: ItemId,
        label: String,
    },
    SetItemFlags {
        item_id: ItemId,
        is_approximate: bool,
        is_important: bool,
    },
    /// Swaps in a whole new item collection and fits the view to it.
    ReplaceItems {
        items: Vec<TimelineItem>,
    },
    GoToViewRange {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
    ResetZoom,
    Zoom {
        percent: f64,
        anchor_y: f64,
    },
    Select {
        item_id: Option<ItemId>,
    },
    SetDocumentInfo {
        title: String,
        description: String,
    },
    SetTimeZone {
        time_zone: Tz,
    },
    SetTZero {
        time: Option<DateTime<Utc>>,
    },
    SetTZeroMode {
        enabled: bool,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub enum TimelineEditorEvent {
    /// At most one id in each list.
    SelectionChanged {
        removed: Vec<ItemId>,
        added: Vec<ItemId>,
    },
    ItemSelected {
        item_id: ItemId,
    },
    ItemDoubleClicked {
        item_id: ItemId,
    },
    ViewRangeChanged {
        range: ViewRange,
    },
    ItemAdded {
        item_id: ItemId,
    },
    ItemRemoved {
        item_id: ItemId,
    },
    ItemChanged {
        item_id: ItemId,
    },
    DocumentChanged,
}
