//! # egui_timeline
//!
//! 一个竖直时间线编辑器组件库：按时间排列的事件显示在一条竖直时间轴上，
//! 支持拖动平移、滚轮缩放和条目选择。
//!
//! ## 功能特性
//!
//! - **时间轴映射**：时间与像素位置的双向转换，自适应刻度间隔
//! - **视口控制**：以光标为锚点的缩放、拖动平移、适配条目范围，时长限制在 1 分钟到 3 天之间
//! - **条目布局**：标记圆点精确落在时间轴上，支持近似时间和 T-zero 相对时间
//! - **文档**：JSON 格式的保存和加载，按文档时区显示时间
//!
//! 引擎部分（`axis`、`viewport`、`layout`、`selection`、`render`）不依赖任何
//! 绘制上下文，可以在没有窗口的情况下测试；`ui` 模块负责把它们接到 egui 上。
//!
//! ## 基本使用
//!
//! ```no_run
//! use egui_timeline::{TimelineEditor, TimelineEditorOptions};
//!
//! let mut editor = TimelineEditor::new(TimelineEditorOptions::default());
//!
//! # let ctx = egui::Context::default();
//! # egui::CentralPanel::default().show(&ctx, |ui| {
//! // 在 egui UI 中使用
//! editor.ui(ui);
//! # });
//! ```
//!
//! ## 集成到宿主应用
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use egui_timeline::{TimelineEditor, TimelineEditorCommand, TimelineEditorEvent, TimelineEditorOptions, TimelineItem};
//!
//! let mut editor = TimelineEditor::new(TimelineEditorOptions::default());
//!
//! // 设置事件监听器
//! editor.set_event_listener(Box::new(|event| {
//!     if let TimelineEditorEvent::ItemDoubleClicked { item_id } = event {
//!         println!("edit {:?}", item_id);
//!     }
//! }));
//!
//! // 处理命令
//! let time = Utc.with_ymd_and_hms(2024, 3, 14, 9, 30, 0).unwrap();
//! editor.execute_command(TimelineEditorCommand::AddItem {
//!     item: TimelineItem::new(time, "Doors open"),
//! });
//! editor.execute_command(TimelineEditorCommand::ResetZoom);
//!
//! assert_eq!(editor.view_range().center(), time);
//! ```

pub mod axis;
pub mod document;
pub mod editor;
pub mod error;
pub mod layout;
pub mod render;
pub mod selection;
pub mod structure;
pub mod ui;
pub mod utils;
pub mod viewport;

pub use axis::{TimeAxis, Tick};
pub use document::TimelineDocument;
pub use editor::{TimelineEditorCommand, TimelineEditorEvent};
pub use error::{DocumentError, DocumentResult};
pub use layout::{CharWidthMeasure, ItemLabel, ItemLayoutEngine, ItemMetrics, LabelFormat, LaidOutItem, MarkerMeasure};
pub use render::{DrawCommand, RenderOrchestrator, Scene};
pub use selection::{SelectionChange, SelectionModel};
pub use structure::{ItemId, TimelineItem, ViewRange, ZoomLimits};
pub use ui::{FontMeasure, TimelineEditor, TimelineEditorOptions};
pub use viewport::{DragGesture, PointerRelease, ViewportController};
