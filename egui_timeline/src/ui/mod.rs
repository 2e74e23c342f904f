//! UI 模块
//!
//! 包含时间线编辑器的主要组件：持有文档、视口和选择状态，把指针输入转换为
//! 引擎操作，并把渲染结果交给 egui 绘制。

mod item;
mod renderer;

pub use item::FontMeasure;

use crate::axis::TimeAxis;
use crate::document::TimelineDocument;
use crate::editor::{TimelineEditorCommand, TimelineEditorEvent};
use crate::error::DocumentResult;
use crate::layout::{hit_test, MarkerMeasure, UnitStyle};
use crate::render::{RenderInput, RenderOrchestrator, Scene};
use crate::selection::{SelectionChange, SelectionModel};
use crate::structure::{ItemId, TimelineItem, ViewRange, ZoomLimits};
use crate::utils::start_of_day;
use crate::viewport::{PointerRelease, ViewportController};
use chrono::Utc;
use egui::*;
use std::path::Path;

#[derive(Clone)]
pub struct TimelineEditorOptions {
    /// X of the axis line inside the timeline area.
    pub axis_x: f32,
    pub edge_thickness: f32,
    pub edge_padding: f32,
    pub cap_half_width: f32,
    /// The timeline area never grows wider than this.
    pub max_timeline_width: f32,
    /// Zoom per wheel notch.
    pub zoom_step_percent: f64,
    pub zoom_limits: ZoomLimits,
    pub marker_radius: f32,
    pub marker_gap: f32,
    pub text_gap: f32,
    pub tick_font_size: f32,
    pub item_font_size: f32,
    pub important_font_size: f32,
}

impl Default for TimelineEditorOptions {
    fn default() -> Self {
        Self {
            axis_x: 150.0,
            edge_thickness: 2.0,
            edge_padding: 15.0,
            cap_half_width: 15.0,
            max_timeline_width: 800.0,
            zoom_step_percent: 15.0,
            zoom_limits: ZoomLimits::default(),
            marker_radius: 6.0,
            marker_gap: 10.0,
            text_gap: 8.0,
            tick_font_size: 12.0,
            item_font_size: 14.0,
            important_font_size: 16.0,
        }
    }
}

impl TimelineEditorOptions {
    pub fn axis(&self) -> TimeAxis {
        TimeAxis::new(self.edge_thickness as f64, self.edge_padding as f64)
    }

    pub fn orchestrator(&self) -> RenderOrchestrator {
        RenderOrchestrator {
            axis: self.axis(),
            axis_x: self.axis_x,
            cap_half_width: self.cap_half_width,
            ..RenderOrchestrator::default()
        }
    }

    pub fn unit_style(&self) -> UnitStyle {
        UnitStyle {
            marker_radius: self.marker_radius,
            marker_gap: self.marker_gap,
            text_gap: self.text_gap,
        }
    }
}

pub struct TimelineEditor {
    document: TimelineDocument,
    viewport: ViewportController,
    selection: SelectionModel,
    options: TimelineEditorOptions,

    // Render state
    scene: Scene,
    size: Vec2,
    needs_render: bool,
    hovered_item: Option<ItemId>,

    // Events
    pending_events: Vec<TimelineEditorEvent>,
    event_listener: Option<Box<dyn FnMut(&TimelineEditorEvent)>>,
}

impl TimelineEditor {
    pub fn new(options: TimelineEditorOptions) -> Self {
        Self::with_document(TimelineDocument::new(), options)
    }

    /// Opens `document` with the view fitted to its items.
    pub fn with_document(document: TimelineDocument, options: TimelineEditorOptions) -> Self {
        let mut viewport = ViewportController::with_limits(ViewRange::new(Utc::now(), Utc::now()), options.zoom_limits);
        viewport.fit_to_items_on(document.items(), today_in(&document));

        Self {
            document,
            viewport,
            selection: SelectionModel::new(),
            options,
            scene: Scene::default(),
            size: Vec2::ZERO,
            needs_render: true,
            hovered_item: None,
            pending_events: Vec::new(),
            event_listener: None,
        }
    }

    pub fn set_event_listener(&mut self, listener: Box<dyn FnMut(&TimelineEditorEvent)>) {
        self.event_listener = Some(listener);
    }

    pub fn take_events(&mut self) -> Vec<TimelineEditorEvent> {
        std::mem::take(&mut self.pending_events)
    }

    pub fn execute_command(&mut self, command: TimelineEditorCommand) {
        match command {
            TimelineEditorCommand::AddItem { item } => {
                let item_id = self.document.add_item(item);
                self.needs_render = true;
                self.emit_event(TimelineEditorEvent::ItemAdded { item_id });
            }
            TimelineEditorCommand::RemoveItem { item_id } => {
                self.remove_item(item_id);
            }
            TimelineEditorCommand::SetItemTime { item_id, time } => {
                let changed = self.document.set_item_time(item_id, time);
                self.item_changed(item_id, changed);
            }
            TimelineEditorCommand::SetItemLabel { item_id, label } => {
                let changed = self.document.set_item_label(item_id, label);
                self.item_changed(item_id, changed);
            }
            TimelineEditorCommand::SetItemFlags { item_id, is_approximate, is_important } => {
                let changed = self.document.set_item_flags(item_id, is_approximate, is_important);
                self.item_changed(item_id, changed);
            }
            TimelineEditorCommand::ReplaceItems { items } => {
                self.replace_items(items);
            }
            TimelineEditorCommand::GoToViewRange { start, end } => {
                let before = self.viewport.view_range();
                self.viewport.fit_to_range(start, end);
                self.view_range_changed(before);
            }
            TimelineEditorCommand::ResetZoom => {
                self.reset_zoom();
            }
            TimelineEditorCommand::Zoom { percent, anchor_y } => {
                self.zoom(percent, anchor_y);
            }
            TimelineEditorCommand::Select { item_id } => {
                // 忽略不存在的条目
                if item_id.map_or(true, |id| self.document.contains(id)) {
                    self.select(item_id);
                }
            }
            TimelineEditorCommand::SetDocumentInfo { title, description } => {
                self.document.set_title(title);
                self.document.set_description(description);
                self.emit_event(TimelineEditorEvent::DocumentChanged);
            }
            TimelineEditorCommand::SetTimeZone { time_zone } => {
                self.document.set_time_zone(time_zone);
                self.needs_render = true;
                self.emit_event(TimelineEditorEvent::DocumentChanged);
            }
            TimelineEditorCommand::SetTZero { time } => {
                self.document.set_t_zero(time);
                self.needs_render = true;
                self.emit_event(TimelineEditorEvent::DocumentChanged);
            }
            TimelineEditorCommand::SetTZeroMode { enabled } => {
                self.document.set_t_zero_mode(enabled);
                self.needs_render = true;
                self.emit_event(TimelineEditorEvent::DocumentChanged);
            }
        }
    }

    /// Replaces the open document. The selection is cleared and the view is
    /// fitted to the new items.
    pub fn set_document(&mut self, document: TimelineDocument) {
        if let Some(change) = self.selection.deselect() {
            self.emit_selection_change(change);
        }
        self.viewport.forget_pressed_item();
        self.document = document;
        self.needs_render = true;
        self.reset_zoom();
    }

    pub fn save(&mut self) -> DocumentResult<()> {
        self.document.save()
    }

    pub fn save_as(&mut self, path: &Path) -> DocumentResult<()> {
        self.document.save_as(path)
    }

    // Input, in coordinates relative to the top-left of the timeline area.

    pub fn pointer_pressed(&mut self, button: PointerButton, pos: Pos2) {
        // 场景可能还没有在删除后重新渲染
        let item = hit_test(self.scene.items(), pos).filter(|id| self.document.contains(*id));
        self.viewport.press(button, pos.y as f64, item);
    }

    pub fn pointer_moved(&mut self, pos: Pos2) {
        let before = self.viewport.view_range();
        if self.viewport.drag_to(pos.y as f64, self.seconds_per_pixel()) {
            self.view_range_changed(before);
        }
    }

    pub fn pointer_released(&mut self, button: PointerButton) {
        match self.viewport.release(button) {
            PointerRelease::Click { item } => {
                self.select(item.filter(|id| self.document.contains(*id)));
            }
            PointerRelease::ResetZoom => {
                self.reset_zoom();
            }
            PointerRelease::Drag | PointerRelease::Ignored => {}
        }
    }

    /// One wheel notch per call. Positive `delta` zooms in.
    pub fn wheel(&mut self, delta: f32, anchor_y: f32) {
        if delta == 0.0 {
            return;
        }
        let percent = self.options.zoom_step_percent.copysign(delta as f64);
        self.zoom(percent, anchor_y as f64);
    }

    pub fn double_clicked(&mut self, pos: Pos2) {
        if let Some(item_id) = hit_test(self.scene.items(), pos) {
            self.emit_event(TimelineEditorEvent::ItemDoubleClicked { item_id });
        }
    }

    pub fn escape(&mut self) {
        self.viewport.cancel_gesture();
        if let Some(change) = self.selection.deselect() {
            self.emit_selection_change(change);
        }
    }

    pub fn set_viewport_size(&mut self, size: Vec2) {
        if size != self.size {
            self.size = size;
            self.needs_render = true;
        }
    }

    /// Rebuilds the scene if anything changed since the last pass.
    pub fn render_with(&mut self, measure: &dyn MarkerMeasure) -> &Scene {
        if self.needs_render {
            let input = RenderInput {
                items: self.document.items(),
                range: self.viewport.view_range(),
                size: self.size,
                selected: self.selection.selected(),
                format: self.document.label_format(),
            };
            self.scene = self.options.orchestrator().render(&input, measure);
            self.needs_render = false;
        }
        &self.scene
    }

    pub fn ui(&mut self, ui: &mut Ui) {
        let width = ui.available_width().min(self.options.max_timeline_width);
        let (rect, response) = ui.allocate_exact_size(
            Vec2::new(width, ui.available_height()),
            Sense::click_and_drag(),
        );
        self.set_viewport_size(rect.size());

        self.handle_interactions(ui, rect, &response);

        let measure = FontMeasure::new(ui.ctx(), &self.options);
        self.render_with(&measure);

        self.hovered_item = response
            .hover_pos()
            .and_then(|pos| hit_test(self.scene.items(), pos - rect.min.to_vec2()));

        if self.viewport.is_dragging() {
            ui.ctx().set_cursor_icon(CursorIcon::Grabbing);
        } else if self.hovered_item.is_some() {
            ui.ctx().set_cursor_icon(CursorIcon::PointingHand);
        }

        let painter = ui.painter_at(rect);
        renderer::paint_scene(&painter, rect.min, &self.scene, self.hovered_item, &self.options);
    }

    fn handle_interactions(&mut self, ui: &mut Ui, rect: Rect, response: &Response) {
        let (events, hover_pos) = ui.input(|i| (i.events.clone(), i.pointer.hover_pos()));
        // 菜单或弹窗盖住时间线时 contains_pointer 为 false
        self.handle_events(&events, rect, hover_pos, response.contains_pointer());

        if response.double_clicked() {
            if let Some(pos) = response.interact_pointer_pos() {
                self.double_clicked(pos - rect.min.to_vec2());
            }
        }

        if ui.input(|i| i.key_pressed(Key::Escape)) {
            self.escape();
        }
    }

    /// Feeds raw egui events for the timeline area at `rect`. `pointer_over`
    /// is false while another layer covers the area; presses, wheel and
    /// non-primary releases are then left to that layer.
    pub fn handle_events(&mut self, events: &[Event], rect: Rect, hover_pos: Option<Pos2>, pointer_over: bool) {
        let origin = rect.min.to_vec2();
        for event in events {
            match *event {
                Event::PointerButton { pos, button, pressed: true, .. } if pointer_over && rect.contains(pos) => {
                    self.pointer_pressed(button, pos - origin);
                }
                Event::PointerButton { pos, button, pressed: false, .. } => {
                    // 主键释放总是结束拖动；其他按键只在区域内有效
                    if button == PointerButton::Primary || (pointer_over && rect.contains(pos)) {
                        self.pointer_released(button);
                    }
                }
                Event::PointerMoved(pos) => {
                    self.pointer_moved(pos - origin);
                }
                Event::MouseWheel { delta, .. } if pointer_over => {
                    // 每个滚轮事件算一格
                    if let Some(pos) = hover_pos.filter(|pos| rect.contains(*pos)) {
                        self.wheel(delta.y, pos.y - rect.min.y);
                    }
                }
                _ => {}
            }
        }
    }

    fn remove_item(&mut self, item_id: ItemId) {
        if !self.document.contains(item_id) {
            return;
        }
        // 先取消选择，监听者不会看到指向已删除条目的选择
        if let Some(change) = self.selection.on_item_removed(item_id) {
            self.emit_selection_change(change);
        }
        if self.viewport.gesture().pressed_item() == Some(item_id) {
            self.viewport.forget_pressed_item();
        }
        self.document.remove_item(item_id);
        self.needs_render = true;
        self.emit_event(TimelineEditorEvent::ItemRemoved { item_id });
    }

    fn replace_items(&mut self, items: Vec<TimelineItem>) {
        if let Some(change) = self.selection.retain(items.iter().map(|item| item.id)) {
            self.emit_selection_change(change);
        }
        let added: Vec<ItemId> = items.iter().map(|item| item.id).collect();
        self.viewport.forget_pressed_item();
        let removed = self.document.replace_items(items);
        self.needs_render = true;

        for item in removed {
            self.emit_event(TimelineEditorEvent::ItemRemoved { item_id: item.id });
        }
        for item_id in added {
            self.emit_event(TimelineEditorEvent::ItemAdded { item_id });
        }
        self.reset_zoom();
    }

    fn item_changed(&mut self, item_id: ItemId, changed: bool) {
        if changed {
            self.needs_render = true;
            self.emit_event(TimelineEditorEvent::ItemChanged { item_id });
        }
    }

    fn select(&mut self, item_id: Option<ItemId>) {
        if let Some(change) = self.selection.select(item_id) {
            self.emit_selection_change(change);
            if let Some(item_id) = item_id {
                self.emit_event(TimelineEditorEvent::ItemSelected { item_id });
            }
        }
    }

    fn reset_zoom(&mut self) {
        let before = self.viewport.view_range();
        self.viewport.fit_to_items_on(self.document.items(), today_in(&self.document));
        self.view_range_changed(before);
    }

    fn zoom(&mut self, percent: f64, anchor_y: f64) {
        let before = self.viewport.view_range();
        let axis = self.options.axis();
        if self.viewport.zoom(percent, anchor_y, self.size.y as f64, self.seconds_per_pixel(), &axis) {
            self.view_range_changed(before);
        }
    }

    fn view_range_changed(&mut self, before: ViewRange) {
        let range = self.viewport.view_range();
        if range != before {
            self.needs_render = true;
            self.emit_event(TimelineEditorEvent::ViewRangeChanged { range });
        }
    }

    fn emit_selection_change(&mut self, change: SelectionChange) {
        self.needs_render = true;
        self.emit_event(TimelineEditorEvent::SelectionChanged {
            removed: change.removed,
            added: change.added,
        });
    }

    fn emit_event(&mut self, event: TimelineEditorEvent) {
        if let Some(ref mut listener) = self.event_listener {
            listener(&event);
        }
        self.pending_events.push(event);
    }

    // Public getters
    pub fn document(&self) -> &TimelineDocument {
        &self.document
    }

    pub fn items(&self) -> &[TimelineItem] {
        self.document.items()
    }

    pub fn view_range(&self) -> ViewRange {
        self.viewport.view_range()
    }

    pub fn selected_item(&self) -> Option<ItemId> {
        self.selection.selected()
    }

    /// Scene from the last render pass.
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Current scale, recomputed from the view range and the area height.
    pub fn seconds_per_pixel(&self) -> f64 {
        self.options
            .axis()
            .seconds_per_pixel(&self.viewport.view_range(), self.size.y as f64)
    }

    pub fn options(&self) -> &TimelineEditorOptions {
        &self.options
    }
}

/// Start of the current day in the document time zone.
fn today_in(document: &TimelineDocument) -> chrono::DateTime<Utc> {
    start_of_day(&Utc::now().with_timezone(&document.time_zone()))
}
