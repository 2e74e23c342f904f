use chrono::{TimeDelta, Utc};
use eframe::egui::{self, SidePanel, TopBottomPanel};
use egui_timeline::{
    ItemId, TimelineDocument, TimelineEditor, TimelineEditorCommand, TimelineEditorEvent,
    TimelineEditorOptions, TimelineItem,
};
use rfd::FileDialog;

fn main() -> eframe::Result<()> {
    env_logger::init();

    let native_options = eframe::NativeOptions::default();
    eframe::run_native(
        "egui_timeline Example",
        native_options,
        Box::new(|_cc| Ok(Box::new(TimelineApp::new()))),
    )
}

struct TimelineApp {
    editor: TimelineEditor,
    status_line: String,
    window_title: String,
}

impl TimelineApp {
    fn new() -> Self {
        let mut document = TimelineDocument::new();
        let now = Utc::now();
        document.set_title("Launch day");
        document.add_item(TimelineItem::new(now - TimeDelta::hours(2), "Crew arrives").approximate(true));
        document.add_item(TimelineItem::new(now - TimeDelta::minutes(45), "Fuelling complete"));
        document.add_item(TimelineItem::new(now, "Liftoff").important(true));
        document.add_item(TimelineItem::new(now + TimeDelta::minutes(9), "Orbit insertion"));
        document.set_t_zero(Some(now));

        let editor = TimelineEditor::with_document(document, TimelineEditorOptions::default());
        Self {
            editor,
            status_line: "Ready".to_owned(),
            window_title: String::new(),
        }
    }

    fn menu_bar(&mut self, ui: &mut egui::Ui) {
        egui::menu::bar(ui, |ui| {
            ui.menu_button("File", |ui| {
                if ui.button("New").clicked() {
                    self.editor.set_document(TimelineDocument::new());
                    self.set_status("Created new document");
                    ui.close_menu();
                }
                if ui.button("Open...").clicked() {
                    self.open_dialog();
                    ui.close_menu();
                }
                if ui.button("Save").clicked() {
                    self.save();
                    ui.close_menu();
                }
                if ui.button("Save As...").clicked() {
                    self.save_as_dialog();
                    ui.close_menu();
                }
            });

            ui.menu_button("View", |ui| {
                if ui.button("Reset Zoom").clicked() {
                    self.editor.execute_command(TimelineEditorCommand::ResetZoom);
                    ui.close_menu();
                }
            });

            ui.menu_button("Item", |ui| {
                if ui.button("Add at view center").clicked() {
                    let time = self.editor.view_range().center();
                    self.editor.execute_command(TimelineEditorCommand::AddItem {
                        item: TimelineItem::new(time, "New item"),
                    });
                    ui.close_menu();
                }
                if let Some(item_id) = self.editor.selected_item() {
                    if ui.button("Delete selected").clicked() {
                        self.editor.execute_command(TimelineEditorCommand::RemoveItem { item_id });
                        ui.close_menu();
                    }
                }
            });

            match self.editor.document().file_path() {
                Some(path) => ui.label(format!(" File: {}", path.display())),
                None => ui.label(" File: (unsaved)"),
            };
        });
    }

    fn document_panel(&mut self, ui: &mut egui::Ui) {
        ui.heading("Document");

        let mut title = self.editor.document().title().to_owned();
        let mut description = self.editor.document().description().to_owned();
        let title_changed = ui.text_edit_singleline(&mut title).changed();
        let description_changed = ui.text_edit_multiline(&mut description).changed();
        if title_changed || description_changed {
            self.editor
                .execute_command(TimelineEditorCommand::SetDocumentInfo { title, description });
        }

        let current_zone = self.editor.document().time_zone();
        egui::ComboBox::from_label("Time zone")
            .selected_text(current_zone.name())
            .show_ui(ui, |ui| {
                for zone in chrono_tz::TZ_VARIANTS {
                    if ui.selectable_label(zone == current_zone, zone.name()).clicked() {
                        self.editor
                            .execute_command(TimelineEditorCommand::SetTimeZone { time_zone: zone });
                    }
                }
            });

        let mut t_zero_mode = self.editor.document().t_zero_mode();
        if ui.checkbox(&mut t_zero_mode, "Show times relative to T-zero").changed() {
            self.editor
                .execute_command(TimelineEditorCommand::SetTZeroMode { enabled: t_zero_mode });
        }

        ui.separator();
        match self.editor.selected_item() {
            Some(item_id) => self.item_panel(ui, item_id),
            None => {
                ui.label("Click an item to edit it.");
            }
        }
    }

    fn item_panel(&mut self, ui: &mut egui::Ui, item_id: ItemId) {
        let Some(item) = self.editor.document().item(item_id).cloned() else {
            return;
        };
        let zone = self.editor.document().time_zone();

        ui.heading("Item");
        ui.label(item.time.with_timezone(&zone).format("%Y-%m-%d %H:%M:%S %Z").to_string());

        ui.horizontal(|ui| {
            for (text, delta) in [
                ("-1h", TimeDelta::hours(-1)),
                ("-1m", TimeDelta::minutes(-1)),
                ("+1m", TimeDelta::minutes(1)),
                ("+1h", TimeDelta::hours(1)),
            ] {
                if ui.button(text).clicked() {
                    self.editor.execute_command(TimelineEditorCommand::SetItemTime {
                        item_id,
                        time: item.time + delta,
                    });
                }
            }
        });

        let mut label = item.label.clone();
        if ui.text_edit_singleline(&mut label).changed() {
            self.editor
                .execute_command(TimelineEditorCommand::SetItemLabel { item_id, label });
        }

        let mut is_approximate = item.is_approximate;
        let mut is_important = item.is_important;
        let approximate_changed = ui.checkbox(&mut is_approximate, "Approximate").changed();
        let important_changed = ui.checkbox(&mut is_important, "Important").changed();
        if approximate_changed || important_changed {
            self.editor.execute_command(TimelineEditorCommand::SetItemFlags {
                item_id,
                is_approximate,
                is_important,
            });
        }

        if ui.button("Use as T-zero").clicked() {
            self.editor
                .execute_command(TimelineEditorCommand::SetTZero { time: Some(item.time) });
        }
    }

    fn open_dialog(&mut self) {
        if let Some(path) = FileDialog::new()
            .add_filter("Timeline", &["json"])
            .pick_file()
        {
            match TimelineDocument::load_from_path(&path) {
                Ok(document) => {
                    self.editor.set_document(document);
                    self.set_status(format!("Opened {}", path.display()));
                }
                Err(err) => self.set_error(format!("Failed to open {}: {err}", path.display())),
            }
        }
    }

    fn save(&mut self) {
        if self.editor.document().file_path().is_none() {
            self.save_as_dialog();
            return;
        }
        match self.editor.save() {
            Ok(()) => self.set_status("Saved"),
            Err(err) => self.set_error(format!("Failed to save: {err}")),
        }
    }

    fn save_as_dialog(&mut self) {
        if let Some(path) = FileDialog::new()
            .add_filter("Timeline", &["json"])
            .set_file_name(self.default_file_name())
            .save_file()
        {
            match self.editor.save_as(&path) {
                Ok(()) => self.set_status(format!("Saved {}", path.display())),
                Err(err) => self.set_error(format!("Failed to save {}: {err}", path.display())),
            }
        }
    }

    fn default_file_name(&self) -> String {
        self.editor
            .document()
            .file_path()
            .and_then(|p| p.file_name().map(|s| s.to_string_lossy().into_owned()))
            .unwrap_or_else(|| "timeline.json".to_owned())
    }

    fn set_status<S: Into<String>>(&mut self, msg: S) {
        self.status_line = msg.into();
        log::info!("{}", self.status_line);
    }

    fn set_error(&mut self, msg: String) {
        self.status_line = format!("Error: {msg}");
        log::error!("{msg}");
    }
}

impl eframe::App for TimelineApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let title = self.editor.document().display_title();
        if title != self.window_title {
            ctx.send_viewport_cmd(egui::ViewportCommand::Title(title.clone()));
            self.window_title = title;
        }

        TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            self.menu_bar(ui);
        });

        TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.label(self.status_line.clone());
        });

        SidePanel::right("document_panel").min_width(240.0).show(ctx, |ui| {
            self.document_panel(ui);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.editor.ui(ui);
        });

        for event in self.editor.take_events() {
            if let TimelineEditorEvent::ItemDoubleClicked { item_id } = &event {
                if let Some(item) = self.editor.document().item(*item_id) {
                    self.status_line = format!("{} ({})", item.label, item.time);
                }
            }
            log::info!("[TimelineEditorEvent] {:?}", event);
        }
    }
}
