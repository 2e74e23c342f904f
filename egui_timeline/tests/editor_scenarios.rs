use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;
use egui::{Event, Modifiers, PointerButton, Pos2, Rect, Vec2};
use egui_timeline::utils::start_of_day;
use egui_timeline::{
    CharWidthMeasure, TimelineDocument, TimelineEditor, TimelineEditorCommand, TimelineEditorEvent,
    TimelineEditorOptions, TimelineItem, ViewRange,
};

fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 14, h, m, s).unwrap()
}

fn editor_with(items: Vec<TimelineItem>) -> TimelineEditor {
    let mut document = TimelineDocument::with_time_zone(Tz::UTC);
    for item in items {
        document.add_item(item);
    }
    TimelineEditor::with_document(document, TimelineEditorOptions::default())
}

/// A 434 px high editor showing 09:00 to 10:00, so one pixel is 9 seconds.
fn nine_seconds_per_pixel(items: Vec<TimelineItem>) -> TimelineEditor {
    let mut editor = editor_with(items);
    editor.set_viewport_size(Vec2::new(800.0, 434.0));
    editor.execute_command(TimelineEditorCommand::GoToViewRange {
        start: at(9, 0, 0),
        end: at(10, 0, 0),
    });
    editor.render_with(&CharWidthMeasure::default());
    editor.take_events();
    editor
}

#[test]
fn test_empty_document_shows_today() {
    let editor = editor_with(Vec::new());
    let today = start_of_day(&Utc::now());
    assert_eq!(editor.view_range(), ViewRange::new(today, today + TimeDelta::days(1)));
}

#[test]
fn test_single_item_shows_an_hour_around_it() {
    let editor = editor_with(vec![TimelineItem::new(at(12, 0, 0), "noon")]);
    assert_eq!(editor.view_range(), ViewRange::new(at(11, 30, 0), at(12, 30, 0)));
}

#[test]
fn test_items_span_is_used_exactly() {
    let editor = editor_with(vec![
        TimelineItem::new(at(15, 0, 0), "close"),
        TimelineItem::new(at(9, 0, 0), "open"),
    ]);
    assert_eq!(editor.view_range(), ViewRange::new(at(9, 0, 0), at(15, 0, 0)));
}

#[test]
fn test_drag_shifts_relative_to_gesture_start() {
    let mut editor = nine_seconds_per_pixel(Vec::new());
    assert!((editor.seconds_per_pixel() - 9.0).abs() < 1e-12);

    editor.pointer_pressed(PointerButton::Primary, Pos2::new(600.0, 100.0));
    editor.pointer_moved(Pos2::new(600.0, 110.0));
    editor.pointer_moved(Pos2::new(600.0, 140.0));
    editor.pointer_moved(Pos2::new(600.0, 120.0));
    editor.pointer_released(PointerButton::Primary);

    // 20 px at 9 s/px
    let shift = TimeDelta::seconds(180);
    assert_eq!(
        editor.view_range(),
        ViewRange::new(at(9, 0, 0) - shift, at(10, 0, 0) - shift)
    );
    assert!(matches!(
        editor.take_events().last(),
        Some(TimelineEditorEvent::ViewRangeChanged { .. })
    ));
    assert_eq!(editor.selected_item(), None);
}

#[test]
fn test_click_selects_and_background_click_deselects() {
    let item = TimelineItem::new(at(9, 30, 0), "launch");
    let id = item.id;
    let mut editor = nine_seconds_per_pixel(vec![item]);

    let marker = editor.scene().items().next().unwrap().marker_center;
    assert!((marker.y - 217.0).abs() < 1e-3);

    editor.pointer_pressed(PointerButton::Primary, marker);
    editor.pointer_released(PointerButton::Primary);
    assert_eq!(editor.selected_item(), Some(id));
    assert_eq!(
        editor.take_events(),
        vec![
            TimelineEditorEvent::SelectionChanged {
                removed: vec![],
                added: vec![id],
            },
            TimelineEditorEvent::ItemSelected { item_id: id },
        ]
    );

    editor.pointer_pressed(PointerButton::Primary, Pos2::new(600.0, 400.0));
    editor.pointer_released(PointerButton::Primary);
    assert_eq!(editor.selected_item(), None);
    assert_eq!(
        editor.take_events(),
        vec![TimelineEditorEvent::SelectionChanged {
            removed: vec![id],
            added: vec![],
        }]
    );
}

#[test]
fn test_drag_starting_on_item_does_not_select() {
    let item = TimelineItem::new(at(9, 30, 0), "launch");
    let mut editor = nine_seconds_per_pixel(vec![item]);
    let marker = editor.scene().items().next().unwrap().marker_center;

    editor.pointer_pressed(PointerButton::Primary, marker);
    editor.pointer_moved(marker + Vec2::new(0.0, 30.0));
    editor.pointer_released(PointerButton::Primary);

    assert_eq!(editor.selected_item(), None);
}

#[test]
fn test_removing_selected_item_deselects_first() {
    let item = TimelineItem::new(at(9, 30, 0), "launch");
    let id = item.id;
    let mut editor = nine_seconds_per_pixel(vec![item]);

    editor.execute_command(TimelineEditorCommand::Select { item_id: Some(id) });
    editor.take_events();
    editor.execute_command(TimelineEditorCommand::RemoveItem { item_id: id });

    assert_eq!(editor.selected_item(), None);
    assert!(editor.items().is_empty());
    assert_eq!(
        editor.take_events(),
        vec![
            TimelineEditorEvent::SelectionChanged {
                removed: vec![id],
                added: vec![],
            },
            TimelineEditorEvent::ItemRemoved { item_id: id },
        ]
    );
}

#[test]
fn test_item_removed_mid_click_is_not_selected() {
    let item = TimelineItem::new(at(9, 30, 0), "launch");
    let id = item.id;
    let mut editor = nine_seconds_per_pixel(vec![item]);
    let marker = editor.scene().items().next().unwrap().marker_center;

    editor.pointer_pressed(PointerButton::Primary, marker);
    editor.execute_command(TimelineEditorCommand::RemoveItem { item_id: id });
    editor.pointer_released(PointerButton::Primary);

    assert_eq!(editor.selected_item(), None);
    assert_eq!(editor.take_events(), vec![TimelineEditorEvent::ItemRemoved { item_id: id }]);
}

#[test]
fn test_press_on_stale_scene_does_not_select_removed_item() {
    let item = TimelineItem::new(at(9, 30, 0), "launch");
    let id = item.id;
    let mut editor = nine_seconds_per_pixel(vec![item]);
    let marker = editor.scene().items().next().unwrap().marker_center;

    editor.execute_command(TimelineEditorCommand::ReplaceItems {
        items: vec![TimelineItem::new(at(12, 0, 0), "other")],
    });
    editor.take_events();
    assert!(editor.scene().items().any(|laid_out| laid_out.id == id));

    editor.pointer_pressed(PointerButton::Primary, marker);
    editor.pointer_released(PointerButton::Primary);

    assert_eq!(editor.selected_item(), None);
    assert!(editor.take_events().is_empty());
}

#[test]
fn test_select_unknown_item_is_ignored() {
    let mut editor = nine_seconds_per_pixel(Vec::new());
    let stranger = TimelineItem::new(at(9, 30, 0), "elsewhere");
    editor.execute_command(TimelineEditorCommand::Select { item_id: Some(stranger.id) });

    assert_eq!(editor.selected_item(), None);
    assert!(editor.take_events().is_empty());
}

#[test]
fn test_middle_release_resets_zoom() {
    let mut editor = nine_seconds_per_pixel(vec![
        TimelineItem::new(at(8, 0, 0), "a"),
        TimelineItem::new(at(18, 0, 0), "b"),
    ]);

    editor.pointer_pressed(PointerButton::Middle, Pos2::new(600.0, 100.0));
    editor.pointer_released(PointerButton::Middle);

    assert_eq!(editor.view_range(), ViewRange::new(at(8, 0, 0), at(18, 0, 0)));
}

#[test]
fn test_wheel_zooms_at_pointer() {
    let mut editor = nine_seconds_per_pixel(Vec::new());

    editor.wheel(1.0, 117.0);
    assert_eq!(editor.view_range().duration(), TimeDelta::minutes(51));

    editor.wheel(-1.0, 117.0);
    let duration = editor.view_range().duration();
    assert!(duration < TimeDelta::minutes(60));
    assert!(duration > TimeDelta::minutes(58));
}

#[test]
fn test_escape_clears_selection() {
    let item = TimelineItem::new(at(9, 30, 0), "launch");
    let id = item.id;
    let mut editor = nine_seconds_per_pixel(vec![item]);

    editor.execute_command(TimelineEditorCommand::Select { item_id: Some(id) });
    editor.escape();
    assert_eq!(editor.selected_item(), None);
}

#[test]
fn test_scene_follows_mutations() {
    let item = TimelineItem::new(at(9, 30, 0), "launch");
    let id = item.id;
    let mut editor = nine_seconds_per_pixel(vec![item]);
    let measure = CharWidthMeasure::default();

    editor.execute_command(TimelineEditorCommand::SetItemTime {
        item_id: id,
        time: at(11, 0, 0),
    });
    assert_eq!(editor.render_with(&measure).items().count(), 0);

    editor.execute_command(TimelineEditorCommand::SetItemTime {
        item_id: id,
        time: at(9, 45, 0),
    });
    let scene = editor.render_with(&measure);
    let laid_out = scene.items().next().unwrap();
    assert_eq!(laid_out.label.time_text, "09:45:00");
}

#[test]
fn test_t_zero_mode_changes_labels() {
    let item = TimelineItem::new(at(9, 30, 0), "launch");
    let mut editor = nine_seconds_per_pixel(vec![item]);
    let measure = CharWidthMeasure::default();

    editor.execute_command(TimelineEditorCommand::SetTZero { time: Some(at(9, 0, 0)) });
    editor.execute_command(TimelineEditorCommand::SetTZeroMode { enabled: true });

    let scene = editor.render_with(&measure);
    assert_eq!(scene.items().next().unwrap().label.time_text, "+00:30:00");
}

#[test]
fn test_replace_items_refits_and_drops_stale_selection() {
    let item = TimelineItem::new(at(9, 30, 0), "old");
    let id = item.id;
    let mut editor = nine_seconds_per_pixel(vec![item]);
    editor.execute_command(TimelineEditorCommand::Select { item_id: Some(id) });

    editor.execute_command(TimelineEditorCommand::ReplaceItems {
        items: vec![
            TimelineItem::new(at(13, 0, 0), "new b"),
            TimelineItem::new(at(12, 0, 0), "new a"),
        ],
    });

    assert_eq!(editor.selected_item(), None);
    assert_eq!(editor.items()[0].label, "new a");
    assert_eq!(editor.view_range(), ViewRange::new(at(12, 0, 0), at(13, 0, 0)));
}

#[test]
fn test_document_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("launch.json");

    let mut document = TimelineDocument::with_time_zone(chrono_tz::America::New_York);
    document.set_title("Launch");
    document.set_description("Pad 39A");
    document.set_t_zero(Some(at(14, 0, 0)));
    document.set_t_zero_mode(true);
    document.add_item(TimelineItem::new(at(13, 0, 0), "fuelling").approximate(true));
    document.add_item(TimelineItem::new(at(14, 0, 0), "liftoff").important(true));
    document.save_as(&path).unwrap();
    assert!(!document.has_unsaved_changes());

    let loaded = TimelineDocument::load_from_path(&path).unwrap();
    assert_eq!(loaded.title(), "Launch");
    assert_eq!(loaded.description(), "Pad 39A");
    assert_eq!(loaded.time_zone(), chrono_tz::America::New_York);
    assert_eq!(loaded.display_t_zero(), Some(at(14, 0, 0)));
    assert_eq!(loaded.file_path(), Some(path.as_path()));
    assert!(!loaded.has_unsaved_changes());

    let items: Vec<_> = loaded
        .items()
        .iter()
        .map(|item| (item.time, item.label.as_str(), item.is_approximate, item.is_important))
        .collect();
    assert_eq!(
        items,
        vec![
            (at(13, 0, 0), "fuelling", true, false),
            (at(14, 0, 0), "liftoff", false, true),
        ]
    );
}

#[test]
fn test_set_document_fits_new_items() {
    let mut editor = nine_seconds_per_pixel(Vec::new());
    let mut document = TimelineDocument::with_time_zone(Tz::UTC);
    document.add_item(TimelineItem::new(at(20, 0, 0), "late"));

    editor.set_document(document);
    assert_eq!(editor.view_range(), ViewRange::new(at(19, 30, 0), at(20, 30, 0)));
}

fn click_events(pos: Pos2) -> Vec<Event> {
    [true, false]
        .into_iter()
        .map(|pressed| Event::PointerButton {
            pos,
            button: PointerButton::Primary,
            pressed,
            modifiers: Modifiers::NONE,
        })
        .collect()
}

#[test]
fn test_covered_timeline_ignores_clicks() {
    let item = TimelineItem::new(at(9, 30, 0), "launch");
    let id = item.id;
    let mut editor = nine_seconds_per_pixel(vec![item]);
    editor.execute_command(TimelineEditorCommand::Select { item_id: Some(id) });
    editor.take_events();

    let rect = Rect::from_min_size(Pos2::new(10.0, 20.0), Vec2::new(800.0, 434.0));
    let pos = Pos2::new(610.0, 420.0);

    // a menu is open over the background
    editor.handle_events(&click_events(pos), rect, Some(pos), false);
    assert_eq!(editor.selected_item(), Some(id));
    assert!(editor.take_events().is_empty());

    editor.handle_events(&click_events(pos), rect, Some(pos), true);
    assert_eq!(editor.selected_item(), None);
}
