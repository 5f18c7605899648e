//! End-to-end editing sessions against the simulated host

use input_types::{InputEvent, KeyCode, KeyEvent, Modifiers};
use proptest::prelude::*;
use script_core::{BlockDocument, BlockType, CHARACTER_PLACEHOLDER};
use services_script_editor::{
    CaretHost, EditorAction, EditorConfig, FileStore, KeyValueStore, MemoryStore, ScriptEditor,
    SimClock, SimSurface, SurfaceHost, ToolbarCommand,
};

type Session = ScriptEditor<SimSurface, MemoryStore, SimClock>;

fn mount_with(store: MemoryStore) -> (Session, SimClock) {
    let clock = SimClock::new();
    let editor = ScriptEditor::mount(
        &EditorConfig::default(),
        SimSurface::new(),
        store,
        clock.clone(),
    );
    (editor, clock)
}

fn mount() -> (Session, SimClock) {
    mount_with(MemoryStore::new())
}

fn press(code: KeyCode, modifiers: Modifiers) -> InputEvent {
    InputEvent::key(KeyEvent::pressed(code, modifiers))
}

fn enter() -> InputEvent {
    press(KeyCode::Enter, Modifiers::none())
}

fn shortcut(block_type: BlockType) -> InputEvent {
    let code = match block_type {
        BlockType::SceneHeading => KeyCode::Num1,
        BlockType::Action => KeyCode::Num2,
        BlockType::Character => KeyCode::Num3,
        BlockType::Dialogue => KeyCode::Num4,
    };
    press(code, Modifiers::ALT)
}

fn select_block(editor: &mut Session, index: usize) {
    let id = editor.document().blocks()[index].id();
    editor.host_mut().select_text(id, 0);
}

#[test]
fn test_enter_after_dialogue_inserts_empty_action() {
    let (mut editor, _) = mount();
    select_block(&mut editor, 0);
    editor.process_input(shortcut(BlockType::Dialogue));
    editor.apply_toolbar(ToolbarCommand::AddBlock);
    select_block(&mut editor, 0);

    let dialogue = editor.document().blocks()[0].id();
    let action = editor.process_input(enter());
    assert_eq!(
        action,
        EditorAction::Handled {
            prevent_default: true
        }
    );

    let doc = editor.document();
    assert_eq!(doc.len(), 3);
    assert_eq!(doc.blocks()[0].id(), dialogue);
    let inserted = &doc.blocks()[1];
    assert_eq!(inserted.block_type(), Some(BlockType::Action));
    assert_eq!(inserted.content(), "");

    let caret = editor.host().selection().unwrap();
    assert!(caret.collapsed);
    assert_eq!(caret.offset, 0);
    assert_eq!(
        editor.host().locate(&caret, editor.controller().root()),
        Some(inserted.id())
    );
}

#[test]
fn test_heading_shortcut_from_title_only_moves_toolbar() {
    let (mut editor, _) = mount();
    let title = editor.host().title_node();
    editor.host_mut().select_node(title, 3, true);
    let before = editor.document().clone();

    let action = editor.process_input(shortcut(BlockType::SceneHeading));
    assert!(matches!(action, EditorAction::Handled { .. }));

    let doc = editor.document();
    assert_eq!(doc.blocks(), before.blocks());
    assert_eq!(doc.scene_counter(), before.scene_counter());
    assert_eq!(doc.last_known_type(), BlockType::SceneHeading);
}

#[test]
fn test_no_write_before_first_tick() {
    let (mut editor, clock) = mount();
    select_block(&mut editor, 0);
    editor.process_input(enter());

    clock.advance(1499);
    assert!(!editor.poll());
    assert_eq!(editor.store().write_count(), 0);
    assert_eq!(editor.store().peek("scriptData"), None);

    clock.advance(1);
    assert!(editor.poll());
    assert_eq!(editor.store().write_count(), 1);
    assert_eq!(
        editor.store().peek("scriptData"),
        Some(editor.host().read_surface().as_str())
    );
}

#[test]
fn test_saved_surface_reloads_byte_identical() {
    let (mut editor, clock) = mount();
    select_block(&mut editor, 0);
    editor.process_input(shortcut(BlockType::SceneHeading));
    editor.process_input(enter());
    editor.process_input(enter());
    editor.process_input(enter());
    editor.host_mut().paste_markup("<p style=\"color: red\">pasted &amp; kept</p>");

    clock.advance(1500);
    assert!(editor.poll());

    let saved = editor.store().peek("scriptData").unwrap().to_string();
    assert!(saved.ends_with("<p style=\"color: red\">pasted &amp; kept</p>"));
    let reloaded = BlockDocument::load_snapshot(Some(&saved));
    assert_eq!(reloaded.render_surface(), saved);
}

#[test]
fn test_remount_restores_last_snapshot() {
    let (mut editor, clock) = mount();
    select_block(&mut editor, 0);
    editor.process_input(shortcut(BlockType::SceneHeading));
    editor.host_mut().clear_selection();
    editor.apply_toolbar(ToolbarCommand::SelectType(BlockType::Character));
    editor.apply_toolbar(ToolbarCommand::AddBlock);
    clock.advance(1500);
    editor.poll();
    let saved = editor.host().read_surface();

    let (_, store) = editor.teardown();
    let (editor, _) = mount_with(store);

    assert_eq!(editor.host().read_surface(), saved);
    let doc = editor.document();
    assert_eq!(doc.len(), 2);
    assert_eq!(doc.blocks()[0].block_type(), Some(BlockType::SceneHeading));
    assert_eq!(doc.blocks()[1].content(), CHARACTER_PLACEHOLDER);
    assert_eq!(doc.scene_counter(), 1);
    assert_eq!(doc.last_known_type(), BlockType::Action);
}

#[test]
fn test_typed_text_survives_edits_and_autosave() {
    let (mut editor, clock) = mount();
    let first = editor.document().blocks()[0].id();
    editor.host_mut().type_text(first, "He runs.");

    editor.process_input(enter());
    let second = editor.document().blocks()[1].id();
    editor.host_mut().type_text(second, "MARA");
    editor.process_input(shortcut(BlockType::Dialogue));
    editor.apply_toolbar(ToolbarCommand::AddBlock);

    let doc = editor.document();
    assert_eq!(doc.blocks()[0].content(), "He runs.");
    assert_eq!(doc.blocks()[1].block_type(), Some(BlockType::Dialogue));
    assert_eq!(doc.blocks()[1].content(), "MARA");

    clock.advance(1500);
    assert!(editor.poll());
    let saved = editor.store().peek("scriptData").unwrap();
    assert!(saved.contains(">He runs.</div>"));
    assert!(saved.contains(">MARA</div>"));
}

#[test]
fn test_loose_text_snapshot_is_kept() {
    let raw = "FADE IN: rain on the window.";
    let (mut editor, clock) = mount_with(MemoryStore::with_entry("scriptData", raw));
    assert_eq!(editor.host().read_surface(), raw);

    clock.advance(1500);
    assert!(editor.poll());
    assert_eq!(editor.store().peek("scriptData"), Some(raw));

    select_block(&mut editor, 0);
    editor.process_input(enter());
    let surface = editor.host().read_surface();
    assert!(surface.starts_with(raw));
    assert_eq!(editor.document().blocks()[1].block_type(), Some(BlockType::Action));
}

#[test]
fn test_remount_restarts_scene_numbering() {
    let heading = "<div class=\"block scene-heading\" data-type=\"scene-heading\">INT. KITCHEN - NIGHT</div>";
    let (mut editor, _) = mount_with(MemoryStore::with_entry("scriptData", heading));
    assert_eq!(editor.document().scene_counter(), 1);

    let id = editor.apply_toolbar(ToolbarCommand::SelectType(BlockType::SceneHeading));
    assert_eq!(id, None);
    let added = editor.apply_toolbar(ToolbarCommand::AddBlock).unwrap();
    assert_eq!(
        editor.document().block(added).unwrap().content(),
        "INT./EXT. SCENE 1"
    );
}

#[test]
fn test_teardown_skips_final_write() {
    let (mut editor, clock) = mount();
    clock.advance(1500);
    assert!(editor.poll());
    let first_save = editor.store().peek("scriptData").unwrap().to_string();

    editor.apply_toolbar(ToolbarCommand::AddBlock);
    clock.advance(1000);
    editor.poll();

    let (host, store) = editor.teardown();
    assert_eq!(store.write_count(), 1);
    assert_eq!(store.peek("scriptData"), Some(first_save.as_str()));
    assert_ne!(host.read_surface(), first_save);
}

#[test]
fn test_reselecting_heading_still_advances_counter() {
    let (mut editor, _) = mount();
    select_block(&mut editor, 0);

    editor.process_input(shortcut(BlockType::SceneHeading));
    assert_eq!(editor.document().blocks()[0].content(), "INT./EXT. SCENE 1");

    editor.process_input(shortcut(BlockType::SceneHeading));
    let doc = editor.document();
    assert_eq!(doc.blocks()[0].content(), "INT./EXT. SCENE 2");
    assert_eq!(doc.scene_counter(), 3);
    let headings = doc
        .blocks()
        .iter()
        .filter(|b| b.block_type() == Some(BlockType::SceneHeading))
        .count();
    assert_eq!(headings, 1);
}

#[test]
fn test_add_block_ignores_caret_position() {
    let (mut editor, _) = mount();
    editor.apply_toolbar(ToolbarCommand::AddBlock);
    editor.apply_toolbar(ToolbarCommand::AddBlock);
    select_block(&mut editor, 0);

    let id = editor.apply_toolbar(ToolbarCommand::AddBlock).unwrap();
    let doc = editor.document();
    assert_eq!(doc.position(id), Some(3));
    assert_eq!(
        editor.host().selection().map(|s| s.node),
        editor.host().text_node(id)
    );
}

#[test]
fn test_enter_in_foreign_block_uses_toolbar_type() {
    let store = MemoryStore::with_entry("scriptData", "<div class=\"block\">pasted</div>");
    let (mut editor, _) = mount_with(store);
    assert_eq!(editor.document().blocks()[0].block_type(), None);

    // Move the toolbar without touching any block.
    editor.host_mut().clear_selection();
    editor.process_input(shortcut(BlockType::Dialogue));

    select_block(&mut editor, 0);
    editor.process_input(enter());

    let blocks = editor.document().blocks();
    assert_eq!(blocks.len(), 2);
    assert_eq!(blocks[0].block_type(), None);
    assert_eq!(blocks[1].block_type(), Some(BlockType::Dialogue));
}

#[test]
fn test_unusable_snapshot_mounts_default_document() {
    let store = MemoryStore::with_entry("scriptData", "<div class=\"block action\">unterminated");
    let (editor, _) = mount_with(store);
    assert_eq!(
        editor.document().render_surface(),
        BlockDocument::create().render_surface()
    );
}

#[test]
fn test_configured_key_and_period() {
    let config =
        EditorConfig::from_json(br#"{"storage_key": "draft", "autosave_period_ms": 500}"#).unwrap();
    let clock = SimClock::new();
    let mut editor = ScriptEditor::mount(&config, SimSurface::new(), MemoryStore::new(), clock.clone());

    clock.advance(500);
    assert!(editor.poll());
    assert!(editor.store().peek("draft").is_some());
    assert_eq!(editor.store().peek("scriptData"), None);
}

#[test]
fn test_file_store_survives_sessions() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("script.json");
    let clock = SimClock::new();

    let store = FileStore::open(&path).unwrap();
    let mut editor = ScriptEditor::mount(&EditorConfig::default(), SimSurface::new(), store, clock.clone());
    let first = editor.document().blocks()[0].id();
    editor.host_mut().select_text(first, 0);
    editor.process_input(shortcut(BlockType::SceneHeading));
    editor.process_input(enter());
    clock.advance(1500);
    assert!(editor.poll());
    let saved = editor.host().read_surface();
    drop(editor.teardown());

    let store = FileStore::open(&path).unwrap();
    assert_eq!(store.get("scriptData").unwrap(), Some(saved.clone()));
    let editor = ScriptEditor::mount(&EditorConfig::default(), SimSurface::new(), store, SimClock::new());
    assert_eq!(editor.host().read_surface(), saved);
    assert_eq!(editor.document().len(), 2);
}

#[derive(Debug, Clone)]
enum Action {
    Enter,
    Shortcut(BlockType),
    Toolbar(BlockType),
    AddBlock,
    Select(usize),
    Deselect,
    Paste,
    Wait(u64),
}

fn block_type_strategy() -> impl Strategy<Value = BlockType> {
    prop::sample::select(BlockType::ALL.to_vec())
}

fn action_strategy() -> impl Strategy<Value = Action> {
    prop_oneof![
        4 => Just(Action::Enter),
        2 => block_type_strategy().prop_map(Action::Shortcut),
        1 => block_type_strategy().prop_map(Action::Toolbar),
        2 => Just(Action::AddBlock),
        3 => any::<usize>().prop_map(Action::Select),
        1 => Just(Action::Deselect),
        1 => Just(Action::Paste),
        2 => (0u64..4000).prop_map(Action::Wait),
    ]
}

proptest! {
    #[test]
    fn prop_every_saved_surface_reloads_identically(
        actions in prop::collection::vec(action_strategy(), 1..40)
    ) {
        let (mut editor, clock) = mount();

        for action in actions {
            let before = editor.document().len();
            let mut grows = false;
            match action {
                Action::Enter => {
                    let resolved = editor
                        .host()
                        .selection()
                        .and_then(|anchor| editor.host().locate(&anchor, editor.controller().root()))
                        .is_some();
                    let handled = editor.process_input(enter());
                    prop_assert_eq!(handled, EditorAction::Handled { prevent_default: true });
                    grows = resolved;
                }
                Action::Shortcut(block_type) => {
                    editor.process_input(shortcut(block_type));
                    prop_assert_eq!(editor.document().last_known_type(), block_type);
                }
                Action::Toolbar(block_type) => {
                    editor.apply_toolbar(ToolbarCommand::SelectType(block_type));
                }
                Action::AddBlock => {
                    editor.apply_toolbar(ToolbarCommand::AddBlock);
                    grows = true;
                }
                Action::Select(i) => {
                    let index = i % editor.document().len();
                    select_block(&mut editor, index);
                }
                Action::Deselect => editor.host_mut().clear_selection(),
                Action::Paste => editor.host_mut().paste_markup("<span>x</span>"),
                Action::Wait(ms) => {
                    clock.advance(ms);
                    editor.poll();
                }
            }
            let expected = if grows { before + 1 } else { before };
            prop_assert_eq!(editor.document().len(), expected);
        }

        if let Some(saved) = editor.store().peek("scriptData") {
            let reloaded = BlockDocument::load_snapshot(Some(saved));
            prop_assert_eq!(reloaded.render_surface(), saved);
        }
    }
}
