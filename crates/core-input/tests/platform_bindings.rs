use core_config::{Platform, ShortcutSettings};
use core_format::FormatKind;
use core_input::map_key_event;
use core_keymap::{LogicalAction, TriggerBindingTable};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyEventState, KeyModifiers};

fn press(c: char, modifiers: KeyModifiers) -> KeyEvent {
    KeyEvent {
        code: KeyCode::Char(c),
        modifiers,
        kind: KeyEventKind::Press,
        state: KeyEventState::empty(),
    }
}

fn resolve(table: &TriggerBindingTable, key: KeyEvent) -> Option<LogicalAction> {
    let mapped = map_key_event(&key).expect("char keys map");
    table.resolve(&mapped)
}

#[test]
fn command_key_fires_default_bindings_on_macos() {
    let table =
        TriggerBindingTable::from_settings(&ShortcutSettings::default(), Platform::MacOs).unwrap();
    assert_eq!(
        resolve(&table, press('k', KeyModifiers::SUPER)),
        Some(LogicalAction::TogglePalette)
    );
    assert_eq!(
        resolve(&table, press('g', KeyModifiers::SUPER | KeyModifiers::ALT)),
        Some(LogicalAction::Format(FormatKind::Grammar))
    );
    assert_eq!(resolve(&table, press('k', KeyModifiers::CONTROL)), None);
}

#[test]
fn control_key_fires_default_bindings_elsewhere() {
    for platform in [Platform::Linux, Platform::Windows] {
        let table =
            TriggerBindingTable::from_settings(&ShortcutSettings::default(), platform).unwrap();
        assert_eq!(
            resolve(&table, press('k', KeyModifiers::CONTROL)),
            Some(LogicalAction::TogglePalette)
        );
        assert_eq!(resolve(&table, press('k', KeyModifiers::SUPER)), None);
    }
}

#[test]
fn cmd_alias_matches_command_key() {
    let settings = ShortcutSettings {
        emoji: "cmd+shift+e".into(),
        ..ShortcutSettings::default()
    };
    let table = TriggerBindingTable::from_settings(&settings, Platform::Linux).unwrap();
    assert_eq!(
        resolve(&table, press('E', KeyModifiers::SUPER | KeyModifiers::SHIFT)),
        Some(LogicalAction::Format(FormatKind::Emoji))
    );
}
