use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::modifier::ItemKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiCommand {
    StartGame,
    Reset,
    Buy,
    Sell,
    IncreaseQty(u64),
    DecreaseQty(u64),
    CycleDifficulty,
    UseItem(ItemKind),
    ToggleLeaderboard,
    Quit,
}

/// Keys while the game-over popup asks for a leaderboard name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameEntryCommand {
    Push(char),
    Backspace,
    Submit,
    Cancel,
}

fn is_ctrl_c(key: &KeyEvent) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL)
        && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('C'))
}

/// Ctrl+C arrives as a key press in raw mode and maps to quit.
pub fn parse_main_command(key: &KeyEvent) -> Option<UiCommand> {
    if is_ctrl_c(key) {
        return Some(UiCommand::Quit);
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return None;
    }
    match &key.code {
        KeyCode::Enter => Some(UiCommand::StartGame),
        KeyCode::Up => Some(UiCommand::IncreaseQty(1)),
        KeyCode::Down => Some(UiCommand::DecreaseQty(1)),
        KeyCode::Esc => Some(UiCommand::Quit),
        KeyCode::Char('+') | KeyCode::Char('=') => Some(UiCommand::IncreaseQty(1)),
        KeyCode::Char('-') => Some(UiCommand::DecreaseQty(1)),
        KeyCode::Char(']') => Some(UiCommand::IncreaseQty(10)),
        KeyCode::Char('[') => Some(UiCommand::DecreaseQty(10)),
        KeyCode::Char('1') => Some(UiCommand::UseItem(ItemKind::TimeFreeze)),
        KeyCode::Char('2') => Some(UiCommand::UseItem(ItemKind::PricePeg)),
        KeyCode::Char('3') => Some(UiCommand::UseItem(ItemKind::DoubleGain)),
        KeyCode::Char(c) => match c.to_ascii_lowercase() {
            'n' => Some(UiCommand::StartGame),
            'r' => Some(UiCommand::Reset),
            'b' => Some(UiCommand::Buy),
            's' => Some(UiCommand::Sell),
            'd' => Some(UiCommand::CycleDifficulty),
            'l' => Some(UiCommand::ToggleLeaderboard),
            'q' => Some(UiCommand::Quit),
            _ => None,
        },
        _ => None,
    }
}

pub fn parse_name_entry_command(key: &KeyEvent) -> Option<NameEntryCommand> {
    if is_ctrl_c(key) {
        return Some(NameEntryCommand::Cancel);
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return None;
    }
    match &key.code {
        KeyCode::Enter => Some(NameEntryCommand::Submit),
        KeyCode::Esc => Some(NameEntryCommand::Cancel),
        KeyCode::Backspace => Some(NameEntryCommand::Backspace),
        KeyCode::Char(c) if !c.is_control() => Some(NameEntryCommand::Push(*c)),
        _ => None,
    }
}
