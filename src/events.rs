//! Keyboard commands.

use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// A recognised keyboard command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Stop monitoring and exit.
    Quit,
    /// Zero all statistics.
    Reset,
    /// Show or hide the IP info panel.
    ToggleIpInfo,
}

/// A non-blocking source of keyboard commands.
pub trait CommandInput {
    /// Return the next pending command, if any, without waiting.
    ///
    /// Keys that map to no command are consumed and ignored.
    fn poll_command(&mut self) -> Result<Option<Command>>;
}

/// Map a key event to a command.
pub fn command_for_key(key: KeyEvent) -> Option<Command> {
    // Raw mode delivers Ctrl+C as a key instead of SIGINT
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Some(Command::Quit),
            _ => None,
        };
    }

    match key.code {
        KeyCode::Char('q') => Some(Command::Quit),
        KeyCode::Char('r') => Some(Command::Reset),
        KeyCode::Char('m') => Some(Command::ToggleIpInfo),
        _ => None,
    }
}

/// Reads commands from the terminal through crossterm.
///
/// Expects the terminal to be in raw mode so single keystrokes arrive
/// without waiting for Enter.
#[derive(Debug, Default)]
pub struct TerminalInput;

impl TerminalInput {
    pub fn new() -> Self {
        Self
    }
}

impl CommandInput for TerminalInput {
    fn poll_command(&mut self) -> Result<Option<Command>> {
        // Zero timeout: only look at what is already queued
        while event::poll(Duration::ZERO)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Release {
                    continue;
                }
                if let Some(command) = command_for_key(key) {
                    return Ok(Some(command));
                }
            }
        }
        Ok(None)
    }
}

/// Input for headless runs: never produces a command.
#[derive(Debug, Default)]
pub struct NoInput;

impl CommandInput for NoInput {
    fn poll_command(&mut self) -> Result<Option<Command>> {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_recognised_keys() {
        assert_eq!(command_for_key(key(KeyCode::Char('q'))), Some(Command::Quit));
        assert_eq!(command_for_key(key(KeyCode::Char('r'))), Some(Command::Reset));
        assert_eq!(command_for_key(key(KeyCode::Char('m'))), Some(Command::ToggleIpInfo));
    }

    #[test]
    fn test_ctrl_c_quits() {
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(command_for_key(ctrl_c), Some(Command::Quit));

        let ctrl_r = KeyEvent::new(KeyCode::Char('r'), KeyModifiers::CONTROL);
        assert_eq!(command_for_key(ctrl_r), None);
    }

    #[test]
    fn test_other_keys_ignored() {
        for code in [KeyCode::Char('x'), KeyCode::Char('Q'), KeyCode::Enter, KeyCode::Esc] {
            assert_eq!(command_for_key(key(code)), None);
        }
    }

    #[test]
    fn test_no_input() {
        assert_eq!(NoInput.poll_command().unwrap(), None);
    }
}
