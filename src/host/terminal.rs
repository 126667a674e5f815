use super::{EventSource, HostEvent, Key};
use crate::error::Result;
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
    PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::{execute, terminal};
use std::io;
use std::time::Duration;

/// Key and resize events read from the terminal through crossterm.
///
/// Most terminals only report presses. When the terminal cannot report
/// releases, a key up is synthesized right after every key down so that
/// edge-triggered input still sees a release between presses.
pub struct TerminalEvents
{
    reports_release: bool,
    pending_release: Option<Key>,
}

impl TerminalEvents
{
    /// Must be called with raw mode already enabled.
    pub fn new() -> Self
    {
        let reports_release = matches!(terminal::supports_keyboard_enhancement(), Ok(true))
            && execute!(
                io::stdout(),
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )
            .is_ok();
        log::debug!("terminal reports key releases: {reports_release}");
        Self {
            reports_release,
            pending_release: None,
        }
    }

    fn translate(&mut self, event: Event) -> Option<HostEvent>
    {
        match event {
            Event::Key(KeyEvent {
                code,
                modifiers,
                kind,
                ..
            }) => {
                let key = key_from_code(code)?;
                match kind {
                    KeyEventKind::Release => Some(HostEvent::KeyUp(key)),
                    KeyEventKind::Press | KeyEventKind::Repeat => {
                        if !self.reports_release {
                            self.pending_release = Some(key.clone());
                        }
                        Some(HostEvent::KeyDown {
                            key,
                            ctrl: modifiers.contains(KeyModifiers::CONTROL),
                        })
                    }
                }
            }
            Event::Resize(cols, rows) => Some(HostEvent::Resize { cols, rows }),
            _ => None,
        }
    }
}

impl Default for TerminalEvents
{
    fn default() -> Self
    {
        Self::new()
    }
}

impl Drop for TerminalEvents
{
    fn drop(&mut self)
    {
        if self.reports_release {
            let _ = execute!(io::stdout(), PopKeyboardEnhancementFlags);
        }
    }
}

impl EventSource for TerminalEvents
{
    fn poll(&mut self, timeout: Duration) -> Result<Option<HostEvent>>
    {
        if let Some(key) = self.pending_release.take() {
            return Ok(Some(HostEvent::KeyUp(key)));
        }
        if !event::poll(timeout)? {
            return Ok(None);
        }
        let event = event::read()?;
        Ok(self.translate(event))
    }
}

fn key_from_code(code: KeyCode) -> Option<Key>
{
    let key = match code {
        KeyCode::Char(' ') => Key::Space,
        KeyCode::Char(ch) => Key::Char(ch),
        KeyCode::Up => Key::ArrowUp,
        KeyCode::Down => Key::ArrowDown,
        KeyCode::Left => Key::ArrowLeft,
        KeyCode::Right => Key::ArrowRight,
        KeyCode::Enter => Key::Enter,
        KeyCode::Esc => Key::Escape,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Tab => Key::Tab,
        KeyCode::Modifier(_) | KeyCode::Null => return None,
        other => Key::Other(format!("{other:?}")),
    };
    Some(key)
}

#[cfg(test)]
mod tests
{
    use super::*;
    use crossterm::event::KeyEventState;

    fn press(code: KeyCode) -> Event
    {
        Event::Key(KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        })
    }

    #[test]
    fn test_key_mapping()
    {
        assert_eq!(key_from_code(KeyCode::Char(' ')), Some(Key::Space));
        assert_eq!(key_from_code(KeyCode::Up), Some(Key::ArrowUp));
        assert_eq!(key_from_code(KeyCode::Char('R')), Some(Key::Char('R')));
        assert_eq!(key_from_code(KeyCode::F(5)), Some(Key::Other("F(5)".to_string())));
        assert_eq!(key_from_code(KeyCode::Null), None);
    }

    #[test]
    fn test_release_synthesized_without_enhancement()
    {
        let mut events = TerminalEvents {
            reports_release: false,
            pending_release: None,
        };
        let down = events.translate(press(KeyCode::Char(' ')));
        assert_eq!(
            down,
            Some(HostEvent::KeyDown {
                key: Key::Space,
                ctrl: false
            })
        );
        assert_eq!(
            events.poll(Duration::ZERO).unwrap(),
            Some(HostEvent::KeyUp(Key::Space))
        );
    }

    #[test]
    fn test_no_synthesized_release_with_enhancement()
    {
        let mut events = TerminalEvents {
            reports_release: true,
            pending_release: None,
        };
        events.translate(press(KeyCode::Up));
        assert_eq!(events.pending_release, None);
    }

    #[test]
    fn test_resize_translated()
    {
        let mut events = TerminalEvents {
            reports_release: false,
            pending_release: None,
        };
        assert_eq!(
            events.translate(Event::Resize(100, 30)),
            Some(HostEvent::Resize { cols: 100, rows: 30 })
        );
        assert_eq!(events.translate(Event::FocusGained), None);
    }
}
