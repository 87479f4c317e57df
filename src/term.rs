use crate::palette::Rgb;
use crate::render::{Cell, CellBuffer};
use anyhow::{Context, Result};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute, queue,
    style::{
        Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor,
    },
    terminal::{
        self, BeginSynchronizedUpdate, Clear, ClearType, DisableLineWrap, EnableLineWrap,
        EndSynchronizedUpdate, EnterAlternateScreen, LeaveAlternateScreen,
    },
};
use std::io::{self, IsTerminal, Write};
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum HostEvent {
    Resize(u16, u16),
    Quit,
    Pause,
    Faster,
    Slower,
    Reseed,
}

/// Where frames go and where resize/key events come from.
pub(crate) trait Backend {
    /// Claims the display (raw mode, alternate screen and so on).
    fn begin(&mut self) -> Result<()> {
        Ok(())
    }
    /// Gives the display back; must be safe to call twice.
    fn end(&mut self) -> Result<()> {
        Ok(())
    }
    fn size(&self) -> Result<(u16, u16)>;
    fn poll_events(&mut self, budget: Duration) -> Result<Vec<HostEvent>>;
    fn present(&mut self, frame: &CellBuffer) -> Result<()>;
}

pub(crate) fn map_key(k: KeyEvent) -> Option<HostEvent> {
    if k.kind != KeyEventKind::Press && k.kind != KeyEventKind::Repeat {
        return None;
    }
    if k.modifiers.contains(KeyModifiers::CONTROL) {
        let ctrl_c = matches!(k.code, KeyCode::Char('c') | KeyCode::Char('C'));
        return ctrl_c.then_some(HostEvent::Quit);
    }
    match k.code {
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Some(HostEvent::Quit),
        KeyCode::Char(' ') => Some(HostEvent::Pause),
        KeyCode::Char('+') | KeyCode::Char('=') => Some(HostEvent::Faster),
        KeyCode::Char('-') => Some(HostEvent::Slower),
        KeyCode::Char('r') | KeyCode::Char('R') => Some(HostEvent::Reseed),
        _ => None,
    }
}

fn color(c: Rgb) -> Color {
    Color::Rgb {
        r: c.r,
        g: c.g,
        b: c.b,
    }
}

pub(crate) struct Terminal {
    out: io::Stdout,
    prev: CellBuffer,
    active: bool,
}

impl Terminal {
    /// The drawing surface is stdout, and only when it is a real terminal
    /// with some area to draw on.
    pub(crate) fn locate() -> Option<Self> {
        let out = io::stdout();
        if !out.is_terminal() {
            return None;
        }
        match terminal::size() {
            Ok((c, r)) if c > 0 && r > 0 => Some(Self {
                out,
                prev: CellBuffer::new(0, 0),
                active: false,
            }),
            _ => None,
        }
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        let _ = self.end();
    }
}

impl Backend for Terminal {
    fn begin(&mut self) -> Result<()> {
        terminal::enable_raw_mode().context("enabling raw mode")?;
        self.active = true;
        execute!(
            self.out,
            EnterAlternateScreen,
            cursor::Hide,
            DisableLineWrap,
            Clear(ClearType::All)
        )?;
        Ok(())
    }

    fn end(&mut self) -> Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;
        queue!(
            self.out,
            BeginSynchronizedUpdate,
            SetAttribute(Attribute::Reset),
            ResetColor,
            Clear(ClearType::All),
            cursor::Show,
            EnableLineWrap,
            EndSynchronizedUpdate,
            LeaveAlternateScreen
        )?;
        self.out.flush()?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    fn size(&self) -> Result<(u16, u16)> {
        Ok(terminal::size()?)
    }

    fn poll_events(&mut self, budget: Duration) -> Result<Vec<HostEvent>> {
        let mut events = Vec::new();
        let timeout = std::cmp::min(Duration::from_millis(1), budget);
        while event::poll(timeout)? {
            match event::read()? {
                Event::Key(k) => events.extend(map_key(k)),
                Event::Resize(w, h) => events.push(HostEvent::Resize(w, h)),
                _ => {}
            }
            if events.len() >= 32 {
                break;
            }
        }
        Ok(events)
    }

    fn present(&mut self, frame: &CellBuffer) -> Result<()> {
        let full = frame.w != self.prev.w || frame.h != self.prev.h;
        if full {
            self.prev = CellBuffer::new(frame.w, frame.h);
        }

        queue!(self.out, BeginSynchronizedUpdate)?;
        if full {
            queue!(self.out, Clear(ClearType::All))?;
        }

        let mut last_fg = None;
        let mut last_bg = None;
        let mut last_bold = None;

        for y in 0..frame.h {
            for x in 0..frame.w {
                let i = frame.idx(x, y);
                let c: Cell = frame.cells[i];
                if !full && c == self.prev.cells[i] {
                    continue;
                }

                queue!(self.out, cursor::MoveTo(x, y))?;

                if last_bold != Some(c.bold) {
                    let attr = if c.bold {
                        Attribute::Bold
                    } else {
                        Attribute::NormalIntensity
                    };
                    queue!(self.out, SetAttribute(attr))?;
                    last_bold = Some(c.bold);
                }
                if last_fg != Some(c.fg) {
                    queue!(self.out, SetForegroundColor(color(c.fg)))?;
                    last_fg = Some(c.fg);
                }
                if last_bg != Some(c.bg) {
                    queue!(self.out, SetBackgroundColor(color(c.bg)))?;
                    last_bg = Some(c.bg);
                }

                queue!(self.out, Print(c.ch))?;
            }
        }

        queue!(self.out, ResetColor, EndSynchronizedUpdate)?;
        self.out.flush()?;
        self.prev.cells.copy_from_slice(&frame.cells);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, mods: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, mods)
    }

    #[test]
    fn test_quit_keys() {
        for code in [KeyCode::Char('q'), KeyCode::Esc] {
            assert_eq!(map_key(key(code, KeyModifiers::NONE)), Some(HostEvent::Quit));
        }
        assert_eq!(
            map_key(key(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(HostEvent::Quit)
        );
        assert_eq!(map_key(key(KeyCode::Char('x'), KeyModifiers::CONTROL)), None);
    }

    #[test]
    fn test_control_keys() {
        let m = KeyModifiers::NONE;
        assert_eq!(map_key(key(KeyCode::Char(' '), m)), Some(HostEvent::Pause));
        assert_eq!(map_key(key(KeyCode::Char('+'), m)), Some(HostEvent::Faster));
        assert_eq!(map_key(key(KeyCode::Char('-'), m)), Some(HostEvent::Slower));
        assert_eq!(map_key(key(KeyCode::Char('r'), m)), Some(HostEvent::Reseed));
        assert_eq!(map_key(key(KeyCode::Char('z'), m)), None);
    }

    #[test]
    fn test_release_is_ignored() {
        let mut k = key(KeyCode::Char('q'), KeyModifiers::NONE);
        k.kind = KeyEventKind::Release;
        assert_eq!(map_key(k), None);
    }
}
