//! Key scripts: one line of text turned into a sequence of key events.
//!
//! Plain characters are typed as-is (a space is the Space key). Named keys
//! go in angle brackets: `<space> <tab> <ret> <esc> <bs> <del> <left>
//! <right> <home> <end> <c-del>`, `<lt>` for a literal `<`, and the
//! navigation keys `<next> <prev> <pgdn> <pgup>`, which press whatever the
//! configuration binds them to.

use anyhow::{anyhow, bail};
use libtranslit_core::{Config, Key, KeyBinding, KeyEvent, Modifiers};

fn first_binding(bindings: &[KeyBinding], name: &str) -> anyhow::Result<KeyEvent> {
    bindings
        .first()
        .map(|b| KeyEvent::with_modifiers(b.key, b.modifiers))
        .ok_or_else(|| anyhow!("<{}> has no key binding configured", name))
}

fn named_key(name: &str, config: &Config) -> anyhow::Result<KeyEvent> {
    let event = match name {
        "space" => KeyEvent::new(Key::Space),
        "tab" => KeyEvent::new(Key::Tab),
        "ret" => KeyEvent::new(Key::Return),
        "esc" => KeyEvent::new(Key::Escape),
        "bs" => KeyEvent::new(Key::Backspace),
        "del" => KeyEvent::new(Key::Delete),
        "left" => KeyEvent::new(Key::Left),
        "right" => KeyEvent::new(Key::Right),
        "home" => KeyEvent::new(Key::Home),
        "end" => KeyEvent::new(Key::End),
        "lt" => KeyEvent::char('<'),
        "c-del" => KeyEvent::with_modifiers(Key::Delete, Modifiers::ctrl()),
        "next" => first_binding(&config.next_candidate, name)?,
        "prev" => first_binding(&config.prev_candidate, name)?,
        "pgdn" => first_binding(&config.next_page, name)?,
        "pgup" => first_binding(&config.prev_page, name)?,
        other => bail!("unknown key <{}>", other),
    };
    Ok(event)
}

/// Parse one script line.
pub fn parse(line: &str, config: &Config) -> anyhow::Result<Vec<KeyEvent>> {
    let mut events = Vec::new();
    let mut rest = line;
    while let Some(ch) = rest.chars().next() {
        if ch == '<' {
            if let Some(end) = rest.find('>') {
                events.push(named_key(&rest[1..end], config)?);
                rest = &rest[end + 1..];
                continue;
            }
        }
        events.push(match ch {
            ' ' => KeyEvent::new(Key::Space),
            ch => KeyEvent::char(ch),
        });
        rest = &rest[ch.len_utf8()..];
    }
    Ok(events)
}
