// core/tests/cursor_invariant.rs
//
// Exhaustive check that the buffer cursor stays within [0, len] for every
// short sequence of edits, both on InputBuffer directly and through the
// engine's key handling.

use libtranslit_core::{
    Candidate, Config, ContextId, ImeEngine, InMemoryDictionary, InputBuffer, Key, KeyEvent,
    OracleError, OracleSettings, SchemeInfo, SchemeLoader, Transliterator,
};
use std::sync::Arc;

#[derive(Debug, Clone, Copy)]
enum Op {
    Insert,
    Backspace,
    Delete,
    Left,
    Right,
    Home,
    End,
}

const OPS: [Op; 7] = [
    Op::Insert,
    Op::Backspace,
    Op::Delete,
    Op::Left,
    Op::Right,
    Op::Home,
    Op::End,
];

/// Every sequence of `len` operations, in lexicographic order.
fn sequences(len: usize) -> impl Iterator<Item = Vec<Op>> {
    let total = OPS.len().pow(len as u32);
    (0..total).map(move |mut n| {
        let mut seq = Vec::with_capacity(len);
        for _ in 0..len {
            seq.push(OPS[n % OPS.len()]);
            n /= OPS.len();
        }
        seq
    })
}

fn apply(buffer: &mut InputBuffer, op: Op) {
    match op {
        Op::Insert => buffer.insert(b'k'),
        Op::Backspace => {
            buffer.delete_before();
        }
        Op::Delete => {
            buffer.delete_after();
        }
        Op::Left => {
            buffer.move_cursor(-1);
        }
        Op::Right => {
            buffer.move_cursor(1);
        }
        Op::Home => buffer.move_to_start(),
        Op::End => buffer.move_to_end(),
    }
}

#[test]
fn test_buffer_cursor_stays_in_bounds() {
    for len in 1..=6 {
        for seq in sequences(len) {
            let mut buffer = InputBuffer::new();
            let mut expected_len = 0usize;
            for op in &seq {
                let before = buffer.len();
                apply(&mut buffer, *op);
                assert!(buffer.cursor() <= buffer.len(), "{:?}", seq);
                if let Op::Insert = op {
                    expected_len += 1;
                } else if buffer.len() < before {
                    expected_len -= 1;
                }
                assert_eq!(buffer.len(), expected_len, "{:?}", seq);
            }
        }
    }
}

struct Echo;

impl Transliterator for Echo {
    fn transliterate(&self, input: &str) -> Result<Vec<Candidate>, OracleError> {
        Ok(vec![Candidate::new(input.to_uppercase(), 1)])
    }
}

struct EchoLoader;

impl SchemeLoader for EchoLoader {
    fn load(&self, _: &str, _: &OracleSettings) -> Result<Arc<dyn Transliterator>, OracleError> {
        Ok(Arc::new(Echo))
    }

    fn schemes(&self) -> Vec<SchemeInfo> {
        Vec::new()
    }
}

fn key_for(op: Op) -> Key {
    match op {
        Op::Insert => Key::Char('k'),
        Op::Backspace => Key::Backspace,
        Op::Delete => Key::Delete,
        Op::Left => Key::Left,
        Op::Right => Key::Right,
        Op::Home => Key::Home,
        Op::End => Key::End,
    }
}

#[test]
fn test_engine_cursor_stays_in_bounds() {
    let ic = ContextId(1);
    let mut engine = ImeEngine::new(
        Box::new(EchoLoader),
        Arc::new(InMemoryDictionary::new()),
        Config::default(),
    );
    engine.activate("echo").unwrap();

    for len in 1..=5 {
        for seq in sequences(len) {
            engine.reset(ic);
            for op in &seq {
                engine.process_key(ic, KeyEvent::new(key_for(*op)));
                let session = engine.session(ic).unwrap();
                let buffer = session.buffer();
                assert!(buffer.cursor() <= buffer.len(), "{:?}", seq);
                let ctx = engine.context(ic);
                assert!(ctx.preedit_cursor <= ctx.preedit_text.len(), "{:?}", seq);
                assert!(ctx.preedit_text.is_char_boundary(ctx.preedit_cursor));
            }
        }
    }
}
