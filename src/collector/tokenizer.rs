//! `KEY(value)` 토크나이저
//!
//! Splits MQ command output into `(NAME, VALUE)` pairs. The scanner is a
//! small state machine over characters: a name is the last
//! whitespace-delimited word before `(`, and a value runs to the first `)`.
//!
//! ```text
//! QUEUE(DEV.QUEUE.1) TYPE(QUEUE)   QTIME(3231, 3232)
//! ```

/// One `NAME(VALUE)` unit, both sides trimmed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPair {
    pub name: String,
    pub value: String,
}

impl FieldPair {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Accumulating a candidate name
    Name,
    /// Whitespace seen after a name; a `(` still binds to it
    AfterName,
    /// Inside parentheses
    Value,
}

/// Split a raw block into non-blank, newline-delimited entity blocks
pub fn split_blocks(raw: &str) -> impl Iterator<Item = &str> {
    raw.lines().map(str::trim).filter(|line| !line.is_empty())
}

/// Tokenize a single block (or an entire multi-line output) into pairs
///
/// Never fails. Groups with an empty name and an unterminated trailing `(`
/// are dropped.
pub fn tokenize(block: &str) -> Vec<FieldPair> {
    let mut pairs = Vec::new();
    let mut state = State::Name;
    let mut name = String::new();
    let mut value = String::new();

    for c in block.chars() {
        match state {
            State::Name | State::AfterName => match c {
                '(' => {
                    value.clear();
                    state = State::Value;
                }
                ')' => {
                    // stray close paren outside a group
                    name.clear();
                    state = State::Name;
                }
                c if c.is_whitespace() => {
                    if !name.is_empty() {
                        state = State::AfterName;
                    }
                }
                c => {
                    if state == State::AfterName {
                        name.clear();
                        state = State::Name;
                    }
                    name.push(c);
                }
            },
            State::Value => {
                if c == ')' {
                    let key = name.trim();
                    if !key.is_empty() {
                        pairs.push(FieldPair::new(key, value.trim()));
                    }
                    name.clear();
                    value.clear();
                    state = State::Name;
                } else {
                    value.push(c);
                }
            }
        }
    }

    pairs
}
