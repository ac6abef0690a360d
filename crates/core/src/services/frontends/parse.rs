//! Lightweight lexical analysis of C/C++ text.
//!
//! This is not a parser: it masks comments, literals and preprocessor lines,
//! checks brace balance, and finds top-level function definitions by looking
//! at the text preceding each opening brace.

use std::sync::OnceLock;

use regex::Regex;

/// A function definition found in a unit. Line numbers are 0-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSpan {
    pub name: String,
    /// First line of the declarator (return type, name, parameters).
    pub header_line: usize,
    /// Line holding the opening brace of the body.
    pub open_line: usize,
    /// Line holding the closing brace of the body.
    pub close_line: usize,
}

const NOT_FUNCTIONS: [&str; 10] =
    ["if", "for", "while", "switch", "return", "sizeof", "catch", "do", "else", "defined"];

fn function_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?s)^[^=(]*?\b([A-Za-z_]\w*)\s*\(.*\)\s*(?:const\s*)?(?:noexcept\s*)?(?:override\s*)?(?:->\s*[\w:<>,\s\*&]+)?$",
        )
        .expect("function regex")
    })
}

fn transparent_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(?:(?:inline\s+)?namespace\b.*|extern)$").expect("scope regex"))
}

fn attribute_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"__attribute__\s*\(\(.*?\)\)").expect("attribute regex"))
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum State {
    Code,
    LineComment,
    BlockComment,
    Str,
    Char,
    Preproc,
}

/// Replace comments, string/char literals and preprocessor lines with spaces.
///
/// Newlines are kept, so line numbers in the result match the input.
pub fn mask(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut state = State::Code;
    let mut at_line_start = true;
    let mut prev = '\0';
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\n' {
            out.push('\n');
            state = match state {
                State::LineComment | State::Str | State::Char => State::Code,
                State::Preproc if prev != '\\' => State::Code,
                other => other,
            };
            at_line_start = true;
            prev = c;
            continue;
        }

        match state {
            State::Code => {
                if at_line_start && c == '#' {
                    state = State::Preproc;
                    out.push(' ');
                } else if c == '/' && chars.peek() == Some(&'/') {
                    chars.next();
                    state = State::LineComment;
                    out.push_str("  ");
                } else if c == '/' && chars.peek() == Some(&'*') {
                    chars.next();
                    state = State::BlockComment;
                    out.push_str("  ");
                } else if c == '"' {
                    state = State::Str;
                    out.push(' ');
                } else if c == '\'' {
                    state = State::Char;
                    out.push(' ');
                } else {
                    out.push(c);
                }
                at_line_start = at_line_start && c.is_whitespace();
            }
            State::LineComment => out.push(' '),
            State::BlockComment => {
                if c == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    state = State::Code;
                    out.push_str("  ");
                } else {
                    out.push(' ');
                }
            }
            State::Preproc => {
                if c == '/' && chars.peek() == Some(&'*') {
                    chars.next();
                    state = State::BlockComment;
                    out.push_str("  ");
                } else {
                    out.push(' ');
                }
            }
            State::Str | State::Char => {
                let quote = if state == State::Str { '"' } else { '\'' };
                if c == '\\' {
                    out.push(' ');
                    match chars.next() {
                        Some('\n') => out.push('\n'),
                        Some(_) => out.push(' '),
                        None => {}
                    }
                } else {
                    if c == quote {
                        state = State::Code;
                    }
                    out.push(' ');
                }
            }
        }
        if !c.is_whitespace() || c == '\\' {
            prev = c;
        }
    }
    out
}

/// Check that braces balance in already-masked text.
pub fn check_balance(masked: &str) -> Result<(), String> {
    let mut depth: i64 = 0;
    for (line_no, line) in masked.lines().enumerate() {
        for c in line.chars() {
            match c {
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth < 0 {
                        return Err(format!("unmatched '}}' on line {}", line_no + 1));
                    }
                }
                _ => {}
            }
        }
    }
    if depth > 0 {
        return Err(format!("{depth} unclosed '{{' at end of file"));
    }
    Ok(())
}

enum BlockKind {
    /// `namespace` / `extern "C"` bodies; definitions inside count as top level.
    Transparent,
    /// Function name and byte offset of its declarator in the prelude.
    Function(String, usize),
    Other,
}

fn declarator_name(segment: &str) -> Option<String> {
    let stripped = attribute_re().replace_all(segment.trim(), " ");
    let caps = function_re().captures(stripped.trim())?;
    let name = caps[1].to_string();
    (!NOT_FUNCTIONS.contains(&name.as_str())).then_some(name)
}

/// Classify the text before an opening brace.
///
/// `boundaries` are prelude offsets just past a line that ends in a complete
/// top-level call, such as `DECLARE_TABLE(foo)` with no trailing `;`. The
/// declarator after the latest boundary wins; the whole prelude is tried last.
fn classify(prelude: &str, boundaries: &[usize]) -> BlockKind {
    if transparent_re().is_match(prelude.trim()) {
        return BlockKind::Transparent;
    }
    for &start in boundaries.iter().rev().chain(std::iter::once(&0)) {
        let segment = &prelude[start..];
        if let Some(name) = declarator_name(segment) {
            let offset = start + segment.len() - segment.trim_start().len();
            return BlockKind::Function(name, offset);
        }
    }
    BlockKind::Other
}

struct Frame {
    transparent: bool,
    function: Option<(String, usize, usize)>,
}

/// Text between the last `;`, `{` or `}` and the current position.
#[derive(Default)]
struct Prelude {
    text: String,
    /// Line the prelude text starts on.
    origin: usize,
    boundaries: Vec<usize>,
    parens: i64,
}

impl Prelude {
    fn restart(&mut self, line: usize) {
        self.text.clear();
        self.boundaries.clear();
        self.parens = 0;
        self.origin = line;
    }

    fn line_of(&self, offset: usize) -> usize {
        self.origin + self.text[..offset].matches('\n').count()
    }
}

/// Find top-level function definitions in a unit, ordered by position.
pub fn scan_functions(text: &str) -> Vec<FunctionSpan> {
    let masked = mask(text);
    let mut spans = Vec::new();
    let mut frames: Vec<Frame> = Vec::new();
    let mut prelude = Prelude::default();
    let mut line = 0usize;

    for c in masked.chars() {
        match c {
            '{' => {
                let at_top = frames.iter().all(|f| f.transparent);
                let kind = if at_top {
                    classify(&prelude.text, &prelude.boundaries)
                } else {
                    BlockKind::Other
                };
                let frame = match kind {
                    BlockKind::Transparent => Frame { transparent: true, function: None },
                    BlockKind::Function(name, offset) => Frame {
                        transparent: false,
                        function: Some((name, prelude.line_of(offset), line)),
                    },
                    BlockKind::Other => Frame { transparent: false, function: None },
                };
                frames.push(frame);
                prelude.restart(line);
            }
            '}' => {
                if let Some(Frame { function: Some((name, header_line, open_line)), .. }) =
                    frames.pop()
                {
                    spans.push(FunctionSpan { name, header_line, open_line, close_line: line });
                }
                prelude.restart(line);
            }
            ';' => prelude.restart(line),
            '\n' => {
                if prelude.parens == 0 && prelude.text.trim_end().ends_with(')') {
                    prelude.boundaries.push(prelude.text.len());
                }
                line += 1;
                prelude.text.push('\n');
            }
            _ => {
                match c {
                    '(' => prelude.parens += 1,
                    ')' => prelude.parens -= 1,
                    _ => {}
                }
                prelude.text.push(c);
            }
        }
    }

    spans.sort_by_key(|s| s.header_line);
    spans
}
