//! Targeted document patching.
//!
//! Edit-mode updates arrive as REPLACE/ORIGINAL/SET instruction groups (or a
//! single FULL_REWRITE). Instructions are applied in order against the
//! evolving document: exact substring match first, otherwise the best
//! same-sized line window scored with a `similar` diff ratio. Windows that
//! score below the configured threshold are skipped, never force-applied.

use similar::TextDiff;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditInstruction {
    Replace { original: String, replacement: String },
    FullRewrite(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PatchOutcome {
    pub content: String,
    pub applied: usize,
    pub skipped: usize,
    pub rewritten: bool,
}

impl PatchOutcome {
    /// False means the document is byte-identical to what came in.
    pub fn changed(&self) -> bool {
        self.rewritten || self.applied > 0
    }
}

#[derive(PartialEq)]
enum Marker {
    Replace,
    Original,
    Set,
    FullRewrite,
}

/// Marker lines arrive wrapped in whatever comment syntax the artifact
/// language uses (`# SET`, `// SET`, `<!-- SET -->`).
fn marker_of(line: &str) -> Option<Marker> {
    let mut text = line.trim();
    for prefix in ["#", "//", "<!--", "--"] {
        if let Some(rest) = text.strip_prefix(prefix) {
            text = rest;
            break;
        }
    }
    let text = text.trim().trim_end_matches("-->").trim();
    match text {
        "REPLACE" => Some(Marker::Replace),
        "ORIGINAL" => Some(Marker::Original),
        "SET" => Some(Marker::Set),
        "FULL_REWRITE" => Some(Marker::FullRewrite),
        _ => None,
    }
}

/// Parse the body of one fenced code block into edit instructions. A block
/// may hold several REPLACE groups; a FULL_REWRITE marker claims everything
/// after it.
pub fn parse_instructions(text: &str) -> Vec<EditInstruction> {
    enum State {
        Idle,
        Original,
        Set,
    }

    let mut instructions = Vec::new();
    let mut state = State::Idle;
    let mut original: Vec<&str> = Vec::new();
    let mut replacement: Vec<&str> = Vec::new();

    let mut lines = text.lines();
    while let Some(line) = lines.next() {
        match marker_of(line) {
            Some(Marker::FullRewrite) => {
                let rest: Vec<&str> = lines.collect();
                instructions.push(EditInstruction::FullRewrite(rest.join("\n")));
                return instructions;
            }
            Some(Marker::Replace) => {
                flush(&mut instructions, &mut original, &mut replacement, &state);
                state = State::Idle;
            }
            Some(Marker::Original) => {
                flush(&mut instructions, &mut original, &mut replacement, &state);
                state = State::Original;
            }
            Some(Marker::Set) => state = State::Set,
            None => match state {
                State::Idle => {}
                State::Original => original.push(line),
                State::Set => replacement.push(line),
            },
        }
    }

    flush(&mut instructions, &mut original, &mut replacement, &state);
    return instructions;

    fn flush(
        instructions: &mut Vec<EditInstruction>,
        original: &mut Vec<&str>,
        replacement: &mut Vec<&str>,
        state: &State,
    ) {
        // A group is only complete once the SET section has been seen.
        if matches!(state, State::Set) && !original.is_empty() {
            instructions.push(EditInstruction::Replace {
                original: original.join("\n"),
                replacement: replacement.join("\n"),
            });
        }
        original.clear();
        replacement.clear();
    }
}

/// Apply `instructions` in order against `document`. Each instruction sees
/// the result of the previous ones. Returns the final content along with
/// applied/skipped counts; the caller decides whether to persist anything.
pub fn apply_instructions(
    document: &str,
    instructions: &[EditInstruction],
    threshold: f64,
) -> PatchOutcome {
    let mut content = document.to_string();
    let mut applied = 0;
    let mut skipped = 0;
    let mut rewritten = false;

    for instruction in instructions {
        match instruction {
            EditInstruction::FullRewrite(new_content) => {
                content = new_content.clone();
                rewritten = true;
            }
            EditInstruction::Replace {
                original,
                replacement,
            } => {
                if original.trim().is_empty() {
                    skipped += 1;
                    continue;
                }
                match locate(&content, original, threshold) {
                    Some(range) => {
                        content.replace_range(range, replacement);
                        applied += 1;
                    }
                    None => skipped += 1,
                }
            }
        }
    }

    PatchOutcome {
        content,
        applied,
        skipped,
        rewritten,
    }
}

/// Byte range of the region `fragment` refers to. Exact occurrence wins;
/// otherwise the best window of the same line count, provided it clears the
/// threshold. The earliest window wins ties so repeated structures resolve
/// deterministically.
fn locate(document: &str, fragment: &str, threshold: f64) -> Option<std::ops::Range<usize>> {
    if let Some(start) = document.find(fragment) {
        return Some(start..start + fragment.len());
    }

    let spans = line_spans(document);
    let window = fragment.lines().count();
    if window == 0 || spans.len() < window {
        return None;
    }

    let mut best: Option<(f64, std::ops::Range<usize>)> = None;
    for i in 0..=(spans.len() - window) {
        let start = spans[i].0;
        let end = spans[i + window - 1].1;
        let candidate = &document[start..end];
        let score = f64::from(TextDiff::from_chars(fragment, candidate).ratio());
        let beats = match &best {
            Some((top, _)) => score > *top,
            None => true,
        };
        if beats {
            best = Some((score, start..end));
        }
    }

    best.and_then(|(score, range)| (score >= threshold).then_some(range))
}

/// Byte span of each line, newline excluded.
fn line_spans(document: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut start = 0;
    for line in document.split_inclusive('\n') {
        let end = start + line.trim_end_matches(['\n', '\r']).len();
        spans.push((start, end));
        start += line.len();
    }
    spans
}
