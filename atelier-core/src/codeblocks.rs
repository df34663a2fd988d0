//! Markdown code fence extraction.
//!
//! Every generation step asks the model to answer inside a fenced code
//! block; this module pulls those blocks back out. Truncated responses are
//! common with long documents, so an unterminated final fence still yields
//! a block.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlock {
    /// The fence info string, lowercased; empty when the fence was bare.
    pub language: String,
    pub content: String,
}

impl CodeBlock {
    pub fn matches_language(&self, language: &str) -> bool {
        self.language.is_empty() || self.language == language.to_ascii_lowercase()
    }
}

/// Extract every triple-backtick fenced block from `text`, in order.
pub fn extract_code_blocks(text: &str) -> Vec<CodeBlock> {
    let mut blocks = Vec::new();
    let mut current: Option<CodeBlock> = None;

    for line in text.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with("```") {
            match current.take() {
                Some(mut block) => {
                    // Closing fence. Drop the trailing newline the loop added.
                    if block.content.ends_with('\n') {
                        block.content.pop();
                    }
                    blocks.push(block);
                }
                None => {
                    let info = trimmed.trim_start_matches('`').trim();
                    current = Some(CodeBlock {
                        language: info.to_ascii_lowercase(),
                        content: String::new(),
                    });
                }
            }
            continue;
        }

        if let Some(block) = current.as_mut() {
            block.content.push_str(line);
            block.content.push('\n');
        }
    }

    // A cut-off response leaves the last fence open; keep what we got.
    if let Some(mut block) = current {
        if block.content.ends_with('\n') {
            block.content.pop();
        }
        if !block.content.is_empty() {
            blocks.push(block);
        }
    }

    blocks
}

/// First block matching `language`, falling back to the first block of any
/// language. Returns `None` when the response carried no fences at all.
pub fn first_block<'a>(blocks: &'a [CodeBlock], language: &str) -> Option<&'a CodeBlock> {
    blocks
        .iter()
        .find(|b| b.matches_language(language))
        .or_else(|| blocks.first())
}
