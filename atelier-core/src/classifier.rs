//! Multiple-choice intent classification.
//!
//! One generation call per invocation: the model gets a numbered option
//! list and must answer with an index. Anything that does not parse to an
//! in-range index is treated as "no match", never as an error.

use atelier_kernel::ports::{EventSink, GenerationOptions, GenerationPort, GenerationRequest};

/// Ask the model to pick one of `options`. Returns the chosen index, or
/// `None` when the answer is missing, malformed, or out of range.
pub fn multichoice(
    port: &dyn GenerationPort,
    question: &str,
    options: &[String],
    context: &str,
    events: &dyn EventSink,
) -> Option<usize> {
    let mut prompt = String::new();
    if !context.trim().is_empty() {
        prompt.push_str(context.trim());
        prompt.push_str("\n\n");
    }
    prompt.push_str(question);
    prompt.push('\n');
    for (index, option) in options.iter().enumerate() {
        prompt.push_str(&format!("{index}. {option}\n"));
    }
    prompt.push_str("\nAnswer with the number of the selected statement and nothing else.\n");

    let request = GenerationRequest::new(
        "You are a precise classifier. Answer with a single number.",
        prompt,
    )
    .with_options(GenerationOptions {
        max_tokens: Some(16),
        ..GenerationOptions::default()
    });

    let answer = match port.generate(request, events) {
        Ok(answer) => answer,
        Err(err) => {
            events.warn(&format!("classification failed: {err}"));
            return None;
        }
    };

    parse_choice(&answer, options.len())
}

/// First integer in the answer, bounds-checked against the option count.
pub fn parse_choice(answer: &str, option_count: usize) -> Option<usize> {
    let mut digits = String::new();
    for c in answer.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
        } else if !digits.is_empty() {
            break;
        }
    }

    let index: usize = digits.parse().ok()?;
    (index < option_count).then_some(index)
}
