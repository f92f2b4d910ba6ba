use serde::Serialize;
use tracing::warn;

const OBJECTIVE_MARKER: &str = "Objective Questions:";
const SUBJECTIVE_MARKER: &str = "Short Answer Questions:";

/// Questions extracted from a model reply, in reply order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ParsedQuestions {
    pub objective: Vec<String>,
    pub subjective: Vec<String>,
}

/// Extract the two question lists from a free-form model reply.
///
/// Best-effort and format-coupled by design: the reply must contain both
/// section markers, and only lines carrying a digit in their first two
/// characters count as questions. A reply missing either marker yields two
/// empty lists, never an error; the miss is only logged. The parsing strategy
/// lives behind this function so it can be swapped without touching the
/// pipeline.
pub fn parse_questions(reply: &str) -> ParsedQuestions {
    if !reply.contains(OBJECTIVE_MARKER) || !reply.contains(SUBJECTIVE_MARKER) {
        warn!("Model reply is missing a section marker, returning no questions");
        return ParsedQuestions::default();
    }

    let (before, after) = match reply.split_once(SUBJECTIVE_MARKER) {
        Some(parts) => parts,
        None => return ParsedQuestions::default(),
    };

    let objective_part = before.replace(OBJECTIVE_MARKER, "");

    // Should the model repeat the short-answer marker, only the segment up to
    // the next occurrence counts as subjective questions.
    let subjective_part = match after.find(SUBJECTIVE_MARKER) {
        Some(i) => &after[..i],
        None => after,
    };

    ParsedQuestions {
        objective: extract_numbered_lines(&objective_part),
        subjective: extract_numbered_lines(subjective_part),
    }
}

/// Keep lines whose first two characters contain an ASCII digit, stripping a
/// leading "N. " prefix when one appears within the first three characters.
///
/// Known quirk, deliberately kept: a line that merely *starts* with a digit
/// ("3D printing builds parts layer by layer") also passes the filter and is
/// kept verbatim.
fn extract_numbered_lines(segment: &str) -> Vec<String> {
    segment
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter(|line| line.chars().take(2).any(|c| c.is_ascii_digit()))
        .map(|line| {
            let question = line.trim();
            let head: String = question.chars().take(3).collect();
            if head.contains(". ") {
                match question.find(". ") {
                    Some(i) => question[i + 2..].to_string(),
                    None => question.to_string(),
                }
            } else {
                question.to_string()
            }
        })
        .collect()
}
