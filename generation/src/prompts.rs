//! Prompt builders, one per generation operation.

use nb_core::{ContinuationContext, DetailLevel, NoteContent};

pub const NOTE_SYSTEM_INSTRUCTION: &str = "Output valid JSON. Ensure LaTeX backslashes are escaped \
     properly for JSON string format. For SVGs, ensure they are self-contained.";

pub const EDITOR_SYSTEM_INSTRUCTION: &str =
    "You are an expert editor. Output valid JSON. Prioritize coherence and flow.";

fn detail_instruction(detail: DetailLevel) -> &'static str {
    match detail {
        DetailLevel::Strict => {
            "MODE: STRICT SCRIBE.\nConstraint: Do NOT add external knowledge. Polished version of input only."
        }
        DetailLevel::Expanded => {
            "MODE: EXPANDED TUTOR.\nConstraint: Provide necessary context to make the concept clear."
        }
    }
}

/// Char-safe prefix of `text`.
fn prefix(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

pub fn note_system_instruction(domain: &str) -> String {
    format!("You are a specialized {domain} Assistant. {NOTE_SYSTEM_INSTRUCTION}")
}

pub fn generate_note(
    domain: &str,
    detail: DetailLevel,
    prior_context: Option<&str>,
    prior_context_chars: usize,
) -> String {
    let context_instruction = match prior_context.filter(|ctx| !ctx.trim().is_empty()) {
        Some(ctx) => format!(
            "PREVIOUS NOTE CONTEXT: {}...\nEnsure coherence. Do not repeat basic definitions.",
            prefix(ctx, prior_context_chars)
        ),
        None => "No previous context. Treat this as the start of a new topic.".to_string(),
    };

    format!(
        "You are an expert {domain} Assistant.
Analyze the provided input (slide, blackboard, handwritten notes).

{detail}
{context_instruction}

Requirements:
1. Identify Main Lesson/Subtopic.
2. Real World Analogy (1-2 lines).
3. Conceptual Logic (The 'Why').
4. Core Content:
   - Condensed Review: Key bullets.
   - Extended Explanation: Markdown/LaTeX text.
5. Extract 'classProblems' if found.
   - Analyze 'Given', 'Formulas', 'Tricks', solutions.
   - Check UNIT CONSISTENCY (set unitStatus.safe).
   - USE LATEX for math ($...$ or $$...$$).
6. GRAPH/DIAGRAM DIGITIZER: If input has a diagram, generate semantic SVG code in 'visuals' array.",
        detail = detail_instruction(detail),
    )
}

pub fn integrate(existing: &NoteContent, new_text: &str) -> String {
    let existing_json = serde_json::to_string(existing).unwrap_or_default();
    format!(
        "You are a Senior Technical Editor and Tutor.

Task: INTEGRATE new content into an existing note to create a single, cohesive document.

EXISTING NOTE:
{existing_json}

NEW INPUT INSTRUCTIONS:
{new_text}

Rules for Integration:
1. TEXT (extendedExplanation, conceptualLogic, analogy):
   - Do NOT just append the new text to the end.
   - REWRITE the content to weave the new information in naturally.
   - If the new input clarifies a concept mentioned earlier, update the earlier section.
   - If it adds a new step to a derivation, insert it in the correct logical order.
2. PRESERVATION:
   - Do NOT change the 'title' or 'subtopic' unless the new input explicitly says \"Change topic to X\".
3. PROBLEMS (classProblems):
   - Return an array containing ONLY the problems found in this specific new input/image.
   - Do NOT include the old problems in the output.
4. VISUALS (visuals):
   - Return an array containing ONLY the NEW visuals found in this input.

Output valid JSON matching the schema."
    )
}

pub fn continuation(previous: &ContinuationContext) -> String {
    format!(
        "Compare the New Input with the Previous Note Content.

Previous Note Context:
Title: {title}
Subtopic: {subtopic}
Last few lines of explanation: {tail}

Task:
Determine if the \"New Input\" is a DIRECT CONTINUATION of the \"Previous Note\".

Return TRUE if:
- It is the next slide of the same specific lecture topic.
- It is a continuation of a math derivation started in the previous note.
- It adds more details/diagrams to the *exact same* subtopic.

Return FALSE if:
- It is a completely new subtopic (e.g. moved from Velocity to Acceleration).
- It is a new Example Problem that stands alone.
- The content is unrelated.",
        title = previous.title,
        subtopic = previous.subtopic,
        tail = previous.explanation_tail,
    )
}

pub fn extract_problems() -> &'static str {
    "Extract ONLY the problems from this input.
Do NOT generate analogies, conceptual logic, or summaries.
Focus strictly on parsing the Question, Given values, Formulas needed, and the Step-by-Step Solution.
Format math with LaTeX."
}

pub fn summarize(content: &NoteContent) -> String {
    let content_json = serde_json::to_string(content).unwrap_or_default();
    format!(
        "Task: Create a \"Summarized/Cheat Sheet\" version of this note.

Input Content:
{content_json}

Rules for Summarization:
1. Title & Subtopic: Keep identical.
2. Conceptual Logic: Compress to 1-2 lines maximum. Just the core intuition.
3. Analogy: Keep if short, otherwise remove (N/A).
4. Extended Explanation: EMPTY string. Do not include long derivations.
5. Condensed Review: Keep only the most critical formulas/definitions.
6. Problems:
   - Keep the Question.
   - Keep the Math Solution (LaTeX).
   - REMOVE the text-based explanation steps. Just the math.
7. Visuals: Return empty array.

Output strictly JSON matching the schema."
    )
}

pub fn practice_set(topic: &str, context: &str) -> String {
    format!(
        "Generate 3 practice problems for the topic: \"{topic}\".
Context from notes: {context}

1. Easy: Mechanical, shows steps immediately.
2. Medium: Exam-standard difficulty.
3. Hard: Cumulative/Integrative (combines current topic with previous concepts).

Include specific 'Tricks' for solving them effectively.
Analyze unit consistency for each problem.
Use LaTeX for math."
    )
}

pub fn parse_raw_text(text: &str, domain: &str) -> String {
    format!(
        "You are a {domain} note organizer.
Structure the following pasted notes into the note schema WITHOUT rewriting them.

Rules:
1. extendedExplanation: the pasted text exactly as given.
2. title / subtopic: taken from the headings or first lines of the text.
3. condensedReview: key formulas and definitions already present in the text.
4. analogy / conceptualLogic: short, derived only from the text.
5. classProblems: only problems explicitly present in the text.
6. visuals: empty array.

Pasted Text:
{text}"
    )
}

pub fn syllabus() -> &'static str {
    "Analyze the provided syllabus or course outline.
Extract a structured list of the main Chapters/Modules AND their explicit subtopics.
If subtopics are not explicitly listed, try to infer main key concepts as subtopics.

Output Format:
[{ title: \"Chapter 1\", subtopics: [\"Topic A\", \"Topic B\"] }, ...]"
}

fn joined_digests(digests: &[String]) -> String {
    digests.join("\n\n---\n\n")
}

pub fn summary_table(digests: &[String]) -> String {
    format!(
        "Create a Master Summary Table for this chapter based on the following notes content.
Include columns for: Concept/Quantity, Symbol, Formula, SI Unit, and Key Insight.
Output in Markdown Table format.

Notes Content:
{}",
        joined_digests(digests)
    )
}

pub fn cheat_sheet(digests: &[String]) -> String {
    format!(
        "Create a Formula Cheat Sheet for the following notes.
Group formulas by sub-topic.
For each formula, list:
- The LaTeX equation
- Variable definitions
- SI Units
- Common constants used

Format nicely in Markdown with headers.

Notes Content:
{}",
        joined_digests(digests)
    )
}

pub fn transform_selection(selected: &str, instruction: &str) -> String {
    format!(
        "You are a specialized technical editor.
Task: Transform the selected text based on the user's instruction.

User Instruction: \"{instruction}\"
Selected Text: \"{selected}\"

Rules:
1. ONLY return the transformed text. Do not add conversational filler.
2. Maintain the subject context and accuracy.
3. If the user asks to \"fix grammar\", make it professional and academic.
4. If the user asks to \"expand\", add relevant details but keep it concise.
5. Use LaTeX ($...$) for any math variables."
    )
}
