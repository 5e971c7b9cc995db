//! Response schemas in the Gemini OpenAPI subset.

use serde_json::{Value, json};

fn unit_status() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "safe": {
                "type": "BOOLEAN",
                "description": "True if all units in 'Given' are consistent (SI or compatible). False if conversion is required (e.g. cm to m)."
            },
            "warning": {
                "type": "STRING",
                "description": "Short warning message if unsafe, e.g. 'Convert cm to m'."
            }
        },
        "required": ["safe"]
    })
}

pub fn problem() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "question": { "type": "STRING" },
            "given": { "type": "ARRAY", "items": { "type": "STRING" } },
            "formulas": { "type": "ARRAY", "items": { "type": "STRING" } },
            "solutionSteps": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "description": "Step by step with full textual explanation"
            },
            "solutionMath": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "description": "Just the LaTeX math steps"
            },
            "trick": {
                "type": "STRING",
                "description": "Heuristic or shortcut to solve this type of problem"
            },
            "answer": { "type": "STRING", "description": "Final answer with units" },
            "unitStatus": unit_status()
        },
        "required": ["question", "given", "formulas", "solutionSteps", "solutionMath", "answer", "unitStatus"]
    })
}

pub fn problems_only() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "problems": { "type": "ARRAY", "items": problem() }
        },
        "required": ["problems"]
    })
}

pub fn note() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "title": { "type": "STRING" },
            "subtopic": { "type": "STRING" },
            "analogy": {
                "type": "STRING",
                "description": "1-2 lines connecting the abstract concept to reality"
            },
            "conceptualLogic": { "type": "STRING", "description": "The 'why' before the 'how'" },
            "condensedReview": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "description": "High-yield bullet points for cramming"
            },
            "extendedExplanation": {
                "type": "STRING",
                "description": "Deep dive derivation and context in Markdown/LaTeX"
            },
            "classProblems": { "type": "ARRAY", "items": problem() },
            "visuals": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "description": "Array of SVG strings. If input has a graph/diagram, generate a clean minimalist SVG (<svg>...</svg>). If no visual, return empty array."
            }
        },
        "required": [
            "title", "subtopic", "analogy", "conceptualLogic", "condensedReview",
            "extendedExplanation", "classProblems", "visuals"
        ]
    })
}

pub fn continuation() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "isContinuation": {
                "type": "BOOLEAN",
                "description": "True if the new input is a direct continuation (part 2, next slide, same derivation) of the previous note."
            },
            "reasoning": { "type": "STRING" }
        },
        "required": ["isContinuation"]
    })
}

pub fn practice_set() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "easy": problem(),
            "medium": problem(),
            "hard": problem()
        },
        "required": ["easy", "medium", "hard"]
    })
}

pub fn syllabus() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "modules": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "title": { "type": "STRING", "description": "Chapter Title (e.g., 'Kinematics')" },
                        "subtopics": {
                            "type": "ARRAY",
                            "items": { "type": "STRING" },
                            "description": "List of explicit subtopics (e.g., 'Velocity', 'Acceleration')"
                        }
                    },
                    "required": ["title", "subtopics"]
                },
                "description": "List of modules/chapters found in the syllabus"
            }
        },
        "required": ["modules"]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_schema_nests_problem_schema() {
        let schema = note();
        assert_eq!(
            schema["properties"]["classProblems"]["items"]["properties"]["unitStatus"]["required"],
            json!(["safe"])
        );
    }

    #[test]
    fn test_practice_set_requires_all_levels() {
        assert_eq!(practice_set()["required"], json!(["easy", "medium", "hard"]));
    }
}
