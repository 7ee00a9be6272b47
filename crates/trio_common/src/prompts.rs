//! Role prompts for Planner and Reviewer

use crate::draft::Draft;

pub const PLANNER_SYSTEM_PROMPT: &str = r#"You are Planner. Create a first draft for tags + summary.
Return ONLY a JSON object with keys: tags, summary.
Constraints:
- tags: array of exactly 3 short topical tags (2-4 words each if possible)
- summary: ONE sentence, <= 25 words
- No extra keys, no commentary, no markdown.
Do not hardcode any domain; infer from the given title/content.
"#;

pub const REVIEWER_SYSTEM_PROMPT: &str = r#"You are Reviewer. Review Planner's JSON and improve relevance/clarity.
RETURN EXACTLY and ONLY a JSON object with keys: tags, summary.
- tags: an array of exactly 3 topical tags (strings).
- summary: ONE sentence, 25 words max.
NO extra keys, NO commentary, NO markdown, NO surrounding text.
Infer tags & summary only from TITLE and CONTENT provided.
"#;

/// Prepended to the Reviewer context after an unusable answer
pub const REPAIR_INSTRUCTION: &str = r#"IMPORTANT: The previous output did not follow the required JSON shape. Return ONLY and EXACTLY: {"tags": ["tag1","tag2","tag3"], "summary": "one sentence <=25 words"}. Do not include any other keys or commentary. Repair the JSON now."#;

fn title_content_block(title: &str, content: &str) -> String {
    format!("TITLE:\n{}\n\nCONTENT:\n{}", title, content)
}

pub fn build_planner_prompt(title: &str, content: &str) -> String {
    format!(
        "{}\n\n{}\n\nReturn the JSON now.",
        PLANNER_SYSTEM_PROMPT,
        title_content_block(title, content)
    )
}

pub fn build_reviewer_prompt(title: &str, content: &str, draft: &Draft) -> String {
    format!(
        "{}\n\n{}\n\nPLANNER_JSON:\n{}\n\nReturn the improved JSON now.",
        REVIEWER_SYSTEM_PROMPT,
        title_content_block(title, content),
        draft.to_json()
    )
}

pub fn build_repair_prompt(title: &str, content: &str, draft: &Draft) -> String {
    format!(
        "{}\n\n{}\n\n{}\n\nPLANNER_JSON:\n{}\n",
        REVIEWER_SYSTEM_PROMPT,
        REPAIR_INSTRUCTION,
        title_content_block(title, content),
        draft.to_json()
    )
}
