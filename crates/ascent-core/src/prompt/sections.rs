//! Individual prompt sections.
//!
//! Each section is a pure function of the prompt input. `None` means the
//! section has nothing to say and is left out entirely.

use indoc::indoc;
use std::fmt::Write as _;

use super::PromptInput;
use crate::storage::PromptConfig;

const ROLE: &str = indoc! {"
    You are the Ascent guide: a private coach for founders and families building
    durable, multi-generational wealth. You know the curriculum below in depth and
    you speak to the user as a peer who has walked the path."};

/// Old-paradigm vs new-paradigm contrasts the guide reinforces.
const CONTRASTS: [(&str, &str, &str); 4] = [
    (
        "Employee",
        "Owner",
        "owners buy back their time with systems instead of selling it by the hour",
    ),
    (
        "Income",
        "Asset",
        "assets compound while you sleep; income stops when you do",
    ),
    (
        "Saving",
        "Allocating",
        "every dollar gets a job inside a written investment policy",
    ),
    (
        "Scarcity",
        "Stewardship",
        "wealth is a responsibility to structure, protect and pass on",
    ),
];

const CONSTRAINTS: &str = indoc! {"
    HOW TO RESPOND:
    - Answer the question the user is actually asking; use the activity above only to sharpen it.
    - Ground advice in the curriculum. Name the module or lesson you are drawing on.
    - Use what you know about the user, but never recite their personal details back at them.
    - Keep it under 150 words unless the user asks for depth.
    - You are not a licensed advisor. For legal, tax or investment execution, tell the user to
      bring the question to their professional team.
    - Never invent figures about the user's finances."};

/// Shorten `text` to at most `budget` characters, marking the cut with `...`.
pub(crate) fn truncate_chars(text: &str, budget: usize) -> String {
    let text = text.trim();
    if text.chars().count() <= budget {
        return text.to_string();
    }
    let cut: String = text.chars().take(budget).collect();
    format!("{}...", cut.trim_end())
}

pub fn knowledge(input: &PromptInput<'_>, config: &PromptConfig) -> Option<String> {
    let mut out = String::from(ROLE);

    if !input.curriculum.pillars.is_empty() {
        out.push_str("\n\nCURRICULUM:");
        for pillar in &input.curriculum.pillars {
            let _ = write!(out, "\n## {} ({})", pillar.title, pillar.id);
            if !pillar.description.is_empty() {
                let _ = write!(out, "\n{}", pillar.description.trim());
            }
            for lesson in pillar.lessons.iter().take(2) {
                let summary = truncate_chars(&lesson.summary, config.lesson_summary_chars);
                if summary.is_empty() {
                    let _ = write!(out, "\n- {}", lesson.title);
                } else {
                    let _ = write!(out, "\n- {}: {}", lesson.title, summary);
                }
            }
        }
    }

    out.push_str("\n\nTHINKING SHIFTS:");
    for (from, to, gist) in CONTRASTS {
        let _ = write!(out, "\n- {from} thinking vs {to} thinking: {gist}.");
    }
    Some(out)
}

pub fn personalization(input: &PromptInput<'_>, config: &PromptConfig) -> Option<String> {
    let ctx = input.life_context?;
    let mut lines: Vec<String> = Vec::new();

    if let Some(spouse) = ctx.spouse_name.as_deref().filter(|s| !s.is_empty()) {
        lines.push(format!("- Spouse: {spouse}"));
    }
    if !ctx.children.is_empty() {
        lines.push(format!("- Children: {}", ctx.children.join(", ")));
    }
    if let Some(company) = ctx.company_name.as_deref().filter(|s| !s.is_empty()) {
        lines.push(format!("- Company: {company}"));
    }
    if let Some(industry) = ctx.industry.as_deref().filter(|s| !s.is_empty()) {
        lines.push(format!("- Industry: {industry}"));
    }
    if !ctx.goals.is_empty() {
        lines.push(format!("- Goals: {}", ctx.goals.join("; ")));
    }
    if !ctx.fears.is_empty() {
        lines.push(format!("- Fears: {}", ctx.fears.join("; ")));
    }
    let insights = ctx.recent_insights(config.max_insights);
    if !insights.is_empty() {
        lines.push("- Recent insights:".to_string());
        for insight in insights {
            lines.push(format!(
                "  - {} ({})",
                insight.text,
                insight.created_at.format("%Y-%m-%d")
            ));
        }
    }

    if lines.is_empty() {
        return None;
    }
    Some(format!("ABOUT THIS USER:\n{}", lines.join("\n")))
}

pub fn activity(input: &PromptInput<'_>, _config: &PromptConfig) -> Option<String> {
    let s = input.activity;
    let mut out = String::from("CURRENT ACTIVITY:");
    let _ = write!(out, "\n- Page: {}", s.current_path);
    let _ = write!(out, "\n- Time on page: {}s", s.time_on_current_path_secs);
    let _ = write!(out, "\n- Scroll depth: {}%", s.scroll_depth);

    if let Some(module_id) = &s.current_module_id {
        match input.curriculum.pillar(module_id) {
            Some(pillar) => {
                let _ = write!(out, "\n- Module: {} ({module_id})", pillar.title);
            }
            None => {
                let _ = write!(out, "\n- Module: {module_id}");
            }
        }
    }
    if let Some(unit_id) = &s.current_unit_id {
        let lesson = s
            .current_module_id
            .as_deref()
            .and_then(|m| input.curriculum.pillar(m))
            .zip(unit_id.parse::<usize>().ok())
            .and_then(|(pillar, idx)| pillar.lessons.get(idx));
        match lesson {
            Some(lesson) => {
                let _ = write!(out, "\n- Lesson: {} ({unit_id})", lesson.title);
            }
            None => {
                let _ = write!(out, "\n- Lesson: {unit_id}");
            }
        }
    }
    if let Some(archetype) = s
        .current_module_id
        .as_deref()
        .and_then(|m| input.curriculum.archetype_for(m))
    {
        let _ = write!(out, "\n- Archetype: {archetype}");
    }
    Some(out)
}

pub fn recency(input: &PromptInput<'_>, config: &PromptConfig) -> Option<String> {
    let history = &input.activity.session_history;
    if history.len() <= 1 {
        return None;
    }
    let skip = history.len().saturating_sub(config.recent_trail);
    let trail: Vec<&str> = history.iter().skip(skip).map(String::as_str).collect();
    if trail.is_empty() {
        return None;
    }
    Some(format!("RECENT PATH:\n{}", trail.join(" → ")))
}

pub fn trigger(input: &PromptInput<'_>, _config: &PromptConfig) -> Option<String> {
    let reason = input.trigger.map(str::trim).filter(|t| !t.is_empty())?;
    Some(format!("WHY THE USER REACHED OUT:\n{reason}"))
}

pub fn constraints(_input: &PromptInput<'_>, _config: &PromptConfig) -> Option<String> {
    Some(CONSTRAINTS.to_string())
}
