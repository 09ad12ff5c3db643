//! Context assembler for the conversational assistant.
//!
//! The prompt is an ordered list of sections, each a pure function of a
//! [`PromptInput`]. Absent sections contribute nothing, present ones are
//! separated by a blank line. No clock, no I/O: identical input yields
//! byte-identical output.
//!
//! Default order:
//!
//! 1. `knowledge`: role, curriculum pillars, thinking shifts
//! 2. `personalization`: life context facts the user has disclosed
//! 3. `activity`: live page, dwell, scroll, module/lesson/archetype
//! 4. `recency`: trail of recently visited paths
//! 5. `trigger`: why the assistant was invoked, when known
//! 6. `constraints`: fixed response rules

pub mod sections;

use crate::activity::ActivitySnapshot;
use crate::curriculum::Curriculum;
use crate::life_context::LifeContext;
use crate::storage::PromptConfig;

/// Everything the assembler reads.
#[derive(Debug, Clone, Copy)]
pub struct PromptInput<'a> {
    pub curriculum: &'a Curriculum,
    pub life_context: Option<&'a LifeContext>,
    pub activity: &'a ActivitySnapshot,
    /// e.g. "user invoked help from element pricing-card"
    pub trigger: Option<&'a str>,
}

pub type RenderFn = fn(&PromptInput<'_>, &PromptConfig) -> Option<String>;

#[derive(Clone, Copy)]
pub struct Section {
    pub name: &'static str,
    pub render: RenderFn,
}

impl std::fmt::Debug for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Section").field("name", &self.name).finish()
    }
}

const DEFAULT_SECTIONS: [Section; 6] = [
    Section {
        name: "knowledge",
        render: sections::knowledge,
    },
    Section {
        name: "personalization",
        render: sections::personalization,
    },
    Section {
        name: "activity",
        render: sections::activity,
    },
    Section {
        name: "recency",
        render: sections::recency,
    },
    Section {
        name: "trigger",
        render: sections::trigger,
    },
    Section {
        name: "constraints",
        render: sections::constraints,
    },
];

#[derive(Debug, Clone)]
pub struct PromptBuilder {
    sections: Vec<Section>,
    config: PromptConfig,
}

impl PromptBuilder {
    /// Builder with the default six sections in order.
    pub fn new(config: PromptConfig) -> Self {
        Self {
            sections: DEFAULT_SECTIONS.to_vec(),
            config,
        }
    }

    /// Append a section after the existing ones.
    pub fn with_section(mut self, name: &'static str, render: RenderFn) -> Self {
        self.sections.push(Section { name, render });
        self
    }

    /// Drop every section called `name`.
    pub fn without(mut self, name: &str) -> Self {
        self.sections.retain(|s| s.name != name);
        self
    }

    pub fn section_names(&self) -> Vec<&'static str> {
        self.sections.iter().map(|s| s.name).collect()
    }

    /// Render each section, keeping only the present ones, in order.
    pub fn render_sections(&self, input: &PromptInput<'_>) -> Vec<(&'static str, String)> {
        self.sections
            .iter()
            .filter_map(|s| (s.render)(input, &self.config).map(|text| (s.name, text)))
            .collect()
    }

    pub fn build(&self, input: &PromptInput<'_>) -> String {
        self.render_sections(input)
            .into_iter()
            .map(|(_, text)| text)
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new(PromptConfig::default())
    }
}

/// Assemble the assistant prompt with the default section order.
pub fn build_prompt(input: &PromptInput<'_>, config: &PromptConfig) -> String {
    PromptBuilder::new(config.clone()).build(input)
}
