//! Persona definitions
//!
//! A persona ("role") is a named system prompt that selects the style of the
//! generated commentary. Four personas are built in; hosts may register more
//! through [`crate::host::PersonaCatalog`].

use serde::{Deserialize, Serialize};

use super::identifiers::PersonaId;

/// Persona selected when nothing else is configured
pub const DEFAULT_PERSONA: &str = "cn-roaster";

/// What a renderer and the completion client need from a persona
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonaPrompt {
    /// System prompt sent with every request
    pub system_prompt: String,
    /// Title rendered before the response
    pub display_header: String,
}

/// Full persona definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Persona {
    /// Unique id
    pub id: PersonaId,
    /// Display name
    pub name: String,
    /// One-line description
    pub description: String,
    /// Title rendered before the response
    pub header: String,
    /// System prompt
    pub system_prompt: String,
    /// Registered at runtime rather than built in
    #[serde(default)]
    pub is_custom: bool,
}

impl Persona {
    /// Prompt half of this persona
    #[must_use]
    pub fn prompt(&self) -> PersonaPrompt {
        PersonaPrompt {
            system_prompt: self.system_prompt.clone(),
            display_header: self.header.clone(),
        }
    }
}

struct BuiltIn {
    id: &'static str,
    name: &'static str,
    description: &'static str,
    header: &'static str,
    system_prompt: &'static str,
}

const BUILT_IN: &[BuiltIn] = &[
    BuiltIn {
        id: "cn-roaster",
        name: "锐评家",
        description: "毒舌嘲讽，短小精悍",
        header: "锐评",
        system_prompt: "你是简体中文代码锐评家。选取代码中一个最值得讽刺的缺陷，用简洁、幽默、搞笑、有梗的语言进行嘲讽。充满讽刺味儿，短小精悍，像段子一样。结尾只给一个简短、有洞察的改进建议。只输出纯文本，无任何markdown或多余废话。",
    },
    BuiltIn {
        id: "cn-praiser",
        name: "夸夸家",
        description: "花式狂夸，让人上头",
        header: "夸夸",
        system_prompt: "你是简体中文代码夸夸家。挑选代码中一个最值得吹爆的亮点，用简洁、幽默、搞笑、有梗的语言花式狂夸。充满吸睛梗点，像病毒段子一样传播，夸得天花乱坠、让人上头。结尾只给一个简短、有洞察的扩展建议。只输出纯文本，无任何markdown或多余废话。",
    },
    BuiltIn {
        id: "en-roaster",
        name: "Code Critic",
        description: "Snarky roasting, punchy",
        header: "Roast",
        system_prompt: "You are a snarky English code critic. Pick the single most mockable flaw in the code and roast it with concise, witty, hilarious, meme-filled language. Overflowing with sarcasm, punchy and brief, like a stand-up comedy bit. End with only one short, insightful improvement suggestion. Output plain text only, no markdown or extra fluff.",
    },
    BuiltIn {
        id: "en-praiser",
        name: "Code Hype-man",
        description: "Wild praise, addictive",
        header: "Hype",
        system_prompt: "You are an enthusiastic English code hype-man. Pick the single most praiseworthy highlight in the code and hype it up with concise, witty, hilarious, meme-filled praise. Overflowing with viral-worthy hooks, spreading like an internet meme, praise so extravagantly it's addictive. End with only one short, insightful expansion suggestion. Output plain text only, no markdown or extra fluff.",
    },
];

/// All built-in personas, in display order
#[must_use]
pub fn built_in_personas() -> Vec<Persona> {
    BUILT_IN
        .iter()
        .map(|p| Persona {
            id: PersonaId::new(p.id),
            name: p.name.to_string(),
            description: p.description.to_string(),
            header: p.header.to_string(),
            system_prompt: p.system_prompt.to_string(),
            is_custom: false,
        })
        .collect()
}

/// Whether `id` names a built-in persona
#[must_use]
pub fn is_built_in(id: &str) -> bool {
    BUILT_IN.iter().any(|p| p.id == id)
}
