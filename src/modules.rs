//! Module catalog
//!
//! Static list of the portal's modules. Only chat, oracle and RAG modules
//! are served by this process; external modules are links.

mod assistant;
mod settings;

pub use assistant::{ask, AssistantError};
pub use settings::{ModuleSettings, SettingsError};

use serde::Serialize;

/// Id of the module backed by the conversation client
pub const RAG_MODULE_ID: &str = "ecwvrag";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleKind {
    /// One-shot general assistant
    Chat,
    /// One-shot literary oracle
    Oracle,
    /// Retrieval-augmented conversation
    Rag,
    /// Opens a third-party page
    ExternalLink,
    ComingSoon,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleInfo {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub badge: &'static str,
    pub kind: ModuleKind,
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_url: Option<&'static str>,
}

const CONSGPT_URL: &str = "https://chatgpt.com/g/g-9rjMAqtTg-consgpt";
const CONSLM_URL: &str =
    "https://notebooklm.google.com/notebook/c3528e65-0c2b-4a80-b3f2-2f22e3626b67";

const MODULES: &[ModuleInfo] = &[
    ModuleInfo {
        id: "chatbot",
        title: "Cons.EDU",
        description: "ChatBot Pesquisador Independente.",
        badge: "Available",
        kind: ModuleKind::Chat,
        available: true,
        external_url: None,
    },
    ModuleInfo {
        id: "bibliomancia",
        title: "Bibliomancia",
        description: "Sorteio e análise de pensatas do Léxico de Ortopensatas.",
        badge: "Available",
        kind: ModuleKind::Oracle,
        available: true,
        external_url: None,
    },
    ModuleInfo {
        id: RAG_MODULE_ID,
        title: "RAG Bot",
        description: "Chatbot RAG especializado com base de conhecimento ECWV usando Response API.",
        badge: "RAG",
        kind: ModuleKind::Rag,
        available: true,
        external_url: None,
    },
    ModuleInfo {
        id: "consgpt",
        title: "Cons.GPT",
        description: "Assistente ChatGPT (OpenAI) com os tratados conscienciológicos.",
        badge: "Available",
        kind: ModuleKind::ExternalLink,
        available: true,
        external_url: Some(CONSGPT_URL),
    },
    ModuleInfo {
        id: "conslm",
        title: "Cons.LM",
        description: "Assistente NotebookLM (Gemini) com os tratados conscienciológicos.",
        badge: "Available",
        kind: ModuleKind::ExternalLink,
        available: true,
        external_url: Some(CONSLM_URL),
    },
    ModuleInfo {
        id: "knowledge-base",
        title: "Knowledge Base",
        description: "Intelligent knowledge management and retrieval system for your personal or professional needs.",
        badge: "Coming Soon",
        kind: ModuleKind::ComingSoon,
        available: false,
        external_url: None,
    },
    ModuleInfo {
        id: "workflow-automation",
        title: "Workflow Automation",
        description: "Automate complex workflows and processes using AI-driven decision making and task execution.",
        badge: "Coming Soon",
        kind: ModuleKind::ComingSoon,
        available: false,
        external_url: None,
    },
];

pub fn all_modules() -> &'static [ModuleInfo] {
    MODULES
}

pub fn get_module(id: &str) -> Option<&'static ModuleInfo> {
    MODULES.iter().find(|m| m.id == id)
}
