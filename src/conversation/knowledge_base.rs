//! Knowledge-base registry
//!
//! Static mapping from the friendly names shown in module settings to the
//! provider-hosted vector store ids. Unknown names resolve to the
//! all-sources base instead of failing.

use crate::llm::RetrievalTool;

/// Name of the base searched when no other is selected or the name is unknown
pub const DEFAULT_KNOWLEDGE_BASE: &str = "ALLWV";

/// Settings value that turns retrieval off. Not a knowledge base.
pub const RETRIEVAL_DISABLED: &str = "None";

/// Knowledge base definition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KnowledgeBaseDef {
    pub name: &'static str,
    pub vector_store_id: &'static str,
}

const KNOWLEDGE_BASES: &[KnowledgeBaseDef] = &[
    KnowledgeBaseDef { name: "ALLWV", vector_store_id: "vs_6870595f39dc8191b364854cf46ffc74" },
    KnowledgeBaseDef { name: "DAC", vector_store_id: "vs_683f352912848191a17ca98ab24a19a5" },
    KnowledgeBaseDef { name: "LO", vector_store_id: "vs_686735d972cc81919ceec7a4ccf63a57" },
    KnowledgeBaseDef { name: "QUEST", vector_store_id: "vs_683f356d9e908191bf83ae7e5ed6a8c9" },
    KnowledgeBaseDef { name: "MANUAIS", vector_store_id: "vs_683f36046a0481919b601070311b8991" },
    KnowledgeBaseDef { name: "ECWV", vector_store_id: "vs_683f35b84fac8191b8a36918eb7997f2" },
    KnowledgeBaseDef { name: "HSRP", vector_store_id: "vs_683f3686f9548191a1769c1fffdf674e" },
    KnowledgeBaseDef { name: "EXP", vector_store_id: "vs_683f3759628c819187618a217d0c5464" },
    KnowledgeBaseDef { name: "PROJ", vector_store_id: "vs_683f36bbcb688191883d43d948673df6" },
    KnowledgeBaseDef { name: "CCG", vector_store_id: "vs_683f36f2daa88191a1055950845e221b" },
    KnowledgeBaseDef { name: "EDUNOTES", vector_store_id: "vs_68726a6993fc8191ba63b14a9243076a" },
];

/// All registered knowledge bases, in display order
pub fn all_knowledge_bases() -> &'static [KnowledgeBaseDef] {
    KNOWLEDGE_BASES
}

/// Registered names, in display order
pub fn names() -> Vec<&'static str> {
    all_knowledge_bases().iter().map(|kb| kb.name).collect()
}

pub fn is_known(name: &str) -> bool {
    lookup(name).is_some()
}

fn lookup(name: &str) -> Option<&'static KnowledgeBaseDef> {
    KNOWLEDGE_BASES.iter().find(|kb| kb.name == name)
}

fn default_base() -> &'static KnowledgeBaseDef {
    &KNOWLEDGE_BASES[0]
}

/// Resolve a name to its vector store id, falling back to the default base.
///
/// Callers must check for [`RETRIEVAL_DISABLED`] first.
pub fn resolve(name: &str) -> &'static str {
    match lookup(name) {
        Some(kb) => kb.vector_store_id,
        None => {
            tracing::warn!(
                knowledge_base = %name,
                fallback = DEFAULT_KNOWLEDGE_BASE,
                "Unknown knowledge base, using default"
            );
            default_base().vector_store_id
        }
    }
}

/// Build the retrieval directive for a settings value, or `None` when the
/// sentinel disables retrieval.
pub fn retrieval_for(name: &str, top_k: u32) -> Option<RetrievalTool> {
    if name == RETRIEVAL_DISABLED {
        return None;
    }
    Some(RetrievalTool::file_search(resolve(name), top_k))
}
