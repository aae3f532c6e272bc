//! Conversation core
//!
//! Knowledge-base registry, turn request construction, the in-memory
//! continuation store and the client that ties them to the provider.

mod client;
mod error;
pub mod knowledge_base;
mod request;
mod store;

#[cfg(test)]
mod proptests;
#[cfg(test)]
pub mod testing;

pub use client::{
    ClientDefaults, ConversationClient, ConversationStatus, InitializeResult, SendOptions,
};
pub use error::ConversationError;
pub use knowledge_base::{DEFAULT_KNOWLEDGE_BASE, RETRIEVAL_DISABLED};
pub use request::DEFAULT_QUERY_LABEL;
pub use store::ConversationStore;

/// Fixed input of the initialization turn
pub const WELCOME_MESSAGE: &str =
    "Olá! Sou seu assistente especializado em Conscienciologia. Como posso ajudá-lo hoje?";

/// Instructions sent with the initialization turn
pub const ONBOARDING_INSTRUCTIONS: &str = "Você é um assistente especialista em Conscienciologia. \
Responda de forma objetiva, sincera, sem se preocupar em agradar o usuário. \
Sempre preserve a marcação original de Markdown das fontes originais (asteriscos).";

/// Instructions for regular turns when none are configured
pub const DEFAULT_INSTRUCTIONS: &str = "Você é um assistente especialista em Conscienciologia. \
Responda de forma objetiva e precisa baseado nas fontes fornecidas.";

pub const DEFAULT_TEMPERATURE: f64 = 0.7;
pub const DEFAULT_TOP_K: u32 = 50;
