//! Property-based tests for turn construction
//!
//! - Input formatting never alters a message without a pre-prompt
//! - With a pre-prompt the message is always the suffix after the label
//! - Retrieval disabled means no `tools` field on the wire
//! - Every name resolves to a registered vector store

use super::knowledge_base::{self, all_knowledge_bases, RETRIEVAL_DISABLED};
use super::request::{build_turn_request, format_input, TurnInputs, DEFAULT_QUERY_LABEL};
use proptest::prelude::*;

fn arb_message() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 áéíóúãõç?!.,]{1,120}"
}

fn arb_known_name() -> impl Strategy<Value = &'static str> {
    prop::sample::select(knowledge_base::names())
}

proptest! {
    #[test]
    fn prop_blank_pre_prompt_passes_message_through(
        message in arb_message(),
        blank in "[ \t\n]{0,5}",
    ) {
        prop_assert_eq!(format_input(&message, None, DEFAULT_QUERY_LABEL), message.clone());
        prop_assert_eq!(format_input(&message, Some(&blank), DEFAULT_QUERY_LABEL), message);
    }

    #[test]
    fn prop_pre_prompt_prefixes_label_and_message(
        message in arb_message(),
        pre in "[a-zA-Z]{1,40}",
    ) {
        let input = format_input(&message, Some(&pre), DEFAULT_QUERY_LABEL);
        prop_assert!(input.starts_with(&pre));
        let expected_suffix = format!("\n\n{DEFAULT_QUERY_LABEL}{message}");
        prop_assert!(input.ends_with(&expected_suffix));
        prop_assert_eq!(input.len(), pre.len() + expected_suffix.len());
    }

    #[test]
    fn prop_disabled_retrieval_omits_tools(
        message in arb_message(),
        top_k in 1u32..=50,
        token in proptest::option::of("resp_[a-z0-9]{8}"),
    ) {
        let request = build_turn_request(TurnInputs {
            model: "gpt-4o-mini",
            message: &message,
            pre_prompt: None,
            query_label: DEFAULT_QUERY_LABEL,
            instructions: "Responda",
            temperature: 0.7,
            continuation_token: token.as_deref(),
            retrieval: knowledge_base::retrieval_for(RETRIEVAL_DISABLED, top_k),
            max_output_tokens: None,
        });

        prop_assert!(request.store);
        prop_assert!(request.tools.is_none());
        prop_assert_eq!(&request.previous_response_id, &token);
        let wire = serde_json::to_value(&request).unwrap();
        prop_assert!(wire.get("tools").is_none());
        prop_assert_eq!(wire.get("previous_response_id").is_some(), token.is_some());
    }

    #[test]
    fn prop_known_names_carry_top_k(name in arb_known_name(), top_k in 1u32..=50) {
        let tool = knowledge_base::retrieval_for(name, top_k).unwrap();
        prop_assert_eq!(tool.max_num_results, top_k);
        prop_assert_eq!(tool.vector_store_ids.len(), 1);
        prop_assert_eq!(&tool.vector_store_ids[0], knowledge_base::resolve(name));
    }

    #[test]
    fn prop_any_name_resolves_to_registered_store(name in "[A-Za-z]{0,12}") {
        prop_assume!(name != RETRIEVAL_DISABLED);
        let id = knowledge_base::resolve(&name);
        prop_assert!(all_knowledge_bases().iter().any(|kb| kb.vector_store_id == id));
    }
}
