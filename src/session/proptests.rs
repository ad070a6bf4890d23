//! Property-based tests for session turn-taking
//!
//! Whatever mix of successes and failures the backend produces, the
//! transcript grows by one seeker and one guide turn per submission.

use super::testing::{test_settings, MockConnector, MockLlmService};
use super::{Role, Session, SessionError};
use crate::llm::{LlmError, LlmResponse};
use proptest::prelude::*;
use std::sync::Arc;

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

fn arb_outcome() -> impl Strategy<Value = Result<String, String>> {
    prop_oneof![
        "[a-zA-Z <>/]{0,40}".prop_map(Result::<String, String>::Ok),
        "[a-z ]{1,20}".prop_map(Result::<String, String>::Err),
    ]
}

fn arb_input() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ,]{0,10}[a-zA-Z0-9][a-zA-Z0-9 ,]{0,10}"
}

proptest! {
    #[test]
    fn prop_turns_alternate(
        script in proptest::collection::vec((arb_input(), arb_outcome()), 0..12)
    ) {
        let mock = Arc::new(MockLlmService::new("deepseek-r1:7b"));
        for (_, outcome) in &script {
            match outcome {
                Ok(text) => mock.queue_response(LlmResponse::text(text.clone())),
                Err(detail) => mock.queue_error(LlmError::server_error(detail.clone())),
            }
        }

        let mut session = Session::new();
        let rt = runtime();
        rt.block_on(session.initialize(&MockConnector::ready(mock.clone()), &test_settings()))
            .unwrap();

        for (input, outcome) in &script {
            let reply = rt.block_on(session.submit(input)).unwrap();
            prop_assert_eq!(reply.is_failure(), outcome.is_err());
        }

        let turns = session.transcript().turns();
        prop_assert_eq!(turns.len(), 2 * script.len());
        for (i, turn) in turns.iter().enumerate() {
            let expected = if i % 2 == 0 { Role::Seeker } else { Role::Guide };
            prop_assert_eq!(turn.role(), expected);
        }
        for ((input, outcome), pair) in script.iter().zip(turns.chunks(2)) {
            prop_assert_eq!(pair[0].content(), input.as_str());
            match outcome {
                Ok(text) => prop_assert_eq!(pair[1].content(), text.as_str()),
                Err(_) => prop_assert!(pair[1].content().starts_with("❌ Failed to generate response:")),
            }
        }
        prop_assert_eq!(mock.recorded_requests().len(), script.len());
    }

    #[test]
    fn prop_unconnected_session_never_grows(
        inputs in proptest::collection::vec(arb_input(), 0..8)
    ) {
        let mut session = Session::new();
        let rt = runtime();
        for input in &inputs {
            let err = rt.block_on(session.submit(input)).unwrap_err();
            prop_assert_eq!(err, SessionError::SessionUnavailable);
        }
        prop_assert!(session.transcript().is_empty());
    }
}
