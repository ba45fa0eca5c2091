use super::*;

#[test]
fn reply_request_carries_tutoring_tuning() {
    let request = ChatRequest::reply(
        "llama-3.3-70b-versatile",
        vec![
            ChatMessage::system("be socratic"),
            ChatMessage::user("hello"),
        ],
    );
    let value = serde_json::to_value(&request).expect("serialize");
    assert_eq!(value["model"], "llama-3.3-70b-versatile");
    let temperature = value["temperature"].as_f64().expect("temperature");
    assert!((temperature - 0.7).abs() < 1e-6);
    assert_eq!(value["max_tokens"], 600);
    assert_eq!(value["messages"][0]["role"], "system");
    assert_eq!(value["messages"][0]["content"], "be socratic");
    assert_eq!(value["messages"][1]["role"], "user");
}

#[test]
fn verification_request_is_minimal() {
    let request = ChatRequest::verification("llama-3.3-70b-versatile");
    let value = serde_json::to_value(&request).expect("serialize");
    assert_eq!(value["max_tokens"], 1);
    assert_eq!(value["messages"].as_array().expect("messages").len(), 1);
    assert_eq!(value["messages"][0]["role"], "user");
    // Verification leaves tuning to the provider defaults.
    assert!(value.get("temperature").is_none());
}

#[test]
fn message_constructors_set_roles() {
    assert_eq!(ChatMessage::system("x").role, "system");
    assert_eq!(ChatMessage::user("x").role, "user");
    assert_eq!(ChatMessage::assistant("x").role, "assistant");
}

#[test]
fn decodes_successful_reply() {
    let body = r#"{"choices":[{"message":{"role":"assistant","content":"What is your plan?"}}]}"#;
    assert_eq!(
        decode_chat_body(200, body),
        Ok("What is your plan?".to_string())
    );
}

#[test]
fn empty_choices_degrade_to_placeholder_text() {
    assert_eq!(
        decode_chat_body(200, r#"{"choices":[]}"#),
        Ok("(no response)".to_string())
    );
    let body = r#"{"choices":[{"message":{"role":"assistant","content":""}}]}"#;
    assert_eq!(decode_chat_body(200, body), Ok("(no response)".to_string()));
}

#[test]
fn invalid_api_key_code_classifies_as_credential_invalid() {
    let body = r#"{"error":{"code":"invalid_api_key","message":"Invalid API Key"}}"#;
    assert_eq!(
        decode_chat_body(400, body),
        Err(GatewayError::CredentialInvalid)
    );
}

#[test]
fn unauthorized_status_classifies_as_credential_invalid() {
    let body = r#"{"error":{"code":"bad_token","message":"Unauthorized"}}"#;
    assert_eq!(
        decode_chat_body(401, body),
        Err(GatewayError::CredentialInvalid)
    );
    // Even with an unparseable body.
    assert_eq!(
        decode_chat_body(401, "<html>denied</html>"),
        Err(GatewayError::CredentialInvalid)
    );
    // Or a parseable body with no error object.
    assert_eq!(
        decode_chat_body(401, r#"{"choices":[]}"#),
        Err(GatewayError::CredentialInvalid)
    );
}

#[test]
fn other_provider_errors_keep_code_and_message() {
    let body = r#"{"error":{"code":"rate_limit_exceeded","message":"Rate limit reached"}}"#;
    assert_eq!(
        decode_chat_body(429, body),
        Err(GatewayError::Provider {
            code: Some("rate_limit_exceeded".to_string()),
            message: "Rate limit reached".to_string(),
        })
    );
}

#[test]
fn provider_error_without_code_still_classifies() {
    let body = r#"{"error":{"message":"Service overloaded"}}"#;
    assert_eq!(
        decode_chat_body(503, body),
        Err(GatewayError::Provider {
            code: None,
            message: "Service overloaded".to_string(),
        })
    );
}

#[test]
fn unparseable_failure_body_reports_http_status() {
    assert_eq!(
        decode_chat_body(500, "<html>Internal Server Error</html>"),
        Err(GatewayError::Provider {
            code: None,
            message: "HTTP 500".to_string(),
        })
    );
}

#[test]
fn unparseable_success_body_is_a_transport_failure() {
    assert!(matches!(
        decode_chat_body(200, "not json at all"),
        Err(GatewayError::Transport(_))
    ));
}

#[test]
fn successful_error_free_status_without_choices_is_tolerated() {
    assert_eq!(decode_chat_body(204, "{}"), Ok("(no response)".to_string()));
}

#[test]
fn adapter_reports_transport_failure_for_unreachable_host() {
    let adapter = MentorAdapter::new("http://127.0.0.1:9");
    adapter.send_verify("gsk_test".to_string(), "test-model".to_string());

    let deadline = std::time::Instant::now() + Duration::from_secs(10);
    loop {
        let events = adapter.drain_events();
        if let Some(GatewayEvent::Verified(result)) = events.into_iter().next() {
            assert!(matches!(result, Err(GatewayError::Transport(_))));
            break;
        }
        if std::time::Instant::now() > deadline {
            panic!("no gateway event arrived in time");
        }
        thread::sleep(Duration::from_millis(20));
    }
}
