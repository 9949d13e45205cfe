use super::*;

// =============================================================================
// ContentBlock serde
// =============================================================================

#[test]
fn text_block_round_trip() {
    let block = ContentBlock::Text { text: "hello".into() };
    let json = serde_json::to_string(&block).unwrap();
    assert!(json.contains("\"type\":\"text\""));
    let restored: ContentBlock = serde_json::from_str(&json).unwrap();
    assert!(matches!(restored, ContentBlock::Text { text } if text == "hello"));
}

#[test]
fn thinking_block_round_trip() {
    let json = r#"{"type":"thinking","thinking":"hmm"}"#;
    let block: ContentBlock = serde_json::from_str(json).unwrap();
    assert!(matches!(block, ContentBlock::Thinking { thinking } if thinking == "hmm"));
}

#[test]
fn unknown_block_type_deserializes_to_unknown() {
    let json = r#"{"type":"some_future_type","data":{}}"#;
    let block: ContentBlock = serde_json::from_str(json).unwrap();
    assert!(matches!(block, ContentBlock::Unknown));
}

// =============================================================================
// Message
// =============================================================================

#[test]
fn message_constructors() {
    let user = Message::user("hi");
    assert_eq!(user.role, "user");
    assert_eq!(user.content, "hi");

    let assistant = Message::assistant("hello back");
    assert_eq!(assistant.role, "assistant");
    assert_eq!(assistant.content, "hello back");
}

#[test]
fn message_serializes_as_plain_object() {
    let json = serde_json::to_value(Message::user("hey")).unwrap();
    assert_eq!(json["role"], "user");
    assert_eq!(json["content"], "hey");
}

// =============================================================================
// ChatResponse::text
// =============================================================================

fn response_with(content: Vec<ContentBlock>) -> ChatResponse {
    ChatResponse {
        content,
        model: "mock".into(),
        stop_reason: "end_turn".into(),
        input_tokens: 0,
        output_tokens: 0,
    }
}

#[test]
fn text_joins_text_blocks() {
    let resp = response_with(vec![
        ContentBlock::Text { text: "one".into() },
        ContentBlock::Text { text: "two".into() },
    ]);
    assert_eq!(resp.text(), "one\ntwo");
}

#[test]
fn text_skips_thinking_blocks() {
    let resp = response_with(vec![
        ContentBlock::Thinking { thinking: "let me think".into() },
        ContentBlock::Text { text: "answer".into() },
    ]);
    assert_eq!(resp.text(), "answer");
}

#[test]
fn text_of_empty_content_is_empty() {
    let resp = response_with(vec![]);
    assert_eq!(resp.text(), "");
}

#[test]
fn text_of_thinking_only_is_empty() {
    let resp = response_with(vec![ContentBlock::Thinking { thinking: "…".into() }]);
    assert_eq!(resp.text(), "");
}

// =============================================================================
// LlmError
// =============================================================================

#[test]
fn error_display_includes_detail() {
    let err = LlmError::MissingApiKey { var: "ANTHROPIC_API_KEY".into() };
    assert!(err.to_string().contains("ANTHROPIC_API_KEY"));

    let err = LlmError::ApiResponse { status: 429, body: "rate limited".into() };
    assert!(err.to_string().contains("429"));
}
