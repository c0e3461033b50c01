use super::*;

#[test]
fn splits_complete_events() {
    let mut buffer = Vec::new();
    let events = drain_events(&mut buffer, b"data: {\"a\":1}\n\ndata: {\"b\":2}\n\n");
    assert_eq!(events, vec![r#"{"a":1}"#, r#"{"b":2}"#]);
    assert!(buffer.is_empty());
}

#[test]
fn keeps_partial_event_for_next_chunk() {
    let mut buffer = Vec::new();
    assert!(drain_events(&mut buffer, b"data: {\"a\"").is_empty());
    assert_eq!(drain_events(&mut buffer, b":1}\n\n"), vec![r#"{"a":1}"#]);
}

#[test]
fn skips_keep_alive_comments() {
    let mut buffer = Vec::new();
    let events = drain_events(&mut buffer, b": keep-alive\n\ndata: x\n\n");
    assert_eq!(events, vec!["x"]);
}

#[test]
fn joins_multi_line_data_and_handles_crlf() {
    let mut buffer = Vec::new();
    let events = drain_events(&mut buffer, b"event: note\r\ndata: one\r\ndata:two\r\n\r\n");
    assert_eq!(events, vec!["one\ntwo"]);
}

#[test]
fn multibyte_character_split_across_chunks_survives() {
    let bytes = "data: {\"name\":\"Zoë\"}\n\n".as_bytes();
    let split = bytes.iter().position(|&b| b == 0xC3).expect("lead byte") + 1;

    let mut buffer = Vec::new();
    assert!(drain_events(&mut buffer, &bytes[..split]).is_empty());
    assert_eq!(drain_events(&mut buffer, &bytes[split..]), vec![r#"{"name":"Zoë"}"#]);
}

#[test]
fn crlf_separator_split_across_chunks() {
    let mut buffer = Vec::new();
    assert!(drain_events(&mut buffer, b"data: x\r\n\r").is_empty());
    assert_eq!(drain_events(&mut buffer, b"\n"), vec!["x"]);
    assert!(buffer.is_empty());
}
