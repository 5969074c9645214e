use chrono::Utc;
use pushkit::error::PushError;
use pushkit::push::envelope::{redact_token, DispatchOptions, Envelope};
use pushkit::push::message::{Message, WireData};

#[test]
fn text_message_derives_loc_key_and_args() {
    let message = Message::compose_text("Alice", "Hey there", 123456, 1).unwrap();

    assert_eq!(message.loc_key(), "MESSAGE_TEXT");
    assert_eq!(message.loc_args(), vec!["Alice", "Hey there"]);
    assert_eq!(message.badge(), 1);
    assert_eq!(
        message.custom().get("from_id").map(String::as_str),
        Some("123456")
    );
}

#[test]
fn photo_message_carries_sender_only() {
    let message = Message::compose_photo("Bob", 789012, 2).unwrap();

    assert_eq!(message.loc_key(), "MESSAGE_PHOTO");
    assert_eq!(message.loc_args(), vec!["Bob"]);
    assert_eq!(
        message.custom().get("from_id").map(String::as_str),
        Some("789012")
    );
}

#[test]
fn group_message_uses_chat_id_custom_key() {
    let message =
        Message::compose_group_message("Charlie", "My Friends", "Anyone up for coffee?", 345678, 3)
            .unwrap();

    assert_eq!(message.loc_key(), "CHAT_MESSAGE_TEXT");
    assert_eq!(
        message.loc_args(),
        vec!["Charlie", "My Friends", "Anyone up for coffee?"]
    );
    assert!(message.custom().get("from_id").is_none());
    assert_eq!(
        message.custom().get("chat_id").map(String::as_str),
        Some("345678")
    );
}

#[test]
fn group_invite_derives_loc_args() {
    let message = Message::compose_group_invite("Dave", "Book Club", 901234, 4).unwrap();

    assert_eq!(message.loc_key(), "CHAT_ADD_YOU");
    assert_eq!(message.loc_args(), vec!["Dave", "Book Club"]);
    assert_eq!(
        message.custom().get("chat_id").map(String::as_str),
        Some("901234")
    );
}

#[test]
fn group_variants_reject_empty_group_name() {
    let err = Message::compose_group_message("Charlie", "", "hi", 1, 1).unwrap_err();
    assert!(matches!(err, PushError::Validation(_)));

    let err = Message::compose_group_invite("Dave", "", 1, 1).unwrap_err();
    assert!(matches!(err, PushError::Validation(_)));

    // 非空群名正常通过
    assert!(Message::compose_group_invite("Dave", "Book Club", 1, 1).is_ok());
}

#[test]
fn all_composers_reject_negative_badge() {
    assert!(matches!(
        Message::compose_text("a", "b", 1, -1).unwrap_err(),
        PushError::Validation(_)
    ));
    assert!(matches!(
        Message::compose_photo("a", 1, -1).unwrap_err(),
        PushError::Validation(_)
    ));
    assert!(matches!(
        Message::compose_group_message("a", "g", "b", 1, -1).unwrap_err(),
        PushError::Validation(_)
    ));
    assert!(matches!(
        Message::compose_group_invite("a", "g", 1, -1).unwrap_err(),
        PushError::Validation(_)
    ));

    // 0 是合法计数
    assert!(Message::compose_text("a", "b", 1, 0).is_ok());
}

#[test]
fn wire_round_trip_reproduces_loc_key_and_args() {
    let message = Message::compose_text("Alice", "Hey there", 123456, 1).unwrap();

    let json = serde_json::to_string(&message.to_wire()).unwrap();
    let decoded: WireData = serde_json::from_str(&json).unwrap();

    assert_eq!(decoded.message.loc_key, "MESSAGE_TEXT");
    assert_eq!(decoded.message.loc_args, vec!["Alice", "Hey there"]);
    assert_eq!(decoded.message.badge, 1);
    assert_eq!(
        decoded.message.custom.get("from_id").map(String::as_str),
        Some("123456")
    );
}

#[test]
fn envelope_wire_format_matches_gateway_contract() {
    let message = Message::compose_text("Alice", "Hey there", 123456, 1).unwrap();
    let options = DispatchOptions {
        clear_pending: true,
        replace_tag: Some("msg_123456".to_string()),
    };
    let envelope = Envelope::wrap("app.example_app", "TOKEN", message, &options);

    let value = serde_json::to_value(envelope.to_wire()).unwrap();

    assert_eq!(value["appid"], "app.example_app");
    assert_eq!(value["token"], "TOKEN");
    assert_eq!(value["clear_pending"], true);
    assert_eq!(value["replace_tag"], "msg_123456");
    assert_eq!(value["data"]["message"]["loc_key"], "MESSAGE_TEXT");
    assert_eq!(value["data"]["message"]["badge"], 1);

    // expire_on 是 ISO8601 UTC 时间戳
    let expire_on = value["expire_on"].as_str().unwrap();
    assert!(expire_on.ends_with('Z'));
    chrono::DateTime::parse_from_rfc3339(expire_on).unwrap();
}

#[test]
fn envelope_expiry_is_strictly_in_the_future() {
    let message = Message::compose_photo("Bob", 1, 1).unwrap();
    let before = Utc::now();
    let envelope = Envelope::wrap("app", "TOKEN", message, &DispatchOptions::default());

    assert!(envelope.expire_at > before);
    // 默认过期窗口是 24 小时
    assert!(envelope.expire_at - before >= chrono::Duration::hours(23));
}

#[test]
fn default_options_clear_pending_without_replace_tag() {
    let options = DispatchOptions::default();
    assert!(options.clear_pending);
    assert!(options.replace_tag.is_none());
}

#[test]
fn token_is_redacted_to_short_prefix() {
    let message = Message::compose_photo("Bob", 1, 1).unwrap();
    let envelope = Envelope::wrap(
        "app",
        "abcdefghijklmnopqrstuvwxyz",
        message,
        &DispatchOptions::default(),
    );

    assert_eq!(envelope.token_prefix(), "abcdefghij...");
    assert_eq!(redact_token("short"), "short...");
}
