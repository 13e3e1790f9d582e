use super::*;

#[test]
fn test_user_message_creation() {
    let msg = Message::user("Hello");
    assert_eq!(msg.content, "Hello");
    assert_eq!(msg.sender, Sender::User);
    assert!(msg.sources.is_none());
    assert!(!msg.id.is_empty());
}

#[test]
fn test_message_ids_are_unique() {
    let a = Message::bot("a");
    let b = Message::bot("a");
    assert_ne!(a.id, b.id);
}

#[test]
fn test_bot_message_with_sources() {
    let msg = Message::bot_with_sources(
        "Try Joe's Café",
        vec![Citation::new("Joe's Café", "https://example.com")],
    );
    assert!(msg.is_bot());
    assert!(msg.has_sources());
    assert_eq!(msg.sources.as_ref().unwrap()[0].title, "Joe's Café");
}

#[test]
fn test_empty_sources_are_not_reported() {
    let msg = Message::bot_with_sources("nothing found", Vec::new());
    assert!(!msg.has_sources());
}

#[test]
fn test_message_serialization() {
    let msg = Message::user("hi");
    let json = serde_json::to_value(&msg).unwrap();
    assert_eq!(json["sender"], "user");
    assert_eq!(json["content"], "hi");
    assert!(json.get("sources").is_none());

    let back: Message = serde_json::from_value(json).unwrap();
    assert_eq!(back, msg);
}

#[test]
fn test_message_deserialization_defaults() {
    let msg: Message = serde_json::from_str(r#"{"sender":"bot","content":"x"}"#).unwrap();
    assert_eq!(msg.sender, Sender::Bot);
    assert!(!msg.id.is_empty());
}

#[test]
fn test_coordinates_parse() {
    assert_eq!(
        Coordinates::parse("40.0,-74.0"),
        Some(Coordinates::new(40.0, -74.0))
    );
    assert_eq!(
        Coordinates::parse(" 51.5 , -0.12 "),
        Some(Coordinates::new(51.5, -0.12))
    );
    assert_eq!(Coordinates::parse("40.0"), None);
    assert_eq!(Coordinates::parse("north,west"), None);
    assert_eq!(Coordinates::parse("95.0,10.0"), None);
    assert_eq!(Coordinates::parse("10.0,200.0"), None);
}
