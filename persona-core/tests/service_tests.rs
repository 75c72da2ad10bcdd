// tests/service_tests.rs

use std::sync::Arc;

use tokio::time::{timeout, Duration};

use persona_common::models::{Author, CharacterConfig, ContentNode, ConversationEvent};
use persona_core::collector::filters::mentions_user;
use persona_core::{CharacterService, Error};

fn config(groups: &[&str]) -> CharacterConfig {
    CharacterConfig {
        apply_group: groups.iter().map(|g| g.to_string()).collect(),
        max_messages: 7,
        ..CharacterConfig::default()
    }
}

#[tokio::test]
async fn test_only_configured_groups_are_collected() {
    let service = CharacterService::new(config(&["g1"])).unwrap();

    let inside = ConversationEvent::group_message("g1", Author::new("1", "a"), "hello");
    let outside = ConversationEvent::group_message("g2", Author::new("1", "a"), "hello");
    let direct = ConversationEvent::direct_message(Author::new("1", "a"), "hello");

    assert!(service.handle_message(&inside).await);
    assert!(!service.handle_message(&outside).await);
    assert!(!service.handle_message(&direct).await);

    let collector = service.collector();
    assert_eq!(collector.get_history("g1").await.unwrap().len(), 1);
    assert!(collector.get_history("g2").await.is_none());
}

#[tokio::test]
async fn test_invalid_config_is_rejected() {
    let mut bad = config(&["g1"]);
    bad.max_messages = 100;
    match CharacterService::new(bad) {
        Err(Error::Config(msg)) => assert!(msg.contains("maxMessages")),
        Err(other) => panic!("expected a config error, got {:?}", other),
        Ok(_) => panic!("config with maxMessages=100 must be rejected"),
    }
}

#[tokio::test]
async fn test_bus_delivers_filtered_messages() {
    let service = CharacterService::new(config(&["g1"])).unwrap();
    service.collector().add_filter(Arc::new(mentions_user("7")));
    let mut rx = service.event_bus().subscribe(Some(8));

    let plain = ConversationEvent::group_message("g1", Author::new("1", "a"), "just chatting");
    service.handle_message(&plain).await;

    let ping = ConversationEvent::group_message("g1", Author::new("2", "b"), "hey bot")
        .with_elements(vec![ContentNode::text("hey "), ContentNode::at("7", "bot")]);
    service.handle_message(&ping).await;

    let collected = timeout(Duration::from_millis(500), rx.recv())
        .await
        .expect("notification should arrive")
        .expect("bus should stay open");
    assert_eq!(collected.group_id, "g1");
    assert_eq!(collected.history.len(), 2);
    assert_eq!(collected.history[0].content, "just chatting");
    assert_eq!(collected.history[1].content, "hey [at:7,name: bot]");
    assert!(rx.try_recv().is_err(), "only the mention should have notified");
}

#[tokio::test]
async fn test_outgoing_lines_join_history_without_notifying() {
    let service = CharacterService::new(config(&["g1"])).unwrap();
    service.collector().register_filter(|_, _| true);
    let mut rx = service.event_bus().subscribe(Some(8));

    let incoming = ConversationEvent::group_message("g1", Author::new("1", "a"), "anyone here?");
    service.handle_message(&incoming).await;
    let first = rx.recv().await.unwrap();
    assert_eq!(first.history.len(), 1);

    let mut reply_ctx = incoming.clone();
    reply_ctx.bot.id = Some("7".into());
    reply_ctx.bot.username = "persona".into();
    service
        .handle_outgoing(&reply_ctx, &[ContentNode::text("me!")])
        .await;
    assert!(rx.try_recv().is_err());

    let history = service.collector().get_history("g1").await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[1].content, "me!");
    assert!(history[1].is_from("7"));
}
