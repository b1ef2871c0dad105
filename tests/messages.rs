use std::sync::atomic::Ordering;

use alumni_messaging::user;

mod common;

#[tokio::test]
async fn repeated_load_with_cache_hits_exact_key_only() {
    let bed = common::messaging_service();
    let alice = user::Id::random();
    let bob = user::Id::random();

    let conversation_id = bed
        .service
        .get_or_create_direct_conversation(&alice, &bob)
        .await
        .unwrap();

    bed.service
        .send_message(&conversation_id, &alice, Some("hello"), Vec::new())
        .await
        .unwrap();

    bed.messages.fetches.store(0, Ordering::SeqCst);

    let first = bed
        .service
        .load_messages(&conversation_id, 20, 0, true)
        .await
        .unwrap();
    let second = bed
        .service
        .load_messages(&conversation_id, 20, 0, true)
        .await
        .unwrap();

    assert_eq!(first.len(), 1);
    assert_eq!(first.len(), second.len());
    assert_eq!(first[0].id(), second[0].id());
    assert_eq!(bed.messages.fetches.load(Ordering::SeqCst), 1);

    // an overlapping page with a different shape is always a miss
    bed.service
        .load_messages(&conversation_id, 10, 0, true)
        .await
        .unwrap();
    assert_eq!(bed.messages.fetches.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn send_invalidates_every_cached_page_of_the_conversation() {
    let bed = common::messaging_service();
    let alice = user::Id::random();
    let bob = user::Id::random();

    let conversation_id = bed
        .service
        .get_or_create_direct_conversation(&alice, &bob)
        .await
        .unwrap();

    for _ in 0..3 {
        bed.service
            .send_message(&conversation_id, &alice, Some("hi"), Vec::new())
            .await
            .unwrap();
    }

    bed.service
        .load_messages(&conversation_id, 2, 0, true)
        .await
        .unwrap();
    bed.service
        .load_messages(&conversation_id, 2, 2, true)
        .await
        .unwrap();
    bed.messages.fetches.store(0, Ordering::SeqCst);

    bed.service
        .send_message(&conversation_id, &bob, Some("reply"), Vec::new())
        .await
        .unwrap();

    bed.service
        .load_messages(&conversation_id, 2, 0, true)
        .await
        .unwrap();
    bed.service
        .load_messages(&conversation_id, 2, 2, true)
        .await
        .unwrap();

    assert_eq!(bed.messages.fetches.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn mark_read_is_idempotent() {
    let bed = common::messaging_service();
    let alice = user::Id::random();
    let bob = user::Id::random();

    let conversation_id = bed
        .service
        .get_or_create_direct_conversation(&alice, &bob)
        .await
        .unwrap();

    bed.service
        .send_message(&conversation_id, &alice, Some("unread"), Vec::new())
        .await
        .unwrap();

    bed.service
        .mark_messages_as_read(&conversation_id, &bob)
        .await
        .unwrap();
    let after_first = bed
        .service
        .load_messages(&conversation_id, 20, 0, false)
        .await
        .unwrap();

    bed.service
        .mark_messages_as_read(&conversation_id, &bob)
        .await
        .unwrap();
    let after_second = bed
        .service
        .load_messages(&conversation_id, 20, 0, false)
        .await
        .unwrap();

    assert!(after_first[0].read_at().is_some());
    assert_eq!(after_first[0].read_at(), after_second[0].read_at());
}

#[tokio::test]
async fn send_trims_text() {
    let bed = common::messaging_service();
    let alice = user::Id::random();
    let bob = user::Id::random();

    let conversation_id = bed
        .service
        .get_or_create_direct_conversation(&alice, &bob)
        .await
        .unwrap();

    let message = bed
        .service
        .send_message(&conversation_id, &alice, Some("  hello  "), Vec::new())
        .await
        .unwrap();

    assert_eq!(message.text(), Some("hello"));
}

#[tokio::test]
async fn direct_conversation_send_and_read_end_to_end() {
    let bed = common::messaging_service();
    let alice = user::Id::random();
    let bob = user::Id::random();

    let conversation_id = bed
        .service
        .get_or_create_direct_conversation(&alice, &bob)
        .await
        .unwrap();

    // an earlier message from bob stays untouched by his own read marker
    bed.service
        .send_message(&conversation_id, &bob, Some("earlier"), Vec::new())
        .await
        .unwrap();

    bed.service
        .send_message(&conversation_id, &alice, Some("hello"), Vec::new())
        .await
        .unwrap();

    let loaded = bed
        .service
        .load_messages(&conversation_id, 20, 0, true)
        .await
        .unwrap();

    let hello = loaded
        .iter()
        .find(|m| m.text() == Some("hello"))
        .expect("sent message should be visible");
    assert_eq!(hello.sender_id(), &alice);
    assert!(hello.read_at().is_none());

    bed.service
        .mark_messages_as_read(&conversation_id, &bob)
        .await
        .unwrap();

    let reloaded = bed
        .service
        .load_messages(&conversation_id, 20, 0, true)
        .await
        .unwrap();

    let hello = reloaded
        .iter()
        .find(|m| m.text() == Some("hello"))
        .unwrap();
    assert!(hello.read_at().is_some());

    let earlier = reloaded
        .iter()
        .find(|m| m.text() == Some("earlier"))
        .unwrap();
    assert!(earlier.read_at().is_none());
}
