use chat_db::{AnalysisConfig, AuthorStore};
use chat_msg::{Channel, Message};
use proptest::prelude::*;
use serde_json::json;

fn message(index: usize, author: u8, day: u8, words: u8, mentions: &[u8], emoji: Option<u8>) -> Message {
    let content = vec!["word"; words as usize].join(" ");
    let reactions: Vec<_> = emoji
        .map(|e| json!({ "emoji": { "id": e.to_string(), "name": format!("e{}", e % 3) }, "count": 1 + e as u64 }))
        .into_iter()
        .collect();
    serde_json::from_value(json!({
        "id": format!("m{}", index),
        "timestamp": format!("2020-03-{:02}T12:00:00+00:00", day),
        "content": content,
        "author": { "id": format!("u{}", author), "name": format!("user {} at {}", author, day) },
        "embeds": if words % 2 == 0 { json!([{ "title": "t" }]) } else { json!([]) },
        "attachments": if words % 3 == 0 { json!([{ "id": "f" }]) } else { json!([]) },
        "reactions": reactions,
        "mentions": mentions.iter().map(|m| json!({ "id": format!("u{}", m) })).collect::<Vec<_>>(),
    }))
    .unwrap()
}

fn arb_messages() -> impl Strategy<Value = Vec<Message>> {
    prop::collection::vec(
        (
            0u8..6,
            1u8..29,
            0u8..12,
            prop::collection::vec(0u8..8, 0..3),
            prop::option::of(0u8..5),
        ),
        1..60,
    )
    .prop_map(|rows| {
        rows
            .into_iter()
            .enumerate()
            .map(|(index, (author, day, words, mentions, emoji))| {
                message(index, author, day, words, &mentions, emoji)
            })
            .collect()
    })
}

fn into_channels(messages: Vec<Message>, count: usize) -> Vec<Channel> {
    let mut channels: Vec<Channel> = (0..count)
        .map(|_| serde_json::from_value(json!({ "messages": [] })).unwrap())
        .collect();
    for (index, message) in messages.into_iter().enumerate() {
        channels[index % count].messages.push(message);
    }
    channels
}

proptest! {
    #[test]
    fn test_any_order_any_split_same_aggregates(
        (messages, shuffled) in arb_messages().prop_flat_map(|messages| {
            let shuffled = Just(messages.clone()).prop_shuffle();
            (Just(messages), shuffled)
        }),
        workers in 1usize..6,
    ) {
        let serial = AuthorStore::new(AnalysisConfig::default());
        for channel in into_channels(messages, 1).iter() {
            serial.process_channel(channel);
        }

        let parallel = AuthorStore::new(AnalysisConfig::default());
        parallel.process_channels(&into_channels(shuffled, workers));

        let expected = serial.aggregates();
        let actual = parallel.aggregates();
        prop_assert_eq!(&expected, &actual);
        for (e, a) in expected.iter().zip(actual.iter()) {
            prop_assert_eq!(&e.author().name, &a.author().name);
        }
        prop_assert!(parallel.verify().is_ok());
    }
}
