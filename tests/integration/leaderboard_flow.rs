//! Leaderboard delivery and page-change flows

use crate::fixtures::{
    card_collaborators, create_player, create_seven_players, create_test_system, sent_message,
    DeliveryCall, MockAvatars, MockCards, Operation,
};
use mockall::predicate::eq;
use player_spotlight::delivery::{CardKind, DeliveryError, MessageKind};
use player_spotlight::service::leaderboard::{
    FALLBACK_NOTICE, NO_CHANGES_NOTICE, UPDATE_FAILED_NOTICE,
};
use player_spotlight::service::{ActionContext, EditOutcome};
use player_spotlight::types::StatsWindow;
use std::path::PathBuf;

#[tokio::test]
async fn test_second_page_of_seven_players() {
    let system = create_test_system(create_seven_players(), vec![], None);

    let reply = system
        .app
        .leaderboard
        .on_page_action(StatsWindow::Overall, 1, "leaderboard_2")
        .await
        .unwrap();

    assert_eq!(reply.page, 2);
    assert_eq!(reply.total_pages, 2);
    assert!(reply.text.contains("6. <b>Player6</b> (ID: 6)"));
    assert!(reply.text.contains("7. <b>Player7</b> (ID: 7)"));
    assert!(!reply.text.contains("5. "));

    let pager = reply.pager.unwrap();
    assert_eq!(pager.previous().unwrap().action, "leaderboard_1");
    assert!(pager.next().is_none());

    // Viewer 1 is on page 1, so page 2 locates them
    assert!(reply.text.contains("📌 <b>Your Rank:</b>\n1. Player1 (ID: 1)"));
}

#[tokio::test]
async fn test_initial_request_first_page() {
    let system = create_test_system(create_seven_players(), vec![], None);

    let reply = system
        .app
        .leaderboard
        .on_initial_request(StatsWindow::Overall, 3)
        .await;

    assert_eq!(reply.page, 1);
    assert!(reply.text.contains("3. 🥉 ⭐ <b>Player3</b>"));
    assert!(!reply.text.contains("Your Rank"));
    let pager = reply.pager.unwrap();
    assert!(pager.previous().is_none());
    assert_eq!(pager.next().unwrap().action, "leaderboard_2");
    assert_eq!(pager.indicator.label, "Page 1/2");
}

#[tokio::test]
async fn test_single_page_has_no_pager() {
    let system = create_test_system(vec![create_player(1, 3, 0)], vec![], None);

    let reply = system
        .app
        .leaderboard
        .on_initial_request(StatsWindow::Overall, 1)
        .await;
    assert!(reply.pager.is_none());
}

#[tokio::test]
async fn test_stale_page_lands_on_last_page() {
    let system = create_test_system(create_seven_players(), vec![], None);

    let reply = system
        .app
        .leaderboard
        .on_page_action(StatsWindow::Overall, 1, "leaderboard_9")
        .await
        .unwrap();
    assert_eq!(reply.page, 2);

    let reply = system
        .app
        .leaderboard
        .on_page_action(StatsWindow::Overall, 1, "leaderboard_0")
        .await
        .unwrap();
    assert_eq!(reply.page, 1);
}

#[tokio::test]
async fn test_daily_board_uses_its_own_prefix() {
    let daily: Vec<_> = (1..=6).map(|id| create_player(id, 10 - id as u64, 0)).collect();
    let system = create_test_system(vec![], daily, None);

    let reply = system
        .app
        .leaderboard
        .on_initial_request(StatsWindow::Daily, 1)
        .await;
    assert_eq!(
        reply.pager.unwrap().next().unwrap().action,
        "daily_leaderboard_2"
    );

    assert!(system
        .app
        .leaderboard
        .on_page_action(StatsWindow::Daily, 1, "leaderboard_2")
        .await
        .is_none());
    assert!(system
        .app
        .leaderboard
        .on_page_action(StatsWindow::Daily, 1, "daily_leaderboard_2")
        .await
        .is_some());
}

#[tokio::test]
async fn test_retrieval_fault_renders_empty_board() {
    let system = create_test_system(create_seven_players(), vec![], None);
    system.source.set_failing(true);

    let reply = system
        .app
        .leaderboard
        .on_initial_request(StatsWindow::Overall, 4)
        .await;

    assert_eq!(reply.total_pages, 1);
    assert!(reply.pager.is_none());
    assert!(reply.text.contains("1. Unknown (ID: 4)"));
}

#[tokio::test]
async fn test_deliver_initial_text_only() {
    let system = create_test_system(create_seven_players(), vec![], None);

    let handle = system
        .app
        .leaderboard
        .deliver_initial(StatsWindow::Overall, -500, 2)
        .await
        .unwrap();
    assert_eq!(handle.kind, MessageKind::Text);

    let calls = system.delivery.calls();
    assert_eq!(calls.len(), 3);
    assert!(matches!(
        &calls[0],
        DeliveryCall::SendText { text, keyboard: None, .. } if text == "⏳ Loading leaderboard..."
    ));
    match &calls[1] {
        DeliveryCall::SendText { text, keyboard, .. } => {
            assert!(text.starts_with("<b>──✦ Player Spotlight ✦──</b>"));
            let actions: Vec<_> = keyboard.as_ref().unwrap().actions().collect();
            assert_eq!(actions, vec!["leaderboard_2", "leaderboard:nop"]);
        }
        other => panic!("unexpected call {:?}", other),
    }
    assert_eq!(calls[2], DeliveryCall::Delete { message_id: 1 });
}

#[tokio::test]
async fn test_deliver_initial_with_leader_card() {
    let mut avatars = MockAvatars::new();
    avatars
        .expect_fetch_avatar()
        .with(eq(1))
        .times(1)
        .returning(|_| Ok(Some(PathBuf::from("/tmp/leader.jpg"))));

    let mut cards = MockCards::new();
    cards
        .expect_render_card()
        .with(eq(CardKind::Leaderboard), eq(Some(PathBuf::from("/tmp/leader.jpg"))))
        .times(1)
        .returning(|_, _| Ok(vec![0u8; 64]));

    let system = create_test_system(
        create_seven_players(),
        vec![],
        Some(card_collaborators(cards, avatars)),
    );

    let handle = system
        .app
        .leaderboard
        .deliver_initial(StatsWindow::Overall, -500, 6)
        .await
        .unwrap();
    assert!(handle.is_photo());

    let calls = system.delivery.calls();
    assert!(calls.iter().any(|call| matches!(
        call,
        DeliveryCall::SendPhoto { bytes: 64, caption, .. } if caption.contains("Your Rank")
    )));
}

#[tokio::test]
async fn test_card_failure_falls_back_to_text() {
    let mut avatars = MockAvatars::new();
    avatars
        .expect_fetch_avatar()
        .returning(|_| Err(anyhow::anyhow!("photo download failed")));

    let mut cards = MockCards::new();
    cards
        .expect_render_card()
        .with(eq(CardKind::DailyLeaderboard), eq(None))
        .returning(|_, _| Err(anyhow::anyhow!("font missing")));

    let system = create_test_system(
        vec![],
        create_seven_players(),
        Some(card_collaborators(cards, avatars)),
    );

    let handle = system
        .app
        .leaderboard
        .deliver_initial(StatsWindow::Daily, -500, 1)
        .await
        .unwrap();
    assert_eq!(handle.kind, MessageKind::Text);

    let texts = system.delivery.sent_texts();
    assert_eq!(texts[0], "⏳ Loading daily leaderboard...");
    assert!(texts[1].contains("🥇 ⭐ <b>Player1</b>"));
    assert!(!system
        .delivery
        .calls()
        .iter()
        .any(|call| matches!(call, DeliveryCall::SendPhoto { .. })));
}

#[tokio::test]
async fn test_placeholder_failures_are_ignored() {
    let system = create_test_system(create_seven_players(), vec![], None);
    system.delivery.fail_next(
        Operation::SendText,
        DeliveryError::Unavailable {
            message: "flood control".to_string(),
        },
    );

    let handle = system
        .app
        .leaderboard
        .deliver_initial(StatsWindow::Overall, -500, 1)
        .await;
    assert!(handle.is_ok());
    assert!(!system
        .delivery
        .calls()
        .iter()
        .any(|call| matches!(call, DeliveryCall::Delete { .. })));
}

#[tokio::test]
async fn test_page_edit_on_photo_updates_caption() {
    let system = create_test_system(create_seven_players(), vec![], None);
    let action = ActionContext::new(1, sent_message(MessageKind::Photo), "leaderboard_2");

    let outcome = system
        .app
        .leaderboard
        .deliver_page_action(StatsWindow::Overall, &action)
        .await;
    assert_eq!(outcome, EditOutcome::Updated);

    let calls = system.delivery.calls();
    assert!(matches!(&calls[0], DeliveryCall::EditCaption { message_id: 77, caption, .. } if caption.contains("6. ")));
    assert_eq!(system.delivery.acknowledgements(), vec![None]);
}

#[tokio::test]
async fn test_page_edit_not_modified_is_acknowledged() {
    let system = create_test_system(create_seven_players(), vec![], None);
    system.delivery.fail_next(
        Operation::EditText,
        DeliveryError::classify("Bad Request: message is not modified"),
    );
    let action = ActionContext::new(1, sent_message(MessageKind::Text), "leaderboard_1");

    let outcome = system
        .app
        .leaderboard
        .deliver_page_action(StatsWindow::Overall, &action)
        .await;

    assert_eq!(outcome, EditOutcome::Unchanged);
    assert_eq!(
        system.delivery.acknowledgements(),
        vec![Some(NO_CHANGES_NOTICE.to_string())]
    );
}

#[tokio::test]
async fn test_caption_failure_falls_back_to_text_edit() {
    let system = create_test_system(create_seven_players(), vec![], None);
    system.delivery.fail_next(
        Operation::EditCaption,
        DeliveryError::classify("Bad Request: there is no caption in the message"),
    );
    let action = ActionContext::new(1, sent_message(MessageKind::Photo), "leaderboard_2");

    let outcome = system
        .app
        .leaderboard
        .deliver_page_action(StatsWindow::Overall, &action)
        .await;
    assert_eq!(outcome, EditOutcome::FellBack);

    let calls = system.delivery.calls();
    match &calls[1] {
        DeliveryCall::EditText { text, .. } => {
            assert!(text.starts_with(&format!("{}\n\n<b>──✦ Player Spotlight", FALLBACK_NOTICE)));
        }
        other => panic!("unexpected call {:?}", other),
    }
    assert_eq!(system.delivery.acknowledgements(), vec![None]);

    assert_eq!(
        system
            .app
            .metrics
            .faults()
            .render_faults_total
            .with_label_values(&["edit_caption"])
            .get(),
        1
    );
}

#[tokio::test]
async fn test_both_edits_failing_apologises() {
    let system = create_test_system(create_seven_players(), vec![], None);
    system.delivery.fail_next(
        Operation::EditCaption,
        DeliveryError::classify("Bad Request: message to edit not found"),
    );
    system.delivery.fail_next(
        Operation::EditText,
        DeliveryError::classify("Bad Request: message to edit not found"),
    );
    let action = ActionContext::new(1, sent_message(MessageKind::Photo), "leaderboard_2");

    let outcome = system
        .app
        .leaderboard
        .deliver_page_action(StatsWindow::Overall, &action)
        .await;

    assert_eq!(outcome, EditOutcome::Failed);
    assert_eq!(
        system.delivery.acknowledgements(),
        vec![Some(UPDATE_FAILED_NOTICE.to_string())]
    );
}

#[tokio::test]
async fn test_malformed_token_is_silently_acknowledged() {
    let system = create_test_system(create_seven_players(), vec![], None);
    let action = ActionContext::new(1, sent_message(MessageKind::Text), "leaderboard:nop");

    let outcome = system
        .app
        .leaderboard
        .deliver_page_action(StatsWindow::Overall, &action)
        .await;

    assert_eq!(outcome, EditOutcome::Ignored);
    assert_eq!(
        system.delivery.calls(),
        vec![DeliveryCall::Acknowledge {
            message_id: 77,
            notice: None
        }]
    );
    assert_eq!(
        system.app.metrics.faults().malformed_actions_total.get(),
        1
    );
}

#[tokio::test]
async fn test_concurrent_viewers_get_independent_pages() {
    let system = create_test_system(create_seven_players(), vec![], None);
    let service = system.app.leaderboard.clone();

    let requests = (1..=7).map(|viewer| {
        let service = service.clone();
        async move {
            service
                .on_page_action(StatsWindow::Overall, viewer, "leaderboard_2")
                .await
                .map(|reply| (viewer, reply))
        }
    });
    let replies = futures::future::join_all(requests).await;

    for (viewer, reply) in replies.into_iter().flatten() {
        let highlighted = reply.text.contains("⭐ <b>");
        assert_eq!(highlighted, viewer >= 6, "viewer {}", viewer);
        assert_eq!(reply.text.contains("Your Rank"), viewer < 6);
    }
}

#[tokio::test]
async fn test_viewer_beyond_fetch_limit_keeps_real_rank() {
    let players: Vec<_> = (1..=150).map(|id| create_player(id, 200 - id as u64, 0)).collect();
    let system = create_test_system(players, vec![], None);
    assert_eq!(system.app.store.fetch_limit(), 100);

    let reply = system
        .app
        .leaderboard
        .on_initial_request(StatsWindow::Overall, 140)
        .await;
    assert!(reply
        .text
        .contains("📌 <b>Your Rank:</b>\n140. Player140 (ID: 140)\n   🎮 Games: 120"));
    assert!(!reply.text.contains("Unknown"));

    // The board and the rank report agree on the same user
    let report = system.app.ranks.on_rank_request(140).await;
    assert_eq!(report.overall.rank, 140);
    assert_eq!(report.overall.display_name, "Player140");

    let stranger = system
        .app
        .leaderboard
        .on_initial_request(StatsWindow::Overall, 999)
        .await;
    assert!(stranger.text.contains("151. Unknown (ID: 999)"));
}
