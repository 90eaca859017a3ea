//! Rank report and user info card flows

use crate::fixtures::{
    create_player, create_seven_players, create_test_system, sent_message, DeliveryCall,
    Operation,
};
use player_spotlight::delivery::{DeliveryError, MessageKind};
use player_spotlight::service::rank::USERINFO_UPDATE_FAILED_NOTICE;
use player_spotlight::service::{ActionContext, EditOutcome};
use player_spotlight::types::UserStatRecord;

#[tokio::test]
async fn test_rank_report_combines_windows() {
    let daily = vec![create_player(9, 1, 0), create_player(3, 2, 5)];
    let system = create_test_system(create_seven_players(), daily, None);

    let report = system.app.ranks.on_rank_request(3).await;

    assert_eq!(report.overall.rank, 3);
    assert_eq!(report.overall.total_users, 7);
    assert_eq!(report.daily.rank, 1);
    assert_eq!(report.daily.total_users, 2);
    assert!(report.text.contains("Rank: 3. Player3\n"));
    assert!(report.text.contains("🎮 Played: 4 | Wins: 2 | Losses: 2 | Win %: 50.0\n"));
    assert!(report.text.contains("🆔 User ID: 3\n"));
}

#[tokio::test]
async fn test_rank_report_for_unknown_user() {
    let system = create_test_system(create_seven_players(), vec![], None);

    let report = system.app.ranks.on_rank_request(404).await;
    assert_eq!(report.overall.rank, 8);
    assert_eq!(report.daily.rank, 1);
    assert_eq!(report.daily.total_users, 0);
    assert_eq!(report.overall.win_percent, 0.0);
}

#[tokio::test]
async fn test_rank_report_degrades_on_fault() {
    let system = create_test_system(create_seven_players(), vec![], None);
    system.source.set_failing(true);

    let report = system.app.ranks.on_rank_request(2).await;
    assert_eq!(report.overall.rank, 1);
    assert_eq!(report.overall.total_users, 0);
    assert_eq!(report.overall.display_name, "Unknown");
}

#[tokio::test]
async fn test_deliver_rank_sends_report() {
    let system = create_test_system(create_seven_players(), vec![], None);

    system.app.ranks.deliver_rank(-500, 5).await.unwrap();
    let texts = system.delivery.sent_texts();
    assert_eq!(texts.len(), 1);
    assert!(texts[0].contains("Rank: 5. Player5"));
}

#[tokio::test]
async fn test_userinfo_initial_card() {
    let system = create_test_system(create_seven_players(), vec![], None);

    system.app.ranks.deliver_userinfo(-500, 2).await.unwrap();
    let calls = system.delivery.calls();

    assert_eq!(calls.len(), 3);
    match &calls[1] {
        DeliveryCall::SendText { text, keyboard, .. } => {
            assert!(text.contains("┃ 👤 <b>Player2</b>"));
            assert!(text.contains("🏆 𝐑𝐚𝐧𝐤: 2"));
            let actions: Vec<_> = keyboard.as_ref().unwrap().actions().collect();
            assert_eq!(actions, vec!["userinfo_daily_2", "userinfo_overall_2"]);
        }
        other => panic!("unexpected call {:?}", other),
    }
}

#[tokio::test]
async fn test_userinfo_daily_toggle_uses_daily_rank() {
    let daily = vec![
        UserStatRecord {
            user_id: 2,
            games_played: 1,
            wins: 1,
            total_score: 1,
            ..Default::default()
        },
        UserStatRecord {
            user_id: 5,
            games_played: 2,
            wins: 2,
            total_score: 0,
            ..Default::default()
        },
    ];
    let system = create_test_system(create_seven_players(), daily, None);

    let card = system
        .app
        .ranks
        .on_userinfo_action("userinfo_daily_2")
        .await
        .unwrap();
    // More daily wins outrank a higher daily score
    assert!(card.text.contains("🏆 Daily Rank: 2\n"));
    assert!(card.text.contains("📊 Win %: 100.0%\n"));
}

#[tokio::test]
async fn test_userinfo_toggle_edits_text_message() {
    let system = create_test_system(create_seven_players(), vec![], None);
    let action = ActionContext::new(4, sent_message(MessageKind::Text), "userinfo_overall_4");

    let outcome = system.app.ranks.deliver_userinfo_action(&action).await;
    assert_eq!(outcome, EditOutcome::Updated);

    let calls = system.delivery.calls();
    assert!(matches!(&calls[0], DeliveryCall::EditText { text, .. } if text.contains("💡 Track your progress over time!")));
    assert_eq!(system.delivery.acknowledgements(), vec![None]);
}

#[tokio::test]
async fn test_userinfo_toggle_falls_back_to_other_edit() {
    let system = create_test_system(create_seven_players(), vec![], None);
    system.delivery.fail_next(
        Operation::EditText,
        DeliveryError::classify("Bad Request: there is no text in the message to edit"),
    );
    let action = ActionContext::new(4, sent_message(MessageKind::Text), "userinfo_daily_4");

    let outcome = system.app.ranks.deliver_userinfo_action(&action).await;
    assert_eq!(outcome, EditOutcome::FellBack);
    assert!(matches!(
        system.delivery.calls()[1],
        DeliveryCall::EditCaption { .. }
    ));
}

#[tokio::test]
async fn test_userinfo_both_edits_failing_apologises() {
    let system = create_test_system(create_seven_players(), vec![], None);
    system
        .delivery
        .fail_next(Operation::EditCaption, DeliveryError::classify("message to edit not found"));
    system
        .delivery
        .fail_next(Operation::EditText, DeliveryError::classify("message to edit not found"));
    let action = ActionContext::new(4, sent_message(MessageKind::Photo), "userinfo_daily_4");

    let outcome = system.app.ranks.deliver_userinfo_action(&action).await;
    assert_eq!(outcome, EditOutcome::Failed);

    let calls = system.delivery.calls();
    assert!(matches!(calls[0], DeliveryCall::EditCaption { .. }));
    assert!(matches!(calls[1], DeliveryCall::EditText { .. }));
    assert_eq!(
        system.delivery.acknowledgements(),
        vec![Some(USERINFO_UPDATE_FAILED_NOTICE.to_string())]
    );
}

#[tokio::test]
async fn test_userinfo_malformed_tokens_ignored() {
    let system = create_test_system(create_seven_players(), vec![], None);

    for token in ["userinfo_daily", "userinfo_daily_abc", "userinfo_daily_1_extra"] {
        let action = ActionContext::new(1, sent_message(MessageKind::Photo), token);
        let outcome = system.app.ranks.deliver_userinfo_action(&action).await;
        assert_eq!(outcome, EditOutcome::Ignored, "token {}", token);
    }
    assert_eq!(system.delivery.acknowledgements().len(), 3);
}
