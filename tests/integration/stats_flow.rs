//! Stats overview and category flows

use crate::fixtures::{create_seven_players, create_test_system, DeliveryCall, Operation};
use player_spotlight::delivery::DeliveryError;
use player_spotlight::service::stats::{
    ALREADY_VIEWING_TEXT, OVERVIEW_FAILED_TEXT, UPDATE_FAILED_TEXT,
};
use player_spotlight::service::{ActionContext, StatsActionOutcome};
use player_spotlight::stats::StatsCategory;
use player_spotlight::types::GroupRecord;

#[tokio::test]
async fn test_overview_lists_totals_and_buttons() {
    let system = create_test_system(create_seven_players(), vec![], None);
    system.source.add_group(GroupRecord {
        group_id: -1,
        title: Some("Lounge".to_string()),
        games_played: 2,
    });

    system.app.stats.on_stats_request(-1).await.unwrap();

    match &system.delivery.calls()[0] {
        DeliveryCall::SendText { text, keyboard, .. } => {
            assert!(text.contains("👥 Users: 7\n"));
            assert!(text.contains("🏘 Groups: 1\n"));
            assert!(text.contains("🎮 Games Played: 0\n"));
            assert_eq!(keyboard.as_ref().unwrap().rows.len(), 2);
        }
        other => panic!("unexpected call {:?}", other),
    }
}

#[tokio::test]
async fn test_overview_failure_reports_error() {
    let system = create_test_system(create_seven_players(), vec![], None);
    system.source.set_failing(true);

    system.app.stats.on_stats_request(-1).await.unwrap();
    assert_eq!(system.delivery.sent_texts(), vec![OVERVIEW_FAILED_TEXT.to_string()]);
}

#[tokio::test]
async fn test_selecting_category_twice_replies_already_viewing() {
    let system = create_test_system(create_seven_players(), vec![], None);
    let overview = system.app.stats.on_stats_request(-1).await.unwrap();
    system.delivery.clear();

    let action = ActionContext::new(1, overview.clone(), "stats_users");
    assert_eq!(
        system.app.stats.on_stats_action(&action).await,
        StatsActionOutcome::Selected(StatsCategory::Users)
    );
    assert!(matches!(
        &system.delivery.calls()[1],
        DeliveryCall::EditText { text, .. } if text.contains("👥 Total Users: 7")
    ));

    assert_eq!(
        system.app.stats.on_stats_action(&action).await,
        StatsActionOutcome::AlreadyViewing
    );
    assert_eq!(
        system.delivery.sent_texts(),
        vec![ALREADY_VIEWING_TEXT.to_string()]
    );

    // Reopening the overview forgets the category
    let overview = system.app.stats.on_stats_request(-1).await.unwrap();
    let action = ActionContext::new(1, overview, "stats_users");
    assert_eq!(
        system.app.stats.on_stats_action(&action).await,
        StatsActionOutcome::Selected(StatsCategory::Users)
    );
}

#[tokio::test]
async fn test_sessions_are_kept_per_chat() {
    let system = create_test_system(create_seven_players(), vec![], None);
    let first = system.app.stats.on_stats_request(-1).await.unwrap();
    let second = system.app.stats.on_stats_request(-2).await.unwrap();

    let action = ActionContext::new(1, first, "stats_bot");
    system.app.stats.on_stats_action(&action).await;

    let action = ActionContext::new(1, second, "stats_bot");
    assert_eq!(
        system.app.stats.on_stats_action(&action).await,
        StatsActionOutcome::Selected(StatsCategory::Bot)
    );
}

#[tokio::test]
async fn test_edit_not_modified_replies_already_viewing() {
    let system = create_test_system(create_seven_players(), vec![], None);
    let overview = system.app.stats.on_stats_request(-1).await.unwrap();
    system.delivery.clear();
    system.delivery.fail_next(
        Operation::EditText,
        DeliveryError::classify("Message is not modified"),
    );

    let action = ActionContext::new(1, overview, "stats_groups");
    assert_eq!(
        system.app.stats.on_stats_action(&action).await,
        StatsActionOutcome::AlreadyViewing
    );
    assert_eq!(
        system.delivery.sent_texts(),
        vec![ALREADY_VIEWING_TEXT.to_string()]
    );
}

#[tokio::test]
async fn test_other_edit_failure_replies_error() {
    let system = create_test_system(create_seven_players(), vec![], None);
    let overview = system.app.stats.on_stats_request(-1).await.unwrap();
    system.delivery.clear();
    system.delivery.fail_next(
        Operation::EditText,
        DeliveryError::classify("Bad Request: message to edit not found"),
    );

    let action = ActionContext::new(1, overview.clone(), "stats_top_players");
    assert_eq!(
        system.app.stats.on_stats_action(&action).await,
        StatsActionOutcome::Failed
    );
    assert_eq!(system.delivery.sent_texts(), vec![UPDATE_FAILED_TEXT.to_string()]);

    // The failed category was not remembered
    assert_eq!(system.app.stats.sessions().current(-1).await, None);
}

#[tokio::test]
async fn test_unknown_category_is_ignored() {
    let system = create_test_system(create_seven_players(), vec![], None);
    let overview = system.app.stats.on_stats_request(-1).await.unwrap();
    system.delivery.clear();

    let action = ActionContext::new(1, overview, "stats_moderators");
    assert_eq!(
        system.app.stats.on_stats_action(&action).await,
        StatsActionOutcome::Ignored
    );
    assert_eq!(system.delivery.acknowledgements(), vec![None]);
    assert!(system.delivery.sent_texts().is_empty());
}
