//! Lifecycle Scenarios - end-to-end command flows through the dispatcher
//!
//! Each test drives the same text a user would type and checks the reply.

use reviewq_core::application::{
    CommandDispatcher, Invocation, LifecycleEngine, MentionStyle, Outcome, QueueRegistry,
};
use reviewq_core::domain::EntryState;
use reviewq_core::port::FixedTimeProvider;
use std::sync::Arc;

fn dispatcher(style: MentionStyle) -> CommandDispatcher {
    let engine = LifecycleEngine::new(
        Arc::new(QueueRegistry::new()),
        Arc::new(FixedTimeProvider::new(1_700_000_000_000)),
        style,
    );
    CommandDispatcher::new(Arc::new(engine))
}

fn as_user(user: &str) -> Invocation {
    Invocation::new(user, "C1")
}

/// Scenario: add, approve by each reviewer, then the entry reads as approved
#[test]
fn test_add_then_approve_until_cleared() {
    let d = dispatcher(MentionStyle::Slack);

    let reply = d.respond_to_command("queue add Fix https://git/mr/1 <@U2> <@U3>", &as_user("U1"));
    assert!(reply.is_ok());
    assert!(reply.text.starts_with("Queue added (ID: 1): *Fix*"));
    assert!(reply.text.contains("Tags: <@U2>, <@U3>"));

    let reply = d.respond_to_command("queue approve 1", &as_user("U2"));
    assert!(reply.is_ok());
    assert!(reply.text.starts_with("Queue 1 approved by <@U2>. Remaining tags: <@U3>"));
    assert!(reply.text.contains("ID: 1 | Title: Fix | MR: https://git/mr/1 | Tags: <@U3>"));

    let reply = d.respond_to_command("queue approve 1", &as_user("U3"));
    assert!(reply.text.contains("All tags cleared; queue is approved."));
    assert!(reply.text.contains("Tags: none (approved)"));

    let entry = d.engine().snapshot(1).unwrap();
    assert!(entry.tags.is_empty());
    assert_eq!(entry.state(), EntryState::Approved);

    let reply = d.respond_to_command("queue approve 1", &as_user("U2"));
    assert!(reply.is_ok());
    assert!(reply.text.starts_with("Queue 1 is already approved; no tags left."));
}

/// Approving without being tagged leaves the entry untouched
#[test]
fn test_approve_by_untagged_user_is_forbidden() {
    let d = dispatcher(MentionStyle::Slack);
    d.respond_to_command("queue add Fix https://git/mr/1 <@U2>", &as_user("U1"));

    let reply = d.respond_to_command("queue approve 1", &as_user("U9"));
    assert_eq!(reply.outcome, Outcome::Forbidden);
    assert_eq!(reply.text, "Your tag was not found in queue 1.");
    assert_eq!(d.engine().snapshot(1).unwrap().tags, vec!["<@U2>".to_string()]);
}

/// Duplicate tags are removed one approval at a time
#[test]
fn test_duplicate_tag_needs_two_approvals() {
    let d = dispatcher(MentionStyle::Plain);
    d.respond_to_command("queue add Fix link bob bob", &as_user("alice"));

    d.respond_to_command("queue approve 1", &as_user("bob"));
    assert_eq!(d.engine().snapshot(1).unwrap().tags, vec!["bob".to_string()]);

    d.respond_to_command("queue approve 1", &as_user("bob"));
    assert!(d.engine().snapshot(1).unwrap().tags.is_empty());
}

/// Removed ids answer NotFound for every id verb and are never reused
#[test]
fn test_remove_then_not_found() {
    let d = dispatcher(MentionStyle::Plain);
    d.respond_to_command("queue add A l1 bob", &as_user("alice"));

    let reply = d.respond_to_command("queue remove 1", &as_user("alice"));
    assert_eq!(reply.text, "Queue 1 removed.");

    for verb in ["remove", "approve", "review", "update"] {
        let reply = d.respond_to_command(&format!("queue {} 1", verb), &as_user("bob"));
        assert_eq!(reply.outcome, Outcome::NotFound, "verb {}", verb);
        assert_eq!(reply.text, "Queue 1 not found.");
    }

    let reply = d.respond_to_command("queue add B l2 bob", &as_user("alice"));
    assert!(reply.text.starts_with("Queue added (ID: 2)"));
}

/// Review shows the owner in the listing; update restores the tags
#[test]
fn test_review_and_update_cycle() {
    let d = dispatcher(MentionStyle::Slack);
    d.respond_to_command("queue add Fix https://git/mr/1 <@U2>", &as_user("U1"));

    let reply = d.respond_to_command("queue review 1", &as_user("U2"));
    assert!(reply.text.starts_with("Queue 1 is now in review."));
    assert!(reply.text.contains("| Owner: <@U1>"));
    assert_eq!(d.engine().snapshot(1).unwrap().state(), EntryState::InReview);

    let reply = d.respond_to_command("queue update 1", &as_user("U1"));
    assert!(reply
        .text
        .starts_with("Queue 1 has been updated and is no longer in review."));
    assert!(reply.text.contains("| Tags: <@U2>"));
    assert_eq!(d.engine().snapshot(1).unwrap().state(), EntryState::Open);
}

#[test]
fn test_empty_list_literal() {
    let d = dispatcher(MentionStyle::Plain);
    let reply = d.respond_to_command("queue list", &as_user("alice"));
    assert_eq!(reply.text, "No queues available.");
}

#[test]
fn test_malformed_commands_do_not_change_state() {
    let d = dispatcher(MentionStyle::Plain);

    let reply = d.respond_to_command("queue add OnlyTitle", &as_user("alice"));
    assert_eq!(reply.outcome, Outcome::MalformedCommand);

    let reply = d.respond_to_command("queue approve abc", &as_user("alice"));
    assert_eq!(reply.outcome, Outcome::MalformedCommand);

    let reply = d.respond_to_command("queue frobnicate", &as_user("alice"));
    assert_eq!(reply.outcome, Outcome::MalformedCommand);

    assert_eq!(d.engine().stats().total, 0);
}

/// Chatter without the keyword gets no reply on the message path
#[test]
fn test_plain_chatter_is_ignored() {
    let d = dispatcher(MentionStyle::Slack);
    assert!(d.respond_to_message("lunch anyone?", &as_user("U1")).is_none());
    assert!(d.respond_to_message("queue list", &as_user("U1")).is_some());
}
