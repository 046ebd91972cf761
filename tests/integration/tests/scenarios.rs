//! End-to-end scenarios against a configured runtime
//!
//! Run with: cargo test -p integration-tests --test scenarios

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use integration_tests::{chatter, grantable_chatter, runtime, unique_name, RecordingTarget};
use schat_common::AppError;
use schat_core::entities::{Channel, Message, MessageTarget, Targets, TargetsError};
use schat_core::events::{
    Cancellable, Event, MessageEvent, SendChannelMessageEvent, SendMessageEvent,
};
use schat_core::settings::{Setting, Settings};
use schat_core::traits::{ChannelRepository, ChatterRepository};
use schat_core::DomainError;

// ============================================================================
// Membership
// ============================================================================

#[test]
fn test_join_twice_is_idempotent() {
    let runtime = runtime(&["test"]).unwrap();
    let a = chatter(&runtime, "A").unwrap();
    let test = runtime.channels().get("test").unwrap();

    a.join(&test).unwrap();
    a.join(&test).unwrap();

    assert_eq!(a.channels().len(), 1);
    assert_eq!(test.targets().len(), 1);
    assert!(test.is_member(&a.target_id()));
}

#[test]
fn test_active_channel_is_always_joined() {
    let runtime = runtime(&["one", "two", "three"]).unwrap();
    let a = chatter(&runtime, "A").unwrap();
    let channels: Vec<Arc<Channel>> = ["one", "two", "three"]
        .iter()
        .map(|key| runtime.channels().get(key).unwrap())
        .collect();

    let check = || {
        if let Some(active) = a.active_channel() {
            assert!(a.is_joined(&active));
        }
    };

    a.set_active_channel(Some(&channels[0])).unwrap();
    check();
    a.join(&channels[1]).unwrap();
    a.set_active_channel(Some(&channels[2])).unwrap();
    check();
    a.leave(&channels[0]);
    check();
    a.leave(&channels[2]);
    check();
    assert!(a.active_channel().is_none());
    a.set_active_channel(Some(&channels[1])).unwrap();
    check();
    a.set_active_channel(None).unwrap();
    assert!(a.active_channel().is_none());
    assert!(a.is_joined(&channels[1]));
}

#[test]
fn test_leave_clears_active_channel() {
    let runtime = runtime(&["test"]).unwrap();
    let a = chatter(&runtime, "A").unwrap();
    let test = runtime.channels().get("test").unwrap();

    a.set_active_channel(Some(&test)).unwrap();
    a.leave(&test);

    assert!(a.active_channel().is_none());
    assert!(!a.is_joined(&test));
    assert!(test.targets().is_empty());
}

#[test]
fn test_channel_removal_cascades_to_members() {
    let runtime = runtime(&["test"]).unwrap();
    let a = chatter(&runtime, "A").unwrap();
    let b = chatter(&runtime, "B").unwrap();
    let test = runtime.channels().get("test").unwrap();
    a.set_active_channel(Some(&test)).unwrap();
    b.join(&test).unwrap();

    runtime.channels().remove("test");

    assert!(a.channels().is_empty());
    assert!(a.active_channel().is_none());
    assert!(b.channels().is_empty());
    assert!(test.targets().is_empty());
}

#[test]
fn test_removed_chatter_stops_receiving() {
    let runtime = runtime(&["test:auto_join"]).unwrap();
    let a = chatter(&runtime, "A").unwrap();
    let test = runtime.channels().get("test").unwrap();

    runtime.remove_chatter(a.id());
    runtime
        .send_message()
        .send(Message::with_text("anyone?").to(Arc::clone(&test)).build());

    assert!(a.messages().is_empty());
    assert!(runtime.chatters().find(a.id()).is_none());
}

#[test]
fn test_new_chatter_joins_auto_join_channel() {
    let runtime = runtime(&["news:auto_join"]).unwrap();
    let a = chatter(&runtime, "A").unwrap();
    let news = runtime.channels().get("news").unwrap();

    assert!(a.is_joined(&news));
    assert!(a.is_active_channel(&news));
}

// ============================================================================
// Settings
// ============================================================================

#[test]
fn test_settings_fall_back_to_default() {
    const LIMIT: Setting<u32> = Setting::new("limit", || 7);
    let settings = Settings::new();

    assert_eq!(settings.get(&LIMIT), LIMIT.default_value());
    assert!(!settings.contains(&LIMIT));
    assert_eq!(settings.get_or_default(&LIMIT, 3), 3);
}

// ============================================================================
// Dispatch
// ============================================================================

#[test]
fn test_cancelled_send_delivers_nothing() {
    let runtime = runtime(&[]).unwrap();
    let target = RecordingTarget::new(unique_name("target"));
    runtime.event_bus().on(|event: &mut SendMessageEvent| {
        event.cancel();
        Ok(())
    });

    let message = runtime
        .send_message()
        .send(Message::with_text("hi").to(Arc::clone(&target)).build());

    assert_eq!(message.text(), "hi");
    assert_eq!(target.count(), 0);
}

#[test]
fn test_fan_out_reaches_each_target_once_per_send() {
    let runtime = runtime(&[]).unwrap();
    let t1 = RecordingTarget::new(unique_name("t"));
    let t2 = RecordingTarget::new(unique_name("t"));
    let channel = runtime.channel_builder("fanout").build().unwrap();
    channel.add_target(Arc::clone(&t1));

    // t1 is reachable both directly and through the channel
    let targets = Targets::of([
        Arc::clone(&t1) as Arc<dyn MessageTarget>,
        Arc::clone(&t2) as Arc<dyn MessageTarget>,
        Arc::clone(&channel) as Arc<dyn MessageTarget>,
    ]);
    let message = Message::with_text("m").targets(&targets).build();

    runtime.send_message().send(message.clone());

    assert_eq!(t1.received(), vec![message.clone()]);
    assert_eq!(t2.received(), vec![message.clone()]);

    targets.send_message(&message);
    assert_eq!(t1.count(), 2);
    assert_eq!(t2.count(), 2);
}

#[test]
fn test_repeated_send_reaches_every_target_kind_alike() {
    let runtime = runtime(&["test"]).unwrap();
    let a = chatter(&runtime, "A").unwrap();
    let test = runtime.channels().get("test").unwrap();
    a.join(&test).unwrap();
    let spy = RecordingTarget::new(unique_name("spy"));
    test.add_target(Arc::clone(&spy));

    let message = Message::with_text("m").to(Arc::clone(&test)).build();
    runtime.send_message().send(message.clone());
    runtime.send_message().send(message);

    assert_eq!(spy.count(), 2);
    assert_eq!(a.messages().len(), 2);
    assert_eq!(test.messages().len(), 2);
}

#[test]
fn test_unmodifiable_view_reflects_backing_targets() {
    let targets = Targets::new();
    let view = targets.unmodifiable();
    let x = RecordingTarget::new(unique_name("x"));

    assert_eq!(view.add(Arc::clone(&x)), Err(TargetsError::Unmodifiable));
    assert!(!view.contains(x.as_ref()));

    targets.add(Arc::clone(&x)).unwrap();
    assert!(view.contains(x.as_ref()));
}

#[test]
fn test_channel_event_can_redirect_without_touching_membership() {
    let runtime = runtime(&["test"]).unwrap();
    let a = chatter(&runtime, "A").unwrap();
    let test = runtime.channels().get("test").unwrap();
    a.set_active_channel(Some(&test)).unwrap();
    let spy = RecordingTarget::new(unique_name("spy"));
    let injected = Arc::clone(&spy);
    runtime
        .event_bus()
        .on(move |event: &mut SendChannelMessageEvent| {
            event.targets().clear()?;
            event.targets().add(Arc::clone(&injected))?;
            Ok(())
        });

    runtime.send_message().chat(&a, "hello").unwrap();

    assert_eq!(spy.texts(), vec!["hello"]);
    assert!(a.messages().is_empty());
    assert!(test.is_member(&a.target_id()));
}

#[test]
fn test_failing_handler_does_not_abort_post() {
    let runtime = runtime(&[]).unwrap();
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    runtime
        .event_bus()
        .on(|_: &mut SendMessageEvent| Err(anyhow::anyhow!("handler failed")));
    runtime.event_bus().on::<dyn Event, _>(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(())
    });
    let target = RecordingTarget::new(unique_name("target"));

    runtime
        .send_message()
        .send(Message::with_text("still here").to(Arc::clone(&target)).build());

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(target.texts(), vec!["still here"]);
}

#[test]
fn test_message_event_supertype_sees_every_message_event() {
    let runtime = runtime(&["test"]).unwrap();
    let a = chatter(&runtime, "A").unwrap();
    let test = runtime.channels().get("test").unwrap();
    a.set_active_channel(Some(&test)).unwrap();
    let seen = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&seen);
    runtime.event_bus().on::<dyn MessageEvent, _>(move |event| {
        assert_eq!(event.message().text(), "hi");
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(())
    });

    runtime.send_message().chat(&a, "hi").unwrap();

    // the send event and the channel event
    assert_eq!(seen.load(Ordering::SeqCst), 2);
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_chat_in_active_channel() {
    let runtime = runtime(&["test"]).unwrap();
    let a = chatter(&runtime, "A").unwrap();
    let b = chatter(&runtime, "B").unwrap();
    let test = runtime.channels().get("test").unwrap();

    a.join(&test).unwrap();
    assert!(a.is_joined(&test));
    assert!(a.channels().iter().any(|channel| channel.key() == "test"));

    b.join(&test).unwrap();
    a.set_active_channel(Some(&test)).unwrap();
    let message = runtime.send_message().chat(&a, "hi").unwrap();

    assert_eq!(message.source(), a.identity());
    assert_eq!(message.targets().ids(), vec![test.target_id()]);
    let members = test.targets().chatter_ids();
    assert_eq!(members.len(), 2);
    for id in members {
        let member = runtime.chatters().get(id).unwrap();
        assert_eq!(member.last_message(), Some(message.clone()));
    }
    assert_eq!(test.last_message(), Some(message));
}

#[test]
fn test_protected_channel_requires_permission() {
    let runtime = runtime(&["vip:protected"]).unwrap();
    let (b, permissions) = grantable_chatter(&runtime, "B").unwrap();
    let vip = runtime.channels().get("vip").unwrap();

    let err = b.join(&vip).unwrap_err();
    assert!(matches!(err, DomainError::AccessDenied { .. }));
    assert!(!b.is_joined(&vip));

    let err = AppError::from(runtime.interactor().join_channel(b.id(), "vip").unwrap_err());
    assert_eq!(err.error_code(), "ACCESS_DENIED");
    assert!(err.is_user_error());

    permissions.grant(vip.get(&Channel::JOIN_PERMISSION));
    b.join(&vip).unwrap();
    assert!(b.is_joined(&vip));
}

#[test]
fn test_private_conversation() {
    let runtime = runtime(&[]).unwrap();
    let a = chatter(&runtime, "A").unwrap();
    let b = chatter(&runtime, "B").unwrap();

    let first = runtime.send_message().send_private(&a, &b, "psst");
    let second = runtime.send_message().send_private(&b, &a, "what");

    assert_eq!(runtime.channels().len(), 1);
    let private = runtime.channels().all().remove(0);
    assert!(private.is(&Channel::PRIVATE));
    assert_eq!(b.messages().len(), 2);
    assert_eq!(a.last_message(), Some(second));
    assert!(b.messages().contains(&first));
}

#[test]
fn test_private_conversation_is_closed_to_others() {
    let runtime = runtime(&[]).unwrap();
    let a = chatter(&runtime, "A").unwrap();
    let b = chatter(&runtime, "B").unwrap();
    let eve = chatter(&runtime, "Eve").unwrap();
    runtime.send_message().send_private(&a, &b, "hello");
    let private = runtime.channels().all().remove(0);

    let err = runtime
        .interactor()
        .join_channel(eve.id(), private.key())
        .unwrap_err();
    runtime.send_message().send_private(&a, &b, "secret");

    assert!(err.is_authorization());
    assert!(!eve.is_joined(&private));
    assert!(eve.messages().is_empty());
    assert_eq!(b.messages().len(), 2);
}

#[test]
fn test_forced_channel_cannot_be_left() {
    let runtime = runtime(&["global:auto_join+forced"]).unwrap();
    let a = chatter(&runtime, "A").unwrap();

    let err = runtime.interactor().leave_channel(a.id(), "global").unwrap_err();

    assert!(matches!(err, DomainError::CannotLeaveForcedChannel(_)));
    assert_eq!(
        a.active_channel().map(|channel| channel.key().to_string()),
        Some("global".to_string())
    );
}

#[test]
fn test_targets_resolve_from_tagged_ids() {
    let runtime = runtime(&["test"]).unwrap();
    let a = chatter(&runtime, "A").unwrap();
    let spy = RecordingTarget::new("spy");
    runtime.resolver().register(spy.clone());

    let channel = runtime.resolver().resolve_str("channel:test").unwrap();
    let found = runtime
        .resolver()
        .resolve_str(&a.target_id().to_string())
        .unwrap();
    let custom = runtime.resolver().resolve_str("custom:spy").unwrap();

    assert!(channel.as_channel().is_some());
    assert_eq!(found.as_chatter().map(|c| c.id()), Some(a.id()));
    custom.send_message(&Message::with_text("ping").build());
    assert_eq!(spy.texts(), vec!["ping"]);
}
