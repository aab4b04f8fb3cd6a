//! Pipeline behavior: filters, ordering, capability selection, verification.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use serde_json::json;

use resguard_core::error::ClientCode;
use resguard_core::{
    ActionFilter, HandlerDef, Request, RequestPipeline, Resolved, ResolutionContext, RuleOptions,
};

mod support;
use support::{FakeStore, RecordingPolicy};

const ACTIONS: [&str; 7] = ["index", "show", "new", "create", "update", "destroy", "archive"];

#[test]
fn except_never_runs_for_the_excluded_action() {
    let store = FakeStore::billing();
    let mut handler = HandlerDef::new("invoices");
    handler.register_authorize((), RuleOptions::new().except(["destroy"]));

    for action in ACTIONS {
        let policy = RecordingPolicy::new();
        let mut ctx = ResolutionContext::new(Request::new(action), &store, &policy);
        RequestPipeline::new(&handler).run(&mut ctx).unwrap();
        assert_eq!(
            policy.checks().is_empty(),
            action == "destroy",
            "action={action}"
        );
    }
}

#[test]
fn except_wins_when_only_names_the_same_action() {
    let store = FakeStore::billing();
    let mut handler = HandlerDef::new("invoices");
    handler.register_authorize((), RuleOptions::new().only(["show"]).except(["show"]));

    for action in ACTIONS {
        let policy = RecordingPolicy::new();
        let mut ctx = ResolutionContext::new(Request::new(action), &store, &policy);
        RequestPipeline::new(&handler).run(&mut ctx).unwrap();
        assert!(policy.checks().is_empty(), "action={action}");
    }
}

#[test]
fn later_rules_see_instances_bound_by_earlier_ones() {
    let store = FakeStore::billing();
    let policy = RecordingPolicy::new();
    let mut handler = HandlerDef::new("invoices");
    handler
        .register_load_and_authorize("account", RuleOptions::new())
        .register_load_and_authorize((), RuleOptions::new().through(["account"]));

    let req = Request::new("show").param("account_id", "1").param("id", "10");
    let mut ctx = ResolutionContext::new(req, &store, &policy);
    RequestPipeline::new(&handler).run_verified(&mut ctx).unwrap();

    assert_eq!(ctx.single("account").unwrap().id().as_deref(), Some("1"));
    assert_eq!(ctx.single("invoice").unwrap().id().as_deref(), Some("10"));
    assert_eq!(
        policy.checks(),
        vec![
            ("account/1".to_string(), "show".to_string()),
            ("account/1".to_string(), "show".to_string()),
            ("invoice/10".to_string(), "show".to_string()),
        ]
    );
}

#[test]
fn reversed_order_fails_for_missing_parent() {
    let store = FakeStore::billing();
    let policy = RecordingPolicy::new();
    let mut handler = HandlerDef::new("invoices");
    handler
        .register_load((), RuleOptions::new().through(["account"]))
        .register_load("account", RuleOptions::new());

    let req = Request::new("show").param("account_id", "1").param("id", "10");
    let mut ctx = ResolutionContext::new(req, &store, &policy);
    let err = RequestPipeline::new(&handler).run(&mut ctx).unwrap_err();
    assert_eq!(err.client_code(), ClientCode::NotFound);
}

#[test]
fn through_target_is_authorized_for_show_even_on_destroy() {
    let store = FakeStore::billing();
    let policy = RecordingPolicy::new();
    let mut handler = HandlerDef::new("accounts");
    handler
        .register_load_and_authorize((), RuleOptions::new())
        .register_load("project", RuleOptions::new().through(["account"]).only(["archive"]));

    let mut ctx = ResolutionContext::new(Request::new("destroy").param("id", "2"), &store, &policy);
    RequestPipeline::new(&handler).run(&mut ctx).unwrap();

    assert_eq!(policy.checks(), vec![("account/2".to_string(), "show".to_string())]);
}

#[test]
fn primary_instance_is_authorized_for_the_action() {
    let store = FakeStore::billing();
    let policy = RecordingPolicy::new();
    let mut handler = HandlerDef::new("accounts");
    handler.register_load_and_authorize((), RuleOptions::new());

    let mut ctx = ResolutionContext::new(Request::new("destroy").param("id", "2"), &store, &policy);
    RequestPipeline::new(&handler).run(&mut ctx).unwrap();

    assert_eq!(policy.checks(), vec![("account/2".to_string(), "destroy".to_string())]);
}

#[test]
fn bare_type_uses_the_action_even_for_through_targets() {
    let store = FakeStore::billing();
    let policy = RecordingPolicy::new();
    let mut handler = HandlerDef::new("accounts");
    handler
        .register_authorize((), RuleOptions::new())
        .register_load("project", RuleOptions::new().through(["account"]).only(["archive"]));

    let mut ctx = ResolutionContext::new(Request::new("destroy"), &store, &policy);
    RequestPipeline::new(&handler).run(&mut ctx).unwrap();

    assert_eq!(policy.checks(), vec![("account".to_string(), "destroy".to_string())]);
}

#[test]
fn secondary_authorize_uses_show() {
    let store = FakeStore::billing();
    let policy = RecordingPolicy::new();
    let account = Resolved::Single(store.row("account", "1"));
    let mut handler = HandlerDef::new("invoices");
    handler.register_authorize("account", RuleOptions::new());

    let mut ctx = ResolutionContext::new(Request::new("update"), &store, &policy)
        .with_instance("account", account);
    RequestPipeline::new(&handler).run(&mut ctx).unwrap();

    assert_eq!(policy.checks(), vec![("account/1".to_string(), "show".to_string())]);
}

#[test]
fn index_authorizes_the_type_after_loading_the_collection() {
    let store = FakeStore::billing();
    let policy = RecordingPolicy::new();
    let mut handler = HandlerDef::new("invoices");
    handler.register_load_and_authorize((), RuleOptions::new());

    let mut ctx = ResolutionContext::new(Request::new("index"), &store, &policy);
    RequestPipeline::new(&handler).run_verified(&mut ctx).unwrap();

    assert!(ctx.instance("invoices").unwrap().is_collection());
    assert_eq!(policy.checks(), vec![("invoice".to_string(), "index".to_string())]);
}

#[test]
fn bound_collection_under_instance_name_is_authorized_as_collection() {
    let store = FakeStore::billing();
    let policy = RecordingPolicy::new();
    let invoices = Resolved::Collection(vec![store.row("invoice", "10"), store.row("invoice", "20")]);
    let mut handler = HandlerDef::new("invoices");
    handler.register_authorize((), RuleOptions::new().instance_name("batch"));

    let mut ctx =
        ResolutionContext::new(Request::new("export"), &store, &policy).with_instance("batch", invoices);
    RequestPipeline::new(&handler).run(&mut ctx).unwrap();

    assert_eq!(policy.checks(), vec![("invoice[2]".to_string(), "export".to_string())]);
}

#[test]
fn deny_propagates_as_forbidden() {
    let store = FakeStore::billing();
    let policy = RecordingPolicy::new().denying("destroy");
    let mut handler = HandlerDef::new("invoices");
    handler.register_load_and_authorize((), RuleOptions::new());

    let mut ctx = ResolutionContext::new(Request::new("destroy").param("id", "10"), &store, &policy);
    let err = RequestPipeline::new(&handler).run(&mut ctx).unwrap_err();
    assert_eq!(err.client_code(), ClientCode::Forbidden);
    assert_eq!(err.to_string(), "not authorized to destroy invoice/10");
    assert!(!ctx.authorization_performed());
}

#[test]
fn unknown_type_on_bare_authorize_is_misconfigured() {
    let store = FakeStore::billing();
    let policy = RecordingPolicy::new();
    let mut handler = HandlerDef::new("ledgers");
    handler.register_authorize((), RuleOptions::new());

    let mut ctx = ResolutionContext::new(Request::new("index"), &store, &policy);
    let err = RequestPipeline::new(&handler).run(&mut ctx).unwrap_err();
    assert_eq!(err.client_code(), ClientCode::Misconfigured);
}

#[test]
fn run_verified_requires_an_authorization_check() {
    let store = FakeStore::billing();
    let policy = RecordingPolicy::new();
    let mut handler = HandlerDef::new("invoices");
    handler.register_load((), RuleOptions::new());

    let mut ctx = ResolutionContext::new(Request::new("show").param("id", "10"), &store, &policy);
    let err = RequestPipeline::new(&handler).run_verified(&mut ctx).unwrap_err();
    assert_eq!(err.client_code(), ClientCode::Unverified);
    // The load itself still happened.
    assert!(ctx.single("invoice").is_some());
}

#[test]
fn run_verified_requires_scoping_on_index() {
    let store = FakeStore::billing();
    let policy = RecordingPolicy::new();
    let mut handler = HandlerDef::new("invoices");
    handler.register_authorize((), RuleOptions::new());

    let mut ctx = ResolutionContext::new(Request::new("index"), &store, &policy);
    let err = RequestPipeline::new(&handler).run_verified(&mut ctx).unwrap_err();
    assert!(err.to_string().starts_with("policy scoping not performed"));
}

#[test]
fn skip_authorization_satisfies_verification() {
    let store = FakeStore::billing();
    let policy = RecordingPolicy::new();
    let mut handler = HandlerDef::new("invoices");
    handler.register_skip(ActionFilter::only(["index", "ping"]));

    for action in ["index", "ping"] {
        let mut ctx = ResolutionContext::new(Request::new(action), &store, &policy);
        RequestPipeline::new(&handler).run_verified(&mut ctx).unwrap();
        assert!(ctx.authorization_skipped());
    }

    let mut ctx = ResolutionContext::new(Request::new("show"), &store, &policy);
    let err = RequestPipeline::new(&handler).run_verified(&mut ctx).unwrap_err();
    assert_eq!(err.client_code(), ClientCode::Unverified);
    assert!(policy.checks().is_empty());
}

#[test]
fn skip_does_not_stop_other_rules() {
    let store = FakeStore::billing();
    let policy = RecordingPolicy::new();
    let mut handler = HandlerDef::new("invoices");
    handler
        .register_load((), RuleOptions::new())
        .register_skip(ActionFilter::all());

    let mut ctx = ResolutionContext::new(Request::new("show").param("id", "20"), &store, &policy);
    RequestPipeline::new(&handler).run_verified(&mut ctx).unwrap();
    assert_eq!(ctx.single("invoice").unwrap().get("number"), Some(&json!("INV-20")));
}

#[test]
fn resource_instance_returns_the_primary_binding() {
    let store = FakeStore::billing();
    let policy = RecordingPolicy::new();
    let mut handler = HandlerDef::new("invoices");
    handler.register_load((), RuleOptions::new());

    let mut ctx = ResolutionContext::new(Request::new("show").param("id", "10"), &store, &policy);
    RequestPipeline::new(&handler).run(&mut ctx).unwrap();
    assert_eq!(handler.resource_name(), "invoice");
    assert_eq!(
        ctx.resource_instance(&handler).and_then(|e| e.id()).as_deref(),
        Some("10")
    );
}
