// tests/composer.rs

mod common;
use crate::common::{init_tracing, with_timeout, Call, RecordingExecutor};

use std::time::Duration;

use assetdag::dag::{parallel, sequence, Plan};
use assetdag::errors::AssetdagError;

fn t(name: &str) -> Plan {
    Plan::task(name)
}

fn failed_task(err: &AssetdagError) -> &str {
    match err {
        AssetdagError::TaskFailed { task, .. } => task,
        other => panic!("expected TaskFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn sequence_runs_members_in_order() {
    init_tracing();
    let exec = RecordingExecutor::new();

    with_timeout(sequence([t("a"), t("b"), t("c")]).run(&exec))
        .await
        .unwrap();

    assert_eq!(exec.started(), vec!["a", "b", "c"]);
}

#[tokio::test]
async fn sequence_stops_at_first_failure() {
    init_tracing();
    let exec = RecordingExecutor::new();
    exec.fail("a");

    let err = with_timeout(sequence([t("a"), t("b")]).run(&exec))
        .await
        .unwrap_err();

    assert_eq!(failed_task(&err), "a");
    assert_eq!(exec.count("b"), 0, "b must never start after a failed");
}

#[tokio::test]
async fn parallel_starts_all_members_before_any_finishes() {
    init_tracing();
    let exec = RecordingExecutor::new();
    exec.delay("a", Duration::from_millis(50))
        .delay("b", Duration::from_millis(50));

    with_timeout(parallel([t("a"), t("b")]).run(&exec))
        .await
        .unwrap();

    let log = exec.log();
    assert_eq!(
        &log[..2],
        &[Call::Started("a".into()), Call::Started("b".into())]
    );
    assert_eq!(log.len(), 4);
}

#[tokio::test]
async fn parallel_waits_for_every_member_even_when_one_fails() {
    init_tracing();
    let exec = RecordingExecutor::new();
    exec.fail("fast").delay("slow", Duration::from_millis(80));

    let err = with_timeout(parallel([t("fast"), t("slow")]).run(&exec))
        .await
        .unwrap_err();

    assert_eq!(failed_task(&err), "fast");
    assert!(exec.log().contains(&Call::Finished("slow".into())));
}

#[tokio::test]
async fn parallel_reports_first_failure_in_declaration_order() {
    init_tracing();
    let exec = RecordingExecutor::new();
    exec.fail("a")
        .fail("b")
        .delay("a", Duration::from_millis(40));

    let err = with_timeout(parallel([t("a"), t("b")]).run(&exec))
        .await
        .unwrap_err();

    // b fails first in time, but a comes first in the declaration.
    assert_eq!(failed_task(&err), "a");
}

#[tokio::test]
async fn nested_plan_runs_like_build() {
    init_tracing();
    let exec = RecordingExecutor::new();
    let plan = sequence([
        t("clean"),
        parallel([t("styles"), t("scripts"), t("images"), t("copy")]),
        t("serve"),
    ]);

    with_timeout(plan.run(&exec)).await.unwrap();

    let started = exec.started();
    assert_eq!(started.first().map(String::as_str), Some("clean"));
    assert_eq!(started.last().map(String::as_str), Some("serve"));
    assert_eq!(started.len(), 6);
}

#[tokio::test]
async fn failing_transform_aborts_before_serve() {
    init_tracing();
    let exec = RecordingExecutor::new();
    exec.fail("scripts");
    let plan = sequence([
        t("clean"),
        parallel([t("styles"), t("scripts")]),
        t("serve"),
        t("watch"),
    ]);

    assert!(with_timeout(plan.run(&exec)).await.is_err());
    assert_eq!(exec.count("styles"), 1);
    assert_eq!(exec.count("serve"), 0);
    assert_eq!(exec.count("watch"), 0);
}

#[test]
fn plan_renders_as_tree_and_summary() {
    let plan = sequence([t("clean"), parallel([t("styles"), t("scripts")])]);

    assert_eq!(plan.summary(), "sequence(clean, parallel(styles, scripts))");
    assert_eq!(
        plan.to_string(),
        "sequence\n├─ clean\n└─ parallel\n   ├─ styles\n   └─ scripts\n"
    );
    assert_eq!(plan.leaves(), vec!["clean", "styles", "scripts"]);
}
