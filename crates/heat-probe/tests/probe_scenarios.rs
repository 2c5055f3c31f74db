//! End-to-end probe runs against a scripted cloud

mod common;

use common::{resource, FakeCloud, FakeImages, FakeService, Step};
use heat_probe::config::{EndpointConfig, ProbeConfig, RuntimeFlags, StackConfig, Timeouts};
use heat_probe::probe::{Probe, ProbeClients};
use heat_probe_common::{Outcome, ResourceStatus, Severity};
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

const TEMPLATE: &str = "heat_template_version: 2013-05-23\n";

fn probe_config(name: Option<&str>, force_delete: bool) -> ProbeConfig {
    ProbeConfig {
        stack: StackConfig {
            name: name.map(str::to_string),
            template: PathBuf::from("stack.yaml"),
            parameters: BTreeMap::from([("flavor".to_string(), "m1.small".to_string())]),
            image_name: None,
        },
        endpoints: EndpointConfig {
            token: "token".to_string(),
            heat_url: "http://heat".to_string(),
            compute_url: "http://nova".to_string(),
            volume_url: "http://cinder".to_string(),
            image_url: Some("http://glance".to_string()),
        },
        timeouts: Timeouts::default(),
        flags: RuntimeFlags {
            force_delete,
            verbose: 0,
        },
    }
}

async fn run(cloud: &FakeCloud, images: &FakeImages, config: &ProbeConfig) -> Outcome {
    let nova = FakeService::new("nova", &cloud.journal);
    let cinder = FakeService::new("cinder", &cloud.journal);
    let clients = ProbeClients {
        stacks: cloud,
        servers: &nova,
        volumes: &cinder,
        images: Some(images),
    };
    Probe::new(clients, config, TEMPLATE.to_string()).run().await
}

#[tokio::test(start_paused = true)]
async fn test_clean_run_is_ok_with_elapsed_seconds() {
    // 10 s create, 10 s settle, 5 s delete
    let cloud = FakeCloud::new().with_statuses([
        Step::Status("CREATE_IN_PROGRESS"),
        Step::Status("CREATE_IN_PROGRESS"),
        Step::Status("CREATE_COMPLETE"),
        Step::Status("DELETE_IN_PROGRESS"),
        Step::Gone,
    ]);
    let config = probe_config(None, false);

    let outcome = run(&cloud, &FakeImages::default(), &config).await;

    assert_eq!(
        outcome,
        Outcome::ok("Stack creation and deletion took 25 seconds")
    );

    let created = cloud.created();
    assert_eq!(created.len(), 1);
    assert!(created[0].stack_name.starts_with("check_heat-stack-"));
    assert_eq!(created[0].timeout_mins, 2);
    assert_eq!(created[0].template, TEMPLATE);
    assert_eq!(created[0].parameters["flavor"], "m1.small");
    assert_eq!(cloud.journal.count("find"), 0);
}

#[tokio::test(start_paused = true)]
async fn test_forced_volume_is_warning() {
    let cloud = FakeCloud::new()
        .with_statuses([
            Step::Status("CREATE_COMPLETE"),
            Step::Status("DELETE_FAILED"),
            Step::Status("DELETE_COMPLETE"),
        ])
        .with_resources(vec![resource(
            "data",
            "OS::Cinder::Volume",
            ResourceStatus::DeleteFailed,
            &[],
        )]);
    let config = probe_config(Some("probe"), false);

    let outcome = run(&cloud, &FakeImages::default(), &config).await;

    assert_eq!(outcome.severity, Severity::Warning);
    assert_eq!(outcome.message, "Stack needed to be force deleted");
    assert_eq!(cloud.journal.count("cinder delete data-id"), 1);
    assert_eq!(cloud.journal.count("cinder force_delete data-id"), 1);
}

#[tokio::test(start_paused = true)]
async fn test_failed_teardown_is_critical_with_first_reason() {
    let cloud = FakeCloud::new().with_statuses([
        Step::Status("CREATE_COMPLETE"),
        Step::StatusWithReason("DELETE_FAILED", "Resource DELETE failed: data"),
        Step::StatusWithReason("DELETE_FAILED", "still stuck"),
    ]);
    let config = probe_config(None, false);

    let outcome = run(&cloud, &FakeImages::default(), &config).await;

    assert_eq!(
        outcome,
        Outcome::critical(
            "Error while deleting the Heat stack: Stack is in FAILED state: Resource DELETE failed: data"
        )
    );
}

#[tokio::test(start_paused = true)]
async fn test_failed_create_still_deletes_stack() {
    let cloud = FakeCloud::new().with_statuses([
        Step::StatusWithReason("CREATE_FAILED", "Quota exceeded"),
        Step::Gone,
    ]);
    let config = probe_config(Some("probe"), false);

    let outcome = run(&cloud, &FakeImages::default(), &config).await;

    assert_eq!(
        outcome,
        Outcome::critical("Error while creating the Heat stack: Stack is in FAILED state: Quota exceeded")
    );
    assert_eq!(
        cloud.journal.entries(),
        vec![
            "find probe",
            "create probe",
            "status new-id",
            "delete new-id",
            "status new-id",
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_slow_create_times_out_and_cleans_up() {
    let cloud = FakeCloud::new().with_statuses([
        Step::Status("CREATE_IN_PROGRESS"),
        Step::Status("CREATE_IN_PROGRESS"),
        Step::Gone,
    ]);
    let mut config = probe_config(None, false);
    config.timeouts = Timeouts::from_secs(10, 45).unwrap();

    let outcome = run(&cloud, &FakeImages::default(), &config).await;

    assert_eq!(outcome, Outcome::critical("Stack creation took too long"));
    assert_eq!(cloud.journal.count("delete new-id"), 1);
}

#[tokio::test(start_paused = true)]
async fn test_rejected_create_is_critical() {
    let cloud = FakeCloud::new().failing_create();
    let config = probe_config(None, false);

    let outcome = run(&cloud, &FakeImages::default(), &config).await;

    assert_eq!(
        outcome,
        Outcome::critical("Error while creating the Heat stack: HTTP 400: Invalid template")
    );
    assert_eq!(cloud.journal.count("delete"), 0);
}

#[tokio::test(start_paused = true)]
async fn test_existing_stack_without_force_is_critical() {
    let cloud = FakeCloud::new().with_existing("probe", "old-id");
    let config = probe_config(Some("probe"), false);

    let outcome = run(&cloud, &FakeImages::default(), &config).await;

    assert_eq!(outcome, Outcome::critical("Stack probe already exists"));
    assert_eq!(cloud.journal.entries(), vec!["find probe"]);
}

#[tokio::test(start_paused = true)]
async fn test_existing_stack_with_force_is_replaced() {
    let cloud = FakeCloud::new()
        .with_existing("probe", "old-id")
        .with_statuses([Step::Gone, Step::Status("CREATE_COMPLETE"), Step::Gone]);
    let config = probe_config(Some("probe"), true);

    let outcome = run(&cloud, &FakeImages::default(), &config).await;

    assert_eq!(outcome.severity, Severity::Ok);
    assert_eq!(
        cloud.journal.entries(),
        vec![
            "find probe",
            "delete old-id",
            "status old-id",
            "create probe",
            "status new-id",
            "delete new-id",
            "status new-id",
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_image_name_sets_image_id() {
    let cloud = FakeCloud::new().with_statuses([Step::Status("CREATE_COMPLETE"), Step::Gone]);
    let images = FakeImages(HashMap::from([("cirros".to_string(), "img-1".to_string())]));
    let mut config = probe_config(None, false);
    config.stack.image_name = Some("cirros".to_string());

    let outcome = run(&cloud, &images, &config).await;

    assert_eq!(outcome.severity, Severity::Ok);
    assert_eq!(cloud.created()[0].parameters["image_id"], "img-1");
}

#[tokio::test(start_paused = true)]
async fn test_unknown_image_is_critical() {
    let cloud = FakeCloud::new();
    let mut config = probe_config(None, false);
    config.stack.image_name = Some("nope".to_string());

    let outcome = run(&cloud, &FakeImages::default(), &config).await;

    assert_eq!(outcome, Outcome::critical("Cannot find the image nope"));
    assert!(cloud.journal.entries().is_empty());
}
