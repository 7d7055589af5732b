//! Multi-invocation scenarios for the lifecycle recipes, driven with
//! scripted resources and pollers in place of the provider.

mod mock;

use cloudify_gcp::Error;
use cloudify_lifecycle::{
    create, delete, load_startup_script, mutate, run, start_instance, Verdict, DEFAULT_RETRY_DELAY,
};
use cloudify_model::{IP, KIND, OP_CREATE, OP_DELETE, OP_START, OP_STOP, OPERATION, RESOURCE_ID};
use mock::{api_error, context, handle, zone_operation, MockPoller, MockResource};
use serde_json::json;
use std::time::Duration;

fn network_body() -> serde_json::Value {
    json!({
        "kind": "compute#network",
        "name": "my-net-1",
        "selfLink": "https://www.googleapis.com/compute/v1/projects/p/global/networks/my-net-1",
    })
}

#[tokio::test]
async fn create_suspends_on_operation_then_completes() {
    let ctx = context(OP_CREATE, false);
    let poller = MockPoller::new()
        .on_poll(Ok(handle("RUNNING")))
        .on_poll(Ok(handle("DONE")));

    // First invocation issues the insert and records the operation.
    let resource = MockResource::new("compute#network", "my-net-1")
        .on_create(Ok(zone_operation("op-1", "PENDING")));
    let verdict = create(&ctx, &resource, &poller).await.unwrap();
    assert!(matches!(verdict, Verdict::Retry { .. }));
    assert!(ctx.runtime().contains(OPERATION));
    assert!(!ctx.runtime().contains(RESOURCE_ID));

    // Second invocation polls once; still running.
    let resource = MockResource::new("compute#network", "my-net-1");
    let verdict = create(&ctx, &resource, &poller).await.unwrap();
    assert!(matches!(verdict, Verdict::Retry { .. }));
    assert!(ctx.runtime().contains(OPERATION));

    // Third invocation sees the operation done and records identity.
    let resource =
        MockResource::new("compute#network", "my-net-1").on_get(Ok(network_body()));
    let verdict = create(&ctx, &resource, &poller).await.unwrap();
    assert_eq!(verdict, Verdict::Complete);
    assert!(!ctx.runtime().contains(OPERATION));
    assert_eq!(
        ctx.runtime().get_str(RESOURCE_ID).as_deref(),
        Some("my-net-1")
    );
    assert_eq!(
        ctx.runtime().get_str(KIND).as_deref(),
        Some("compute#network")
    );
}

#[tokio::test]
async fn create_is_a_noop_once_identity_is_recorded() {
    let ctx = context(OP_CREATE, false);
    ctx.runtime().set(RESOURCE_ID, json!("my-net-1"));
    // Empty scripts: any provider call would panic.
    let resource = MockResource::new("compute#network", "my-net-1");
    let poller = MockPoller::new();
    let verdict = create(&ctx, &resource, &poller).await.unwrap();
    assert_eq!(verdict, Verdict::Complete);
}

#[tokio::test]
async fn direct_value_create_completes_in_one_invocation() {
    let ctx = context(OP_CREATE, false);
    let resource = MockResource::new("pubsub#topic", "my-topic")
        .on_create(Ok(json!({ "name": "projects/p/topics/my-topic" })));
    let poller = MockPoller::new();
    let verdict = create(&ctx, &resource, &poller).await.unwrap();
    assert_eq!(verdict, Verdict::Complete);
    assert!(!ctx.runtime().contains(OPERATION));
    assert_eq!(
        ctx.runtime().get_str(RESOURCE_ID).as_deref(),
        Some("my-topic")
    );
}

#[tokio::test]
async fn external_resource_is_adopted_not_created() {
    let ctx = context(OP_CREATE, true);
    let resource =
        MockResource::new("compute#network", "my-net-1").on_get(Ok(network_body()));
    let poller = MockPoller::new();
    let verdict = create(&ctx, &resource, &poller).await.unwrap();
    assert_eq!(verdict, Verdict::Complete);
    assert_eq!(
        ctx.runtime().get_str(RESOURCE_ID).as_deref(),
        Some("my-net-1")
    );
}

#[tokio::test]
async fn adopting_a_missing_external_resource_fails() {
    let ctx = context(OP_CREATE, true);
    let resource = MockResource::new("compute#network", "my-net-1")
        .on_get(Err(api_error(404, json!({}))));
    let poller = MockPoller::new();
    let error = create(&ctx, &resource, &poller).await.unwrap_err();
    assert!(!error.is_recoverable());
    assert!(error.to_string().contains("does not exist"));
}

#[tokio::test]
async fn adoption_rejects_a_noncanonical_identifier() {
    let ctx = context(OP_CREATE, true);
    // No get script: the name check must fail before any provider call.
    let resource = MockResource::new("compute#network", "My_Net");
    let poller = MockPoller::new();
    let error = create(&ctx, &resource, &poller).await.unwrap_err();
    assert!(!error.is_recoverable());
}

#[tokio::test]
async fn deleting_a_missing_resource_succeeds() {
    let ctx = context(OP_DELETE, false);
    ctx.runtime().set(RESOURCE_ID, json!("my-net-1"));
    let resource = MockResource::new("compute#network", "my-net-1")
        .on_delete(Err(api_error(404, json!({}))));
    let poller = MockPoller::new();
    let verdict = delete(&ctx, &resource, &poller).await.unwrap();
    assert_eq!(verdict, Verdict::Complete);
    assert!(ctx.runtime().is_empty());
}

#[tokio::test]
async fn delete_of_an_in_use_resource_suspends_and_keeps_state() {
    let ctx = context(OP_DELETE, false);
    ctx.runtime().set(RESOURCE_ID, json!("my-net-1"));
    ctx.runtime().take_dirty();
    let before = ctx.runtime().snapshot();

    let in_use = json!({"error": {"errors": [
        {"reason": "resourceInUseByAnotherResource"}
    ]}});
    let resource = MockResource::new("compute#network", "my-net-1")
        .on_delete(Err(api_error(400, in_use)));
    let poller = MockPoller::new();
    let verdict = delete(&ctx, &resource, &poller).await.unwrap();
    match verdict {
        Verdict::Retry { delay, .. } => assert!(delay >= Duration::from_secs(30)),
        other => panic!("expected retry, got {:?}", other),
    }
    assert_eq!(ctx.runtime().snapshot(), before);
}

#[tokio::test]
async fn delete_with_nothing_recorded_is_complete() {
    let ctx = context(OP_DELETE, false);
    let resource = MockResource::new("compute#network", "my-net-1");
    let poller = MockPoller::new();
    let verdict = delete(&ctx, &resource, &poller).await.unwrap();
    assert_eq!(verdict, Verdict::Complete);
}

#[tokio::test]
async fn delete_of_an_external_resource_only_forgets_it() {
    let ctx = context(OP_DELETE, true);
    ctx.runtime().set(RESOURCE_ID, json!("my-net-1"));
    // No delete script: the provider must not be asked to delete.
    let resource = MockResource::new("compute#network", "my-net-1");
    let poller = MockPoller::new();
    let verdict = delete(&ctx, &resource, &poller).await.unwrap();
    assert_eq!(verdict, Verdict::Complete);
    assert!(ctx.runtime().is_empty());
}

#[tokio::test]
async fn delete_tracks_its_operation_then_clears_state() {
    let ctx = context(OP_DELETE, false);
    ctx.runtime().set(RESOURCE_ID, json!("my-net-1"));

    let resource = MockResource::new("compute#network", "my-net-1")
        .on_delete(Ok(zone_operation("op-2", "PENDING")));
    let poller = MockPoller::new().on_poll(Ok(handle("DONE")));

    let verdict = delete(&ctx, &resource, &poller).await.unwrap();
    assert!(matches!(verdict, Verdict::Retry { .. }));
    assert!(ctx.runtime().contains(OPERATION));

    let resource = MockResource::new("compute#network", "my-net-1");
    let verdict = delete(&ctx, &resource, &poller).await.unwrap();
    assert_eq!(verdict, Verdict::Complete);
    assert!(ctx.runtime().is_empty());
}

#[tokio::test]
async fn a_failed_operation_surfaces_the_provider_payload() {
    let ctx = context(OP_CREATE, false);
    let resource = MockResource::new("compute#network", "my-net-1")
        .on_create(Ok(zone_operation("op-3", "PENDING")));
    let failed = cloudify_gcp::OperationHandle::from_response(&json!({
        "name": "op-3",
        "status": "DONE",
        "error": {"errors": [{"code": "QUOTA_EXCEEDED", "message": "Quota exceeded"}]},
    }))
    .unwrap();
    let poller = MockPoller::new().on_poll(Ok(failed));

    create(&ctx, &resource, &poller).await.unwrap();
    let error = create(&ctx, &resource, &poller).await.unwrap_err();
    assert!(!error.is_recoverable());
    assert!(error.to_string().contains("QUOTA_EXCEEDED"));
    assert!(!ctx.runtime().contains(OPERATION));
}

#[tokio::test]
async fn a_missing_readback_after_done_is_retried_not_fatal() {
    let ctx = context(OP_CREATE, false);
    let poller = MockPoller::new()
        .on_poll(Ok(handle("DONE")))
        .on_poll(Ok(handle("DONE")));

    let resource = MockResource::new("compute#network", "my-net-1")
        .on_create(Ok(zone_operation("op-7", "PENDING")));
    create(&ctx, &resource, &poller).await.unwrap();

    // The operation is done but the provider cannot serve the read yet.
    let resource = MockResource::new("compute#network", "my-net-1")
        .on_get(Err(api_error(404, json!({}))));
    let verdict = create(&ctx, &resource, &poller).await.unwrap();
    assert!(matches!(verdict, Verdict::Retry { .. }));
    assert!(ctx.runtime().contains(OPERATION));
    assert!(!ctx.runtime().contains(RESOURCE_ID));

    // The next invocation retries the read-back, not the insert.
    let resource =
        MockResource::new("compute#network", "my-net-1").on_get(Ok(network_body()));
    let verdict = create(&ctx, &resource, &poller).await.unwrap();
    assert_eq!(verdict, Verdict::Complete);
    assert_eq!(
        ctx.runtime().get_str(RESOURCE_ID).as_deref(),
        Some("my-net-1")
    );
}

#[tokio::test]
async fn a_transient_poll_failure_keeps_the_record() {
    let ctx = context(OP_CREATE, false);
    let resource = MockResource::new("compute#network", "my-net-1")
        .on_create(Ok(zone_operation("op-4", "PENDING")));
    let poller = MockPoller::new().on_poll(Err(api_error(503, json!({}))));

    create(&ctx, &resource, &poller).await.unwrap();
    let verdict = create(&ctx, &resource, &poller).await.unwrap();
    assert!(matches!(verdict, Verdict::Retry { .. }));
    assert!(ctx.runtime().contains(OPERATION));
}

#[tokio::test]
async fn credential_failures_are_recoverable() {
    let ctx = context(OP_CREATE, false);
    let resource = MockResource::new("compute#network", "my-net-1").on_create(Err(
        Error::TokenExchange {
            url: "https://oauth2.googleapis.com/token".to_string(),
            status: 401,
            body: "invalid_grant".to_string(),
        },
    ));
    let poller = MockPoller::new();
    let error = create(&ctx, &resource, &poller).await.unwrap_err();
    assert!(error.is_recoverable());
}

#[tokio::test]
async fn start_waits_for_an_address_then_publishes_it() {
    let ctx = context(OP_START, false);
    let resource = MockResource::new("compute#instance", "vm-1").on_get(Ok(json!({
        "name": "vm-1",
        "networkInterfaces": [{ "name": "nic0" }],
    })));
    let verdict = start_instance(&ctx, &resource).await.unwrap();
    assert!(matches!(verdict, Verdict::Retry { .. }));

    let resource = MockResource::new("compute#instance", "vm-1").on_get(Ok(json!({
        "name": "vm-1",
        "networkInterfaces": [{
            "networkIP": "10.0.0.2",
            "accessConfigs": [{ "natIP": "203.0.113.10" }],
        }],
    })));
    let verdict = start_instance(&ctx, &resource).await.unwrap();
    assert_eq!(verdict, Verdict::Complete);
    assert_eq!(ctx.runtime().get_str(IP).as_deref(), Some("203.0.113.10"));
}

#[tokio::test]
async fn a_mutation_is_tracked_like_a_create() {
    let ctx = context(OP_STOP, false);
    ctx.runtime().set(RESOURCE_ID, json!("vm-1"));

    let poller = MockPoller::new().on_poll(Ok(handle("DONE")));
    let verdict = mutate(&ctx, &poller, "Stopping instance", async {
        Ok(zone_operation("op-6", "RUNNING"))
    })
    .await
    .unwrap();
    assert!(matches!(verdict, Verdict::Retry { .. }));
    assert!(ctx.runtime().contains(OPERATION));

    // Second invocation must poll instead of issuing the stop again.
    let verdict = mutate(&ctx, &poller, "Stopping instance", async {
        panic!("mutation must not be reissued")
    })
    .await
    .unwrap();
    assert_eq!(verdict, Verdict::Complete);
    assert!(!ctx.runtime().contains(OPERATION));
}

#[test]
fn startup_scripts_come_through_the_blueprint_loader() {
    use cloudify_gcp::compute::Instance;
    use cloudify_gcp::{GcpConfig, GcpResource};
    use mock::MemoryResources;
    use std::sync::Arc;

    let ctx = context(OP_CREATE, false).with_resources(Arc::new(
        MemoryResources::default().with_file("scripts/startup.sh", "#!/bin/sh\necho hi\n"),
    ));
    let script = load_startup_script(&ctx, "scripts/startup.sh").unwrap();

    let config = GcpConfig {
        project: "p".to_string(),
        zone: "us-central1-b".to_string(),
        network: "default".to_string(),
        ..GcpConfig::default()
    };
    let instance = Instance::new(config, "vm-1", "n1-standard-1", "family/debian-12")
        .with_startup_script(script);
    assert_eq!(
        instance.to_body()["metadata"]["items"][0]["value"],
        "#!/bin/sh\necho hi\n"
    );

    // Without a loader installed the script cannot be honored.
    let bare = context(OP_CREATE, false);
    let error = load_startup_script(&bare, "scripts/startup.sh").unwrap_err();
    assert!(!error.is_recoverable());
}

#[test]
fn a_missing_startup_script_is_non_recoverable() {
    use cloudify_model::FileBlueprintResources;
    use std::sync::Arc;

    let ctx = context(OP_CREATE, false).with_resources(Arc::new(FileBlueprintResources::new(
        "/nonexistent-blueprint-root",
    )));
    let error = load_startup_script(&ctx, "scripts/startup.sh").unwrap_err();
    assert!(!error.is_recoverable());
    assert!(error.to_string().contains("scripts/startup.sh"));
}

#[test]
fn compute_builder_types_compose_from_outside_the_provider_crate() {
    use cloudify_gcp::compute::{
        AllowedRule, ExternalIp, Firewall, Instance, ACCESS_CONFIG_TYPE,
    };
    use cloudify_gcp::{GcpConfig, GcpResource};

    let config = GcpConfig {
        project: "p".to_string(),
        zone: "us-central1-b".to_string(),
        network: "default".to_string(),
        ..GcpConfig::default()
    };

    let firewall = Firewall::new(
        config.clone(),
        "fw-1",
        "my-net-1",
        vec![AllowedRule {
            ip_protocol: "tcp".to_string(),
            ports: vec!["22".to_string()],
        }],
        vec!["0.0.0.0/0".to_string()],
        vec![],
    );
    assert_eq!(firewall.to_body()["allowed"][0]["IPProtocol"], "tcp");

    let instance = Instance::new(config, "vm-1", "n1-standard-1", "family/debian-12")
        .with_external_ip(ExternalIp::Ephemeral);
    assert_eq!(
        instance.to_body()["networkInterfaces"][0]["accessConfigs"][0]["type"],
        ACCESS_CONFIG_TYPE
    );
}

#[tokio::test]
async fn the_wrapper_translates_retry_into_a_host_retry_request() {
    let ctx = context(OP_CREATE, false);
    let resource = MockResource::new("compute#network", "my-net-1")
        .on_create(Ok(zone_operation("op-5", "PENDING")));
    let poller = MockPoller::new();

    let verdict = run(&ctx, create(&ctx, &resource, &poller)).await.unwrap();
    assert!(matches!(verdict, Verdict::Retry { .. }));
    let request = ctx.operation.take_retry().expect("retry requested");
    assert_eq!(request.delay, DEFAULT_RETRY_DELAY);
}

#[tokio::test]
async fn the_wrapper_clears_state_when_a_delete_completes() {
    let ctx = context(OP_DELETE, false);
    ctx.runtime().set(RESOURCE_ID, json!("my-net-1"));
    let resource = MockResource::new("compute#network", "my-net-1")
        .on_delete(Err(api_error(404, json!({}))));
    let poller = MockPoller::new();

    let verdict = run(&ctx, delete(&ctx, &resource, &poller)).await.unwrap();
    assert_eq!(verdict, Verdict::Complete);
    assert!(ctx.runtime().is_empty());
    assert!(ctx.operation.take_retry().is_none());
}
