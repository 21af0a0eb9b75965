//! Configuration slot behaviour across backends

use dts_core::{ConfigStore, FileConfigStore, MemoryConfigStore, WorkflowController, WorkflowState};
use dts_model::{ConfigType, TestConfiguration, TrafficProfile, Zone};
use dts_test_utils::test_workflow_config;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::sync::Arc;

fn any_config() -> impl Strategy<Value = TestConfiguration> {
    (
        proptest::sample::select(ConfigType::ALL.to_vec()),
        any::<String>(),
        proptest::sample::select(Zone::ALL.to_vec()),
        any::<bool>(),
        proptest::sample::select(TrafficProfile::ALL.to_vec()),
    )
        .prop_map(|(kind, content, zone, replicate, traffic)| {
            TestConfiguration::new(kind, content)
                .with_zone(zone)
                .with_replication(replicate)
                .with_traffic(traffic)
        })
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

proptest! {
    #[test]
    fn last_save_wins(first in any_config(), second in any_config()) {
        let rt = runtime();
        let loaded = rt.block_on(async {
            let store = MemoryConfigStore::new();
            store.save(&first).await.unwrap();
            store.save(&second).await.unwrap();
            store.load().await
        });
        prop_assert_eq!(loaded, Some(second));
    }

    #[test]
    fn file_slot_last_save_wins(first in any_config(), second in any_config()) {
        let dir = tempfile::tempdir().unwrap();
        let rt = runtime();
        let loaded = rt.block_on(async {
            let store = FileConfigStore::new(dir.path().join("dts").join("config.json"));
            store.save(&first).await.unwrap();
            store.save(&second).await.unwrap();
            FileConfigStore::new(store.path()).load().await
        });
        prop_assert_eq!(loaded, Some(second));
    }
}

#[tokio::test]
async fn configuration_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    let saved = TestConfiguration::new(ConfigType::Sdwan, "policy branch-a prefer mpls")
        .with_zone(Zone::EuCentral)
        .with_traffic(TrafficProfile::Burst50);

    {
        let mut wf =
            WorkflowController::open(test_workflow_config(), Arc::new(FileConfigStore::new(&path)))
                .await
                .unwrap();
        wf.save_configuration(saved.clone()).await.unwrap();
    }

    let wf = WorkflowController::open(test_workflow_config(), Arc::new(FileConfigStore::new(&path)))
        .await
        .unwrap();
    assert_eq!(wf.state(), &WorkflowState::ConfigReady);
    assert_eq!(wf.configuration(), Some(&saved));
}

#[tokio::test]
async fn malformed_slot_opens_without_configuration() {
    let store = Arc::new(MemoryConfigStore::with_blob("{\"configType\": \"network\""));
    let mut wf = WorkflowController::open(test_workflow_config(), store.clone())
        .await
        .unwrap();
    assert_eq!(wf.state(), &WorkflowState::NoConfig);
    assert!(!wf.can_start());

    store
        .save(&TestConfiguration::new(ConfigType::Custom, ""))
        .await
        .unwrap();
    assert!(wf.reload_configuration().await.is_some());
    assert_eq!(wf.state(), &WorkflowState::ConfigReady);
}
