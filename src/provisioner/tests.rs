//! Provisioner Module Tests
//!
//! ## Test Scopes
//! - **Bounded Calls**: Timeouts are converted into `ProvisionError::Timeout`.
//! - **LocalProvisioner**: Full node lifecycle over real loopback HTTP.

#[cfg(test)]
mod tests {
    use crate::provisioner::{LocalProvisioner, NodeProvisioner, ProvisionError, bounded};
    use crate::ring::NodeId;
    use std::time::Duration;

    // ============================================================
    // BOUNDED CALL TESTS
    // ============================================================

    #[tokio::test]
    async fn test_bounded_passes_through_result() {
        let node = NodeId::new("S1");

        let ok = bounded("invoke", &node, Duration::from_secs(1), async {
            Ok::<_, ProvisionError>("pong".to_string())
        })
        .await;
        assert_eq!(ok.unwrap(), "pong");

        let err = bounded("invoke", &node, Duration::from_secs(1), async {
            Err::<(), _>(ProvisionError::NotRunning("S1".to_string()))
        })
        .await;
        assert_eq!(err.unwrap_err(), ProvisionError::NotRunning("S1".to_string()));
    }

    #[tokio::test]
    async fn test_bounded_reports_timeout() {
        let node = NodeId::new("S1");

        let result = bounded("create", &node, Duration::from_millis(20), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok::<_, ProvisionError>(())
        })
        .await;

        match result {
            Err(ProvisionError::Timeout { op, node, after }) => {
                assert_eq!(op, "create");
                assert_eq!(node, "S1");
                assert_eq!(after, Duration::from_millis(20));
            }
            other => panic!("expected timeout, got {:?}", other),
        }
    }

    #[test]
    fn test_error_messages() {
        let node = NodeId::new("S4");
        assert_eq!(
            ProvisionError::failed(&node, "boom").to_string(),
            "provisioning of S4 failed: boom"
        );
        assert!(ProvisionError::NotFound("S4".into()).is_not_found());
        assert!(!ProvisionError::NotRunning("S4".into()).is_not_found());
    }

    // ============================================================
    // LOCAL PROVISIONER TESTS
    // ============================================================

    #[tokio::test]
    async fn test_local_node_lifecycle() {
        let provisioner = LocalProvisioner::default();
        let node = NodeId::new("S1");

        provisioner.create(&node).await.unwrap();
        assert!(provisioner.address_of("S1").is_some());
        assert_eq!(provisioner.running_nodes(), vec!["S1"]);

        provisioner.health_check(&node).await.unwrap();
        let body = provisioner.invoke(&node).await.unwrap();
        assert!(body.contains("Hello from Server: S1"), "unexpected body {}", body);

        provisioner.destroy(&node).await.unwrap();
        assert!(provisioner.address_of("S1").is_none());
        assert!(provisioner.destroy(&node).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_local_create_twice_is_rejected() {
        let provisioner = LocalProvisioner::default();
        let node = NodeId::new("S2");

        provisioner.create(&node).await.unwrap();
        assert_eq!(
            provisioner.create(&node).await.unwrap_err(),
            ProvisionError::AlreadyRunning("S2".to_string())
        );
    }

    #[tokio::test]
    async fn test_local_crashed_node_fails_checks_and_can_be_recreated() {
        let provisioner = LocalProvisioner::default();
        let node = NodeId::new("S3");

        provisioner.create(&node).await.unwrap();
        assert!(provisioner.crash("S3"));

        assert_eq!(
            provisioner.health_check(&node).await.unwrap_err(),
            ProvisionError::NotRunning("S3".to_string())
        );
        assert!(provisioner.invoke(&node).await.is_err());
        assert!(provisioner.running_nodes().is_empty());

        // A dead record does not block re-creation under the same name.
        provisioner.create(&node).await.unwrap();
        provisioner.health_check(&node).await.unwrap();
    }

    #[tokio::test]
    async fn test_local_unknown_node() {
        let provisioner = LocalProvisioner::default();
        let ghost = NodeId::new("ghost");

        assert!(!provisioner.crash("ghost"));
        assert!(provisioner.health_check(&ghost).await.unwrap_err().is_not_found());
    }
}
