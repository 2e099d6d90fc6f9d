//! End-to-end provisioning runs against mock provider services.

mod common;

use common::{grant_body, mount_auth, mount_directory, password, provider_client};
use std::os::unix::fs::PermissionsExt;
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use wg_provision::probe::Prober;
use wg_provision::run::Provisioner;
use wg_provision::select::SelectionMode;

#[tokio::test]
async fn provisions_single_reachable_endpoint_end_to_end() {
    let server = MockServer::start().await;
    mount_auth(&server).await;
    mount_directory(
        &server,
        serde_json::json!({
            "regions": [
                {
                    "id": "swiss",
                    "name": "Switzerland",
                    "servers": [
                        {"hostname": "vienna401", "ipv4": "127.0.0.1", "wireguard": true}
                    ]
                },
                {"id": "empty", "name": "No Candidates", "servers": []}
            ]
        }),
    )
    .await;

    Mock::given(method("POST"))
        .and(path("/v1/wireguard"))
        .respond_with(ResponseTemplate::new(200).set_body_json(grant_body()))
        .mount(&server)
        .await;

    let client = provider_client(&server);
    let token = client.login("user", &password()).await.unwrap();
    let directory = client.fetch_directory(&token).await.unwrap();

    let out = tempfile::tempdir().unwrap();
    let prober = Prober::new(Duration::from_millis(500), 4).with_port(server.address().port());
    let provisioner = Provisioner::new(
        client,
        prober,
        SelectionMode::LowestLatency,
        out.path().to_path_buf(),
    );

    let summary = provisioner
        .run(&directory, &["swiss".into(), "empty".into()], &token)
        .await;

    // One config written; the empty region was skipped, not fatal.
    assert_eq!(summary.provisioned.len(), 1);
    assert_eq!(summary.skips.len(), 1);
    assert_eq!(summary.skips[0].subject, "empty");
    assert!(summary.is_success());

    let config_path = &summary.provisioned[0];
    let file_name = config_path.file_name().unwrap().to_str().unwrap();
    assert!(file_name.starts_with("swiss-vienna401-"));
    assert!(file_name.ends_with("ms.conf"));

    let contents = std::fs::read_to_string(config_path).unwrap();
    assert!(contents.starts_with("[Interface]\n"));
    let private_line = contents
        .lines()
        .find(|l| l.starts_with("PrivateKey = "))
        .unwrap();
    assert!(private_line.len() > "PrivateKey = ".len());
    assert!(contents.contains("\n[Peer]\n"));
    assert!(contents.contains("Endpoint = 127.0.0.1:51820\n"));

    let mode = std::fs::metadata(config_path).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
}

#[tokio::test]
async fn one_rejected_endpoint_does_not_block_the_others() {
    let server = MockServer::start().await;
    let port = server.address().port();
    mount_auth(&server).await;
    mount_directory(
        &server,
        serde_json::json!({
            "regions": [{
                "id": "multi",
                "name": "Multi",
                "servers": [
                    {"hostname": "host01", "ipv4": "127.0.0.1", "wireguard": true},
                    {"hostname": "host02", "ipv4": "127.0.0.1", "wireguard": true},
                    {"hostname": "host03", "ipv4": "127.0.0.1", "wireguard": true}
                ]
            }]
        }),
    )
    .await;

    // Registrations are told apart by Host header, since every test endpoint
    // resolves to the mock server.
    for host in ["host01", "host03"] {
        let host_header = format!("{}:{}", host, port);
        Mock::given(method("POST"))
            .and(path("/v1/wireguard"))
            .and(header("host", host_header.as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(grant_body()))
            .mount(&server)
            .await;
    }
    let rejected_header = format!("host02:{}", port);
    Mock::given(method("POST"))
        .and(path("/v1/wireguard"))
        .and(header("host", rejected_header.as_str()))
        .respond_with(ResponseTemplate::new(403).set_body_string("key quota exceeded"))
        .mount(&server)
        .await;

    let client = provider_client(&server);
    let token = client.login("user", &password()).await.unwrap();
    let directory = client.fetch_directory(&token).await.unwrap();

    let out = tempfile::tempdir().unwrap();
    let prober = Prober::new(Duration::from_millis(500), 4).with_port(port);
    let provisioner = Provisioner::new(
        client,
        prober,
        SelectionMode::Manual {
            indexes: vec![1, 2, 3],
        },
        out.path().to_path_buf(),
    );

    let summary = provisioner.run(&directory, &["multi".into()], &token).await;

    assert_eq!(summary.provisioned.len(), 2);
    assert_eq!(summary.skips.len(), 1);
    assert_eq!(summary.skips[0].subject, "multi/host02");
    assert!(summary.skips[0].reason.contains("key quota exceeded"));

    // Distinct deterministic paths, no silent overwrite.
    let mut names: Vec<_> = summary
        .provisioned
        .iter()
        .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
        .collect();
    names.sort();
    assert_eq!(names, ["multi-host01.conf", "multi-host03.conf"]);
}

#[tokio::test]
async fn unreachable_region_never_attempts_registration() {
    let server = MockServer::start().await;
    mount_auth(&server).await;
    mount_directory(
        &server,
        serde_json::json!({
            "regions": [{
                "id": "void",
                "name": "Void",
                "servers": [
                    {"hostname": "ghost01", "ipv4": "192.0.2.1", "wireguard": true},
                    {"hostname": "ghost02", "ipv4": "192.0.2.2", "wireguard": true}
                ]
            }]
        }),
    )
    .await;

    // Verified on drop: no registration may be attempted.
    Mock::given(method("POST"))
        .and(path("/v1/wireguard"))
        .respond_with(ResponseTemplate::new(200).set_body_json(grant_body()))
        .expect(0)
        .mount(&server)
        .await;

    let client = provider_client(&server);
    let token = client.login("user", &password()).await.unwrap();
    let directory = client.fetch_directory(&token).await.unwrap();

    let out = tempfile::tempdir().unwrap();
    let prober = Prober::new(Duration::from_millis(200), 4).with_port(server.address().port());
    let provisioner = Provisioner::new(
        client,
        prober,
        SelectionMode::FirstResponsive,
        out.path().to_path_buf(),
    );

    let summary = provisioner.run(&directory, &["void".into()], &token).await;

    assert!(!summary.is_success());
    assert!(summary.provisioned.is_empty());
    assert_eq!(summary.skips.len(), 1);
    assert_eq!(summary.skips[0].subject, "void");
    assert!(summary.skips[0].reason.contains("no reachable candidate"));
    assert_eq!(std::fs::read_dir(out.path()).unwrap().count(), 0);
}
