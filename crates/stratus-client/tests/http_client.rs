use stratus_api::{DatabaseFamily, DbInstanceStatus, IntakeState, RegionScope, ServerStatus};
use stratus_client::{
    ClientError, DbFlexApi, Endpoints, HttpClient, IaasApi, IntakeApi, ObjectStorageApi,
    ServerAction,
};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn scope() -> RegionScope {
    RegionScope::new("p-1", "eu01")
}

async fn client_for(server: &MockServer) -> HttpClient {
    let endpoints = Endpoints::new(server.uri()).unwrap();
    HttpClient::from_endpoints(endpoints).with_token("secret")
}

#[tokio::test]
async fn get_server_decodes_snapshot_and_sends_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/iaas/v2/projects/p-1/regions/eu01/servers/s-1"))
        .and(header("authorization", "Bearer secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "s-1",
            "name": "web",
            "status": "ACTIVE"
        })))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let snapshot = client.get_server(&scope(), "s-1").await.unwrap();

    assert_eq!(snapshot.id.as_deref(), Some("s-1"));
    assert_eq!(snapshot.status, Some(ServerStatus::Active));
}

#[tokio::test]
async fn missing_resource_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/intake/v1beta/projects/p-1/regions/eu01/intake-runners/r-1"))
        .respond_with(ResponseTemplate::new(404).set_body_string("runner not found"))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let err = client.get_intake_runner(&scope(), "r-1").await.unwrap_err();

    assert!(err.is_not_found());
    assert!(err.to_string().contains("runner not found"));
}

#[tokio::test]
async fn server_error_is_not_classified_as_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/intake/v1beta/projects/p-1/regions/eu01/intakes/i-1"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let err = client.get_intake(&scope(), "i-1").await.unwrap_err();

    assert!(!err.is_not_found());
    assert!(err.is_gateway_error());
    assert_eq!(err.status(), Some(503));
}

#[tokio::test]
async fn intake_user_path_nests_under_intake() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/intake/v1beta/projects/p-1/regions/eu01/intakes/i-1/users/u-1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "id": "u-1", "state": "RECONCILING" })),
        )
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let user = client.get_intake_user(&scope(), "i-1", "u-1").await.unwrap();

    assert_eq!(user.state, Some(IntakeState::Reconciling));
}

#[tokio::test]
async fn empty_body_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/iaas/v2/projects/p-1/regions/eu01/volumes/v-1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("null"))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let err = client.get_volume(&scope(), "v-1").await.unwrap_err();

    assert!(matches!(err, ClientError::EmptyResponse));
}

#[tokio::test]
async fn db_instance_is_unwrapped_from_item() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/postgresflex/v2/projects/p-1/regions/eu01/instances/db-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "item": { "id": "db-1", "status": "Progressing" }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/mongodbflex/v2/projects/p-1/regions/eu01/instances/db-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let instance = client
        .get_db_instance(DatabaseFamily::Postgres, &scope(), "db-1")
        .await
        .unwrap();
    assert_eq!(instance.status, Some(DbInstanceStatus::Progressing));

    let err = client
        .get_db_instance(DatabaseFamily::MongoDb, &scope(), "db-2")
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::EmptyResponse));
}

#[tokio::test]
async fn bucket_lookup_unwraps_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/object-storage/v2/project/p-1/regions/eu01/bucket/logs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "project": "p-1",
            "bucket": { "name": "logs", "region": "eu01" }
        })))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let bucket = client.get_bucket(&scope(), "logs").await.unwrap();

    assert_eq!(bucket.name.as_deref(), Some("logs"));
}

#[tokio::test]
async fn resize_posts_machine_type() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/iaas/v2/projects/p-1/regions/eu01/servers/s-1/resize"))
        .and(body_json(serde_json::json!({ "machineType": "c1.4" })))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    client
        .server_action(
            &scope(),
            "s-1",
            &ServerAction::Resize {
                machine_type: "c1.4".to_string(),
            },
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn delete_surfaces_api_errors() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/iaas/v2/projects/p-1/regions/eu01/servers/s-1"))
        .respond_with(ResponseTemplate::new(409).set_body_string("server is locked"))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let err = client.delete_server(&scope(), "s-1").await.unwrap_err();

    assert_eq!(err.status(), Some(409));
}
