use actix_web::{
    body::MessageBody,
    http::StatusCode,
    test,
    test::TestRequest,
    web::ServiceConfig,
    App,
};
use checkout_engine::{
    events::EventProducers,
    test_utils::{
        fakes::{FakeCatalog, FakeInitiator},
        prepare_env::{prepare_test_env, random_db_path},
    },
    BankDetails,
    CheckoutApi,
    SqliteDatabase,
};
use log::debug;

pub async fn new_test_db() -> SqliteDatabase {
    let url = random_db_path();
    prepare_test_env(&url).await;
    SqliteDatabase::new_with_url(&url, 5).await.expect("Error creating connection to database")
}

pub fn test_bank_details() -> BankDetails {
    BankDetails {
        recipient: "Acme Storefront GmbH".into(),
        iban: "DE02120300000000202051".into(),
        bic: "BYLADEM1001".into(),
        bank_name: "Deutsche Kreditbank".into(),
    }
}

pub fn test_checkout_api(
    db: SqliteDatabase,
    catalog: FakeCatalog,
    initiator: FakeInitiator,
) -> CheckoutApi<SqliteDatabase, FakeCatalog, FakeInitiator> {
    CheckoutApi::new(db, catalog, initiator, test_bank_details(), EventProducers::default())
}

/// Sends a POST with a JSON body (passed pre-serialized so webhook tests can sign the exact
/// bytes) and returns the response status and body.
pub async fn post_request<F>(
    path: &str,
    payload: String,
    headers: &[(&str, &str)],
    configure: F,
) -> Result<(StatusCode, String), String>
where
    F: FnOnce(&mut ServiceConfig),
{
    let mut req = TestRequest::post().uri(path).insert_header(("Content-Type", "application/json"));
    for (name, value) in headers {
        req = req.insert_header((*name, *value));
    }
    let req = req.set_payload(payload).to_request();
    let app = App::new().configure(configure);
    let service = test::init_service(app).await;
    debug!("Making POST request to {path}");
    let (_, res) = test::try_call_service(&service, req).await.map_err(|e| e.to_string())?.into_parts();
    let status = res.status();
    let body = String::from_utf8_lossy(&res.into_body().try_into_bytes().unwrap()).into_owned();
    Ok((status, body))
}

pub async fn get_request<F>(path: &str, configure: F) -> Result<(StatusCode, String), String>
where F: FnOnce(&mut ServiceConfig) {
    let req = TestRequest::get().uri(path).to_request();
    let app = App::new().configure(configure);
    let service = test::init_service(app).await;
    debug!("Making GET request to {path}");
    let (_, res) = test::try_call_service(&service, req).await.map_err(|e| e.to_string())?.into_parts();
    let status = res.status();
    let body = String::from_utf8_lossy(&res.into_body().try_into_bytes().unwrap()).into_owned();
    Ok((status, body))
}
