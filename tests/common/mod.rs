#![allow(dead_code)]

use actix_web::{
    App,
    body::MessageBody,
    dev::{Service, ServiceResponse},
    http::StatusCode,
    test,
    web::Data,
};
use actix_http::Request;
use chrono::{Datelike, Local, NaiveDate};
use serde_json::{Value, json};
use std::net::SocketAddr;
use std::sync::Arc;

use leave_desk::config::Policy;
use leave_desk::routes::{self, RateLimits};
use leave_desk::store::{MemoryStore, Store};

pub const PASSWORD: &str = "Strong@123";

const LIMITS: RateLimits = RateLimits {
    login_per_min: 10_000,
    register_per_min: 10_000,
};

pub async fn init_app(
    policy: Policy,
) -> impl Service<Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error> {
    let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
    test::init_service(
        App::new()
            .app_data(Data::from(store))
            .app_data(Data::new(policy))
            .configure(|cfg| routes::configure(cfg, LIMITS)),
    )
    .await
}

fn peer() -> SocketAddr {
    "127.0.0.1:40000".parse().unwrap()
}

pub fn get(uri: &str) -> Request {
    test::TestRequest::get().uri(uri).peer_addr(peer()).to_request()
}

pub fn post(uri: &str) -> Request {
    test::TestRequest::post().uri(uri).peer_addr(peer()).to_request()
}

pub fn post_json(uri: &str, body: Value) -> Request {
    test::TestRequest::post()
        .uri(uri)
        .peer_addr(peer())
        .set_json(body)
        .to_request()
}

pub fn delete(uri: &str) -> Request {
    test::TestRequest::delete().uri(uri).peer_addr(peer()).to_request()
}

/// Sends the request and decodes the JSON body (`Null` when empty).
pub async fn call<S, B>(app: &S, req: Request) -> (StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let resp = test::call_service(app, req).await;
    let status = resp.status();
    let body = test::read_body(resp).await;
    let value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&body).into()))
    };
    (status, value)
}

pub async fn register<S, B>(app: &S, username: &str, role: &str) -> (StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    call(
        app,
        post_json(
            "/register",
            json!({ "username": username, "password": PASSWORD, "role": role }),
        ),
    )
    .await
}

/// Looks the user up in `/users`.
pub async fn find_user<S, B>(app: &S, username: &str) -> Value
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let (status, users) = call(app, get("/users")).await;
    assert_eq!(status, StatusCode::OK);
    users
        .as_array()
        .unwrap()
        .iter()
        .find(|u| u["username"] == username)
        .cloned()
        .unwrap_or_else(|| panic!("{username} not registered"))
}

/// Registers the user and returns its id.
pub async fn register_ok<S, B>(app: &S, username: &str, role: &str) -> u64
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let (status, body) = register(app, username, role).await;
    assert_eq!(status, StatusCode::OK, "register {username}: {body}");
    find_user(app, username).await["id"].as_u64().unwrap()
}

pub async fn apply<S, B>(app: &S, user_id: u64, from: NaiveDate, to: NaiveDate) -> (StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    call(
        app,
        post_json(
            &format!("/apply_leave/{user_id}"),
            json!({ "from_date": from, "to_date": to, "reason": "Family function" }),
        ),
    )
    .await
}

/// Applies and returns the id of the user's most recent leave.
pub async fn apply_ok<S, B>(app: &S, user_id: u64, from: NaiveDate, to: NaiveDate) -> u64
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let (status, body) = apply(app, user_id, from, to).await;
    assert_eq!(status, StatusCode::OK, "apply: {body}");
    let leaves = my_leaves(app, user_id).await;
    leaves.last().unwrap()["id"].as_u64().unwrap()
}

pub async fn my_leaves<S, B>(app: &S, user_id: u64) -> Vec<Value>
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let (status, body) = call(app, get(&format!("/my_leaves/{user_id}"))).await;
    assert_eq!(status, StatusCode::OK);
    body.as_array().unwrap().clone()
}

/// A date in the current calendar year.
pub fn this_year(month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(Local::now().year(), month, day).unwrap()
}
