//! In-memory Cachet API for tests and local development.
//!
//! Serves the `/api/v1` resource routes with Cachet's envelopes and error
//! bodies, and reproduces the write-side quirks the client works around.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use axum::{
    extract::{Path, Query, Request, State},
    http::{Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{delete, get},
    Json, Router,
};
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{info, warn};

pub const TOKEN_HEADER: &str = "X-Cachet-Token";
pub const VERSION: &str = "2.3.10";

pub type Row = Map<String, Value>;

/// Storage table backing one resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Components,
    ComponentGroups,
    Incidents,
    Metrics,
    MetricPoints,
    Subscribers,
}

impl Table {
    fn required(self) -> &'static [&'static str] {
        match self {
            Self::Components => &["name", "status"],
            Self::ComponentGroups => &["name"],
            Self::Incidents => &["name", "status"],
            Self::Metrics => &["name", "suffix"],
            Self::MetricPoints => &["value"],
            Self::Subscribers => &["email"],
        }
    }

    /// Integer fields restricted to a closed set of codes.
    fn domains(self) -> &'static [(&'static str, &'static [i64])] {
        match self {
            Self::Components => &[("status", &[1, 2, 3, 4])],
            Self::ComponentGroups => &[("collapsed", &[0, 1, 2])],
            Self::Incidents => &[
                ("status", &[0, 1, 2, 3, 4]),
                ("component_status", &[1, 2, 3, 4]),
            ],
            Self::Metrics => &[("calc_type", &[0, 1]), ("default_view", &[0, 1, 2, 3])],
            Self::MetricPoints | Self::Subscribers => &[],
        }
    }

    fn defaults(self) -> Value {
        match self {
            Self::Components => json!({
                "description": "", "link": "", "order": 0, "group_id": 0, "enabled": true
            }),
            Self::ComponentGroups => json!({"order": 0, "collapsed": 0, "visible": true}),
            Self::Incidents => json!({
                "message": "", "visible": true, "notify": false, "stickied": false,
                "component_id": 0
            }),
            Self::Metrics => json!({
                "description": "", "default_value": 0, "calc_type": 0, "display_chart": true,
                "places": 2, "default_view": 1, "threshold": 5, "order": 0, "visible": 1
            }),
            Self::MetricPoints => json!({"counter": 1}),
            Self::Subscribers => json!({}),
        }
    }
}

/// A Cachet resource served under its own collection path.
pub trait Resource {
    const TABLE: Table;
}

pub struct Components;
pub struct ComponentGroups;
pub struct Incidents;
pub struct Metrics;
pub struct Subscribers;

impl Resource for Components {
    const TABLE: Table = Table::Components;
}
impl Resource for ComponentGroups {
    const TABLE: Table = Table::ComponentGroups;
}
impl Resource for Incidents {
    const TABLE: Table = Table::Incidents;
}
impl Resource for Metrics {
    const TABLE: Table = Table::Metrics;
}
impl Resource for Subscribers {
    const TABLE: Table = Table::Subscribers;
}

#[derive(Debug, Default)]
struct Rows {
    next_id: u64,
    rows: BTreeMap<u64, Row>,
}

#[derive(Debug, Default)]
pub struct Store {
    tables: HashMap<Table, Rows>,
}

impl Store {
    pub fn get(&self, table: Table, id: u64) -> Option<&Row> {
        self.tables.get(&table)?.rows.get(&id)
    }

    pub fn rows(&self, table: Table) -> impl Iterator<Item = &Row> {
        self.tables.get(&table).into_iter().flat_map(|t| t.rows.values())
    }

    fn insert(&mut self, table: Table, mut row: Row) -> Row {
        let rows = self.tables.entry(table).or_default();
        rows.next_id += 1;
        let id = rows.next_id;
        row.insert("id".to_owned(), id.into());
        rows.rows.insert(id, row.clone());
        row
    }

    fn get_mut(&mut self, table: Table, id: u64) -> Option<&mut Row> {
        self.tables.get_mut(&table)?.rows.get_mut(&id)
    }

    fn remove(&mut self, table: Table, id: u64) -> Option<Row> {
        self.tables.get_mut(&table)?.rows.remove(&id)
    }

    fn retain(&mut self, table: Table, keep: impl Fn(&Row) -> bool) {
        if let Some(rows) = self.tables.get_mut(&table) {
            rows.rows.retain(|_, row| keep(row));
        }
    }
}

pub type Db = Arc<RwLock<Store>>;

#[derive(Clone)]
pub struct AppState {
    pub db: Db,
    token: Arc<str>,
}

impl AppState {
    pub fn new(token: &str) -> Self {
        Self {
            db: Db::default(),
            token: Arc::from(token),
        }
    }
}

/// A failed request rendered as a Cachet `errors` body.
#[derive(Debug)]
pub struct Failure {
    status: StatusCode,
    detail: String,
}

impl Failure {
    fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }

    fn bad_request(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, detail)
    }

    fn not_found(table: Table, id: u64) -> Self {
        Self::new(StatusCode::NOT_FOUND, format!("no {table:?} row with id {id}"))
    }
}

impl IntoResponse for Failure {
    fn into_response(self) -> Response {
        let title = self.status.canonical_reason().unwrap_or("Error");
        let body = json!({
            "errors": [{"status": self.status.as_u16(), "title": title, "detail": self.detail}]
        });
        (self.status, Json(body)).into_response()
    }
}

pub fn app(token: &str) -> Router {
    app_with_state(AppState::new(token))
}

pub fn app_with_state(state: AppState) -> Router {
    let api = Router::new()
        .route("/ping", get(ping))
        .route("/version", get(version))
        .route("/components", get(list::<Components>).post(create::<Components>))
        .route(
            "/components/groups",
            get(list::<ComponentGroups>).post(create::<ComponentGroups>),
        )
        .route(
            "/components/groups/{id}",
            get(show::<ComponentGroups>)
                .put(update::<ComponentGroups>)
                .delete(destroy::<ComponentGroups>),
        )
        .route(
            "/components/{id}",
            get(show::<Components>)
                .put(update::<Components>)
                .delete(destroy::<Components>),
        )
        .route("/incidents", get(list::<Incidents>).post(create::<Incidents>))
        .route(
            "/incidents/{id}",
            get(show::<Incidents>)
                .put(update::<Incidents>)
                .delete(destroy::<Incidents>),
        )
        .route("/metrics", get(list::<Metrics>).post(create::<Metrics>))
        .route(
            "/metrics/{id}",
            get(show::<Metrics>)
                .put(update::<Metrics>)
                .delete(destroy::<Metrics>),
        )
        .route("/metrics/{id}/points", get(list_points).post(create_point))
        .route("/metrics/{id}/points/{point}", delete(destroy_point))
        .route("/subscribers", get(list::<Subscribers>).post(create::<Subscribers>))
        .route("/subscribers/{id}", delete(destroy::<Subscribers>))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_token));

    Router::new().nest("/api/v1", api).with_state(state)
}

pub async fn run(listener: TcpListener, token: &str) -> Result<(), std::io::Error> {
    axum::serve(listener, app(token)).await
}

/// Writes need the configured API token.
async fn require_token(State(state): State<AppState>, request: Request, next: Next) -> Response {
    if request.method() != Method::GET {
        let token = request
            .headers()
            .get(TOKEN_HEADER)
            .and_then(|value| value.to_str().ok());
        if token != Some(&*state.token) {
            warn!(method = %request.method(), uri = %request.uri(), "rejected write without valid token");
            return Failure::new(StatusCode::UNAUTHORIZED, "API token missing or invalid")
                .into_response();
        }
    }
    next.run(request).await
}

async fn ping() -> Json<Value> {
    Json(json!({"data": "Pong!"}))
}

async fn version() -> Json<Value> {
    Json(json!({
        "meta": {"on_latest": true, "latest": {"tag_name": format!("v{VERSION}"), "prerelease": false, "draft": false}},
        "data": VERSION
    }))
}

async fn list<R: Resource>(
    State(state): State<AppState>,
    Query(filter): Query<HashMap<String, String>>,
) -> Json<Value> {
    let db = state.db.read().await;
    Json(collection(db.rows(R::TABLE), &filter))
}

async fn show<R: Resource>(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<Value>, Failure> {
    let db = state.db.read().await;
    let row = db.get(R::TABLE, id).ok_or_else(|| Failure::not_found(R::TABLE, id))?;
    Ok(envelope(row.clone()))
}

async fn create<R: Resource>(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, Failure> {
    let input = object(body)?;
    check_write(R::TABLE, &input, Write::Create)?;

    let mut db = state.db.write().await;
    let row = prepare(R::TABLE, input)?;
    apply_component_status(&mut db, R::TABLE, &row);
    let row = db.insert(R::TABLE, row);
    info!(table = ?R::TABLE, id = ?row.get("id"), "created");
    Ok(envelope(row))
}

async fn update<R: Resource>(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, Failure> {
    let mut input = object(body)?;
    check_write(R::TABLE, &input, Write::Update)?;
    input.remove("id");

    let mut db = state.db.write().await;
    let row = db
        .get_mut(R::TABLE, id)
        .ok_or_else(|| Failure::not_found(R::TABLE, id))?;
    for (key, value) in input {
        if value.is_null() && R::TABLE.required().contains(&key.as_str()) {
            return Err(Failure::bad_request(format!("The {key} field is required.")));
        }
        row.insert(key, value);
    }
    row.insert("updated_at".to_owned(), now().into());
    let row = row.clone();
    apply_component_status(&mut db, R::TABLE, &row);
    info!(table = ?R::TABLE, id, "updated");
    Ok(envelope(row))
}

async fn destroy<R: Resource>(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<StatusCode, Failure> {
    let mut db = state.db.write().await;
    db.remove(R::TABLE, id)
        .ok_or_else(|| Failure::not_found(R::TABLE, id))?;
    if R::TABLE == Table::Metrics {
        db.retain(Table::MetricPoints, |point| point.get("metric_id") != Some(&json!(id)));
    }
    info!(table = ?R::TABLE, id, "deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn list_points(
    State(state): State<AppState>,
    Path(metric): Path<u64>,
    Query(filter): Query<HashMap<String, String>>,
) -> Result<Json<Value>, Failure> {
    let db = state.db.read().await;
    db.get(Table::Metrics, metric)
        .ok_or_else(|| Failure::not_found(Table::Metrics, metric))?;
    let points = db
        .rows(Table::MetricPoints)
        .filter(|point| point.get("metric_id") == Some(&json!(metric)));
    Ok(Json(collection(points, &filter)))
}

async fn create_point(
    State(state): State<AppState>,
    Path(metric): Path<u64>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, Failure> {
    let mut input = object(body)?;
    check_write(Table::MetricPoints, &input, Write::Create)?;
    let value = input
        .get("value")
        .and_then(number)
        .ok_or_else(|| Failure::bad_request("The value must be a number."))?;

    let mut db = state.db.write().await;
    db.get(Table::Metrics, metric)
        .ok_or_else(|| Failure::not_found(Table::Metrics, metric))?;
    input.insert("metric_id".to_owned(), metric.into());
    input.insert("value".to_owned(), value.into());
    input.insert("calculated_value".to_owned(), value.into());
    let row = db.insert(Table::MetricPoints, prepare(Table::MetricPoints, input)?);
    info!(metric, id = ?row.get("id"), "recorded metric point");
    Ok(envelope(row))
}

async fn destroy_point(
    State(state): State<AppState>,
    Path((metric, point)): Path<(u64, u64)>,
) -> Result<StatusCode, Failure> {
    let mut db = state.db.write().await;
    let belongs = db
        .get(Table::MetricPoints, point)
        .is_some_and(|row| row.get("metric_id") == Some(&json!(metric)));
    if !belongs {
        return Err(Failure::not_found(Table::MetricPoints, point));
    }
    db.remove(Table::MetricPoints, point);
    info!(metric, id = point, "deleted metric point");
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Write {
    Create,
    Update,
}

/// Field rules of the real server, including the ones the client strips.
fn check_write(table: Table, input: &Row, write: Write) -> Result<(), Failure> {
    if write == Write::Create {
        for field in table.required() {
            if !input.get(*field).is_some_and(|v| !v.is_null()) {
                return Err(Failure::bad_request(format!("The {field} field is required.")));
            }
        }
    }
    for (field, codes) in table.domains() {
        match input.get(*field) {
            None | Some(Value::Null) => {}
            Some(value) => {
                if !integer(value).is_some_and(|code| codes.contains(&code)) {
                    return Err(Failure::bad_request(format!("The selected {field} is invalid.")));
                }
            }
        }
    }

    match table {
        Table::Components if input.contains_key("tags") => {
            Err(Failure::bad_request("The tags field is not accepted."))
        }
        Table::Incidents => {
            let present = |key: &str| input.get(key).is_some_and(|v| !v.is_null());
            if present("component_id") && !present("component_status") {
                return Err(Failure::bad_request(
                    "The component status field is required when component id is present.",
                ));
            }
            if write == Write::Update && input.contains_key("created_at") {
                return Err(Failure::bad_request("The created_at field is not accepted."));
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

/// Fill defaults and server-managed fields for a new row.
fn prepare(table: Table, mut input: Row) -> Result<Row, Failure> {
    input.remove("id");
    input.retain(|_, value| !value.is_null());
    let mut row = match table.defaults() {
        Value::Object(defaults) => defaults,
        _ => Row::new(),
    };

    if table == Table::Subscribers {
        let verified = input.remove("verify").is_some_and(|v| truthy(&v));
        let email = input
            .get("email")
            .and_then(Value::as_str)
            .ok_or_else(|| Failure::bad_request("The email must be a valid email address."))?;
        if !email.contains('@') {
            return Err(Failure::bad_request("The email must be a valid email address."));
        }
        let code = chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default();
        row.insert("verify_code".to_owned(), format!("{code:x}").into());
        row.insert(
            "verified_at".to_owned(),
            if verified { now().into() } else { Value::Null },
        );
    }

    let stamp = now();
    row.extend(input);
    row.insert("created_at".to_owned(), stamp.clone().into());
    row.insert("updated_at".to_owned(), stamp.into());
    Ok(row)
}

/// An incident naming a component and a status moves that component to it.
fn apply_component_status(db: &mut Store, table: Table, incident: &Row) {
    if table != Table::Incidents {
        return;
    }
    let (Some(component_id), Some(status)) = (
        incident.get("component_id").and_then(integer),
        incident.get("component_status").and_then(integer),
    ) else {
        return;
    };
    let Ok(component_id) = u64::try_from(component_id) else {
        return;
    };
    if let Some(component) = db.get_mut(Table::Components, component_id) {
        component.insert("status".to_owned(), status.into());
        component.insert("updated_at".to_owned(), now().into());
    }
}

fn collection<'a>(rows: impl Iterator<Item = &'a Row>, filter: &HashMap<String, String>) -> Value {
    let data: Vec<&Row> = rows
        .filter(|row| {
            filter
                .iter()
                .filter(|(key, _)| !matches!(key.as_str(), "page" | "per_page" | "sort" | "order"))
                .all(|(key, expected)| row.get(key).is_some_and(|v| matches_query(v, expected)))
        })
        .collect();
    let total = data.len();
    json!({
        "meta": {
            "pagination": {
                "total": total,
                "count": total,
                "per_page": total.max(20),
                "current_page": 1,
                "total_pages": 1
            }
        },
        "data": data
    })
}

fn envelope(row: Row) -> Json<Value> {
    Json(json!({ "data": row }))
}

fn object(body: Value) -> Result<Row, Failure> {
    match body {
        Value::Object(map) => Ok(map),
        _ => Err(Failure::bad_request("The request body must be a JSON object.")),
    }
}

fn matches_query(value: &Value, expected: &str) -> bool {
    match value {
        Value::String(s) => s == expected,
        Value::Bool(b) => {
            let flag = if *b { "1" } else { "0" };
            expected == flag || expected == b.to_string()
        }
        Value::Number(n) => n.to_string() == expected,
        _ => false,
    }
}

fn integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_i64() == Some(1),
        Value::String(s) => matches!(s.as_str(), "1" | "true"),
        _ => false,
    }
}

fn now() -> String {
    chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
}
