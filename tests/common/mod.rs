#![allow(dead_code)]

use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex, Once};

use anyhow::{Context, Result};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use serde_json::{json, Map, Value};

use caseboard::config::AppConfig;
use caseboard::filter::{FilterValue, QueryParams, NAME_FIELD};
use caseboard::AdminSession;

static TRACING: Once = Once::new();

/// One request as the fake server saw it
#[derive(Debug, Clone)]
pub struct Seen {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl Seen {
    pub fn param(&self, key: &str) -> Option<&str> {
        self.query.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }
}

#[derive(Default)]
struct Db {
    collections: BTreeMap<String, Vec<Value>>,
    // (participant id, caregiver id)
    assignments: Vec<(i64, i64)>,
    next_id: i64,
    failing: HashSet<(Method, String)>,
    seen: Vec<Seen>,
}

/// In-memory REST backend speaking the dashboard API on a local port
#[derive(Clone, Default)]
pub struct FakeBackend {
    db: Arc<Mutex<Db>>,
}

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub backend: FakeBackend,
    handle: tokio::task::JoinHandle<()>,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

impl TestServer {
    pub fn session(&self) -> Result<AdminSession> {
        Ok(AdminSession::new(AppConfig::with_base_url(self.base_url.clone()))?)
    }
}

pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .try_init();
    });
}

/// Start a fresh backend for one test
pub async fn spawn_server(backend: FakeBackend) -> Result<TestServer> {
    init_tracing();
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
        .await
        .context("failed to bind fake backend")?;
    let app = Router::new().fallback(handle).with_state(backend.clone());
    let handle = tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(TestServer {
        port,
        base_url: format!("http://127.0.0.1:{}/api", port),
        backend,
        handle,
    })
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, collection: &str, rows: Vec<Value>) -> &Self {
        let mut db = self.db.lock().unwrap();
        for row in &rows {
            let id = row["id"].as_i64().unwrap_or_default();
            db.next_id = db.next_id.max(id);
        }
        db.collections.entry(collection.to_string()).or_default().extend(rows);
        self
    }

    pub fn assign(&self, participant_id: i64, caregiver_ids: &[i64]) -> &Self {
        let mut db = self.db.lock().unwrap();
        db.assignments
            .extend(caregiver_ids.iter().map(|cid| (participant_id, *cid)));
        self
    }

    /// Answer every `method path` request with a 500 from now on
    pub fn fail(&self, method: Method, path: &str) -> &Self {
        self.db.lock().unwrap().failing.insert((method, path.to_string()));
        self
    }

    pub fn seen(&self) -> Vec<Seen> {
        self.db.lock().unwrap().seen.clone()
    }

    pub fn seen_to(&self, method: Method, path: &str) -> Vec<Seen> {
        self.seen()
            .into_iter()
            .filter(|s| s.method == method && s.path == path)
            .collect()
    }

    pub fn rows(&self, collection: &str) -> Vec<Value> {
        self.db
            .lock()
            .unwrap()
            .collections
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }

    pub fn assigned(&self, participant_id: i64) -> Vec<i64> {
        let mut ids: Vec<i64> = self
            .db
            .lock()
            .unwrap()
            .assignments
            .iter()
            .filter(|(pid, _)| *pid == participant_id)
            .map(|(_, cid)| *cid)
            .collect();
        ids.sort_unstable();
        ids
    }
}

async fn handle(State(backend): State<FakeBackend>, method: Method, uri: Uri, body: Bytes) -> Response {
    let path = uri
        .path()
        .trim_start_matches("/api/")
        .trim_end_matches('/')
        .to_string();
    let query: Vec<(String, String)> = uri
        .query()
        .map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
        .unwrap_or_default();
    let body: Option<Value> = serde_json::from_slice(&body).ok();

    let mut db = backend.db.lock().unwrap();
    db.seen.push(Seen {
        method: method.clone(),
        path: path.clone(),
        query: query.clone(),
        body: body.clone(),
    });
    if db.failing.contains(&(method.clone(), path.clone())) {
        return error(StatusCode::INTERNAL_SERVER_ERROR, "injected failure");
    }

    let segments: Vec<&str> = path.split('/').collect();
    match (method.as_str(), segments.as_slice()) {
        ("GET", [collection]) => list(&db, collection, &query),
        ("POST", [collection]) => create(&mut db, collection, body.unwrap_or_default()),
        ("GET", ["participants", id, "caregivers"]) => match id.parse::<i64>() {
            Ok(pid) => caregivers_of(&db, pid),
            Err(_) => error(StatusCode::BAD_REQUEST, "bad id"),
        },
        ("POST", ["participants", id, "caregivers", cid]) => {
            match (id.parse::<i64>(), cid.parse::<i64>()) {
                (Ok(pid), Ok(cid)) => {
                    db.assignments.push((pid, cid));
                    StatusCode::CREATED.into_response()
                }
                _ => error(StatusCode::BAD_REQUEST, "bad id"),
            }
        }
        ("DELETE", ["participants", id, "caregivers", cid]) => {
            match (id.parse::<i64>(), cid.parse::<i64>()) {
                (Ok(pid), Ok(cid)) => {
                    db.assignments.retain(|a| *a != (pid, cid));
                    StatusCode::NO_CONTENT.into_response()
                }
                _ => error(StatusCode::BAD_REQUEST, "bad id"),
            }
        }
        (verb, [collection, id]) => match (verb, id.parse::<i64>()) {
            ("GET", Ok(id)) => detail(&db, collection, id),
            ("PUT", Ok(id)) => update(&mut db, collection, id, body.unwrap_or_default()),
            ("DELETE", Ok(id)) => remove(&mut db, collection, id),
            _ => error(StatusCode::BAD_REQUEST, "unsupported request"),
        },
        _ => error(StatusCode::NOT_FOUND, "no such route"),
    }
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}

fn matches(row: &Value, field: &str, values: &[FilterValue]) -> bool {
    if field == NAME_FIELD {
        let name = row[NAME_FIELD].as_str().unwrap_or_default().to_lowercase();
        return values
            .iter()
            .any(|v| name.contains(&v.to_string().to_lowercase()));
    }
    values.iter().any(|v| match v {
        FilterValue::Bool(b) => row[field].as_bool() == Some(*b),
        FilterValue::Text(s) => row[field].as_str() == Some(s.as_str()),
    })
}

fn list(db: &Db, collection: &str, query: &[(String, String)]) -> Response {
    let params = match QueryParams::parse(query.iter().map(|(k, v)| (k.as_str(), v.as_str()))) {
        Ok(params) => params,
        Err(e) => return error(StatusCode::BAD_REQUEST, &e.to_string()),
    };
    let all = db.collections.get(collection).cloned().unwrap_or_default();
    let mut rows: Vec<Value> = all
        .iter()
        .filter(|row| {
            params
                .filters
                .iter()
                .all(|(field, values)| matches(row, field, values))
        })
        .cloned()
        .collect();

    if let Some(sort) = &params.sort {
        rows.sort_by(|a, b| {
            let ord = a[&sort.field].to_string().cmp(&b[&sort.field].to_string());
            if sort.descending {
                ord.reverse()
            } else {
                ord
            }
        });
    }

    let total = rows.len() as u64;
    let size = params.page_size.max(1) as usize;
    let total_pages = ((rows.len() + size - 1) / size).max(1);
    let data: Vec<Value> = rows
        .into_iter()
        .skip((params.page as usize - 1) * size)
        .take(size)
        .collect();

    let has_next = (params.page as usize) < total_pages;
    let mut page = json!({
        "data": data,
        "total": total,
        "page": params.page,
        "pageSize": params.page_size,
        "totalPages": total_pages,
        "hasNext": has_next,
    });
    if all.iter().any(|row| row.get("isActive").is_some()) {
        let active = all.iter().filter(|r| r["isActive"] == json!(true)).count();
        page["filterCounts"] = json!({
            "isActive": { "true": active, "false": all.len() - active }
        });
    }
    Json(page).into_response()
}

fn detail(db: &Db, collection: &str, id: i64) -> Response {
    match find(db, collection, id) {
        Some(row) => Json(row.clone()).into_response(),
        None => error(StatusCode::NOT_FOUND, "record not found"),
    }
}

fn find<'a>(db: &'a Db, collection: &str, id: i64) -> Option<&'a Value> {
    db.collections
        .get(collection)?
        .iter()
        .find(|row| row["id"].as_i64() == Some(id))
}

fn insert(db: &mut Db, collection: &str, mut fields: Map<String, Value>) -> Value {
    db.next_id += 1;
    fields.insert("id".into(), json!(db.next_id));
    fields.insert("createdAt".into(), json!("2024-05-01T12:00:00Z"));
    fields.insert("updatedAt".into(), json!("2024-05-01T12:00:00Z"));
    let row = Value::Object(fields);
    db.collections
        .entry(collection.to_string())
        .or_default()
        .push(row.clone());
    row
}

/// Resolve the nested `caseManager` link into a `cmID`, creating the case manager if asked
fn resolve_case_manager(db: &mut Db, fields: &mut Map<String, Value>) {
    let Some(link) = fields.remove("caseManager") else {
        return;
    };
    if let Some(id) = link.pointer("/connect/id").and_then(Value::as_i64) {
        fields.insert("cmID".into(), json!(id));
    } else if let Some(Value::Object(new_cm)) = link.get("create").cloned() {
        let created = insert(db, "case-managers", new_cm);
        fields.insert("cmID".into(), created["id"].clone());
    }
}

fn create(db: &mut Db, collection: &str, body: Value) -> Response {
    let Value::Object(mut fields) = body else {
        return error(StatusCode::BAD_REQUEST, "expected a JSON object");
    };
    if collection == "participants" {
        resolve_case_manager(db, &mut fields);
    }
    if matches!(collection, "case-managers" | "caregivers") {
        for field in ["email", "phone"] {
            fields.entry(field).or_insert(Value::Null);
        }
    }
    if collection == "caregivers" {
        fields.entry("isActive").or_insert(json!(true));
    }
    (StatusCode::CREATED, Json(insert(db, collection, fields))).into_response()
}

fn update(db: &mut Db, collection: &str, id: i64, body: Value) -> Response {
    let Value::Object(mut fields) = body else {
        return error(StatusCode::BAD_REQUEST, "expected a JSON object");
    };
    if collection == "participants" {
        resolve_case_manager(db, &mut fields);
    }
    let Some(row) = db
        .collections
        .get_mut(collection)
        .and_then(|rows| rows.iter_mut().find(|row| row["id"].as_i64() == Some(id)))
    else {
        return error(StatusCode::NOT_FOUND, "record not found");
    };
    if let Value::Object(existing) = row {
        existing.extend(fields);
    }
    Json(row.clone()).into_response()
}

fn remove(db: &mut Db, collection: &str, id: i64) -> Response {
    let Some(rows) = db.collections.get_mut(collection) else {
        return error(StatusCode::NOT_FOUND, "record not found");
    };
    let before = rows.len();
    rows.retain(|row| row["id"].as_i64() != Some(id));
    if rows.len() == before {
        return error(StatusCode::NOT_FOUND, "record not found");
    }
    StatusCode::NO_CONTENT.into_response()
}

fn caregivers_of(db: &Db, participant_id: i64) -> Response {
    let rows: Vec<Value> = db
        .assignments
        .iter()
        .filter(|(pid, _)| *pid == participant_id)
        .map(|(_, cid)| {
            let name = find(db, "caregivers", *cid)
                .and_then(|c| c["name"].as_str())
                .unwrap_or("Unknown")
                .to_string();
            json!({ "caregiverId": cid, "caregiver": { "id": cid, "name": name } })
        })
        .collect();
    Json(rows).into_response()
}

pub fn participant_row(id: i64, name: &str, gender: &str, active: bool, cm_id: i64) -> Value {
    json!({
        "id": id, "name": name, "gender": gender, "medicaidId": format!("MCD-{}", 1000 + id),
        "dob": "1950-04-02", "location": "Home", "community": "Eastside",
        "address": "12 Elm St", "primaryPhone": "555-0100", "secondaryPhone": null,
        "isActive": active, "locStartDate": "2024-01-01", "locEndDate": "2024-12-31",
        "pocStartDate": "2024-01-01", "pocEndDate": "2024-12-31",
        "units": 20, "hours": 10.5, "hdm": false, "adhc": true, "cmID": cm_id
    })
}

pub fn case_manager_row(id: i64, name: &str, agency_id: i64) -> Value {
    json!({ "id": id, "name": name, "email": null, "phone": null, "agencyId": agency_id })
}

pub fn caregiver_row(id: i64, name: &str, active: bool) -> Value {
    json!({ "id": id, "name": name, "email": null, "phone": null, "isActive": active })
}

/// Backend with a small roster: two agencies, two case managers, four
/// caregivers and twelve participants (ids 101..=112, every third inactive).
pub fn roster() -> FakeBackend {
    let backend = FakeBackend::new();
    backend.seed(
        "agencies",
        vec![json!({"id": 1, "name": "North Valley"}), json!({"id": 2, "name": "Riverside"})],
    );
    backend.seed(
        "case-managers",
        vec![case_manager_row(11, "Ann Lee", 1), case_manager_row(12, "Ben Cho", 2)],
    );
    backend.seed(
        "caregivers",
        vec![
            caregiver_row(1, "Rosa", true),
            caregiver_row(2, "Sam", true),
            caregiver_row(3, "Tia", true),
            caregiver_row(4, "Uma", false),
        ],
    );
    let participants = (101..=112)
        .map(|id| {
            let gender = if id % 2 == 0 { "F" } else { "M" };
            participant_row(id, &format!("Participant {}", id), gender, id % 3 != 0, 11)
        })
        .collect();
    backend.seed("participants", participants);
    backend
}
