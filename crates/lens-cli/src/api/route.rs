//! Request routing for the `/class/{id}/analysis` surface.

use std::collections::HashMap;

use tiny_http::Method;

use lens_core::enums::StageType;
use lens_core::ids::SessionId;

const ROOT: &str = "class";
const COLLECTION: &str = "analysis";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// `POST /class/{id}/analysis`: one overview stage outside any session.
    LegacyRun { class_id: String },
    /// `POST /class/{id}/analysis/run`: a full coordinator run.
    RunSession { class_id: String },
    /// `DELETE /class/{id}/analysis/run`: stop scheduling further stages.
    CancelRun { class_id: String },
    /// `POST /class/{id}/analysis/overview` and `/students?group=N`.
    Stage {
        class_id: String,
        stage: StageType,
        session: Option<SessionId>,
    },
    List {
        class_id: String,
        group_by_session: bool,
    },
    Resolve {
        class_id: String,
        stage: StageType,
        session: Option<SessionId>,
    },
    Progress { class_id: String },
    Get { class_id: String, result_id: String },
    DeleteOne { class_id: String, result_id: String },
    DeleteSession {
        class_id: String,
        session: SessionId,
    },
    DeleteAll { class_id: String },
    UpdateSummary { class_id: String, result_id: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    NotFound,
    MethodNotAllowed,
    BadRequest(String),
}

impl RouteError {
    pub const fn status(&self) -> u16 {
        match self {
            Self::NotFound => 404,
            Self::MethodNotAllowed => 405,
            Self::BadRequest(_) => 400,
        }
    }

    pub fn message(&self) -> String {
        match self {
            Self::NotFound => "not found".to_string(),
            Self::MethodNotAllowed => "method not allowed".to_string(),
            Self::BadRequest(message) => message.clone(),
        }
    }
}

/// Decoded query string. Later duplicates win.
struct Query(HashMap<String, String>);

impl Query {
    fn parse(raw: &str) -> Self {
        let pairs = raw
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| {
                let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
                (decode(key), decode(value))
            })
            .collect();
        Self(pairs)
    }

    fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    fn session(&self) -> Option<SessionId> {
        self.get("sessionId").and_then(SessionId::parse)
    }

    fn flag(&self, key: &str) -> Result<bool, RouteError> {
        match self.get(key) {
            None => Ok(false),
            Some("true" | "1") => Ok(true),
            Some("false" | "0" | "") => Ok(false),
            Some(other) => Err(RouteError::BadRequest(format!(
                "{key} must be true or false, got '{other}'"
            ))),
        }
    }
}

fn decode(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced).map_or_else(|_| spaced.clone(), |s| s.into_owned())
}

/// Match a request line against the routes.
pub fn parse(method: &Method, url: &str) -> Result<Route, RouteError> {
    let (path, query) = url.split_once('?').unwrap_or((url, ""));
    let query = Query::parse(query);
    let segments: Vec<String> = path
        .split('/')
        .filter(|s| !s.is_empty())
        .map(decode)
        .collect();

    let [root, class_id, collection, rest @ ..] = segments.as_slice() else {
        return Err(RouteError::NotFound);
    };
    if root != ROOT || collection != COLLECTION || class_id.trim().is_empty() {
        return Err(RouteError::NotFound);
    }
    let class_id = class_id.clone();

    match rest {
        [] => collection_route(method, class_id, &query),
        [leaf] => leaf_route(method, class_id, leaf, &query),
        _ => Err(RouteError::NotFound),
    }
}

fn collection_route(method: &Method, class_id: String, query: &Query) -> Result<Route, RouteError> {
    match method {
        Method::Post => Ok(Route::LegacyRun { class_id }),
        Method::Get => Ok(Route::List {
            class_id,
            group_by_session: query.flag("group_by_session")?,
        }),
        Method::Delete => {
            if query.flag("deleteAll")? {
                Ok(Route::DeleteAll { class_id })
            } else if let Some(session) = query.session() {
                Ok(Route::DeleteSession { class_id, session })
            } else {
                Err(RouteError::BadRequest(
                    "pass deleteAll=true or sessionId".to_string(),
                ))
            }
        }
        _ => Err(RouteError::MethodNotAllowed),
    }
}

fn leaf_route(
    method: &Method,
    class_id: String,
    leaf: &str,
    query: &Query,
) -> Result<Route, RouteError> {
    match (method, leaf) {
        (Method::Post, "run") => Ok(Route::RunSession { class_id }),
        (Method::Delete, "run") => Ok(Route::CancelRun { class_id }),
        (Method::Post, "overview") => Ok(Route::Stage {
            class_id,
            stage: StageType::Overview,
            session: query.session(),
        }),
        (Method::Post, "students") => Ok(Route::Stage {
            class_id,
            stage: student_stage(query)?,
            session: query.session(),
        }),
        (Method::Get, "resolve") => {
            let raw = query
                .get("stage")
                .ok_or_else(|| RouteError::BadRequest("stage is required".to_string()))?;
            let stage = raw
                .parse::<StageType>()
                .map_err(|e| RouteError::BadRequest(e.to_string()))?;
            Ok(Route::Resolve {
                class_id,
                stage,
                session: query.session(),
            })
        }
        (Method::Get, "progress") => Ok(Route::Progress { class_id }),
        (_, "run" | "overview" | "students" | "resolve" | "progress") => {
            Err(RouteError::MethodNotAllowed)
        }
        (Method::Get, _) => Ok(Route::Get {
            class_id,
            result_id: leaf.to_string(),
        }),
        (Method::Delete, _) => Ok(Route::DeleteOne {
            class_id,
            result_id: leaf.to_string(),
        }),
        (Method::Patch, _) => Ok(Route::UpdateSummary {
            class_id,
            result_id: leaf.to_string(),
        }),
        _ => Err(RouteError::MethodNotAllowed),
    }
}

fn student_stage(query: &Query) -> Result<StageType, RouteError> {
    let raw = query
        .get("group")
        .ok_or_else(|| RouteError::BadRequest("group is required".to_string()))?;
    raw.parse::<u8>()
        .ok()
        .and_then(StageType::from_group)
        .ok_or_else(|| RouteError::BadRequest(format!("group must be 1-8, got '{raw}'")))
}
