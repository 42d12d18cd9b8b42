//! Client for the hosted spreadsheet service (Sheets v4 values API, with the
//! Drive files API used to resolve a document by name).
//!
//! All calls block. Inside an async server, call them from
//! `tokio::task::spawn_blocking`, and construct the client before entering
//! the runtime.

use crate::error::{Result, SurveyError};
use crate::store::{Cell, SheetStore};
use reqwest::blocking::{Client, Response};
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use std::sync::OnceLock;
use std::time::Duration;

const SPREADSHEET_MIME: &str = "application/vnd.google-apps.spreadsheet";

#[derive(Debug, Clone)]
pub struct HttpSheetOptions {
    pub api_base: String,
    pub drive_base: String,
    pub document: String,
    pub document_id: Option<String>,
    pub sheet: String,
    /// Bearer token. When absent the client is still built, and every call
    /// fails with `AuthFailure` naming `token_source`.
    pub token: Option<String>,
    pub token_source: String,
    pub timeout: Duration,
}

pub struct HttpSheet {
    client: Client,
    api_base: Url,
    drive_base: Url,
    document: String,
    sheet: String,
    token: Option<String>,
    token_source: String,
    document_id: OnceLock<String>,
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<DriveFile>,
}

#[derive(Debug, Deserialize)]
struct DriveFile {
    id: String,
}

#[derive(Debug, Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetEntry>,
}

#[derive(Debug, Deserialize)]
struct SheetEntry {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
struct SheetProperties {
    title: String,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

// ---------------------------------------------------------------------------
// HttpSheet
// ---------------------------------------------------------------------------

impl HttpSheet {
    pub fn new(opts: HttpSheetOptions) -> Result<Self> {
        let parse = |label: &str, raw: &str| {
            Url::parse(raw).map_err(|e| SurveyError::InvalidConfig(format!("{label} '{raw}': {e}")))
        };
        let api_base = parse("store.api_base", &opts.api_base)?;
        let drive_base = parse("store.drive_base", &opts.drive_base)?;

        let mut builder = Client::builder();
        if !opts.timeout.is_zero() {
            builder = builder.timeout(opts.timeout);
        }
        let client = builder
            .build()
            .map_err(|e| SurveyError::NetworkFailure(format!("http client: {e}")))?;

        let document_id = OnceLock::new();
        if let Some(id) = opts.document_id {
            let _ = document_id.set(id);
        }

        Ok(Self {
            client,
            api_base,
            drive_base,
            document: opts.document,
            sheet: opts.sheet,
            token: opts.token,
            token_source: opts.token_source,
            document_id,
        })
    }

    fn token(&self) -> Result<&str> {
        self.token
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| SurveyError::AuthFailure(format!("{} is not set", self.token_source)))
    }

    /// Resolve the document name to its id, once per client.
    fn document_id(&self) -> Result<&str> {
        if let Some(id) = self.document_id.get() {
            return Ok(id);
        }

        let token = self.token()?;
        let url = join(&self.drive_base, &["drive", "v3", "files"])?;
        let query = format!(
            "name = '{}' and mimeType = '{}' and trashed = false",
            self.document.replace('\'', "\\'"),
            SPREADSHEET_MIME
        );
        let resp = self
            .client
            .get(url)
            .bearer_auth(token)
            .query(&[("q", query.as_str()), ("fields", "files(id,name)")])
            .send()
            .map_err(transport)?;
        let list: FileList = decode(check_status(resp, &self.document_label())?)?;

        let Some(file) = list.files.into_iter().next() else {
            return Err(SurveyError::MissingResource(self.document_label()));
        };
        tracing::debug!(document = %self.document, id = %file.id, "resolved spreadsheet");
        Ok(self.document_id.get_or_init(|| file.id))
    }

    fn document_label(&self) -> String {
        format!("spreadsheet '{}'", self.document)
    }

    fn values_url(&self, suffix: &str) -> Result<Url> {
        let id = self.document_id()?;
        let range = format!("{}{}", self.sheet, suffix);
        join(&self.api_base, &["v4", "spreadsheets", id, "values", &range])
    }
}

impl SheetStore for HttpSheet {
    fn check(&self) -> Result<()> {
        let token = self.token()?;
        let id = self.document_id()?;
        let url = join(&self.api_base, &["v4", "spreadsheets", id])?;
        let resp = self
            .client
            .get(url)
            .bearer_auth(token)
            .query(&[("fields", "sheets.properties.title")])
            .send()
            .map_err(transport)?;
        let meta: SpreadsheetMeta = decode(check_status(resp, &self.document_label())?)?;
        if !meta.sheets.iter().any(|s| s.properties.title == self.sheet) {
            return Err(SurveyError::MissingResource(format!(
                "worksheet '{}' in {}",
                self.sheet,
                self.document_label()
            )));
        }
        Ok(())
    }

    fn read_all_values(&self) -> Result<Vec<Vec<String>>> {
        let token = self.token()?;
        let url = self.values_url("")?;
        let resp = self
            .client
            .get(url)
            .bearer_auth(token)
            .send()
            .map_err(transport)?;
        let range: ValueRange = decode(check_status(resp, &format!("worksheet '{}'", self.sheet))?)?;
        Ok(range
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_text).collect())
            .collect())
    }

    fn append_row(&self, row: &[Cell]) -> Result<()> {
        let token = self.token()?;
        let url = self.values_url(":append")?;
        let body = serde_json::json!({ "values": [row] });
        let resp = self
            .client
            .post(url)
            .bearer_auth(token)
            .query(&[("valueInputOption", "RAW"), ("insertDataOption", "INSERT_ROWS")])
            .json(&body)
            .send()
            .map_err(transport)?;
        check_status(resp, &format!("worksheet '{}'", self.sheet))?;
        tracing::info!(sheet = %self.sheet, columns = row.len(), "appended row");
        Ok(())
    }

    fn describe(&self) -> String {
        format!("{} / {}", self.document, self.sheet)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn join(base: &Url, segments: &[&str]) -> Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| SurveyError::InvalidConfig(format!("cannot use '{base}' as a base url")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

fn transport(err: reqwest::Error) -> SurveyError {
    SurveyError::NetworkFailure(err.to_string())
}

fn check_status(resp: Response, what: &str) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().unwrap_or_default();
    Err(match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            SurveyError::AuthFailure(format!("{status} while accessing {what}"))
        }
        StatusCode::NOT_FOUND => SurveyError::MissingResource(what.to_string()),
        s if s.is_server_error() || s == StatusCode::TOO_MANY_REQUESTS => {
            SurveyError::NetworkFailure(format!("{status} while accessing {what}"))
        }
        s => SurveyError::Remote {
            status: s.as_u16(),
            message: body,
        },
    })
}

fn decode<T: serde::de::DeserializeOwned>(resp: Response) -> Result<T> {
    let status = resp.status().as_u16();
    resp.json::<T>().map_err(|e| SurveyError::Remote {
        status,
        message: format!("unexpected response body: {e}"),
    })
}

/// Sheet values come back formatted as strings, but numbers may appear
/// unformatted depending on the render option.
fn cell_text(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}
