use async_trait::async_trait;
use chrono_tz::Tz;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tracing::debug;

use crate::models::TradeStatus;
use crate::store::row::{records_from_rows, to_cells};
use crate::store::{StoreError, TradeStore, HEADER};
use crate::strategies::signals::TradeSignal;
use crate::trading::trade_record::TradeRecord;

const SHEETS_URL: &str = "https://sheets.googleapis.com";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";
const TOKEN_LIFETIME_SECS: u64 = 3600;
const TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(60);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// The fields of a Google service-account key file that the token exchange
/// needs.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccount {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

#[derive(Debug, Serialize)]
struct JwtClaims {
    iss: String,
    scope: String,
    aud: String,
    iat: u64,
    exp: u64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppendResponse {
    updates: AppendUpdates,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppendUpdates {
    updated_range: String,
}

struct AccessToken {
    token: String,
    expires_at: Instant,
}

/// Trade log in a Google Sheets worksheet, through the Sheets v4 values API
/// with service-account credentials.
pub struct SheetsStore {
    client: Client,
    account: ServiceAccount,
    spreadsheet_id: String,
    tab: String,
    tz: Tz,
    base_url: String,
    token: Option<AccessToken>,
}

impl SheetsStore {
    pub fn new(
        credentials_json: &str,
        spreadsheet_id: &str,
        tab: &str,
        tz: Tz,
    ) -> Result<Self, StoreError> {
        let account: ServiceAccount = serde_json::from_str(credentials_json)
            .map_err(|e| StoreError::Auth(format!("invalid service-account JSON: {e}")))?;
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            client,
            account,
            spreadsheet_id: spreadsheet_id.to_string(),
            tab: tab.to_string(),
            tz,
            base_url: SHEETS_URL.to_string(),
            token: None,
        })
    }

    fn sign_assertion(&self) -> Result<String, StoreError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| StoreError::Auth(e.to_string()))?
            .as_secs();

        let claims = JwtClaims {
            iss: self.account.client_email.clone(),
            scope: SCOPE.to_string(),
            aud: self.account.token_uri.clone(),
            iat: now,
            exp: now + TOKEN_LIFETIME_SECS,
        };

        let key = EncodingKey::from_rsa_pem(self.account.private_key.as_bytes())
            .map_err(|e| StoreError::Auth(format!("failed to parse private key: {e}")))?;

        encode(&Header::new(Algorithm::RS256), &claims, &key)
            .map_err(|e| StoreError::Auth(format!("failed to sign assertion: {e}")))
    }

    /// Bearer token, refreshed shortly before it lapses.
    async fn access_token(&mut self) -> Result<String, StoreError> {
        if let Some(t) = &self.token {
            if Instant::now() + TOKEN_REFRESH_MARGIN < t.expires_at {
                return Ok(t.token.clone());
            }
        }

        let assertion = self.sign_assertion()?;
        let resp = self
            .client
            .post(&self.account.token_uri)
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(StoreError::Auth(format!("token exchange {status}: {body}")));
        }

        let data: TokenResponse = resp.json().await?;
        let lifetime = data.expires_in.unwrap_or(TOKEN_LIFETIME_SECS);
        debug!("Sheets access token refreshed ({}s)", lifetime);

        self.token = Some(AccessToken {
            token: data.access_token.clone(),
            expires_at: Instant::now() + Duration::from_secs(lifetime),
        });
        Ok(data.access_token)
    }

    fn values_url(&self, range: &str, suffix: &str) -> Result<Url, StoreError> {
        let mut url = Url::parse(&self.base_url).map_err(|e| StoreError::Config(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| StoreError::Config(format!("bad base url {}", self.base_url)))?
            .pop_if_empty()
            .extend(["v4", "spreadsheets", self.spreadsheet_id.as_str(), "values"])
            .push(&format!("{range}{suffix}"));
        Ok(url)
    }

    async fn send(&mut self, req: reqwest::RequestBuilder) -> Result<reqwest::Response, StoreError> {
        let token = self.access_token().await?;
        let resp = req.bearer_auth(token).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(StoreError::Api { status, body });
        }
        Ok(resp)
    }

    async fn get_values(&mut self, range: &str) -> Result<Vec<Vec<String>>, StoreError> {
        let url = self.values_url(range, "")?;
        let req = self.client.get(url);
        let data: ValueRange = self.send(req).await?.json().await?;
        Ok(data
            .values
            .into_iter()
            .map(|row| row.iter().map(cell_text).collect())
            .collect())
    }

    async fn put_values(&mut self, range: &str, values: Value) -> Result<(), StoreError> {
        let url = self.values_url(range, "")?;
        let req = self
            .client
            .put(url)
            .query(&[("valueInputOption", "RAW")])
            .json(&json!({ "range": range, "values": values }));
        self.send(req).await?;
        Ok(())
    }
}

/// `'Tab'!A1:G1` with the worksheet name quoted.
fn a1(tab: &str, cells: &str) -> String {
    format!("'{}'!{}", tab.replace('\'', "''"), cells)
}

/// Sheet row number of the first row in an A1 range such as `'Sheet1'!A5:G5`.
fn first_row_of(range: &str) -> Option<usize> {
    let cells = range.rsplit('!').next()?;
    let start = cells.split(':').next()?;
    start
        .trim_start_matches(|c: char| c.is_ascii_alphabetic() || c == '$')
        .parse()
        .ok()
}

fn cell_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Row values for the API: text stays text, prices go as numbers.
fn row_values(signal: &TradeSignal, tz: Tz) -> Value {
    let cells = to_cells(signal, tz);
    json!([
        cells[0],
        cells[1],
        signal.entry_price,
        signal.ema,
        signal.stop_loss,
        signal.target,
        cells[6],
    ])
}

#[async_trait]
impl TradeStore for SheetsStore {
    async fn ensure_header(&mut self) -> Result<(), StoreError> {
        let range = a1(&self.tab, "A1:G1");
        let existing = self.get_values(&range).await?;
        if existing.iter().all(|row| row.iter().all(|c| c.trim().is_empty())) {
            self.put_values(&range, json!([HEADER])).await?;
        }
        Ok(())
    }

    async fn append(&mut self, signal: &TradeSignal) -> Result<usize, StoreError> {
        let range = a1(&self.tab, "A:G");
        let url = self.values_url(&range, ":append")?;
        let req = self
            .client
            .post(url)
            .query(&[("valueInputOption", "RAW"), ("insertDataOption", "INSERT_ROWS")])
            .json(&json!({ "values": [row_values(signal, self.tz)] }));
        let data: AppendResponse = self.send(req).await?.json().await?;

        let sheet_row = first_row_of(&data.updates.updated_range).ok_or_else(|| {
            StoreError::Format(format!("updatedRange {:?}", data.updates.updated_range))
        })?;
        // row 1 is the header
        sheet_row
            .checked_sub(2)
            .ok_or_else(|| StoreError::Format(format!("append landed on row {sheet_row}")))
    }

    async fn update_status(&mut self, row: usize, status: TradeStatus) -> Result<(), StoreError> {
        let range = a1(&self.tab, &format!("G{}", row + 2));
        self.put_values(&range, json!([[status.as_str()]])).await
    }

    async fn records(&mut self) -> Result<Vec<TradeRecord>, StoreError> {
        let range = a1(&self.tab, "A:G");
        let mut rows = self.get_values(&range).await?;
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        rows.remove(0);
        Ok(records_from_rows(rows, self.tz))
    }
}
