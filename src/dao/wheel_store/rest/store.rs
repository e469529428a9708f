//! Remote table store speaking PostgREST conventions.
//!
//! The entire document lives in one row keyed by application id. Two
//! optional server-side procedures implement the spin and completion
//! algorithms transactionally; their absence is reported structurally so
//! the caller can downgrade the capability instead of pattern-matching
//! error text.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Method, StatusCode};
use serde_json::{Value, json};
use tokio::time::sleep;
use tracing::debug;

use crate::dao::models::{ActionReply, SpinOutcome, WheelState, current_time_ms};
use crate::dao::normalize::{normalize, repair};
use crate::dao::storage::{StorageError, StorageResult};

use super::{
    config::RestConfig,
    error::{RestDaoError, RestResult},
    models::{
        SPIN_PROCEDURE, STATE_TABLE, SUBMIT_PROCEDURE, SpinProcedureRow, StateCell, StateRow,
        SubmitProcedureRow,
    },
};

/// Bounded retry policy applied uniformly to reads, writes, and procedures.
const RETRY_ATTEMPTS: u32 = 3;
/// Fixed delay between retry attempts.
const RETRY_DELAY: Duration = Duration::from_millis(350);

/// Client for the remote state table and its optional procedures.
#[derive(Clone)]
pub struct RestWheelStore {
    client: Client,
    base_url: Arc<str>,
    api_key: Arc<str>,
    app_id: Arc<str>,
}

impl RestWheelStore {
    /// Build a store from the configuration; no network traffic happens here,
    /// the state row is seeded lazily on the first load.
    pub fn connect(config: RestConfig) -> RestResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|source| RestDaoError::ClientBuilder { source })?;

        Ok(Self {
            client,
            base_url: Arc::from(config.base_url.trim_end_matches('/')),
            api_key: Arc::from(config.api_key),
            app_id: Arc::from(config.app_id),
        })
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}/rest/v1/{}", self.base_url, path);
        self.client
            .request(method, url)
            .header("apikey", self.api_key.as_ref())
            .bearer_auth(self.api_key.as_ref())
    }

    /// Fetch and normalize the document, seeding the row if it is absent.
    pub async fn load(&self) -> StorageResult<WheelState> {
        let rows = self
            .with_retries(|| self.fetch_state_rows())
            .await
            .map_err(StorageError::from)?;

        if let Some(row) = rows.first() {
            return Ok(normalize(&row.state));
        }

        let state = WheelState::new_default();
        let document = serde_json::to_value(&state)
            .map_err(|err| StorageError::unavailable(
                "failed to serialize default state document".into(),
                err,
            ))?;
        self.with_retries(|| self.upsert_state(document.clone()))
            .await
            .map_err(StorageError::from)?;
        Ok(state)
    }

    /// Normalize, stamp `updated_at_ms`, and upsert the whole document.
    pub async fn save(&self, state: WheelState) -> StorageResult<()> {
        let mut state = repair(state);
        state.updated_at_ms = current_time_ms();

        let document = serde_json::to_value(&state)
            .map_err(|err| StorageError::unavailable(
                "failed to serialize state document".into(),
                err,
            ))?;
        self.with_retries(|| self.upsert_state(document.clone()))
            .await
            .map_err(Into::into)
    }

    /// Run the atomic server-side spin; `None` means the pool was empty.
    pub async fn spin_once(&self) -> StorageResult<Option<SpinOutcome>> {
        let payload = json!({ "p_id": self.app_id.as_ref() });
        let row: SpinProcedureRow = self
            .with_retries(|| self.call_procedure(SPIN_PROCEDURE, payload.clone()))
            .await
            .map_err(StorageError::from)?;

        if let Some(error) = row.error {
            return Err(RestDaoError::RpcFailure {
                procedure: SPIN_PROCEDURE,
                message: error,
            }
            .into());
        }

        let Some(winner_name) = row.winner_name.filter(|name| !name.is_empty()) else {
            return Ok(None);
        };

        let labels_for_spin = row
            .labels_for_spin
            .filter(|labels| !labels.is_empty())
            .unwrap_or_else(|| vec![winner_name.clone()]);

        Ok(Some(SpinOutcome {
            winner_name,
            winner_description: row.winner_description.unwrap_or_default(),
            labels_for_spin,
            spin_id: row.spin_id.unwrap_or(0),
        }))
    }

    /// Run the atomic server-side completion submission.
    pub async fn submit_completion_once(
        &self,
        spin_id: u64,
        team_name: &str,
    ) -> StorageResult<ActionReply> {
        let payload = json!({
            "p_id": self.app_id.as_ref(),
            "p_spin_id": spin_id,
            "p_team_name": team_name,
        });
        let row: SubmitProcedureRow = self
            .with_retries(|| self.call_procedure(SUBMIT_PROCEDURE, payload.clone()))
            .await
            .map_err(StorageError::from)?;

        if let Some(error) = row.error {
            return Ok(ActionReply::rejected(error));
        }
        if row.ok == Some(true) {
            return Ok(ActionReply::accepted(
                row.message
                    .filter(|message| !message.is_empty())
                    .unwrap_or_else(|| "Completion submitted successfully.".into()),
            ));
        }
        Ok(ActionReply::rejected(
            row.message
                .filter(|message| !message.is_empty())
                .unwrap_or_else(|| "Completion failed.".into()),
        ))
    }

    async fn fetch_state_rows(&self) -> RestResult<Vec<StateCell>> {
        let query = [
            ("id", format!("eq.{}", self.app_id)),
            ("select", "state".to_string()),
            ("limit", "1".to_string()),
        ];

        let response = self
            .request(Method::GET, STATE_TABLE)
            .query(&query)
            .send()
            .await
            .map_err(|source| RestDaoError::RequestSend {
                path: STATE_TABLE.to_string(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(RestDaoError::RequestStatus {
                path: STATE_TABLE.to_string(),
                status: response.status(),
            });
        }

        response
            .json::<Vec<StateCell>>()
            .await
            .map_err(|source| RestDaoError::DecodeResponse {
                path: STATE_TABLE.to_string(),
                source,
            })
    }

    async fn upsert_state(&self, document: Value) -> RestResult<()> {
        let rows = vec![StateRow {
            id: self.app_id.to_string(),
            state: document,
        }];

        let response = self
            .request(Method::POST, STATE_TABLE)
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(&rows)
            .send()
            .await
            .map_err(|source| RestDaoError::RequestSend {
                path: STATE_TABLE.to_string(),
                source,
            })?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(RestDaoError::RequestStatus {
                path: STATE_TABLE.to_string(),
                status: response.status(),
            })
        }
    }

    async fn call_procedure<T>(&self, procedure: &'static str, payload: Value) -> RestResult<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let path = format!("rpc/{procedure}");
        let response = self
            .request(Method::POST, &path)
            .json(&payload)
            .send()
            .await
            .map_err(|source| RestDaoError::RequestSend {
                path: path.clone(),
                source,
            })?;

        match response.status() {
            // PostgREST answers 404 when the function does not exist.
            StatusCode::NOT_FOUND => Err(RestDaoError::ProcedureMissing { procedure }),
            status if status.is_success() => {
                let value =
                    response
                        .json::<Value>()
                        .await
                        .map_err(|source| RestDaoError::DecodeResponse {
                            path: path.clone(),
                            source,
                        })?;
                parse_procedure_row(procedure, value)
            }
            other => Err(RestDaoError::RequestStatus { path, status: other }),
        }
    }

    async fn with_retries<T, F, Fut>(&self, mut operation: F) -> RestResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = RestResult<T>>,
    {
        let mut attempt = 0;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    attempt += 1;
                    if attempt >= RETRY_ATTEMPTS {
                        return Err(err);
                    }
                    debug!(attempt, error = %err, "remote call failed; retrying");
                    sleep(RETRY_DELAY).await;
                }
            }
        }
    }
}

/// Procedures may answer with a bare object or a one-row array.
fn parse_procedure_row<T>(procedure: &'static str, value: Value) -> RestResult<T>
where
    T: serde::de::DeserializeOwned,
{
    let row = match value {
        Value::Array(mut rows) => {
            if rows.is_empty() {
                return Err(RestDaoError::MalformedRpcResponse {
                    procedure,
                    detail: "empty response".into(),
                });
            }
            rows.swap_remove(0)
        }
        other => other,
    };

    if !row.is_object() {
        return Err(RestDaoError::MalformedRpcResponse {
            procedure,
            detail: format!("expected an object, got {row}"),
        });
    }

    serde_json::from_value(row).map_err(|err| RestDaoError::MalformedRpcResponse {
        procedure,
        detail: err.to_string(),
    })
}
