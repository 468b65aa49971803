use super::error::StoreError;
use crate::shared::config::AirtableConfig;
use contracts::domain::a001_payment::{RecordFields, RecordId};
use once_cell::sync::Lazy;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::time::Duration;

/// Статусы заказов, которые не предлагаются при выборе
static EXCLUDED_STATUSES: Lazy<HashSet<&'static str>> =
    Lazy::new(|| maplit::hashset! {"Расчет", "Отменен", "Отложен"});

const NAME_FIELD: &str = "Name";
const STATUS_FIELD: &str = "Статус";

/// Политика повторов при записи
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            delay: Duration::from_secs(1),
        }
    }
}

/// HTTP-клиент для работы с REST API Airtable
pub struct AirtableClient {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    base_id: String,
    payments_table_id: String,
    orders_table_id: String,
    retry: RetryPolicy,
}

/// Результат одной попытки записи
enum AttemptError {
    Transient(reqwest::Error),
    Fatal(StoreError),
}

impl AirtableClient {
    pub fn new(config: &AirtableConfig) -> Result<Self, StoreError> {
        Ok(Self {
            client: build_http_client(Duration::from_secs(config.timeout_secs))?,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            base_id: config.base_id.clone(),
            payments_table_id: config.payments_table_id.clone(),
            orders_table_id: config.orders_table_id.clone(),
            retry: RetryPolicy::default(),
        })
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, StoreError> {
        self.client = build_http_client(timeout)?;
        Ok(self)
    }

    fn table_url(&self, table_id: &str) -> String {
        format!("{}/{}/{}", self.api_url, self.base_id, table_id)
    }

    /// Создать запись в таблице оплат
    ///
    /// Сетевые сбои и таймауты повторяются согласно `RetryPolicy`,
    /// ответ Airtable с ошибкой возвращается сразу.
    pub async fn create_record(&self, fields: &RecordFields) -> Result<RecordId, StoreError> {
        if self.payments_table_id.trim().is_empty() {
            return Err(StoreError::Config(
                "AIRTABLE_TABLE_ID не настроен".to_string(),
            ));
        }

        let url = self.table_url(&self.payments_table_id);
        let payload = json!({ "records": [{ "fields": fields }] });
        let attempts = self.retry.attempts.max(1);
        let mut last_error = String::new();

        for attempt in 1..=attempts {
            match self.try_create(&url, &payload).await {
                Ok(id) => {
                    tracing::info!("Airtable: запись {} создана (попытка {})", id, attempt);
                    return Ok(id);
                }
                Err(AttemptError::Fatal(e)) => {
                    tracing::error!("Airtable: запись отклонена: {}", e);
                    return Err(e);
                }
                Err(AttemptError::Transient(e)) => {
                    last_error = e.to_string();
                    if attempt < attempts {
                        tracing::warn!(
                            "Airtable: попытка {} не удалась, повтор через {:?}: {}",
                            attempt,
                            self.retry.delay,
                            e
                        );
                        tokio::time::sleep(self.retry.delay).await;
                    }
                }
            }
        }

        tracing::error!(
            "Airtable: запись не создана после {} попыток: {}",
            attempts,
            last_error
        );
        Err(StoreError::NetworkTransient {
            attempts,
            message: last_error,
        })
    }

    async fn try_create(&self, url: &str, payload: &Value) -> Result<RecordId, AttemptError> {
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.api_key)
            .json(payload)
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        let body = response.text().await.map_err(classify)?;

        if !status.is_success() {
            return Err(AttemptError::Fatal(rejected(status, &body)));
        }

        parse_record_id(&body).ok_or_else(|| {
            AttemptError::Fatal(StoreError::Unexpected(format!(
                "в ответе Airtable нет id записи: {}",
                preview(&body)
            )))
        })
    }

    /// Получить названия заказов из таблицы заказов (все страницы)
    ///
    /// Заказы со статусами "Расчет", "Отменен", "Отложен" пропускаются.
    pub async fn list_order_names(&self) -> Result<Vec<String>, StoreError> {
        if self.orders_table_id.trim().is_empty() {
            return Err(StoreError::Config(
                "AIRTABLE_ORDERS_TABLE_ID не настроен".to_string(),
            ));
        }

        let url = self.table_url(&self.orders_table_id);
        let mut names = Vec::new();
        let mut offset: Option<String> = None;
        let mut seen_offsets: HashSet<String> = HashSet::new();
        let mut pages = 0usize;

        loop {
            let mut query: Vec<(&str, &str)> =
                vec![("fields[]", NAME_FIELD), ("fields[]", STATUS_FIELD)];
            if let Some(o) = offset.as_deref() {
                query.push(("offset", o));
            }

            let response = self
                .client
                .get(&url)
                .bearer_auth(&self.api_key)
                .query(&query)
                .send()
                .await
                .map_err(network_error)?;

            let status = response.status();
            let body = response.text().await.map_err(network_error)?;
            if !status.is_success() {
                return Err(rejected(status, &body));
            }

            let page: ListResponse = serde_json::from_str(&body).map_err(|e| {
                StoreError::Unexpected(format!(
                    "ошибка парсинга списка заказов: {}. Ответ: {}",
                    e,
                    preview(&body)
                ))
            })?;
            pages += 1;

            names.extend(page.records.iter().filter_map(ListRecord::active_name));

            match page.offset {
                Some(next) if seen_offsets.contains(&next) => {
                    tracing::warn!("Airtable: offset '{}' повторился, пагинация остановлена", next);
                    break;
                }
                Some(next) if !next.is_empty() => {
                    seen_offsets.insert(next.clone());
                    offset = Some(next);
                }
                _ => break,
            }
        }

        tracing::info!(
            "Airtable: получено {} заказов ({} стр.)",
            names.len(),
            pages
        );
        Ok(names)
    }
}

fn build_http_client(timeout: Duration) -> Result<reqwest::Client, StoreError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| StoreError::Unexpected(format!("не удалось создать HTTP клиент: {}", e)))
}

fn is_transient(e: &reqwest::Error) -> bool {
    e.is_timeout() || e.is_connect() || e.is_request() || e.is_body()
}

fn classify(e: reqwest::Error) -> AttemptError {
    if is_transient(&e) {
        AttemptError::Transient(e)
    } else {
        AttemptError::Fatal(StoreError::Unexpected(e.to_string()))
    }
}

fn network_error(e: reqwest::Error) -> StoreError {
    if is_transient(&e) {
        StoreError::NetworkTransient {
            attempts: 1,
            message: e.to_string(),
        }
    } else {
        StoreError::Unexpected(e.to_string())
    }
}

fn rejected(status: reqwest::StatusCode, body: &str) -> StoreError {
    let message = extract_error_message(body)
        .or_else(|| {
            let trimmed = body.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        })
        .unwrap_or_else(|| format!("HTTP {}", status));
    StoreError::Rejected {
        status: status.as_u16(),
        message,
    }
}

/// Текст ошибки из тела ответа Airtable:
/// `{"error": {"type": "...", "message": "..."}}` или `{"error": "NOT_FOUND"}`
fn extract_error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    match value.get("error")? {
        Value::Object(obj) => obj
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string),
        Value::String(s) => Some(s.clone()),
        _ => None,
    }
}

/// ID созданной записи: `{"records": [{"id": ...}]}` или `{"id": ...}`
fn parse_record_id(body: &str) -> Option<RecordId> {
    let value: Value = serde_json::from_str(body).ok()?;
    let id = value
        .get("records")
        .and_then(|r| r.get(0))
        .and_then(|r| r.get("id"))
        .or_else(|| value.get("id"))?
        .as_str()?;
    Some(RecordId(id.to_string()))
}

fn preview(body: &str) -> String {
    let preview: String = body.chars().take(300).collect();
    if preview.len() < body.len() {
        format!("{}...", preview)
    } else {
        preview
    }
}

#[derive(Debug, Deserialize)]
struct ListResponse {
    #[serde(default)]
    records: Vec<ListRecord>,
    #[serde(default)]
    offset: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ListRecord {
    #[serde(default)]
    fields: serde_json::Map<String, Value>,
}

impl ListRecord {
    fn active_name(&self) -> Option<String> {
        if let Some(status) = self.fields.get(STATUS_FIELD).and_then(Value::as_str) {
            if EXCLUDED_STATUSES.contains(status.trim()) {
                return None;
            }
        }
        let name = self.fields.get(NAME_FIELD)?.as_str()?.trim();
        (!name.is_empty()).then(|| name.to_string())
    }
}
