pub mod airtable_api_client;
pub mod error;

pub use airtable_api_client::{AirtableClient, RetryPolicy};
pub use error::StoreError;

use async_trait::async_trait;
use contracts::domain::a001_payment::{RecordFields, RecordId};

/// Источник списка актуальных заказов
#[async_trait]
pub trait OrderSource: Send + Sync {
    /// Полный список названий заказов (все страницы, без исключённых статусов)
    async fn fetch_order_names(&self) -> Result<Vec<String>, StoreError>;
}

/// Хранилище, в которое записываются готовые оплаты
#[async_trait]
pub trait RecordSink: Send + Sync {
    async fn create_record(&self, fields: &RecordFields) -> Result<RecordId, StoreError>;
}

#[async_trait]
impl OrderSource for AirtableClient {
    async fn fetch_order_names(&self) -> Result<Vec<String>, StoreError> {
        self.list_order_names().await
    }
}

#[async_trait]
impl RecordSink for AirtableClient {
    async fn create_record(&self, fields: &RecordFields) -> Result<RecordId, StoreError> {
        AirtableClient::create_record(self, fields).await
    }
}
