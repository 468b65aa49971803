use crate::shared::airtable::OrderSource;
use chrono::{DateTime, Duration, Utc};
use contracts::domain::a002_order::OrdersSnapshot;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Ошибки файла кэша. Наружу не выходят: кэш только логирует их
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("ошибка чтения/записи файла кэша: {0}")]
    Io(#[from] std::io::Error),

    #[error("повреждённый файл кэша: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Кэш списка заказов в JSON-файле
///
/// Свежий снимок (моложе `max_age`) отдаётся без запроса к Airtable.
/// Иначе список загружается заново; если загрузка не удалась, отдаётся
/// последний сохранённый снимок, даже устаревший.
pub struct OrdersCache {
    source: Arc<dyn OrderSource>,
    path: PathBuf,
    max_age: Duration,
}

impl OrdersCache {
    pub fn new(source: Arc<dyn OrderSource>, path: PathBuf, max_age: Duration) -> Self {
        Self {
            source,
            path,
            max_age,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Список заказов; никогда не возвращает ошибку
    pub async fn get_orders(&self) -> Vec<String> {
        self.get_orders_at(Utc::now()).await
    }

    pub async fn get_orders_at(&self, now: DateTime<Utc>) -> Vec<String> {
        match self.load_snapshot() {
            Ok(Some(snapshot)) if snapshot.is_fresh_at(now, self.max_age) => {
                tracing::debug!(
                    "Кэш заказов свежий ({} шт.), запрос к Airtable не нужен",
                    snapshot.orders.len()
                );
                return snapshot.orders;
            }
            Ok(Some(snapshot)) => {
                tracing::info!(
                    "Кэш заказов устарел (возраст {} мин), обновление",
                    snapshot.age_at(now).num_minutes()
                );
            }
            Ok(None) => tracing::info!("Кэш заказов отсутствует, загрузка из Airtable"),
            Err(e) => tracing::warn!("{}, кэш считается пустым", e),
        }

        self.refresh(now).await
    }

    async fn refresh(&self, now: DateTime<Utc>) -> Vec<String> {
        match self.source.fetch_order_names().await {
            Ok(orders) => {
                let snapshot = OrdersSnapshot::new(now, orders);
                if let Err(e) = self.store_snapshot(&snapshot) {
                    tracing::warn!("Не удалось сохранить кэш заказов {}: {}", self.path.display(), e);
                }
                snapshot.orders
            }
            Err(e) => {
                tracing::warn!("Не удалось обновить список заказов: {}", e);
                match self.load_snapshot() {
                    Ok(Some(snapshot)) => {
                        tracing::info!(
                            "Используется сохранённый список заказов ({} шт.)",
                            snapshot.orders.len()
                        );
                        snapshot.orders
                    }
                    Ok(None) | Err(_) => Vec::new(),
                }
            }
        }
    }

    fn load_snapshot(&self) -> Result<Option<OrdersSnapshot>, CacheError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&contents)?))
    }

    fn store_snapshot(&self, snapshot: &OrdersSnapshot) -> Result<(), CacheError> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string_pretty(snapshot)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}
