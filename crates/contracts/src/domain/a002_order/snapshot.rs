use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Снимок списка заказов, сохраняемый в файл кэша
///
/// Формат файла: `{"updated_at": <unix seconds>, "orders": ["...", ...]}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrdersSnapshot {
    /// Время обновления, секунды Unix (дробные)
    pub updated_at: f64,
    pub orders: Vec<String>,
}

impl OrdersSnapshot {
    pub fn new(updated_at: DateTime<Utc>, orders: Vec<String>) -> Self {
        Self {
            updated_at: updated_at.timestamp_millis() as f64 / 1000.0,
            orders,
        }
    }

    /// Возраст снимка на момент `now`
    pub fn age_at(&self, now: DateTime<Utc>) -> Duration {
        let now_ms = now.timestamp_millis();
        let updated_ms = (self.updated_at * 1000.0).round() as i64;
        Duration::milliseconds(now_ms - updated_ms)
    }

    /// Снимок свежий, если его возраст строго меньше `max_age`
    ///
    /// Снимок с `updated_at` из будущего (сбитые часы) считается устаревшим.
    pub fn is_fresh_at(&self, now: DateTime<Utc>, max_age: Duration) -> bool {
        let age = self.age_at(now);
        age >= Duration::zero() && age < max_age
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_freshness_boundary() {
        let written = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let snapshot = OrdersSnapshot::new(written, vec!["ORD-1".into()]);
        let day = Duration::hours(24);

        assert!(snapshot.is_fresh_at(written + Duration::seconds(24 * 3600 - 1), day));
        assert!(!snapshot.is_fresh_at(written + day, day));
        assert!(!snapshot.is_fresh_at(written + Duration::seconds(24 * 3600 + 1), day));
    }

    #[test]
    fn test_snapshot_from_future_is_stale() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let day = Duration::hours(24);

        let ahead = OrdersSnapshot::new(now + Duration::seconds(1), vec!["ORD-1".into()]);
        assert!(!ahead.is_fresh_at(now, day));

        let far_ahead = OrdersSnapshot::new(now + Duration::days(365), vec![]);
        assert!(!far_ahead.is_fresh_at(now, day));

        assert!(OrdersSnapshot::new(now, vec![]).is_fresh_at(now, day));
    }

    #[test]
    fn test_file_format() {
        let snapshot: OrdersSnapshot =
            serde_json::from_str(r#"{"updated_at": 1700000000.25, "orders": ["Заказ 1"]}"#)
                .unwrap();
        assert_eq!(snapshot.orders, vec!["Заказ 1".to_string()]);
        assert_eq!(snapshot.updated_at, 1700000000.25);
    }
}
