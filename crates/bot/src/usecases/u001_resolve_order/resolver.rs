use crate::domain::a002_order::cache::OrdersCache;
use crate::shared::fuzzy::partial_ratio;
use contracts::usecases::u001_resolve_order::ResolutionOutcome;
use once_cell::sync::Lazy;
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

/// Минимальный балл partial_ratio, при котором заказ считается совпавшим
pub const SCORE_CUTOFF: f64 = 80.0;

/// Служебные значения заказа: принимаются как есть, без поиска
static SHORTCUTS: Lazy<HashSet<&'static str>> =
    Lazy::new(|| maplit::hashset! {"цех", "дом", "не знаю"});

pub fn is_shortcut(raw_input: &str) -> bool {
    SHORTCUTS.contains(raw_input.trim().to_lowercase().as_str())
}

/// Подобрать заказы по введённому тексту
///
/// Каждое слово ввода ищется нечётко по всем заказам; в результат попадают
/// заказы, совпавшие со всеми словами, в порядке исходного списка.
/// Последним вариантом всегда идёт сам ввод.
pub fn resolve(raw_input: &str, candidates: &[String]) -> ResolutionOutcome {
    let raw = raw_input.trim();
    let normalized = raw.to_lowercase();

    if SHORTCUTS.contains(normalized.as_str()) || candidates.is_empty() {
        return ResolutionOutcome::Accepted(raw.to_string());
    }

    let lowered: Vec<String> = candidates.iter().map(|c| c.to_lowercase()).collect();

    let mut matched: Option<BTreeSet<usize>> = None;
    for token in normalized.split_whitespace() {
        let hits: BTreeSet<usize> = lowered
            .iter()
            .enumerate()
            .filter(|(_, candidate)| partial_ratio(token, candidate) >= SCORE_CUTOFF)
            .map(|(idx, _)| idx)
            .collect();

        let next = match matched {
            None => hits,
            Some(prev) => prev.intersection(&hits).copied().collect(),
        };
        let exhausted = next.is_empty();
        matched = Some(next);
        if exhausted {
            break;
        }
    }

    let mut options: Vec<String> = matched
        .unwrap_or_default()
        .into_iter()
        .map(|idx| candidates[idx].clone())
        .collect();
    options.push(raw.to_string());

    ResolutionOutcome::Choose(options)
}

/// Подбор заказа с загрузкой списка кандидатов из кэша
pub struct OrderResolver {
    cache: Arc<OrdersCache>,
}

impl OrderResolver {
    pub fn new(cache: Arc<OrdersCache>) -> Self {
        Self { cache }
    }

    /// Ошибки получения списка заказов не прерывают подбор:
    /// без кандидатов ввод принимается как есть.
    pub async fn resolve_input(&self, raw_input: &str) -> ResolutionOutcome {
        if is_shortcut(raw_input) {
            return ResolutionOutcome::Accepted(raw_input.trim().to_string());
        }

        let candidates = self.cache.get_orders().await;
        if candidates.is_empty() {
            tracing::warn!(
                "Список заказов недоступен, заказ '{}' принят без подбора",
                raw_input.trim()
            );
        }

        let outcome = resolve(raw_input, &candidates);
        tracing::info!(
            "Подбор заказа '{}': найдено {} из {}",
            raw_input.trim(),
            outcome.matches().len(),
            candidates.len()
        );
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::airtable::{OrderSource, StoreError};
    use async_trait::async_trait;

    fn list(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_single_token_match() {
        let candidates = list(&["ORD-ALPHA-1", "ORD-BETA-2"]);
        assert_eq!(
            resolve("alpha", &candidates),
            ResolutionOutcome::Choose(list(&["ORD-ALPHA-1", "alpha"]))
        );
    }

    #[test]
    fn test_all_tokens_must_match_same_candidate() {
        let candidates = list(&["Client Smith Order 7"]);
        assert_eq!(
            resolve("smith 7", &candidates),
            ResolutionOutcome::Choose(list(&["Client Smith Order 7", "smith 7"]))
        );

        let candidates = list(&["Смирнов кухня", "Смирнов шкаф", "Иванов шкаф"]);
        assert_eq!(
            resolve("смирнов шкаф", &candidates),
            ResolutionOutcome::Choose(list(&["Смирнов шкаф", "смирнов шкаф"]))
        );
    }

    #[test]
    fn test_matches_keep_candidate_order() {
        let candidates = list(&["Zeta Кухня", "Alpha Кухня", "Beta шкаф", "Gamma Кухня"]);
        let outcome = resolve("кухня", &candidates);
        assert_eq!(
            outcome.matches(),
            &list(&["Zeta Кухня", "Alpha Кухня", "Gamma Кухня"])[..]
        );
        assert_eq!(outcome.options().last().map(String::as_str), Some("кухня"));
    }

    #[test]
    fn test_no_match_leaves_only_raw_input() {
        let candidates = list(&["ORD-ALPHA-1"]);
        assert_eq!(
            resolve("  Новый заказ  ", &candidates),
            ResolutionOutcome::Choose(list(&["Новый заказ"]))
        );
    }

    #[test]
    fn test_raw_input_is_appended_even_when_duplicate() {
        let candidates = list(&["alpha"]);
        assert_eq!(
            resolve("alpha", &candidates),
            ResolutionOutcome::Choose(list(&["alpha", "alpha"]))
        );
    }

    #[test]
    fn test_shortcuts_skip_search() {
        let candidates = list(&["Цех 1", "Дом на Ленина"]);
        for input in ["цех", "ДОМ", "  Не знаю "] {
            assert_eq!(
                resolve(input, &candidates),
                ResolutionOutcome::Accepted(input.trim().to_string())
            );
        }
    }

    #[test]
    fn test_empty_candidates_accept_raw_input() {
        assert_eq!(
            resolve("ORD-1", &[]),
            ResolutionOutcome::Accepted("ORD-1".to_string())
        );
    }

    #[test]
    fn test_blank_input_has_no_matches() {
        let candidates = list(&["ORD-1"]);
        assert_eq!(
            resolve("   ", &candidates),
            ResolutionOutcome::Choose(list(&[""]))
        );
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let candidates = list(&["ORD-ALPHA-1", "ORD-ALPHA-2", "ORD-BETA-2"]);
        let before = candidates.clone();
        let first = resolve("alpha 2", &candidates);
        let second = resolve("alpha 2", &candidates);
        assert_eq!(first, second);
        assert_eq!(candidates, before);
        assert_eq!(first.matches(), &list(&["ORD-ALPHA-2"])[..]);
    }

    struct FailingSource;

    #[async_trait]
    impl OrderSource for FailingSource {
        async fn fetch_order_names(&self) -> Result<Vec<String>, StoreError> {
            Err(StoreError::NetworkTransient {
                attempts: 1,
                message: "connection refused".into(),
            })
        }
    }

    #[tokio::test]
    async fn test_resolve_input_degrades_to_raw_input() {
        let dir = tempfile::tempdir().unwrap();
        let cache = OrdersCache::new(
            Arc::new(FailingSource),
            dir.path().join("orders_cache.json"),
            chrono::Duration::hours(24),
        );
        let resolver = OrderResolver::new(Arc::new(cache));

        assert_eq!(
            resolver.resolve_input(" ORD-77 ").await,
            ResolutionOutcome::Accepted("ORD-77".to_string())
        );
        assert_eq!(
            resolver.resolve_input("Цех").await,
            ResolutionOutcome::Accepted("Цех".to_string())
        );
    }
}
