use serde::{Deserialize, Serialize};

/// Результат разбора введённого номера заказа
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum ResolutionOutcome {
    /// Значение принято сразу, выбор не нужен (служебное слово или нет списка заказов)
    Accepted(String),
    /// Варианты для выбора оператором: найденные заказы, последним идёт исходный ввод
    Choose(Vec<String>),
}

impl ResolutionOutcome {
    /// Все варианты по порядку; исходный ввод всегда последний
    pub fn options(&self) -> Vec<String> {
        match self {
            ResolutionOutcome::Accepted(value) => vec![value.clone()],
            ResolutionOutcome::Choose(options) => options.clone(),
        }
    }

    /// Найденные заказы без исходного ввода
    pub fn matches(&self) -> &[String] {
        match self {
            ResolutionOutcome::Accepted(_) => &[],
            ResolutionOutcome::Choose(options) => {
                &options[..options.len().saturating_sub(1)]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_exclude_fallback() {
        let outcome = ResolutionOutcome::Choose(vec!["ORD-ALPHA-1".into(), "alpha".into()]);
        assert_eq!(outcome.matches(), &["ORD-ALPHA-1".to_string()]);
        assert_eq!(outcome.options().last().map(String::as_str), Some("alpha"));

        let accepted = ResolutionOutcome::Accepted("цех".into());
        assert!(accepted.matches().is_empty());
        assert_eq!(accepted.options(), vec!["цех".to_string()]);
    }
}
