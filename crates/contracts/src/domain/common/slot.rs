use serde::{Deserialize, Serialize};

/// Значение шага формы
///
/// Отличает явный пропуск ("Пропустить") от ещё не заполненного поля.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state", content = "value")]
pub enum Slot<T> {
    Pending,
    Skipped,
    Provided(T),
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Slot::Pending
    }
}

impl<T> Slot<T> {
    pub fn provided(&self) -> Option<&T> {
        match self {
            Slot::Provided(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Slot::Pending)
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Slot::Skipped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skip_is_not_pending() {
        let pending: Slot<f64> = Slot::default();
        let skipped: Slot<f64> = Slot::Skipped;

        assert!(pending.is_pending());
        assert!(!skipped.is_pending());
        assert!(skipped.is_skipped());
        assert_eq!(skipped.provided(), None);
        assert_eq!(Slot::Provided(5.0).provided(), Some(&5.0));
    }
}
