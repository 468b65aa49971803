use contracts::domain::common::Slot;

/// Шаг формы добавления оплаты
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormStep {
    Attachment,
    Amount,
    Note,
    Order,
    OrderSelection,
}

/// Состояние формы одного диалога
///
/// Создаётся кнопкой "Добавить оплату" или вложением, удаляется
/// после сохранения или отмены.
#[derive(Debug, Clone, PartialEq)]
pub struct FormState {
    pub step: FormStep,
    pub attachment_ref: Slot<String>,
    pub amount: Slot<f64>,
    pub note: Slot<String>,
    pub order: Slot<String>,
    /// Варианты заказа, показанные оператору на шаге выбора
    pub order_options: Vec<String>,
}

impl FormState {
    pub fn new() -> Self {
        Self {
            step: FormStep::Attachment,
            attachment_ref: Slot::Pending,
            amount: Slot::Pending,
            note: Slot::Pending,
            order: Slot::Pending,
            order_options: Vec::new(),
        }
    }

    /// Форма, начатая с вложения: сразу переходит к сумме
    pub fn with_attachment(file_ref: String) -> Self {
        Self {
            step: FormStep::Amount,
            attachment_ref: Slot::Provided(file_ref),
            ..Self::new()
        }
    }
}

impl Default for FormState {
    fn default() -> Self {
        Self::new()
    }
}

/// Оператор, приславший сообщение
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operator {
    pub id: i64,
    pub first_name: String,
    pub last_name: Option<String>,
}

impl Operator {
    pub fn display_name(&self) -> String {
        match self.last_name.as_deref().map(str::trim) {
            Some(last) if !last.is_empty() => format!("{} {}", self.first_name, last),
            _ => self.first_name.clone(),
        }
    }
}

/// Разбор суммы: допускается запятая как разделитель, сумма строго больше нуля
pub fn parse_amount(text: &str) -> Option<f64> {
    let normalized = text.trim().replace(',', ".");
    let amount: f64 = normalized.parse().ok()?;
    (amount.is_finite() && amount > 0.0).then_some(amount)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("1500"), Some(1500.0));
        assert_eq!(parse_amount(" 99,90 "), Some(99.9));
        assert_eq!(parse_amount("0"), None);
        assert_eq!(parse_amount("-5"), None);
        assert_eq!(parse_amount("сто"), None);
        assert_eq!(parse_amount("inf"), None);
        assert_eq!(parse_amount("NaN"), None);
    }

    #[test]
    fn test_display_name() {
        let mut operator = Operator {
            id: 1,
            first_name: "Анна".into(),
            last_name: Some("Кузнецова".into()),
        };
        assert_eq!(operator.display_name(), "Анна Кузнецова");
        operator.last_name = None;
        assert_eq!(operator.display_name(), "Анна");
    }

    #[test]
    fn test_form_started_with_attachment() {
        let form = FormState::with_attachment("file-1".into());
        assert_eq!(form.step, FormStep::Amount);
        assert_eq!(form.attachment_ref, Slot::Provided("file-1".into()));
        assert!(form.amount.is_pending());
    }
}
