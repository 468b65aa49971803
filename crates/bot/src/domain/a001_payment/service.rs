use super::form::FormState;
use contracts::domain::a001_payment::{FieldValue, RecordField, RecordFields};

/// Собрать поля записи для Airtable из заполненной формы
///
/// Пустые и пропущенные значения в запись не попадают.
pub fn build_record_fields(
    form: &FormState,
    sender_name: &str,
    attachment_url: Option<String>,
) -> RecordFields {
    let mut fields = RecordFields::new();
    fields.set(
        RecordField::Sender,
        Some(FieldValue::Text(sender_name.to_string())),
    );
    fields.set(
        RecordField::Amount,
        form.amount.provided().map(|a| FieldValue::Number(*a)),
    );
    fields.set(RecordField::Note, non_empty_text(form.note.provided()));
    fields.set(RecordField::Order, non_empty_text(form.order.provided()));
    fields.set(
        RecordField::Attachment,
        attachment_url.map(|url| FieldValue::Attachments(vec![url])),
    );
    fields
}

fn non_empty_text(value: Option<&String>) -> Option<FieldValue> {
    value
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| FieldValue::Text(s.to_string()))
}

/// Сообщение об успешно добавленной записи (HTML)
pub fn summary_message(form: &FormState, sender_name: &str) -> String {
    let mut lines = vec!["✅ Запись добавлена:\n".to_string()];
    if let Some(order) = form.order.provided().filter(|o| !o.trim().is_empty()) {
        lines.push(format!("<b>Заказ:</b> {}", escape_html(order)));
    }
    if form.attachment_ref.provided().is_some() {
        lines.push("<b>Вложение:</b> 📎".to_string());
    }
    if let Some(amount) = form.amount.provided() {
        lines.push(format!("<b>Сумма:</b> {}", amount));
    }
    if let Some(note) = form.note.provided().filter(|n| !n.trim().is_empty()) {
        lines.push(format!("<b>Примечание:</b> {}", escape_html(note)));
    }
    lines.push(format!("<b>Отправитель:</b> {}", escape_html(sender_name)));
    lines.join("\n")
}

/// Сообщение об ошибке сохранения, текст ошибки передаётся как есть
pub fn failure_message(error: &str) -> String {
    format!(
        "Произошла ошибка при сохранении в Airtable:\n<code>{}</code>",
        escape_html(error)
    )
}

pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::domain::common::Slot;
    use serde_json::json;

    fn filled_form() -> FormState {
        FormState {
            attachment_ref: Slot::Provided("file-1".into()),
            amount: Slot::Provided(2500.0),
            note: Slot::Provided("аванс".into()),
            order: Slot::Provided("Смирнов шкаф".into()),
            ..FormState::new()
        }
    }

    #[test]
    fn test_build_record_fields_full() {
        let fields = build_record_fields(
            &filled_form(),
            "Анна Кузнецова",
            Some("https://files/doc.pdf".into()),
        );
        assert_eq!(
            serde_json::to_value(&fields).unwrap(),
            json!({
                "Отправитель": "Анна Кузнецова",
                "Сумма": 2500.0,
                "Примечание": "аванс",
                "Заказ": "Смирнов шкаф",
                "Вложение": [{ "url": "https://files/doc.pdf" }]
            })
        );
    }

    #[test]
    fn test_build_record_fields_skipped_values_omitted() {
        let form = FormState {
            attachment_ref: Slot::Skipped,
            amount: Slot::Skipped,
            note: Slot::Provided("  ".into()),
            order: Slot::Skipped,
            ..FormState::new()
        };
        let fields = build_record_fields(&form, "Анна", None);
        assert_eq!(
            serde_json::to_value(&fields).unwrap(),
            json!({ "Отправитель": "Анна" })
        );
    }

    #[test]
    fn test_summary_message() {
        let text = summary_message(&filled_form(), "Анна");
        assert_eq!(
            text,
            "✅ Запись добавлена:\n\n<b>Заказ:</b> Смирнов шкаф\n<b>Вложение:</b> 📎\n\
             <b>Сумма:</b> 2500\n<b>Примечание:</b> аванс\n<b>Отправитель:</b> Анна"
        );
    }

    #[test]
    fn test_failure_message_escapes_upstream_text() {
        assert_eq!(
            failure_message("Airtable API Error: <bad>"),
            "Произошла ошибка при сохранении в Airtable:\n<code>Airtable API Error: &lt;bad&gt;</code>"
        );
    }
}
