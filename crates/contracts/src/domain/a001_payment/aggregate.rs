use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::json;

/// ID записи, созданной в Airtable (напр. "recXXXXXXXXXXXXXX")
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordId(pub String);

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Поля таблицы оплат в Airtable (агрегат a001)
///
/// Набор закрыт: имя поля, которого нет в таблице, собрать нельзя.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordField {
    Sender,
    Amount,
    Note,
    Order,
    Attachment,
}

impl RecordField {
    /// Имя колонки в Airtable
    pub fn column_name(&self) -> &'static str {
        match self {
            RecordField::Sender => "Отправитель",
            RecordField::Amount => "Сумма",
            RecordField::Note => "Примечание",
            RecordField::Order => "Заказ",
            RecordField::Attachment => "Вложение",
        }
    }
}

/// Значение поля записи
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Number(f64),
    /// Список URL вложений, в Airtable уходит как `[{"url": ...}]`
    Attachments(Vec<String>),
}

impl FieldValue {
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            FieldValue::Text(s) => json!(s),
            FieldValue::Number(n) => json!(n),
            FieldValue::Attachments(urls) => {
                serde_json::Value::Array(urls.iter().map(|u| json!({ "url": u })).collect())
            }
        }
    }
}

/// Упорядоченный набор полей новой записи
///
/// Пустые (`None`) поля в JSON не попадают.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordFields {
    entries: Vec<(RecordField, Option<FieldValue>)>,
}

impl RecordFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Установить значение поля; повторная установка заменяет значение на месте
    pub fn set(&mut self, field: RecordField, value: Option<FieldValue>) -> &mut Self {
        if let Some(entry) = self.entries.iter_mut().find(|(f, _)| *f == field) {
            entry.1 = value;
        } else {
            self.entries.push((field, value));
        }
        self
    }

    pub fn get(&self, field: RecordField) -> Option<&FieldValue> {
        self.entries
            .iter()
            .find(|(f, _)| *f == field)
            .and_then(|(_, v)| v.as_ref())
    }

    pub fn entries(&self) -> &[(RecordField, Option<FieldValue>)] {
        &self.entries
    }

    /// Поля, у которых есть значение
    pub fn present(&self) -> impl Iterator<Item = (RecordField, &FieldValue)> {
        self.entries
            .iter()
            .filter_map(|(f, v)| v.as_ref().map(|v| (*f, v)))
    }
}

impl Serialize for RecordFields {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let present: Vec<_> = self.present().collect();
        let mut map = serializer.serialize_map(Some(present.len()))?;
        for (field, value) in present {
            map.serialize_entry(field.column_name(), &value.to_json())?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialize_skips_empty_fields() {
        let mut fields = RecordFields::new();
        fields
            .set(RecordField::Sender, Some(FieldValue::Text("Иван Петров".into())))
            .set(RecordField::Amount, Some(FieldValue::Number(1500.5)))
            .set(RecordField::Note, None)
            .set(
                RecordField::Attachment,
                Some(FieldValue::Attachments(vec!["https://files/x.jpg".into()])),
            );

        let value = serde_json::to_value(&fields).unwrap();
        assert_eq!(
            value,
            json!({
                "Отправитель": "Иван Петров",
                "Сумма": 1500.5,
                "Вложение": [{ "url": "https://files/x.jpg" }]
            })
        );
    }

    #[test]
    fn test_set_replaces_in_place() {
        let mut fields = RecordFields::new();
        fields
            .set(RecordField::Order, Some(FieldValue::Text("A".into())))
            .set(RecordField::Sender, Some(FieldValue::Text("B".into())))
            .set(RecordField::Order, Some(FieldValue::Text("C".into())));

        assert_eq!(fields.entries().len(), 2);
        assert_eq!(fields.entries()[0].0, RecordField::Order);
        assert_eq!(
            fields.get(RecordField::Order),
            Some(&FieldValue::Text("C".into()))
        );
    }
}
