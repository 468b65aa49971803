use crate::domain::a001_payment::Operator;
use crate::transport::ChatId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Cancel,
}

/// Событие от транспорта чата
#[derive(Debug, Clone, PartialEq)]
pub enum Stimulus {
    Command(Command),
    Text(String),
    /// Ссылка на файл вложения в транспорте (file_id)
    Attachment(String),
    /// Данные нажатой inline-кнопки
    Callback(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Incoming {
    pub chat_id: ChatId,
    pub operator: Operator,
    pub stimulus: Stimulus,
}
