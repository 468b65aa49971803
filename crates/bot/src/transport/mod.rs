pub mod console;

use async_trait::async_trait;

pub type ChatId = i64;

/// Кнопка inline-клавиатуры: текст и данные обратного вызова
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineButton {
    pub text: String,
    pub data: String,
}

/// Клавиатура под сообщением
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Keyboard {
    /// Обычная клавиатура: кнопки отправляют свой текст
    Reply(Vec<Vec<String>>),
    /// Inline-кнопки: нажатие приходит как callback с `data`
    Inline(Vec<Vec<InlineButton>>),
}

/// Транспорт чата (Telegram и т.п.)
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send_message(&self, chat_id: ChatId, text: &str) -> anyhow::Result<()>;

    async fn send_keyboard(
        &self,
        chat_id: ChatId,
        text: &str,
        keyboard: &Keyboard,
    ) -> anyhow::Result<()>;

    /// Постоянная ссылка на файл вложения
    async fn resolve_attachment_url(&self, file_ref: &str) -> anyhow::Result<String>;
}
