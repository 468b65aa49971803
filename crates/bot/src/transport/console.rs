//! Консольный транспорт для локальной работы без мессенджера
//!
//! Ввод построчно: `/start`, `/cancel`, `file:<ссылка>`, `pick:<данные>`,
//! остальное считается текстом сообщения.

use super::{ChatId, ChatTransport, Keyboard};
use crate::usecases::u002_payment_dialog::{Command, Stimulus};
use async_trait::async_trait;
use tokio::io::{AsyncWriteExt, Stdout};
use tokio::sync::Mutex;

pub struct ConsoleTransport {
    out: Mutex<Stdout>,
}

impl ConsoleTransport {
    pub fn new() -> Self {
        Self {
            out: Mutex::new(tokio::io::stdout()),
        }
    }

    async fn write(&self, text: &str) -> anyhow::Result<()> {
        let mut out = self.out.lock().await;
        out.write_all(text.as_bytes()).await?;
        out.flush().await?;
        Ok(())
    }
}

impl Default for ConsoleTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatTransport for ConsoleTransport {
    async fn send_message(&self, chat_id: ChatId, text: &str) -> anyhow::Result<()> {
        self.write(&format!("[{}] {}\n", chat_id, text)).await
    }

    async fn send_keyboard(
        &self,
        chat_id: ChatId,
        text: &str,
        keyboard: &Keyboard,
    ) -> anyhow::Result<()> {
        self.write(&format!("[{}] {}\n{}", chat_id, text, render_keyboard(keyboard)))
            .await
    }

    async fn resolve_attachment_url(&self, file_ref: &str) -> anyhow::Result<String> {
        if file_ref.starts_with("http://") || file_ref.starts_with("https://") {
            Ok(file_ref.to_string())
        } else {
            anyhow::bail!("файл '{}' не является ссылкой", file_ref)
        }
    }
}

fn render_keyboard(keyboard: &Keyboard) -> String {
    let mut out = String::new();
    match keyboard {
        Keyboard::Reply(rows) => {
            for row in rows {
                out.push_str(&format!("    [ {} ]\n", row.join(" | ")));
            }
        }
        Keyboard::Inline(rows) => {
            for button in rows.iter().flatten() {
                out.push_str(&format!("    pick:{}  →  {}\n", button.data, button.text));
            }
        }
    }
    out
}

/// Разбор строки консоли в событие диалога
pub fn parse_line(line: &str) -> Option<Stimulus> {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.trim().is_empty() {
        return None;
    }
    let stimulus = match line.trim() {
        "/start" => Stimulus::Command(Command::Start),
        "/cancel" => Stimulus::Command(Command::Cancel),
        other => {
            if let Some(file) = other.strip_prefix("file:") {
                Stimulus::Attachment(file.trim().to_string())
            } else if let Some(data) = other.strip_prefix("pick:") {
                Stimulus::Callback(data.trim().to_string())
            } else {
                Stimulus::Text(line.to_string())
            }
        }
    };
    Some(stimulus)
}
