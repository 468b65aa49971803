use thiserror::Error;

/// Ошибки работы с Airtable
#[derive(Debug, Error)]
pub enum StoreError {
    /// Таймаут или сбой соединения, повторы исчерпаны
    #[error("Airtable не отвечает после {attempts} попыток: {message}")]
    NetworkTransient { attempts: u32, message: String },

    /// Airtable вернул ошибку (валидация, авторизация и т.п.)
    #[error("Airtable API Error: {message}")]
    Rejected { status: u16, message: String },

    #[error("Airtable не настроен: {0}")]
    Config(String),

    #[error("Неожиданная ошибка: {0}")]
    Unexpected(String),
}

impl StoreError {
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::NetworkTransient { .. })
    }
}
