// src/error.rs
//! Ошибки импорта
//!
//! Любая ошибка прерывает импорт целиком. Сообщение всегда содержит
//! проблемное значение (имя файла, идентификатор биома, имя объекта).

use thiserror::Error;

/// Причина, по которой импорт карты не может быть завершён
#[derive(Debug, Error)]
pub enum ImportError {
    /// Файл не читается, JSON некорректен или не соответствует схеме
    #[error("malformed input `{origin}`: {detail}")]
    MalformedInput { origin: String, detail: String },

    /// Идентификатор биома отсутствует в таблице биомов
    #[error("unknown biome id {biome} in cell {cell}")]
    UnknownBiome { biome: i64, cell: usize },

    /// Хост отказался принять созданный объект
    #[error("host rejected `{object}`: {reason}")]
    HostRejected { object: String, reason: String },

    /// Параметры импорта вне допустимого диапазона
    #[error("invalid import options: {0}")]
    InvalidOptions(String),
}

impl ImportError {
    pub(crate) fn malformed(origin: impl Into<String>, detail: impl ToString) -> Self {
        ImportError::MalformedInput {
            origin: origin.into(),
            detail: detail.to_string(),
        }
    }
}
