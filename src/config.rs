// src/config.rs
//! Параметры импорта
//!
//! Параметры задаются пользователем при вызове команды импорта:
//! - высота плоскости океана
//! - вертикальный масштаб рельефа
//! - видимость маршрутов после импорта
//! - источник палитры биомов
//!
//! Все структуры поддерживают загрузку из TOML для повторяемых импортов из CLI.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ImportError;

/// Источник палитры биомов
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BiomePalette {
    /// Встроенная таблица биомов генератора
    #[default]
    Builtin,
    /// Таблица из блока `biomesData` импортируемого файла
    Document,
}

/// Параметры одного импорта
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImportOptions {
    /// Высота плоскости океана в единицах высоты карты (0–100).
    /// Итоговая координата z равна `ocean_height * vertical_scale`.
    #[serde(default = "default_ocean_height")]
    pub ocean_height: f32,

    /// Множитель высоты ячейки при переводе в координату z (0.001–1)
    #[serde(default = "default_vertical_scale")]
    pub vertical_scale: f32,

    /// Показывать маршруты сразу после импорта (по умолчанию скрыты)
    #[serde(default)]
    pub show_routes: bool,

    #[serde(default)]
    pub palette: BiomePalette,
}

pub const OCEAN_HEIGHT_RANGE: (f32, f32) = (0.0, 100.0);
pub const VERTICAL_SCALE_RANGE: (f32, f32) = (0.001, 1.0);

fn default_ocean_height() -> f32 {
    10.0
}
fn default_vertical_scale() -> f32 {
    0.1
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            ocean_height: 10.0,
            vertical_scale: 0.1,
            show_routes: false,
            palette: BiomePalette::Builtin,
        }
    }
}

impl ImportOptions {
    /// Загружает параметры из TOML-файла
    ///
    /// # Пример
    /// ```toml
    /// # import.toml
    /// ocean_height = 20
    /// vertical_scale = 0.05
    /// palette = "document"
    /// ```
    pub fn from_toml_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(path)?;
        let options: Self = toml::from_str(&contents)?;
        options.validate()?;
        Ok(options)
    }

    /// Проверяет диапазоны значений
    pub fn validate(&self) -> Result<(), ImportError> {
        check_range("ocean_height", self.ocean_height, OCEAN_HEIGHT_RANGE)?;
        check_range("vertical_scale", self.vertical_scale, VERTICAL_SCALE_RANGE)
    }
}

fn check_range(name: &str, value: f32, (min, max): (f32, f32)) -> Result<(), ImportError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ImportError::InvalidOptions(format!(
            "{name} = {value} is outside {min}..={max}"
        )))
    }
}
