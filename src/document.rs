// src/document.rs
//! Документ карты: полный JSON-экспорт генератора фэнтези-карт
//!
//! Модуль читает и проверяет только ту часть схемы, которая нужна для построения сцены:
//! - `info` — версия схемы, имя и размеры карты
//! - `pack.cells` / `pack.vertices` — полигоны ячеек и их вершины
//! - `pack.rivers`, `pack.routes`, `pack.burgs` — реки, дороги и поселения
//! - `biomesData` — необязательная палитра биомов самого файла
//!
//! Неизвестные поля игнорируются, отсутствие обязательных — ошибка.
//! Разбор выполняется по принципу «всё или ничего»: при любой ошибке документ не создаётся.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::ImportError;

/// Поддерживаемая мажорная версия схемы экспорта
pub const SUPPORTED_MAJOR_VERSION: u32 = 1;

/// Корень экспорта
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapDocument {
    pub info: MapInfo,
    pub pack: Pack,
    #[serde(default)]
    pub biomes_data: Option<BiomesData>,
}

/// Глобальные метаданные карты
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapInfo {
    /// Версия генератора, например `1.99.05`
    pub version: String,
    #[serde(default)]
    pub map_name: String,
    /// Ширина холста в единицах карты
    pub width: f32,
    /// Высота холста в единицах карты
    pub height: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Pack {
    pub cells: Vec<Cell>,
    pub vertices: Vec<Vertex>,
    pub rivers: Vec<River>,
    pub routes: Vec<Route>,
    pub burgs: Vec<Burg>,
}

/// Ячейка карты: один полигон сетки
#[derive(Debug, Clone, Deserialize)]
pub struct Cell {
    /// Индексы вершин полигона в `pack.vertices`
    #[serde(rename = "v")]
    pub vertices: Vec<usize>,
    /// Индексы соседних ячеек
    #[serde(rename = "c", default)]
    pub neighbors: Vec<usize>,
    /// Центр ячейки
    #[serde(rename = "p")]
    pub center: [f32; 2],
    /// Высота, 0–100 (ниже 20 — вода)
    #[serde(rename = "h")]
    pub height: f32,
    /// Идентификатор биома как есть; проверяется по таблице при окраске
    pub biome: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Vertex {
    #[serde(rename = "p")]
    pub position: [f32; 2],
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct River {
    #[serde(default)]
    pub i: u32,
    #[serde(default)]
    pub name: String,
    /// Ячейки русла от истока к устью; `-1` — точка за краем карты
    #[serde(default)]
    pub cells: Vec<i64>,
    /// Явная полилиния русла, если экспорт её содержит
    #[serde(default)]
    pub points: Vec<PathPoint>,
}

/// Тип маршрута (`group` в экспорте)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum RouteKind {
    #[serde(rename = "roads")]
    Road,
    #[serde(rename = "trails")]
    Trail,
    #[serde(rename = "searoutes")]
    SeaLane,
    #[serde(other)]
    #[default]
    Other,
}

/// Маршрут: упорядоченная полилиния, возможно с разрывами
#[derive(Debug, Clone, Deserialize)]
pub struct Route {
    #[serde(default)]
    pub i: u32,
    #[serde(rename = "group", default)]
    pub kind: RouteKind,
    #[serde(default)]
    pub name: String,
    pub points: Vec<PathPoint>,
}

/// Точка пути: `[x, y]` или `[x, y, cell]`
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(try_from = "Vec<f64>")]
pub struct PathPoint {
    pub x: f32,
    pub y: f32,
    pub cell: Option<usize>,
}

impl TryFrom<Vec<f64>> for PathPoint {
    type Error = String;

    fn try_from(raw: Vec<f64>) -> Result<Self, Self::Error> {
        match raw.as_slice() {
            [x, y] => Ok(Self {
                x: *x as f32,
                y: *y as f32,
                cell: None,
            }),
            [x, y, cell, ..] if *cell >= 0.0 && cell.fract() == 0.0 => Ok(Self {
                x: *x as f32,
                y: *y as f32,
                cell: Some(*cell as usize),
            }),
            [_, _, cell, ..] => Err(format!("invalid cell reference {cell} in path point")),
            _ => Err(format!("path point needs at least 2 coordinates, got {}", raw.len())),
        }
    }
}

/// Поселение. Нулевой элемент массива в экспорте — пустая заглушка `{}`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Burg {
    pub i: u32,
    pub name: Option<String>,
    pub cell: usize,
    pub removed: bool,
}

/// Палитра биомов из файла: индекс в массиве — идентификатор биома
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BiomesData {
    #[serde(default)]
    pub name: Vec<String>,
    pub color: Vec<String>,
}

/// Читает файл целиком. Любая ошибка ввода-вывода — `MalformedInput` с именем файла.
pub fn read_document(path: &Path) -> Result<Vec<u8>, ImportError> {
    fs::read(path).map_err(|e| ImportError::malformed(path.display().to_string(), e))
}

impl MapDocument {
    /// Разбирает и проверяет документ
    ///
    /// # Аргументы
    /// * `bytes` - содержимое файла
    /// * `origin` - имя источника для сообщений об ошибках
    pub fn from_slice(bytes: &[u8], origin: &str) -> Result<Self, ImportError> {
        let document: Self =
            serde_json::from_slice(bytes).map_err(|e| ImportError::malformed(origin, e))?;
        document.check_version(origin)?;
        document.validate(origin)?;
        Ok(document)
    }

    /// Читает файл и разбирает его
    pub fn from_path(path: &Path) -> Result<Self, ImportError> {
        let bytes = read_document(path)?;
        Self::from_slice(&bytes, &path.display().to_string())
    }

    fn check_version(&self, origin: &str) -> Result<(), ImportError> {
        let major = self
            .info
            .version
            .trim()
            .trim_start_matches('v')
            .split('.')
            .next()
            .and_then(|m| m.parse::<u32>().ok());

        match major {
            Some(SUPPORTED_MAJOR_VERSION) => Ok(()),
            _ => Err(ImportError::malformed(
                origin,
                format!("unsupported schema version `{}`", self.info.version),
            )),
        }
    }

    /// Проверяет размеры карты и все ссылки по индексам
    fn validate(&self, origin: &str) -> Result<(), ImportError> {
        let info = &self.info;
        if !(info.width.is_finite() && info.width > 0.0 && info.height.is_finite() && info.height > 0.0)
        {
            return Err(ImportError::malformed(
                origin,
                format!("invalid map size {}×{}", info.width, info.height),
            ));
        }

        let cell_count = self.pack.cells.len();
        let vertex_count = self.pack.vertices.len();

        for (index, cell) in self.pack.cells.iter().enumerate() {
            if cell.vertices.len() < 3 {
                return Err(ImportError::malformed(
                    origin,
                    format!("cell {index} has {} vertices, need at least 3", cell.vertices.len()),
                ));
            }
            if let Some(v) = cell.vertices.iter().find(|&&v| v >= vertex_count) {
                return Err(ImportError::malformed(
                    origin,
                    format!("cell {index} references vertex {v} of {vertex_count}"),
                ));
            }
            if let Some(n) = cell.neighbors.iter().find(|&&n| n >= cell_count) {
                return Err(ImportError::malformed(
                    origin,
                    format!("cell {index} references neighbor {n} of {cell_count}"),
                ));
            }
            if !cell.height.is_finite() {
                return Err(ImportError::malformed(origin, format!("cell {index} has no valid height")));
            }
        }

        for river in &self.pack.rivers {
            if let Some(c) = river
                .cells
                .iter()
                .find(|&&c| c < -1 || c >= cell_count as i64)
            {
                return Err(ImportError::malformed(
                    origin,
                    format!("river {} references cell {c} of {cell_count}", river.i),
                ));
            }
            check_path_cells(&river.points, cell_count, origin, || format!("river {}", river.i))?;
        }

        for route in &self.pack.routes {
            check_path_cells(&route.points, cell_count, origin, || format!("route {}", route.i))?;
        }

        for burg in self.burgs() {
            if burg.cell >= cell_count {
                return Err(ImportError::malformed(
                    origin,
                    format!("burg {} references cell {} of {cell_count}", burg.i, burg.cell),
                ));
            }
        }

        Ok(())
    }

    /// Действующие поселения (без заглушки и удалённых)
    pub fn burgs(&self) -> impl Iterator<Item = &Burg> {
        self.pack
            .burgs
            .iter()
            .filter(|b| b.i != 0 && b.name.is_some() && !b.removed)
    }

    /// Имя карты, `Map` если экспорт его не содержит
    #[must_use]
    pub fn map_name(&self) -> &str {
        let name = self.info.map_name.trim();
        if name.is_empty() { "Map" } else { name }
    }
}

fn check_path_cells(
    points: &[PathPoint],
    cell_count: usize,
    origin: &str,
    owner: impl Fn() -> String,
) -> Result<(), ImportError> {
    match points.iter().filter_map(|p| p.cell).find(|&c| c >= cell_count) {
        Some(c) => Err(ImportError::malformed(
            origin,
            format!("{} references cell {c} of {cell_count}", owner()),
        )),
        None => Ok(()),
    }
}
