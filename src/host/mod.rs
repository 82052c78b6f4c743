// src/host/mod.rs
//! Интерфейсы хост-приложения
//!
//! Импорт ничего не знает о конкретном 3D-редакторе. Всё, что ему нужно от хоста,
//! описано трейтом [`Host`]:
//! - создание сеток, кривых, материалов и коллекций
//! - регистрация объекта в коллекции сцены
//! - переключение видимости
//! - удаление созданного (для отката неудавшегося импорта)
//!
//! [`memory::SceneGraph`] — реализация в памяти, которой пользуются CLI и тесты.

pub mod memory;
pub mod png;

use thiserror::Error;

use crate::geometry::MeshGeometry;
use crate::paint::MaterialSpec;
use crate::paths::CurveGeometry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MaterialId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CollectionId(pub u64);

/// Отказ хоста выполнить операцию
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{reason}")]
pub struct HostError {
    pub reason: String,
}

impl HostError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Операции сцены, которые импорт вызывает у хоста
pub trait Host {
    /// Создаёт коллекцию внутри `parent` (или в корне сцены)
    fn create_collection(
        &mut self,
        name: &str,
        parent: Option<CollectionId>,
    ) -> Result<CollectionId, HostError>;

    /// Создаёт объект-сетку, ещё не привязанный к сцене
    fn create_mesh(&mut self, name: &str, mesh: &MeshGeometry) -> Result<ObjectId, HostError>;

    /// Создаёт объект-кривую, ещё не привязанный к сцене
    fn create_curve(&mut self, name: &str, curve: &CurveGeometry) -> Result<ObjectId, HostError>;

    fn create_material(&mut self, spec: &MaterialSpec) -> Result<MaterialId, HostError>;

    fn assign_material(&mut self, object: ObjectId, material: MaterialId) -> Result<(), HostError>;

    /// Регистрирует объект в коллекции сцены
    fn link(&mut self, object: ObjectId, collection: CollectionId) -> Result<(), HostError>;

    fn set_visible(&mut self, object: ObjectId, visible: bool) -> Result<(), HostError>;

    /// Занято ли имя объектом
    fn contains_object(&self, name: &str) -> bool;

    /// Занято ли имя коллекцией
    fn contains_collection(&self, name: &str) -> bool;

    /// Занято ли имя материалом
    fn contains_material(&self, name: &str) -> bool;

    fn remove_object(&mut self, object: ObjectId);

    fn remove_material(&mut self, material: MaterialId);

    fn remove_collection(&mut self, collection: CollectionId);
}
