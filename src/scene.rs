use crate::error::ImportError;
use crate::geometry::MeshGeometry;
use crate::host::{CollectionId, Host, HostError, MaterialId, ObjectId};
use crate::paint::MaterialSpec;
use crate::paths::CurveGeometry;

/// Предел суффиксов `.001`…`.999` при подборе свободного имени
const MAX_NAME_SUFFIX: u32 = 999;

#[derive(Debug, Clone, Copy)]
enum Created {
    Object(ObjectId),
    Material(MaterialId),
    Collection(CollectionId),
}

/// Транзакция вставки объектов в сцену хоста
///
/// Запоминает всё созданное. Если транзакцию не зафиксировать через [`Insertion::commit`],
/// при удалении она убирает созданное из сцены в обратном порядке.
pub struct Insertion<'h, H: Host + ?Sized> {
    host: &'h mut H,
    created: Vec<Created>,
    committed: bool,
}

impl<'h, H: Host + ?Sized> Insertion<'h, H> {
    pub fn new(host: &'h mut H) -> Self {
        Self {
            host,
            created: Vec::new(),
            committed: false,
        }
    }

    /// Свободное имя объекта: `base`, затем `base.001`, `base.002`, …
    pub fn unique_name(&self, base: &str) -> String {
        unique(base, |name| self.host.contains_object(name))
    }

    /// Свободное имя коллекции; коллекции не конкурируют за имена с объектами
    pub fn unique_collection_name(&self, base: &str) -> String {
        unique(base, |name| self.host.contains_collection(name))
    }

    /// Создаёт коллекцию со свободным именем
    pub fn collection(
        &mut self,
        base: &str,
        parent: Option<CollectionId>,
    ) -> Result<CollectionId, ImportError> {
        let name = self.unique_collection_name(base);
        let id = self
            .host
            .create_collection(&name, parent)
            .map_err(|e| rejected(&name, e))?;
        self.created.push(Created::Collection(id));
        tracing::debug!("Коллекция {name}");
        Ok(id)
    }

    /// Создаёт материал со свободным именем
    pub fn material(&mut self, spec: &MaterialSpec) -> Result<MaterialId, ImportError> {
        let spec = MaterialSpec {
            name: unique(&spec.name, |n| self.host.contains_material(n)),
            ..spec.clone()
        };
        let id = self
            .host
            .create_material(&spec)
            .map_err(|e| rejected(&spec.name, e))?;
        self.created.push(Created::Material(id));
        Ok(id)
    }

    /// Создаёт сетку, при необходимости материал для неё, и регистрирует в коллекции
    pub fn insert_mesh(
        &mut self,
        base: &str,
        mesh: &MeshGeometry,
        material: Option<&MaterialSpec>,
        collection: CollectionId,
    ) -> Result<String, ImportError> {
        let name = self.unique_name(base);
        let object = self
            .host
            .create_mesh(&name, mesh)
            .map_err(|e| rejected(&name, e))?;
        self.created.push(Created::Object(object));

        if let Some(spec) = material {
            let id = self.material(spec)?;
            self.host
                .assign_material(object, id)
                .map_err(|e| rejected(&name, e))?;
        }

        self.host
            .link(object, collection)
            .map_err(|e| rejected(&name, e))?;
        tracing::debug!(
            "Сетка {name}: {} граней, {} вершин",
            mesh.faces.len(),
            mesh.vertices.len()
        );
        Ok(name)
    }

    /// Создаёт кривую и регистрирует в коллекции; скрытая кривая остаётся в сцене
    ///
    /// `material` создаётся заранее через [`Insertion::material`] и может быть общим
    /// для многих кривых.
    pub fn insert_curve(
        &mut self,
        base: &str,
        curve: &CurveGeometry,
        material: Option<MaterialId>,
        hidden: bool,
        collection: CollectionId,
    ) -> Result<String, ImportError> {
        let name = self.unique_name(base);
        let object = self
            .host
            .create_curve(&name, curve)
            .map_err(|e| rejected(&name, e))?;
        self.created.push(Created::Object(object));

        if let Some(material) = material {
            self.host
                .assign_material(object, material)
                .map_err(|e| rejected(&name, e))?;
        }

        self.host
            .link(object, collection)
            .map_err(|e| rejected(&name, e))?;
        if hidden {
            self.host
                .set_visible(object, false)
                .map_err(|e| rejected(&name, e))?;
        }
        Ok(name)
    }

    /// Сколько элементов создано в рамках транзакции
    #[must_use]
    pub fn created(&self) -> usize {
        self.created.len()
    }

    /// Фиксирует вставку: созданное остаётся в сцене
    pub fn commit(mut self) {
        self.committed = true;
    }

    fn rollback(&mut self) {
        if self.created.is_empty() {
            return;
        }
        tracing::error!("Откат импорта: удаление {} элементов", self.created.len());
        while let Some(item) = self.created.pop() {
            match item {
                Created::Object(id) => self.host.remove_object(id),
                Created::Material(id) => self.host.remove_material(id),
                Created::Collection(id) => self.host.remove_collection(id),
            }
        }
    }
}

impl<H: Host + ?Sized> Drop for Insertion<'_, H> {
    fn drop(&mut self) {
        if !self.committed {
            self.rollback();
        }
    }
}

fn unique(base: &str, taken: impl Fn(&str) -> bool) -> String {
    if !taken(base) {
        return base.to_owned();
    }
    (1..=MAX_NAME_SUFFIX)
        .map(|n| format!("{base}.{n:03}"))
        .find(|name| !taken(name))
        // Все суффиксы заняты: хост отклонит имя сам
        .unwrap_or_else(|| format!("{base}.{MAX_NAME_SUFFIX:03}"))
}

fn rejected(object: &str, error: HostError) -> ImportError {
    ImportError::HostRejected {
        object: object.to_owned(),
        reason: error.reason,
    }
}
