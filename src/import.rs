// src/import.rs
//! Конвейер импорта карты
//!
//! Импорт — линейный автомат состояний:
//! `Idle → Reading → Parsing → Building → Painting → Inserting → Done`.
//! Ошибка на любом шаге переводит его в `Failed`, откатывает уже вставленное
//! и сообщает шаг и причину. Повторов нет, отмены нет: импорт выполняется
//! синхронно и целиком в вызывающем потоке.

use std::fmt;
use std::path::Path;

use thiserror::Error;

use crate::biome::BiomeTable;
use crate::config::{BiomePalette, ImportOptions};
use crate::document::{MapDocument, read_document};
use crate::error::ImportError;
use crate::geometry::{MeshGeometry, build_ocean, build_terrain, submerged_cells};
use crate::host::{CollectionId, Host, MaterialId};
use crate::paint::{MaterialSpec, paint_ocean, paint_terrain, river_material};
use crate::paths::{PathObject, RiverCurves, RouteCurves, build_rivers, build_routes};
use crate::scene::Insertion;

pub const TERRAIN_NAME: &str = "Terrain";
pub const OCEAN_NAME: &str = "Ocean";
pub const RIVERS_COLLECTION: &str = "Rivers";
pub const ROUTES_COLLECTION: &str = "Routes";

/// Шаг импорта
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportStage {
    Idle,
    Reading,
    Parsing,
    Building,
    Painting,
    Inserting,
    Done,
    Failed,
}

impl fmt::Display for ImportStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ImportStage::Idle => "idle",
            ImportStage::Reading => "reading",
            ImportStage::Parsing => "parsing",
            ImportStage::Building => "building",
            ImportStage::Painting => "painting",
            ImportStage::Inserting => "inserting",
            ImportStage::Done => "done",
            ImportStage::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Неудавшийся импорт: шаг, на котором он прервался, и причина
#[derive(Debug, Error)]
#[error("import failed during {stage}: {error}")]
pub struct ImportFailure {
    pub stage: ImportStage,
    #[source]
    pub error: ImportError,
}

/// Итог успешного импорта
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportReport {
    pub map_name: String,
    /// Имя созданной коллекции карты
    pub collection: String,
    pub terrain: String,
    pub ocean: String,
    pub rivers: Vec<String>,
    pub routes: Vec<String>,
    pub terrain_faces: usize,
    pub terrain_vertices: usize,
    pub submerged_cells: usize,
    pub skipped_rivers: usize,
    pub skipped_routes: usize,
    pub route_discontinuities: usize,
    pub burgs: usize,
}

/// Геометрия, собранная до вставки в сцену
struct Built {
    terrain: MeshGeometry,
    ocean: MeshGeometry,
    rivers: RiverCurves,
    routes: RouteCurves,
}

struct Painted {
    terrain: MaterialSpec,
    ocean: MaterialSpec,
    rivers: MaterialSpec,
}

/// Один запуск импорта
pub struct MapImport<'o> {
    options: &'o ImportOptions,
    stage: ImportStage,
}

impl<'o> MapImport<'o> {
    #[must_use]
    pub fn new(options: &'o ImportOptions) -> Self {
        Self {
            options,
            stage: ImportStage::Idle,
        }
    }

    #[must_use]
    pub fn stage(&self) -> ImportStage {
        self.stage
    }

    /// Импортирует файл карты в сцену хоста
    pub fn run<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        path: &Path,
    ) -> Result<ImportReport, ImportFailure> {
        self.check_options()?;
        self.advance(ImportStage::Reading);
        let bytes = read_document(path).map_err(|e| self.fail(e))?;
        self.import(host, &bytes, &path.display().to_string())
    }

    /// Импортирует уже прочитанное содержимое файла
    pub fn run_bytes<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        bytes: &[u8],
        origin: &str,
    ) -> Result<ImportReport, ImportFailure> {
        self.check_options()?;
        self.advance(ImportStage::Reading);
        self.import(host, bytes, origin)
    }

    fn import<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        bytes: &[u8],
        origin: &str,
    ) -> Result<ImportReport, ImportFailure> {
        self.advance(ImportStage::Parsing);
        let document = MapDocument::from_slice(bytes, origin).map_err(|e| self.fail(e))?;
        let document_table;
        let table = match self.options.palette {
            BiomePalette::Builtin => BiomeTable::builtin(),
            BiomePalette::Document => {
                let data = document.biomes_data.as_ref().ok_or_else(|| {
                    self.fail(ImportError::malformed(origin, "missing `biomesData` for document palette"))
                })?;
                document_table = BiomeTable::from_document(data, origin).map_err(|e| self.fail(e))?;
                &document_table
            }
        };
        tracing::info!(
            "Карта «{}»: {} ячеек, {} рек, {} маршрутов, {} поселений",
            document.map_name(),
            document.pack.cells.len(),
            document.pack.rivers.len(),
            document.pack.routes.len(),
            document.burgs().count()
        );

        self.advance(ImportStage::Building);
        let mut built = Built {
            terrain: build_terrain(&document, self.options),
            ocean: build_ocean(&document, self.options),
            rivers: build_rivers(&document),
            routes: build_routes(&document, self.options),
        };

        self.advance(ImportStage::Painting);
        let painted = Painted {
            terrain: paint_terrain(&mut built.terrain, &document.pack.cells, table)
                .map_err(|e| self.fail(e))?,
            ocean: paint_ocean(&mut built.ocean, table).map_err(|e| self.fail(e))?,
            rivers: river_material(table).map_err(|e| self.fail(e))?,
        };

        self.advance(ImportStage::Inserting);
        let report = insert(host, &document, &built, &painted).map_err(|e| self.fail(e))?;

        self.advance(ImportStage::Done);
        tracing::info!(
            "Импорт завершён: коллекция {}, {} рек, {} маршрутов",
            report.collection,
            report.rivers.len(),
            report.routes.len()
        );
        Ok(report)
    }

    fn check_options(&mut self) -> Result<(), ImportFailure> {
        self.options.validate().map_err(|e| self.fail(e))
    }

    fn advance(&mut self, next: ImportStage) {
        tracing::debug!("{} → {}", self.stage, next);
        self.stage = next;
    }

    /// Переводит импорт в `Failed`, запоминая шаг, на котором произошла ошибка
    fn fail(&mut self, error: ImportError) -> ImportFailure {
        let stage = self.stage;
        self.stage = ImportStage::Failed;
        tracing::error!("Импорт прерван на шаге {stage}: {error}");
        ImportFailure { stage, error }
    }
}

/// Вставляет всё построенное в одной транзакции; при ошибке транзакция откатывается
fn insert<H: Host + ?Sized>(
    host: &mut H,
    document: &MapDocument,
    built: &Built,
    painted: &Painted,
) -> Result<ImportReport, ImportError> {
    let mut insertion = Insertion::new(host);

    let collection_name = insertion.unique_collection_name(document.map_name());
    let root = insertion.collection(&collection_name, None)?;

    let ocean = insertion.insert_mesh(OCEAN_NAME, &built.ocean, Some(&painted.ocean), root)?;
    let terrain = insertion.insert_mesh(TERRAIN_NAME, &built.terrain, Some(&painted.terrain), root)?;

    let rivers_collection = insertion.collection(RIVERS_COLLECTION, Some(root))?;
    let river_material = if built.rivers.curves.is_empty() {
        None
    } else {
        Some(insertion.material(&painted.rivers)?)
    };
    let rivers = insert_paths(
        &mut insertion,
        "River",
        &built.rivers.curves,
        river_material,
        rivers_collection,
    )?;

    let routes_collection = insertion.collection(ROUTES_COLLECTION, Some(root))?;
    let routes = insert_paths(&mut insertion, "Route", &built.routes.curves, None, routes_collection)?;

    insertion.commit();

    Ok(ImportReport {
        map_name: document.map_name().to_owned(),
        collection: collection_name,
        terrain,
        ocean,
        rivers,
        routes,
        terrain_faces: built.terrain.faces.len(),
        terrain_vertices: built.terrain.vertices.len(),
        submerged_cells: submerged_cells(document),
        skipped_rivers: built.rivers.skipped,
        skipped_routes: built.routes.skipped,
        route_discontinuities: built.routes.discontinuities,
        burgs: document.burgs().count(),
    })
}

/// Кривые получают имена `<prefix>_<n>`, где `n` — позиция записи в экспорте
fn insert_paths<H: Host + ?Sized>(
    insertion: &mut Insertion<'_, H>,
    prefix: &str,
    paths: &[PathObject],
    material: Option<MaterialId>,
    collection: CollectionId,
) -> Result<Vec<String>, ImportError> {
    paths
        .iter()
        .map(|path| {
            insertion.insert_curve(
                &format!("{prefix}_{}", path.index),
                &path.curve,
                material,
                path.hidden,
                collection,
            )
        })
        .collect()
}
