// src/paths.rs
//! Кривые рек и маршрутов
//!
//! Каждая река и каждый маршрут становятся отдельной плоской кривой в системе координат рельефа.
//! Кривые лежат в плоскости z = 0 и помечены для проецирования на рельеф средствами хоста.
//!
//! Маршруты в экспорте генератора бывают разорваны (соседние точки в несмежных ячейках).
//! Такие разрывы не исправляются: маршруты создаются скрытыми, а число разрывов попадает в лог.
//!
//! Реки и маршруты, из которых не получается хотя бы двух точек, пропускаются с предупреждением.
//! Кривая помнит позицию своей записи в экспорте, поэтому пропуск не сдвигает номера остальных.

use crate::config::ImportOptions;
use crate::document::{MapDocument, PathPoint, RouteKind};
use crate::geometry::MapFrame;
use crate::graph::{build_cell_graph, find_discontinuities};

/// Толщина профиля кривой
pub const BEVEL_DEPTH: f32 = 0.1;
/// Число сегментов между контрольными точками
pub const CURVE_RESOLUTION: u32 = 12;
/// Зазор между кривой и поверхностью рельефа при проецировании
pub const SURFACE_OFFSET: f32 = 0.01;

#[derive(Debug, Clone, PartialEq)]
pub struct CurveGeometry {
    /// Контрольные точки в порядке источника
    pub points: Vec<[f32; 3]>,
    pub bevel_depth: f32,
    pub resolution: u32,
    /// Хост проецирует кривую на рельеф с зазором `SURFACE_OFFSET`
    pub conform_to_terrain: bool,
}

impl CurveGeometry {
    fn flat(points: Vec<[f32; 3]>) -> Self {
        Self {
            points,
            bevel_depth: BEVEL_DEPTH,
            resolution: CURVE_RESOLUTION,
            conform_to_terrain: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    River,
    Route(RouteKind),
}

/// Кривая вместе с признаками исходной записи
#[derive(Debug, Clone, PartialEq)]
pub struct PathObject {
    pub kind: PathKind,
    /// Позиция записи в массиве экспорта
    pub index: usize,
    /// Идентификатор записи в экспорте (`i`)
    pub source_id: u32,
    pub label: String,
    pub curve: CurveGeometry,
    pub hidden: bool,
}

#[derive(Debug, Clone, Default)]
pub struct RiverCurves {
    pub curves: Vec<PathObject>,
    /// Реки, из которых не удалось получить хотя бы две точки
    pub skipped: usize,
}

#[derive(Debug, Clone, Default)]
pub struct RouteCurves {
    pub curves: Vec<PathObject>,
    /// Маршруты короче двух точек
    pub skipped: usize,
    /// Общее число разрывов во всех маршрутах
    pub discontinuities: usize,
}

/// Строит кривые рек
///
/// Если в записи есть явные точки, используются они; иначе русло проходит
/// через центры ячеек `cells` (без `-1` и без повторов подряд).
#[must_use]
pub fn build_rivers(document: &MapDocument) -> RiverCurves {
    let frame = MapFrame::of(document);
    let cells = &document.pack.cells;
    let mut result = RiverCurves::default();

    for (index, river) in document.pack.rivers.iter().enumerate() {
        let mut course: Vec<[f32; 2]> = if river.points.is_empty() {
            river
                .cells
                .iter()
                .filter_map(|&c| usize::try_from(c).ok())
                .map(|c| cells[c].center)
                .collect()
        } else {
            river.points.iter().map(|p| [p.x, p.y]).collect()
        };
        course.dedup();

        if course.len() < 2 {
            tracing::warn!(
                "Река {} ({:?}) пропущена: всего {} точек",
                river.i,
                river.name,
                course.len()
            );
            result.skipped += 1;
            continue;
        }

        result.curves.push(PathObject {
            kind: PathKind::River,
            index,
            source_id: river.i,
            label: river.name.clone(),
            curve: CurveGeometry::flat(course.into_iter().map(|p| frame.to_world(p, 0.0)).collect()),
            hidden: false,
        });
    }

    result
}

/// Строит кривые маршрутов; по умолчанию они скрыты (`show_routes = false`)
#[must_use]
pub fn build_routes(document: &MapDocument, options: &ImportOptions) -> RouteCurves {
    let frame = MapFrame::of(document);
    let graph = build_cell_graph(&document.pack.cells);
    let mut result = RouteCurves::default();

    for (index, route) in document.pack.routes.iter().enumerate() {
        if route.points.len() < 2 {
            tracing::warn!(
                "Маршрут {} ({:?}) пропущен: всего {} точек",
                route.i,
                route.kind,
                route.points.len()
            );
            result.skipped += 1;
            continue;
        }

        let gaps = find_discontinuities(&route.points, &graph);
        if !gaps.is_empty() {
            tracing::warn!(
                "Маршрут {} ({:?}) разорван в точках {:?}",
                route.i,
                route.kind,
                gaps
            );
            result.discontinuities += gaps.len();
        }

        result.curves.push(PathObject {
            kind: PathKind::Route(route.kind),
            index,
            source_id: route.i,
            label: route.name.clone(),
            curve: CurveGeometry::flat(route_points(&route.points, frame)),
            hidden: !options.show_routes,
        });
    }

    result
}

fn route_points(points: &[PathPoint], frame: MapFrame) -> Vec<[f32; 3]> {
    points.iter().map(|p| frame.to_world([p.x, p.y], 0.0)).collect()
}
