// src/geometry.rs
//! Построение геометрии рельефа и океана
//!
//! Каждая ячейка карты становится одной гранью сетки, без сглаживания и прореживания.
//! Вершины граней не разделяются между ячейками: у каждой грани свои копии вершин
//! на высоте своей ячейки, поэтому цвет биома и высота остаются постоянными в пределах ячейки.

use crate::biome::Rgba;
use crate::config::ImportOptions;
use crate::document::MapDocument;

/// Порог генератора между водой и сушей (высоты ниже — под водой)
pub const SEA_LEVEL: f32 = 20.0;

/// Слой цветов вершин
#[derive(Debug, Clone, PartialEq)]
pub struct ColorLayer {
    pub name: String,
    /// Цвет для каждой вершины сетки, в порядке `MeshGeometry::vertices`
    pub colors: Vec<Rgba>,
}

/// Полигональная сетка, готовая к передаче хосту
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshGeometry {
    pub vertices: Vec<[f32; 3]>,
    /// Грани как списки индексов вершин, против часовой стрелки при взгляде сверху
    pub faces: Vec<Vec<u32>>,
    pub color_layer: Option<ColorLayer>,
}

impl MeshGeometry {
    #[must_use]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Вершины одной грани
    pub fn face_vertices(&self, face: usize) -> impl Iterator<Item = [f32; 3]> + '_ {
        self.faces
            .get(face)
            .into_iter()
            .flatten()
            .map(|&v| self.vertices[v as usize])
    }
}

/// Система координат карты в горизонтальной плоскости сцены
///
/// Исходные координаты отсчитываются от левого верхнего угла с осью y вниз.
/// В сцене центр карты — начало координат, ось y направлена вверх (на север).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapFrame {
    pub width: f32,
    pub height: f32,
}

impl MapFrame {
    #[must_use]
    pub fn of(document: &MapDocument) -> Self {
        Self {
            width: document.info.width,
            height: document.info.height,
        }
    }

    #[must_use]
    pub fn to_world(&self, [x, y]: [f32; 2], z: f32) -> [f32; 3] {
        [x - self.width / 2.0, self.height / 2.0 - y, z]
    }

    /// Углы карты против часовой стрелки, начиная с юго-западного
    #[must_use]
    pub fn corners(&self, z: f32) -> [[f32; 3]; 4] {
        let (hw, hh) = (self.width / 2.0, self.height / 2.0);
        [[-hw, -hh, z], [hw, -hh, z], [hw, hh, z], [-hw, hh, z]]
    }
}

/// Строит сетку рельефа: одна грань на ячейку, `z = h * vertical_scale`
///
/// Ячейки ниже уровня моря не отбрасываются — воду изображает отдельная плоскость океана.
#[must_use]
pub fn build_terrain(document: &MapDocument, options: &ImportOptions) -> MeshGeometry {
    let frame = MapFrame::of(document);
    let cells = &document.pack.cells;
    let corner_total: usize = cells.iter().map(|c| c.vertices.len()).sum();

    let mut mesh = MeshGeometry {
        vertices: Vec::with_capacity(corner_total),
        faces: Vec::with_capacity(cells.len()),
        color_layer: None,
    };

    for cell in cells {
        let z = cell.height * options.vertical_scale;
        let mut ring: Vec<[f32; 3]> = cell
            .vertices
            .iter()
            .map(|&v| frame.to_world(document.pack.vertices[v].position, z))
            .collect();

        // Переход к оси y вверх меняет ориентацию, поэтому направление проверяем уже в сцене
        if signed_area(&ring) < 0.0 {
            ring.reverse();
        }

        let first = mesh.vertices.len() as u32;
        mesh.faces
            .push((first..first + ring.len() as u32).collect());
        mesh.vertices.extend(ring);
    }

    tracing::debug!(
        "Рельеф: {} граней, {} вершин",
        mesh.faces.len(),
        mesh.vertices.len()
    );
    mesh
}

/// Плоскость океана по прямоугольнику карты на высоте `ocean_height * vertical_scale`
#[must_use]
pub fn build_ocean(document: &MapDocument, options: &ImportOptions) -> MeshGeometry {
    let z = options.ocean_height * options.vertical_scale;
    MeshGeometry {
        vertices: MapFrame::of(document).corners(z).to_vec(),
        faces: vec![vec![0, 1, 2, 3]],
        color_layer: None,
    }
}

/// Удвоенная ориентированная площадь многоугольника в плоскости XY
/// (положительная — против часовой стрелки)
#[must_use]
pub fn signed_area(ring: &[[f32; 3]]) -> f32 {
    ring.iter()
        .zip(ring.iter().cycle().skip(1))
        .map(|(a, b)| a[0] * b[1] - b[0] * a[1])
        .sum()
}

/// Количество ячеек ниже уровня моря
#[must_use]
pub fn submerged_cells(document: &MapDocument) -> usize {
    document
        .pack
        .cells
        .iter()
        .filter(|c| c.height < SEA_LEVEL)
        .count()
}
