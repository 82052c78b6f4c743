// src/host/png.rs
//! Превью сцены в PNG
//!
//! Рисует вид сверху на видимые объекты [`SceneGraph`]:
//! - грани сеток заливаются цветом первой вершины из слоя цветов
//! - кривые рисуются отрезками между контрольными точками, цветом однотонного материала,
//!   если он назначен
//!
//! ## Порядок отрисовки
//!
//! Грани всех сеток сортируются по средней высоте и рисуются снизу вверх,
//! поэтому плоскость океана закрывает ячейки ниже уровня моря, но не сушу.
//! Кривые рисуются последними поверх всех граней.
//!
//! ## Пример использования
//! ```rust,ignore
//! let mut scene = SceneGraph::new();
//! MapImport::new(&options).run(&mut scene, path)?;
//! render_preview(&scene, "preview.png", 4.0)?;
//! ```

use image::{Rgba as Pixel, RgbaImage};
use imageproc::drawing::{draw_line_segment_mut, draw_polygon_mut};
use imageproc::point::Point;

use crate::host::memory::{ObjectData, SceneGraph};

/// Предельный размер стороны превью в пикселях
pub const MAX_PREVIEW_SIZE: u32 = 4096;

const BACKGROUND: Pixel<u8> = Pixel([0, 0, 0, 0]);
const CURVE_COLOR: Pixel<u8> = Pixel([30, 60, 200, 255]);
const DEFAULT_FACE_COLOR: Pixel<u8> = Pixel([128, 128, 128, 255]);

/// Прямоугольник видимых объектов в плоскости XY
#[derive(Debug, Clone, Copy, PartialEq)]
struct Bounds {
    min: [f32; 2],
    max: [f32; 2],
}

impl Bounds {
    fn of(scene: &SceneGraph) -> Option<Self> {
        let mut bounds: Option<Self> = None;
        for object in scene.linked_objects().filter(|o| o.visible) {
            let points = match &object.data {
                ObjectData::Mesh(mesh) => &mesh.vertices,
                ObjectData::Curve(curve) => &curve.points,
            };
            for p in points {
                let b = bounds.get_or_insert(Self {
                    min: [p[0], p[1]],
                    max: [p[0], p[1]],
                });
                b.min = [b.min[0].min(p[0]), b.min[1].min(p[1])];
                b.max = [b.max[0].max(p[0]), b.max[1].max(p[1])];
            }
        }
        bounds
    }
}

/// Отображение координат сцены в пиксели (ось y изображения направлена вниз)
struct Raster {
    bounds: Bounds,
    scale: f32,
}

impl Raster {
    fn pixel(&self, p: [f32; 3]) -> (f32, f32) {
        (
            (p[0] - self.bounds.min[0]) * self.scale,
            (self.bounds.max[1] - p[1]) * self.scale,
        )
    }
}

/// Рисует вид сверху на сцену
///
/// # Аргументы
/// * `scene` - сцена после импорта
/// * `pixels_per_unit` - масштаб: пикселей на единицу координат сцены
///
/// Размер изображения ограничен `MAX_PREVIEW_SIZE` по большей стороне.
pub fn render_image(scene: &SceneGraph, pixels_per_unit: f32) -> Result<RgbaImage, Box<dyn std::error::Error>> {
    if !(pixels_per_unit.is_finite() && pixels_per_unit > 0.0) {
        return Err(format!("invalid preview scale {pixels_per_unit}").into());
    }
    let bounds = Bounds::of(scene).ok_or("Scene has no visible objects")?;

    let extent = (bounds.max[0] - bounds.min[0]).max(bounds.max[1] - bounds.min[1]);
    let scale = if extent * pixels_per_unit > MAX_PREVIEW_SIZE as f32 {
        MAX_PREVIEW_SIZE as f32 / extent
    } else {
        pixels_per_unit
    };
    let width = (((bounds.max[0] - bounds.min[0]) * scale).ceil() as u32 + 1).min(MAX_PREVIEW_SIZE);
    let height = (((bounds.max[1] - bounds.min[1]) * scale).ceil() as u32 + 1).min(MAX_PREVIEW_SIZE);

    let raster = Raster { bounds, scale };
    let mut img = RgbaImage::from_pixel(width, height, BACKGROUND);

    let mut faces: Vec<(f32, Vec<Point<i32>>, Pixel<u8>)> = Vec::new();
    for object in scene.linked_objects().filter(|o| o.visible) {
        let ObjectData::Mesh(mesh) = &object.data else {
            continue;
        };
        for face in &mesh.faces {
            let color = mesh
                .color_layer
                .as_ref()
                .and_then(|layer| face.first().map(|&v| layer.colors[v as usize]))
                .map_or(DEFAULT_FACE_COLOR, |c| Pixel(c.to_rgba8()));
            let depth = face
                .iter()
                .map(|&v| mesh.vertices[v as usize][2])
                .sum::<f32>()
                / face.len() as f32;
            let polygon = polygon_points(face.iter().map(|&v| raster.pixel(mesh.vertices[v as usize])));
            if polygon.len() >= 3 {
                faces.push((depth, polygon, color));
            }
        }
    }

    faces.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
    for (_, polygon, color) in &faces {
        draw_polygon_mut(&mut img, polygon, *color);
    }

    for object in scene.linked_objects().filter(|o| o.visible) {
        if let ObjectData::Curve(curve) = &object.data {
            let color = object
                .material
                .and_then(|id| scene.material(id))
                .filter(|m| m.color_layer.is_none())
                .map_or(CURVE_COLOR, |m| Pixel(m.base_color.to_rgba8()));
            for pair in curve.points.windows(2) {
                draw_line_segment_mut(&mut img, raster.pixel(pair[0]), raster.pixel(pair[1]), color);
            }
        }
    }

    Ok(img)
}

/// Рисует превью и сохраняет его в PNG
pub fn render_preview(
    scene: &SceneGraph,
    path: &str,
    pixels_per_unit: f32,
) -> Result<(), Box<dyn std::error::Error>> {
    let img = render_image(scene, pixels_per_unit)?;
    img.save(path)?;
    tracing::info!("Превью {}×{} сохранено в {}", img.width(), img.height(), path);
    Ok(())
}

/// Округляет вершины до пикселей, убирая совпадающие соседние точки
/// (`draw_polygon_mut` не принимает замкнутые кольца)
fn polygon_points(points: impl Iterator<Item = (f32, f32)>) -> Vec<Point<i32>> {
    let mut polygon: Vec<Point<i32>> = points
        .map(|(x, y)| Point::new(x.round() as i32, y.round() as i32))
        .collect();
    polygon.dedup();
    while polygon.len() > 1 && polygon.first() == polygon.last() {
        polygon.pop();
    }
    polygon
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ImportOptions;
    use crate::import::MapImport;
    use crate::test_fixtures::sample_json;

    fn imported_scene() -> SceneGraph {
        let mut scene = SceneGraph::new();
        let options = ImportOptions {
            ocean_height: 20.0,
            vertical_scale: 0.1,
            ..ImportOptions::default()
        };
        MapImport::new(&options)
            .run_bytes(&mut scene, sample_json().to_string().as_bytes(), "sample.json")
            .unwrap();
        scene
    }

    #[test]
    fn renders_scene_bounds() {
        let img = render_image(&imported_scene(), 2.0).unwrap();
        assert_eq!(img.dimensions(), (21, 21));
        // Северо-западный угол покрыт треугольником суши (цвет Grassland)
        assert_eq!(img.get_pixel(1, 1).0, [0xc8, 0xd6, 0x8f, 0xff]);
        // Юго-восточный угол: только океан
        assert_eq!(img.get_pixel(19, 19).0, [0x46, 0x6e, 0xab, 0xff]);
        // Исток реки: цвет материала River
        assert_eq!(img.get_pixel(2, 2).0, [0x46, 0x6e, 0xab, 0xff]);
    }

    #[test]
    fn empty_scene_has_no_preview() {
        assert!(render_image(&SceneGraph::new(), 1.0).is_err());
    }

    #[test]
    fn polygon_drops_closing_duplicates() {
        let polygon = polygon_points([(0.0, 0.0), (0.2, 0.1), (3.0, 0.0), (3.0, 3.0), (0.1, 0.0)].into_iter());
        assert_eq!(polygon, vec![Point::new(0, 0), Point::new(3, 0), Point::new(3, 3)]);
    }
}
