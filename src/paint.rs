use crate::biome::{BiomeId, BiomeTable, MARINE, Rgba};
use crate::document::Cell;
use crate::error::ImportError;
use crate::geometry::{ColorLayer, MeshGeometry};

pub const TERRAIN_COLOR_LAYER: &str = "Biomes";
pub const OCEAN_COLOR_LAYER: &str = "Ocean";
/// Общий материал всех кривых рек
pub const RIVER_MATERIAL: &str = "River";

/// Материал предпросмотра
///
/// Со слоем цветов вершин базовый цвет берётся из слоя, и материал подходит только
/// сетке с таким слоем. Без слоя материал однотонный и подходит и сеткам, и кривым.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialSpec {
    pub name: String,
    pub color_layer: Option<String>,
    pub base_color: Rgba,
}

impl MaterialSpec {
    fn for_layer(layer: &str) -> Self {
        Self {
            name: layer.to_owned(),
            color_layer: Some(layer.to_owned()),
            base_color: Rgba([1.0; 4]),
        }
    }

    #[must_use]
    pub fn flat(name: &str, color: Rgba) -> Self {
        Self {
            name: name.to_owned(),
            color_layer: None,
            base_color: color,
        }
    }
}

/// Окрашивает каждую вершину грани цветом биома её ячейки
///
/// Грани сетки соответствуют ячейкам один к одному и в том же порядке.
/// Неизвестный биом — ошибка, а не цвет по умолчанию. Это относится и к идентификаторам,
/// которые вообще не помещаются в [`BiomeId`].
pub fn paint_terrain(
    mesh: &mut MeshGeometry,
    cells: &[Cell],
    table: &BiomeTable,
) -> Result<MaterialSpec, ImportError> {
    debug_assert_eq!(mesh.faces.len(), cells.len());

    let mut colors = vec![Rgba([0.0, 0.0, 0.0, 1.0]); mesh.vertices.len()];
    for (index, (face, cell)) in mesh.faces.iter().zip(cells).enumerate() {
        let color = BiomeId::try_from(cell.biome)
            .ok()
            .and_then(|id| table.color(id))
            .ok_or(ImportError::UnknownBiome {
                biome: cell.biome,
                cell: index,
            })?;
        for &v in face {
            colors[v as usize] = color;
        }
    }

    mesh.color_layer = Some(ColorLayer {
        name: TERRAIN_COLOR_LAYER.to_owned(),
        colors,
    });
    Ok(MaterialSpec::for_layer(TERRAIN_COLOR_LAYER))
}

/// Окрашивает плоскость океана цветом морского биома
pub fn paint_ocean(mesh: &mut MeshGeometry, table: &BiomeTable) -> Result<MaterialSpec, ImportError> {
    let color = marine(table)?;
    mesh.color_layer = Some(ColorLayer {
        name: OCEAN_COLOR_LAYER.to_owned(),
        colors: vec![color; mesh.vertices.len()],
    });
    Ok(MaterialSpec::for_layer(OCEAN_COLOR_LAYER))
}

/// Однотонный материал рек цвета морского биома
pub fn river_material(table: &BiomeTable) -> Result<MaterialSpec, ImportError> {
    Ok(MaterialSpec::flat(RIVER_MATERIAL, marine(table)?))
}

fn marine(table: &BiomeTable) -> Result<Rgba, ImportError> {
    table.color(MARINE).ok_or(ImportError::UnknownBiome {
        biome: i64::from(MARINE),
        cell: 0,
    })
}
