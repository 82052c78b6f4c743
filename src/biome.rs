use std::collections::BTreeMap;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use crate::document::BiomesData;
use crate::error::ImportError;

/// Идентификатор биома в экспорте генератора (индекс в `biomesData`)
pub type BiomeId = u16;

/// Морской биом: им окрашивается плоскость океана
pub const MARINE: BiomeId = 0;

/// Цвет RGBA, компоненты от 0.0 до 1.0
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba(pub [f32; 4]);

impl Rgba {
    /// Разбирает `#rrggbb` или `#rrggbbaa`. Без альфа-канала цвет непрозрачный.
    ///
    /// # Примеры
    /// ```
    /// use mapimport::biome::Rgba;
    /// assert_eq!(Rgba::from_hex("#ff0000"), Some(Rgba([1.0, 0.0, 0.0, 1.0])));
    /// assert_eq!(Rgba::from_hex("ff000000"), Some(Rgba([1.0, 0.0, 0.0, 0.0])));
    /// assert_eq!(Rgba::from_hex("#ff00"), None);
    /// ```
    #[must_use]
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.trim().trim_start_matches('#');
        if !digits.is_ascii() || !(digits.len() == 6 || digits.len() == 8) {
            return None;
        }

        let mut rgba = [1.0; 4];
        for (i, channel) in rgba.iter_mut().enumerate().take(digits.len() / 2) {
            let byte = u8::from_str_radix(&digits[i * 2..i * 2 + 2], 16).ok()?;
            *channel = f32::from(byte) / 255.0;
        }
        Some(Self(rgba))
    }

    #[must_use]
    pub fn to_rgba8(self) -> [u8; 4] {
        self.0.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BiomeEntry {
    pub name: String,
    pub color: Rgba,
}

/// Таблица биомов: идентификатор → имя и цвет
///
/// Встроенная таблица создаётся один раз на процесс и больше не меняется,
/// поэтому её можно разделять между импортами без синхронизации.
#[derive(Debug, Clone, Default)]
pub struct BiomeTable {
    entries: BTreeMap<BiomeId, BiomeEntry>,
}

/// Биомы генератора по умолчанию
const DEFAULT_BIOMES: [(&str, &str); 13] = [
    ("Marine", "#466eab"),
    ("Hot desert", "#fbe79f"),
    ("Cold desert", "#b5b887"),
    ("Savanna", "#d2d082"),
    ("Grassland", "#c8d68f"),
    ("Tropical seasonal forest", "#b6d95d"),
    ("Temperate deciduous forest", "#29bc56"),
    ("Tropical rainforest", "#7dcb35"),
    ("Temperate rainforest", "#409c43"),
    ("Taiga", "#4b6b32"),
    ("Tundra", "#96784b"),
    ("Glacier", "#d5e7eb"),
    ("Wetland", "#0b9131"),
];

static BUILTIN: LazyLock<BiomeTable> = LazyLock::new(|| {
    let entries = DEFAULT_BIOMES
        .iter()
        .zip(0..)
        .filter_map(|(&(name, hex), id)| {
            Rgba::from_hex(hex).map(|color| {
                (
                    id,
                    BiomeEntry {
                        name: name.to_owned(),
                        color,
                    },
                )
            })
        })
        .collect();
    BiomeTable { entries }
});

impl BiomeTable {
    /// Встроенная таблица из 13 биомов генератора
    #[must_use]
    pub fn builtin() -> &'static BiomeTable {
        &BUILTIN
    }

    /// Строит таблицу из блока `biomesData` самого файла.
    ///
    /// Цвет с неверной hex-записью делает весь документ некорректным.
    pub fn from_document(data: &BiomesData, origin: &str) -> Result<Self, ImportError> {
        let mut entries = BTreeMap::new();
        for (index, hex) in data.color.iter().enumerate() {
            let id = BiomeId::try_from(index).map_err(|_| {
                ImportError::malformed(origin, format!("too many biomes ({})", data.color.len()))
            })?;
            let color = Rgba::from_hex(hex).ok_or_else(|| {
                ImportError::malformed(origin, format!("biome {id} has invalid color `{hex}`"))
            })?;
            let name = data
                .name
                .get(index)
                .cloned()
                .unwrap_or_else(|| format!("Biome {id}"));
            entries.insert(id, BiomeEntry { name, color });
        }
        Ok(Self { entries })
    }

    #[must_use]
    pub fn get(&self, id: BiomeId) -> Option<&BiomeEntry> {
        self.entries.get(&id)
    }

    #[must_use]
    pub fn color(&self, id: BiomeId) -> Option<Rgba> {
        self.get(id).map(|entry| entry.color)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
