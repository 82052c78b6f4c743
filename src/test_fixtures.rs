//! Небольшая карта для модульных тестов: треугольник и четырёхугольник на холсте 10×10

use serde_json::{Value, json};

use crate::document::MapDocument;

pub(crate) fn sample_json() -> Value {
    json!({
        "info": {
            "version": "1.99.05",
            "mapName": "Test Map",
            "width": 10,
            "height": 10,
            "seed": "42"
        },
        "pack": {
            "vertices": [
                { "p": [0, 0] },
                { "p": [4, 0] },
                { "p": [0, 4] },
                { "p": [4, 4] },
                { "p": [8, 0] },
                { "p": [8, 4] }
            ],
            "cells": [
                { "i": 0, "v": [0, 2, 1], "c": [1], "p": [1.5, 1.5], "h": 30, "biome": 4 },
                { "i": 1, "v": [1, 3, 5, 4], "c": [0], "p": [6, 2], "h": 10, "biome": 0 }
            ],
            "rivers": [
                {
                    "i": 1,
                    "name": "Silverrun",
                    "cells": [0, 1, -1],
                    "points": [[1, 1], [3, 2], [6, 2]],
                    "width": 0.8,
                    "widthFactor": 1,
                    "sourceWidth": 0.2
                }
            ],
            "routes": [
                { "i": 0, "group": "roads", "feature": 1, "points": [[1.5, 1.5, 0], [6, 2, 1]] }
            ],
            "burgs": [
                {},
                { "i": 1, "name": "Oakford", "x": 1.5, "y": 1.5, "cell": 0, "population": 2.4, "capital": 1, "port": 0 }
            ]
        },
        "biomesData": {
            "i": [0, 1, 2, 3, 4],
            "name": ["Marine", "Hot desert", "Cold desert", "Savanna", "Grassland"],
            "color": ["#466eab", "#fbe79f", "#b5b887", "#d2d082", "#c8d68f"]
        }
    })
}

pub(crate) fn sample_map() -> MapDocument {
    MapDocument::from_slice(sample_json().to_string().as_bytes(), "sample.json")
        .expect("sample map is valid")
}
