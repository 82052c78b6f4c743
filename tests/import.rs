use std::path::PathBuf;

use mapimport::biome::BiomeTable;
use mapimport::host::Host;
use mapimport::host::memory::{ObjectData, SceneGraph, SceneObject};
use mapimport::{ImportError, ImportOptions, ImportStage, MapImport};
use serde_json::{Value, json};
use tempfile::TempDir;

/// Два полигона (треугольник и четырёхугольник), одна река из 3 точек, один маршрут из 2 точек
fn two_cell_map() -> Value {
    json!({
        "info": { "version": "1.105.2", "mapName": "Twin Isles", "width": 10, "height": 10 },
        "pack": {
            "vertices": [
                { "p": [0, 0] }, { "p": [4, 0] }, { "p": [0, 4] },
                { "p": [4, 4] }, { "p": [8, 0] }, { "p": [8, 4] }
            ],
            "cells": [
                { "v": [0, 2, 1], "c": [1], "p": [1.5, 1.5], "h": 40, "biome": 6 },
                { "v": [1, 3, 5, 4], "c": [0], "p": [6, 2], "h": 25, "biome": 9 }
            ],
            "rivers": [
                { "i": 1, "name": "Mere", "cells": [0, 1, -1], "points": [[1, 1], [3, 2], [6, 2]] }
            ],
            "routes": [
                { "i": 0, "group": "trails", "points": [[1.5, 1.5, 0], [6, 2, 1]] }
            ],
            "burgs": [{}]
        }
    })
}

fn write_map(value: &Value) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("twin-isles.json");
    std::fs::write(&path, value.to_string()).unwrap();
    (dir, path)
}

fn flat_options() -> ImportOptions {
    ImportOptions {
        ocean_height: 0.0,
        vertical_scale: 1.0,
        ..ImportOptions::default()
    }
}

fn mesh<'a>(scene: &'a SceneGraph, name: &str) -> &'a mapimport::geometry::MeshGeometry {
    match &scene.object_by_name(name).unwrap().data {
        ObjectData::Mesh(mesh) => mesh,
        ObjectData::Curve(_) => panic!("{name} is a curve"),
    }
}

fn curve<'a>(scene: &'a SceneGraph, name: &str) -> (&'a SceneObject, &'a mapimport::paths::CurveGeometry) {
    let object = scene.object_by_name(name).unwrap();
    match &object.data {
        ObjectData::Curve(curve) => (object, curve),
        ObjectData::Mesh(_) => panic!("{name} is a mesh"),
    }
}

#[test]
fn two_cell_round_trip() {
    let (_dir, path) = write_map(&two_cell_map());
    let mut scene = SceneGraph::new();
    let report = MapImport::new(&flat_options()).run(&mut scene, &path).unwrap();

    assert_eq!(report.collection, "Twin Isles");
    assert_eq!(report.rivers, vec!["River_0"]);
    assert_eq!(report.routes, vec!["Route_0"]);

    let terrain = mesh(&scene, "Terrain");
    assert_eq!(terrain.faces.len(), 2);
    assert_eq!(terrain.faces[0].len(), 3);
    assert_eq!(terrain.faces[1].len(), 4);
    let triangle: Vec<_> = terrain.face_vertices(0).collect();
    assert_eq!(triangle, vec![[-5.0, 5.0, 40.0], [-5.0, 1.0, 40.0], [-1.0, 5.0, 40.0]]);
    let quad: Vec<_> = terrain.face_vertices(1).collect();
    assert_eq!(
        quad,
        vec![[-1.0, 5.0, 25.0], [-1.0, 1.0, 25.0], [3.0, 1.0, 25.0], [3.0, 5.0, 25.0]]
    );

    let ocean = mesh(&scene, "Ocean");
    assert_eq!(ocean.faces.len(), 1);
    assert!(ocean.vertices.iter().all(|v| v[2] == 0.0));

    let (river, river_curve) = curve(&scene, "River_0");
    assert_eq!(river_curve.points.len(), 3);
    assert!(river.visible);

    let (route, route_curve) = curve(&scene, "Route_0");
    assert_eq!(route_curve.points.len(), 2);
    assert!(!route.visible);

    assert_eq!(scene.linked_objects().count(), 4);
    assert!(scene.collection_by_name("Rivers").is_some());
    assert!(scene.collection_by_name("Routes").is_some());
}

#[test]
fn missing_cell_array_inserts_nothing() {
    let mut value = two_cell_map();
    value["pack"].as_object_mut().unwrap().remove("cells");
    let (_dir, path) = write_map(&value);

    let mut scene = SceneGraph::new();
    let failure = MapImport::new(&flat_options()).run(&mut scene, &path).unwrap_err();
    assert_eq!(failure.stage, ImportStage::Parsing);
    assert!(matches!(failure.error, ImportError::MalformedInput { .. }));
    assert!(failure.to_string().contains("twin-isles.json"));
    assert!(scene.is_empty());
}

#[test]
fn vertices_carry_their_biome_color() {
    let (_dir, path) = write_map(&two_cell_map());
    let mut scene = SceneGraph::new();
    MapImport::new(&flat_options()).run(&mut scene, &path).unwrap();

    let table = BiomeTable::builtin();
    let terrain = mesh(&scene, "Terrain");
    let colors = &terrain.color_layer.as_ref().unwrap().colors;
    for (face, biome) in terrain.faces.iter().zip([6, 9]) {
        for &v in face {
            assert_eq!(Some(colors[v as usize]), table.color(biome));
        }
    }
    let material = scene.object_by_name("Terrain").unwrap().material.unwrap();
    assert_eq!(scene.material(material).unwrap().color_layer.as_deref(), Some("Biomes"));
}

#[test]
fn doubling_vertical_scale_doubles_heights() {
    let (_dir, path) = write_map(&two_cell_map());
    let heights = |vertical_scale: f32| {
        let mut scene = SceneGraph::new();
        let options = ImportOptions {
            vertical_scale,
            ..flat_options()
        };
        MapImport::new(&options).run(&mut scene, &path).unwrap();
        mesh(&scene, "Terrain").vertices.iter().map(|v| v[2]).collect::<Vec<_>>()
    };
    let single = heights(0.25);
    let double = heights(0.5);
    assert!(single.iter().zip(&double).all(|(a, b)| *b == a * 2.0));
}

#[test]
fn revealed_route_matches_visible_import() {
    let (_dir, path) = write_map(&two_cell_map());

    let mut hidden_scene = SceneGraph::new();
    MapImport::new(&flat_options()).run(&mut hidden_scene, &path).unwrap();

    let mut shown_scene = SceneGraph::new();
    let shown_options = ImportOptions {
        show_routes: true,
        ..flat_options()
    };
    MapImport::new(&shown_options).run(&mut shown_scene, &path).unwrap();

    let route = hidden_scene.object_id("Route_0").unwrap();
    assert!(!hidden_scene.object_by_name("Route_0").unwrap().visible);
    hidden_scene.set_visible(route, true).unwrap();

    let revealed = hidden_scene.object_by_name("Route_0").unwrap();
    let visible = shown_scene.object_by_name("Route_0").unwrap();
    assert!(revealed.visible && visible.visible);
    assert_eq!(revealed.data, visible.data);
}

#[test]
fn repeated_import_keeps_previous_objects() {
    let (_dir, path) = write_map(&two_cell_map());
    let mut scene = SceneGraph::new();
    let first = MapImport::new(&flat_options()).run(&mut scene, &path).unwrap();
    let second = MapImport::new(&flat_options()).run(&mut scene, &path).unwrap();

    assert_eq!(first.terrain, "Terrain");
    assert_eq!(second.terrain, "Terrain.001");
    assert_eq!(second.collection, "Twin Isles.001");
    assert_eq!(second.rivers, vec!["River_0.001"]);
    assert_eq!(scene.linked_objects().count(), 8);
    // Ocean, Biomes и River на каждый импорт
    assert_eq!(scene.material_count(), 6);
}

#[test]
fn curve_names_follow_record_positions() {
    let mut value = two_cell_map();
    value["pack"]["rivers"] = json!([
        { "i": 1, "name": "Trickle", "cells": [1, -1] },
        { "i": 2, "name": "Mere", "cells": [0, 1] }
    ]);
    value["pack"]["routes"] = json!([
        { "i": 0, "group": "roads", "points": [[6, 2, 1]] },
        { "i": 1, "group": "trails", "points": [[1.5, 1.5, 0], [6, 2, 1]] }
    ]);
    let (_dir, path) = write_map(&value);
    let mut scene = SceneGraph::new();
    let report = MapImport::new(&flat_options()).run(&mut scene, &path).unwrap();

    assert_eq!(report.rivers, vec!["River_1"]);
    assert_eq!(report.skipped_rivers, 1);
    assert_eq!(report.routes, vec!["Route_1"]);
    assert_eq!(report.skipped_routes, 1);
    assert!(scene.object_by_name("River_0").is_none());
    assert_eq!(curve(&scene, "River_1").1.points.len(), 2);
}

#[test]
fn rivers_carry_marine_material() {
    let (_dir, path) = write_map(&two_cell_map());
    let mut scene = SceneGraph::new();
    MapImport::new(&flat_options()).run(&mut scene, &path).unwrap();

    let (river, _) = curve(&scene, "River_0");
    let material = scene.material(river.material.unwrap()).unwrap();
    assert_eq!(material.name, "River");
    assert_eq!(Some(material.base_color), BiomeTable::builtin().color(0));
}

#[test]
fn oversized_biome_id_is_unknown_biome() {
    let mut value = two_cell_map();
    value["pack"]["cells"][1]["biome"] = json!(70000);
    let (_dir, path) = write_map(&value);
    let mut scene = SceneGraph::new();
    let failure = MapImport::new(&flat_options()).run(&mut scene, &path).unwrap_err();

    assert_eq!(failure.stage, ImportStage::Painting);
    assert!(matches!(failure.error, ImportError::UnknownBiome { biome: 70000, cell: 1 }));
    assert!(scene.is_empty());
}

#[test]
fn failed_reimport_leaves_first_import_intact() {
    let (_dir, path) = write_map(&two_cell_map());
    let mut scene = SceneGraph::new();
    MapImport::new(&flat_options()).run(&mut scene, &path).unwrap();
    let objects = scene.object_count();

    let mut broken = two_cell_map();
    broken["pack"]["cells"][0]["biome"] = json!(200);
    let (_dir2, broken_path) = write_map(&broken);
    let failure = MapImport::new(&flat_options()).run(&mut scene, &broken_path).unwrap_err();

    assert_eq!(failure.stage, ImportStage::Painting);
    assert!(failure.to_string().contains("200"));
    assert_eq!(scene.object_count(), objects);
    assert!(scene.object_by_name("Terrain.001").is_none());
}
