use std::collections::BTreeMap;

use crate::geometry::MeshGeometry;
use crate::host::{CollectionId, Host, HostError, MaterialId, ObjectId};
use crate::paint::MaterialSpec;
use crate::paths::CurveGeometry;

#[derive(Debug, Clone, PartialEq)]
pub enum ObjectData {
    Mesh(MeshGeometry),
    Curve(CurveGeometry),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneObject {
    pub name: String,
    pub data: ObjectData,
    pub material: Option<MaterialId>,
    pub collection: Option<CollectionId>,
    pub visible: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collection {
    pub name: String,
    pub parent: Option<CollectionId>,
}

/// Сцена в памяти
///
/// Ведёт себя как строгий хост: не принимает пустые и повторяющиеся имена,
/// сетки без граней и кривые короче двух точек. У объектов, коллекций и материалов
/// раздельные пространства имён.
#[derive(Debug, Default)]
pub struct SceneGraph {
    objects: BTreeMap<ObjectId, SceneObject>,
    materials: BTreeMap<MaterialId, MaterialSpec>,
    collections: BTreeMap<CollectionId, Collection>,
    next_id: u64,
}

impl SceneGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn check_name(name: &str, taken: bool) -> Result<(), HostError> {
        if name.trim().is_empty() {
            return Err(HostError::new("empty name"));
        }
        if taken {
            return Err(HostError::new(format!("name `{name}` is already taken")));
        }
        Ok(())
    }

    fn add_object(&mut self, name: &str, data: ObjectData) -> ObjectId {
        let id = ObjectId(self.next_id());
        self.objects.insert(
            id,
            SceneObject {
                name: name.to_owned(),
                data,
                material: None,
                collection: None,
                visible: true,
            },
        );
        id
    }

    fn object_mut(&mut self, object: ObjectId) -> Result<&mut SceneObject, HostError> {
        self.objects
            .get_mut(&object)
            .ok_or_else(|| HostError::new(format!("no object {}", object.0)))
    }

    /// Объекты, привязанные к сцене (в порядке создания)
    pub fn linked_objects(&self) -> impl Iterator<Item = &SceneObject> {
        self.objects.values().filter(|o| o.collection.is_some())
    }

    #[must_use]
    pub fn object_by_name(&self, name: &str) -> Option<&SceneObject> {
        self.objects.values().find(|o| o.name == name)
    }

    #[must_use]
    pub fn object_id(&self, name: &str) -> Option<ObjectId> {
        self.objects
            .iter()
            .find(|(_, o)| o.name == name)
            .map(|(&id, _)| id)
    }

    #[must_use]
    pub fn collection_by_name(&self, name: &str) -> Option<&Collection> {
        self.collections.values().find(|c| c.name == name)
    }

    #[must_use]
    pub fn collection(&self, id: CollectionId) -> Option<&Collection> {
        self.collections.get(&id)
    }

    #[must_use]
    pub fn material(&self, id: MaterialId) -> Option<&MaterialSpec> {
        self.materials.get(&id)
    }

    #[must_use]
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    #[must_use]
    pub fn material_count(&self) -> usize {
        self.materials.len()
    }

    #[must_use]
    pub fn collection_count(&self) -> usize {
        self.collections.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty() && self.materials.is_empty() && self.collections.is_empty()
    }
}

impl Host for SceneGraph {
    fn create_collection(
        &mut self,
        name: &str,
        parent: Option<CollectionId>,
    ) -> Result<CollectionId, HostError> {
        Self::check_name(name, self.contains_collection(name))?;
        if let Some(parent) = parent {
            if !self.collections.contains_key(&parent) {
                return Err(HostError::new(format!("no parent collection {}", parent.0)));
            }
        }
        let id = CollectionId(self.next_id());
        self.collections.insert(
            id,
            Collection {
                name: name.to_owned(),
                parent,
            },
        );
        Ok(id)
    }

    fn create_mesh(&mut self, name: &str, mesh: &MeshGeometry) -> Result<ObjectId, HostError> {
        Self::check_name(name, self.contains_object(name))?;
        if mesh.faces.is_empty() || mesh.vertices.is_empty() {
            return Err(HostError::new("degenerate mesh with no faces"));
        }
        let vertex_count = mesh.vertices.len();
        if mesh
            .faces
            .iter()
            .any(|f| f.len() < 3 || f.iter().any(|&v| v as usize >= vertex_count))
        {
            return Err(HostError::new("face references a missing vertex"));
        }
        if let Some(layer) = &mesh.color_layer {
            if layer.colors.len() != vertex_count {
                return Err(HostError::new(format!(
                    "color layer `{}` has {} colors for {vertex_count} vertices",
                    layer.name,
                    layer.colors.len()
                )));
            }
        }
        Ok(self.add_object(name, ObjectData::Mesh(mesh.clone())))
    }

    fn create_curve(&mut self, name: &str, curve: &CurveGeometry) -> Result<ObjectId, HostError> {
        Self::check_name(name, self.contains_object(name))?;
        if curve.points.len() < 2 {
            return Err(HostError::new(format!(
                "curve needs at least 2 points, got {}",
                curve.points.len()
            )));
        }
        Ok(self.add_object(name, ObjectData::Curve(curve.clone())))
    }

    fn create_material(&mut self, spec: &MaterialSpec) -> Result<MaterialId, HostError> {
        Self::check_name(&spec.name, self.contains_material(&spec.name))?;
        let id = MaterialId(self.next_id());
        self.materials.insert(id, spec.clone());
        Ok(id)
    }

    fn assign_material(&mut self, object: ObjectId, material: MaterialId) -> Result<(), HostError> {
        let wanted = self
            .materials
            .get(&material)
            .map(|m| m.color_layer.clone())
            .ok_or_else(|| HostError::new(format!("no material {}", material.0)))?;
        let target = self.object_mut(object)?;
        if let Some(wanted) = wanted {
            let layer = match &target.data {
                ObjectData::Mesh(mesh) => mesh.color_layer.as_ref().map(|l| l.name.as_str()),
                ObjectData::Curve(_) => None,
            };
            if layer != Some(wanted.as_str()) {
                return Err(HostError::new(format!(
                    "`{}` has no color layer `{wanted}`",
                    target.name
                )));
            }
        }
        target.material = Some(material);
        Ok(())
    }

    fn link(&mut self, object: ObjectId, collection: CollectionId) -> Result<(), HostError> {
        if !self.collections.contains_key(&collection) {
            return Err(HostError::new(format!("no collection {}", collection.0)));
        }
        self.object_mut(object)?.collection = Some(collection);
        Ok(())
    }

    fn set_visible(&mut self, object: ObjectId, visible: bool) -> Result<(), HostError> {
        self.object_mut(object)?.visible = visible;
        Ok(())
    }

    fn contains_object(&self, name: &str) -> bool {
        self.objects.values().any(|o| o.name == name)
    }

    fn contains_collection(&self, name: &str) -> bool {
        self.collections.values().any(|c| c.name == name)
    }

    fn contains_material(&self, name: &str) -> bool {
        self.materials.values().any(|m| m.name == name)
    }

    fn remove_object(&mut self, object: ObjectId) {
        self.objects.remove(&object);
    }

    fn remove_material(&mut self, material: MaterialId) {
        self.materials.remove(&material);
        for object in self.objects.values_mut() {
            if object.material == Some(material) {
                object.material = None;
            }
        }
    }

    fn remove_collection(&mut self, collection: CollectionId) {
        self.collections.remove(&collection);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::biome::Rgba;
    use crate::geometry::ColorLayer;

    fn triangle() -> MeshGeometry {
        MeshGeometry {
            vertices: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            faces: vec![vec![0, 1, 2]],
            color_layer: None,
        }
    }

    #[test]
    fn rejects_empty_mesh() {
        let mut scene = SceneGraph::new();
        let err = scene.create_mesh("Terrain", &MeshGeometry::default()).unwrap_err();
        assert!(err.reason.contains("no faces"));
        assert!(scene.is_empty());
    }

    #[test]
    fn rejects_duplicate_names() {
        let mut scene = SceneGraph::new();
        scene.create_mesh("Terrain", &triangle()).unwrap();
        assert!(scene.create_mesh("Terrain", &triangle()).is_err());
        scene.create_collection("Rivers", None).unwrap();
        assert!(scene.create_collection("Rivers", None).is_err());
    }

    #[test]
    fn objects_and_collections_have_separate_names() {
        let mut scene = SceneGraph::new();
        scene.create_collection("Terrain", None).unwrap();
        scene.create_mesh("Terrain", &triangle()).unwrap();
        assert!(scene.contains_object("Terrain"));
        assert!(scene.contains_collection("Terrain"));
        assert!(!scene.contains_collection("Ocean"));
    }

    #[test]
    fn material_requires_matching_color_layer() {
        let mut scene = SceneGraph::new();
        let plain = scene.create_mesh("Plain", &triangle()).unwrap();
        let mut painted = triangle();
        painted.color_layer = Some(ColorLayer {
            name: "Biomes".into(),
            colors: vec![Rgba([1.0; 4]); 3],
        });
        let painted = scene.create_mesh("Painted", &painted).unwrap();
        let material = scene
            .create_material(&MaterialSpec {
                name: "Biomes".into(),
                color_layer: Some("Biomes".into()),
                base_color: Rgba([1.0; 4]),
            })
            .unwrap();

        assert!(scene.assign_material(plain, material).is_err());
        scene.assign_material(painted, material).unwrap();
        assert_eq!(scene.object_by_name("Painted").unwrap().material, Some(material));
    }

    #[test]
    fn flat_material_fits_curves_only_without_layer() {
        let mut scene = SceneGraph::new();
        let curve = scene
            .create_curve(
                "River_0",
                &CurveGeometry {
                    points: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]],
                    bevel_depth: 0.1,
                    resolution: 12,
                    conform_to_terrain: true,
                },
            )
            .unwrap();
        let flat = scene
            .create_material(&MaterialSpec::flat("River", Rgba([0.0, 0.0, 1.0, 1.0])))
            .unwrap();
        let layered = scene
            .create_material(&MaterialSpec {
                name: "Biomes".into(),
                color_layer: Some("Biomes".into()),
                base_color: Rgba([1.0; 4]),
            })
            .unwrap();

        assert!(scene.assign_material(curve, layered).is_err());
        scene.assign_material(curve, flat).unwrap();
        assert!(scene.create_material(&MaterialSpec::flat("River", Rgba([1.0; 4]))).is_err());
    }

    #[test]
    fn linking_and_visibility() {
        let mut scene = SceneGraph::new();
        let root = scene.create_collection("Map", None).unwrap();
        let object = scene.create_mesh("Terrain", &triangle()).unwrap();
        assert_eq!(scene.linked_objects().count(), 0);

        scene.link(object, root).unwrap();
        scene.set_visible(object, false).unwrap();
        let linked: Vec<_> = scene.linked_objects().collect();
        assert_eq!(linked.len(), 1);
        assert!(!linked[0].visible);

        scene.remove_object(object);
        scene.remove_collection(root);
        assert!(scene.is_empty());
    }
}
