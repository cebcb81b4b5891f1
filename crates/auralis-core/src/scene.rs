//! Scene container the visualization modes attach their geometry to.
//!
//! The scene is an arena of [`SceneObject`]s addressed by [`ObjectId`]. Modes
//! add their objects once at creation time and mutate them in place every
//! frame; the host walks the visible objects and draws them.

use glam::Vec3;

use crate::color::Rgb;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectId(usize);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    /// Euler angles in radians, applied X then Y then Z
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    /// Maps a local-space point into world space.
    pub fn apply(&self, point: Vec3) -> Vec3 {
        let scaled = point * self.scale;
        let rotation = glam::Quat::from_euler(
            glam::EulerRot::XYZ,
            self.rotation.x,
            self.rotation.y,
            self.rotation.z,
        );
        rotation * scaled + self.position
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MeshShape {
    Icosahedron { radius: f32, detail: u32 },
    Sphere { radius: f32 },
    Cuboid { size: Vec3 },
}

/// Per-particle buffers, all of equal length and indexed in lockstep.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointCloud {
    pub positions: Vec<Vec3>,
    pub colors: Vec<Rgb>,
    pub sizes: Vec<f32>,
}

impl PointCloud {
    pub fn with_len(len: usize) -> Self {
        Self {
            positions: vec![Vec3::ZERO; len],
            colors: vec![[1.0; 3]; len],
            sizes: vec![1.0; len],
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Polyline {
    pub positions: Vec<Vec3>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Mesh(MeshShape),
    Points(PointCloud),
    Line(Polyline),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneObject {
    pub transform: Transform,
    pub visible: bool,
    /// Flat color; point clouds use their per-point colors instead
    pub color: Rgb,
    pub opacity: f32,
    pub geometry: Geometry,
}

impl SceneObject {
    pub fn new(geometry: Geometry) -> Self {
        Self {
            transform: Transform::default(),
            visible: true,
            color: [1.0; 3],
            opacity: 1.0,
            geometry,
        }
    }

    pub fn with_color(mut self, color: Rgb) -> Self {
        self.color = color;
        self
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn points(&self) -> Option<&PointCloud> {
        match &self.geometry {
            Geometry::Points(points) => Some(points),
            _ => None,
        }
    }

    pub fn points_mut(&mut self) -> Option<&mut PointCloud> {
        match &mut self.geometry {
            Geometry::Points(points) => Some(points),
            _ => None,
        }
    }

    pub fn line(&self) -> Option<&Polyline> {
        match &self.geometry {
            Geometry::Line(line) => Some(line),
            _ => None,
        }
    }

    pub fn line_mut(&mut self) -> Option<&mut Polyline> {
        match &mut self.geometry {
            Geometry::Line(line) => Some(line),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
pub struct Scene {
    slots: Vec<Option<SceneObject>>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, object: SceneObject) -> ObjectId {
        // reuse a freed slot if there is one
        if let Some(idx) = self.slots.iter().position(Option::is_none) {
            self.slots[idx] = Some(object);
            return ObjectId(idx);
        }
        self.slots.push(Some(object));
        ObjectId(self.slots.len() - 1)
    }

    pub fn remove(&mut self, id: ObjectId) -> Option<SceneObject> {
        self.slots.get_mut(id.0).and_then(Option::take)
    }

    pub fn get(&self, id: ObjectId) -> Option<&SceneObject> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut SceneObject> {
        self.slots.get_mut(id.0).and_then(Option::as_mut)
    }

    pub fn set_visible(&mut self, id: ObjectId, visible: bool) {
        if let Some(object) = self.get_mut(id) {
            object.visible = visible;
        }
    }

    pub fn len(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (ObjectId, &SceneObject)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|o| (ObjectId(i), o)))
    }

    /// Objects the host should draw this frame.
    pub fn visible(&self) -> impl Iterator<Item = &SceneObject> {
        self.slots.iter().flatten().filter(|o| o.visible)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_remove_reuses_slots() {
        let mut scene = Scene::new();
        let a = scene.add(SceneObject::new(Geometry::Mesh(MeshShape::Sphere { radius: 1.0 })));
        let b = scene.add(SceneObject::new(Geometry::Points(PointCloud::with_len(3))));
        assert_eq!(scene.len(), 2);

        assert!(scene.remove(a).is_some());
        assert!(scene.get(a).is_none());
        assert!(scene.remove(a).is_none());

        let c = scene.add(SceneObject::new(Geometry::Line(Polyline::default())));
        assert_eq!(c, a);
        assert!(scene.get(b).and_then(SceneObject::points).is_some());
        assert!(scene.get(c).and_then(SceneObject::line).is_some());
    }

    #[test]
    fn test_visible_filter() {
        let mut scene = Scene::new();
        let a = scene.add(SceneObject::new(Geometry::Mesh(MeshShape::Sphere { radius: 1.0 })));
        scene.add(SceneObject::new(Geometry::Mesh(MeshShape::Sphere { radius: 2.0 })));
        scene.set_visible(a, false);
        assert_eq!(scene.visible().count(), 1);
        assert_eq!(scene.iter().count(), 2);
    }

    #[test]
    fn test_transform_apply() {
        let transform = Transform {
            position: Vec3::new(0.0, 10.0, 0.0),
            rotation: Vec3::new(0.0, 0.0, std::f32::consts::FRAC_PI_2),
            scale: Vec3::splat(2.0),
        };
        let p = transform.apply(Vec3::X);
        assert!((p - Vec3::new(0.0, 12.0, 0.0)).length() < 1e-5);
    }
}
