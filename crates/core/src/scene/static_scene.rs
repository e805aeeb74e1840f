//! Analytic reference scene
//!
//! A small set of planes, spheres and axis-aligned boxes intersected in
//! closed form. Used by the demo binary and by tests that need a
//! deterministic world without a physics engine.

use super::{ActorRef, HitInfo, RayCaster};
use crate::core_types::vec3::Vec3;

/// Hits closer than this are ignored to avoid self-intersection
const MIN_HIT_DISTANCE: f32 = 1.0e-4;

/// Closed-form primitive
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    /// Infinite plane through `point` with unit `normal`
    Plane { point: Vec3, normal: Vec3 },
    Sphere { center: Vec3, radius: f32 },
    /// Axis-aligned box
    Aabb { min: Vec3, max: Vec3 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct SceneObject {
    shape: Shape,
    tag: u32,
    actor: Option<ActorRef>,
}

/// Collection of analytic primitives implementing [`RayCaster`]
#[derive(Debug, Clone, Default)]
pub struct StaticScene {
    objects: Vec<SceneObject>,
}

impl StaticScene {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add static geometry with a semantic tag.
    #[must_use]
    pub fn with_shape(mut self, shape: Shape, tag: u32) -> Self {
        self.push(shape, tag, None);
        self
    }

    /// Add geometry owned by a moving actor.
    #[must_use]
    pub fn with_actor(mut self, shape: Shape, tag: u32, actor: ActorRef) -> Self {
        self.push(shape, tag, Some(actor));
        self
    }

    pub fn push(&mut self, shape: Shape, tag: u32, actor: Option<ActorRef>) {
        let shape = match shape {
            Shape::Plane { point, normal } => Shape::Plane {
                point,
                normal: normal.try_normalize(f32::EPSILON).unwrap_or_else(Vec3::z),
            },
            other => other,
        };
        self.objects.push(SceneObject { shape, tag, actor });
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Ground plane at `z = height` plus a ring of boxes, a typical test yard.
    #[must_use]
    pub fn test_yard(height: f32) -> Self {
        let mut scene = StaticScene::new().with_shape(
            Shape::Plane {
                point: Vec3::new(0.0, 0.0, height),
                normal: Vec3::z(),
            },
            1,
        );
        for i in 0..8u8 {
            let angle = f32::from(i) * std::f32::consts::FRAC_PI_4;
            let centre = Vec3::new(25.0 * angle.cos(), 25.0 * angle.sin(), height + 1.0);
            let half = Vec3::new(1.0, 1.0, 1.0);
            scene.push(
                Shape::Aabb {
                    min: centre - half,
                    max: centre + half,
                },
                10 + u32::from(i),
                None,
            );
        }
        scene
    }
}

/// Ray parameter and outward normal of the nearest forward intersection.
fn intersect(shape: &Shape, origin: &Vec3, direction: &Vec3) -> Option<(f32, Vec3)> {
    match *shape {
        Shape::Plane { point, normal } => {
            let denom = normal.dot(direction);
            if denom.abs() < f32::EPSILON {
                return None;
            }
            let t = (point - origin).dot(&normal) / denom;
            (t > MIN_HIT_DISTANCE).then_some((t, normal))
        }
        Shape::Sphere { center, radius } => {
            let oc = origin - center;
            let b = oc.dot(direction);
            let c = oc.norm_squared() - radius * radius;
            let disc = b * b - c;
            if disc < 0.0 {
                return None;
            }
            let sqrt_disc = disc.sqrt();
            let t = [-b - sqrt_disc, -b + sqrt_disc]
                .into_iter()
                .find(|&t| t > MIN_HIT_DISTANCE)?;
            let normal = (origin + t * direction - center) / radius;
            Some((t, normal))
        }
        Shape::Aabb { min, max } => {
            let mut t_near = f32::NEG_INFINITY;
            let mut t_far = f32::INFINITY;
            let mut near_axis = 0;
            for axis in 0..3 {
                let d = direction[axis];
                if d.abs() < f32::EPSILON {
                    if origin[axis] < min[axis] || origin[axis] > max[axis] {
                        return None;
                    }
                    continue;
                }
                let t1 = (min[axis] - origin[axis]) / d;
                let t2 = (max[axis] - origin[axis]) / d;
                let (lo, hi) = if t1 < t2 { (t1, t2) } else { (t2, t1) };
                if lo > t_near {
                    t_near = lo;
                    near_axis = axis;
                }
                t_far = t_far.min(hi);
            }
            if t_near > t_far || t_far < MIN_HIT_DISTANCE {
                return None;
            }
            let mut normal = Vec3::zeros();
            normal[near_axis] = -direction[near_axis].signum();
            if t_near > MIN_HIT_DISTANCE {
                Some((t_near, normal))
            } else {
                // Origin inside the box
                Some((t_far, -normal))
            }
        }
    }
}

impl RayCaster for StaticScene {
    fn cast(&self, origin: &Vec3, direction: &Vec3, max_range: f32) -> Option<HitInfo> {
        let dir = direction.try_normalize(f32::EPSILON)?;
        self.objects
            .iter()
            .filter_map(|object| {
                intersect(&object.shape, origin, &dir)
                    .filter(|&(t, _)| t <= max_range)
                    .map(|(t, normal)| (t, normal, object))
            })
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(t, normal, object)| {
                let facing = if normal.dot(&dir) > 0.0 { -normal } else { normal };
                HitInfo {
                    point: origin + t * dir,
                    normal: facing,
                    distance: t,
                    object_tag: object.tag,
                    actor: object.actor,
                }
            })
    }
}
