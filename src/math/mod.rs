use binrw::binrw;
use cgmath::{InnerSpace, MetricSpace, Vector3};
use serde::Serialize;

use crate::codec::MinSize;

#[binrw]
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Vector(
    #[br(map = |raw: [f32; 3]| Vector3::new(raw[0], raw[1], raw[2]))]
    #[bw(map = |v: &Vector3<f32>| [v.x, v.y, v.z])]
    pub Vector3<f32>,
);

impl Vector {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self(Vector3::new(x, y, z))
    }

    pub fn to_slice(&self) -> [f32; 3] {
        let v = &self.0;
        [v.x, v.y, v.z]
    }

    pub fn distance(&self, other: &Vector) -> f32 {
        self.0.distance(other.0)
    }

    pub fn dot(&self, other: &Vector) -> f32 {
        self.0.dot(other.0)
    }
}

impl Default for Vector {
    fn default() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }
}

impl MinSize for Vector {
    const MIN_SIZE: usize = 12;
}

#[binrw]
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Uv {
    pub u: f32,
    pub v: f32,
}

/// Axis-aligned box, stored as lo/hi pairs per axis.
#[binrw]
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct BoundingBox {
    pub xlo: f32,
    pub xhi: f32,
    pub ylo: f32,
    pub yhi: f32,
    pub zlo: f32,
    pub zhi: f32,
}

impl BoundingBox {
    /// Smallest box around `points`; `None` for an empty set.
    pub fn from_points<'a, I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Vector3<f32>>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bbox = BoundingBox {
            xlo: first.x,
            xhi: first.x,
            ylo: first.y,
            yhi: first.y,
            zlo: first.z,
            zhi: first.z,
        };
        for p in iter {
            bbox.xlo = bbox.xlo.min(p.x);
            bbox.xhi = bbox.xhi.max(p.x);
            bbox.ylo = bbox.ylo.min(p.y);
            bbox.yhi = bbox.yhi.max(p.y);
            bbox.zlo = bbox.zlo.min(p.z);
            bbox.zhi = bbox.zhi.max(p.z);
        }
        Some(bbox)
    }

    pub fn is_ordered(&self) -> bool {
        self.xlo <= self.xhi && self.ylo <= self.yhi && self.zlo <= self.zhi
    }

    pub fn contains(&self, p: &Vector3<f32>, tolerance: f32) -> bool {
        p.x >= self.xlo - tolerance
            && p.x <= self.xhi + tolerance
            && p.y >= self.ylo - tolerance
            && p.y <= self.yhi + tolerance
            && p.z >= self.zlo - tolerance
            && p.z <= self.zhi + tolerance
    }

    pub fn center(&self) -> Vector3<f32> {
        Vector3::new(
            (self.xlo + self.xhi) * 0.5,
            (self.ylo + self.yhi) * 0.5,
            (self.zlo + self.zhi) * 0.5,
        )
    }
}

/// Half-space: a point `p` is inside when `dot(normal, p) <= distance`.
#[binrw]
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Plane {
    pub normal: Vector,
    pub distance: f32,
}

impl Plane {
    /// All-zero slot, written for polyhedra with fewer than five faces.
    pub fn is_unused(&self) -> bool {
        self.normal.0 == Vector3::new(0.0, 0.0, 0.0) && self.distance == 0.0
    }

    pub fn contains(&self, p: &Vector3<f32>) -> bool {
        self.normal.0.dot(*p) <= self.distance
    }

    /// Plane with `normal` passing through `point`.
    pub fn through(normal: Vector3<f32>, point: &Vector3<f32>) -> Self {
        Plane {
            normal: Vector(normal),
            distance: normal.dot(*point),
        }
    }

    /// The single point on all three boundary planes, if they meet in one.
    pub fn intersection(a: &Plane, b: &Plane, c: &Plane) -> Option<Vector3<f32>> {
        let (na, nb, nc) = (a.normal.0, b.normal.0, c.normal.0);
        let bc = nb.cross(nc);
        let det = na.dot(bc);
        if !(det.abs() > f32::EPSILON) {
            return None;
        }
        let sum = bc * a.distance + nc.cross(na) * b.distance + na.cross(nb) * c.distance;
        Some(sum / det)
    }
}
