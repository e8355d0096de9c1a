use cgmath::{MetricSpace, Vector3};

/// Approximate bounding sphere of `points` (Ritter): seed with the widest
/// pair of axis extremes, then grow toward every point left outside.
pub fn ritter_bounding_sphere(points: &[Vector3<f32>]) -> (Vector3<f32>, f32) {
    let Some(&first) = points.first() else {
        return (Vector3::new(0.0, 0.0, 0.0), 0.0);
    };

    // [lowest, highest] point along x, y and z
    let mut extremes = [[first; 2]; 3];
    for p in points {
        for (axis, pair) in extremes.iter_mut().enumerate() {
            if p[axis] < pair[0][axis] {
                pair[0] = *p;
            }
            if p[axis] > pair[1][axis] {
                pair[1] = *p;
            }
        }
    }
    let [p1, p2] = extremes
        .into_iter()
        .max_by(|a, b| a[0].distance2(a[1]).total_cmp(&b[0].distance2(b[1])))
        .unwrap_or([first; 2]);

    let mut center = (p1 + p2) * 0.5;
    let mut radius = p1.distance(p2) * 0.5;
    for p in points {
        let dist = center.distance(*p);
        if dist > radius {
            let grown = (radius + dist) * 0.5;
            center += (*p - center) * ((grown - radius) / dist);
            radius = grown;
        }
    }
    (center, radius)
}

/// How far a sphere reaches from `center`: the radius needed to enclose it.
pub fn sphere_reach(center: Vector3<f32>, sphere_center: Vector3<f32>, sphere_radius: f32) -> f32 {
    center.distance(sphere_center) + sphere_radius.max(0.0)
}

/// A sphere enclosing every `(center, radius)` in `spheres`.
///
/// Centered on the middle of the spheres' combined box; the radius is the
/// largest reach from there, so containment holds exactly as computed.
pub fn enclosing_sphere(spheres: &[(Vector3<f32>, f32)]) -> (Vector3<f32>, f32) {
    let Some(&(first_c, first_r)) = spheres.first() else {
        return (Vector3::new(0.0, 0.0, 0.0), 0.0);
    };

    let r = first_r.max(0.0);
    let mut lo = first_c - Vector3::new(r, r, r);
    let mut hi = first_c + Vector3::new(r, r, r);
    for &(c, r) in &spheres[1..] {
        let r = r.max(0.0);
        lo.x = lo.x.min(c.x - r);
        lo.y = lo.y.min(c.y - r);
        lo.z = lo.z.min(c.z - r);
        hi.x = hi.x.max(c.x + r);
        hi.y = hi.y.max(c.y + r);
        hi.z = hi.z.max(c.z + r);
    }

    let center = (lo + hi) * 0.5;
    let radius = spheres
        .iter()
        .map(|&(c, r)| sphere_reach(center, c, r))
        .fold(0.0f32, f32::max);
    (center, radius)
}
