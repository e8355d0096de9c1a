use std::collections::BTreeMap;

use cgmath::Vector3;
use rayon::prelude::*;

use super::bsphere::enclosing_sphere;
use super::config::BigCubeConfig;
use super::BigCube;
use crate::math::Vector;
use crate::world::WorldMesh;

/// Below this many groups, sequential fitting is faster
const PARALLEL_GROUP_THRESHOLD: usize = 32;

type CellKey = (i64, i64, i64);

/// Edge of the snapping cell whose circumscribed sphere has `max_radius`.
fn snap_edge(max_radius: f32) -> Option<f32> {
    if max_radius.is_finite() && max_radius > 0.0 {
        Some(max_radius * 2.0 / 3f32.sqrt())
    } else {
        None
    }
}

fn cell_key(p: Vector3<f32>, edge: Option<f32>) -> CellKey {
    match edge {
        Some(e) => (
            (p.x / e).floor() as i64,
            (p.y / e).floor() as i64,
            (p.z / e).floor() as i64,
        ),
        None => (0, 0, 0),
    }
}

fn fit_cube(meshes: &[WorldMesh], members: &[usize]) -> BigCube {
    let spheres: Vec<(Vector3<f32>, f32)> = members
        .iter()
        .map(|&i| (meshes[i].bound_ball_center.0, meshes[i].bound_ball_radius))
        .collect();
    let (center, radius) = enclosing_sphere(&spheres);
    BigCube {
        center: Vector(center),
        radius,
        mesh_indices: members.iter().map(|&i| i as i32).collect(),
    }
}

/// Group `meshes` into big cubes.
///
/// Mesh sphere centers are snapped to a grid sized from
/// `config.max_radius`; each occupied cell becomes one or more cubes of at
/// most `config.max_group_size` meshes. Cells are visited in key order and
/// members keep mesh order, so the result does not depend on thread count.
/// Every mesh index lands in exactly one cube, and each cube's radius
/// covers its members' full bounding spheres.
pub fn build_bigcubes(meshes: &[WorldMesh], config: &BigCubeConfig) -> Vec<BigCube> {
    if let Err(e) = config.validate() {
        tracing::warn!(error = %e, "big cube config out of range, clamping");
    }
    let group_size = config.max_group_size.max(1);
    let edge = snap_edge(config.max_radius);

    let mut cells: BTreeMap<CellKey, Vec<usize>> = BTreeMap::new();
    for (i, mesh) in meshes.iter().enumerate() {
        cells
            .entry(cell_key(mesh.bound_ball_center.0, edge))
            .or_default()
            .push(i);
    }

    let groups: Vec<&[usize]> = cells
        .values()
        .flat_map(|members| members.chunks(group_size))
        .collect();

    let cubes: Vec<BigCube> = if groups.len() >= PARALLEL_GROUP_THRESHOLD {
        groups.par_iter().map(|g| fit_cube(meshes, g)).collect()
    } else {
        groups.iter().map(|g| fit_cube(meshes, g)).collect()
    };

    tracing::debug!(
        meshes = meshes.len(),
        cells = cells.len(),
        cubes = cubes.len(),
        "built big cubes"
    );
    cubes
}
