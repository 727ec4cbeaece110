//! Line-wireframe geometry: primitive meshes, edge extraction, the shape
//! registry entry point.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use glam::Vec3;

use crate::error::Result;
use crate::scene::{MaterialId, Shape, Transform};
use crate::typeface::Typeface;

/// Faces meeting at more than this angle contribute a visible edge.
pub const EDGE_THRESHOLD_DEG: f32 = 1.0;

static NEXT_GEOMETRY_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GeometryId(u64);

impl GeometryId {
    fn next() -> Self {
        GeometryId(NEXT_GEOMETRY_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Vec3>) -> Self {
        let mut min = Vec3::splat(f32::INFINITY);
        let mut max = Vec3::splat(f32::NEG_INFINITY);
        for p in points {
            min = min.min(*p);
            max = max.max(*p);
        }
        if min.x > max.x {
            return Self { min: Vec3::ZERO, max: Vec3::ZERO };
        }
        Self { min, max }
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }
}

/// Immutable line-segment list: `positions` holds segment endpoints in pairs.
#[derive(Debug)]
pub struct LineGeometry {
    id: GeometryId,
    positions: Vec<Vec3>,
    bounds: Aabb,
}

impl LineGeometry {
    pub fn new(positions: Vec<Vec3>) -> Self {
        debug_assert!(positions.len() % 2 == 0);
        let bounds = Aabb::from_points(&positions);
        Self { id: GeometryId::next(), positions, bounds }
    }

    pub fn id(&self) -> GeometryId {
        self.id
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn segment_count(&self) -> usize {
        self.positions.len() / 2
    }

    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    /// Move the local origin to the bounding-box center.
    pub fn center(&mut self) {
        let c = self.bounds.center();
        if c == Vec3::ZERO {
            return;
        }
        for p in &mut self.positions {
            *p -= c;
        }
        self.bounds = Aabb { min: self.bounds.min - c, max: self.bounds.max - c };
    }
}

/// Indexed triangle mesh, only used as an intermediate before edge extraction.
#[derive(Clone, Debug, Default)]
pub struct TriMesh {
    pub vertices: Vec<Vec3>,
    pub triangles: Vec<[u32; 3]>,
}

impl TriMesh {
    fn normal(&self, tri: [u32; 3]) -> Vec3 {
        let [a, b, c] = tri.map(|i| self.vertices[i as usize]);
        (b - a).cross(c - a).normalize_or_zero()
    }

    /// Flip triangles whose normal points toward the origin. Every primitive
    /// here is convex around the origin.
    fn wind_outward(mut self) -> Self {
        for i in 0..self.triangles.len() {
            let tri = self.triangles[i];
            let centroid = tri
                .iter()
                .map(|&v| self.vertices[v as usize])
                .sum::<Vec3>()
                / 3.0;
            if self.normal(tri).dot(centroid) < 0.0 {
                self.triangles[i] = [tri[0], tri[2], tri[1]];
            }
        }
        self
    }

    /// Feature edges: boundary edges plus shared edges whose faces bend by
    /// more than `threshold_deg`. Vertices are welded by position first.
    pub fn feature_edges(&self, threshold_deg: f32) -> Vec<Vec3> {
        let cos_threshold = threshold_deg.to_radians().cos();
        let weld = self.weld_map();
        let mut open: HashMap<(u32, u32), Vec3> = HashMap::new();
        let mut out = Vec::new();

        for &tri in &self.triangles {
            let w = tri.map(|i| weld[i as usize]);
            if w[0] == w[1] || w[1] == w[2] || w[0] == w[2] {
                continue;
            }
            let n = self.normal(tri);
            for k in 0..3 {
                let (a, b) = (w[k], w[(k + 1) % 3]);
                let key = (a.min(b), a.max(b));
                match open.remove(&key) {
                    Some(other) => {
                        if n.dot(other) <= cos_threshold {
                            out.push(self.vertices[key.0 as usize]);
                            out.push(self.vertices[key.1 as usize]);
                        }
                    }
                    None => {
                        open.insert(key, n);
                    }
                }
            }
        }

        let mut boundary: Vec<_> = open.into_keys().collect();
        boundary.sort_unstable();
        for (a, b) in boundary {
            out.push(self.vertices[a as usize]);
            out.push(self.vertices[b as usize]);
        }
        out
    }

    /// Every distinct triangle edge.
    pub fn triangle_edges(&self) -> Vec<Vec3> {
        let weld = self.weld_map();
        let mut seen = std::collections::BTreeSet::new();
        for tri in &self.triangles {
            let w = tri.map(|i| weld[i as usize]);
            for k in 0..3 {
                let (a, b) = (w[k], w[(k + 1) % 3]);
                if a != b {
                    seen.insert((a.min(b), a.max(b)));
                }
            }
        }
        seen.into_iter()
            .flat_map(|(a, b)| [self.vertices[a as usize], self.vertices[b as usize]])
            .collect()
    }

    /// Map each vertex to the first vertex sharing its (rounded) position.
    fn weld_map(&self) -> Vec<u32> {
        const PRECISION: f32 = 1e4;
        let mut first: HashMap<[i64; 3], u32> = HashMap::new();
        self.vertices
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let key = [v.x, v.y, v.z].map(|c| (c * PRECISION).round() as i64);
                *first.entry(key).or_insert(i as u32)
            })
            .collect()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Primitive {
    Cuboid { width: f32, height: f32, depth: f32 },
    Octahedron { radius: f32 },
    Sphere { radius: f32, width_segments: u32, height_segments: u32 },
    Icosahedron { radius: f32 },
}

impl Primitive {
    pub fn mesh(&self) -> TriMesh {
        match *self {
            Primitive::Cuboid { width, height, depth } => cuboid(width, height, depth),
            Primitive::Octahedron { radius } => octahedron(radius),
            Primitive::Sphere { radius, width_segments, height_segments } => {
                sphere(radius, width_segments.max(3), height_segments.max(2))
            }
            Primitive::Icosahedron { radius } => icosahedron(radius),
        }
        .wind_outward()
    }
}

fn cuboid(w: f32, h: f32, d: f32) -> TriMesh {
    let (x, y, z) = (w / 2.0, h / 2.0, d / 2.0);
    let vertices = vec![
        Vec3::new(-x, -y, -z),
        Vec3::new(x, -y, -z),
        Vec3::new(x, y, -z),
        Vec3::new(-x, y, -z),
        Vec3::new(-x, -y, z),
        Vec3::new(x, -y, z),
        Vec3::new(x, y, z),
        Vec3::new(-x, y, z),
    ];
    let quads = [
        [0, 1, 2, 3],
        [4, 5, 6, 7],
        [0, 1, 5, 4],
        [3, 2, 6, 7],
        [0, 3, 7, 4],
        [1, 2, 6, 5],
    ];
    let triangles = quads
        .iter()
        .flat_map(|q| [[q[0], q[1], q[2]], [q[0], q[2], q[3]]])
        .collect();
    TriMesh { vertices, triangles }
}

fn octahedron(radius: f32) -> TriMesh {
    let vertices = vec![
        Vec3::X,
        Vec3::NEG_X,
        Vec3::Y,
        Vec3::NEG_Y,
        Vec3::Z,
        Vec3::NEG_Z,
    ]
    .into_iter()
    .map(|v| v * radius)
    .collect();
    let triangles = vec![
        [0, 2, 4],
        [0, 4, 3],
        [0, 3, 5],
        [0, 5, 2],
        [1, 2, 5],
        [1, 5, 3],
        [1, 3, 4],
        [1, 4, 2],
    ];
    TriMesh { vertices, triangles }
}

fn icosahedron(radius: f32) -> TriMesh {
    let t = (1.0 + 5f32.sqrt()) / 2.0;
    let raw = [
        [-1.0, t, 0.0],
        [1.0, t, 0.0],
        [-1.0, -t, 0.0],
        [1.0, -t, 0.0],
        [0.0, -1.0, t],
        [0.0, 1.0, t],
        [0.0, -1.0, -t],
        [0.0, 1.0, -t],
        [t, 0.0, -1.0],
        [t, 0.0, 1.0],
        [-t, 0.0, -1.0],
        [-t, 0.0, 1.0],
    ];
    let vertices = raw
        .iter()
        .map(|p| Vec3::from_array(*p).normalize() * radius)
        .collect();
    let triangles = vec![
        [0, 11, 5],
        [0, 5, 1],
        [0, 1, 7],
        [0, 7, 10],
        [0, 10, 11],
        [1, 5, 9],
        [5, 11, 4],
        [11, 10, 2],
        [10, 7, 6],
        [7, 1, 8],
        [3, 9, 4],
        [3, 4, 2],
        [3, 2, 6],
        [3, 6, 8],
        [3, 8, 9],
        [4, 9, 5],
        [2, 4, 11],
        [6, 2, 10],
        [8, 6, 7],
        [9, 8, 1],
    ];
    TriMesh { vertices, triangles }
}

/// UV sphere laid out like three.js `SphereGeometry`.
fn sphere(radius: f32, width_segments: u32, height_segments: u32) -> TriMesh {
    use std::f32::consts::PI;

    let mut vertices = Vec::new();
    let mut grid = Vec::new();
    for iy in 0..=height_segments {
        let v = iy as f32 / height_segments as f32;
        let mut row = Vec::new();
        for ix in 0..=width_segments {
            let u = ix as f32 / width_segments as f32;
            let phi = u * 2.0 * PI;
            let theta = v * PI;
            vertices.push(Vec3::new(
                -radius * phi.cos() * theta.sin(),
                radius * theta.cos(),
                radius * phi.sin() * theta.sin(),
            ));
            row.push(vertices.len() as u32 - 1);
        }
        grid.push(row);
    }

    let mut triangles = Vec::new();
    for iy in 0..height_segments as usize {
        for ix in 0..width_segments as usize {
            let a = grid[iy][ix + 1];
            let b = grid[iy][ix];
            let c = grid[iy + 1][ix];
            let d = grid[iy + 1][ix + 1];
            if iy != 0 {
                triangles.push([a, b, d]);
            }
            if iy != height_segments as usize - 1 {
                triangles.push([b, c, d]);
            }
        }
    }
    TriMesh { vertices, triangles }
}

/// Which lines of a mesh are drawn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LineStyle {
    /// Outline edges only.
    #[default]
    Edges,
    /// Every triangle edge, for wireframe-shaded solids.
    Triangles,
}

/// Input to the shape registry.
#[derive(Clone, Copy, Debug)]
pub enum ShapeSpec<'a> {
    Primitive { primitive: Primitive, style: LineStyle },
    Glyph {
        typeface: &'a Typeface,
        ch: char,
        size: f32,
        depth: f32,
        centered: bool,
    },
}

impl<'a> ShapeSpec<'a> {
    pub fn edges(primitive: Primitive) -> Self {
        ShapeSpec::Primitive { primitive, style: LineStyle::Edges }
    }

    pub fn glyph(typeface: &'a Typeface, ch: char, size: f32, depth: f32) -> Self {
        ShapeSpec::Glyph { typeface, ch, size, depth, centered: true }
    }
}

/// Build the line geometry described by `spec`.
pub fn build_geometry(spec: &ShapeSpec<'_>) -> Result<LineGeometry> {
    match *spec {
        ShapeSpec::Primitive { primitive, style } => {
            let mesh = primitive.mesh();
            let lines = match style {
                LineStyle::Edges => mesh.feature_edges(EDGE_THRESHOLD_DEG),
                LineStyle::Triangles => mesh.triangle_edges(),
            };
            Ok(LineGeometry::new(lines))
        }
        ShapeSpec::Glyph { typeface, ch, size, depth, centered } => {
            let mut geometry = LineGeometry::new(typeface.extruded_edges(ch, size, depth)?);
            if centered {
                geometry.center();
            }
            Ok(geometry)
        }
    }
}

/// Shape registry: a fresh wireframe shape drawing with `material`.
pub fn make_wireframe(spec: &ShapeSpec<'_>, material: MaterialId) -> Result<Shape> {
    Ok(Shape {
        geometry: build_geometry(spec)?,
        material,
        transform: Transform::default(),
    })
}
