//! Indexed triangle meshes produced by the model importers.

use ember_math::{Aabb, Vec3};

/// One triangle ready to be handed to the renderer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TriangleData {
    pub points: [Vec3; 3],
    /// Per-vertex normals for smooth shading
    pub normals: Option<[Vec3; 3]>,
}

/// A mesh consisting of vertex positions, optional normals, and triangle indices.
#[derive(Clone, Debug)]
pub struct Mesh {
    /// Vertex positions (one Vec3 per vertex)
    pub positions: Vec<Vec3>,

    /// Vertex normals, parallel to `positions` when present
    pub normals: Option<Vec<Vec3>>,

    /// Triangle indices (every 3 indices form a triangle)
    pub indices: Vec<u32>,

    /// Axis-aligned bounding box
    pub bounds: Aabb,
}

impl Mesh {
    /// Create a new mesh from positions and indices, optionally with normals.
    pub fn new(positions: Vec<Vec3>, indices: Vec<u32>, normals: Option<Vec<Vec3>>) -> Self {
        let bounds = Aabb::enclosing(&positions);
        Self {
            positions,
            normals,
            indices,
            bounds,
        }
    }

    /// Compute smooth vertex normals by averaging face normals.
    ///
    /// Faces are counter-clockwise (OBJ convention). Each vertex normal is the
    /// normalized sum of the area-weighted normals of the faces sharing it.
    pub fn compute_normals(&mut self) {
        let vertex_count = self.positions.len();
        let mut normals = vec![Vec3::ZERO; vertex_count];

        for face in self.indices.chunks_exact(3) {
            let [i0, i1, i2] = [face[0] as usize, face[1] as usize, face[2] as usize];
            if i0 >= vertex_count || i1 >= vertex_count || i2 >= vertex_count {
                continue;
            }

            let p0 = self.positions[i0];
            let face_normal = (self.positions[i1] - p0).cross(self.positions[i2] - p0);

            normals[i0] += face_normal;
            normals[i1] += face_normal;
            normals[i2] += face_normal;
        }

        for normal in &mut normals {
            *normal = normal.try_normalize().unwrap_or(Vec3::Y);
        }

        self.normals = Some(normals);
    }

    /// Check if the mesh has usable per-vertex normals.
    pub fn has_normals(&self) -> bool {
        matches!(&self.normals, Some(n) if n.len() == self.positions.len())
    }

    /// Get the number of triangles in the mesh.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Get the number of vertices in the mesh.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Expand the index buffer into standalone triangles.
    ///
    /// Triangles referencing missing vertices are skipped with a warning.
    /// Vertex normals are attached only when the mesh has one per vertex.
    pub fn triangles(&self) -> Vec<TriangleData> {
        let normals = self.normals.as_deref().filter(|_| self.has_normals());
        let mut triangles = Vec::with_capacity(self.triangle_count());

        for chunk in self.indices.chunks_exact(3) {
            let idx = [chunk[0] as usize, chunk[1] as usize, chunk[2] as usize];

            if idx.iter().any(|&i| i >= self.positions.len()) {
                log::warn!(
                    "Invalid triangle indices: {:?}, vertex count: {}",
                    idx,
                    self.positions.len()
                );
                continue;
            }

            triangles.push(TriangleData {
                points: idx.map(|i| self.positions[i]),
                normals: normals.map(|n| idx.map(|i| n[i])),
            });
        }

        triangles
    }
}
