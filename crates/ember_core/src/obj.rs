//! Wavefront OBJ import.
//!
//! Every model in the file is merged into one [`Mesh`]. Faces are
//! triangulated by `tobj`; vertex normals survive only if every model in
//! the file provides them.

use std::io::BufRead;
use std::path::{Path, PathBuf};

use ember_math::Vec3;

use crate::error::{LoadError, LoadResult};
use crate::mesh::Mesh;

fn load_options() -> tobj::LoadOptions {
    tobj::LoadOptions {
        single_index: true,
        triangulate: true,
        ..Default::default()
    }
}

/// Load an OBJ file from disk.
pub fn load_obj<P: AsRef<Path>>(path: P) -> LoadResult<Mesh> {
    let path = path.as_ref();
    log::info!("Loading model {}", path.display());

    let (models, _materials) =
        tobj::load_obj(path, &load_options()).map_err(|source| LoadError::Obj {
            path: path.to_path_buf(),
            source,
        })?;

    merge_models(&models, path)
}

/// Parse OBJ data from any buffered reader. `name` is used in errors.
///
/// Material libraries are not followed; surfaces get their material from
/// the scene file.
pub fn parse_obj<R: BufRead>(reader: &mut R, name: &str) -> LoadResult<Mesh> {
    let path = PathBuf::from(name);
    let (models, _materials) =
        tobj::load_obj_buf(reader, &load_options(), |_| Err(tobj::LoadError::OpenFileFailed))
            .map_err(|source| LoadError::Obj {
                path: path.clone(),
                source,
            })?;

    merge_models(&models, &path)
}

fn merge_models(models: &[tobj::Model], path: &Path) -> LoadResult<Mesh> {
    let mut positions = Vec::new();
    let mut normals = Vec::new();
    let mut indices = Vec::new();
    let mut all_have_normals = true;

    for model in models {
        let mesh = &model.mesh;
        let base = positions.len() as u32;
        let vertex_count = mesh.positions.len() / 3;

        positions.extend(
            mesh.positions
                .chunks_exact(3)
                .map(|p| Vec3::new(p[0], p[1], p[2])),
        );

        if mesh.normals.len() == mesh.positions.len() {
            normals.extend(
                mesh.normals
                    .chunks_exact(3)
                    .map(|n| Vec3::new(n[0], n[1], n[2]).normalize_or_zero()),
            );
        } else {
            if !mesh.normals.is_empty() {
                log::debug!(
                    "Model '{}' has {} normals for {} vertices, ignoring them",
                    model.name,
                    mesh.normals.len() / 3,
                    vertex_count
                );
            }
            all_have_normals = false;
        }

        indices.extend(mesh.indices.iter().map(|i| base + i));
    }

    if indices.len() < 3 {
        return Err(LoadError::EmptyModel(path.to_path_buf()));
    }

    let normals = (all_have_normals && normals.len() == positions.len()).then_some(normals);
    let mesh = Mesh::new(positions, indices, normals);

    log::info!(
        "Loaded {} triangles ({} vertices, normals: {}) from {}",
        mesh.triangle_count(),
        mesh.vertex_count(),
        mesh.has_normals(),
        path.display()
    );

    Ok(mesh)
}
