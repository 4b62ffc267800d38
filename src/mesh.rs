//! Wavefront OBJ loading. Resolves face indices into the flat vertex list the
//! render pipeline consumes, three vertices per triangle.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use nalgebra as na;
use na::{vector, Vector3};
use obj::raw::object::Polygon;
use obj::raw::{parse_obj, RawObj};
use thiserror::Error;

use crate::scene::{Color, ShadingAttribute, Vertex};

/// Errors that can occur when loading a mesh.
#[derive(Debug, Error)]
pub enum MeshError {
    #[error("failed to open {path}: {source}")]
    Open { path: PathBuf, source: std::io::Error },

    #[error("malformed OBJ data: {0}")]
    Parse(obj::ObjError),

    /// A face refers to a position, texture coordinate or normal that was
    /// never defined (or to index 0).
    #[error("face index out of range: {0}")]
    IndexOutOfRange(obj::LoadError),
}

impl From<obj::ObjError> for MeshError {
    fn from(err: obj::ObjError) -> Self {
        match err {
            obj::ObjError::Load(load) if *load.kind() == obj::LoadErrorKind::IndexOutOfRange => {
                return MeshError::IndexOutOfRange(load);
            }
            other => return MeshError::Parse(other),
        }
    }
}

/// Which shading attribute the loaded vertices carry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AttributeSource {
    /// Per-corner normals from `vn` records. Faces without normals get their
    /// geometric face normal.
    Normals,
    /// Every vertex gets the same color.
    FlatColor(Color),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshOptions {
    pub scale: f32, // Applied to positions only.
    pub attribute: AttributeSource,
}

impl Default for MeshOptions {
    fn default() -> Self {
        return Self {
            scale: 1.0,
            attribute: AttributeSource::Normals,
        };
    }
}

/// Triangulated mesh, ready to be rendered.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<Vertex>, // Three per triangle, in face order.
    pub position_count: usize,
    pub normal_count: usize,
    pub tex_coord_count: usize,
    pub face_count: usize,
}

impl Mesh {
    pub fn triangle_count(&self) -> usize {
        return self.vertices.len() / 3;
    }
}

/// Loads and triangulates the OBJ file at `path`.
pub fn load_mesh(path: &Path, options: &MeshOptions) -> Result<Mesh, MeshError> {
    let file = File::open(path).map_err(|source| MeshError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    return parse_mesh(BufReader::new(file), options);
}

/// Same as `load_mesh`, reading OBJ text from any buffered reader.
pub fn parse_mesh<R: BufRead>(reader: R, options: &MeshOptions) -> Result<Mesh, MeshError> {
    let raw: RawObj = parse_obj(reader)?;
    let mut vertices = Vec::with_capacity(3 * raw.polygons.len());
    let mut face_count = 0;

    for polygon in &raw.polygons {
        let corners = polygon_corners(polygon);
        if corners.len() < 3 {
            log::warn!("skipping face with {} corners", corners.len());
            continue;
        }
        face_count += 1;

        let mut positions = Vec::with_capacity(corners.len());
        for &(position_index, _) in &corners {
            positions.push(position_at(&raw, position_index) * options.scale);
        }

        // Fan triangulation around the first corner.
        for i in 1..corners.len() - 1 {
            let fan = [0, i, i + 1];
            let face_normal = (positions[fan[1]] - positions[fan[0]]).cross(&(positions[fan[2]] - positions[fan[0]]));
            for corner in fan {
                let attribute = match options.attribute {
                    AttributeSource::FlatColor(color) => ShadingAttribute::FlatColor(color),
                    AttributeSource::Normals => match corners[corner].1 {
                        Some(normal_index) => ShadingAttribute::Normal(normal_at(&raw, normal_index)),
                        None => ShadingAttribute::Normal(face_normal.try_normalize(f32::EPSILON).unwrap_or(face_normal)),
                    },
                };
                vertices.push(Vertex::new(positions[corner], attribute));
            }
        }
    }

    return Ok(Mesh {
        vertices,
        position_count: raw.positions.len(),
        normal_count: raw.normals.len(),
        tex_coord_count: raw.tex_coords.len(),
        face_count,
    });
}

/// Position index and optional normal index for every corner of a face.
fn polygon_corners(polygon: &Polygon) -> Vec<(usize, Option<usize>)> {
    match polygon {
        Polygon::P(corners) => corners.iter().map(|&p| (p, None)).collect(),
        Polygon::PT(corners) => corners.iter().map(|&(p, _)| (p, None)).collect(),
        Polygon::PN(corners) => corners.iter().map(|&(p, n)| (p, Some(n))).collect(),
        Polygon::PTN(corners) => corners.iter().map(|&(p, _, n)| (p, Some(n))).collect(),
    }
}

// `parse_obj` range-checks every face index, so the lookups below are in bounds.
fn position_at(raw: &RawObj, index: usize) -> Vector3<f32> {
    let (x, y, z, _) = raw.positions[index];
    return vector![x, y, z];
}

fn normal_at(raw: &RawObj, index: usize) -> Vector3<f32> {
    let (x, y, z) = raw.normals[index];
    return vector![x, y, z];
}
