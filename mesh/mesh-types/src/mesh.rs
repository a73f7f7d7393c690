//! Flat triangle-buffer mesh.

use nalgebra::Point3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{Aabb, Facet, Orientation};

/// A triangle mesh stored as an ordered, append-only buffer of facets.
///
/// Facets are addressed by their index in `facets` everywhere in the
/// pipeline (overhang sets, face picks). There is no shared vertex table:
/// uploaded STL files do not carry one, and the quoting stages only ever
/// need per-facet geometry.
///
/// # Example
///
/// ```
/// use mesh_types::{Point3, TriangleMesh};
///
/// let cube = TriangleMesh::axis_aligned_box(
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(10.0, 10.0, 10.0),
/// );
///
/// assert_eq!(cube.facet_count(), 12);
/// assert!((cube.surface_area() - 600.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TriangleMesh {
    /// Facets in file order.
    pub facets: Vec<Facet>,
}

impl TriangleMesh {
    /// Create an empty mesh.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self { facets: Vec::new() }
    }

    /// Create an empty mesh with room for `facet_count` facets.
    #[inline]
    #[must_use]
    pub fn with_capacity(facet_count: usize) -> Self {
        Self {
            facets: Vec::with_capacity(facet_count),
        }
    }

    /// Wrap an existing facet buffer.
    #[inline]
    #[must_use]
    pub const fn from_facets(facets: Vec<Facet>) -> Self {
        Self { facets }
    }

    /// Append a triangle, computing its normal from the winding.
    ///
    /// Returns the index of the new facet.
    pub fn push_triangle(&mut self, v0: Point3<f64>, v1: Point3<f64>, v2: Point3<f64>) -> usize {
        self.facets.push(Facet::new([v0, v1, v2]));
        self.facets.len() - 1
    }

    /// Number of facets.
    #[inline]
    #[must_use]
    pub fn facet_count(&self) -> usize {
        self.facets.len()
    }

    /// True when the mesh has no facets.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.facets.is_empty()
    }

    /// Facet by index.
    #[inline]
    #[must_use]
    pub fn facet(&self, index: usize) -> Option<&Facet> {
        self.facets.get(index)
    }

    /// Number of facets with a zero normal.
    #[must_use]
    pub fn degenerate_count(&self) -> usize {
        self.facets.iter().filter(|f| f.is_degenerate()).count()
    }

    /// Total surface area.
    #[must_use]
    pub fn surface_area(&self) -> f64 {
        self.facets.iter().map(Facet::area).sum()
    }

    /// Bounding box of every corner in local space.
    #[must_use]
    pub fn bounds(&self) -> Aabb {
        Aabb::from_points(self.facets.iter().flat_map(|f| f.vertices.iter()))
    }

    /// Bounding box after rotating by `orientation`.
    #[must_use]
    pub fn oriented_bounds(&self, orientation: &Orientation) -> Aabb {
        let mut aabb = Aabb::empty();
        for facet in &self.facets {
            for v in &facet.vertices {
                aabb.expand_to_include(&orientation.rotate_point(v));
            }
        }
        aabb
    }

    /// Enclosed volume via the divergence theorem.
    ///
    /// Only meaningful for closed, consistently wound meshes; open meshes
    /// give an approximation.
    #[must_use]
    pub fn signed_volume(&self) -> f64 {
        self.facets
            .iter()
            .map(|f| {
                let [a, b, c] = f.vertices;
                a.coords.dot(&b.coords.cross(&c.coords))
            })
            .sum::<f64>()
            / 6.0
    }

    /// Closed box between two corners with outward-facing normals.
    #[must_use]
    pub fn axis_aligned_box(min: Point3<f64>, max: Point3<f64>) -> Self {
        let (x0, y0, z0) = (min.x, min.y, min.z);
        let (x1, y1, z1) = (max.x, max.y, max.z);
        let p = [
            Point3::new(x0, y0, z0),
            Point3::new(x1, y0, z0),
            Point3::new(x1, y0, z1),
            Point3::new(x0, y0, z1),
            Point3::new(x0, y1, z0),
            Point3::new(x1, y1, z0),
            Point3::new(x1, y1, z1),
            Point3::new(x0, y1, z1),
        ];

        let faces: [[usize; 3]; 12] = [
            // Bottom (-Y)
            [0, 1, 2],
            [0, 2, 3],
            // Top (+Y)
            [4, 6, 5],
            [4, 7, 6],
            // Front (-Z)
            [0, 4, 5],
            [0, 5, 1],
            // Back (+Z)
            [3, 2, 6],
            [3, 6, 7],
            // Left (-X)
            [0, 3, 7],
            [0, 7, 4],
            // Right (+X)
            [1, 5, 6],
            [1, 6, 2],
        ];

        Self::from_facets(
            faces
                .iter()
                .map(|&[a, b, c]| Facet::new([p[a], p[b], p[c]]))
                .collect(),
        )
    }
}
