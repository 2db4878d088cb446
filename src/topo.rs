//! TopoJSON land topology.
//!
//! Decodes the quantized, delta-encoded arcs of one named object into plain
//! lon/lat rings. Only what the map needs: polygon outlines and their bounds.

use crate::error::ProjectionError;
use crate::projection::Bounds;
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Deserialize)]
struct Topology {
    #[serde(default)]
    transform: Option<Transform>,
    objects: HashMap<String, Geometry>,
    arcs: Vec<Vec<Vec<f64>>>,
}

#[derive(Debug, Deserialize)]
struct Transform {
    scale: [f64; 2],
    translate: [f64; 2],
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum Geometry {
    GeometryCollection { geometries: Vec<Geometry> },
    Polygon { arcs: Vec<Vec<i64>> },
    MultiPolygon { arcs: Vec<Vec<Vec<i64>>> },
    LineString { arcs: Vec<i64> },
    MultiLineString { arcs: Vec<Vec<i64>> },
    #[serde(other)]
    Other,
}

/// Decoded land outlines.
#[derive(Clone, Debug, PartialEq)]
pub struct LandTopology {
    pub rings: Vec<Vec<(f64, f64)>>,
    pub bounds: Bounds,
}

impl LandTopology {
    pub fn from_reader(reader: impl std::io::Read, object: &str) -> Result<Self, ProjectionError> {
        let topology: Topology =
            serde_json::from_reader(reader).map_err(|e| ProjectionError::Parse(e.to_string()))?;
        Self::decode(topology, object)
    }

    fn decode(topology: Topology, object: &str) -> Result<Self, ProjectionError> {
        let arcs = decode_arcs(&topology.arcs, topology.transform.as_ref());
        let geometry = topology
            .objects
            .get(object)
            .ok_or_else(|| ProjectionError::MissingObject(object.to_string()))?;

        let mut rings = Vec::new();
        collect_rings(geometry, &arcs, &mut rings)?;
        rings.retain(|r| !r.is_empty());

        let mut bounds = Bounds::empty();
        for &(lon, lat) in rings.iter().flatten() {
            bounds.include(lon, lat);
        }
        if bounds.is_empty() {
            return Err(ProjectionError::Empty);
        }

        Ok(Self { rings, bounds })
    }

    pub fn point_count(&self) -> usize {
        self.rings.iter().map(Vec::len).sum()
    }
}

/// Absolute lon/lat positions for every arc.
fn decode_arcs(arcs: &[Vec<Vec<f64>>], transform: Option<&Transform>) -> Vec<Vec<(f64, f64)>> {
    arcs.iter()
        .map(|arc| {
            let mut x = 0.0;
            let mut y = 0.0;
            arc.iter()
                .filter(|pos| pos.len() >= 2)
                .map(|pos| match transform {
                    Some(t) => {
                        x += pos[0];
                        y += pos[1];
                        (x * t.scale[0] + t.translate[0], y * t.scale[1] + t.translate[1])
                    }
                    None => (pos[0], pos[1]),
                })
                .collect()
        })
        .collect()
}

/// Join arc references into one line. A negative index `!i` is arc `i` reversed.
fn stitch(indices: &[i64], arcs: &[Vec<(f64, f64)>]) -> Result<Vec<(f64, f64)>, ProjectionError> {
    let mut line: Vec<(f64, f64)> = Vec::new();
    for &index in indices {
        let (arc_index, reversed) = if index < 0 { (!index, true) } else { (index, false) };
        let arc = arcs
            .get(arc_index as usize)
            .ok_or_else(|| ProjectionError::Parse(format!("arc index {index} out of range")))?;

        let points: Vec<(f64, f64)> = if reversed {
            arc.iter().rev().copied().collect()
        } else {
            arc.clone()
        };
        // Consecutive arcs share their joining vertex
        let skip = usize::from(!line.is_empty());
        line.extend(points.into_iter().skip(skip));
    }
    Ok(line)
}

fn collect_rings(
    geometry: &Geometry,
    arcs: &[Vec<(f64, f64)>],
    rings: &mut Vec<Vec<(f64, f64)>>,
) -> Result<(), ProjectionError> {
    match geometry {
        Geometry::GeometryCollection { geometries } => {
            for g in geometries {
                collect_rings(g, arcs, rings)?;
            }
        }
        Geometry::Polygon { arcs: polygon } => {
            for ring in polygon {
                rings.push(stitch(ring, arcs)?);
            }
        }
        Geometry::MultiPolygon { arcs: polygons } => {
            for ring in polygons.iter().flatten() {
                rings.push(stitch(ring, arcs)?);
            }
        }
        Geometry::LineString { arcs: line } => rings.push(stitch(line, arcs)?),
        Geometry::MultiLineString { arcs: lines } => {
            for line in lines {
                rings.push(stitch(line, arcs)?);
            }
        }
        Geometry::Other => {}
    }
    Ok(())
}
