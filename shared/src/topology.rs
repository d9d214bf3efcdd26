//! TopoJSON decoding.
//!
//! Thematic layers are shipped as TopoJSON topologies. The first object of
//! the topology (in document order) is converted into GeoJSON features: arcs
//! are dequantized and delta-decoded, referenced arcs are stitched into lines
//! and rings, and reversed references (`~index`) walk an arc backwards.

use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::geojson::{Feature, FeatureCollection, FeatureTag, Geometry, Position};

#[derive(Error, Debug)]
pub enum TopologyError {
    #[error("invalid topology document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("topology has no objects")]
    NoObjects,

    #[error("arc {index} out of range (topology has {len} arcs)")]
    ArcOutOfRange { index: i64, len: usize },

    #[error("unsupported geometry type: {0}")]
    UnsupportedType(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Transform {
    pub scale: [f64; 2],
    pub translate: [f64; 2],
}

impl Transform {
    fn apply(&self, x: f64, y: f64, rest: &[f64]) -> Position {
        let mut position = Vec::with_capacity(2 + rest.len());
        position.push(x * self.scale[0] + self.translate[0]);
        position.push(y * self.scale[1] + self.translate[1]);
        position.extend_from_slice(rest);
        position
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Topology {
    #[serde(default)]
    pub transform: Option<Transform>,
    #[serde(default)]
    pub arcs: Vec<Vec<Position>>,
    pub objects: Map<String, Value>,
}

/// A geometry object inside a topology.
#[derive(Debug, Clone, PartialEq)]
pub struct TopoObject {
    pub id: Option<Value>,
    pub properties: Map<String, Value>,
    pub geometry: TopoGeometry,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TopoGeometry {
    Null,
    Point(Position),
    MultiPoint(Vec<Position>),
    LineString(Vec<i64>),
    MultiLineString(Vec<Vec<i64>>),
    Polygon(Vec<Vec<i64>>),
    MultiPolygon(Vec<Vec<Vec<i64>>>),
    Collection(Vec<TopoObject>),
}

#[derive(Deserialize)]
struct RawObject {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    properties: Option<Map<String, Value>>,
    #[serde(default)]
    arcs: Option<Value>,
    #[serde(default)]
    coordinates: Option<Value>,
    #[serde(default)]
    geometries: Option<Vec<RawObject>>,
}

impl TryFrom<RawObject> for TopoObject {
    type Error = TopologyError;

    fn try_from(raw: RawObject) -> Result<Self, Self::Error> {
        let arcs = || raw.arcs.clone().unwrap_or(Value::Array(Vec::new()));
        let coordinates = || raw.coordinates.clone().unwrap_or(Value::Array(Vec::new()));

        let geometry = match raw.kind.as_deref() {
            None => TopoGeometry::Null,
            Some("Point") => TopoGeometry::Point(serde_json::from_value(coordinates())?),
            Some("MultiPoint") => TopoGeometry::MultiPoint(serde_json::from_value(coordinates())?),
            Some("LineString") => TopoGeometry::LineString(serde_json::from_value(arcs())?),
            Some("MultiLineString") => {
                TopoGeometry::MultiLineString(serde_json::from_value(arcs())?)
            }
            Some("Polygon") => TopoGeometry::Polygon(serde_json::from_value(arcs())?),
            Some("MultiPolygon") => TopoGeometry::MultiPolygon(serde_json::from_value(arcs())?),
            Some("GeometryCollection") => TopoGeometry::Collection(
                raw.geometries
                    .unwrap_or_default()
                    .into_iter()
                    .map(TopoObject::try_from)
                    .collect::<Result<_, _>>()?,
            ),
            Some(other) => return Err(TopologyError::UnsupportedType(other.to_string())),
        };

        Ok(Self {
            id: raw.id,
            properties: raw.properties.unwrap_or_default(),
            geometry,
        })
    }
}

impl Topology {
    pub fn from_json(text: &str) -> Result<Self, TopologyError> {
        Ok(serde_json::from_str(text)?)
    }

    /// The first object of the topology, in document order.
    pub fn first_object(&self) -> Result<(String, TopoObject), TopologyError> {
        let (name, value) = self.objects.iter().next().ok_or(TopologyError::NoObjects)?;
        let raw: RawObject = serde_json::from_value(value.clone())?;
        Ok((name.clone(), TopoObject::try_from(raw)?))
    }

    /// Convert one object into features. A collection yields one feature per
    /// member; any other geometry yields a single feature.
    pub fn features(&self, object: &TopoObject) -> Result<FeatureCollection, TopologyError> {
        let arcs = self.decoded_arcs();
        let features = match &object.geometry {
            TopoGeometry::Collection(members) => members
                .iter()
                .map(|member| feature(&arcs, self.transform.as_ref(), member))
                .collect::<Result<_, _>>()?,
            _ => vec![feature(&arcs, self.transform.as_ref(), object)?],
        };
        Ok(FeatureCollection {
            features,
            ..Default::default()
        })
    }

    /// Arcs in absolute coordinates.
    fn decoded_arcs(&self) -> Vec<Vec<Position>> {
        let Some(transform) = self.transform else {
            return self.arcs.clone();
        };

        self.arcs
            .iter()
            .map(|arc| {
                let (mut x, mut y) = (0.0, 0.0);
                arc.iter()
                    .filter(|p| p.len() >= 2)
                    .map(|p| {
                        x += p[0];
                        y += p[1];
                        transform.apply(x, y, &p[2..])
                    })
                    .collect()
            })
            .collect()
    }
}

/// Decode a TopoJSON document into the features of its first object.
pub fn decode_first_object(text: &str) -> Result<FeatureCollection, TopologyError> {
    let topology = Topology::from_json(text)?;
    let (_, object) = topology.first_object()?;
    topology.features(&object)
}

fn feature(
    arcs: &[Vec<Position>],
    transform: Option<&Transform>,
    object: &TopoObject,
) -> Result<Feature, TopologyError> {
    Ok(Feature {
        kind: FeatureTag::Feature,
        id: object.id.clone(),
        geometry: geometry(arcs, transform, &object.geometry)?,
        properties: object.properties.clone(),
    })
}

fn geometry(
    arcs: &[Vec<Position>],
    transform: Option<&Transform>,
    topo: &TopoGeometry,
) -> Result<Option<Geometry>, TopologyError> {
    let point = |p: &Position| match (transform, p.as_slice()) {
        (Some(t), [x, y, rest @ ..]) => t.apply(*x, *y, rest),
        _ => p.clone(),
    };

    let decoded = match topo {
        TopoGeometry::Null => return Ok(None),
        TopoGeometry::Point(p) => Geometry::Point {
            coordinates: point(p),
        },
        TopoGeometry::MultiPoint(points) => Geometry::MultiPoint {
            coordinates: points.iter().map(point).collect(),
        },
        TopoGeometry::LineString(refs) => Geometry::LineString {
            coordinates: line(arcs, refs)?,
        },
        TopoGeometry::MultiLineString(lines) => Geometry::MultiLineString {
            coordinates: lines
                .iter()
                .map(|refs| line(arcs, refs))
                .collect::<Result<_, _>>()?,
        },
        TopoGeometry::Polygon(rings) => Geometry::Polygon {
            coordinates: polygon(arcs, rings)?,
        },
        TopoGeometry::MultiPolygon(polygons) => Geometry::MultiPolygon {
            coordinates: polygons
                .iter()
                .map(|rings| polygon(arcs, rings))
                .collect::<Result<_, _>>()?,
        },
        TopoGeometry::Collection(members) => Geometry::GeometryCollection {
            geometries: members
                .iter()
                .map(|member| geometry(arcs, transform, &member.geometry))
                .filter_map(Result::transpose)
                .collect::<Result<_, _>>()?,
        },
    };
    Ok(Some(decoded))
}

fn polygon(arcs: &[Vec<Position>], rings: &[Vec<i64>]) -> Result<Vec<Vec<Position>>, TopologyError> {
    rings.iter().map(|refs| ring(arcs, refs)).collect()
}

/// Stitch arc references into one line. Consecutive arcs share an endpoint,
/// which is kept once.
fn stitch(arcs: &[Vec<Position>], refs: &[i64]) -> Result<Vec<Position>, TopologyError> {
    let mut points: Vec<Position> = Vec::new();
    for &reference in refs {
        let (index, reversed) = if reference < 0 {
            (!reference, true)
        } else {
            (reference, false)
        };
        let arc = usize::try_from(index)
            .ok()
            .and_then(|i| arcs.get(i))
            .ok_or(TopologyError::ArcOutOfRange {
                index: reference,
                len: arcs.len(),
            })?;

        points.pop();
        let start = points.len();
        points.extend(arc.iter().cloned());
        if reversed {
            points[start..].reverse();
        }
    }
    Ok(points)
}

fn line(arcs: &[Vec<Position>], refs: &[i64]) -> Result<Vec<Position>, TopologyError> {
    let mut points = stitch(arcs, refs)?;
    if points.len() == 1 {
        points.push(points[0].clone());
    }
    Ok(points)
}

/// Rings are padded to the four positions GeoJSON requires.
fn ring(arcs: &[Vec<Position>], refs: &[i64]) -> Result<Vec<Position>, TopologyError> {
    let mut points = line(arcs, refs)?;
    if let Some(first) = points.first().cloned() {
        while points.len() < 4 {
            points.push(first.clone());
        }
    }
    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::{TopologyError, Topology, decode_first_object};
    use crate::geojson::Geometry;

    // Two unit squares sharing the edge x = 1, quantized with a 0.5 scale.
    const TWO_SQUARES: &str = r#"{
        "type": "Topology",
        "transform": {"scale": [0.5, 0.5], "translate": [10.0, 44.0]},
        "objects": {
            "zones": {
                "type": "GeometryCollection",
                "geometries": [
                    {"type": "Polygon", "arcs": [[0, 1]], "properties": {"class": 0}, "id": "a"},
                    {"type": "Polygon", "arcs": [[2, -1]], "properties": {"class": 7}},
                    {"type": null, "properties": {"class": 1}}
                ]
            },
            "ignored": {"type": "Point", "coordinates": [0, 0]}
        },
        "arcs": [
            [[2, 0], [0, 2]],
            [[2, 2], [-2, 0], [0, -2], [2, 0]],
            [[2, 0], [2, 0], [0, 2], [-2, 0]]
        ]
    }"#;

    fn polygon_rings(geometry: &Option<Geometry>) -> &Vec<Vec<Vec<f64>>> {
        match geometry {
            Some(Geometry::Polygon { coordinates }) => coordinates,
            other => panic!("expected polygon, got {other:?}"),
        }
    }

    #[test]
    fn decodes_first_object_into_features() {
        let collection = decode_first_object(TWO_SQUARES).expect("topology should decode");
        assert_eq!(collection.features.len(), 3);

        let first = &collection.features[0];
        assert_eq!(first.properties["class"], 0);
        assert_eq!(first.id, Some(serde_json::json!("a")));
        assert_eq!(
            polygon_rings(&first.geometry)[0],
            vec![
                vec![11.0, 44.0],
                vec![11.0, 45.0],
                vec![10.0, 45.0],
                vec![10.0, 44.0],
                vec![11.0, 44.0],
            ]
        );

        assert_eq!(collection.features[2].geometry, None);
        assert_eq!(collection.features[2].properties["class"], 1);
    }

    #[test]
    fn reversed_arc_reference_walks_backwards() {
        let collection = decode_first_object(TWO_SQUARES).expect("topology should decode");
        let second = &collection.features[1];
        assert_eq!(second.properties["class"], 7);
        assert_eq!(
            polygon_rings(&second.geometry)[0],
            vec![
                vec![11.0, 44.0],
                vec![12.0, 44.0],
                vec![12.0, 45.0],
                vec![11.0, 45.0],
                vec![11.0, 44.0],
            ]
        );
    }

    #[test]
    fn nested_collection_keeps_members_and_skips_null_ones() {
        let text = r#"{
            "type": "Topology",
            "objects": {"mixed": {"type": "GeometryCollection", "geometries": [
                {"type": "GeometryCollection", "properties": {"class": 2}, "geometries": [
                    {"type": "Point", "coordinates": [11.3, 44.5]},
                    {"type": null},
                    {"type": "LineString", "arcs": [0]}
                ]}
            ]}},
            "arcs": [[[11.0, 44.0], [11.5, 44.5]]]
        }"#;
        let collection = decode_first_object(text).expect("decode");
        assert_eq!(collection.features.len(), 1);
        assert_eq!(collection.features[0].properties["class"], 2);
        assert_eq!(
            collection.features[0].geometry,
            Some(Geometry::GeometryCollection {
                geometries: vec![
                    Geometry::Point {
                        coordinates: vec![11.3, 44.5],
                    },
                    Geometry::LineString {
                        coordinates: vec![vec![11.0, 44.0], vec![11.5, 44.5]],
                    },
                ],
            })
        );
    }

    #[test]
    fn first_object_follows_document_order() {
        let topology = Topology::from_json(TWO_SQUARES).expect("parse");
        let (name, _) = topology.first_object().expect("object");
        assert_eq!(name, "zones");
    }

    #[test]
    fn untransformed_topology_uses_absolute_arcs() {
        let text = r#"{
            "type": "Topology",
            "objects": {"line": {"type": "LineString", "arcs": [0, 1]}},
            "arcs": [[[0, 0], [1, 1]], [[1, 1], [2, 0]]]
        }"#;
        let collection = decode_first_object(text).expect("decode");
        assert_eq!(collection.features.len(), 1);
        assert_eq!(
            collection.features[0].geometry,
            Some(Geometry::LineString {
                coordinates: vec![vec![0.0, 0.0], vec![1.0, 1.0], vec![2.0, 0.0]],
            })
        );
    }

    #[test]
    fn degenerate_ring_is_padded_to_four_positions() {
        let text = r#"{
            "type": "Topology",
            "objects": {"p": {"type": "Polygon", "arcs": [[0]]}},
            "arcs": [[[5, 5]]]
        }"#;
        let collection = decode_first_object(text).expect("decode");
        let rings = polygon_rings(&collection.features[0].geometry);
        assert_eq!(rings[0].len(), 4);
        assert!(rings[0].iter().all(|p| p == &vec![5.0, 5.0]));
    }

    #[test]
    fn arc_out_of_range_is_an_error() {
        let text = r#"{
            "type": "Topology",
            "objects": {"p": {"type": "Polygon", "arcs": [[3]]}},
            "arcs": [[[0, 0], [1, 0], [1, 1], [0, 0]]]
        }"#;
        assert!(matches!(
            decode_first_object(text),
            Err(TopologyError::ArcOutOfRange { index: 3, len: 1 })
        ));
    }

    #[test]
    fn empty_objects_and_bad_json_are_errors() {
        assert!(matches!(
            decode_first_object(r#"{"type": "Topology", "objects": {}, "arcs": []}"#),
            Err(TopologyError::NoObjects)
        ));
        assert!(matches!(
            decode_first_object("<html>not found</html>"),
            Err(TopologyError::Json(_))
        ));
    }

    #[test]
    fn unknown_geometry_type_is_rejected() {
        let text = r#"{"type": "Topology", "objects": {"x": {"type": "Sphere"}}, "arcs": []}"#;
        assert!(matches!(
            decode_first_object(text),
            Err(TopologyError::UnsupportedType(kind)) if kind == "Sphere"
        ));
    }
}
