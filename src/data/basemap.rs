use anyhow::Result;
use geojson::{GeoJson, Geometry, Value};
use std::fs;
use std::path::Path;

/// A geographic line as a sequence of (lon, lat) points.
pub type LineString = Vec<(f64, f64)>;

/// Load boundary lines from an optional GeoJSON file for the base-map
/// layer. A missing file is not an error; the caller falls back to a
/// graticule.
pub fn load_basemap(path: &Path) -> Result<Vec<LineString>> {
    let content = fs::read_to_string(path)?;
    let geojson: GeoJson = content.parse()?;

    let mut lines = Vec::new();
    collect_lines(&geojson, &mut lines);
    Ok(lines)
}

fn collect_lines(geojson: &GeoJson, out: &mut Vec<LineString>) {
    match geojson {
        GeoJson::FeatureCollection(fc) => {
            for feature in &fc.features {
                if let Some(ref geometry) = feature.geometry {
                    collect_geometry_lines(geometry, out);
                }
            }
        }
        GeoJson::Feature(f) => {
            if let Some(ref geometry) = f.geometry {
                collect_geometry_lines(geometry, out);
            }
        }
        GeoJson::Geometry(geometry) => collect_geometry_lines(geometry, out),
    }
}

fn collect_geometry_lines(geometry: &Geometry, out: &mut Vec<LineString>) {
    let to_line = |coords: &Vec<Vec<f64>>| -> LineString {
        coords.iter().map(|c| (c[0], c[1])).collect()
    };

    match &geometry.value {
        Value::LineString(coords) => out.push(to_line(coords)),
        Value::MultiLineString(lines) => {
            for coords in lines {
                out.push(to_line(coords));
            }
        }
        Value::Polygon(rings) => {
            if let Some(exterior) = rings.first() {
                out.push(to_line(exterior));
            }
        }
        Value::MultiPolygon(polygons) => {
            for rings in polygons {
                if let Some(exterior) = rings.first() {
                    out.push(to_line(exterior));
                }
            }
        }
        Value::GeometryCollection(geometries) => {
            for g in geometries {
                collect_geometry_lines(g, out);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_linestring() {
        let geojson: GeoJson = r#"{
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "properties": {},
                "geometry": {
                    "type": "LineString",
                    "coordinates": [[-84.5, 36.0], [-84.4, 36.1]]
                }
            }]
        }"#
        .parse()
        .unwrap();

        let mut lines = Vec::new();
        collect_lines(&geojson, &mut lines);
        assert_eq!(lines, vec![vec![(-84.5, 36.0), (-84.4, 36.1)]]);
    }

    #[test]
    fn test_polygon_exterior_only() {
        let geojson: GeoJson = r#"{
            "type": "Polygon",
            "coordinates": [
                [[-85.0, 35.0], [-84.0, 35.0], [-84.0, 36.0], [-85.0, 35.0]],
                [[-84.8, 35.2], [-84.2, 35.2], [-84.8, 35.2]]
            ]
        }"#
        .parse()
        .unwrap();

        let mut lines = Vec::new();
        collect_lines(&geojson, &mut lines);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].len(), 4);
    }
}
