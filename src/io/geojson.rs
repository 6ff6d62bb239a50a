//! GeoJSON FeatureCollection reader and writer.
//!
//! Input features need a geometry (`Point`, `LineString` or `Polygon`) and a
//! `feature_type` property. Recognised properties fill the typed feature;
//! anything else is carried in `extra`. Features that cannot be read are
//! returned as [`MalformedFeature`] values next to the good ones.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde_json::{Map, Value, json};

use crate::core::{
    DateKind, Evidence, Feature, FeatureClass, FeatureType, GeoPoint, Geometry,
};
use crate::error::{InputError, MalformedFeature};

/// Properties read into typed fields instead of `extra`.
const RECOGNISED: &[&str] = &[
    "id",
    "source",
    "feature_type",
    "subtype",
    "name",
    "levels",
    "start_date",
    "end_date",
    "date_kind",
    "evidence",
    "confidence",
    "map_source",
];

/// Features read from one source.
#[derive(Clone, Debug, Default)]
pub struct SourceFeatures {
    /// Accepted features
    pub features: Vec<Feature>,
    /// Features skipped while reading
    pub malformed: Vec<MalformedFeature>,
}

/// Read a FeatureCollection file for `source`.
pub fn read_collection(source: &str, path: &Path) -> Result<SourceFeatures, InputError> {
    let text = fs::read_to_string(path).map_err(|e| InputError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let value: Value = serde_json::from_str(&text).map_err(|e| InputError::Json {
        path: path.to_path_buf(),
        source: e,
    })?;
    let parsed = parse_collection(source, &value)
        .map_err(|_| InputError::NotFeatureCollection(path.display().to_string()))?;
    log::info!(
        "Read {} features from {} ({} skipped)",
        parsed.features.len(),
        path.display(),
        parsed.malformed.len()
    );
    Ok(parsed)
}

/// Parse a FeatureCollection document for `source`.
pub fn parse_collection(source: &str, value: &Value) -> Result<SourceFeatures, InputError> {
    let not_collection = || InputError::NotFeatureCollection(source.to_string());
    if value.get("type").and_then(Value::as_str) != Some("FeatureCollection") {
        return Err(not_collection());
    }
    let items = value
        .get("features")
        .and_then(Value::as_array)
        .ok_or_else(not_collection)?;

    let mut out = SourceFeatures::default();
    for (index, item) in items.iter().enumerate() {
        match parse_feature(source, index, item) {
            Ok(f) => out.features.push(f),
            Err(reason) => out.malformed.push(MalformedFeature::new(source, index, reason)),
        }
    }
    Ok(out)
}

/// Parse one GeoJSON feature. The error is the reason it was skipped.
pub fn parse_feature(source: &str, index: usize, item: &Value) -> Result<Feature, String> {
    if item.get("type").and_then(Value::as_str) != Some("Feature") {
        return Err("not a GeoJSON Feature".to_string());
    }
    let geometry = item
        .get("geometry")
        .filter(|g| !g.is_null())
        .ok_or("missing geometry")
        .and_then(|g| parse_geometry(g).ok_or("unsupported or invalid geometry"))?;
    geometry.validate()?;

    let empty = Map::new();
    let props = item
        .get("properties")
        .and_then(Value::as_object)
        .unwrap_or(&empty);

    let feature_type = props
        .get("feature_type")
        .and_then(Value::as_str)
        .ok_or("missing feature_type")?;
    let feature_type = FeatureType::parse(feature_type)
        .ok_or_else(|| format!("unknown feature_type `{feature_type}`"))?;

    let local_id = item
        .get("id")
        .or_else(|| props.get("id"))
        .and_then(id_text)
        .unwrap_or_else(|| index.to_string());

    let mut class = FeatureClass::empty(feature_type);
    class.set_subtype(string_prop(props, "subtype"));
    class.set_name(string_prop(props, "name"));
    class.set_levels(
        props
            .get("levels")
            .and_then(integer)
            .and_then(|l| u32::try_from(l).ok()),
    );

    let mut feature = Feature::new(format!("{source}:{local_id}"), source, class, geometry);
    feature.start_date = year_prop(props, "start_date")?;
    feature.end_date = year_prop(props, "end_date")?;
    if !feature.dates_consistent() {
        return Err("start_date after end_date".to_string());
    }
    feature.date_kind = enum_prop::<DateKind>(props, "date_kind")?;
    feature.evidence = enum_prop::<Evidence>(props, "evidence")?;
    if let Some(c) = props.get("confidence").filter(|v| !v.is_null()) {
        let c = c.as_f64().ok_or("confidence is not a number")?;
        if !(0.0..=1.0).contains(&c) {
            return Err(format!("confidence {c} outside [0, 1]"));
        }
        feature.confidence = Some(c);
    }
    feature.map_source = string_prop(props, "map_source");
    feature.extra = props
        .iter()
        .filter(|(k, _)| !RECOGNISED.contains(&k.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect::<BTreeMap<_, _>>();

    Ok(feature)
}

fn id_text(v: &Value) -> Option<String> {
    match v {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn string_prop(props: &Map<String, Value>, key: &str) -> Option<String> {
    props
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn integer(v: &Value) -> Option<i64> {
    match v {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.round() as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Year from an integer or a date string such as `"1875"` or `"1875-03-01"`.
fn year_prop(props: &Map<String, Value>, key: &str) -> Result<Option<i32>, String> {
    let Some(v) = props.get(key).filter(|v| !v.is_null()) else {
        return Ok(None);
    };
    let year = match v {
        Value::String(s) => s
            .trim()
            .split('-')
            .next()
            .and_then(|y| y.parse::<i32>().ok()),
        other => integer(other).and_then(|y| i32::try_from(y).ok()),
    };
    year.map(Some).ok_or_else(|| format!("{key} is not a year"))
}

fn enum_prop<T: for<'de> Deserialize<'de>>(
    props: &Map<String, Value>,
    key: &str,
) -> Result<Option<T>, String> {
    match props.get(key).filter(|v| !v.is_null()) {
        None => Ok(None),
        Some(v) => T::deserialize(v)
            .map(Some)
            .map_err(|_| format!("invalid {key} `{v}`")),
    }
}

fn position(v: &Value) -> Option<GeoPoint> {
    let c = v.as_array()?;
    let lon = c.first()?.as_f64()?;
    let lat = c.get(1)?.as_f64()?;
    Some(GeoPoint::new(lon, lat))
}

fn positions(v: &Value) -> Option<Vec<GeoPoint>> {
    v.as_array()?.iter().map(position).collect()
}

/// GeoJSON geometry object to [`Geometry`]. Polygon holes are dropped.
pub fn parse_geometry(g: &Value) -> Option<Geometry> {
    let coords = g.get("coordinates")?;
    match g.get("type").and_then(Value::as_str)? {
        "Point" => position(coords).map(Geometry::Point),
        "LineString" => positions(coords).map(Geometry::LineString),
        "Polygon" => coords
            .as_array()
            .and_then(|rings| rings.first())
            .and_then(positions)
            .map(Geometry::Polygon),
        _ => None,
    }
}

/// [`Geometry`] to a GeoJSON geometry object. Polygon rings are closed.
pub fn geometry_to_json(geometry: &Geometry) -> Value {
    let pos = |p: &GeoPoint| json!([p.lon, p.lat]);
    match geometry {
        Geometry::Point(p) => json!({"type": "Point", "coordinates": pos(p)}),
        Geometry::LineString(pts) => json!({
            "type": "LineString",
            "coordinates": pts.iter().map(pos).collect::<Vec<_>>(),
        }),
        Geometry::Polygon(pts) => {
            let mut ring: Vec<Value> = pts.iter().map(pos).collect();
            if let (Some(first), Some(last)) = (pts.first(), pts.last())
                && first != last
            {
                ring.push(pos(first));
            }
            json!({"type": "Polygon", "coordinates": [ring]})
        }
    }
}

fn insert_some<T: serde::Serialize>(props: &mut Map<String, Value>, key: &str, v: &Option<T>) {
    if let Some(v) = v {
        props.insert(key.to_string(), json!(v));
    }
}

/// Output feature as a GeoJSON Feature.
pub fn feature_to_json(f: &Feature) -> Value {
    let mut props = Map::new();
    props.insert("id".into(), json!(f.id));
    props.insert("feature_type".into(), json!(f.feature_type().as_str()));
    if let Some(s) = f.class.subtype() {
        props.insert("subtype".into(), json!(s));
    }
    if let Some(n) = f.class.name() {
        props.insert("name".into(), json!(n));
    }
    if let Some(l) = f.class.levels() {
        props.insert("levels".into(), json!(l));
    }
    props.insert("source".into(), json!(f.source));
    insert_some(&mut props, "start_date", &f.start_date);
    insert_some(&mut props, "end_date", &f.end_date);
    insert_some(&mut props, "date_kind", &f.date_kind);
    insert_some(&mut props, "evidence", &f.evidence);
    insert_some(&mut props, "confidence", &f.confidence);
    insert_some(&mut props, "map_source", &f.map_source);
    props.insert("demolished".into(), json!(f.demolished));
    insert_some(&mut props, "change", &f.change);
    if !f.replaces.is_empty() {
        props.insert("replaces".into(), json!(f.replaces));
    }
    if !f.replaced_by.is_empty() {
        props.insert("replaced_by".into(), json!(f.replaced_by));
    }
    props.insert("all_sources".into(), json!(f.all_sources));
    insert_some(&mut props, "quality_tier", &f.quality_tier);
    if !f.provenance.is_empty() {
        props.insert("provenance".into(), json!(f.provenance));
    }
    for (k, v) in &f.extra {
        props.entry(k.clone()).or_insert_with(|| v.clone());
    }

    json!({
        "type": "Feature",
        "id": f.id,
        "geometry": geometry_to_json(&f.geometry),
        "properties": Value::Object(props),
    })
}

/// Features as a GeoJSON FeatureCollection.
pub fn to_collection(features: &[Feature]) -> Value {
    json!({
        "type": "FeatureCollection",
        "features": features.iter().map(feature_to_json).collect::<Vec<_>>(),
    })
}

/// Write features as a pretty-printed FeatureCollection.
pub fn write_collection(features: &[Feature], path: &Path) -> Result<(), InputError> {
    let text =
        serde_json::to_string_pretty(&to_collection(features)).map_err(|e| InputError::Json {
            path: path.to_path_buf(),
            source: e,
        })?;
    fs::write(path, text).map_err(|e| InputError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    log::info!("Wrote {} features to {}", features.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{GeometryClass, QualityTier};

    fn collection(features: Value) -> Value {
        json!({"type": "FeatureCollection", "features": features})
    }

    #[test]
    fn test_parse_recognised_properties() {
        let doc = collection(json!([{
            "type": "Feature",
            "id": 7,
            "geometry": {"type": "Point", "coordinates": [10.0, 50.0]},
            "properties": {
                "feature_type": "building",
                "subtype": "church",
                "levels": 2,
                "start_date": "1875-04-01",
                "evidence": "high",
                "date_kind": "exact",
                "architect": "Semper"
            }
        }]));

        let parsed = parse_collection("reg", &doc).unwrap();
        assert!(parsed.malformed.is_empty());
        let f = &parsed.features[0];
        assert_eq!(f.id, "reg:7");
        assert_eq!(f.source, "reg");
        assert_eq!(f.class.subtype(), Some("church"));
        assert_eq!(f.class.levels(), Some(2));
        assert_eq!(f.start_date, Some(1875));
        assert_eq!(f.evidence, Some(Evidence::High));
        assert_eq!(f.date_kind, Some(DateKind::Exact));
        assert_eq!(f.extra.get("architect"), Some(&json!("Semper")));
        assert!(!f.extra.contains_key("feature_type"));
    }

    #[test]
    fn test_missing_id_uses_index() {
        let doc = collection(json!([
            {"type": "Feature", "geometry": null, "properties": {"feature_type": "road"}},
            {
                "type": "Feature",
                "geometry": {"type": "LineString", "coordinates": [[0.0, 0.0], [0.001, 0.0]]},
                "properties": {"feature_type": "road", "name": "Mill Lane"}
            }
        ]));

        let parsed = parse_collection("osm", &doc).unwrap();
        assert_eq!(parsed.features.len(), 1);
        assert_eq!(parsed.features[0].id, "osm:1");
        assert_eq!(parsed.features[0].class.name(), Some("Mill Lane"));
        assert_eq!(parsed.malformed.len(), 1);
        assert_eq!(parsed.malformed[0].index, 0);
    }

    #[test]
    fn test_malformed_features_are_skipped() {
        let point = json!({"type": "Point", "coordinates": [0.0, 0.0]});
        let doc = collection(json!([
            {"type": "Feature", "geometry": point, "properties": {}},
            {"type": "Feature", "geometry": point, "properties": {"feature_type": "castle"}},
            {"type": "Feature", "geometry": point,
             "properties": {"feature_type": "building", "confidence": 1.5}},
            {"type": "Feature", "geometry": point,
             "properties": {"feature_type": "building", "start_date": 1900, "end_date": 1850}},
            {"type": "Feature", "geometry": {"type": "Point", "coordinates": [200.0, 0.0]},
             "properties": {"feature_type": "building"}},
            {"type": "Feature", "geometry": {"type": "MultiPoint", "coordinates": []},
             "properties": {"feature_type": "building"}},
        ]));

        let parsed = parse_collection("det", &doc).unwrap();
        assert!(parsed.features.is_empty());
        assert_eq!(parsed.malformed.len(), 6);
        assert!(parsed.malformed[0].reason.contains("feature_type"));
        assert!(parsed.malformed[2].reason.contains("confidence"));
    }

    #[test]
    fn test_not_a_collection() {
        let err = parse_collection("x", &json!({"type": "Feature"})).unwrap_err();
        assert!(matches!(err, InputError::NotFeatureCollection(_)));
    }

    #[test]
    fn test_polygon_holes_dropped_and_ring_closed_on_output() {
        let g = json!({"type": "Polygon", "coordinates": [
            [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]],
            [[0.2, 0.2], [0.3, 0.2], [0.3, 0.3], [0.2, 0.2]]
        ]});
        let geometry = parse_geometry(&g).unwrap();
        assert_eq!(geometry.class(), GeometryClass::Polygon);
        assert_eq!(geometry.vertices().len(), 4);

        let open = Geometry::Polygon(vec![
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(1.0, 0.0),
            GeoPoint::new(1.0, 1.0),
        ]);
        let out = geometry_to_json(&open);
        assert_eq!(out["coordinates"][0].as_array().unwrap().len(), 4);
    }

    #[test]
    fn test_output_properties() {
        let mut f = Feature::new(
            "osm:1",
            "osm",
            FeatureClass::empty(FeatureType::Building),
            Geometry::Point(GeoPoint::new(1.0, 2.0)),
        )
        .with_start(1875, DateKind::Exact, Evidence::High);
        f.quality_tier = Some(QualityTier::Gold);
        f.all_sources = vec!["reg".into(), "osm".into()];
        f.replaced_by = vec!["osm:2".into()];
        f.extra.insert("start_date".into(), json!("bogus"));

        let v = feature_to_json(&f);
        let props = &v["properties"];
        assert_eq!(props["id"], "osm:1");
        assert_eq!(props["start_date"], 1875);
        assert_eq!(props["date_kind"], "exact");
        assert_eq!(props["quality_tier"], "gold");
        assert_eq!(props["replaced_by"], json!(["osm:2"]));
        assert_eq!(props["demolished"], false);
        assert!(props.get("replaces").is_none());
    }
}
