use geojson::{Feature, Geometry, Value};
use gloo_net::http::Request;

/// Closed ring of `[longitude, latitude]` positions.
pub type Ring = Vec<[f64; 2]>;

/// Outer ring followed by its holes.
pub type Polygon = Vec<Ring>;

/// A named country outline from the geography dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct CountryFeature {
    pub name: String,
    /// ISO codes found in the feature properties (`iso_a2`, `iso_a3`).
    pub codes: Vec<String>,
    pub polygons: Vec<Polygon>,
}

impl CountryFeature {
    pub fn code_refs(&self) -> Vec<&str> {
        self.codes.iter().map(String::as_str).collect()
    }

    pub fn positions(&self) -> impl Iterator<Item = [f64; 2]> + '_ {
        self.polygons
            .iter()
            .flat_map(|polygon| polygon.iter())
            .flat_map(|ring| ring.iter().copied())
    }
}

/// The feature collection drawn on the map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Geography {
    pub features: Vec<CountryFeature>,
}

#[derive(Debug, thiserror::Error)]
pub enum GeographyError {
    #[error("HTTP Status: {status} (Datei nicht gefunden)")]
    Status { status: u16 },
    #[error("Verbindungsfehler: {0}")]
    Network(String),
    #[error("Ungültiges Kartenformat erhalten")]
    MissingFeatures,
    #[error("Kartendaten konnten nicht gelesen werden: {0}")]
    Parse(#[from] serde_json::Error),
}

impl Geography {
    /// Parses a GeoJSON feature collection. Only checks that a `features`
    /// array is present. Features without polygon geometry are kept with no
    /// outline; features that are not valid GeoJSON are skipped.
    pub fn from_json(text: &str) -> Result<Self, GeographyError> {
        let value: serde_json::Value = serde_json::from_str(text)?;
        Self::from_value(value)
    }

    pub fn from_value(mut value: serde_json::Value) -> Result<Self, GeographyError> {
        let entries = match value.get_mut("features").map(serde_json::Value::take) {
            Some(serde_json::Value::Array(entries)) => entries,
            _ => return Err(GeographyError::MissingFeatures),
        };

        // A malformed feature loses its outline, not the whole map.
        let features = entries
            .into_iter()
            .enumerate()
            .filter_map(|(index, entry)| match serde_json::from_value::<Feature>(entry) {
                Ok(feature) => Some(feature),
                Err(error) => {
                    log::warn!("skipping map feature {}: {}", index, error);
                    None
                }
            })
            .map(|feature| {
                let name = feature
                    .property("name")
                    .and_then(|value| value.as_str())
                    .unwrap_or_default()
                    .to_string();

                let codes = ["iso_a2", "iso_a3"]
                    .iter()
                    .filter_map(|key| feature.property(*key))
                    .filter_map(|value| value.as_str())
                    .filter(|code| !code.is_empty() && *code != "-99")
                    .map(str::to_string)
                    .collect();

                let mut polygons = Vec::new();
                if let Some(geometry) = &feature.geometry {
                    collect_polygons(geometry, &mut polygons);
                }

                CountryFeature {
                    name,
                    codes,
                    polygons,
                }
            })
            .collect();

        Ok(Self { features })
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

fn collect_polygons(geometry: &Geometry, polygons: &mut Vec<Polygon>) {
    match &geometry.value {
        Value::Polygon(rings) => polygons.push(convert_rings(rings)),
        Value::MultiPolygon(parts) => polygons.extend(parts.iter().map(|rings| convert_rings(rings))),
        Value::GeometryCollection(children) => {
            for child in children {
                collect_polygons(child, polygons);
            }
        }
        _ => {}
    }
}

fn convert_rings(rings: &[Vec<Vec<f64>>]) -> Polygon {
    rings
        .iter()
        .map(|ring| {
            ring.iter()
                .filter(|position| position.len() >= 2)
                .map(|position| [position[0], position[1]])
                .collect()
        })
        .collect()
}

/// Downloads and parses the geography file.
pub async fn fetch_geography(url: &str) -> Result<Geography, GeographyError> {
    let response = Request::get(url)
        .send()
        .await
        .map_err(|error| GeographyError::Network(error.to_string()))?;

    if !response.ok() {
        return Err(GeographyError::Status {
            status: response.status(),
        });
    }

    let value = response
        .json::<serde_json::Value>()
        .await
        .map_err(|error| GeographyError::Network(error.to_string()))?;

    Geography::from_value(value)
}
