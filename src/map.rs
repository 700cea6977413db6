use crate::geography::Geography;
use crate::projection::Projection;
use crate::territory::TerritoryTable;

pub const MAP_WIDTH: f64 = 600.0;
pub const MAP_HEIGHT: f64 = 650.0;

pub const COLOR_BASE: &str = "#e2e8f0";
pub const COLOR_BRITISH: &str = "#fca5a5";
pub const COLOR_HOVER: &str = "#ef4444";
pub const COLOR_SELECTED: &str = "#991b1b";

const STROKE_BASE: &str = "#cbd5e1";
const STROKE_BRITISH: &str = "#fca5a5";
const STROKE_ACTIVE: &str = "#fff";

/// One drawable country outline.
#[derive(Debug, Clone, PartialEq)]
pub struct MapShape {
    /// Name as found in the geography dataset.
    pub feature_name: String,
    /// Canonical territory name when the feature could be resolved.
    pub territory: Option<String>,
    /// Canonical colony name for British-administered territories.
    pub colony: Option<String>,
    pub german_name: String,
    /// SVG path data in map coordinates.
    pub path: String,
}

impl MapShape {
    pub fn is_colony(&self) -> bool {
        self.colony.is_some()
    }

    /// Accessible label, marked for colonies.
    pub fn label(&self) -> String {
        if self.is_colony() {
            format!("{} (Britisch)", self.german_name)
        } else {
            self.german_name.clone()
        }
    }

    pub fn is_selected(&self, selected: Option<&str>) -> bool {
        match selected {
            Some(name) => {
                self.feature_name == name
                    || self.territory.as_deref() == Some(name)
                    || self.colony.as_deref() == Some(name)
            }
            None => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeStyle {
    pub fill: &'static str,
    pub stroke: &'static str,
    pub stroke_width: u8,
    pub fill_opacity: f64,
    pub interactive: bool,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum MapError {
    #[error("Karte enthält keine darstellbaren Länder")]
    NothingToDraw,
}

/// Projected, classified map ready for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct MapModel {
    shapes: Vec<MapShape>,
}

impl MapModel {
    /// Projects the geography onto the map surface and classifies every
    /// feature against the territory table. Ambiguous names are logged and
    /// drawn as ordinary countries.
    pub fn build(geography: &Geography, territories: &TerritoryTable) -> Result<Self, MapError> {
        let projection = Projection::fit_size(
            MAP_WIDTH,
            MAP_HEIGHT,
            geography.features.iter().flat_map(|feature| feature.positions()),
        )
        .ok_or(MapError::NothingToDraw)?;

        let shapes = geography
            .features
            .iter()
            .map(|feature| {
                let resolved = match territories.resolve(&feature.name, &feature.code_refs()) {
                    Ok(found) => found,
                    Err(error) => {
                        log::warn!("treating {:?} as non-colony: {}", feature.name, error);
                        None
                    }
                };

                MapShape {
                    feature_name: feature.name.clone(),
                    territory: resolved.map(|entry| entry.name.clone()),
                    colony: resolved
                        .filter(|entry| entry.british)
                        .map(|entry| entry.name.clone()),
                    german_name: resolved
                        .map(|entry| entry.german_name.clone())
                        .unwrap_or_else(|| feature.name.clone()),
                    path: projection.svg_path(&feature.polygons),
                }
            })
            .collect();

        Ok(Self { shapes })
    }

    pub fn shapes(&self) -> &[MapShape] {
        &self.shapes
    }

    pub fn colony_count(&self) -> usize {
        self.shapes.iter().filter(|shape| shape.is_colony()).count()
    }

    /// Name to report when a shape is clicked. Only colonies are selectable.
    pub fn click(&self, index: usize) -> Option<String> {
        self.shapes.get(index).and_then(|shape| shape.colony.clone())
    }

    /// Hover only highlights colonies.
    pub fn hover(&self, index: usize) -> Option<usize> {
        self.shapes
            .get(index)
            .filter(|shape| shape.is_colony())
            .map(|_| index)
    }

    pub fn style(&self, index: usize, selected: Option<&str>, hovered: Option<usize>) -> ShapeStyle {
        let Some(shape) = self.shapes.get(index) else {
            return base_style();
        };

        let colony = shape.is_colony();
        let mut style = if colony {
            ShapeStyle {
                fill: COLOR_BRITISH,
                stroke: STROKE_BRITISH,
                stroke_width: 1,
                fill_opacity: 1.0,
                interactive: true,
            }
        } else {
            base_style()
        };

        if colony && hovered == Some(index) {
            style.fill = COLOR_HOVER;
            style.stroke = STROKE_ACTIVE;
        }

        if shape.is_selected(selected) {
            style.fill = COLOR_SELECTED;
            style.stroke = STROKE_ACTIVE;
            style.stroke_width = 2;
        }

        style
    }
}

fn base_style() -> ShapeStyle {
    ShapeStyle {
        fill: COLOR_BASE,
        stroke: STROKE_BASE,
        stroke_width: 1,
        fill_opacity: 0.5,
        interactive: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geography::CountryFeature;

    fn square(name: &str, lon: f64, lat: f64) -> CountryFeature {
        CountryFeature {
            name: name.to_string(),
            codes: Vec::new(),
            polygons: vec![vec![vec![
                [lon, lat],
                [lon + 2.0, lat],
                [lon + 2.0, lat + 2.0],
                [lon, lat + 2.0],
                [lon, lat],
            ]]],
        }
    }

    fn sample_model() -> MapModel {
        let geography = Geography {
            features: vec![
                square("Republic of Ghana", -2.0, 6.0),
                square("Ethiopia", 38.0, 8.0),
                square("Kenya Uganda Railway Zone", 34.0, 0.0),
            ],
        };

        MapModel::build(&geography, &TerritoryTable::africa()).expect("sample should build")
    }

    #[test]
    fn classifies_colonies_and_others() {
        let model = sample_model();

        assert_eq!(model.shapes()[0].colony.as_deref(), Some("Ghana"));
        assert_eq!(model.shapes()[1].territory.as_deref(), Some("Ethiopia"));
        assert!(model.shapes()[1].colony.is_none());
        assert_eq!(model.colony_count(), 1);
    }

    #[test]
    fn ambiguous_feature_is_not_a_colony() {
        let model = sample_model();
        let shape = &model.shapes()[2];

        assert!(shape.territory.is_none());
        assert!(!shape.is_colony());
        assert_eq!(model.click(2), None);
    }

    #[test]
    fn colonies_use_highlight_color() {
        let model = sample_model();

        assert_eq!(model.style(0, None, None).fill, COLOR_BRITISH);
        assert_eq!(model.style(1, None, None).fill, COLOR_BASE);
        assert_eq!(model.style(1, None, None).fill_opacity, 0.5);
    }

    #[test]
    fn hover_only_applies_to_colonies() {
        let model = sample_model();

        assert_eq!(model.hover(0), Some(0));
        assert_eq!(model.hover(1), None);
        assert_eq!(model.style(0, None, Some(0)).fill, COLOR_HOVER);
        assert_eq!(model.style(1, None, Some(1)).fill, COLOR_BASE);
    }

    #[test]
    fn selection_overrides_hover() {
        let model = sample_model();
        let style = model.style(0, Some("Ghana"), Some(0));

        assert_eq!(style.fill, COLOR_SELECTED);
        assert_eq!(style.stroke, "#fff");
        assert_eq!(style.stroke_width, 2);
    }

    #[test]
    fn click_reports_canonical_colony_name() {
        let model = sample_model();

        assert_eq!(model.click(0).as_deref(), Some("Ghana"));
        assert_eq!(model.click(1), None);
        assert_eq!(model.click(99), None);
    }

    #[test]
    fn labels_use_german_names() {
        let model = sample_model();

        assert_eq!(model.shapes()[0].label(), "Ghana (Britisch)");
        assert_eq!(model.shapes()[1].label(), "Äthiopien");
    }

    #[test]
    fn empty_geography_cannot_be_drawn() {
        let error = MapModel::build(&Geography::default(), &TerritoryTable::africa())
            .expect_err("nothing to draw");

        assert_eq!(error, MapError::NothingToDraw);
    }
}
