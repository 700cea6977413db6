//! Response-shape descriptors sent to the text service and checked against
//! its answers.
//!
//! The descriptor is sent as Gemini's `responseSchema`. The same value
//! validates the returned JSON before it is decoded into a typed record, so a
//! drift between schema and record types fails deterministically.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::DeserializeOwned;
use serde_json::Value;

/// Bumped whenever a descriptor changes shape.
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SchemaType {
    Object,
    Array,
    String,
    Integer,
    Boolean,
}

impl SchemaType {
    fn accepts(self, value: &Value) -> bool {
        match self {
            SchemaType::Object => value.is_object(),
            SchemaType::Array => value.is_array(),
            SchemaType::String => value.is_string(),
            SchemaType::Integer => value.is_i64() || value.is_u64(),
            SchemaType::Boolean => value.is_boolean(),
        }
    }
}

impl fmt::Display for SchemaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SchemaType::Object => "object",
            SchemaType::Array => "array",
            SchemaType::String => "string",
            SchemaType::Integer => "integer",
            SchemaType::Boolean => "boolean",
        };
        f.write_str(label)
    }
}

/// A node of the response-shape descriptor.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    #[serde(rename = "type")]
    pub kind: SchemaType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, Schema>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub property_ordering: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,
}

impl Schema {
    fn leaf(kind: SchemaType) -> Self {
        Self {
            kind,
            description: None,
            properties: BTreeMap::new(),
            property_ordering: Vec::new(),
            required: Vec::new(),
            items: None,
        }
    }

    pub fn string() -> Self {
        Self::leaf(SchemaType::String)
    }

    pub fn integer() -> Self {
        Self::leaf(SchemaType::Integer)
    }

    pub fn array(items: Schema) -> Self {
        Self {
            items: Some(Box::new(items)),
            ..Self::leaf(SchemaType::Array)
        }
    }

    /// Object whose fields keep the given order in the generated output.
    pub fn object<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = (S, Schema)>,
        S: Into<String>,
    {
        let mut schema = Self::leaf(SchemaType::Object);
        for (name, field) in fields {
            let name = name.into();
            schema.property_ordering.push(name.clone());
            schema.properties.insert(name, field);
        }
        schema
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Marks every declared field as required.
    pub fn require_all(mut self) -> Self {
        self.required = self.property_ordering.clone();
        self
    }

    /// Checks `value` against this node. Extra object fields are allowed.
    pub fn validate(&self, value: &Value) -> Result<(), SchemaViolation> {
        self.validate_at("$", value)
    }

    fn validate_at(&self, path: &str, value: &Value) -> Result<(), SchemaViolation> {
        if !self.kind.accepts(value) {
            return Err(SchemaViolation::WrongType {
                path: path.to_string(),
                expected: self.kind,
            });
        }

        if let Value::Object(map) = value {
            for field in &self.required {
                if map.get(field).is_none_or(Value::is_null) {
                    return Err(SchemaViolation::MissingField {
                        path: path.to_string(),
                        field: field.clone(),
                    });
                }
            }

            for (name, field) in &self.properties {
                if let Some(child) = map.get(name).filter(|child| !child.is_null()) {
                    field.validate_at(&format!("{}.{}", path, name), child)?;
                }
            }
        }

        if let (Value::Array(elements), Some(items)) = (value, &self.items) {
            for (index, element) in elements.iter().enumerate() {
                items.validate_at(&format!("{}[{}]", path, index), element)?;
            }
        }

        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SchemaViolation {
    #[error("response is not valid JSON: {0}")]
    Syntax(#[source] serde_json::Error),
    #[error("{path} should be of type {expected}")]
    WrongType { path: String, expected: SchemaType },
    #[error("{path} is missing required field {field}")]
    MissingField { path: String, field: String },
    #[error("response matches schema {schema} v{version} but could not be decoded: {source}")]
    Decode {
        schema: &'static str,
        version: u32,
        source: serde_json::Error,
    },
}

/// Versioned, named response shape.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseSchema {
    pub name: &'static str,
    pub version: u32,
    pub root: Schema,
}

impl ResponseSchema {
    /// Shape of a single colony-detail record.
    pub fn colony_detail() -> Self {
        let event = Schema::object([
            ("year", Schema::string()),
            ("description", Schema::string()),
        ]);

        let root = Schema::object([
            (
                "name",
                Schema::string().describe("Der historische Name der Kolonie"),
            ),
            (
                "germanName",
                Schema::string().describe("Der deutsche Name des heutigen Landes"),
            ),
            (
                "modernName",
                Schema::string().describe("Der heutige Name des Landes"),
            ),
            (
                "period",
                Schema::string().describe("Zeitraum der britischen Herrschaft"),
            ),
            (
                "administrationType",
                Schema::string().describe("Art der Verwaltung"),
            ),
            (
                "description",
                Schema::string()
                    .describe("Allgemeine Zusammenfassung der Kolonialzeit (ca. 80 Wörter)."),
            ),
            (
                "colonizationText",
                Schema::string().describe(
                    "Beschreibung des Prozesses der Inbesitznahme/Kolonialisierung (ca. 80 Wörter).",
                ),
            ),
            (
                "exportGoods",
                Schema::array(Schema::string())
                    .describe("Liste der 3-5 wichtigsten Exportgüter."),
            ),
            (
                "importantEvents",
                Schema::array(event).describe("3 bis 5 wichtigste historische Ereignisse."),
            ),
        ])
        .require_all();

        Self {
            name: "colony_detail",
            version: SCHEMA_VERSION,
            root,
        }
    }

    /// Shape of a batch of quiz questions.
    pub fn quiz_batch() -> Self {
        let question = Schema::object([
            (
                "relatedCountry",
                Schema::string().describe("Der Name des Landes, auf das sich die Frage bezieht"),
            ),
            ("question", Schema::string().describe("Die Quizfrage")),
            (
                "options",
                Schema::array(Schema::string()).describe("4 Antwortmöglichkeiten"),
            ),
            (
                "correctAnswerIndex",
                Schema::integer().describe("Index der korrekten Antwort (0-3)"),
            ),
            (
                "explanation",
                Schema::string().describe("Kurze Erklärung, warum die Antwort richtig ist."),
            ),
        ])
        .require_all();

        Self {
            name: "quiz_batch",
            version: SCHEMA_VERSION,
            root: Schema::array(question),
        }
    }

    /// Validates the raw response text and decodes it into `T`.
    pub fn parse<T: DeserializeOwned>(&self, text: &str) -> Result<T, SchemaViolation> {
        let value: Value = serde_json::from_str(text).map_err(SchemaViolation::Syntax)?;
        self.root.validate(&value)?;

        self.decode(value)
    }

    /// Validates and decodes every element of an array response on its own.
    ///
    /// Only a non-array reply fails as a whole. Each element yields its own
    /// result, so one malformed item does not take its neighbours down.
    pub fn parse_each<T: DeserializeOwned>(
        &self,
        text: &str,
    ) -> Result<Vec<Result<T, SchemaViolation>>, SchemaViolation> {
        let value: Value = serde_json::from_str(text).map_err(SchemaViolation::Syntax)?;

        let (Value::Array(elements), Some(items)) = (value, &self.root.items) else {
            return Err(SchemaViolation::WrongType {
                path: "$".to_string(),
                expected: SchemaType::Array,
            });
        };

        Ok(elements
            .into_iter()
            .enumerate()
            .map(|(index, element)| {
                items.validate_at(&format!("$[{}]", index), &element)?;
                self.decode(element)
            })
            .collect())
    }

    fn decode<T: DeserializeOwned>(&self, value: Value) -> Result<T, SchemaViolation> {
        serde_json::from_value(value).map_err(|source| SchemaViolation::Decode {
            schema: self.name,
            version: self.version,
            source,
        })
    }
}
