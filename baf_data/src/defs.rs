use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Placeholder name -> value pairs carried by a symbolic reference or a snippet instance.
pub type Fields = BTreeMap<String, String>;

/// Which half of an IF/THEN statement a template belongs to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateKind {
    /// Condition lines between `IF` and `THEN`.
    #[default]
    Trigger,
    /// Consequence lines inside a `RESPONSE #n` block.
    Action,
}

impl TemplateKind {
    pub const ALL: [TemplateKind; 2] = [TemplateKind::Trigger, TemplateKind::Action];

    pub fn as_str(self) -> &'static str {
        match self {
            TemplateKind::Trigger => "trigger",
            TemplateKind::Action => "action",
        }
    }
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A value had a JSON shape that none of the template or sequence types accept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeError {
    pub context: String,
}

impl ShapeError {
    fn new(context: impl Into<String>) -> Self {
        Self { context: context.into() }
    }
}

impl fmt::Display for ShapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unrecognized shape ({})", self.context)
    }
}

impl std::error::Error for ShapeError {}

/// One entry of a stored template definition.
///
/// JSON form: a string is a line pattern, an array is an OR-group, and a
/// single-key object with an empty (`{}` or `null`) payload names another template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub enum DefElement {
    Line(String),
    Group(Vec<DefElement>),
    Ref(String),
}

impl TryFrom<Value> for DefElement {
    type Error = ShapeError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::String(line) => Ok(DefElement::Line(line)),
            Value::Array(members) => members
                .into_iter()
                .map(DefElement::try_from)
                .collect::<Result<Vec<_>, _>>()
                .map(DefElement::Group),
            Value::Object(map) => {
                if map.len() != 1 {
                    return Err(ShapeError::new(format!(
                        "template reference must have exactly one key, found {}",
                        map.len()
                    )));
                }
                let mut entries = map.into_iter();
                match entries.next() {
                    Some((name, Value::Null)) => Ok(DefElement::Ref(name)),
                    Some((name, Value::Object(payload))) if payload.is_empty() => Ok(DefElement::Ref(name)),
                    Some((name, _)) => Err(ShapeError::new(format!(
                        "template reference '{name}' must have an empty payload"
                    ))),
                    None => Err(ShapeError::new("empty template reference")),
                }
            },
            other => Err(ShapeError::new(format!("unexpected template element {other}"))),
        }
    }
}

impl From<DefElement> for Value {
    fn from(element: DefElement) -> Self {
        match element {
            DefElement::Line(line) => Value::String(line),
            DefElement::Group(members) => Value::Array(members.into_iter().map(Value::from).collect()),
            DefElement::Ref(name) => {
                let mut map = Map::new();
                map.insert(name, Value::Object(Map::new()));
                Value::Object(map)
            },
        }
    }
}

/// Stored definition of a named template: an ordered list of entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TemplateDef {
    pub elements: Vec<DefElement>,
}

impl TemplateDef {
    pub fn new(elements: Vec<DefElement>) -> Self {
        Self { elements }
    }
}

/// A collapsed run of lines: `{"TemplateName": {"FIELD": "value"}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, Option<Fields>>", into = "BTreeMap<String, Fields>")]
pub struct Reference {
    pub name: String,
    pub fields: Fields,
}

impl Reference {
    pub fn new(name: impl Into<String>, fields: Fields) -> Self {
        Self {
            name: name.into(),
            fields,
        }
    }
}

impl TryFrom<BTreeMap<String, Option<Fields>>> for Reference {
    type Error = ShapeError;

    fn try_from(map: BTreeMap<String, Option<Fields>>) -> Result<Self, Self::Error> {
        let count = map.len();
        let mut entries = map.into_iter();
        match (entries.next(), count) {
            (Some((name, fields)), 1) => Ok(Reference::new(name, fields.unwrap_or_default())),
            _ => Err(ShapeError::new(format!(
                "reference must have exactly one template key, found {count}"
            ))),
        }
    }
}

impl From<Reference> for BTreeMap<String, Fields> {
    fn from(reference: Reference) -> Self {
        BTreeMap::from([(reference.name, reference.fields)])
    }
}

/// One entry of a trigger or action sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Item {
    /// A literal script line.
    Line(String),
    /// The members of one `OR(n)` block.
    Group(Vec<Item>),
    /// A collapsed template reference.
    Ref(Reference),
}

impl Item {
    pub fn line(text: impl Into<String>) -> Self {
        Item::Line(text.into())
    }

    pub fn reference(name: impl Into<String>, fields: Fields) -> Self {
        Item::Ref(Reference::new(name, fields))
    }

    pub fn as_line(&self) -> Option<&str> {
        match self {
            Item::Line(text) => Some(text),
            _ => None,
        }
    }
}

impl From<&str> for Item {
    fn from(text: &str) -> Self {
        Item::line(text)
    }
}

/// A weighted response block: `{"100": [actions...]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, Vec<Item>>", into = "BTreeMap<String, Vec<Item>>")]
pub struct ResponseDef {
    pub weight: u32,
    pub actions: Vec<Item>,
}

impl TryFrom<BTreeMap<String, Vec<Item>>> for ResponseDef {
    type Error = ShapeError;

    fn try_from(map: BTreeMap<String, Vec<Item>>) -> Result<Self, Self::Error> {
        let count = map.len();
        let mut entries = map.into_iter();
        let Some((weight, actions)) = entries.next().filter(|_| count == 1) else {
            return Err(ShapeError::new(format!(
                "response block must have exactly one weight key, found {count}"
            )));
        };
        let weight = weight
            .trim()
            .parse()
            .map_err(|_| ShapeError::new(format!("response weight '{weight}' is not a number")))?;
        Ok(ResponseDef { weight, actions })
    }
}

impl From<ResponseDef> for BTreeMap<String, Vec<Item>> {
    fn from(response: ResponseDef) -> Self {
        BTreeMap::from([(response.weight.to_string(), response.actions)])
    }
}

/// One extracted IF/THEN statement, possibly shared by several field sets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnippetDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "if", default)]
    pub triggers: Vec<Item>,
    #[serde(rename = "then", default)]
    pub responses: Vec<ResponseDef>,
    /// Each entry yields one concrete statement on expansion.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<Fields>,
}
