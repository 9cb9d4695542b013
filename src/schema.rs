//! Loads the Slicer execution-model XML that declares the module's parameters.
//!
//! The document looks like this:
//!
//! ```xml
//! <executable>
//!   <title>Elastix</title>
//!   <version>4.9.0</version>
//!   <parameters>
//!     <label>Inputs</label>
//!     <image>
//!       <name>f</name>
//!       <flag>f</flag>
//!       <channel>input</channel>
//!     </image>
//!   </parameters>
//! </executable>
//! ```
//!
//! Only the parts the wrapper needs are kept. Unknown elements are ignored so
//! schemas written for other Slicer tooling still load.

use crate::error::SchemaError;
use roxmltree::Node;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// The schema compiled into the binary, used when no schema path is configured.
pub const BUNDLED_SCHEMA: &str = include_str!("../schema/Elastix.xml");

/// Long flags the wrapper answers itself.
pub const RESERVED_LONG_FLAGS: &[&str] = &["help", "version", "xml"];

/// Short flags the wrapper answers itself.
pub const RESERVED_SHORT_FLAGS: &[char] = &['h', 'V'];

/// The parameter types of the Slicer execution model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterKind {
    Integer,
    Float,
    Double,
    Boolean,
    String,
    IntegerVector,
    FloatVector,
    DoubleVector,
    StringVector,
    IntegerEnumeration,
    FloatEnumeration,
    DoubleEnumeration,
    StringEnumeration,
    Point,
    Region,
    File,
    Directory,
    Image,
    Geometry,
    Transform,
    Table,
    Measurement,
}

impl ParameterKind {
    /// Maps an XML tag to a parameter kind. Returns `None` for tags that do
    /// not declare a parameter (`label`, `description`, ...).
    pub fn from_tag(tag: &str) -> Option<Self> {
        let kind = match tag {
            "integer" => Self::Integer,
            "float" => Self::Float,
            "double" => Self::Double,
            "boolean" => Self::Boolean,
            "string" => Self::String,
            "integer-vector" => Self::IntegerVector,
            "float-vector" => Self::FloatVector,
            "double-vector" => Self::DoubleVector,
            "string-vector" => Self::StringVector,
            "integer-enumeration" => Self::IntegerEnumeration,
            "float-enumeration" => Self::FloatEnumeration,
            "double-enumeration" => Self::DoubleEnumeration,
            "string-enumeration" => Self::StringEnumeration,
            "point" => Self::Point,
            "region" => Self::Region,
            "file" => Self::File,
            "directory" => Self::Directory,
            "image" => Self::Image,
            "geometry" => Self::Geometry,
            "transform" => Self::Transform,
            "table" => Self::Table,
            "measurement" => Self::Measurement,
            _ => return None,
        };
        Some(kind)
    }

    pub fn tag(self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Double => "double",
            Self::Boolean => "boolean",
            Self::String => "string",
            Self::IntegerVector => "integer-vector",
            Self::FloatVector => "float-vector",
            Self::DoubleVector => "double-vector",
            Self::StringVector => "string-vector",
            Self::IntegerEnumeration => "integer-enumeration",
            Self::FloatEnumeration => "float-enumeration",
            Self::DoubleEnumeration => "double-enumeration",
            Self::StringEnumeration => "string-enumeration",
            Self::Point => "point",
            Self::Region => "region",
            Self::File => "file",
            Self::Directory => "directory",
            Self::Image => "image",
            Self::Geometry => "geometry",
            Self::Transform => "transform",
            Self::Table => "table",
            Self::Measurement => "measurement",
        }
    }

    pub fn is_enumeration(self) -> bool {
        matches!(
            self,
            Self::IntegerEnumeration
                | Self::FloatEnumeration
                | Self::DoubleEnumeration
                | Self::StringEnumeration
        )
    }
}

/// Data flow direction of a file-like parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Input,
    Output,
}

/// Optional numeric bounds from a `<constraints>` block.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Constraints {
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
}

/// A single declared parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub kind: ParameterKind,
    /// Single-character short flag, without the leading dash.
    pub flag: Option<char>,
    /// Long flag, without the leading dashes.
    pub longflag: Option<String>,
    /// Zero-based position for positional parameters.
    pub index: Option<usize>,
    pub label: Option<String>,
    pub description: Option<String>,
    pub default: Option<String>,
    pub channel: Option<Channel>,
    pub elements: Vec<String>,
    pub constraints: Constraints,
}

impl Parameter {
    pub fn is_positional(&self) -> bool {
        self.index.is_some()
    }

    /// The long flag clap should register: the declared one, or the
    /// parameter name when the schema declares no flag at all. Positional
    /// parameters never take a flag.
    pub fn effective_longflag(&self) -> Option<&str> {
        match (&self.longflag, self.flag, self.index) {
            (_, _, Some(_)) => None,
            (Some(long), _, None) => Some(long.as_str()),
            (None, None, None) => Some(self.name.as_str()),
            (None, Some(_), None) => None,
        }
    }

    /// The short flag clap should register.
    pub fn effective_flag(&self) -> Option<char> {
        match self.index {
            Some(_) => None,
            None => self.flag,
        }
    }
}

/// A `<parameters>` block.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterGroup {
    pub label: Option<String>,
    pub description: Option<String>,
    pub advanced: bool,
    pub parameters: Vec<Parameter>,
}

/// The parsed module description.
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleSchema {
    pub category: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub version: Option<String>,
    pub contributor: Option<String>,
    pub license: Option<String>,
    pub documentation_url: Option<String>,
    pub groups: Vec<ParameterGroup>,
    /// The document exactly as loaded, printed back for `--xml`.
    pub raw: String,
}

impl ModuleSchema {
    /// Loads the schema shipped with the binary.
    pub fn bundled() -> Result<Self, SchemaError> {
        Self::from_str(BUNDLED_SCHEMA)
    }

    pub fn from_file(path: &Path) -> Result<Self, SchemaError> {
        let text = fs::read_to_string(path).map_err(|source| SchemaError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_str(&text)
    }

    /// All parameters in document order.
    pub fn parameters(&self) -> impl Iterator<Item = &Parameter> {
        self.groups.iter().flat_map(|group| group.parameters.iter())
    }

    fn validate(&self) -> Result<(), SchemaError> {
        let mut names = HashSet::new();
        let mut shorts = HashSet::new();
        let mut longs = HashSet::new();
        let mut indices = HashSet::new();

        for parameter in self.parameters() {
            let name = &parameter.name;
            if !names.insert(name.as_str()) {
                return Err(SchemaError::DuplicateName(name.clone()));
            }

            if let Some(flag) = parameter.effective_flag() {
                if RESERVED_SHORT_FLAGS.contains(&flag) {
                    return Err(SchemaError::ReservedFlag {
                        name: name.clone(),
                        flag: format!("-{flag}"),
                    });
                }
                if !shorts.insert(flag) {
                    return Err(SchemaError::DuplicateFlag {
                        name: name.clone(),
                        flag: format!("-{flag}"),
                    });
                }
            }

            if let Some(long) = parameter.effective_longflag() {
                if RESERVED_LONG_FLAGS.contains(&long) {
                    return Err(SchemaError::ReservedFlag {
                        name: name.clone(),
                        flag: format!("--{long}"),
                    });
                }
                if !longs.insert(long) {
                    return Err(SchemaError::DuplicateFlag {
                        name: name.clone(),
                        flag: format!("--{long}"),
                    });
                }
            }

            if let Some(index) = parameter.index {
                if parameter.kind == ParameterKind::Boolean {
                    return Err(SchemaError::PositionalBoolean(name.clone()));
                }
                if parameter.default.is_some() {
                    return Err(SchemaError::PositionalDefault(name.clone()));
                }
                if !indices.insert(index) {
                    return Err(SchemaError::DuplicateIndex {
                        name: name.clone(),
                        index,
                    });
                }
            }

            if parameter.kind.is_enumeration() {
                if parameter.elements.is_empty() {
                    return Err(SchemaError::EmptyEnumeration(name.clone()));
                }
                if let Some(default) = &parameter.default {
                    if !parameter.elements.contains(default) {
                        return Err(SchemaError::DefaultNotInEnumeration {
                            name: name.clone(),
                            default: default.clone(),
                        });
                    }
                }
            }
        }

        Ok(())
    }
}

impl FromStr for ModuleSchema {
    type Err = SchemaError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let document = roxmltree::Document::parse(text)?;
        let root = document.root_element();
        if root.tag_name().name() != "executable" {
            return Err(SchemaError::UnexpectedRoot(
                root.tag_name().name().to_string(),
            ));
        }

        let groups = root
            .children()
            .filter(|node| node.is_element() && node.tag_name().name() == "parameters")
            .map(parse_group)
            .collect::<Result<Vec<_>, _>>()?;

        let schema = ModuleSchema {
            category: child_text(root, "category"),
            title: child_text(root, "title"),
            description: child_text(root, "description"),
            version: child_text(root, "version"),
            contributor: child_text(root, "contributor"),
            license: child_text(root, "license"),
            documentation_url: child_text(root, "documentation-url"),
            groups,
            raw: text.to_string(),
        };
        schema.validate()?;

        log::debug!(
            "loaded schema '{}' with {} parameters",
            schema.title.as_deref().unwrap_or("<untitled>"),
            schema.parameters().count()
        );

        Ok(schema)
    }
}

fn parse_group(node: Node) -> Result<ParameterGroup, SchemaError> {
    let parameters = node
        .children()
        .filter(|child| child.is_element())
        .filter_map(|child| {
            ParameterKind::from_tag(child.tag_name().name()).map(|kind| parse_parameter(child, kind))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ParameterGroup {
        label: child_text(node, "label"),
        description: child_text(node, "description"),
        advanced: node
            .attribute("advanced")
            .is_some_and(|value| value.trim().eq_ignore_ascii_case("true")),
        parameters,
    })
}

fn parse_parameter(node: Node, kind: ParameterKind) -> Result<Parameter, SchemaError> {
    let name = child_text(node, "name")
        .ok_or_else(|| SchemaError::MissingName(kind.tag().to_string()))?;

    let flag = match child_text(node, "flag") {
        Some(raw) => {
            let stripped = raw.trim_start_matches('-');
            let mut chars = stripped.chars();
            match (chars.next(), chars.next()) {
                (Some(flag), None) => Some(flag),
                _ => {
                    return Err(SchemaError::InvalidFlag {
                        name,
                        flag: raw,
                    })
                }
            }
        }
        None => None,
    };

    let longflag = child_text(node, "longflag")
        .map(|raw| raw.trim_start_matches('-').to_string())
        .filter(|long| !long.is_empty());

    let index = match child_text(node, "index") {
        Some(raw) => match raw.parse::<usize>() {
            Ok(index) => Some(index),
            Err(_) => return Err(SchemaError::InvalidIndex { name, index: raw }),
        },
        None => None,
    };

    let channel = child_text(node, "channel").and_then(|raw| match raw.as_str() {
        "input" => Some(Channel::Input),
        "output" => Some(Channel::Output),
        other => {
            log::warn!("parameter '{name}' declares unknown channel '{other}'; ignoring it");
            None
        }
    });

    let elements = node
        .children()
        .filter(|child| child.is_element() && child.tag_name().name() == "element")
        .filter_map(|child| child.text().map(|text| text.trim().to_string()))
        .collect();

    let constraints = match node
        .children()
        .find(|child| child.is_element() && child.tag_name().name() == "constraints")
    {
        Some(constraints) => Constraints {
            minimum: parse_bound(&name, constraints, "minimum")?,
            maximum: parse_bound(&name, constraints, "maximum")?,
        },
        None => Constraints::default(),
    };

    Ok(Parameter {
        label: child_text(node, "label"),
        description: child_text(node, "description"),
        default: child_text(node, "default"),
        name,
        kind,
        flag,
        longflag,
        index,
        channel,
        elements,
        constraints,
    })
}

fn parse_bound(
    name: &str,
    constraints: Node,
    bound: &'static str,
) -> Result<Option<f64>, SchemaError> {
    match child_text(constraints, bound) {
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| SchemaError::InvalidConstraint {
                name: name.to_string(),
                bound,
                value: raw,
            }),
        None => Ok(None),
    }
}

/// Trimmed text of the first direct child element called `tag`.
fn child_text(node: Node, tag: &str) -> Option<String> {
    node.children()
        .find(|child| child.is_element() && child.tag_name().name() == tag)
        .and_then(|child| child.text())
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}
