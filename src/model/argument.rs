use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::parameter::{arg, CommandEnum, CommandParameter};

/// What kind of value an argument slot accepts. Determines the protocol
/// type bits and any enum data sent with the parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ArgumentKind {
    Integer,
    Float,
    RawString,
    /// Consumes the rest of the input line. Nothing may follow it.
    Text,
    Boolean,
    Vector3,
    BlockPosition,
    Target,
    StringEnum {
        enum_name: String,
        values: Vec<String>,
    },
    /// Values live in the soft enum store and can change after the
    /// command is registered.
    SoftEnum { enum_name: String },
}

impl ArgumentKind {
    /// Protocol type bits for this kind, flags included.
    pub fn network_type(&self) -> u32 {
        match self {
            Self::Integer => arg::FLAG_VALID | arg::INT,
            Self::Float => arg::FLAG_VALID | arg::FLOAT,
            Self::RawString => arg::FLAG_VALID | arg::STRING,
            Self::Text => arg::FLAG_VALID | arg::RAWTEXT,
            Self::Vector3 => arg::FLAG_VALID | arg::POSITION,
            Self::BlockPosition => arg::FLAG_VALID | arg::INT_POSITION,
            Self::Target => arg::FLAG_VALID | arg::TARGET,
            Self::Boolean | Self::StringEnum { .. } => arg::FLAG_VALID | arg::FLAG_ENUM,
            Self::SoftEnum { .. } => arg::FLAG_VALID | arg::FLAG_SOFT_ENUM,
        }
    }

    pub fn type_name(&self) -> &str {
        match self {
            Self::Integer => "int",
            Self::Float => "float",
            Self::RawString => "string",
            Self::Text => "text",
            Self::Boolean => "bool",
            Self::Vector3 | Self::BlockPosition => "x y z",
            Self::Target => "target",
            Self::StringEnum { enum_name, .. } | Self::SoftEnum { enum_name } => enum_name,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Self::Text)
    }
}

/// One concrete parameter slot. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArgumentConverter {
    name: String,
    optional: bool,
    kind: ArgumentKind,
}

impl ArgumentConverter {
    pub fn new(name: impl Into<String>, optional: bool, kind: ArgumentKind) -> Self {
        Self {
            name: name.into(),
            optional,
            kind,
        }
    }

    pub fn required(name: impl Into<String>, kind: ArgumentKind) -> Self {
        Self::new(name, false, kind)
    }

    pub fn optional(name: impl Into<String>, kind: ArgumentKind) -> Self {
        Self::new(name, true, kind)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    pub fn kind(&self) -> &ArgumentKind {
        &self.kind
    }

    pub fn network_type(&self) -> u32 {
        self.kind.network_type()
    }

    /// The parameter descriptor advertised for this slot.
    pub fn network_parameter(&self) -> CommandParameter {
        match &self.kind {
            ArgumentKind::Boolean => CommandParameter::enumeration(
                &self.name,
                CommandEnum::new("bool", vec!["true".to_string(), "false".to_string()]),
                self.optional,
            ),
            ArgumentKind::StringEnum { enum_name, values } => CommandParameter::enumeration(
                &self.name,
                CommandEnum::new(enum_name, values.clone()),
                self.optional,
            ),
            ArgumentKind::SoftEnum { enum_name } => {
                CommandParameter::soft_enum(&self.name, enum_name, self.optional)
            }
            other => CommandParameter {
                name: self.name.clone(),
                optional: self.optional,
                param_type: other.network_type(),
                enum_data: None,
            },
        }
    }

    /// Usage fragment, e.g. `<amount: int>` or `[player: target]`.
    pub fn usage(&self) -> String {
        let (open, close) = if self.optional { ('[', ']') } else { ('<', '>') };
        format!("{open}{}: {}{close}", self.name, self.kind.type_name())
    }
}
