use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameter type ids and flag bits of the "available commands" message.
///
/// A parameter's `param_type` is a type id OR'd with one or more flags.
/// The ids track one protocol revision; they shift between client versions.
pub mod arg {
    pub const FLAG_VALID: u32 = 0x10_0000;
    pub const FLAG_ENUM: u32 = 0x20_0000;
    pub const FLAG_POSTFIX: u32 = 0x100_0000;
    pub const FLAG_SOFT_ENUM: u32 = 0x400_0000;

    pub const INT: u32 = 1;
    pub const FLOAT: u32 = 3;
    pub const VALUE: u32 = 4;
    pub const WILDCARD_INT: u32 = 5;
    pub const OPERATOR: u32 = 6;
    pub const TARGET: u32 = 8;
    pub const WILDCARD_TARGET: u32 = 10;
    pub const FILEPATH: u32 = 17;
    pub const STRING: u32 = 39;
    pub const INT_POSITION: u32 = 47;
    pub const POSITION: u32 = 48;
    pub const MESSAGE: u32 = 51;
    pub const RAWTEXT: u32 = 53;
    pub const JSON: u32 = 57;
    pub const COMMAND: u32 = 70;
}

/// A named set of string values. Attached to enum parameters, and also the
/// shape of a soft enum.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct CommandEnum {
    pub name: String,
    #[serde(default)]
    pub values: Vec<String>,
}

impl CommandEnum {
    pub fn new(name: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }
}

/// One parameter descriptor as advertised to the client.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommandParameter {
    pub name: String,
    pub optional: bool,
    pub param_type: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enum_data: Option<CommandEnum>,
}

impl CommandParameter {
    /// A plain typed parameter: `FLAG_VALID | type_id`.
    pub fn standard(name: impl Into<String>, type_id: u32, optional: bool) -> Self {
        Self {
            name: name.into(),
            optional,
            param_type: arg::FLAG_VALID | type_id,
            enum_data: None,
        }
    }

    /// A parameter restricted to the values of `enum_data`.
    pub fn enumeration(name: impl Into<String>, enum_data: CommandEnum, optional: bool) -> Self {
        Self {
            name: name.into(),
            optional,
            param_type: arg::FLAG_VALID | arg::FLAG_ENUM,
            enum_data: Some(enum_data),
        }
    }

    /// A parameter backed by a soft enum. Only the name travels with the
    /// parameter; the values are sent separately and may change at runtime.
    pub fn soft_enum(name: impl Into<String>, enum_name: impl Into<String>, optional: bool) -> Self {
        Self {
            name: name.into(),
            optional,
            param_type: arg::FLAG_VALID | arg::FLAG_SOFT_ENUM,
            enum_data: Some(CommandEnum::new(enum_name, Vec::new())),
        }
    }

    /// The leading parameter that selects a sub-command.
    pub fn sub_command(name: impl Into<String>) -> Self {
        Self::standard(name, arg::STRING, true)
    }

    pub fn has_flag(&self, flag: u32) -> bool {
        self.param_type & flag == flag
    }

    /// The type id with all flag bits masked off.
    pub fn type_id(&self) -> u32 {
        self.param_type
            & !(arg::FLAG_VALID | arg::FLAG_ENUM | arg::FLAG_POSTFIX | arg::FLAG_SOFT_ENUM)
    }
}

/// One complete parameter-list shape for invoking a command.
/// Serializes as a plain JSON array of parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Overload(Vec<CommandParameter>);

impl Overload {
    pub fn new(parameters: Vec<CommandParameter>) -> Self {
        Self(parameters)
    }

    pub fn parameters(&self) -> &[CommandParameter] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CommandParameter> {
        self.0.iter()
    }

    /// Parameter names in order, e.g. `["home", "name"]`. Handy for display.
    pub fn names(&self) -> Vec<&str> {
        self.0.iter().map(|p| p.name.as_str()).collect()
    }

    pub(crate) fn push(&mut self, parameter: CommandParameter) {
        self.0.push(parameter);
    }

    pub(crate) fn with_prefix(mut self, parameter: CommandParameter) -> Self {
        self.0.insert(0, parameter);
        self
    }
}

impl From<Vec<CommandParameter>> for Overload {
    fn from(parameters: Vec<CommandParameter>) -> Self {
        Self(parameters)
    }
}

impl<'a> IntoIterator for &'a Overload {
    type Item = &'a CommandParameter;
    type IntoIter = std::slice::Iter<'a, CommandParameter>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn sub_command_parameter_is_optional_valid_string() {
        let p = CommandParameter::sub_command("home");
        assert!(p.optional);
        assert_eq!(p.param_type, arg::FLAG_VALID | arg::STRING);
        assert!(p.enum_data.is_none());
        assert_eq!(p.type_id(), arg::STRING);
    }

    #[test]
    fn enum_parameter_carries_values() {
        let e = CommandEnum::new("mode", vec!["on".into(), "off".into()]);
        let p = CommandParameter::enumeration("mode", e.clone(), false);
        assert!(p.has_flag(arg::FLAG_ENUM));
        assert!(p.has_flag(arg::FLAG_VALID));
        assert_eq!(p.enum_data, Some(e));
    }

    #[test]
    fn overload_serializes_as_array() {
        let o = Overload::new(vec![CommandParameter::standard("count", arg::INT, false)]);
        let json = serde_json::to_value(&o).unwrap();
        assert!(json.is_array());
        assert_eq!(json[0]["name"], "count");
        assert_eq!(json[0]["optional"], false);
        assert_eq!(json[0]["param_type"], arg::FLAG_VALID | arg::INT);
        assert!(json[0].get("enum_data").is_none());
    }

    #[test]
    fn with_prefix_puts_parameter_first() {
        let o = Overload::new(vec![CommandParameter::standard("x", arg::INT, false)])
            .with_prefix(CommandParameter::sub_command("tp"));
        assert_eq!(o.names(), vec!["tp", "x"]);
    }
}
