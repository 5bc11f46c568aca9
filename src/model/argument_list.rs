use std::collections::BTreeMap;

use crate::error::OverloadError;

use super::argument::ArgumentConverter;

/// Positional argument slots, each holding one or more alternative
/// converters ("int OR target"). Alternative K of the command is assembled
/// from the K-th converter at every position that has one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ArgumentList {
    positions: BTreeMap<usize, Vec<ArgumentConverter>>,
}

impl ArgumentList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a list directly from position → alternatives, bypassing the
    /// registration ordering rules. Empty alternative lists are dropped.
    pub fn from_positions<I>(positions: I) -> Self
    where
        I: IntoIterator<Item = (usize, Vec<ArgumentConverter>)>,
    {
        Self {
            positions: positions
                .into_iter()
                .filter(|(_, converters)| !converters.is_empty())
                .collect(),
        }
    }

    /// Append `converter` as the next alternative at `position`.
    ///
    /// Arguments must be registered left to right: position N requires
    /// position N-1, nothing follows a text argument, and a required
    /// argument cannot follow an optional one.
    pub fn register_argument(
        &mut self,
        position: usize,
        converter: ArgumentConverter,
    ) -> Result<(), OverloadError> {
        if let Some(prev) = position.checked_sub(1) {
            let Some(before) = self.positions.get(&prev) else {
                return Err(OverloadError::ArgumentOrder {
                    position,
                    message: format!("there were no arguments before position {position}"),
                });
            };
            for existing in before {
                if existing.kind().is_text() {
                    return Err(OverloadError::ArgumentOrder {
                        position,
                        message: "no other arguments can be registered after a text argument"
                            .to_string(),
                    });
                }
                if existing.is_optional() && !converter.is_optional() {
                    return Err(OverloadError::ArgumentOrder {
                        position,
                        message: "cannot register a required argument after an optional argument"
                            .to_string(),
                    });
                }
            }
        }
        self.positions.entry(position).or_default().push(converter);
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Number of populated positions.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Alternatives at `position`, in registration order.
    pub fn alternatives(&self, position: usize) -> &[ArgumentConverter] {
        self.positions
            .get(&position)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Populated positions in ascending order.
    pub fn positions(&self) -> impl Iterator<Item = (usize, &[ArgumentConverter])> + '_ {
        self.positions
            .iter()
            .map(|(position, converters)| (*position, converters.as_slice()))
    }

    /// The largest number of alternatives registered at any one position.
    pub fn max_alternatives(&self) -> usize {
        self.positions.values().map(Vec::len).max().unwrap_or(0)
    }

    /// Usage string for each alternative, e.g. `<amount: int> [player: target]`.
    pub fn usage(&self) -> Vec<String> {
        (0..self.max_alternatives())
            .map(|i| {
                self.positions
                    .values()
                    .filter_map(|converters| converters.get(i))
                    .map(ArgumentConverter::usage)
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect()
    }
}
