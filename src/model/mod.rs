pub mod argument;
pub mod argument_list;
pub mod command;
pub mod parameter;

// Re-export commonly used types at the model level.
pub use argument::{ArgumentConverter, ArgumentKind};
pub use argument_list::ArgumentList;
pub use command::CommandDefinition;
pub use parameter::{arg, CommandEnum, CommandParameter, Overload};
