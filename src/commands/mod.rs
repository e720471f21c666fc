//! Command parsing and dispatch for nodeshell.
//!
//! Commands declare typed schemas; input lines are tokenized, bound against the
//! schema of the named command and handed to its handler. Parsing and binding are
//! pure, so they can be tested without a host.

pub mod definitions;
pub mod extension;
pub mod handlers;
pub mod invocation;
pub mod output;
pub mod registry;
pub mod router;
pub mod tokenizer;
pub mod type_spec;
pub mod value;

pub use definitions::{ArgumentDef, CommandSchema, DefinitionError, OptionDef, SchemaBuilder};
pub use extension::{Extensible, ExtensionTable};
pub use handlers::{handler_fn, Command, CommandContext, CommandHandler};
pub use invocation::CommandInvocation;
pub use output::{CommandResult, ControlAction};
pub use registry::{CommandRegistry, RegisteredCommand};
pub use router::{CommandRouter, DispatchError};
pub use tokenizer::tokenize;
pub use type_spec::{TypeKind, TypeSpec, TypeSpecError, TypeUnion};
pub use value::Value;
