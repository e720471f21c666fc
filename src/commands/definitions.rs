//! Command definitions for declarative command metadata.
//!
//! Commands describe themselves with a [`SchemaBuilder`]: name, description, usage,
//! ordered positional arguments and flagged options, each slot typed by a type
//! descriptor string. Building the schema parses every descriptor, so malformed
//! definitions surface once at startup instead of on every dispatch.

use std::collections::HashSet;
use std::fmt::Write as _;

use thiserror::Error;
use tracing::warn;

use super::type_spec::{TypeSpecError, TypeUnion};
use super::value::Value;

/// Errors raised while building a command schema.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DefinitionError {
    /// The command has no name.
    #[error("command name must not be empty")]
    EmptyName,

    /// Every alternative of a slot's type descriptor failed to parse.
    #[error("invalid type '{descriptor}' for '{slot}' in command '{command}': {reasons}")]
    InvalidSlot {
        command: String,
        slot: String,
        descriptor: String,
        reasons: String,
    },

    /// An option flag does not look like a flag.
    #[error("option '{flag}' in command '{command}' must start with '-'")]
    InvalidFlag { command: String, flag: String },

    /// Two arguments or two options share a name.
    #[error("duplicate {kind} '{name}' in command '{command}'")]
    Duplicate {
        command: String,
        kind: &'static str,
        name: String,
    },

    /// A `choice` slot was declared without any allowed values.
    #[error("choice slot '{slot}' in command '{command}' declares no choices")]
    MissingChoices { command: String, slot: String },
}

/// Definition of a positional argument.
#[derive(Debug, Clone, PartialEq)]
pub struct ArgumentDef {
    /// Argument name, used as the key in the bound invocation.
    pub name: String,
    /// Short description.
    pub description: String,
    /// Accepted types, tried in order.
    pub types: TypeUnion,
    /// Allowed values for `choice` alternatives.
    pub choices: Vec<String>,
}

/// Definition of a flagged option.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionDef {
    /// Flag token, e.g. `-x`.
    pub flag: String,
    /// Short description.
    pub description: String,
    /// Accepted value types. Empty means a boolean presence flag.
    pub types: TypeUnion,
    /// Value used when the option is absent from the input.
    pub default: Value,
    /// Allowed values for `choice` alternatives.
    pub choices: Vec<String>,
}

impl OptionDef {
    /// Whether this option is a presence flag that takes no value.
    pub fn is_presence_flag(&self) -> bool {
        self.types.is_empty()
    }
}

/// Definition of a command.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandSchema {
    /// Unique command name.
    pub name: String,
    /// Short description shown in help.
    pub description: String,
    /// Usage line.
    pub usage: String,
    /// Positional arguments, in order.
    pub arguments: Vec<ArgumentDef>,
    /// Options, in declaration order.
    pub options: Vec<OptionDef>,
}

impl CommandSchema {
    /// Starts a schema definition.
    pub fn builder(name: impl Into<String>, description: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder::new(name, description)
    }

    /// Looks up an option by its flag.
    pub fn option(&self, flag: &str) -> Option<&OptionDef> {
        self.options.iter().find(|o| o.flag == flag)
    }

    /// Renders detailed help for this command.
    pub fn help_text(&self) -> String {
        let mut text = format!("{} - {}\nUsage: {}", self.name, self.description, self.usage);

        if !self.arguments.is_empty() {
            text.push_str("\n\nArguments:");
            for arg in &self.arguments {
                let _ = write!(
                    text,
                    "\n  {:<16} {:<16} {}",
                    arg.name,
                    arg.types.to_string(),
                    arg.description
                );
                if !arg.choices.is_empty() {
                    let _ = write!(text, " ({})", arg.choices.join(", "));
                }
            }
        }

        if !self.options.is_empty() {
            text.push_str("\n\nOptions:");
            for opt in &self.options {
                let kind = if opt.is_presence_flag() {
                    "flag".to_string()
                } else {
                    opt.types.to_string()
                };
                let _ = write!(
                    text,
                    "\n  {:<16} {:<16} {} (default: {})",
                    opt.flag, kind, opt.description, opt.default
                );
            }
        }

        text
    }

    fn generated_usage(name: &str, arguments: &[ArgumentDef], options: &[OptionDef]) -> String {
        let mut usage = name.to_string();
        for arg in arguments {
            let dots = if arg.types.has_array() { "..." } else { "" };
            let _ = write!(usage, " <{}{}>", arg.name, dots);
        }
        for opt in options {
            if opt.is_presence_flag() {
                let _ = write!(usage, " [{}]", opt.flag);
            } else {
                let _ = write!(usage, " [{} <{}>]", opt.flag, opt.types);
            }
        }
        usage
    }
}

/// A slot as declared, before its descriptor is parsed.
#[derive(Debug, Clone)]
struct SlotDraft {
    name: String,
    descriptor: Option<String>,
    description: String,
    default: Value,
    choices: Vec<String>,
}

/// Builder for [`CommandSchema`].
#[derive(Debug, Clone)]
pub struct SchemaBuilder {
    name: String,
    description: String,
    usage: Option<String>,
    arguments: Vec<SlotDraft>,
    options: Vec<SlotDraft>,
    last_is_option: bool,
}

impl SchemaBuilder {
    /// Creates a builder for the named command.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            usage: None,
            arguments: Vec::new(),
            options: Vec::new(),
            last_is_option: false,
        }
    }

    /// Sets an explicit usage line. Without one, usage is generated from the slots.
    pub fn usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = Some(usage.into());
        self
    }

    /// Declares the next positional argument.
    pub fn argument(
        mut self,
        name: impl Into<String>,
        descriptor: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        self.arguments.push(SlotDraft {
            name: name.into(),
            descriptor: Some(descriptor.into()),
            description: description.into(),
            default: Value::Null,
            choices: Vec::new(),
        });
        self.last_is_option = false;
        self
    }

    /// Declares an option. A `None` descriptor makes it a presence flag.
    pub fn option(
        mut self,
        flag: impl Into<String>,
        descriptor: Option<&str>,
        description: impl Into<String>,
        default: impl Into<Value>,
    ) -> Self {
        self.options.push(SlotDraft {
            name: flag.into(),
            descriptor: descriptor.map(str::to_string),
            description: description.into(),
            default: default.into(),
            choices: Vec::new(),
        });
        self.last_is_option = true;
        self
    }

    /// Declares a presence flag defaulting to `false`.
    pub fn flag(self, flag: impl Into<String>, description: impl Into<String>) -> Self {
        self.option(flag, None, description, false)
    }

    /// Sets the allowed values of the most recently declared slot.
    pub fn choices<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let target = if self.last_is_option {
            self.options.last_mut()
        } else {
            self.arguments.last_mut()
        };
        if let Some(slot) = target {
            slot.choices = values.into_iter().map(Into::into).collect();
        }
        self
    }

    /// Parses every descriptor and produces the schema.
    ///
    /// Alternatives that fail to parse are dropped with a warning; a slot whose
    /// alternatives all fail makes the whole definition invalid.
    pub fn build(self) -> Result<CommandSchema, DefinitionError> {
        let command = self.name.trim().to_string();
        if command.is_empty() {
            return Err(DefinitionError::EmptyName);
        }

        let mut seen = HashSet::new();
        let mut arguments = Vec::with_capacity(self.arguments.len());
        for draft in self.arguments {
            if !seen.insert(draft.name.clone()) {
                return Err(DefinitionError::Duplicate {
                    command,
                    kind: "argument",
                    name: draft.name,
                });
            }
            let types = parse_slot(&command, &draft)?;
            arguments.push(ArgumentDef {
                name: draft.name,
                description: draft.description,
                types,
                choices: draft.choices,
            });
        }

        let mut seen = HashSet::new();
        let mut options = Vec::with_capacity(self.options.len());
        for draft in self.options {
            if !draft.name.starts_with('-') || draft.name.len() < 2 {
                return Err(DefinitionError::InvalidFlag {
                    command,
                    flag: draft.name,
                });
            }
            if !seen.insert(draft.name.clone()) {
                return Err(DefinitionError::Duplicate {
                    command,
                    kind: "option",
                    name: draft.name,
                });
            }
            let types = parse_slot(&command, &draft)?;
            options.push(OptionDef {
                flag: draft.name,
                description: draft.description,
                types,
                default: draft.default,
                choices: draft.choices,
            });
        }

        let usage = self
            .usage
            .unwrap_or_else(|| CommandSchema::generated_usage(&command, &arguments, &options));

        Ok(CommandSchema {
            name: command,
            description: self.description,
            usage,
            arguments,
            options,
        })
    }
}

fn parse_slot(command: &str, draft: &SlotDraft) -> Result<TypeUnion, DefinitionError> {
    let Some(descriptor) = draft.descriptor.as_deref() else {
        return Ok(TypeUnion::default());
    };

    let (types, errors) = TypeUnion::parse(descriptor);

    if types.is_empty() {
        return Err(DefinitionError::InvalidSlot {
            command: command.to_string(),
            slot: draft.name.clone(),
            descriptor: descriptor.to_string(),
            reasons: join_errors(&errors),
        });
    }

    for error in &errors {
        warn!(
            command,
            slot = %draft.name,
            descriptor,
            "dropping type alternative: {}",
            error
        );
    }

    if types.has_choice() && draft.choices.is_empty() {
        return Err(DefinitionError::MissingChoices {
            command: command.to_string(),
            slot: draft.name.clone(),
        });
    }

    Ok(types)
}

fn join_errors(errors: &[TypeSpecError]) -> String {
    if errors.is_empty() {
        return "no type given".to_string();
    }
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
