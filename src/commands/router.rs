//! Command parsing and routing.
//!
//! Resolves the command named by the first token, binds the remaining tokens to
//! its schema and hands the bound invocation to the handler. Every failure here
//! becomes a failed [`CommandResult`]; nothing unwinds.

use std::collections::HashMap;

use thiserror::Error;
use tracing::debug;

use super::definitions::CommandSchema;
use super::handlers::CommandContext;
use super::invocation::CommandInvocation;
use super::output::CommandResult;
use super::tokenizer::{split_clean, tokenize};
use super::type_spec::{parse_bool, TypeUnion};
use super::value::Value;

/// Errors raised while resolving and binding a command.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DispatchError {
    /// No tokens were given.
    #[error("empty command")]
    Empty,

    /// No command with this name is registered.
    #[error("Unknown command: {0}. Type help for available commands.")]
    UnknownCommand(String),

    /// Fewer positional tokens than declared arguments.
    #[error("{command}: missing argument '{argument}'. Usage: {usage}")]
    MissingArgument {
        command: String,
        argument: String,
        usage: String,
    },

    /// A valued option was the last token.
    #[error("{command}: option '{flag}' expects a value of type {expected}")]
    MissingOptionValue {
        command: String,
        flag: String,
        expected: String,
    },

    /// No type alternative accepted the value.
    #[error("{command}: invalid value '{value}' for '{slot}', expected {expected}")]
    InvalidValue {
        command: String,
        slot: String,
        value: String,
        expected: String,
    },
}

/// Command router for parsing and dispatching user input.
pub struct CommandRouter;

impl CommandRouter {
    /// Tokenizes a line and dispatches it.
    ///
    /// Handlers also see the untouched text after the command name in
    /// [`CommandInvocation::line`].
    pub fn execute_line(line: &str, ctx: &mut CommandContext<'_>) -> CommandResult {
        let remainder = line
            .trim()
            .split_once(char::is_whitespace)
            .map_or("", |(_, rest)| rest.trim_start());
        Self::route(&tokenize(line), remainder, ctx)
    }

    /// Dispatches already tokenized input.
    pub fn dispatch(tokens: &[String], ctx: &mut CommandContext<'_>) -> CommandResult {
        let remainder = tokens.get(1..).unwrap_or_default().join(" ");
        Self::route(tokens, &remainder, ctx)
    }

    fn route(tokens: &[String], remainder: &str, ctx: &mut CommandContext<'_>) -> CommandResult {
        let Some((name, rest)) = tokens.split_first() else {
            return CommandResult::failure(DispatchError::Empty.to_string());
        };

        let registry = ctx.registry;
        let Some(entry) = registry.get(name) else {
            debug!(command = %name, "unknown command");
            return CommandResult::failure(DispatchError::UnknownCommand(name.clone()).to_string());
        };

        let mut invocation = match Self::bind(&entry.schema, rest) {
            Ok(invocation) => invocation,
            Err(e) => {
                debug!(command = %name, error = %e, "binding failed");
                return CommandResult::failure(e.to_string());
            }
        };

        invocation.line = remainder.to_string();

        debug!(
            command = %invocation.command,
            arguments = invocation.arguments.len(),
            "dispatching"
        );
        entry.handler.execute(&invocation, ctx)
    }

    /// Binds tokens (without the command name) against a schema.
    ///
    /// Options are pulled out first, wherever they appear. The remaining tokens fill
    /// the arguments left to right; an array argument takes a contiguous run, leaving
    /// one token for each argument after it. Surplus tokens stay available in `raw`.
    pub fn bind(schema: &CommandSchema, tokens: &[String]) -> Result<CommandInvocation, DispatchError> {
        let mut options: HashMap<String, Value> = HashMap::new();
        let mut positional: Vec<&str> = Vec::with_capacity(tokens.len());

        let mut i = 0;
        while i < tokens.len() {
            let token = tokens[i].as_str();
            let (flag, inline) = match token.split_once('=') {
                Some((flag, value)) if schema.option(flag).is_some() => (flag, Some(value)),
                _ => (token, None),
            };

            let Some(opt) = schema.option(flag) else {
                positional.push(token);
                i += 1;
                continue;
            };

            let value = if opt.is_presence_flag() {
                match inline {
                    None => Value::Bool(true),
                    Some(text) => parse_bool(text).map(Value::Bool).ok_or_else(|| {
                        DispatchError::InvalidValue {
                            command: schema.name.clone(),
                            slot: opt.flag.clone(),
                            value: text.to_string(),
                            expected: "bool".to_string(),
                        }
                    })?,
                }
            } else {
                let text = match inline {
                    Some(text) => text,
                    None => {
                        i += 1;
                        tokens.get(i).map(String::as_str).ok_or_else(|| {
                            DispatchError::MissingOptionValue {
                                command: schema.name.clone(),
                                flag: opt.flag.clone(),
                                expected: expected(&opt.types, &opt.choices),
                            }
                        })?
                    }
                };
                coerce_text(&opt.types, &opt.choices, text).ok_or_else(|| {
                    DispatchError::InvalidValue {
                        command: schema.name.clone(),
                        slot: opt.flag.clone(),
                        value: text.to_string(),
                        expected: expected(&opt.types, &opt.choices),
                    }
                })?
            };

            options.insert(opt.flag.clone(), value);
            i += 1;
        }

        for opt in &schema.options {
            options
                .entry(opt.flag.clone())
                .or_insert_with(|| opt.default.clone());
        }

        let mut arguments = HashMap::with_capacity(schema.arguments.len());
        let mut cursor = 0;
        let count = schema.arguments.len();

        for (index, arg) in schema.arguments.iter().enumerate() {
            let available = positional.len().saturating_sub(cursor);
            if available == 0 {
                return Err(DispatchError::MissingArgument {
                    command: schema.name.clone(),
                    argument: arg.name.clone(),
                    usage: schema.usage.clone(),
                });
            }

            let take = if arg.types.has_array() {
                let later = count - index - 1;
                available.saturating_sub(later).max(1)
            } else {
                1
            };
            let run = &positional[cursor..cursor + take];
            cursor += take;

            let value = coerce_tokens(&arg.types, &arg.choices, run).ok_or_else(|| {
                DispatchError::InvalidValue {
                    command: schema.name.clone(),
                    slot: arg.name.clone(),
                    value: run.join(" "),
                    expected: expected(&arg.types, &arg.choices),
                }
            })?;
            arguments.insert(arg.name.clone(), value);
        }

        if cursor < positional.len() {
            debug!(
                command = %schema.name,
                surplus = positional.len() - cursor,
                "tokens left unbound"
            );
        }

        Ok(CommandInvocation {
            command: schema.name.clone(),
            arguments,
            options,
            raw: tokens.to_vec(),
            line: tokens.join(" "),
        })
    }
}

/// Coerces positional tokens: scalars take exactly one token, arrays take each token.
fn coerce_tokens(types: &TypeUnion, choices: &[String], tokens: &[&str]) -> Option<Value> {
    types.specs().iter().find_map(|spec| {
        if spec.is_array {
            tokens
                .iter()
                .map(|t| spec.coerce_scalar(t, choices))
                .collect::<Option<Vec<_>>>()
                .map(Value::List)
        } else {
            match tokens {
                [single] => spec.coerce_scalar(single, choices),
                _ => None,
            }
        }
    })
}

/// Coerces an option value: scalars take the text, arrays split it on commas.
fn coerce_text(types: &TypeUnion, choices: &[String], text: &str) -> Option<Value> {
    types.specs().iter().find_map(|spec| {
        if spec.is_array {
            split_clean(text, ",")
                .iter()
                .map(|piece| spec.coerce_scalar(piece, choices))
                .collect::<Option<Vec<_>>>()
                .map(Value::List)
        } else {
            spec.coerce_scalar(text, choices)
        }
    })
}

fn expected(types: &TypeUnion, choices: &[String]) -> String {
    if types.has_choice() {
        format!("{} (one of: {})", types, choices.join(", "))
    } else {
        types.to_string()
    }
}
