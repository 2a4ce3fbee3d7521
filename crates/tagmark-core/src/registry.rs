//! Macro registration.
//!
//! Maps macro names to handlers. Populated before parsing and read-only
//! while a [`MacroScanner`](crate::MacroScanner) borrows it.

use std::collections::HashMap;
use std::fmt;

use crate::context::MacroContext;
use crate::node::MacroNode;
use crate::props::Properties;
use crate::template::{TemplateError, TemplateHandler};

/// Block handler signature: `(content, properties, context)`.
pub type BlockFn =
    dyn Fn(&str, &Properties, &MacroContext<'_>) -> Option<MacroNode> + Send + Sync;

/// Inline handler signature: `(properties, context)`.
pub type InlineFn = dyn Fn(&Properties, &MacroContext<'_>) -> Option<MacroNode> + Send + Sync;

/// Registration error.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RegistryError {
    /// A macro with this name is already registered.
    #[error("Cannot redefine the macro {name}. One already exists")]
    Duplicate {
        /// Macro name.
        name: String,
    },
    /// The name can never be matched by a tag.
    #[error("Invalid macro name {name:?}: expected one or more of [A-Za-z0-9_]")]
    InvalidName {
        /// Macro name.
        name: String,
    },
    /// The handler failed validation.
    #[error("Invalid handler for macro {name}: {source}")]
    InvalidHandler {
        /// Macro name.
        name: String,
        /// Why the template was rejected.
        #[source]
        source: TemplateError,
    },
}

/// Macro handler.
///
/// Returning `None` consumes the macro span without emitting a node.
pub enum Handler {
    /// Block macro: `[name props]` ... `[/name]`.
    Block(Box<BlockFn>),
    /// Inline macro: `[name props]`.
    Inline(Box<InlineFn>),
    /// Template-expanded macro, block or inline.
    Template {
        /// Parsed template.
        template: TemplateHandler,
        /// Whether the macro has no body.
        inline: bool,
    },
}

impl Handler {
    /// Create a block handler from a closure.
    pub fn block<F>(f: F) -> Self
    where
        F: Fn(&str, &Properties, &MacroContext<'_>) -> Option<MacroNode> + Send + Sync + 'static,
    {
        Self::Block(Box::new(f))
    }

    /// Create an inline handler from a closure.
    pub fn inline<F>(f: F) -> Self
    where
        F: Fn(&Properties, &MacroContext<'_>) -> Option<MacroNode> + Send + Sync + 'static,
    {
        Self::Inline(Box::new(f))
    }

    /// Whether the macro is written without a body or closing tag.
    #[must_use]
    pub fn is_inline(&self) -> bool {
        match self {
            Self::Block(_) => false,
            Self::Inline(_) => true,
            Self::Template { inline, .. } => *inline,
        }
    }

    pub(crate) fn expand_block(
        &self,
        content: &str,
        props: &Properties,
        ctx: &MacroContext<'_>,
    ) -> Option<MacroNode> {
        match self {
            Self::Block(f) => f(content, props, ctx),
            Self::Inline(f) => f(props, ctx),
            Self::Template { template, .. } => Some(template.expand(content, props, ctx)),
        }
    }

    pub(crate) fn expand_inline(
        &self,
        props: &Properties,
        ctx: &MacroContext<'_>,
    ) -> Option<MacroNode> {
        self.expand_block("", props, ctx)
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Block(_) => f.write_str("Handler::Block(..)"),
            Self::Inline(_) => f.write_str("Handler::Inline(..)"),
            Self::Template { template, inline } => f
                .debug_struct("Handler::Template")
                .field("template", template)
                .field("inline", inline)
                .finish(),
        }
    }
}

/// A registered macro.
#[derive(Debug)]
pub struct MacroDefinition {
    name: String,
    handler: Handler,
}

impl MacroDefinition {
    /// Macro name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Registered handler.
    #[must_use]
    pub fn handler(&self) -> &Handler {
        &self.handler
    }

    /// Whether the macro is inline.
    #[must_use]
    pub fn is_inline(&self) -> bool {
        self.handler.is_inline()
    }
}

/// Name → handler registry.
///
/// # Example
///
/// ```
/// use tagmark_core::{MacroNode, MacroRegistry};
///
/// let mut registry = MacroRegistry::new();
/// registry
///     .register_block("alert", |content, _props, _ctx| {
///         Some(MacroNode::html(format!("<div class=\"alert\">{content}</div>")))
///     })?
///     .register_inline("codepen", |props, _ctx| {
///         props.get("src").map(MacroNode::text)
///     })?;
///
/// assert!(registry.register_block("alert", |_, _, _| None).is_err());
/// assert!(registry.resolve("codepen").is_some_and(|m| m.is_inline()));
/// # Ok::<(), tagmark_core::RegistryError>(())
/// ```
#[derive(Debug, Default)]
pub struct MacroRegistry {
    macros: HashMap<String, MacroDefinition>,
}

impl MacroRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a macro.
    ///
    /// Fails if the name is already taken or can never appear in a tag.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        handler: Handler,
    ) -> Result<&mut Self, RegistryError> {
        let name = name.into();

        if !is_valid_macro_name(&name) {
            return Err(RegistryError::InvalidName { name });
        }
        if self.macros.contains_key(&name) {
            return Err(RegistryError::Duplicate { name });
        }

        tracing::debug!(name = %name, inline = handler.is_inline(), "Registered macro");
        self.macros
            .insert(name.clone(), MacroDefinition { name, handler });
        Ok(self)
    }

    /// Register a block macro from a closure.
    pub fn register_block<F>(
        &mut self,
        name: impl Into<String>,
        f: F,
    ) -> Result<&mut Self, RegistryError>
    where
        F: Fn(&str, &Properties, &MacroContext<'_>) -> Option<MacroNode> + Send + Sync + 'static,
    {
        self.register(name, Handler::block(f))
    }

    /// Register an inline macro from a closure.
    pub fn register_inline<F>(
        &mut self,
        name: impl Into<String>,
        f: F,
    ) -> Result<&mut Self, RegistryError>
    where
        F: Fn(&Properties, &MacroContext<'_>) -> Option<MacroNode> + Send + Sync + 'static,
    {
        self.register(name, Handler::inline(f))
    }

    /// Register a macro expanded from a string template.
    ///
    /// An invalid template is rejected as an invalid handler.
    pub fn register_template(
        &mut self,
        name: impl Into<String>,
        template: &str,
        inline: bool,
    ) -> Result<&mut Self, RegistryError> {
        let name = name.into();
        match TemplateHandler::parse(template) {
            Ok(template) => self.register(name, Handler::Template { template, inline }),
            Err(source) => Err(RegistryError::InvalidHandler { name, source }),
        }
    }

    /// Look up a macro by name.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<&MacroDefinition> {
        self.macros.get(name)
    }

    /// Check whether a name is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.macros.contains_key(name)
    }

    /// Registered names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.macros.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of registered macros.
    #[must_use]
    pub fn len(&self) -> usize {
        self.macros.len()
    }

    /// Check if no macros are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.macros.is_empty()
    }
}

/// Check if a name can be matched by the opening-tag pattern.
///
/// Valid names contain only ASCII alphanumeric characters and underscores.
pub(crate) fn is_valid_macro_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}
