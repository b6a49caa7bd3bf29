#![forbid(unsafe_code)]

//! Line-driven front end.
//!
//! Each count is shown by a virtual `kor-input[type=number]` element bound
//! to its field, so `set` goes through the same path as a user typing into
//! the form: element event, accessor, field, group, store.

use std::fmt::Write as _;
use std::rc::Rc;

use necro_runtime::form::{
    BindingDirective, FieldValue, FormError, PartKind, ValueAccessorRegistry, parse_number,
};
use necro_runtime::{ElementLifecycle, ViewElement, VirtualElement};
use rand::Rng;
use thiserror::Error;
use tracing::debug;

use crate::app::{AppError, NecRomancer};
use crate::render::render_rolls;

pub const HELP: &str = "\
commands:
  set <field> <n>   change a count (skeletons, skeletonWeapons, zombies)
  show              print the current counts and the saved record
  roll              roll every armed skeleton and every zombie
  back | forward    step through earlier rolls
  help              this text
  quit              leave";

/// What the caller should do after a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Print the text and read the next line.
    Continue(String),
    Quit,
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("unknown command `{0}`; try `help`")]
    Unknown(String),

    #[error("usage: {0}")]
    Usage(&'static str),

    #[error(transparent)]
    App(#[from] AppError),
}

impl From<FormError> for CommandError {
    fn from(err: FormError) -> Self {
        Self::App(AppError::Form(err))
    }
}

/// The app plus one bound element per field.
pub struct Console {
    app: NecRomancer,
    elements: Vec<(String, VirtualElement)>,
    directives: Vec<BindingDirective>,
}

impl Console {
    /// Connect `app` and bind an element to each of its fields.
    pub fn new(mut app: NecRomancer, registry: Rc<ValueAccessorRegistry>) -> Result<Self, AppError> {
        app.connect();
        let names: Vec<String> = app.field_names().map(str::to_string).collect();
        let mut elements = Vec::with_capacity(names.len());
        let mut directives = Vec::with_capacity(names.len());
        for name in names {
            let element = VirtualElement::new("kor-input")
                .with_attribute("type", "number")
                .with_attribute("label", &name);
            let mut directive = BindingDirective::new(PartKind::Element, app.control(&name)?, Rc::clone(&registry))?;
            directive.on_attach(Rc::new(element.clone()))?;
            debug!(field = %name, accessor = ?directive.accessor_name(), "console field bound");
            elements.push((name, element));
            directives.push(directive);
        }
        Ok(Self {
            app,
            elements,
            directives,
        })
    }

    #[must_use]
    pub fn app(&self) -> &NecRomancer {
        &self.app
    }

    /// The element bound to `field`.
    #[must_use]
    pub fn element(&self, field: &str) -> Option<&VirtualElement> {
        self.elements
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, element)| element)
    }

    /// Run one command line.
    pub fn execute<R: Rng + ?Sized>(&mut self, line: &str, rng: &mut R) -> Result<Outcome, CommandError> {
        let mut words = line.split_whitespace();
        let Some(command) = words.next() else {
            return Ok(Outcome::Continue(String::new()));
        };
        let text = match command {
            "set" => {
                let (Some(field), Some(value), None) = (words.next(), words.next(), words.next()) else {
                    return Err(CommandError::Usage("set <field> <n>"));
                };
                self.set(field, value)?
            }
            "show" => self.show()?,
            "roll" => render_rolls(&self.app.roll_minions(rng)?),
            "back" => self.navigate(NecRomancer::back, "no earlier rolls"),
            "forward" => self.navigate(NecRomancer::forward, "no later rolls"),
            "help" => HELP.to_string(),
            "quit" | "exit" => return Ok(Outcome::Quit),
            other => return Err(CommandError::Unknown(other.to_string())),
        };
        Ok(Outcome::Continue(text))
    }

    fn set(&self, field: &str, value: &str) -> Result<String, CommandError> {
        let element = self
            .element(field)
            .ok_or_else(|| FormError::UnknownField(field.to_string()))?;
        let before = self.app.field(field)?.get_value();
        element.user_input(value);

        let now = self.app.field(field)?.get_value();
        let accepted = now != before || parse_number(value).and_then(u32::from_view) == Some(now);
        if accepted {
            Ok(format!("{field} = {now}"))
        } else {
            Ok(format!("ignored `{value}`: {field} stays {now}"))
        }
    }

    fn show(&self) -> Result<String, CommandError> {
        let state = self.app.state()?;
        let mut out = String::new();
        for (name, element) in &self.elements {
            let shown = element.attribute("value").unwrap_or_default();
            let _ = writeln!(out, "{name:<16}{shown}");
        }
        let _ = writeln!(out, "armed skeletons attacking: {}", state.skeletons.min(state.skeleton_weapons));
        let _ = write!(out, "saved: {}", self.app.stored_json());
        Ok(out)
    }

    fn navigate(&self, step: fn(&NecRomancer) -> bool, at_end: &str) -> String {
        if !step(&self.app) {
            return at_end.to_string();
        }
        match self.app.rolls() {
            Some(rolls) => render_rolls(&rolls),
            None => "(before the first roll)".to_string(),
        }
    }
}

impl Drop for Console {
    fn drop(&mut self) {
        for directive in &mut self.directives {
            directive.on_detach();
        }
        self.app.disconnect();
    }
}

impl std::fmt::Debug for Console {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Console")
            .field("app", &self.app)
            .field("directives", &self.directives)
            .finish()
    }
}
