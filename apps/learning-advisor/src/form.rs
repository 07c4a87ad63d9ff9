//! Draft records edited in the terminal.
//!
//! Every field holds text until submit. There is no native required-attribute
//! handling in a terminal, so [`Form::validate`] checks required fields,
//! numeric bounds and email shape explicitly before anything is sent.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use regex::Regex;
use std::sync::LazyLock;

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("email pattern")
});

#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    Text,
    Email,
    Number { min: f64, max: f64, integer: bool },
    /// One of a fixed list. An empty value means nothing chosen.
    Choice(Vec<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub placeholder: &'static str,
    pub value: String,
}

impl Field {
    pub fn text(key: &'static str, label: &'static str) -> Self {
        Self {
            key,
            label,
            kind: FieldKind::Text,
            required: false,
            placeholder: "",
            value: String::new(),
        }
    }

    pub fn email(key: &'static str, label: &'static str) -> Self {
        Self {
            kind: FieldKind::Email,
            ..Self::text(key, label)
        }
    }

    pub fn number(key: &'static str, label: &'static str, min: f64, max: f64) -> Self {
        Self {
            kind: FieldKind::Number {
                min,
                max,
                integer: false,
            },
            ..Self::text(key, label)
        }
    }

    pub fn year(key: &'static str, label: &'static str, min: f64, max: f64) -> Self {
        Self {
            kind: FieldKind::Number {
                min,
                max,
                integer: true,
            },
            ..Self::text(key, label)
        }
    }

    pub fn choice<S: AsRef<str>>(key: &'static str, label: &'static str, options: &[S]) -> Self {
        Self {
            kind: FieldKind::Choice(options.iter().map(|o| o.as_ref().to_string()).collect()),
            ..Self::text(key, label)
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn placeholder(mut self, placeholder: &'static str) -> Self {
        self.placeholder = placeholder;
        self
    }

    pub fn is_choice(&self) -> bool {
        matches!(self.kind, FieldKind::Choice(_))
    }

    fn accepts(&self, c: char) -> bool {
        match self.kind {
            FieldKind::Choice(_) => false,
            FieldKind::Number { integer, .. } => {
                c.is_ascii_digit() || (!integer && (c == '.' || c == '-'))
            }
            _ => !c.is_control(),
        }
    }

    /// Step a choice field through its options. Optional fields include the
    /// empty "nothing chosen" position.
    fn cycle(&mut self, forward: bool) {
        let FieldKind::Choice(options) = &self.kind else {
            return;
        };
        if options.is_empty() {
            return;
        }

        let mut positions: Vec<&str> = Vec::with_capacity(options.len() + 1);
        if !self.required {
            positions.push("");
        }
        positions.extend(options.iter().map(String::as_str));

        let current = positions.iter().position(|p| *p == self.value);
        let next = match (current, forward) {
            (None, _) => 0,
            (Some(i), true) => (i + 1) % positions.len(),
            (Some(0), false) => positions.len() - 1,
            (Some(i), false) => i - 1,
        };
        self.value = positions[next].to_string();
    }

    fn validate(&self) -> Result<(), String> {
        let value = self.value.trim();
        if value.is_empty() {
            if self.required {
                return Err(format!("{} is required", self.label));
            }
            return Ok(());
        }

        match &self.kind {
            FieldKind::Number { min, max, integer } => {
                let number: f64 = value
                    .parse()
                    .map_err(|_| format!("{} must be a number", self.label))?;
                if *integer && number.fract() != 0.0 {
                    return Err(format!("{} must be a whole number", self.label));
                }
                if number < *min || number > *max {
                    return Err(format!("{} must be between {} and {}", self.label, min, max));
                }
                Ok(())
            }
            FieldKind::Email => {
                if EMAIL.is_match(value) {
                    Ok(())
                } else {
                    Err(format!("{} is not a valid email address", self.label))
                }
            }
            // Records loaded for editing may carry values outside the list.
            FieldKind::Choice(_) | FieldKind::Text => Ok(()),
        }
    }
}

/// What a key press did to the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormInput {
    Edited,
    Moved,
    Submit,
    Cancel,
    Ignored,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Form {
    pub fields: Vec<Field>,
    pub focus: usize,
}

impl Form {
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields, focus: 0 }
    }

    pub fn value(&self, key: &str) -> &str {
        self.fields
            .iter()
            .find(|f| f.key == key)
            .map(|f| f.value.trim())
            .unwrap_or("")
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        if let Some(field) = self.fields.iter_mut().find(|f| f.key == key) {
            field.value = value.into();
        }
    }

    pub fn focused(&self) -> Option<&Field> {
        self.fields.get(self.focus)
    }

    pub fn focus_next(&mut self) {
        if !self.fields.is_empty() {
            self.focus = (self.focus + 1) % self.fields.len();
        }
    }

    pub fn focus_previous(&mut self) {
        if !self.fields.is_empty() {
            self.focus = self.focus.checked_sub(1).unwrap_or(self.fields.len() - 1);
        }
    }

    /// Clear every value and return focus to the first field.
    pub fn reset(&mut self) {
        for field in &mut self.fields {
            field.value.clear();
        }
        self.focus = 0;
    }

    pub fn is_blank(&self) -> bool {
        self.fields.iter().all(|f| f.value.trim().is_empty())
    }

    /// First problem found, in field order.
    pub fn validate(&self) -> Result<(), String> {
        self.fields.iter().try_for_each(Field::validate)
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> FormInput {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return FormInput::Ignored;
        }

        match key.code {
            KeyCode::Esc => FormInput::Cancel,
            KeyCode::Enter => FormInput::Submit,
            KeyCode::Tab | KeyCode::Down => {
                self.focus_next();
                FormInput::Moved
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.focus_previous();
                FormInput::Moved
            }
            KeyCode::Left | KeyCode::Right => match self.fields.get_mut(self.focus) {
                Some(field) if field.is_choice() => {
                    field.cycle(key.code == KeyCode::Right);
                    FormInput::Edited
                }
                _ => FormInput::Ignored,
            },
            KeyCode::Char(' ') if self.focused().is_some_and(Field::is_choice) => {
                if let Some(field) = self.fields.get_mut(self.focus) {
                    field.cycle(true);
                }
                FormInput::Edited
            }
            KeyCode::Backspace => match self.fields.get_mut(self.focus) {
                Some(field) if !field.is_choice() => {
                    field.value.pop();
                    FormInput::Edited
                }
                _ => FormInput::Ignored,
            },
            KeyCode::Char(c) => match self.fields.get_mut(self.focus) {
                Some(field) if field.accepts(c) => {
                    field.value.push(c);
                    FormInput::Edited
                }
                _ => FormInput::Ignored,
            },
            _ => FormInput::Ignored,
        }
    }
}
