//! Todo input form: binding, validation and presentation metadata.
//!
//! # Responsibility
//! - Turn raw submitted field values into a `TodoDraft`.
//! - Report every failing field with human-readable messages.
//! - Describe how each field should be rendered.
//!
//! # Invariants
//! - A bound form yields either a complete draft or a non-empty error map,
//!   never both.
//! - Presentation metadata never affects validation.

use crate::model::todo::{Todo, TodoDraft, TITLE_MAX_CHARS};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Raw submitted values keyed by field name.
pub type FormData = BTreeMap<String, String>;

pub const FIELD_TITLE: &str = "title";
pub const FIELD_DESCRIPTION: &str = "description";
pub const FIELD_DUE_DATE: &str = "due_date";
pub const FIELD_RESOLVED: &str = "resolved";

const MSG_REQUIRED: &str = "This field is required.";
const MSG_INVALID_DATE: &str = "Enter a valid date.";
const MSG_INVALID_BOOLEAN: &str = "Enter a valid boolean.";

/// Accepted `due_date` input formats, tried in order.
pub const DATE_INPUT_FORMATS: [&str; 3] = ["%Y-%m-%d", "%m/%d/%y", "%m/%d/%Y"];

/// Input widget kind used by the rendering layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Widget {
    TextInput,
    Textarea { rows: u32 },
    /// Date-only picker (`<input type="date">`).
    DateInput,
    CheckboxInput,
}

/// Rendering hints for one form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub widget: Widget,
    pub css_class: &'static str,
    pub placeholder: Option<&'static str>,
    pub required: bool,
}

impl FieldSpec {
    /// Widget attributes as `(name, value)` pairs in stable order.
    pub fn html_attrs(&self) -> Vec<(&'static str, String)> {
        let mut attrs = vec![("class", self.css_class.to_string())];
        if let Some(placeholder) = self.placeholder {
            attrs.push(("placeholder", placeholder.to_string()));
        }
        match self.widget {
            Widget::Textarea { rows } => attrs.push(("rows", rows.to_string())),
            Widget::DateInput => attrs.push(("type", "date".to_string())),
            Widget::TextInput | Widget::CheckboxInput => {}
        }
        attrs
    }
}

/// Fields of the todo form in display order.
pub const TODO_FORM_FIELDS: [FieldSpec; 4] = [
    FieldSpec {
        name: FIELD_TITLE,
        label: "Title",
        widget: Widget::TextInput,
        css_class: "form-control",
        placeholder: Some("Enter TODO title"),
        required: true,
    },
    FieldSpec {
        name: FIELD_DESCRIPTION,
        label: "Description",
        widget: Widget::Textarea { rows: 3 },
        css_class: "form-control",
        placeholder: Some("Enter description (optional)"),
        required: false,
    },
    FieldSpec {
        name: FIELD_DUE_DATE,
        label: "Due date",
        widget: Widget::DateInput,
        css_class: "form-control",
        placeholder: None,
        required: false,
    },
    FieldSpec {
        name: FIELD_RESOLVED,
        label: "Resolved",
        widget: Widget::CheckboxInput,
        css_class: "form-check-input",
        placeholder: None,
        required: false,
    },
];

/// Looks up rendering hints by field name.
pub fn field_spec(name: &str) -> Option<&'static FieldSpec> {
    TODO_FORM_FIELDS.iter().find(|spec| spec.name == name)
}

/// Field-name to messages mapping produced by a failed bind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors {
    fields: BTreeMap<&'static str, Vec<String>>,
}

impl FormErrors {
    fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.fields.entry(field).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Messages for one field; empty when the field passed.
    pub fn get(&self, field: &str) -> &[String] {
        self.fields.get(field).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Iterates failing fields in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &[String])> + '_ {
        self.fields
            .iter()
            .map(|(field, messages)| (*field, messages.as_slice()))
    }
}

impl Display for FormErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, messages) in self.iter() {
            if !first {
                write!(f, "; ")?;
            }
            first = false;
            write!(f, "{field}: {}", messages.join(" "))?;
        }
        Ok(())
    }
}

impl Error for FormErrors {}

/// A todo form bound to submitted data.
#[derive(Debug, Clone)]
pub struct TodoForm {
    data: FormData,
    result: Result<TodoDraft, FormErrors>,
}

impl TodoForm {
    /// Binds raw values and validates them immediately.
    pub fn bind(data: FormData) -> Self {
        let result = clean(&data);
        Self { data, result }
    }

    /// Form data representing an existing record, for edit pre-fill.
    pub fn initial(todo: &Todo) -> FormData {
        let mut data = FormData::new();
        data.insert(FIELD_TITLE.to_string(), todo.title.clone());
        data.insert(
            FIELD_DESCRIPTION.to_string(),
            todo.description.clone().unwrap_or_default(),
        );
        data.insert(
            FIELD_DUE_DATE.to_string(),
            todo.due_date
                .map(|due| due.format(DATE_INPUT_FORMATS[0]).to_string())
                .unwrap_or_default(),
        );
        if todo.resolved {
            data.insert(FIELD_RESOLVED.to_string(), "on".to_string());
        }
        data
    }

    pub fn is_valid(&self) -> bool {
        self.result.is_ok()
    }

    /// Submitted raw values, for re-rendering after a failed bind.
    pub fn data(&self) -> &FormData {
        &self.data
    }

    /// Errors of a failed bind; `None` when valid.
    pub fn errors(&self) -> Option<&FormErrors> {
        self.result.as_ref().err()
    }

    pub fn into_result(self) -> Result<TodoDraft, FormErrors> {
        self.result
    }
}

fn clean(data: &FormData) -> Result<TodoDraft, FormErrors> {
    let mut errors = FormErrors::default();

    let title = clean_title(data.get(FIELD_TITLE)).unwrap_or_else(|message| {
        errors.add(FIELD_TITLE, message);
        String::new()
    });
    let description = data
        .get(FIELD_DESCRIPTION)
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .map(str::to_string);
    let due_date = clean_due_date(data.get(FIELD_DUE_DATE)).unwrap_or_else(|message| {
        errors.add(FIELD_DUE_DATE, message);
        None
    });
    let resolved = clean_resolved(data.get(FIELD_RESOLVED)).unwrap_or_else(|message| {
        errors.add(FIELD_RESOLVED, message);
        false
    });

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(TodoDraft {
        title,
        description,
        due_date,
        resolved,
    })
}

fn clean_title(raw: Option<&String>) -> Result<String, String> {
    let value = raw.map(|value| value.trim()).unwrap_or_default();
    if value.is_empty() {
        return Err(MSG_REQUIRED.to_string());
    }
    let len = value.chars().count();
    if len > TITLE_MAX_CHARS {
        return Err(format!(
            "Ensure this value has at most {TITLE_MAX_CHARS} characters (it has {len})."
        ));
    }
    Ok(value.to_string())
}

fn clean_due_date(raw: Option<&String>) -> Result<Option<NaiveDate>, String> {
    let value = raw.map(|value| value.trim()).unwrap_or_default();
    if value.is_empty() {
        return Ok(None);
    }
    DATE_INPUT_FORMATS
        .iter()
        .filter(|format| year_has_expected_width(value, format))
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
        .map(Some)
        .ok_or_else(|| MSG_INVALID_DATE.to_string())
}

/// chrono's `%Y` takes any number of digits and a sign, so the year part is
/// checked up front: four digits for `%Y`, two for `%y`.
fn year_has_expected_width(value: &str, format: &str) -> bool {
    let year = if format.starts_with("%Y") {
        value.split('-').next()
    } else {
        value.rsplit('/').next()
    };
    let width = if format.contains("%y") { 2 } else { 4 };
    year.is_some_and(|year| year.len() == width && year.bytes().all(|b| b.is_ascii_digit()))
}

fn clean_resolved(raw: Option<&String>) -> Result<bool, String> {
    let Some(value) = raw else {
        return Ok(false);
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "on" | "1" | "yes" => Ok(true),
        "false" | "off" | "0" | "no" | "" => Ok(false),
        _ => Err(MSG_INVALID_BOOLEAN.to_string()),
    }
}
