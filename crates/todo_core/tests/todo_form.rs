use chrono::{NaiveDate, TimeZone, Utc};
use todo_core::{FormData, Todo, TodoForm, Widget, TITLE_MAX_CHARS, TODO_FORM_FIELDS};

fn form_data(pairs: &[(&str, &str)]) -> FormData {
    pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

#[test]
fn valid_input_produces_draft() {
    let form = TodoForm::bind(form_data(&[
        ("title", "  Pay rent  "),
        ("description", "transfer before noon"),
        ("due_date", "2024-09-01"),
        ("resolved", "on"),
    ]));

    assert!(form.is_valid());
    assert!(form.errors().is_none());
    let draft = form.into_result().unwrap();
    assert_eq!(draft.title, "Pay rent");
    assert_eq!(draft.description.as_deref(), Some("transfer before noon"));
    assert_eq!(draft.due_date, NaiveDate::from_ymd_opt(2024, 9, 1));
    assert!(draft.resolved);
}

#[test]
fn optional_fields_default_when_absent_or_blank() {
    let draft = TodoForm::bind(form_data(&[
        ("title", "No Due Date"),
        ("description", "   "),
        ("due_date", ""),
    ]))
    .into_result()
    .unwrap();

    assert_eq!(draft.description, None);
    assert_eq!(draft.due_date, None);
    assert!(!draft.resolved);
}

#[test]
fn missing_title_is_required() {
    let form = TodoForm::bind(form_data(&[("description", "orphan")]));

    assert!(!form.is_valid());
    let errors = form.errors().unwrap();
    assert_eq!(errors.get("title"), ["This field is required."]);
    assert!(!errors.contains("description"));
}

#[test]
fn overlong_title_reports_length() {
    let title = "t".repeat(TITLE_MAX_CHARS + 5);
    let errors = TodoForm::bind(form_data(&[("title", title.as_str())]))
        .into_result()
        .unwrap_err();

    assert_eq!(
        errors.get("title"),
        ["Ensure this value has at most 200 characters (it has 205)."]
    );
}

#[test]
fn every_failing_field_is_reported_and_no_draft_is_produced() {
    let form = TodoForm::bind(form_data(&[
        ("title", ""),
        ("due_date", "31/31/2024"),
        ("resolved", "perhaps"),
    ]));

    let errors = form.into_result().unwrap_err();
    let fields: Vec<_> = errors.iter().map(|(field, _)| field).collect();
    assert_eq!(fields, ["due_date", "resolved", "title"]);
    assert_eq!(errors.get("due_date"), ["Enter a valid date."]);
    assert_eq!(errors.get("resolved"), ["Enter a valid boolean."]);
    assert!(errors.to_string().contains("title: This field is required."));
}

#[test]
fn due_date_accepts_us_formats() {
    for input in ["2024-02-29", "02/29/2024", "02/29/24"] {
        let draft = TodoForm::bind(form_data(&[("title", "leap"), ("due_date", input)]))
            .into_result()
            .unwrap();
        assert_eq!(draft.due_date, NaiveDate::from_ymd_opt(2024, 2, 29), "{input}");
    }
}

#[test]
fn due_date_rejects_impossible_calendar_date() {
    let errors = TodoForm::bind(form_data(&[("title", "x"), ("due_date", "2023-02-29")]))
        .into_result()
        .unwrap_err();
    assert!(errors.contains("due_date"));
}

#[test]
fn due_date_rejects_short_or_signed_years() {
    for input in ["24-02-29", "5-1-1", "+2024-01-01", "1/1/5"] {
        let errors = TodoForm::bind(form_data(&[("title", "x"), ("due_date", input)]))
            .into_result()
            .expect_err("year must be two or four digits");
        assert_eq!(errors.get("due_date"), ["Enter a valid date."], "{input}");
    }
}

#[test]
fn unknown_fields_are_ignored() {
    let form = TodoForm::bind(form_data(&[("title", "ok"), ("csrf_token", "abc")]));
    assert!(form.is_valid());
    assert_eq!(form.data().get("csrf_token").map(String::as_str), Some("abc"));
}

#[test]
fn initial_data_binds_back_to_same_fields() {
    let stamp = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
    let todo = Todo {
        id: 9,
        title: "Renew passport".to_string(),
        description: Some("bring photos".to_string()),
        due_date: NaiveDate::from_ymd_opt(2024, 4, 15),
        resolved: true,
        created_at: stamp,
        updated_at: stamp,
    };

    let data = TodoForm::initial(&todo);
    assert_eq!(data.get("due_date").map(String::as_str), Some("2024-04-15"));

    let draft = TodoForm::bind(data).into_result().unwrap();
    assert_eq!(draft, todo.to_draft());
}

#[test]
fn presentation_hints_match_widgets() {
    let [title, description, due_date, resolved] = TODO_FORM_FIELDS;

    assert!(title.required);
    assert_eq!(
        title.html_attrs(),
        vec![
            ("class", "form-control".to_string()),
            ("placeholder", "Enter TODO title".to_string()),
        ]
    );

    assert_eq!(description.widget, Widget::Textarea { rows: 3 });
    assert!(description
        .html_attrs()
        .contains(&("rows", "3".to_string())));

    assert_eq!(due_date.widget, Widget::DateInput);
    assert_eq!(resolved.widget, Widget::CheckboxInput);
    assert_eq!(resolved.css_class, "form-check-input");
    assert!(!resolved.required);
}
