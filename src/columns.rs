//! Column sets shared by the CLI listings and the TUI tables

use crate::models::{Birthday, Role, User};
use crate::table::{CellContent, Column, Tone};

fn gender_tone(gender: &str) -> Tone {
    match gender.to_ascii_lowercase().as_str() {
        "male" => Tone::Blue,
        "female" => Tone::Pink,
        _ => Tone::Neutral,
    }
}

fn gender_column() -> Column<Birthday> {
    Column::field("gender", "Gender", |b: &Birthday| b.gender.clone())
        .render(|b| CellContent::badge(b.gender.clone(), gender_tone(&b.gender)))
        .width(8)
}

fn actions(hint: &'static str) -> Column<Birthday> {
    Column::new("actions", "Actions").render(move |_| CellContent::Control(hint.to_string()))
}

/// Birthday details table; admins also see who added each record
pub fn birthday_columns(show_added_by: bool, with_actions: bool) -> Vec<Column<Birthday>> {
    let mut columns = vec![
        Column::field("name", "Name", |b: &Birthday| b.name.clone()).width(18),
        Column::field("age", "Age", |b: &Birthday| b.age.to_string()).width(4),
        gender_column(),
        Column::field("relationship", "Relationship", |b: &Birthday| b.relationship.clone())
            .width(12),
        Column::field("contact", "Contact", |b: &Birthday| b.contact.clone()).width(14),
        Column::field("dob", "DOB", |b: &Birthday| b.dob.clone()).width(10),
        Column::field("email", "Email", |b: &Birthday| b.email.clone()).width(24),
    ];
    if show_added_by {
        columns.push(Column::optional("added_by", "Added By", Birthday::added_by).width(20));
    }
    if with_actions {
        columns.push(actions("e:edit d:delete"));
    }
    columns
}

pub fn wish_columns(with_actions: bool) -> Vec<Column<Birthday>> {
    let mut columns = vec![
        Column::field("name", "Name", |b: &Birthday| b.name.clone()).width(18),
        Column::field("relationship", "Relationship", |b: &Birthday| b.relationship.clone())
            .width(12),
        Column::field("dob", "DOB", |b: &Birthday| b.dob.clone()).width(10),
        Column::optional("wish", "Wish", |b: &Birthday| {
            b.wish.clone().filter(|w| !w.trim().is_empty())
        }),
    ];
    if with_actions {
        columns.push(actions("w:write wish"));
    }
    columns
}

pub fn photo_columns(with_actions: bool) -> Vec<Column<Birthday>> {
    let mut columns = vec![
        Column::field("name", "Name", |b: &Birthday| b.name.clone()).width(18),
        Column::field("relationship", "Relationship", |b: &Birthday| b.relationship.clone())
            .width(12),
        Column::field("photos", "Photos", |b: &Birthday| b.photos.to_string())
            .render(|b| {
                if b.photos == 0 {
                    CellContent::badge("none", Tone::Muted)
                } else {
                    CellContent::text(b.photos.to_string())
                }
            })
            .width(6),
    ];
    if with_actions {
        columns.push(actions("u:upload s:save"));
    }
    columns
}

pub fn user_columns() -> Vec<Column<User>> {
    vec![
        Column::field("name", "Name", |u: &User| u.name.clone()).width(20),
        Column::field("email", "Email", |u: &User| u.email.clone()).width(28),
        Column::field("role", "Role", |u: &User| u.role.as_str().to_string())
            .render(|u| {
                let tone = if u.role == Role::Admin {
                    Tone::Blue
                } else {
                    Tone::Neutral
                };
                CellContent::badge(u.role.as_str(), tone)
            })
            .width(6),
    ]
}
