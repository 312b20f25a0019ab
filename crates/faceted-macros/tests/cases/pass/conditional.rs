// SPDX-FileCopyrightText: 2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Conditional members agree across both transform forms: a false
//! predicate yields the default, never the raw source value.

use faceted_core::prelude::*;
use faceted_macros::facets;

facets! {
    #[derive(Debug, Clone, PartialEq)]
    pub enum Status {
        Pending,
        Completed,
    }

    pub struct Task {
        pub title: String,
        pub status: Status,
        pub completed_at: Option<String>,
    }

    #[facet(source = "Task", exclude(status))]
    #[when(completed_at, predicate = "status == Status::Completed")]
    pub struct TaskView;
}

fn mirror(status: &str, completed_at: Option<&str>) -> Value {
    Value::object([
        ("title", Value::from("deploy")),
        ("status", Value::enum_variant(status)),
        ("completed_at", Value::from(completed_at)),
    ])
}

fn main() {
    let pending = Task {
        title: "deploy".to_string(),
        status: Status::Pending,
        completed_at: Some("2026-08-01".to_string()),
    };

    // Eager form: predicate false, so the raw value must not leak.
    let view = TaskView::from_source(&pending);
    assert_eq!(view.title, "deploy");
    assert_eq!(view.completed_at, None);

    let completed = Task {
        status: Status::Completed,
        ..pending
    };
    let view = TaskView::from_source(&completed);
    assert_eq!(view.completed_at, Some("2026-08-01".to_string()));

    // Expression form, evaluated in memory over a mirrored value.
    let mut evaluator = Evaluator::new();
    evaluator.register(TaskView::projection());

    let projected = evaluator
        .project("TaskView", &mirror("Status::Pending", Some("2026-08-01")))
        .unwrap();
    assert_eq!(projected.member("completed_at"), Some(&Value::Null));

    let projected = evaluator
        .project("TaskView", &mirror("Status::Completed", Some("2026-08-01")))
        .unwrap();
    assert_eq!(
        projected.member("completed_at"),
        Some(&Value::Str("2026-08-01".to_string()))
    );
}
