// SPDX-FileCopyrightText: 2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Reverse transforms: rename round-trips, enum encodings parse back,
//! and out-of-range encoded values are errors rather than panics.

use faceted_macros::facets;

facets! {
    #[derive(Debug, Clone, PartialEq)]
    pub enum Priority {
        Low,
        Medium,
        High,
    }

    pub struct Ticket {
        pub first_name: String,
        pub priority: Priority,
        pub notes: Option<String>,
    }

    #[facet(source = "Ticket", reverse)]
    #[rename(name, from = "first_name")]
    #[enum_repr(priority, repr = "string")]
    pub struct TicketView;

    #[facet(source = "Ticket", reverse, include(priority))]
    #[enum_repr(priority, repr = "int")]
    pub struct TicketCode;
}

fn main() {
    let ticket = Ticket {
        first_name: "Ann".to_string(),
        priority: Priority::High,
        notes: Some("urgent".to_string()),
    };

    // String encoding, forward and back.
    let view = TicketView::from_source(&ticket);
    assert_eq!(view.name, "Ann");
    assert_eq!(view.priority, "High");
    assert_eq!(view.notes, Some("urgent".to_string()));

    let back = view.into_source().unwrap();
    assert_eq!(back.first_name, ticket.first_name);
    assert_eq!(back.priority, Priority::High);
    assert_eq!(back.notes, ticket.notes);

    // An out-of-range encoded value is a domain error.
    let mut tampered = TicketView::from_source(&ticket);
    tampered.priority = "Urgent".to_string();
    let err = tampered.into_source().unwrap_err();
    assert_eq!(
        err,
        faceted_core::ReverseError::enum_value("Priority", "Urgent")
    );

    // Integer encoding follows declaration order.
    let code = TicketCode::from_source(&ticket);
    assert_eq!(code.priority, 2);
    assert_eq!(code.into_source().unwrap().priority, Priority::High);

    let mut tampered = TicketCode::from_source(&ticket);
    tampered.priority = 9;
    assert!(tampered.into_source().is_err());
}
