// SPDX-FileCopyrightText: 2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Expression and dotted-path renames, plus tuple output kinds.

use faceted_core::prelude::*;
use faceted_macros::facets;

facets! {
    pub struct Address {
        pub street: String,
        pub city: String,
    }

    pub struct Person {
        pub first_name: String,
        pub age: u32,
        pub address: Option<Address>,
    }

    #[facet(source = "Person", kind = "struct", exclude(address))]
    #[rename(doubled, from = "age * 2", ty = "u32", reversible = false)]
    #[rename(street, from = "address.street")]
    pub struct PersonInfo;

    #[facet(source = "Address", kind = "tuple")]
    pub struct AddressPair;
}

fn main() {
    let person = Person {
        first_name: "Ann".to_string(),
        age: 33,
        address: Some(Address {
            street: "Elm".to_string(),
            city: "X".to_string(),
        }),
    };

    let info = PersonInfo::from_source(&person);
    assert_eq!(info.first_name, "Ann");
    assert_eq!(info.age, 33);
    assert_eq!(info.doubled, 66);
    assert_eq!(info.street, Some("Elm".to_string()));

    // A null intermediate yields None, not a fault.
    let nowhere = Person {
        address: None,
        ..person
    };
    let info = PersonInfo::from_source(&nowhere);
    assert_eq!(info.street, None);

    // The lifted arithmetic expression evaluates to the same value the
    // eager form computed.
    let mut evaluator = Evaluator::new();
    evaluator.register(PersonInfo::projection());
    let mirror = Value::object([
        ("first_name", Value::from("Ann")),
        ("age", Value::Int(33)),
        (
            "address",
            Value::object([("street", Value::from("Elm")), ("city", Value::from("X"))]),
        ),
    ]);
    let projected = evaluator.project("PersonInfo", &mirror).unwrap();
    assert_eq!(projected.member("doubled"), Some(&Value::Int(66)));
    assert_eq!(
        projected.member("street"),
        Some(&Value::Str("Elm".to_string()))
    );

    // Tuple output kind keeps members positional.
    let pair = AddressPair::from_source(&Address {
        street: "Elm".to_string(),
        city: "X".to_string(),
    });
    assert_eq!(pair.0, "Elm");
    assert_eq!(pair.1, "X");
    let plan = AddressPair::projection();
    let members: Vec<&str> = plan.bindings.iter().map(|b| b.member.as_str()).collect();
    assert_eq!(members, ["street", "city"]);
}
