// SPDX-FileCopyrightText: 2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! The primary correctness property: for within-depth, non-cyclic data the
//! eager transform and the in-memory evaluation of the expression form
//! agree member for member, through nested facets and collections.

use faceted_core::prelude::*;
use faceted_macros::facets;

facets! {
    pub struct Address {
        pub street: String,
        pub city: String,
    }

    pub struct Person {
        pub first_name: String,
        pub address: Option<Address>,
        pub friends: Vec<Person>,
    }

    #[facet(source = "Address")]
    pub struct AddressView;

    #[facet(source = "Person", max_depth = 2)]
    pub struct PersonView;
}

fn main() {
    let person = Person {
        first_name: "Ann".to_string(),
        address: Some(Address {
            street: "Elm".to_string(),
            city: "X".to_string(),
        }),
        friends: vec![Person {
            first_name: "Bob".to_string(),
            address: None,
            friends: Vec::new(),
        }],
    };

    let view = PersonView::from_source(&person);

    let mut evaluator = Evaluator::new();
    evaluator.register(AddressView::projection());
    evaluator.register(PersonView::projection());

    let mirror = Value::object([
        ("first_name", Value::from("Ann")),
        (
            "address",
            Value::object([("street", Value::from("Elm")), ("city", Value::from("X"))]),
        ),
        (
            "friends",
            Value::list([Value::object([
                ("first_name", Value::from("Bob")),
                ("address", Value::Null),
                ("friends", Value::list(Vec::<Value>::new())),
            ])]),
        ),
    ]);
    let projected = evaluator.project("PersonView", &mirror).unwrap();

    // Scalar member.
    assert_eq!(view.first_name, "Ann");
    assert_eq!(
        projected.member("first_name"),
        Some(&Value::Str("Ann".to_string()))
    );

    // Nested member, inlined in the expression form.
    let eager_address = view.address.as_ref().unwrap();
    let expr_address = projected.member("address").unwrap();
    assert_eq!(eager_address.street, "Elm");
    assert_eq!(
        expr_address.member("street"),
        Some(&Value::Str("Elm".to_string()))
    );
    assert_eq!(eager_address.city, "X");
    assert_eq!(
        expr_address.member("city"),
        Some(&Value::Str("X".to_string()))
    );

    // Collection of self-nested facets: the expression form falls back to
    // an opaque projection call, which the evaluator resolves.
    assert_eq!(view.friends.len(), 1);
    assert_eq!(view.friends[0].first_name, "Bob");
    assert!(view.friends[0].address.is_none());
    let Some(Value::List(expr_friends)) = projected.member("friends") else {
        panic!("friends must project as a list");
    };
    assert_eq!(expr_friends.len(), 1);
    assert_eq!(
        expr_friends[0].member("first_name"),
        Some(&Value::Str("Bob".to_string()))
    );
    assert_eq!(expr_friends[0].member("address"), Some(&Value::Null));

    // A null nested source lands as None/Null in both forms.
    let alone = Person {
        first_name: "Zoe".to_string(),
        address: None,
        friends: Vec::new(),
    };
    let view = PersonView::from_source(&alone);
    assert!(view.address.is_none());
    let mirror = Value::object([
        ("first_name", Value::from("Zoe")),
        ("address", Value::Null),
        ("friends", Value::list(Vec::<Value>::new())),
    ]);
    let projected = evaluator.project("PersonView", &mirror).unwrap();
    assert_eq!(projected.member("address"), Some(&Value::Null));
}
