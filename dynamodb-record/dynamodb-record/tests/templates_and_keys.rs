/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use dynamodb_record::{AttrValue, Config, ErrorKind, Item, Mapper, Record, TemplateMatch};
use pretty_assertions::assert_eq;

fn s(value: &str) -> AttrValue {
    AttrValue::S(value.to_string())
}

fn n(value: &str) -> AttrValue {
    AttrValue::N(value.to_string())
}

fn item<const N: usize>(attributes: [(&str, AttrValue); N]) -> Item {
    attributes
        .into_iter()
        .map(|(name, value)| (name.to_string(), value))
        .collect()
}

#[derive(Record, Debug, Clone, PartialEq)]
pub struct Person {
    #[dynamo(attr = "PK", fmt = "Person#{}")]
    pub name: String,
    #[dynamo(attr = "Age")]
    pub age: i64,
}

#[test]
fn person_marshals_and_unmarshals_exactly() {
    let person = Person {
        name: "foo".to_string(),
        age: 33,
    };
    let mapper = Mapper::default();
    let marshalled = mapper.marshal(&person).unwrap();
    assert_eq!(
        item([("PK", s("Person#foo")), ("Age", n("33"))]),
        marshalled
    );
    assert_eq!(person, mapper.from_item(&marshalled).unwrap());
}

#[derive(Record, Debug, Clone, PartialEq)]
pub struct Prefixed {
    #[dynamo(fmt = "Prefix#{}")]
    pub value: String,
}

#[test]
fn template_round_trip() {
    let mapper = Mapper::default();
    let marshalled = mapper
        .marshal(&Prefixed {
            value: "X".to_string(),
        })
        .unwrap();
    assert_eq!(item([("value", s("Prefix#X"))]), marshalled);

    let back: Prefixed = mapper.from_item(&marshalled).unwrap();
    assert_eq!("X", back.value);
}

#[derive(Record, Debug, Clone, PartialEq)]
pub struct Compound {
    pub sibling: String,
    #[dynamo(fmt = "A#{sibling}#B#{}")]
    pub field: String,
}

#[test]
fn compound_template_recovers_every_placeholder() {
    let mapper = Mapper::default();
    let record = Compound {
        sibling: "foo".to_string(),
        field: "bar".to_string(),
    };
    let marshalled = mapper.marshal(&record).unwrap();
    assert_eq!(Some("A#foo#B#bar"), marshalled["field"].as_s());

    // Only the templated attribute is read back, the sibling comes out of it.
    let stored = item([("field", s("A#foo#B#bar"))]);
    assert_eq!(record, mapper.from_item(&stored).unwrap());
}

#[derive(Record, Debug, Clone, PartialEq)]
pub struct Member {
    #[dynamo(attr = "-")]
    pub team: String,
    #[dynamo(attr = "PK", fmt = "Team#{team}#Person#{}", idx = "primary")]
    pub name: String,
    #[dynamo(attr = "Age")]
    pub age: i64,
}

#[test]
fn excluded_sibling_lives_only_inside_the_template() {
    let mapper = Mapper::default();
    let member = Member {
        team: "foo".to_string(),
        name: "bar".to_string(),
        age: 33,
    };
    let marshalled = mapper.marshal(&member).unwrap();
    assert_eq!(
        item([("PK", s("Team#foo#Person#bar")), ("Age", n("33"))]),
        marshalled
    );
    assert_eq!(member, mapper.from_item(&marshalled).unwrap());
    assert_eq!(
        item([("PK", s("Team#foo#Person#bar"))]),
        mapper.primary_key(&member).unwrap()
    );

    // A stray attribute under the field name is ignored.
    let stored = item([("PK", s("Team#foo#Person#bar")), ("team", s("other"))]);
    let back: Member = mapper.from_item(&stored).unwrap();
    assert_eq!("foo", back.team);

    let descriptor = mapper.descriptor::<Member>().unwrap();
    assert_eq!(2, descriptor.fields().len());
    assert_eq!("team", descriptor.excluded_fields()[0].name());
}

#[derive(Record, Debug, Clone, PartialEq)]
pub struct Measurement {
    pub age: f64,
    #[dynamo(prec = 2)]
    pub rounded: f64,
    #[dynamo(prec = "0")]
    pub whole: f32,
}

#[test]
fn float_precision() {
    let marshalled = Mapper::default()
        .marshal(&Measurement {
            age: 33.234,
            rounded: 33.234,
            whole: 2.4,
        })
        .unwrap();
    assert_eq!(
        item([("age", n("33.234")), ("rounded", n("33.23")), ("whole", n("2"))]),
        marshalled
    );
}

#[derive(Record, Debug, Clone, PartialEq)]
pub struct Draft {
    pub title: String,
    #[dynamo(attr = "-")]
    pub scratch: String,
    #[dynamo(skip)]
    pub cursor: usize,
    revision: u32,
}

#[test]
fn excluded_fields_are_never_written_or_read() {
    let mapper = Mapper::default();
    let draft = Draft {
        title: "notes".to_string(),
        scratch: "temp".to_string(),
        cursor: 4,
        revision: 9,
    };
    assert_eq!(
        item([("title", s("notes"))]),
        mapper.marshal(&draft).unwrap()
    );

    let stored = item([
        ("title", s("other")),
        ("scratch", s("ignored")),
        ("-", s("ignored")),
        ("cursor", n("1")),
        ("revision", n("1")),
    ]);
    let mut target = draft.clone();
    mapper.unmarshal(&stored, &mut target).unwrap();
    assert_eq!(
        Draft {
            title: "other".to_string(),
            ..draft
        },
        target
    );
    assert_eq!(1, mapper.descriptor::<Draft>().unwrap().fields().len());
}

#[derive(Record, Debug, Clone, PartialEq)]
pub struct Order {
    #[dynamo(attr = "PK", fmt = "Order#{}", copy = "SK")]
    pub id: String,
    #[dynamo(copy = "GSI1PK, GSI1SK")]
    pub customer: String,
}

#[test]
fn copies_fan_out_identical_values() {
    let marshalled = Mapper::default()
        .marshal(&Order {
            id: "42".to_string(),
            customer: "acme".to_string(),
        })
        .unwrap();
    assert_eq!(
        item([
            ("PK", s("Order#42")),
            ("SK", s("Order#42")),
            ("customer", s("acme")),
            ("GSI1PK", s("acme")),
            ("GSI1SK", s("acme")),
        ]),
        marshalled
    );
}

#[derive(Record, Debug, Clone, PartialEq)]
pub struct Employee {
    #[dynamo(attr = "PK", fmt = "Person#{}", idx = "primary")]
    pub name: String,
    #[dynamo(attr = "SK", idx = "primary")]
    pub level: u32,
    #[dynamo(attr = "Age")]
    pub age: i64,
}

#[test]
fn key_holds_only_index_fields() {
    let employee = Employee {
        name: "foo".to_string(),
        level: 33,
        age: 40,
    };
    let mapper = Mapper::default();
    let expected = item([("PK", s("Person#foo")), ("SK", n("33"))]);
    assert_eq!(expected, mapper.key(&employee, "primary").unwrap());
    assert_eq!(expected, mapper.primary_key(&employee).unwrap());
    assert!(mapper.key(&employee, "GSI1").unwrap().is_empty());
}

#[derive(Record, Debug, Clone, PartialEq)]
pub struct Account {
    #[dynamo(attr = "PK", fmt = "Account#{}", idx = "primary", copyidx = "GSI1PK")]
    pub id: String,
    #[dynamo(fmt = "Email#{}", copy = "GSI1PK")]
    pub email: String,
    #[dynamo(idx = "GSI1", attr = "GSI1SK")]
    pub created: i64,
    pub nickname: Option<String>,
}

#[test]
fn copy_index_pulls_in_the_writer_of_the_target() {
    let account = Account {
        id: "7".to_string(),
        email: "a@example.com".to_string(),
        created: 1700000000,
        nickname: None,
    };
    let mapper = Mapper::default();
    assert_eq!(
        item([
            ("PK", s("Account#7")),
            ("GSI1PK", s("Email#a@example.com")),
        ]),
        mapper.primary_key(&account).unwrap()
    );
    assert_eq!(
        item([("GSI1SK", n("1700000000"))]),
        mapper.key(&account, "GSI1").unwrap()
    );
}

#[test]
fn unmatched_templates_are_lenient_by_default() {
    let stored = item([("PK", s("Org#acme")), ("Age", n("5"))]);
    let person: Person = Mapper::default().from_item(&stored).unwrap();
    assert_eq!(
        Person {
            name: String::new(),
            age: 5,
        },
        person
    );
}

#[test]
fn strict_templates_report_the_attribute() {
    let mapper = Mapper::new(Config::builder().template_match(TemplateMatch::Strict).build());
    let err = mapper
        .from_item::<Person>(&item([("PK", s("Org#acme"))]))
        .unwrap_err();
    assert!(matches!(
        err.kind(),
        ErrorKind::TemplateMismatch { placeholder } if placeholder.is_empty()
    ));
    assert_eq!(Some("PK"), err.attribute());
    assert_eq!(Some("Person"), err.record());

    let person: Person = mapper
        .from_item(&item([("PK", s("Person#foo"))]))
        .unwrap();
    assert_eq!("foo", person.name);
}

#[derive(Record, Debug, Clone, PartialEq)]
pub struct Note {
    #[dynamo(fmt = "Note#{}")]
    pub body: String,
}

#[test]
fn templates_capture_multiline_values() {
    let mapper = Mapper::default();
    let note = Note {
        body: "first line\nsecond line".to_string(),
    };
    let marshalled = mapper.marshal(&note).unwrap();
    assert_eq!(note, mapper.from_item(&marshalled).unwrap());
}

#[derive(Record, Debug, Clone, PartialEq)]
pub struct Ticket {
    #[dynamo(attr = "PK", fmt = "Ticket#{}")]
    pub number: u64,
    #[dynamo(type = "S")]
    pub priority: i32,
}

#[test]
fn templates_and_string_kinds_apply_to_numbers() {
    let mapper = Mapper::default();
    let ticket = Ticket {
        number: 12,
        priority: -1,
    };
    let marshalled = mapper.marshal(&ticket).unwrap();
    assert_eq!(
        item([("PK", s("Ticket#12")), ("priority", s("-1"))]),
        marshalled
    );
    assert_eq!(ticket, mapper.from_item(&marshalled).unwrap());
}
