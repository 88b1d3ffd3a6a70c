//! `#[derive(Validatable)]` lowering and hand-written implementations.

mod common;

use common::failures;
use pretty_assertions::assert_eq;
use tagrule::{Engine, FieldValue, StructValue, Validatable, Value};

#[derive(Validatable)]
struct Session {
    #[validate("required,uuid")]
    id: String,
    #[validate(skip)]
    #[allow(dead_code)]
    secret: String,
    #[validate(rules = "omitempty,url", name = "Callback")]
    callback: Option<String>,
    attempts: u8,
}

#[test]
fn derive_lowers_fields_in_order() {
    let session = Session {
        id: "not-a-uuid".into(),
        secret: "hidden".into(),
        callback: None,
        attempts: 3,
    };
    let Value::Struct(lowered) = session.to_value() else {
        panic!("expected a struct value");
    };

    assert_eq!(lowered.type_name(), "Session");
    let names: Vec<&str> = lowered.fields().iter().map(FieldValue::struct_name).collect();
    assert_eq!(names, ["id", "callback", "attempts"]);

    let callback = lowered.field("Callback").unwrap();
    assert_eq!(callback.struct_name(), "callback");
    assert_eq!(callback.rules(), Some("omitempty,url"));
    assert_eq!(callback.value(), &Value::Nil);
    assert_eq!(lowered.field("attempts").unwrap().rules(), None);
}

#[test]
fn skipped_field_is_invisible_to_rules() {
    let session = Session {
        id: "0b0a4c8e-6f0f-4b7e-9d5a-2d8c6c3f1e7a".into(),
        secret: String::new(),
        callback: Some("https://example.com/hook".into()),
        attempts: 0,
    };
    assert!(Engine::new().validate_value(&session).is_ok());

    let errors = failures(Engine::new().validate_value(&Session {
        callback: Some("not a url".into()),
        ..session
    }));
    assert_eq!(errors.namespaces(), vec!["Session.Callback"]);
}

#[derive(Validatable)]
struct Page<T> {
    #[validate("required,dive")]
    items: Vec<T>,
    #[validate("gte=1")]
    number: u32,
}

#[derive(Validatable)]
struct Tag {
    #[validate("required,lowercase")]
    label: String,
}

#[test]
fn generic_structs_validate_their_elements() {
    let page = Page {
        items: vec![
            Tag { label: "rust".into() },
            Tag {
                label: "Serde".into(),
            },
        ],
        number: 0,
    };
    let errors = failures(Engine::new().validate_value(&page));
    assert_eq!(errors.namespaces(), vec!["Page.items[1].label", "Page.number"]);
}

#[derive(Validatable)]
struct Borrowed<'a> {
    #[validate("required,alpha")]
    name: &'a str,
}

#[test]
fn borrowed_structs_lower_without_type_identity() {
    let name = String::from("abc1");
    let borrowed = Borrowed { name: &name };
    let Value::Struct(lowered) = borrowed.to_value() else {
        panic!("expected a struct value");
    };
    assert_eq!(lowered.type_id(), None);

    let engine = Engine::new();
    engine.register_struct_validation::<Borrowed<'static>, _>(|level| {
        level.report_error("", "name", "name", "never", "");
    });
    let errors = failures(engine.validate_value(&borrowed));
    assert_eq!(errors.len(), 1);
    assert_eq!(errors.failures()[0].tag, "alpha");
}

struct Coupon {
    code: String,
    percent: u8,
}

impl Validatable for Coupon {
    fn to_value(&self) -> Value {
        Value::Struct(
            StructValue::new::<Self>("Coupon")
                .with_field(FieldValue::new("code", self.code.to_value()).with_rules("required,alphanum,len=8"))
                .with_field(
                    FieldValue::new("percent", self.percent.to_value())
                        .with_rules("min=1,max=90")
                        .with_display_name("Percent"),
                ),
        )
    }
}

#[test]
fn hand_written_implementation() {
    let engine = Engine::new();
    let coupon = Coupon {
        code: "SAVE2024".into(),
        percent: 15,
    };
    assert!(engine.validate_value(&coupon).is_ok());

    let errors = failures(engine.validate_value(&Coupon {
        code: "SAVE-2024".into(),
        percent: 95,
    }));
    assert_eq!(errors.namespaces(), vec!["Coupon.code", "Coupon.Percent"]);

    engine.register_struct_validation::<Coupon, _>(|level| {
        if level.field("percent") == Some(&Value::Uint(15)) {
            level.report_error(15_u8, "Percent", "percent", "unlucky", "");
        }
    });
    let errors = failures(engine.validate_value(&coupon));
    assert_eq!(errors.failures()[0].namespace, "Coupon.Percent");
    assert_eq!(errors.failures()[0].tag, "unlucky");
}
