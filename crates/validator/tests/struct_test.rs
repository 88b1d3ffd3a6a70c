//! Struct validation through `#[derive(Validatable)]`: nesting, collections,
//! maps, cross-field rules and aliases.

mod common;

use std::collections::BTreeMap;

use common::{failures, init_tracing, summary};
use pretty_assertions::assert_eq;
use tagrule::{Engine, EngineConfig, Validatable, Value};

#[derive(Debug, Default, Validatable)]
struct Address {
    #[validate("required")]
    country: String,
    #[validate("required")]
    street: String,
}

#[derive(Debug, Default, Validatable)]
struct School {
    #[validate("required")]
    name: String,
}

#[derive(Debug, Default, Validatable)]
struct Wallet {
    #[validate("required")]
    balance: u64,
}

#[derive(Debug, Default, Validatable)]
struct User {
    #[validate("required")]
    username: String,
    #[validate("required")]
    password: String,
    #[validate("required,dive")]
    addresses: Vec<Address>,
    #[validate("required,dive,required,min=3")]
    hobbies: Vec<String>,
    #[validate("dive,keys,required,min=3,endkeys,required")]
    schools: BTreeMap<String, School>,
    #[validate("dive,keys,required,endkeys,required")]
    wallets: BTreeMap<String, Wallet>,
}

fn school(name: &str) -> School {
    School { name: name.into() }
}

fn pairs(expected: &[(&str, &str)]) -> Vec<(String, String)> {
    expected
        .iter()
        .map(|(ns, tag)| ((*ns).to_owned(), (*tag).to_owned()))
        .collect()
}

#[test]
fn valid_struct_passes() {
    init_tracing();
    let user = User {
        username: "brian".into(),
        password: "hunter22".into(),
        addresses: vec![Address {
            country: "ID".into(),
            street: "Jl. Merdeka".into(),
        }],
        hobbies: vec!["Gaming".into()],
        schools: BTreeMap::from([("SMA".to_owned(), school("SMA Negeri 1"))]),
        wallets: BTreeMap::from([("BCA".to_owned(), Wallet { balance: 10 })]),
    };
    assert!(Engine::new().validate_value(&user).is_ok());
}

#[test]
fn collections_and_maps_report_every_element() {
    let user = User {
        addresses: vec![Address::default(), Address::default()],
        hobbies: vec!["Gaming".into(), "Coding".into(), String::new(), "X".into()],
        schools: BTreeMap::from([
            ("SD".to_owned(), school("SD Negeri 1")),
            ("SMA".to_owned(), School::default()),
            ("SMP".to_owned(), school("SMP Negeri 3")),
        ]),
        wallets: BTreeMap::from([
            (String::new(), Wallet { balance: 5 }),
            ("BCA".to_owned(), Wallet::default()),
        ]),
        ..User::default()
    };

    let errors = failures(Engine::new().validate_value(&user));
    assert_eq!(
        summary(&errors),
        pairs(&[
            ("User.username", "required"),
            ("User.password", "required"),
            ("User.addresses[0].country", "required"),
            ("User.addresses[0].street", "required"),
            ("User.addresses[1].country", "required"),
            ("User.addresses[1].street", "required"),
            ("User.hobbies[2]", "required"),
            ("User.hobbies[3]", "min"),
            ("User.schools[SD]", "min"),
            ("User.schools[SMA]", "required"),
            ("User.wallets[]", "required"),
            ("User.wallets[BCA]", "required"),
        ])
    );

    let key_failure = errors.for_namespace("User.schools[SD]").unwrap();
    assert_eq!(key_failure.value, Value::Str("SD".into()));
    assert_eq!(key_failure.param, "3");
    assert_eq!(key_failure.field, "schools[SD]");
}

#[test]
fn empty_collections_fail_required_without_diving() {
    let errors = failures(Engine::new().validate_value(&User::default()));
    assert_eq!(
        errors.namespaces(),
        vec!["User.username", "User.password", "User.addresses", "User.hobbies"]
    );
}

#[derive(Debug, Default, Validatable)]
struct Profile {
    #[validate("required")]
    username: String,
    #[validate("required")]
    password: String,
    #[validate("required")]
    address: Address,
}

#[test]
fn zero_nested_struct_fails_required() {
    let errors = failures(Engine::new().validate_value(&Profile::default()));
    assert_eq!(
        summary(&errors),
        pairs(&[
            ("Profile.username", "required"),
            ("Profile.password", "required"),
            ("Profile.address", "required"),
        ])
    );
}

#[test]
fn zero_nested_struct_is_walked_when_configured() {
    let engine = Engine::with_config(EngineConfig::default().with_zero_struct_fails_required(false));
    let errors = failures(engine.validate_value(&Profile::default()));
    assert_eq!(
        errors.namespaces(),
        vec![
            "Profile.username",
            "Profile.password",
            "Profile.address.country",
            "Profile.address.street",
        ]
    );
}

#[test]
fn nested_struct_without_rules_is_still_walked() {
    #[derive(Validatable)]
    struct Shipment {
        #[validate("required")]
        id: u32,
        to: Address,
    }

    let shipment = Shipment {
        id: 7,
        to: Address {
            country: "ID".into(),
            street: String::new(),
        },
    };
    let errors = failures(Engine::new().validate_value(&shipment));
    let failure = &errors.failures()[0];
    assert_eq!(errors.len(), 1);
    assert_eq!(failure.namespace, "Shipment.to.street");
    assert_eq!(failure.struct_namespace, "Shipment.to.street");
}

#[test]
fn structonly_skips_nested_fields() {
    #[derive(Validatable)]
    struct Envelope {
        #[validate("required,structonly")]
        address: Address,
    }

    let envelope = Envelope {
        address: Address {
            country: "ID".into(),
            street: String::new(),
        },
    };
    assert!(Engine::new().validate_value(&envelope).is_ok());
}

#[test]
fn display_names_shape_namespaces() {
    #[derive(Validatable)]
    struct Login {
        #[validate(rules = "required,email", name = "EmailAddress")]
        email: String,
    }

    let errors = failures(Engine::new().validate_value(&Login { email: "nope".into() }));
    let failure = &errors.failures()[0];
    assert_eq!(failure.namespace, "Login.EmailAddress");
    assert_eq!(failure.struct_namespace, "Login.email");
    assert_eq!(failure.field, "EmailAddress");
    assert_eq!(failure.struct_field, "email");
    assert_eq!(failure.tag, "email");
}

#[derive(Validatable)]
struct Signup {
    #[validate("required,min=8")]
    password: String,
    #[validate("required,eqfield=password")]
    confirm_password: String,
    #[validate("required,gtefield=limits.min_age")]
    age: u32,
    limits: Limits,
}

#[derive(Validatable)]
struct Limits {
    #[validate("required")]
    min_age: u32,
    #[validate("required,gtcsfield=limits.min_age")]
    max_age: u32,
}

fn signup(confirm: &str, age: u32) -> Signup {
    Signup {
        password: "correct horse".into(),
        confirm_password: confirm.into(),
        age,
        limits: Limits {
            min_age: 18,
            max_age: 99,
        },
    }
}

#[test]
fn cross_field_rules() {
    let engine = Engine::new();
    assert!(engine.validate_value(&signup("correct horse", 30)).is_ok());

    let errors = failures(engine.validate_value(&signup("wrong horse", 12)));
    assert_eq!(
        summary(&errors),
        pairs(&[
            ("Signup.confirm_password", "eqfield"),
            ("Signup.age", "gtefield"),
        ])
    );
    assert_eq!(errors.failures()[1].param, "limits.min_age");
}

#[test]
fn cross_struct_rule_resolves_from_top() {
    let mut value = signup("correct horse", 30);
    value.limits.max_age = 10;
    let errors = failures(Engine::new().validate_value(&value));
    assert_eq!(errors.namespaces(), vec!["Signup.limits.max_age"]);
    assert_eq!(errors.failures()[0].tag, "gtcsfield");
}

#[derive(Default, Validatable)]
struct Seller {
    #[validate("varchar")]
    id: String,
    #[validate("varchar")]
    name: String,
}

#[test]
fn alias_failures_report_alias_tag() {
    let engine = Engine::new();
    engine.register_alias("varchar", "required,max=255").unwrap();

    let errors = failures(engine.validate_value(&Seller::default()));
    assert!(errors.iter().all(|f| f.tag == "varchar" && f.actual_tag == "required"));
    insta::assert_snapshot!(errors.to_string(), @r"
    Key: 'Seller.id' Error:Field validation for 'id' failed on the 'varchar' tag
    Key: 'Seller.name' Error:Field validation for 'name' failed on the 'varchar' tag
    ");

    let long = Seller {
        id: "s-1".into(),
        name: "x".repeat(256),
    };
    let errors = failures(engine.validate_value(&long));
    let failure = &errors.failures()[0];
    assert_eq!((failure.tag.as_str(), failure.actual_tag.as_str()), ("varchar", "max"));
    assert_eq!(failure.param, "255");
}

#[test]
fn failure_serializes_to_json() {
    let errors = failures(Engine::new().validate_value(&Profile {
        username: "brian".into(),
        password: "secret".into(),
        address: Address {
            country: "ID".into(),
            street: String::new(),
        },
    }));
    insta::assert_json_snapshot!(errors, @r#"
    [
      {
        "namespace": "Profile.address.street",
        "struct_namespace": "Profile.address.street",
        "field": "street",
        "struct_field": "street",
        "tag": "required",
        "actual_tag": "required",
        "param": "",
        "value": ""
      }
    ]
    "#);
}

#[test]
fn top_level_collections_are_dived() {
    let addresses = vec![
        Address {
            country: "ID".into(),
            street: "Jl. Sudirman".into(),
        },
        Address {
            country: String::new(),
            street: "Jl. Thamrin".into(),
        },
    ];
    let errors = failures(Engine::new().validate_value(&addresses));
    assert_eq!(errors.namespaces(), vec!["[1].country"]);
}

#[test]
fn scalars_have_nothing_to_validate() {
    let engine = Engine::new();
    assert!(engine.validate_value(&5_u8).is_ok());
    assert!(engine.validate_value(&None::<User>).is_ok());
}

#[test]
fn eqfield_is_checked_even_when_target_fails_required() {
    #[derive(Validatable)]
    struct ChangePassword {
        #[validate("required")]
        password: String,
        #[validate("required,eqfield=password")]
        confirm_password: String,
    }

    let errors = failures(Engine::new().validate_value(&ChangePassword {
        password: String::new(),
        confirm_password: "x".into(),
    }));
    assert_eq!(
        summary(&errors),
        pairs(&[
            ("ChangePassword.password", "required"),
            ("ChangePassword.confirm_password", "eqfield"),
        ])
    );
}

#[test]
fn scalar_map_values_and_keys_are_checked_independently() {
    #[derive(Validatable)]
    struct Bank {
        #[validate("dive,keys,required,min=3,endkeys,required,gt=0")]
        wallets: BTreeMap<String, u64>,
    }

    let bank = Bank {
        wallets: BTreeMap::from([
            (String::new(), 10),
            ("BCA".to_owned(), 0),
            ("BN".to_owned(), 3),
            ("MANDIRI".to_owned(), 5),
        ]),
    };
    let errors = failures(Engine::new().validate_value(&bank));
    assert_eq!(
        summary(&errors),
        pairs(&[
            ("Bank.wallets[]", "required"),
            ("Bank.wallets[BCA]", "required"),
            ("Bank.wallets[BN]", "min"),
        ])
    );

    let values: Vec<&Value> = errors.iter().map(|f| &f.value).collect();
    assert_eq!(
        values,
        vec![&Value::Str(String::new()), &Value::Uint(0), &Value::Str("BN".into())]
    );
}
