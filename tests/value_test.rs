use std::collections::BTreeMap;

use netpack::{
    pack, Category, Color, Packer, PacketError, PacketReader, PacketWriter, Packet, Shape, Value,
    Vector2, Vector3,
};

#[derive(Packet, Debug, Default, Clone, Copy, PartialEq, Eq)]
enum Class {
    #[default]
    Warrior,
    Mage,
    Rogue,
}

#[derive(Packet, Debug, Default, PartialEq)]
struct Position {
    pub x: f32,
    pub y: f32,
}

#[derive(Packet, Debug, Default, PartialEq)]
struct Hero {
    pub name: String,
    pub class: Class,
    pub position: Vector2,
    pub tags: Vec<String>,
    #[netpack(exclude)]
    pub cached_power: u32,
}

fn write(value: &Value) -> Result<Vec<u8>, PacketError> {
    let mut writer = PacketWriter::new();
    writer.write_value(value)?;
    Ok(writer.as_slice().to_vec())
}

// =============================================================================
// Writing dynamic values
// =============================================================================

#[test]
fn test_dynamic_matches_typed_bytes() {
    let cases: Vec<(Value, Vec<u8>)> = vec![
        (Value::from(true), pack(&true).unwrap().to_vec()),
        (Value::from(-3i8), pack(&-3i8).unwrap().to_vec()),
        (Value::from(7u32), pack(&7u32).unwrap().to_vec()),
        (Value::from(-7i64), pack(&-7i64).unwrap().to_vec()),
        (Value::from(0.5f64), pack(&0.5f64).unwrap().to_vec()),
        (Value::from('é'), pack(&'é').unwrap().to_vec()),
        (Value::from("hi"), pack(&"hi".to_string()).unwrap().to_vec()),
        (
            Value::from(Vector3::new(1.0, 2.0, 3.0)),
            pack(&Vector3::new(1.0, 2.0, 3.0)).unwrap().to_vec(),
        ),
        (
            Value::from(Color::WHITE),
            pack(&Color::WHITE).unwrap().to_vec(),
        ),
    ];
    for (value, expected) in cases {
        assert_eq!(write(&value).unwrap(), expected, "{:?}", value);
    }
}

#[test]
fn test_dynamic_containers() {
    let list = Value::List(vec![Value::from(1i32), Value::from(2i32), Value::from(3i32)]);
    assert_eq!(write(&list).unwrap(), pack(&vec![1i32, 2, 3]).unwrap().to_vec());

    let array = Value::Array(vec![Value::from(1u8), Value::from(2u8)]);
    assert_eq!(write(&array).unwrap(), pack(&[1u8, 2]).unwrap().to_vec());

    let mut map = BTreeMap::new();
    map.insert("a".to_string(), 1u8);
    map.insert("b".to_string(), 2u8);
    let dynamic = Value::Map(vec![
        (Value::from("a"), Value::from(1u8)),
        (Value::from("b"), Value::from(2u8)),
    ]);
    assert_eq!(write(&dynamic).unwrap(), pack(&map).unwrap().to_vec());
}

#[test]
fn test_dynamic_composite() {
    let dynamic = Value::composite(
        "Position",
        [("x", Value::from(1.5f32)), ("y", Value::from(2.0f32))],
    );
    let typed = Position { x: 1.5, y: 2.0 };
    assert_eq!(write(&dynamic).unwrap(), pack(&typed).unwrap().to_vec());
}

#[test]
fn test_dynamic_enum() {
    assert_eq!(write(&Value::enumeration("Class", 2)).unwrap(), vec![2u8]);
    assert!(matches!(
        write(&Value::enumeration("Class", 256)),
        Err(PacketError::EnumRange { value: 256, .. })
    ));
}

#[test]
fn test_null_writes_nothing() {
    let mut writer = PacketWriter::new();
    assert!(matches!(
        writer.write_value(&Value::Null),
        Err(PacketError::NullValue)
    ));
    assert!(writer.is_empty());
    assert!(Value::from(None::<u32>).is_null());
    assert_eq!(Value::from(Some(4u32)), Value::U32(4));
}

#[test]
fn test_nested_null_rolls_back() {
    let mut writer = PacketWriter::new();
    writer.write(&1u8).unwrap();

    let value = Value::List(vec![Value::from(1u8), Value::Null]);
    assert!(matches!(
        writer.write_value(&value),
        Err(PacketError::NullValue)
    ));
    assert_eq!(writer.as_slice(), &[1u8]);
}

#[test]
fn test_unsupported_value() {
    let value = Value::Unsupported {
        type_name: "Node3D".to_string(),
    };
    match write(&value) {
        Err(PacketError::UnsupportedType { type_name }) => assert_eq!(type_name, "Node3D"),
        other => panic!("unexpected result: {:?}", other),
    }
    assert_eq!(value.category(), Some(Category::Unsupported));
}

#[test]
fn test_categories() {
    assert_eq!(Value::Null.category(), None);
    assert_eq!(Value::from(1u8).category(), Some(Category::Primitive));
    assert_eq!(Value::from("x").category(), Some(Category::Primitive));
    assert_eq!(
        Value::from(Vector2::ZERO).category(),
        Some(Category::FixedVector)
    );
    assert_eq!(Value::enumeration("Class", 0).category(), Some(Category::Enum));
    assert_eq!(Value::Array(vec![]).category(), Some(Category::Array));
    assert_eq!(Value::List(vec![]).category(), Some(Category::List));
    assert_eq!(Value::Map(vec![]).category(), Some(Category::Map));
    let empty = Value::Composite {
        type_name: "Empty".to_string(),
        members: vec![],
    };
    assert_eq!(empty.category(), Some(Category::Composite));
}

// =============================================================================
// Reading against a shape
// =============================================================================

#[test]
fn test_read_composite_by_shape() {
    let hero = Hero {
        name: "Ayla".to_string(),
        class: Class::Rogue,
        position: Vector2::new(-1.0, 8.0),
        tags: vec!["stealthy".to_string()],
        cached_power: 42,
    };
    let bytes = pack(&hero).unwrap();

    let mut reader = PacketReader::new(bytes.clone());
    let value = reader.read_value(&Hero::shape()).unwrap();
    assert!(reader.is_empty());

    match &value {
        Value::Composite { type_name, members } => {
            assert!(type_name.ends_with("Hero"));
            let names: Vec<_> = members.iter().map(|(name, _)| name.as_str()).collect();
            assert_eq!(names, vec!["name", "class", "position", "tags"]);
        }
        other => panic!("unexpected value: {:?}", other),
    }
    assert_eq!(value.member("name"), Some(&Value::from("Ayla")));
    assert_eq!(
        value.member("class"),
        Some(&Value::enumeration("Class", 2))
    );
    assert_eq!(value.member("cached_power"), None);

    // Writing the decoded value back reproduces the typed encoding.
    assert_eq!(write(&value).unwrap(), bytes.to_vec());
}

#[test]
fn test_read_list_and_map_by_shape() {
    let bytes = pack(&vec![10u16, 20]).unwrap();
    let mut reader = PacketReader::new(bytes);
    assert_eq!(
        reader.read_value(&Vec::<u16>::shape()).unwrap(),
        Value::List(vec![Value::U16(10), Value::U16(20)])
    );

    let mut map = BTreeMap::new();
    map.insert(1u8, Color::BLACK);
    let mut reader = PacketReader::new(pack(&map).unwrap());
    assert_eq!(
        reader
            .read_value(&Shape::map(u8::shape(), Color::shape()))
            .unwrap(),
        Value::Map(vec![(Value::U8(1), Value::Color(Color::BLACK))])
    );
}

#[test]
fn test_read_array_length_checked_by_shape() {
    let mut reader = PacketReader::new(pack(&[1u8, 2, 3]).unwrap());
    assert!(matches!(
        reader.read_value(&<[u8; 2]>::shape()),
        Err(PacketError::LengthMismatch {
            expected: 2,
            actual: 3
        })
    ));

    let mut reader = PacketReader::new(pack(&[1u8, 2]).unwrap());
    assert_eq!(
        reader.read_value(&<[u8; 2]>::shape()).unwrap(),
        Value::Array(vec![Value::U8(1), Value::U8(2)])
    );
}
