use bytes::Bytes;
use netpack::{
    pack, unpack, Color, PacketEnum, PacketError, PacketReader, PacketWriter, Packer, Shape,
    Vector2, Vector3, VectorKind,
};

// =============================================================================
// Fixed vectors
// =============================================================================

#[test]
fn test_vector2_is_two_floats() {
    let bytes = pack(&Vector2::new(3.5, -2.0)).unwrap();
    assert_eq!(bytes.len(), 8);

    let mut expected = Vec::new();
    expected.extend_from_slice(&3.5f32.to_le_bytes());
    expected.extend_from_slice(&(-2.0f32).to_le_bytes());
    assert_eq!(&bytes[..], &expected[..]);

    let mut reader = Bytes::from(expected);
    let decoded: Vector2 = unpack(&mut reader).unwrap();
    assert_eq!(decoded, Vector2 { x: 3.5, y: -2.0 });
}

#[test]
fn test_vector3_round_trip() {
    let value = Vector3::new(1.0, -0.25, 1e9);
    let mut bytes = pack(&value).unwrap();
    assert_eq!(bytes.len(), 12);
    assert_eq!(unpack::<Vector3>(&mut bytes).unwrap(), value);
}

#[test]
fn test_color_channel_order() {
    let color = Color::rgba(0.1, 0.2, 0.3, 0.4);
    let bytes = pack(&color).unwrap();
    assert_eq!(bytes.len(), 16);
    assert_eq!(&bytes[0..4], &0.1f32.to_le_bytes());
    assert_eq!(&bytes[4..8], &0.2f32.to_le_bytes());
    assert_eq!(&bytes[8..12], &0.3f32.to_le_bytes());
    assert_eq!(&bytes[12..16], &0.4f32.to_le_bytes());

    let mut reader = bytes;
    assert_eq!(unpack::<Color>(&mut reader).unwrap(), color);
    assert_eq!(Color::rgb(1.0, 0.5, 0.0).a, 1.0);
}

#[test]
fn test_truncated_vector() {
    let mut bytes = Bytes::from_static(&[0; 7]);
    assert!(matches!(
        unpack::<Vector2>(&mut bytes),
        Err(PacketError::UnexpectedEnd {
            needed: 8,
            remaining: 7
        })
    ));
}

#[test]
fn test_vector_entry_points() {
    let mut writer = PacketWriter::new();
    writer.write_vector(&Vector3::new(1.0, 2.0, 3.0)).unwrap();
    writer.write_vector(&Color::WHITE).unwrap();

    let mut reader = PacketReader::new(writer.freeze());
    assert_eq!(reader.read_vector::<Vector3>().unwrap(), Vector3::new(1.0, 2.0, 3.0));
    assert_eq!(reader.read_vector::<Color>().unwrap(), Color::WHITE);
    assert!(reader.is_empty());
}

#[test]
fn test_vector_shapes() {
    assert_eq!(Vector2::shape(), Shape::Vector(VectorKind::Vector2));
    assert_eq!(Vector3::shape(), Shape::Vector(VectorKind::Vector3));
    assert_eq!(Color::shape(), Shape::Vector(VectorKind::Color));
    assert_eq!(VectorKind::Color.arity(), 4);
}

// =============================================================================
// Enums
// =============================================================================

#[derive(netpack::Packet, Debug, Clone, Copy, PartialEq, Eq)]
enum Team {
    Red,
    Blue,
    Spectator = 10,
}

#[derive(netpack::Packet, Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
enum Wide {
    Small = 3,
    Huge = 300,
    Negative = -1,
}

#[test]
fn test_enum_is_one_byte() {
    assert_eq!(&pack(&Team::Red).unwrap()[..], &[0u8]);
    assert_eq!(&pack(&Team::Blue).unwrap()[..], &[1u8]);
    assert_eq!(&pack(&Team::Spectator).unwrap()[..], &[10u8]);
    assert_eq!(&pack(&Wide::Small).unwrap()[..], &[3u8]);
}

#[test]
fn test_enum_round_trip() {
    for team in [Team::Red, Team::Blue, Team::Spectator] {
        let mut bytes = pack(&team).unwrap();
        assert_eq!(unpack::<Team>(&mut bytes).unwrap(), team);
    }
    let mut bytes = pack(&Wide::Small).unwrap();
    assert_eq!(unpack::<Wide>(&mut bytes).unwrap(), Wide::Small);
}

#[test]
fn test_enum_out_of_byte_range() {
    let mut writer = PacketWriter::new();
    let err = writer.write(&Wide::Huge).unwrap_err();
    match err {
        PacketError::EnumRange { type_name, value } => {
            assert_eq!(type_name, "Wide");
            assert_eq!(value, 300);
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(writer.is_empty());

    assert!(matches!(
        pack(&Wide::Negative),
        Err(PacketError::EnumRange { value: -1, .. })
    ));
}

#[test]
fn test_unknown_discriminant() {
    let mut bytes = Bytes::from_static(&[5]);
    assert!(matches!(
        unpack::<Team>(&mut bytes),
        Err(PacketError::UnknownDiscriminant {
            type_name: "Team",
            value: 5
        })
    ));
}

#[test]
fn test_packet_enum_trait() {
    assert_eq!(Team::TYPE_NAME, "Team");
    assert_eq!(Team::Spectator.discriminant(), 10);
    assert_eq!(Team::from_discriminant(1), Some(Team::Blue));
    assert_eq!(Team::from_discriminant(2), None);
    assert_eq!(Wide::from_discriminant(-1), Some(Wide::Negative));
    assert_eq!(Team::shape(), Shape::Enum { type_name: "Team" });
}

#[test]
fn test_enum_entry_points() {
    let mut writer = PacketWriter::new();
    writer.write_enum(&Team::Blue).unwrap();
    let mut reader = PacketReader::new(writer.freeze());
    assert_eq!(reader.read_enum::<Team>().unwrap(), Team::Blue);
}
