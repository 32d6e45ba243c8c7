use std::io::{self, Read};

use byteorder::{BigEndian, WriteBytesExt};
use jace_class_file::{attributes::Attribute, ClassFile, ClassFileError, Constant};
use jace_metaclass::MetaClassError;

// Constant pool indices of `ClassBytes::new`
const MAIN_CLASS: u16 = 2;
const OBJECT_CLASS: u16 = 4;
const SYNTHETIC: u16 = 5;
const CONSTANT_VALUE: u16 = 6;
const CUSTOM: u16 = 7;
const INTEGER: u16 = 8;
const RUN: u16 = 9;
const BAD_DESCRIPTOR: u16 = 10;
const LONG: u16 = 11;
const VOID_DESCRIPTOR: u16 = 13;

/// Builds a class file field by field, so each test can break exactly one thing.
#[derive(Clone)]
struct ClassBytes {
    magic: u32,
    constants: Vec<u8>,
    pool_width: u16,
    this_class: u16,
    super_class: u16,
    methods: Vec<Vec<u8>>,
    attributes: Vec<Vec<u8>>,
}

impl ClassBytes {
    fn new() -> Self {
        let mut class_bytes = Self {
            magic: 0xCAFEBABE,
            constants: Vec::new(),
            pool_width: 0,
            this_class: MAIN_CLASS,
            super_class: OBJECT_CLASS,
            methods: Vec::new(),
            attributes: Vec::new(),
        };
        class_bytes
            .utf8("Main")
            .class(1)
            .utf8("java/lang/Object")
            .class(3)
            .utf8("Synthetic")
            .utf8("ConstantValue")
            .utf8("Custom")
            .constant(3, &42i32.to_be_bytes(), 1)
            .utf8("run")
            .utf8("(X)V")
            .constant(5, &[0, 0, 0, 0, 0, 0, 0, 1], 2)
            .utf8("()V");
        class_bytes
    }

    fn constant(&mut self, tag: u8, payload: &[u8], width: u16) -> &mut Self {
        self.constants.push(tag);
        self.constants.extend_from_slice(payload);
        self.pool_width += width;
        self
    }

    fn utf8(&mut self, text: &str) -> &mut Self {
        let mut payload = Vec::new();
        payload.write_u16::<BigEndian>(text.len() as u16).unwrap();
        payload.extend_from_slice(text.as_bytes());
        self.constant(1, &payload, 1)
    }

    fn class(&mut self, name_index: u16) -> &mut Self {
        self.constant(7, &name_index.to_be_bytes(), 1)
    }

    fn attribute(&mut self, name_index: u16, info: &[u8]) -> &mut Self {
        self.attribute_with_length(name_index, info.len() as u32, info)
    }

    fn attribute_with_length(&mut self, name_index: u16, length: u32, info: &[u8]) -> &mut Self {
        let mut attribute = Vec::new();
        attribute.write_u16::<BigEndian>(name_index).unwrap();
        attribute.write_u32::<BigEndian>(length).unwrap();
        attribute.extend_from_slice(info);
        self.attributes.push(attribute);
        self
    }

    fn method(&mut self, name_index: u16, descriptor_index: u16) -> &mut Self {
        let mut method = Vec::new();
        method.write_u16::<BigEndian>(0x0001).unwrap();
        method.write_u16::<BigEndian>(name_index).unwrap();
        method.write_u16::<BigEndian>(descriptor_index).unwrap();
        method.write_u16::<BigEndian>(0).unwrap();
        self.methods.push(method);
        self
    }

    fn bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.write_u32::<BigEndian>(self.magic).unwrap();
        bytes.write_u16::<BigEndian>(0).unwrap();
        bytes.write_u16::<BigEndian>(52).unwrap();
        bytes.write_u16::<BigEndian>(self.pool_width + 1).unwrap();
        bytes.extend_from_slice(&self.constants);
        bytes.write_u16::<BigEndian>(0x0021).unwrap();
        bytes.write_u16::<BigEndian>(self.this_class).unwrap();
        bytes.write_u16::<BigEndian>(self.super_class).unwrap();
        bytes.write_u16::<BigEndian>(0).unwrap();
        bytes.write_u16::<BigEndian>(0).unwrap();
        bytes.write_u16::<BigEndian>(self.methods.len() as u16).unwrap();
        bytes.extend(self.methods.concat());
        bytes.write_u16::<BigEndian>(self.attributes.len() as u16).unwrap();
        bytes.extend(self.attributes.concat());
        bytes
    }

    fn parse(&self) -> Result<ClassFile, ClassFileError> {
        let _ = pretty_env_logger::try_init();
        ClassFile::parse(self.bytes().as_slice())
    }
}

#[test]
fn test_minimal_class_round_trip() {
    let class_bytes = ClassBytes::new();
    let class_file = class_bytes.parse().unwrap();

    assert_eq!("Main", class_file.class_name().unwrap().as_path().unwrap());
    assert_eq!(class_bytes.bytes(), class_file.to_bytes().unwrap());
}

#[test]
fn test_wide_constant_leaves_a_gap() {
    let class_file = ClassBytes::new().parse().unwrap();
    let constant_pool = class_file.constant_pool();

    assert_eq!(
        Some(&Constant::Long { high: 0, low: 1 }),
        constant_pool.get(LONG)
    );
    assert_eq!(None, constant_pool.get(LONG + 1));
    assert_eq!("()V", constant_pool.utf8(VOID_DESCRIPTOR).unwrap());
    assert_eq!(13, constant_pool.width());
    assert_eq!(12, constant_pool.len());
}

#[test]
fn test_wide_constant_past_the_declared_count() {
    let mut class_bytes = ClassBytes::new();
    class_bytes.constant(5, &[0, 0, 0, 0, 0, 0, 0, 2], 2);
    class_bytes.pool_width -= 1;

    assert!(matches!(
        class_bytes.parse(),
        Err(ClassFileError::ConstantPoolCountMismatch {
            declared: 14,
            actual: 15
        })
    ));
}

#[test]
fn test_bad_magic() {
    let mut class_bytes = ClassBytes::new();
    class_bytes.magic = 0xCAFEDADA;

    assert!(matches!(
        class_bytes.parse(),
        Err(ClassFileError::BadMagic(0xCAFEDADA))
    ));
}

#[test]
fn test_unknown_constant_tag_is_fatal() {
    let mut class_bytes = ClassBytes::new();
    class_bytes.constant(99, &[0, 0], 1);

    assert!(matches!(
        class_bytes.parse(),
        Err(ClassFileError::UnknownConstantTag(99))
    ));
}

#[test]
fn test_every_truncation_is_reported() {
    let mut class_bytes = ClassBytes::new();
    class_bytes
        .method(RUN, VOID_DESCRIPTOR)
        .attribute(CUSTOM, &[1, 2, 3]);
    let bytes = class_bytes.bytes();

    for length in 0..bytes.len() {
        assert!(
            matches!(
                ClassFile::parse(&bytes[..length]),
                Err(ClassFileError::TruncatedInput)
            ),
            "{} of {} bytes",
            length,
            bytes.len()
        );
    }
    assert!(ClassFile::parse(bytes.as_slice()).is_ok());
}

#[test]
fn test_unknown_attribute_is_kept() {
    let mut class_bytes = ClassBytes::new();
    class_bytes.attribute(CUSTOM, &[0xDE, 0xAD, 0xBE, 0xEF]);
    let class_file = class_bytes.parse().unwrap();

    match &class_file.attributes().0[..] {
        [Attribute::Unknown(attribute)] => {
            assert_eq!(CUSTOM, attribute.name_index);
            assert_eq!(vec![0xDE, 0xAD, 0xBE, 0xEF], attribute.info);
        }
        attributes => panic!("unexpected attributes {:?}", attributes),
    }
    assert_eq!(class_bytes.bytes(), class_file.to_bytes().unwrap());
}

#[test]
fn test_known_attribute_with_extra_bytes() {
    let mut class_bytes = ClassBytes::new();
    class_bytes.attribute(SYNTHETIC, &[0]);

    match class_bytes.parse() {
        Err(ClassFileError::AttributeLengthMismatch {
            name,
            declared,
            actual,
        }) => {
            assert_eq!("Synthetic", name);
            assert_eq!(1, declared);
            assert_eq!(0, actual);
        }
        other => panic!("unexpected result {:?}", other),
    }
}

#[test]
fn test_constant_value_with_a_long_payload() {
    let mut class_bytes = ClassBytes::new();
    class_bytes.attribute(CONSTANT_VALUE, &[0, INTEGER as u8, 0, 0]);

    assert!(matches!(
        class_bytes.parse(),
        Err(ClassFileError::AttributeLengthMismatch {
            declared: 4,
            actual: 2,
            ..
        })
    ));
}

#[test]
fn test_constant_value_with_a_short_payload() {
    let mut class_bytes = ClassBytes::new();
    class_bytes.attribute(CONSTANT_VALUE, &[0]);

    assert!(matches!(
        class_bytes.parse(),
        Err(ClassFileError::TruncatedInput)
    ));
}

#[test]
fn test_attribute_length_past_the_end() {
    let mut class_bytes = ClassBytes::new();
    class_bytes.attribute_with_length(CUSTOM, u32::MAX, &[1, 2]);

    assert!(matches!(
        class_bytes.parse(),
        Err(ClassFileError::TruncatedInput)
    ));
}

#[test]
fn test_attribute_name_must_be_utf8() {
    let mut class_bytes = ClassBytes::new();
    class_bytes.attribute(INTEGER, &[]);

    assert!(matches!(
        class_bytes.parse(),
        Err(ClassFileError::WrongConstantKind {
            index: INTEGER,
            expected: "Utf8",
            found: "Integer"
        })
    ));
}

#[test]
fn test_this_class_must_be_a_class() {
    let mut class_bytes = ClassBytes::new();
    class_bytes.this_class = 1;

    assert!(matches!(
        class_bytes.parse(),
        Err(ClassFileError::WrongConstantKind {
            index: 1,
            expected: "Class",
            found: "Utf8"
        })
    ));
}

#[test]
fn test_super_class_in_a_wide_gap() {
    let mut class_bytes = ClassBytes::new();
    class_bytes.super_class = LONG + 1;

    assert!(matches!(
        class_bytes.parse(),
        Err(ClassFileError::WrongConstantKind {
            found: "nothing",
            ..
        })
    ));
}

#[test]
fn test_object_has_no_super_class() {
    let mut class_bytes = ClassBytes::new();
    class_bytes.this_class = OBJECT_CLASS;
    class_bytes.super_class = 0;
    let class_file = class_bytes.parse().unwrap();

    assert_eq!(None, class_file.super_class_name().unwrap());
    assert_eq!(class_bytes.bytes(), class_file.to_bytes().unwrap());
}

#[test]
fn test_malformed_method_descriptor() {
    let mut class_bytes = ClassBytes::new();
    class_bytes.method(RUN, BAD_DESCRIPTOR);

    assert!(matches!(
        class_bytes.parse(),
        Err(ClassFileError::MetaClass(
            MetaClassError::MalformedMethodDescriptor { .. }
        ))
    ));
}

struct FailingReader;

impl Read for FailingReader {
    fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"))
    }
}

#[test]
fn test_reader_failure_is_not_truncation() {
    assert!(matches!(
        ClassFile::parse(FailingReader),
        Err(ClassFileError::Io(ref e)) if e.kind() == io::ErrorKind::PermissionDenied
    ));
}
