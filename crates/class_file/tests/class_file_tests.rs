use std::fs::{self, File};

use jace_class_file::{
    attributes::Attribute, ClassAccessFlags, ClassFile, ClassFileError, Constant, ConstantValue,
    FieldAccessFlags, MethodAccessFlags, Parser,
};
use jace_metaclass::TypeName;

const FIXTURES: [&str; 4] = [
    "tests/classes/my/MyClass.class",
    "tests/classes/my/MyClass$Inner.class",
    "tests/classes/my/Color.class",
    "tests/classes/my/Marker.class",
];

fn init_logger() {
    let _ = pretty_env_logger::try_init();
}

fn load(path: &str) -> ClassFile {
    init_logger();
    ClassFile::parse(File::open(path).unwrap()).unwrap()
}

fn with_class_file(f: impl FnOnce(ClassFile)) {
    init_logger();
    f(
        Parser::new(File::open("tests/classes/my/MyClass.class").unwrap())
            .parse()
            .unwrap(),
    );
}

fn method_names(class_file: &ClassFile) -> Vec<String> {
    class_file
        .methods()
        .iter()
        .map(|m| m.name(class_file.constant_pool()).unwrap().into_owned())
        .collect()
}

#[test]
fn test_super_class() {
    with_class_file(|class_file| {
        assert_eq!(
            Some(TypeName::from_identifier("java.lang.Object")),
            class_file.super_class_name().unwrap()
        )
    });
}

#[test]
fn test_class_name() {
    with_class_file(|class_file| {
        assert_eq!(
            "my/MyClass",
            class_file.class_name().unwrap().as_path().unwrap()
        )
    });
}

#[test]
fn test_interfaces() {
    with_class_file(|class_file| {
        assert_eq!(
            vec![
                TypeName::from_identifier("java.lang.Comparable"),
                TypeName::from_identifier("java.io.Serializable")
            ],
            class_file.interfaces().unwrap()
        )
    });
}

#[test]
fn test_field_name() {
    with_class_file(|class_file| {
        assert_eq!(
            "myField",
            class_file.fields()[0]
                .name(class_file.constant_pool())
                .unwrap()
        )
    });
}

#[test]
fn test_int_field_type() {
    with_class_file(|class_file| {
        assert_eq!(
            TypeName::from_identifier("int"),
            class_file.fields()[0]
                .descriptor(class_file.constant_pool())
                .unwrap()
        )
    });
}

#[test]
fn test_field_access_flags() {
    with_class_file(|class_file| {
        assert_eq!(
            FieldAccessFlags::FINAL | FieldAccessFlags::PRIVATE,
            class_file.fields()[0].access_flags()
        )
    });
}

#[test]
fn test_constructor_name() {
    with_class_file(|class_file| {
        assert_eq!(
            "<init>",
            class_file.methods()[0]
                .name(class_file.constant_pool())
                .unwrap()
        )
    });
}

#[test]
fn test_constructor_descriptor() {
    with_class_file(|class_file| {
        let constructor = &class_file.methods()[0];

        assert_eq!(
            "()V",
            constructor.descriptor(class_file.constant_pool()).unwrap()
        );
        assert!(constructor.parameter_types().is_empty());
        assert_eq!("void", constructor.return_type().as_identifier());
    });
}

#[test]
fn test_method_name() {
    with_class_file(|class_file| {
        assert_eq!(
            "add",
            class_file.methods()[1]
                .name(class_file.constant_pool())
                .unwrap()
        )
    });
}

#[test]
fn test_method_descriptor() {
    with_class_file(|class_file| {
        let add = &class_file.methods()[1];

        assert_eq!("(I)F", add.descriptor(class_file.constant_pool()).unwrap());
        assert_eq!(vec![TypeName::from_identifier("int")], add.parameter_types());
        assert_eq!("float", add.return_type().as_identifier());
    });
}

#[test]
fn test_method_access_flags() {
    with_class_file(|class_file| {
        assert_eq!(MethodAccessFlags::PUBLIC, class_file.methods()[1].access_flags())
    });
}

#[test]
fn test_method_exceptions() {
    with_class_file(|class_file| {
        let add = class_file.method_by_name("add").unwrap();

        assert_eq!(
            vec![TypeName::from_identifier("java.io.IOException")],
            add.exceptions(class_file.constant_pool()).unwrap()
        );
    });
}

#[test]
fn test_code_attribute() {
    with_class_file(|class_file| {
        let constant_pool = class_file.constant_pool();
        let code = class_file.methods()[1].code().unwrap();

        assert_eq!(3, code.max_stack);
        assert_eq!(2, code.max_locals);
        assert_eq!(19, code.code.len());
        assert!(code.exception_table.is_empty());

        let variables = code
            .attributes
            .iter()
            .find_map(|a| match a {
                Attribute::LocalVariableTable(table) => Some(&table.variables),
                _ => None,
            })
            .unwrap()
            .iter()
            .map(|v| constant_pool.utf8(v.name_index).unwrap().into_owned())
            .collect::<Vec<_>>();
        assert_eq!(vec!["this", "value"], variables);

        assert!(code
            .attributes
            .find_by_name("LineNumberTable", constant_pool)
            .is_some());
    });
}

#[test]
fn test_constant_values() {
    with_class_file(|class_file| {
        let constant_pool = class_file.constant_pool();
        let value = |name: &str| {
            class_file
                .field_by_name(name)
                .unwrap()
                .constant_value(constant_pool)
                .unwrap()
                .unwrap()
        };

        assert_eq!(ConstantValue::Integer(1), value("myField"));
        assert_eq!(ConstantValue::Long(1 << 40), value("BIG"));
        assert_eq!(ConstantValue::Double(0.5), value("RATIO"));
        assert_eq!(
            ConstantValue::Text("héllo\0wörld 😀".into()),
            value("GREETING")
        );
    });
}

#[test]
fn test_bridge_and_varargs_flags() {
    with_class_file(|class_file| {
        let bridge = &class_file.methods()[6];

        assert_eq!(
            "(Ljava/lang/Object;)I",
            bridge.descriptor(class_file.constant_pool()).unwrap()
        );
        assert_eq!(
            MethodAccessFlags::PUBLIC | MethodAccessFlags::BRIDGE | MethodAccessFlags::SYNTHETIC,
            bridge.access_flags()
        );
        assert!(class_file
            .method_by_name("join")
            .unwrap()
            .access_flags()
            .contains(MethodAccessFlags::VARARGS));
    });
}

#[test]
fn test_class_attributes() {
    with_class_file(|class_file| {
        let constant_pool = class_file.constant_pool();
        let attributes = class_file.attributes();

        let signature = attributes.signature().unwrap();
        assert_eq!(
            "Ljava/lang/Object;Ljava/lang/Comparable<Lmy/MyClass;>;Ljava/io/Serializable;",
            constant_pool.utf8(signature.signature_index).unwrap()
        );

        let Some(Attribute::InnerClasses(inner_classes)) =
            attributes.find_by_name("InnerClasses", constant_pool)
        else {
            panic!("no InnerClasses attribute");
        };
        assert_eq!(
            TypeName::from_path("my/MyClass$Inner"),
            constant_pool
                .class_name(inner_classes.classes[0].inner_class_info_index)
                .unwrap()
        );

        assert!(matches!(
            attributes.find_by_name("SourceFile", constant_pool),
            Some(Attribute::Unknown(_))
        ));
        assert!(class_file
            .method_by_name("old")
            .unwrap()
            .attributes()
            .is_deprecated());
    });
}

#[test]
fn test_round_trip_is_byte_exact() {
    init_logger();
    for path in FIXTURES {
        let bytes = fs::read(path).unwrap();
        let class_file = ClassFile::parse(bytes.as_slice()).unwrap();

        assert_eq!(bytes, class_file.to_bytes().unwrap(), "{}", path);
    }
}

#[test]
fn test_write_is_repeatable() {
    let class_file = load(FIXTURES[0]);
    let mut first = Vec::new();
    let mut second = Vec::new();

    class_file.write(&mut first).unwrap();
    class_file.write(&mut second).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_downgrade_moves_synthetic_flags_to_attributes() {
    let mut class_file = load(FIXTURES[0]);
    let methods_before = class_file.methods().len();

    class_file.set_version(48, 0).unwrap();

    assert_eq!(48, class_file.major_version());
    assert_eq!(methods_before, class_file.methods().len());

    let bridge = &class_file.methods()[6];
    assert_eq!(MethodAccessFlags::PUBLIC, bridge.access_flags());
    assert!(bridge.attributes().is_synthetic());

    let lambda = class_file.method_by_name("lambda$task$0").unwrap();
    assert_eq!(
        MethodAccessFlags::PRIVATE | MethodAccessFlags::STATIC,
        lambda.access_flags()
    );
    assert!(lambda.attributes().is_synthetic());

    let join = class_file.method_by_name("join").unwrap();
    assert_eq!(
        MethodAccessFlags::PUBLIC | MethodAccessFlags::STATIC,
        join.access_flags()
    );
    assert!(!join.attributes().is_synthetic());

    assert!(!class_file.attributes().is_synthetic());
}

#[test]
fn test_downgraded_class_survives_a_round_trip() {
    let mut class_file = load(FIXTURES[0]);
    class_file.set_version(48, 0).unwrap();

    let bytes = class_file.to_bytes().unwrap();
    let reparsed = ClassFile::parse(bytes.as_slice()).unwrap();

    assert_eq!(class_file, reparsed);
    assert_eq!(bytes, reparsed.to_bytes().unwrap());
}

#[test]
fn test_failed_downgrade_leaves_the_class_unchanged() {
    let mut class_file = load(FIXTURES[0]);
    while class_file
        .constant_pool_mut()
        .add_constant(Constant::Integer(0))
        .is_ok()
    {}
    let before = class_file.clone();

    assert!(matches!(
        class_file.set_version(48, 0),
        Err(ClassFileError::TooLarge { .. })
    ));
    assert_eq!(before, class_file);
    assert_eq!(52, class_file.major_version());
}

#[test]
fn test_downgrade_drops_enum_markers() {
    let mut class_file = load("tests/classes/my/Color.class");
    let synthetic_name = class_file.constant_pool().len();

    class_file.set_version(46, 0).unwrap();

    assert_eq!(
        ClassAccessFlags::PUBLIC | ClassAccessFlags::FINAL | ClassAccessFlags::SUPER,
        class_file.access_flags()
    );

    let red = class_file.field_by_name("RED").unwrap();
    assert_eq!(
        FieldAccessFlags::PUBLIC | FieldAccessFlags::STATIC | FieldAccessFlags::FINAL,
        red.access_flags()
    );
    assert!(!red.attributes().is_synthetic());

    let values = class_file.field_by_name("$VALUES").unwrap();
    assert_eq!(
        FieldAccessFlags::PRIVATE | FieldAccessFlags::STATIC | FieldAccessFlags::FINAL,
        values.access_flags()
    );
    assert!(values.attributes().is_synthetic());

    // One Synthetic name is shared by every new attribute
    assert_eq!(synthetic_name + 1, class_file.constant_pool().len());
}

#[test]
fn test_downgrade_drops_annotation_marker() {
    let mut class_file = load("tests/classes/my/Marker.class");

    class_file.set_version(48, 0).unwrap();

    assert_eq!(
        ClassAccessFlags::PUBLIC | ClassAccessFlags::INTERFACE | ClassAccessFlags::ABSTRACT,
        class_file.access_flags()
    );
}

#[test]
fn test_downgrade_of_a_synthetic_field() {
    let mut class_file = load("tests/classes/my/MyClass$Inner.class");

    class_file.set_version(45, 3).unwrap();

    let outer = class_file.field_by_name("this$0").unwrap();
    assert_eq!(FieldAccessFlags::FINAL, outer.access_flags());
    assert!(outer.attributes().is_synthetic());
    assert_eq!(3, class_file.minor_version());
}

#[test]
fn test_synthetic_class_flag_becomes_a_class_attribute() {
    let mut class_file = load(FIXTURES[0]);
    class_file.set_access_flags(class_file.access_flags() | ClassAccessFlags::SYNTHETIC);

    class_file.set_version(48, 0).unwrap();

    assert!(!class_file
        .access_flags()
        .contains(ClassAccessFlags::SYNTHETIC));
    assert!(class_file.attributes().is_synthetic());
}

#[test]
fn test_upgrade_rewrites_nothing() {
    let mut class_file = load(FIXTURES[0]);
    class_file.set_version(48, 0).unwrap();
    let downgraded = class_file.clone();

    class_file.set_version(52, 0).unwrap();

    assert_eq!(52, class_file.major_version());
    assert_eq!(downgraded.methods(), class_file.methods());
    assert_eq!(downgraded.fields(), class_file.fields());
    assert_eq!(downgraded.attributes(), class_file.attributes());
}

#[test]
fn test_version_change_on_one_side_rewrites_nothing() {
    let mut class_file = load(FIXTURES[0]);
    let original = class_file.clone();

    class_file.set_version(50, 0).unwrap();

    assert_eq!(original.methods(), class_file.methods());
    assert_eq!(original.constant_pool(), class_file.constant_pool());
}

#[test]
fn test_set_class_name() {
    let mut class_file = load(FIXTURES[0]);
    let width = class_file.constant_pool().width();

    class_file
        .set_class_name(&TypeName::from_path("renamed/Thing"))
        .unwrap();

    assert_eq!(
        TypeName::from_identifier("renamed.Thing"),
        class_file.class_name().unwrap()
    );
    assert_eq!(width + 1, class_file.constant_pool().width());

    let reparsed = ClassFile::parse(class_file.to_bytes().unwrap().as_slice()).unwrap();
    assert_eq!(class_file.class_name().unwrap(), reparsed.class_name().unwrap());
}

#[test]
fn test_set_class_name_reuses_existing_text() {
    let mut class_file = load(FIXTURES[0]);
    let width = class_file.constant_pool().width();

    class_file
        .set_class_name(&TypeName::from_descriptor("Ljava/io/IOException;").unwrap())
        .unwrap();

    assert_eq!(width, class_file.constant_pool().width());
    assert_eq!("java/io/IOException", class_file.class_name().unwrap().as_path().unwrap());
}

#[test]
fn test_set_class_name_needs_a_path() {
    let mut class_file = load(FIXTURES[0]);

    assert!(class_file
        .set_class_name(&TypeName::from_identifier("renamed.Thing"))
        .is_err());
    assert_eq!("my/MyClass", class_file.class_name().unwrap().as_path().unwrap());
}

#[test]
fn test_set_super_class_name() {
    let mut class_file = load(FIXTURES[0]);

    class_file
        .set_super_class_name(Some(&TypeName::from_path("java/lang/Number")))
        .unwrap();
    assert_eq!(
        Some(TypeName::from_identifier("java.lang.Number")),
        class_file.super_class_name().unwrap()
    );

    class_file.set_super_class_name(None).unwrap();
    assert_eq!(0, class_file.super_class());
    assert_eq!(None, class_file.super_class_name().unwrap());

    let width = class_file.constant_pool().width();
    class_file
        .set_super_class_name(Some(&TypeName::from_path("java/lang/Thread")))
        .unwrap();
    assert_eq!(width + 2, class_file.constant_pool().width());
    assert_eq!(width as u16 + 2, class_file.super_class());
    assert_eq!(
        Some(TypeName::from_path("java/lang/Thread")),
        class_file.super_class_name().unwrap()
    );
}

#[test]
fn test_add_attribute_is_written() {
    let mut class_file = load(FIXTURES[0]);
    let deprecated =
        jace_class_file::attributes::DeprecatedAttribute::new(class_file.constant_pool_mut())
            .unwrap();
    class_file.methods_mut()[1].add_attribute(Attribute::Deprecated(deprecated));

    let reparsed = ClassFile::parse(class_file.to_bytes().unwrap().as_slice()).unwrap();

    assert!(reparsed.methods()[1].attributes().is_deprecated());
}

#[test]
fn test_method_order() {
    with_class_file(|class_file| {
        assert_eq!(
            vec![
                "<init>",
                "add",
                "compareTo",
                "join",
                "old",
                "task",
                "compareTo",
                "lambda$task$0"
            ],
            method_names(&class_file)
        );
    });
}

#[test]
fn test_display() {
    with_class_file(|class_file| {
        let listing = class_file.to_string();

        assert!(listing.starts_with("public super class my.MyClass extends java.lang.Object"));
        assert!(listing.contains("  implements java.io.Serializable\n"));
        assert!(listing.contains("  field private final int myField = 1\n"));
        assert!(listing.contains("  field public static final long BIG = 1099511627776\n"));
        assert!(listing.contains("  method public float add(int) throws java.io.IOException\n"));
        assert!(listing.contains(
            "  method public static varargs java.lang.String join([java.lang.String)\n"
        ));
        assert!(listing
            .lines()
            .last()
            .unwrap()
            .contains("InnerClasses"));
    });
}
