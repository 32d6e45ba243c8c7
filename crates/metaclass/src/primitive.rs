#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Boolean,
    Byte,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
    Void,
}

// (kind, descriptor letter, java name, proxy name, jni type)
const PRIMITIVES: [(PrimitiveKind, char, &str, &str, &str); 9] = [
    (PrimitiveKind::Byte, 'B', "byte", "JByte", "jbyte"),
    (PrimitiveKind::Char, 'C', "char", "JChar", "jchar"),
    (PrimitiveKind::Double, 'D', "double", "JDouble", "jdouble"),
    (PrimitiveKind::Float, 'F', "float", "JFloat", "jfloat"),
    (PrimitiveKind::Int, 'I', "int", "JInt", "jint"),
    (PrimitiveKind::Long, 'J', "long", "JLong", "jlong"),
    (PrimitiveKind::Short, 'S', "short", "JShort", "jshort"),
    (PrimitiveKind::Boolean, 'Z', "boolean", "JBoolean", "jboolean"),
    (PrimitiveKind::Void, 'V', "void", "JVoid", "void"),
];

impl PrimitiveKind {
    pub fn from_descriptor_char(c: char) -> Option<Self> {
        PRIMITIVES
            .iter()
            .find(|entry| entry.1 == c)
            .map(|entry| entry.0)
    }

    /// Looks up a single-letter descriptor such as `I`. Anything longer is not a primitive.
    pub fn from_descriptor(descriptor: &str) -> Option<Self> {
        let mut chars = descriptor.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::from_descriptor_char(c),
            _ => None,
        }
    }

    pub fn from_java_name(name: &str) -> Option<Self> {
        PRIMITIVES
            .iter()
            .find(|entry| entry.2 == name)
            .map(|entry| entry.0)
    }

    pub fn descriptor_char(self) -> char {
        self.entry().1
    }

    pub fn java_name(self) -> &'static str {
        self.entry().2
    }

    pub fn simple_name(self) -> &'static str {
        self.entry().3
    }

    pub fn jni_type(self) -> &'static str {
        self.entry().4
    }

    fn entry(self) -> &'static (PrimitiveKind, char, &'static str, &'static str, &'static str) {
        let row = match self {
            PrimitiveKind::Byte => 0,
            PrimitiveKind::Char => 1,
            PrimitiveKind::Double => 2,
            PrimitiveKind::Float => 3,
            PrimitiveKind::Int => 4,
            PrimitiveKind::Long => 5,
            PrimitiveKind::Short => 6,
            PrimitiveKind::Boolean => 7,
            PrimitiveKind::Void => 8,
        };
        &PRIMITIVES[row]
    }
}
