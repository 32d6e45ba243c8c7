use std::fmt;

use crate::{
    adjust_keyword, ClassPackage, MetaClassError, PrimitiveKind, Result, TypeName, PEER_PACKAGE,
    PROXY_PACKAGE,
};

static NO_PACKAGE: ClassPackage = ClassPackage::empty();

/// A resolved type, as the binding generator sees it.
///
/// Values are never changed in place. `proxy` and `un_proxy` move a type into and out of the
/// generated-code namespace rooted at [`PROXY_PACKAGE`] and return new values.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MetaClass {
    Primitive { kind: PrimitiveKind, proxied: bool },
    Array(Box<MetaClass>),
    Class(ClassMetaClass),
}

impl MetaClass {
    pub fn resolve(type_name: &TypeName) -> Result<MetaClass> {
        let descriptor = type_name.as_descriptor();

        if let Some(component) = descriptor.strip_prefix('[') {
            let component = TypeName::from_descriptor(component)?;
            return Ok(MetaClass::Array(Box::new(Self::resolve(&component)?)));
        }

        if let Some(kind) = PrimitiveKind::from_descriptor(&descriptor) {
            return Ok(MetaClass::Primitive {
                kind,
                proxied: false,
            });
        }

        let mut components = type_name.components()?;
        let name = components
            .pop()
            .filter(|name| !name.is_empty())
            .ok_or(MetaClassError::MalformedDescriptor(descriptor))?;

        Ok(MetaClass::Class(ClassMetaClass::new(
            name,
            ClassPackage::new(components),
        )))
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, MetaClass::Primitive { .. })
    }

    pub fn is_proxy(&self) -> bool {
        match self {
            MetaClass::Primitive { proxied, .. } => *proxied,
            MetaClass::Array(element) => element.is_proxy(),
            MetaClass::Class(class) => class.is_proxy(),
        }
    }

    pub fn element_type(&self) -> Option<&MetaClass> {
        match self {
            MetaClass::Array(element) => Some(element),
            _ => None,
        }
    }

    /// The first element type that is not itself an array.
    pub fn innermost_element(&self) -> &MetaClass {
        let mut current = self;
        while let MetaClass::Array(element) = current {
            current = element;
        }
        current
    }

    pub fn simple_name(&self) -> String {
        match self {
            MetaClass::Primitive { kind, .. } => kind.simple_name().to_owned(),
            MetaClass::Array(element) => format!("JArray< {} >", element.simple_name()),
            MetaClass::Class(class) => class.simple_name(),
        }
    }

    pub fn fully_qualified_name(&self, separator: &str) -> String {
        match self {
            MetaClass::Primitive {
                kind,
                proxied: false,
            } => kind.simple_name().to_owned(),
            MetaClass::Primitive {
                kind,
                proxied: true,
            } => format!(
                "{}{}types{}{}",
                PROXY_PACKAGE.join(separator),
                separator,
                separator,
                kind.simple_name()
            ),
            MetaClass::Array(element) => {
                format!("jace::JArray< ::{} >", element.fully_qualified_name(separator))
            }
            MetaClass::Class(class) => class.fully_qualified_name(separator),
        }
    }

    pub fn package(&self) -> &ClassPackage {
        match self {
            MetaClass::Primitive { .. } => &NO_PACKAGE,
            MetaClass::Array(element) => element.package(),
            MetaClass::Class(class) => class.package(),
        }
    }

    pub fn proxy(&self) -> Result<MetaClass> {
        match self {
            MetaClass::Primitive {
                kind,
                proxied: false,
            } => Ok(MetaClass::Primitive {
                kind: *kind,
                proxied: true,
            }),
            MetaClass::Primitive { proxied: true, .. } => Err(
                MetaClassError::IllegalProjectionState(format!(
                    "{} is already a proxy",
                    self.fully_qualified_name(".")
                )),
            ),
            MetaClass::Array(element) => Ok(MetaClass::Array(Box::new(element.proxy()?))),
            MetaClass::Class(class) => Ok(MetaClass::Class(class.proxy()?)),
        }
    }

    pub fn un_proxy(&self) -> Result<MetaClass> {
        match self {
            MetaClass::Primitive {
                kind,
                proxied: true,
            } => Ok(MetaClass::Primitive {
                kind: *kind,
                proxied: false,
            }),
            MetaClass::Primitive { proxied: false, .. } => Err(
                MetaClassError::IllegalProjectionState(format!(
                    "{} is not a proxy",
                    self.fully_qualified_name(".")
                )),
            ),
            MetaClass::Array(element) => Ok(MetaClass::Array(Box::new(element.un_proxy()?))),
            MetaClass::Class(class) => Ok(MetaClass::Class(class.un_proxy()?)),
        }
    }

    /// The JNI type a value of this type is passed as.
    pub fn jni_type(&self) -> &'static str {
        match self {
            MetaClass::Primitive { kind, .. } => kind.jni_type(),
            MetaClass::Array(element) => match **element {
                MetaClass::Primitive { kind, .. } => match kind {
                    PrimitiveKind::Boolean => "jbooleanArray",
                    PrimitiveKind::Byte => "jbyteArray",
                    PrimitiveKind::Char => "jcharArray",
                    PrimitiveKind::Double => "jdoubleArray",
                    PrimitiveKind::Float => "jfloatArray",
                    PrimitiveKind::Long => "jlongArray",
                    PrimitiveKind::Short => "jshortArray",
                    PrimitiveKind::Int | PrimitiveKind::Void => "jobjectArray",
                },
                _ => "jobjectArray",
            },
            MetaClass::Class(class) => class.jni_type(),
        }
    }

    /// Include-guard macro name of the header declaring this type.
    pub fn guard_name(&self) -> String {
        match self {
            MetaClass::Primitive { kind, .. } => {
                format!("JACE_TYPES_{}_H", kind.simple_name().to_uppercase())
            }
            MetaClass::Array(element) => element.guard_name(),
            MetaClass::Class(class) => class.guard_name(),
        }
    }

    /// Relative path of the header declaring this type.
    pub fn header_path(&self) -> String {
        match self {
            MetaClass::Primitive { kind, .. } => format!(
                "{}/types/{}.h",
                PROXY_PACKAGE.join("/"),
                kind.simple_name()
            ),
            MetaClass::Array(element) => element.header_path(),
            MetaClass::Class(class) => class.header_path(),
        }
    }

    /// Relative path of the class file defining this type. Arrays use their innermost element;
    /// primitives have no class file.
    pub fn class_file_path(&self) -> Option<String> {
        match self.innermost_element() {
            MetaClass::Class(class) => Some(class.class_file_path()),
            _ => None,
        }
    }
}

impl fmt::Display for MetaClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetaClass::Primitive { .. } => f.write_str(&self.fully_qualified_name(".")),
            MetaClass::Array(element) => write!(f, "{}[]", element),
            MetaClass::Class(class) => f.write_str(&class.fully_qualified_true_name(".")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClassMetaClass {
    name: String,
    package: ClassPackage,
}

impl ClassMetaClass {
    pub fn new(name: impl Into<String>, package: ClassPackage) -> Self {
        Self {
            name: name.into(),
            package,
        }
    }

    /// The name as usable from native code.
    pub fn simple_name(&self) -> String {
        adjust_keyword(&self.name)
    }

    /// The name as written in the class file.
    pub fn true_name(&self) -> &str {
        &self.name
    }

    pub fn package(&self) -> &ClassPackage {
        &self.package
    }

    pub fn is_proxy(&self) -> bool {
        self.package.is_proxied()
    }

    pub fn fully_qualified_name(&self, separator: &str) -> String {
        self.package.to_name(separator, true) + &self.simple_name()
    }

    pub fn fully_qualified_true_name(&self, separator: &str) -> String {
        self.package.to_name(separator, true) + &self.name
    }

    pub fn proxy(&self) -> Result<ClassMetaClass> {
        if self.is_proxy() {
            return Err(MetaClassError::IllegalProjectionState(format!(
                "{} is already a proxy",
                self.fully_qualified_name(".")
            )));
        }

        Ok(Self::new(
            self.name.clone(),
            self.package.prepend(PROXY_PACKAGE),
        ))
    }

    pub fn un_proxy(&self) -> Result<ClassMetaClass> {
        let package = self.package.strip_root(PROXY_PACKAGE).ok_or_else(|| {
            MetaClassError::IllegalProjectionState(format!(
                "{} is not a proxy",
                self.fully_qualified_name(".")
            ))
        })?;

        Ok(Self::new(self.name.clone(), package))
    }

    /// Moves the class under the peer namespace.
    pub fn to_peer(&self) -> ClassMetaClass {
        Self::new(self.name.clone(), self.package.prepend(PEER_PACKAGE))
    }

    pub fn jni_type(&self) -> &'static str {
        match self.fully_qualified_true_name(".").as_str() {
            "java.lang.Class" => "jclass",
            "java.lang.String" => "jstring",
            "java.lang.Throwable" => "jthrowable",
            _ => "jobject",
        }
    }

    pub fn guard_name(&self) -> String {
        format!(
            "{}{}_H",
            self.package.to_name("_", true).to_uppercase(),
            self.simple_name().to_uppercase()
        )
    }

    pub fn header_path(&self) -> String {
        format!(
            "{}{}.h",
            self.package.to_name("/", true),
            self.name.replace('$', "_")
        )
    }

    pub fn class_file_path(&self) -> String {
        format!("{}{}.class", self.package.to_name("/", true), self.name)
    }
}


#[cfg(test)]
mod jni_type_tests {
    use super::*;

    fn jni_type(descriptor: &str) -> &'static str {
        MetaClass::resolve(&TypeName::from_descriptor(descriptor).unwrap())
            .unwrap()
            .jni_type()
    }

    #[test]
    fn it_should_map_primitive_arrays() {
        assert_eq!("jbooleanArray", jni_type("[Z"));
        assert_eq!("jlongArray", jni_type("[J"));
        assert_eq!("jshortArray", jni_type("[S"));
    }

    #[test]
    fn it_should_map_other_arrays_to_object_arrays() {
        assert_eq!("jobjectArray", jni_type("[I"));
        assert_eq!("jobjectArray", jni_type("[[B"));
        assert_eq!("jobjectArray", jni_type("[Ljava/lang/String;"));
    }

    #[test]
    fn it_should_map_well_known_classes() {
        assert_eq!("jclass", jni_type("Ljava/lang/Class;"));
        assert_eq!("jstring", jni_type("Ljava/lang/String;"));
        assert_eq!("jthrowable", jni_type("Ljava/lang/Throwable;"));
        assert_eq!("jobject", jni_type("Ljava/lang/Exception;"));
        assert_eq!("jint", jni_type("I"));
    }
}
