use std::{
    fmt,
    hash::{Hash, Hasher},
};

use crate::{MetaClassError, PrimitiveKind, Result};

/// A type name in one of its three spellings.
///
/// - identifier: `java.lang.String`, `int`, `[java.lang.String`
/// - path: `java/lang/String`, `[Ljava/lang/String;` (the internal name of an array class)
/// - descriptor: `Ljava/lang/String;`, `I`, `[[Ljava/lang/String;`
///
/// Only the spelling the value was built from is stored. The other spellings are derived when
/// asked for. Two names are equal when their identifier spellings are equal, whichever
/// constructor built them.
#[derive(Debug, Clone)]
pub struct TypeName {
    spelling: Spelling,
}

#[derive(Debug, Clone)]
enum Spelling {
    Identifier(String),
    Path(String),
    Descriptor(String),
}

enum Element<'a> {
    Primitive(PrimitiveKind),
    Object(&'a str),
}

impl TypeName {
    pub fn from_identifier(name: impl Into<String>) -> Self {
        Self {
            spelling: Spelling::Identifier(name.into()),
        }
    }

    pub fn from_path(path: impl Into<String>) -> Self {
        Self {
            spelling: Spelling::Path(path.into()),
        }
    }

    /// Fails with [`MetaClassError::MalformedDescriptor`] unless `descriptor` is a valid field
    /// descriptor (or `V`).
    pub fn from_descriptor(descriptor: impl Into<String>) -> Result<Self> {
        let descriptor = descriptor.into();
        decode_descriptor(&descriptor)?;

        Ok(Self {
            spelling: Spelling::Descriptor(descriptor),
        })
    }

    pub fn as_identifier(&self) -> String {
        match &self.spelling {
            Spelling::Identifier(name) => name.clone(),
            Spelling::Path(path) if path.starts_with('[') => descriptor_to_identifier(path),
            Spelling::Path(path) => path.replace('/', "."),
            Spelling::Descriptor(descriptor) => descriptor_to_identifier(descriptor),
        }
    }

    pub fn as_descriptor(&self) -> String {
        match &self.spelling {
            Spelling::Identifier(name) => name_to_descriptor(name, '.'),
            Spelling::Path(path) if path.starts_with('[') => path.clone(),
            Spelling::Path(path) => name_to_descriptor(path, '/'),
            Spelling::Descriptor(descriptor) => descriptor.clone(),
        }
    }

    /// An identifier can't be turned into a path: `a.b.C.D` may name the class `D` nested in
    /// `a.b.C` or the class `D` in package `a.b.C`.
    pub fn as_path(&self) -> Result<String> {
        match &self.spelling {
            Spelling::Identifier(name) => Err(MetaClassError::UnsupportedConversion(format!(
                "there is no reliable way to convert the identifier {} to a path",
                name
            ))),
            Spelling::Path(path) => Ok(path.clone()),
            Spelling::Descriptor(descriptor) => match decode_descriptor(descriptor)? {
                (0, Element::Primitive(_)) => Err(MetaClassError::UnsupportedConversion(
                    format!("primitives cannot be converted to a path: {}", descriptor),
                )),
                (0, Element::Object(path)) => Ok(path.to_owned()),
                // The internal name of an array class is its descriptor
                _ => Ok(descriptor.clone()),
            },
        }
    }

    pub fn components(&self) -> Result<Vec<String>> {
        let components = match &self.spelling {
            Spelling::Identifier(name) => name.split('.').map(str::to_owned).collect(),
            Spelling::Path(path) => path.split('/').map(str::to_owned).collect(),
            Spelling::Descriptor(_) => self.as_path()?.split('/').map(str::to_owned).collect(),
        };

        Ok(components)
    }

    pub fn array_dimensions(&self) -> usize {
        let text = match &self.spelling {
            Spelling::Identifier(s) | Spelling::Path(s) | Spelling::Descriptor(s) => s,
        };
        split_array(text).0
    }
}

impl PartialEq for TypeName {
    fn eq(&self, other: &Self) -> bool {
        self.as_identifier() == other.as_identifier()
    }
}
impl Eq for TypeName {}

impl Hash for TypeName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_identifier().hash(state);
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.spelling {
            Spelling::Identifier(s) | Spelling::Path(s) | Spelling::Descriptor(s) => f.write_str(s),
        }
    }
}

fn split_array(name: &str) -> (usize, &str) {
    let rest = name.trim_start_matches('[');
    (name.len() - rest.len(), rest)
}

fn decode_descriptor(descriptor: &str) -> Result<(usize, Element<'_>)> {
    let malformed = || MetaClassError::MalformedDescriptor(descriptor.to_owned());

    let (dimensions, rest) = split_array(descriptor);
    if let Some(kind) = PrimitiveKind::from_descriptor(rest) {
        // There is no such thing as an array of void
        if kind == PrimitiveKind::Void && dimensions > 0 {
            return Err(malformed());
        }
        return Ok((dimensions, Element::Primitive(kind)));
    }

    let path = rest
        .strip_prefix('L')
        .and_then(|s| s.strip_suffix(';'))
        .ok_or_else(malformed)?;
    if path.is_empty() || path.contains(';') {
        return Err(malformed());
    }

    Ok((dimensions, Element::Object(path)))
}

// Also used on unvalidated array paths, so it never fails.
fn descriptor_to_identifier(descriptor: &str) -> String {
    let (dimensions, rest) = split_array(descriptor);
    let element = match decode_descriptor(rest) {
        Ok((_, Element::Primitive(kind))) => kind.java_name().to_owned(),
        Ok((_, Element::Object(path))) => path.replace('/', "."),
        Err(_) => rest.replace('/', "."),
    };

    format!("{}{}", &descriptor[..dimensions], element)
}

fn name_to_descriptor(name: &str, separator: char) -> String {
    let (dimensions, rest) = split_array(name);
    let array = &name[..dimensions];

    match PrimitiveKind::from_java_name(rest) {
        Some(kind) => format!("{}{}", array, kind.descriptor_char()),
        None => format!("{}L{};", array, rest.replace(separator, "/")),
    }
}
