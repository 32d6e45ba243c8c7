use std::{borrow::Cow, fmt, io::Cursor};

use crate::{
    access_flags::ClassAccessFlags, constant_pool::ConstantPool, parser::Parser, ClassFileError,
    Result,
};

pub const CODE: &str = "Code";
pub const CONSTANT_VALUE: &str = "ConstantValue";
pub const DEPRECATED: &str = "Deprecated";
pub const EXCEPTIONS: &str = "Exceptions";
pub const INNER_CLASSES: &str = "InnerClasses";
pub const LOCAL_VARIABLE_TABLE: &str = "LocalVariableTable";
pub const SIGNATURE: &str = "Signature";
pub const SYNTHETIC: &str = "Synthetic";

pub(crate) type AttributeReader =
    fn(&mut Parser<Cursor<&[u8]>>, u16, &ConstantPool) -> Result<Attribute>;

/// Readers for the attributes that are decoded. Any other name is kept as an
/// [`UnknownAttribute`].
static ATTRIBUTE_READERS: [(&str, AttributeReader); 8] = [
    (CODE, read_code),
    (CONSTANT_VALUE, read_constant_value),
    (DEPRECATED, read_deprecated),
    (EXCEPTIONS, read_exceptions),
    (INNER_CLASSES, read_inner_classes),
    (LOCAL_VARIABLE_TABLE, read_local_variable_table),
    (SIGNATURE, read_signature),
    (SYNTHETIC, read_synthetic),
];

pub(crate) fn attribute_reader(name: &str) -> Option<AttributeReader> {
    ATTRIBUTE_READERS
        .iter()
        .find(|(reader_name, _)| *reader_name == name)
        .map(|&(_, reader)| reader)
}

fn expect_name(
    constant_pool: &ConstantPool,
    name_index: u16,
    expected: &'static str,
) -> Result<()> {
    let found = constant_pool.utf8(name_index)?;
    if found != expected {
        return Err(ClassFileError::AttributeNameMismatch {
            expected,
            found: found.into_owned(),
        });
    }

    Ok(())
}

fn read_code(
    parser: &mut Parser<Cursor<&[u8]>>,
    name_index: u16,
    constant_pool: &ConstantPool,
) -> Result<Attribute> {
    expect_name(constant_pool, name_index, CODE)?;

    Ok(Attribute::Code(parser.parse_code_attribute(name_index, constant_pool)?))
}

fn read_constant_value(
    parser: &mut Parser<Cursor<&[u8]>>,
    name_index: u16,
    constant_pool: &ConstantPool,
) -> Result<Attribute> {
    expect_name(constant_pool, name_index, CONSTANT_VALUE)?;

    Ok(Attribute::ConstantValue(ConstantValueAttribute {
        name_index,
        value_index: parser.read_u16()?,
    }))
}

fn read_deprecated(
    _: &mut Parser<Cursor<&[u8]>>,
    name_index: u16,
    constant_pool: &ConstantPool,
) -> Result<Attribute> {
    expect_name(constant_pool, name_index, DEPRECATED)?;

    Ok(Attribute::Deprecated(DeprecatedAttribute { name_index }))
}

fn read_exceptions(
    parser: &mut Parser<Cursor<&[u8]>>,
    name_index: u16,
    constant_pool: &ConstantPool,
) -> Result<Attribute> {
    expect_name(constant_pool, name_index, EXCEPTIONS)?;

    Ok(Attribute::Exceptions(
        parser.parse_exceptions_attribute(name_index)?,
    ))
}

fn read_inner_classes(
    parser: &mut Parser<Cursor<&[u8]>>,
    name_index: u16,
    constant_pool: &ConstantPool,
) -> Result<Attribute> {
    expect_name(constant_pool, name_index, INNER_CLASSES)?;

    Ok(Attribute::InnerClasses(
        parser.parse_inner_classes_attribute(name_index)?,
    ))
}

fn read_local_variable_table(
    parser: &mut Parser<Cursor<&[u8]>>,
    name_index: u16,
    constant_pool: &ConstantPool,
) -> Result<Attribute> {
    expect_name(constant_pool, name_index, LOCAL_VARIABLE_TABLE)?;

    Ok(Attribute::LocalVariableTable(
        parser.parse_local_variable_table_attribute(name_index)?,
    ))
}

fn read_signature(
    parser: &mut Parser<Cursor<&[u8]>>,
    name_index: u16,
    constant_pool: &ConstantPool,
) -> Result<Attribute> {
    expect_name(constant_pool, name_index, SIGNATURE)?;

    Ok(Attribute::Signature(SignatureAttribute {
        name_index,
        signature_index: parser.read_u16()?,
    }))
}

fn read_synthetic(
    _: &mut Parser<Cursor<&[u8]>>,
    name_index: u16,
    constant_pool: &ConstantPool,
) -> Result<Attribute> {
    expect_name(constant_pool, name_index, SYNTHETIC)?;

    Ok(Attribute::Synthetic(SyntheticAttribute { name_index }))
}

#[derive(Debug, Clone, PartialEq)]
pub enum Attribute {
    Code(CodeAttribute),
    ConstantValue(ConstantValueAttribute),
    Deprecated(DeprecatedAttribute),
    Exceptions(ExceptionsAttribute),
    InnerClasses(InnerClassesAttribute),
    LocalVariableTable(LocalVariableTableAttribute),
    Signature(SignatureAttribute),
    Synthetic(SyntheticAttribute),
    Unknown(UnknownAttribute),
}

impl Attribute {
    pub fn name_index(&self) -> u16 {
        match self {
            Attribute::Code(a) => a.name_index,
            Attribute::ConstantValue(a) => a.name_index,
            Attribute::Deprecated(a) => a.name_index,
            Attribute::Exceptions(a) => a.name_index,
            Attribute::InnerClasses(a) => a.name_index,
            Attribute::LocalVariableTable(a) => a.name_index,
            Attribute::Signature(a) => a.name_index,
            Attribute::Synthetic(a) => a.name_index,
            Attribute::Unknown(a) => a.name_index,
        }
    }

    pub fn name<'a>(&self, constant_pool: &'a ConstantPool) -> Result<Cow<'a, str>> {
        constant_pool.utf8(self.name_index())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attributes(pub Vec<Attribute>);

impl Attributes {
    pub fn find_by_name(&self, name: &str, constant_pool: &ConstantPool) -> Option<&Attribute> {
        self.0
            .iter()
            .find(|a| matches!(a.name(constant_pool), Ok(n) if n == name))
    }

    pub fn code(&self) -> Option<&CodeAttribute> {
        self.0.iter().find_map(|a| match a {
            Attribute::Code(code) => Some(code),
            _ => None,
        })
    }

    pub fn constant_value(&self) -> Option<&ConstantValueAttribute> {
        self.0.iter().find_map(|a| match a {
            Attribute::ConstantValue(constant_value) => Some(constant_value),
            _ => None,
        })
    }

    pub fn exceptions(&self) -> Option<&ExceptionsAttribute> {
        self.0.iter().find_map(|a| match a {
            Attribute::Exceptions(exceptions) => Some(exceptions),
            _ => None,
        })
    }

    pub fn signature(&self) -> Option<&SignatureAttribute> {
        self.0.iter().find_map(|a| match a {
            Attribute::Signature(signature) => Some(signature),
            _ => None,
        })
    }

    pub fn is_synthetic(&self) -> bool {
        self.0.iter().any(|a| matches!(a, Attribute::Synthetic(_)))
    }

    pub fn is_deprecated(&self) -> bool {
        self.0.iter().any(|a| matches!(a, Attribute::Deprecated(_)))
    }

    pub fn push(&mut self, attribute: Attribute) {
        self.0.push(attribute);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Attribute> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a Attributes {
    type Item = &'a Attribute;
    type IntoIter = std::slice::Iter<'a, Attribute>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExceptionTableEntry {
    pub start_pc: u16,
    pub end_pc: u16,
    pub handler_pc: u16,
    pub catch_type: u16,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CodeAttribute {
    pub name_index: u16,
    pub max_stack: u16,
    pub max_locals: u16,
    pub code: Vec<u8>,
    pub exception_table: Vec<ExceptionTableEntry>,
    pub attributes: Attributes,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConstantValueAttribute {
    pub name_index: u16,
    pub value_index: u16,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeprecatedAttribute {
    pub name_index: u16,
}

impl DeprecatedAttribute {
    pub fn new(constant_pool: &mut ConstantPool) -> Result<Self> {
        Ok(Self {
            name_index: constant_pool.add_utf8(DEPRECATED)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExceptionsAttribute {
    pub name_index: u16,
    /// Indices of the `Class` constants of the thrown types.
    pub exception_index_table: Vec<u16>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InnerClass {
    pub inner_class_info_index: u16,
    pub outer_class_info_index: u16,
    pub inner_name_index: u16,
    pub inner_class_access_flags: ClassAccessFlags,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InnerClassesAttribute {
    pub name_index: u16,
    pub classes: Vec<InnerClass>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LocalVariable {
    pub start_pc: u16,
    pub length: u16,
    pub name_index: u16,
    pub descriptor_index: u16,
    pub index: u16,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LocalVariableTableAttribute {
    pub name_index: u16,
    pub variables: Vec<LocalVariable>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SignatureAttribute {
    pub name_index: u16,
    pub signature_index: u16,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticAttribute {
    pub name_index: u16,
}

impl SyntheticAttribute {
    /// Builds the attribute, adding its name to `constant_pool` if it isn't there yet.
    pub fn new(constant_pool: &mut ConstantPool) -> Result<Self> {
        Ok(Self {
            name_index: constant_pool.add_utf8(SYNTHETIC)?,
        })
    }
}

/// An attribute with no registered reader, kept byte for byte.
#[derive(Clone, PartialEq)]
pub struct UnknownAttribute {
    pub name_index: u16,
    pub info: Vec<u8>,
}

impl fmt::Debug for UnknownAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnknownAttribute")
            .field("name_index", &self.name_index)
            .field("info", &format!("({} bytes)", self.info.len()))
            .finish()
    }
}
