use std::{borrow::Cow, fmt};

use jace_metaclass::TypeName;

use crate::{ClassFileError, Result};

/// Borrows the payload of the constant at `$index`, failing with
/// [`ClassFileError::WrongConstantKind`] unless it is a `Constant::$variant`.
macro_rules! expect_constant {
    ($pool:expr, $index:expr, $variant:ident) => {{
        let index: u16 = $index;
        match $pool.get(index) {
            Some($crate::constant_pool::Constant::$variant(info)) => Ok(info),
            other => Err($crate::constant_pool::wrong_kind(
                index,
                stringify!($variant),
                other,
            )),
        }
    }};
}

pub(crate) fn wrong_kind(
    index: u16,
    expected: &'static str,
    found: Option<&Constant>,
) -> ClassFileError {
    ClassFileError::WrongConstantKind {
        index,
        expected,
        found: found.map_or("nothing", Constant::kind_name),
    }
}

/// The constant pool of a class file, addressed from 1.
///
/// `Long` and `Double` entries take two indices, so the entry behind an index is found by
/// accumulating widths. The second index of such an entry resolves to nothing.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ConstantPool {
    constants: Vec<Constant>,
    // Position in `constants` of the entry at index `i + 1`, `None` for the second half of a
    // double-width entry. Rebuilt only by `add_constant`, so it always agrees with the widths.
    slots: Vec<Option<usize>>,
}

impl ConstantPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of physical entries.
    pub fn len(&self) -> usize {
        self.constants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constants.is_empty()
    }

    /// Number of indices the entries take up, which is one less than `constant_pool_count`.
    pub fn width(&self) -> usize {
        self.slots.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Constant> {
        self.constants.iter()
    }

    /// The entry at `index`, or `None` for index 0, an index past the end or the second half of
    /// a `Long` or `Double`.
    pub fn get(&self, index: u16) -> Option<&Constant> {
        self.constants.get(self.position(index)?)
    }

    fn get_mut(&mut self, index: u16) -> Option<&mut Constant> {
        let position = self.position(index)?;
        self.constants.get_mut(position)
    }

    fn position(&self, index: u16) -> Option<usize> {
        let slot = usize::from(index).checked_sub(1)?;
        self.slots.get(slot).copied().flatten()
    }

    /// Appends `constant` and returns its index.
    pub fn add_constant(&mut self, constant: Constant) -> Result<u16> {
        let index = self.slots.len() + 1;
        let end = index + usize::from(constant.width());
        if end > usize::from(u16::MAX) {
            return Err(ClassFileError::TooLarge {
                what: "constant pool",
                count: end,
            });
        }

        self.slots.push(Some(self.constants.len()));
        if constant.width() == 2 {
            self.slots.push(None);
        }
        self.constants.push(constant);

        Ok(index as u16)
    }

    /// Returns the index of the `Utf8` entry holding `text`, appending one if there is none.
    pub fn add_utf8(&mut self, text: &str) -> Result<u16> {
        let bytes = encode_modified_utf8(text);

        let mut index = 1;
        for constant in &self.constants {
            if let Constant::Utf8(info) = constant {
                if info.bytes == bytes {
                    return Ok(index);
                }
            }
            index += constant.width();
        }

        self.add_constant(Constant::Utf8(Utf8Info { bytes }))
    }

    pub fn utf8(&self, index: u16) -> Result<Cow<'_, str>> {
        expect_constant!(self, index, Utf8).map(Utf8Info::to_text)
    }

    pub fn class_info(&self, index: u16) -> Result<&ClassInfo> {
        expect_constant!(self, index, Class)
    }

    pub fn class_info_mut(&mut self, index: u16) -> Result<&mut ClassInfo> {
        match self.get_mut(index) {
            Some(Constant::Class(info)) => Ok(info),
            other => Err(wrong_kind(index, "Class", other.as_deref())),
        }
    }

    pub fn name_and_type(&self, index: u16) -> Result<&NameAndTypeInfo> {
        expect_constant!(self, index, NameAndType)
    }

    pub fn name_and_type_mut(&mut self, index: u16) -> Result<&mut NameAndTypeInfo> {
        match self.get_mut(index) {
            Some(Constant::NameAndType(info)) => Ok(info),
            other => Err(wrong_kind(index, "NameAndType", other.as_deref())),
        }
    }

    /// The name of the `Class` entry at `index`, in its internal (path) spelling.
    pub fn class_name(&self, index: u16) -> Result<TypeName> {
        let ClassInfo { name_index } = self.class_info(index)?;

        Ok(TypeName::from_path(self.utf8(*name_index)?))
    }
}

impl<'a> IntoIterator for &'a ConstantPool {
    type Item = &'a Constant;
    type IntoIter = std::slice::Iter<'a, Constant>;

    fn into_iter(self) -> Self::IntoIter {
        self.constants.iter()
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Constant {
    Utf8(Utf8Info),
    Integer(i32),
    /// The raw IEEE 754 bits.
    Float(i32),
    Long { high: i32, low: i32 },
    Double { high: i32, low: i32 },
    Class(ClassInfo),
    String { string_index: u16 },
    FieldRef(RefInfo),
    MethodRef(RefInfo),
    InterfaceMethodRef(RefInfo),
    NameAndType(NameAndTypeInfo),
    MethodHandle(MethodHandleInfo),
    MethodType(MethodTypeInfo),
    Dynamic(DynamicInfo),
    InvokeDynamic(DynamicInfo),
    Module { name_index: u16 },
    Package { name_index: u16 },
}

impl Constant {
    pub fn tag(&self) -> u8 {
        match self {
            Constant::Utf8(_) => 1,
            Constant::Integer(_) => 3,
            Constant::Float(_) => 4,
            Constant::Long { .. } => 5,
            Constant::Double { .. } => 6,
            Constant::Class(_) => 7,
            Constant::String { .. } => 8,
            Constant::FieldRef(_) => 9,
            Constant::MethodRef(_) => 10,
            Constant::InterfaceMethodRef(_) => 11,
            Constant::NameAndType(_) => 12,
            Constant::MethodHandle(_) => 15,
            Constant::MethodType(_) => 16,
            Constant::Dynamic(_) => 17,
            Constant::InvokeDynamic(_) => 18,
            Constant::Module { .. } => 19,
            Constant::Package { .. } => 20,
        }
    }

    /// How many pool indices the entry takes up.
    pub fn width(&self) -> u16 {
        match self {
            Constant::Long { .. } | Constant::Double { .. } => 2,
            _ => 1,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Constant::Utf8(_) => "Utf8",
            Constant::Integer(_) => "Integer",
            Constant::Float(_) => "Float",
            Constant::Long { .. } => "Long",
            Constant::Double { .. } => "Double",
            Constant::Class(_) => "Class",
            Constant::String { .. } => "String",
            Constant::FieldRef(_) => "FieldRef",
            Constant::MethodRef(_) => "MethodRef",
            Constant::InterfaceMethodRef(_) => "InterfaceMethodRef",
            Constant::NameAndType(_) => "NameAndType",
            Constant::MethodHandle(_) => "MethodHandle",
            Constant::MethodType(_) => "MethodType",
            Constant::Dynamic(_) => "Dynamic",
            Constant::InvokeDynamic(_) => "InvokeDynamic",
            Constant::Module { .. } => "Module",
            Constant::Package { .. } => "Package",
        }
    }

    /// The literal the constant stands for. `String` and `Class` entries resolve through `pool`
    /// to the text they reference; purely structural entries have no value.
    pub fn value<'a>(&'a self, pool: &'a ConstantPool) -> Result<Option<ConstantValue<'a>>> {
        let value = match self {
            Constant::Utf8(info) => ConstantValue::Text(info.to_text()),
            Constant::String { string_index } => ConstantValue::Text(pool.utf8(*string_index)?),
            Constant::Class(ClassInfo { name_index }) => {
                ConstantValue::Text(pool.utf8(*name_index)?)
            }
            Constant::Integer(value) => ConstantValue::Integer(*value),
            Constant::Float(bits) => ConstantValue::Float(f32::from_bits(*bits as u32)),
            Constant::Long { high, low } => ConstantValue::Long(join_halves(*high, *low)),
            Constant::Double { high, low } => {
                ConstantValue::Double(f64::from_bits(join_halves(*high, *low) as u64))
            }
            _ => return Ok(None),
        };

        Ok(Some(value))
    }
}

fn join_halves(high: i32, low: i32) -> i64 {
    (i64::from(high) << 32) | i64::from(low as u32)
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConstantValue<'a> {
    Text(Cow<'a, str>),
    Integer(i32),
    Float(f32),
    Long(i64),
    Double(f64),
}

impl fmt::Display for ConstantValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstantValue::Text(text) => write!(f, "{:?}", text),
            ConstantValue::Integer(value) => write!(f, "{}", value),
            ConstantValue::Float(value) => write!(f, "{}", value),
            ConstantValue::Long(value) => write!(f, "{}", value),
            ConstantValue::Double(value) => write!(f, "{}", value),
        }
    }
}

/// Text in the class file's modified UTF-8, kept as read so it is written back unchanged.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Utf8Info {
    bytes: Vec<u8>,
}

impl Utf8Info {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn from_text(text: &str) -> Self {
        Self {
            bytes: encode_modified_utf8(text),
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Undecodable sequences become U+FFFD.
    pub fn to_text(&self) -> Cow<'_, str> {
        match std::str::from_utf8(&self.bytes) {
            Ok(text) => Cow::Borrowed(text),
            Err(_) => Cow::Owned(decode_modified_utf8(&self.bytes)),
        }
    }
}

// NUL takes two bytes and characters outside the BMP are written as two three-byte surrogates.
fn encode_modified_utf8(text: &str) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(text.len());
    for unit in text.encode_utf16() {
        match unit {
            0x0001..=0x007F => bytes.push(unit as u8),
            0x0000 | 0x0080..=0x07FF => {
                bytes.push(0xC0 | (unit >> 6) as u8);
                bytes.push(0x80 | (unit & 0x3F) as u8);
            }
            _ => {
                bytes.push(0xE0 | (unit >> 12) as u8);
                bytes.push(0x80 | ((unit >> 6) & 0x3F) as u8);
                bytes.push(0x80 | (unit & 0x3F) as u8);
            }
        }
    }
    bytes
}

fn decode_modified_utf8(bytes: &[u8]) -> String {
    let mut units = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let byte = bytes[i];
        let (unit, length) = match byte {
            0x00..=0x7F => (u16::from(byte), 1),
            0xC0..=0xDF if i + 1 < bytes.len() => (
                (u16::from(byte & 0x1F) << 6) | u16::from(bytes[i + 1] & 0x3F),
                2,
            ),
            0xE0..=0xEF if i + 2 < bytes.len() => (
                (u16::from(byte & 0x0F) << 12)
                    | (u16::from(bytes[i + 1] & 0x3F) << 6)
                    | u16::from(bytes[i + 2] & 0x3F),
                3,
            ),
            _ => (0xFFFD, 1),
        };
        units.push(unit);
        i += length;
    }
    String::from_utf16_lossy(&units)
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct RefInfo {
    pub class_index: u16,
    pub name_and_type_index: u16,
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct ClassInfo {
    pub name_index: u16,
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct NameAndTypeInfo {
    pub name_index: u16,
    pub descriptor_index: u16,
}

/// Shared by `Dynamic` and `InvokeDynamic`.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct DynamicInfo {
    pub bootstrap_method_attr_index: u16,
    pub name_and_type_index: u16,
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct MethodHandleInfo {
    pub reference_kind: u8,
    pub reference_index: u16,
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct MethodTypeInfo {
    pub descriptor_index: u16,
}
