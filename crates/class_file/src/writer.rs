use std::io::Write;

use byteorder::{BigEndian, WriteBytesExt};

use crate::{
    attributes::{Attribute, Attributes, CodeAttribute},
    class_file::{ClassFile, MAGIC},
    constant_pool::{Constant, ConstantPool},
    members::{ClassField, ClassMethod},
    ClassFileError, Result,
};

type Endian = BigEndian;

/// Writes a class file to a byte stream, field for field in the order [`crate::Parser`] reads
/// them. Counts and lengths are computed from the model, never taken from what was parsed.
pub struct Writer<W> {
    w: W,
}

impl<W: Write> Writer<W> {
    pub fn new(w: W) -> Self {
        Self { w }
    }

    pub fn into_inner(self) -> W {
        self.w
    }

    pub fn write(&mut self, class_file: &ClassFile) -> Result<()> {
        self.write_u32(MAGIC)?;
        self.write_u16(class_file.minor_version)?;
        self.write_u16(class_file.major_version)?;

        self.write_constant_pool(&class_file.constant_pool)?;
        self.write_u16(class_file.access_flags.bits())?;
        self.write_u16(class_file.this_class)?;
        self.write_u16(class_file.super_class)?;
        self.write_u16s(&class_file.interfaces, "interface count")?;

        self.write_count(class_file.fields.len(), "field count")?;
        for field in &class_file.fields {
            self.write_field(field)?;
        }

        self.write_count(class_file.methods.len(), "method count")?;
        for method in &class_file.methods {
            self.write_method(method)?;
        }

        self.write_attributes(&class_file.attributes)?;
        Ok(self.w.flush()?)
    }

    fn write_field(&mut self, field: &ClassField) -> Result<()> {
        self.write_u16(field.access_flags().bits())?;
        self.write_u16(field.name_index())?;
        self.write_u16(field.descriptor_index())?;
        self.write_attributes(field.attributes())
    }

    fn write_method(&mut self, method: &ClassMethod) -> Result<()> {
        self.write_u16(method.access_flags().bits())?;
        self.write_u16(method.name_index())?;
        self.write_u16(method.descriptor_index())?;
        self.write_attributes(method.attributes())
    }

    fn write_constant_pool(&mut self, constant_pool: &ConstantPool) -> Result<()> {
        self.write_count(constant_pool.width() + 1, "constant pool count")?;
        for constant in constant_pool {
            self.write_constant(constant)?;
        }

        Ok(())
    }

    fn write_constant(&mut self, constant: &Constant) -> Result<()> {
        self.write_u8(constant.tag())?;
        match constant {
            Constant::Utf8(info) => {
                self.write_count(info.bytes().len(), "Utf8 constant length")?;
                self.w.write_all(info.bytes())?;
            }
            Constant::Integer(value) | Constant::Float(value) => self.write_i32(*value)?,
            Constant::Long { high, low } | Constant::Double { high, low } => {
                self.write_i32(*high)?;
                self.write_i32(*low)?;
            }
            Constant::Class(info) => self.write_u16(info.name_index)?,
            Constant::String { string_index } => self.write_u16(*string_index)?,
            Constant::FieldRef(info)
            | Constant::MethodRef(info)
            | Constant::InterfaceMethodRef(info) => {
                self.write_u16(info.class_index)?;
                self.write_u16(info.name_and_type_index)?;
            }
            Constant::NameAndType(info) => {
                self.write_u16(info.name_index)?;
                self.write_u16(info.descriptor_index)?;
            }
            Constant::MethodHandle(info) => {
                self.write_u8(info.reference_kind)?;
                self.write_u16(info.reference_index)?;
            }
            Constant::MethodType(info) => self.write_u16(info.descriptor_index)?,
            Constant::Dynamic(info) | Constant::InvokeDynamic(info) => {
                self.write_u16(info.bootstrap_method_attr_index)?;
                self.write_u16(info.name_and_type_index)?;
            }
            Constant::Module { name_index } | Constant::Package { name_index } => {
                self.write_u16(*name_index)?
            }
        }

        Ok(())
    }

    fn write_attributes(&mut self, attributes: &Attributes) -> Result<()> {
        self.write_count(attributes.len(), "attribute count")?;
        for attribute in attributes {
            self.write_attribute(attribute)?;
        }

        Ok(())
    }

    fn write_attribute(&mut self, attribute: &Attribute) -> Result<()> {
        let mut payload = Writer::new(Vec::new());
        payload.write_attribute_payload(attribute)?;
        let info = payload.into_inner();

        let length = u32::try_from(info.len()).map_err(|_| ClassFileError::TooLarge {
            what: "attribute length",
            count: info.len(),
        })?;

        self.write_u16(attribute.name_index())?;
        self.write_u32(length)?;
        Ok(self.w.write_all(&info)?)
    }

    fn write_attribute_payload(&mut self, attribute: &Attribute) -> Result<()> {
        match attribute {
            Attribute::Code(code) => self.write_code_attribute(code)?,
            Attribute::ConstantValue(a) => self.write_u16(a.value_index)?,
            Attribute::Deprecated(_) | Attribute::Synthetic(_) => {}
            Attribute::Exceptions(a) => {
                self.write_u16s(&a.exception_index_table, "exception count")?
            }
            Attribute::InnerClasses(a) => {
                self.write_count(a.classes.len(), "inner class count")?;
                for class in &a.classes {
                    self.write_u16(class.inner_class_info_index)?;
                    self.write_u16(class.outer_class_info_index)?;
                    self.write_u16(class.inner_name_index)?;
                    self.write_u16(class.inner_class_access_flags.bits())?;
                }
            }
            Attribute::LocalVariableTable(a) => {
                self.write_count(a.variables.len(), "local variable count")?;
                for variable in &a.variables {
                    self.write_u16(variable.start_pc)?;
                    self.write_u16(variable.length)?;
                    self.write_u16(variable.name_index)?;
                    self.write_u16(variable.descriptor_index)?;
                    self.write_u16(variable.index)?;
                }
            }
            Attribute::Signature(a) => self.write_u16(a.signature_index)?,
            Attribute::Unknown(a) => self.w.write_all(&a.info)?,
        }

        Ok(())
    }

    fn write_code_attribute(&mut self, code: &CodeAttribute) -> Result<()> {
        self.write_u16(code.max_stack)?;
        self.write_u16(code.max_locals)?;

        let code_length = u32::try_from(code.code.len()).map_err(|_| ClassFileError::TooLarge {
            what: "code length",
            count: code.code.len(),
        })?;
        self.write_u32(code_length)?;
        self.w.write_all(&code.code)?;

        self.write_count(code.exception_table.len(), "exception table length")?;
        for entry in &code.exception_table {
            self.write_u16(entry.start_pc)?;
            self.write_u16(entry.end_pc)?;
            self.write_u16(entry.handler_pc)?;
            self.write_u16(entry.catch_type)?;
        }

        self.write_attributes(&code.attributes)
    }

    /// Writes a u16 count followed by the values.
    fn write_u16s(&mut self, values: &[u16], what: &'static str) -> Result<()> {
        self.write_count(values.len(), what)?;
        for value in values {
            self.write_u16(*value)?;
        }

        Ok(())
    }

    fn write_count(&mut self, count: usize, what: &'static str) -> Result<()> {
        let count = u16::try_from(count).map_err(|_| ClassFileError::TooLarge { what, count })?;
        self.write_u16(count)
    }

    fn write_u32(&mut self, value: u32) -> Result<()> {
        Ok(self.w.write_u32::<Endian>(value)?)
    }

    fn write_u16(&mut self, value: u16) -> Result<()> {
        Ok(self.w.write_u16::<Endian>(value)?)
    }

    fn write_u8(&mut self, value: u8) -> Result<()> {
        Ok(self.w.write_u8(value)?)
    }

    fn write_i32(&mut self, value: i32) -> Result<()> {
        Ok(self.w.write_i32::<Endian>(value)?)
    }
}
