use std::io::{Cursor, Read};

use byteorder::{BigEndian, ReadBytesExt};

use crate::{
    access_flags::{ClassAccessFlags, FieldAccessFlags, MethodAccessFlags},
    attributes::{
        self, Attribute, Attributes, CodeAttribute, ExceptionTableEntry, ExceptionsAttribute,
        InnerClass, InnerClassesAttribute, LocalVariable, LocalVariableTableAttribute,
        UnknownAttribute,
    },
    class_file::{ClassFile, MAGIC},
    constant_pool::{
        ClassInfo, Constant, ConstantPool, DynamicInfo, MethodHandleInfo, MethodTypeInfo,
        NameAndTypeInfo, RefInfo, Utf8Info,
    },
    members::{ClassField, ClassMethod},
    ClassFileError, Result,
};

type Endian = BigEndian;

/// Reads a class file from a byte stream.
///
/// Every field is read with its own small read, so slow readers should be wrapped in a
/// `BufReader` first. [`ClassFile::parse`] does this.
pub struct Parser<R> {
    r: R,
}

impl<R: Read> Parser<R> {
    pub fn new(r: R) -> Self {
        Self { r }
    }

    pub fn parse(&mut self) -> Result<ClassFile> {
        self.parse_magic_identifier()?;
        let (major_version, minor_version) = self.parse_version()?;

        let constant_pool = self.parse_constant_pool()?;
        let access_flags = ClassAccessFlags::from_bits_retain(self.read_u16()?);
        let this_class = self.read_u16()?;
        let super_class = self.read_u16()?;
        let interfaces = self.read_u16s()?;

        let fields_count = self.read_u16()?;
        let fields = (0..fields_count)
            .map(|_| self.parse_field(&constant_pool))
            .collect::<Result<Vec<_>>>()?;

        let methods_count = self.read_u16()?;
        let methods = (0..methods_count)
            .map(|_| self.parse_method(&constant_pool))
            .collect::<Result<Vec<_>>>()?;

        let attributes = self.parse_attributes(&constant_pool)?;

        let class_file = ClassFile {
            minor_version,
            major_version,
            constant_pool,
            access_flags,
            this_class,
            super_class,
            interfaces,
            fields,
            methods,
            attributes,
        };

        // A dangling class reference fails the parse rather than a later accessor
        let class_name = class_file.class_name()?;
        let super_class_name = class_file.super_class_name()?;
        let interfaces = class_file.interfaces()?;
        log::debug!(
            "Parsed {} version {}.{}: super class {}, {} interfaces, {} fields, {} methods",
            class_name,
            major_version,
            minor_version,
            super_class_name.map_or_else(|| "none".to_owned(), |name| name.to_string()),
            interfaces.len(),
            fields_count,
            methods_count,
        );

        Ok(class_file)
    }

    fn parse_field(&mut self, constant_pool: &ConstantPool) -> Result<ClassField> {
        let access_flags = FieldAccessFlags::from_bits_retain(self.read_u16()?);
        let name_index = self.read_u16()?;
        let descriptor_index = self.read_u16()?;
        let attributes = self.parse_attributes(constant_pool)?;

        Ok(ClassField::new(
            access_flags,
            name_index,
            descriptor_index,
            attributes,
        ))
    }

    fn parse_method(&mut self, constant_pool: &ConstantPool) -> Result<ClassMethod> {
        let access_flags = MethodAccessFlags::from_bits_retain(self.read_u16()?);
        let name_index = self.read_u16()?;
        let descriptor_index = self.read_u16()?;
        let attributes = self.parse_attributes(constant_pool)?;

        ClassMethod::new(
            access_flags,
            name_index,
            descriptor_index,
            attributes,
            constant_pool,
        )
    }

    fn parse_magic_identifier(&mut self) -> Result<()> {
        match self.read_u32()? {
            MAGIC => Ok(()),
            magic_identifier => Err(ClassFileError::BadMagic(magic_identifier)),
        }
    }

    fn parse_version(&mut self) -> Result<(u16, u16)> {
        let minor = self.read_u16()?;
        let major = self.read_u16()?;
        Ok((major, minor))
    }

    fn parse_constant_pool(&mut self) -> Result<ConstantPool> {
        let constant_pool_count = self.read_u16()?;
        let width = usize::from(constant_pool_count.saturating_sub(1));

        let mut constant_pool = ConstantPool::new();
        while constant_pool.width() < width {
            let constant = self.parse_constant()?;
            log::trace!("#{} = {:?}", constant_pool.width() + 1, constant);
            constant_pool.add_constant(constant)?;
        }

        // A wide entry can't straddle the declared end.
        if constant_pool.width() != width {
            return Err(ClassFileError::ConstantPoolCountMismatch {
                declared: width,
                actual: constant_pool.width(),
            });
        }

        log::debug!(
            "Read {} constants spanning {} indices",
            constant_pool.len(),
            constant_pool.width()
        );
        Ok(constant_pool)
    }

    fn parse_constant(&mut self) -> Result<Constant> {
        let tag = self.read_u8()?;
        let constant = match tag {
            1 => self.parse_utf8()?,
            3 => Constant::Integer(self.read_i32()?),
            4 => Constant::Float(self.read_i32()?),
            5 => Constant::Long {
                high: self.read_i32()?,
                low: self.read_i32()?,
            },
            6 => Constant::Double {
                high: self.read_i32()?,
                low: self.read_i32()?,
            },
            7 => Constant::Class(ClassInfo {
                name_index: self.read_u16()?,
            }),
            8 => Constant::String {
                string_index: self.read_u16()?,
            },
            9 => Constant::FieldRef(self.parse_ref_info()?),
            10 => Constant::MethodRef(self.parse_ref_info()?),
            11 => Constant::InterfaceMethodRef(self.parse_ref_info()?),
            12 => Constant::NameAndType(self.parse_name_and_type_info()?),
            15 => Constant::MethodHandle(self.parse_method_handle()?),
            16 => Constant::MethodType(MethodTypeInfo {
                descriptor_index: self.read_u16()?,
            }),
            17 => Constant::Dynamic(self.parse_dynamic_info()?),
            18 => Constant::InvokeDynamic(self.parse_dynamic_info()?),
            19 => Constant::Module {
                name_index: self.read_u16()?,
            },
            20 => Constant::Package {
                name_index: self.read_u16()?,
            },
            _ => return Err(ClassFileError::UnknownConstantTag(tag)),
        };

        Ok(constant)
    }

    fn parse_utf8(&mut self) -> Result<Constant> {
        let length = self.read_u16()?;
        let bytes = self.read_bytes(usize::from(length))?;

        Ok(Constant::Utf8(Utf8Info::new(bytes)))
    }

    fn parse_name_and_type_info(&mut self) -> Result<NameAndTypeInfo> {
        let name_index = self.read_u16()?;
        let descriptor_index = self.read_u16()?;

        Ok(NameAndTypeInfo {
            name_index,
            descriptor_index,
        })
    }

    fn parse_method_handle(&mut self) -> Result<MethodHandleInfo> {
        let reference_kind = self.read_u8()?;
        let reference_index = self.read_u16()?;

        Ok(MethodHandleInfo {
            reference_kind,
            reference_index,
        })
    }

    fn parse_dynamic_info(&mut self) -> Result<DynamicInfo> {
        let bootstrap_method_attr_index = self.read_u16()?;
        let name_and_type_index = self.read_u16()?;

        Ok(DynamicInfo {
            bootstrap_method_attr_index,
            name_and_type_index,
        })
    }

    fn parse_ref_info(&mut self) -> Result<RefInfo> {
        let class_index = self.read_u16()?;
        let name_and_type_index = self.read_u16()?;

        Ok(RefInfo {
            class_index,
            name_and_type_index,
        })
    }

    /// Reads an attribute count followed by that many attributes.
    pub(crate) fn parse_attributes(&mut self, constant_pool: &ConstantPool) -> Result<Attributes> {
        let attributes_count = self.read_u16()?;

        (0..attributes_count)
            .map(|_| self.parse_attribute(constant_pool))
            .collect::<Result<Vec<_>>>()
            .map(Attributes)
    }

    fn parse_attribute(&mut self, constant_pool: &ConstantPool) -> Result<Attribute> {
        let name_index = self.read_u16()?;
        let length = self.read_u32()?;
        let info = self.read_bytes(length as usize)?;

        let name = constant_pool.utf8(name_index)?;
        let Some(read) = attributes::attribute_reader(&name) else {
            log::trace!("Keeping {} bytes of the {} attribute", length, name);
            return Ok(Attribute::Unknown(UnknownAttribute { name_index, info }));
        };

        let mut payload = Parser::new(Cursor::new(info.as_slice()));
        let attribute = read(&mut payload, name_index, constant_pool)?;

        let actual = payload.position();
        if actual != u64::from(length) {
            return Err(ClassFileError::AttributeLengthMismatch {
                name: name.into_owned(),
                declared: length,
                actual,
            });
        }

        Ok(attribute)
    }

    pub(crate) fn parse_code_attribute(
        &mut self,
        name_index: u16,
        constant_pool: &ConstantPool,
    ) -> Result<CodeAttribute> {
        let max_stack = self.read_u16()?;
        let max_locals = self.read_u16()?;
        let code_length = self.read_u32()?;
        let code = self.read_bytes(code_length as usize)?;
        let exception_table_length = self.read_u16()?;
        let exception_table = (0..exception_table_length)
            .map(|_| self.parse_exception_table_entry())
            .collect::<Result<Vec<_>>>()?;
        let attributes = self.parse_attributes(constant_pool)?;

        Ok(CodeAttribute {
            name_index,
            max_stack,
            max_locals,
            code,
            exception_table,
            attributes,
        })
    }

    fn parse_exception_table_entry(&mut self) -> Result<ExceptionTableEntry> {
        let start_pc = self.read_u16()?;
        let end_pc = self.read_u16()?;
        let handler_pc = self.read_u16()?;
        let catch_type = self.read_u16()?;

        Ok(ExceptionTableEntry {
            start_pc,
            end_pc,
            handler_pc,
            catch_type,
        })
    }

    pub(crate) fn parse_exceptions_attribute(
        &mut self,
        name_index: u16,
    ) -> Result<ExceptionsAttribute> {
        Ok(ExceptionsAttribute {
            name_index,
            exception_index_table: self.read_u16s()?,
        })
    }

    pub(crate) fn parse_inner_classes_attribute(
        &mut self,
        name_index: u16,
    ) -> Result<InnerClassesAttribute> {
        let number_of_classes = self.read_u16()?;
        let classes = (0..number_of_classes)
            .map(|_| {
                Ok(InnerClass {
                    inner_class_info_index: self.read_u16()?,
                    outer_class_info_index: self.read_u16()?,
                    inner_name_index: self.read_u16()?,
                    inner_class_access_flags: ClassAccessFlags::from_bits_retain(
                        self.read_u16()?,
                    ),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(InnerClassesAttribute {
            name_index,
            classes,
        })
    }

    pub(crate) fn parse_local_variable_table_attribute(
        &mut self,
        name_index: u16,
    ) -> Result<LocalVariableTableAttribute> {
        let local_variable_table_length = self.read_u16()?;
        let variables = (0..local_variable_table_length)
            .map(|_| {
                Ok(LocalVariable {
                    start_pc: self.read_u16()?,
                    length: self.read_u16()?,
                    name_index: self.read_u16()?,
                    descriptor_index: self.read_u16()?,
                    index: self.read_u16()?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(LocalVariableTableAttribute {
            name_index,
            variables,
        })
    }

    /// Reads a u16 count followed by that many u16 values.
    pub(crate) fn read_u16s(&mut self) -> Result<Vec<u16>> {
        let count = self.read_u16()?;
        let mut values = vec![0u16; usize::from(count)];
        self.r.read_u16_into::<Endian>(&mut values)?;

        Ok(values)
    }

    // Only allocates what the input actually holds, however large the declared length.
    pub(crate) fn read_bytes(&mut self, length: usize) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        (&mut self.r).take(length as u64).read_to_end(&mut bytes)?;
        if bytes.len() != length {
            return Err(ClassFileError::TruncatedInput);
        }

        Ok(bytes)
    }

    pub(crate) fn read_u32(&mut self) -> Result<u32> {
        Ok(self.r.read_u32::<Endian>()?)
    }

    pub(crate) fn read_u16(&mut self) -> Result<u16> {
        Ok(self.r.read_u16::<Endian>()?)
    }

    pub(crate) fn read_u8(&mut self) -> Result<u8> {
        Ok(self.r.read_u8()?)
    }

    pub(crate) fn read_i32(&mut self) -> Result<i32> {
        Ok(self.r.read_i32::<Endian>()?)
    }
}

impl Parser<Cursor<&[u8]>> {
    fn position(&self) -> u64 {
        self.r.position()
    }
}
