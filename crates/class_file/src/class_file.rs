use std::{
    fmt,
    io::{BufReader, Read, Write},
};

use jace_metaclass::TypeName;

use crate::{
    access_flags::{ClassAccessFlags, FieldAccessFlags, MethodAccessFlags},
    attributes::{Attribute, Attributes, SyntheticAttribute},
    constant_pool::{ClassInfo, Constant, ConstantPool},
    members::{ClassField, ClassMethod},
    parser::Parser,
    writer::Writer,
    Result,
};

pub const MAGIC: u32 = 0xCAFEBABE;

/// The first major version (Java 5) with the synthetic, annotation, enum, bridge and varargs
/// access flags.
pub const JAVA_5_MAJOR_VERSION: u16 = 49;

#[derive(Debug, Clone, PartialEq)]
pub struct ClassFile {
    pub(crate) minor_version: u16,
    pub(crate) major_version: u16,
    pub(crate) constant_pool: ConstantPool,
    pub(crate) access_flags: ClassAccessFlags,
    pub(crate) this_class: u16,
    pub(crate) super_class: u16,
    pub(crate) interfaces: Vec<u16>,
    pub(crate) fields: Vec<ClassField>,
    pub(crate) methods: Vec<ClassMethod>,
    pub(crate) attributes: Attributes,
}

impl ClassFile {
    /// Reads a whole class file. Nothing is returned unless every part of it decodes.
    pub fn parse(bytes: impl Read) -> Result<ClassFile> {
        Parser::new(BufReader::new(bytes)).parse()
    }

    /// Writes the class file. Writing an unchanged parse reproduces its input byte for byte.
    pub fn write(&self, output: impl Write) -> Result<()> {
        Writer::new(output).write(self)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        self.write(&mut bytes)?;
        Ok(bytes)
    }

    pub fn minor_version(&self) -> u16 {
        self.minor_version
    }

    pub fn major_version(&self) -> u16 {
        self.major_version
    }

    /// Changes the format version, rewriting what the target version can't express.
    ///
    /// Going below [`JAVA_5_MAJOR_VERSION`] drops the annotation, enum, bridge and varargs flags
    /// and replaces every synthetic flag with a `Synthetic` attribute on the same class, field or
    /// method. Going the other way rewrites nothing. On error the class is left unchanged.
    pub fn set_version(&mut self, major_version: u16, minor_version: u16) -> Result<()> {
        let was_java_5 = self.major_version >= JAVA_5_MAJOR_VERSION;
        let is_java_5 = major_version >= JAVA_5_MAJOR_VERSION;

        match (was_java_5, is_java_5) {
            (true, false) => self.move_synthetic_flags_to_attributes()?,
            (false, true) => self.keep_synthetic_attributes(major_version, minor_version),
            _ => {}
        }

        self.major_version = major_version;
        self.minor_version = minor_version;
        Ok(())
    }

    fn has_synthetic_flags(&self) -> bool {
        self.access_flags.contains(ClassAccessFlags::SYNTHETIC)
            || self
                .fields
                .iter()
                .any(|field| field.access_flags().contains(FieldAccessFlags::SYNTHETIC))
            || self
                .methods
                .iter()
                .any(|method| method.access_flags().contains(MethodAccessFlags::SYNTHETIC))
    }

    fn move_synthetic_flags_to_attributes(&mut self) -> Result<()> {
        // The attribute name is the only pool entry this can add, so it goes in first.
        let synthetic = if self.has_synthetic_flags() {
            Some(SyntheticAttribute::new(&mut self.constant_pool)?)
        } else {
            None
        };

        self.access_flags.remove(ClassAccessFlags::ANNOTATION | ClassAccessFlags::ENUM);
        let is_synthetic = self.access_flags.contains(ClassAccessFlags::SYNTHETIC);
        self.access_flags.remove(ClassAccessFlags::SYNTHETIC);
        if let (Some(attribute), true) = (&synthetic, is_synthetic) {
            log::trace!("Replacing the synthetic class flag with an attribute");
            self.attributes.push(Attribute::Synthetic(attribute.clone()));
        }

        for field in &mut self.fields {
            let mut access_flags = field.access_flags();
            access_flags.remove(FieldAccessFlags::ENUM);
            let is_synthetic = access_flags.contains(FieldAccessFlags::SYNTHETIC);
            access_flags.remove(FieldAccessFlags::SYNTHETIC);
            field.set_access_flags(access_flags);

            if let (Some(attribute), true) = (&synthetic, is_synthetic) {
                log::trace!(
                    "Replacing the synthetic flag of field {} with an attribute",
                    field.name_index()
                );
                field.add_attribute(Attribute::Synthetic(attribute.clone()));
            }
        }

        for method in &mut self.methods {
            let mut access_flags = method.access_flags();
            access_flags.remove(MethodAccessFlags::BRIDGE | MethodAccessFlags::VARARGS);
            let is_synthetic = access_flags.contains(MethodAccessFlags::SYNTHETIC);
            access_flags.remove(MethodAccessFlags::SYNTHETIC);
            method.set_access_flags(access_flags);

            if let (Some(attribute), true) = (&synthetic, is_synthetic) {
                log::trace!(
                    "Replacing the synthetic flag of method {} with an attribute",
                    method.name_index()
                );
                method.add_attribute(Attribute::Synthetic(attribute.clone()));
            }
        }

        Ok(())
    }

    // TODO: fold `Synthetic` attributes back into the synthetic flag on upgrade.
    fn keep_synthetic_attributes(&self, major_version: u16, minor_version: u16) {
        log::debug!(
            "Upgraded to version {}.{} without converting Synthetic attributes to flags",
            major_version,
            minor_version
        );
    }

    pub fn access_flags(&self) -> ClassAccessFlags {
        self.access_flags
    }

    pub fn set_access_flags(&mut self, access_flags: ClassAccessFlags) {
        self.access_flags = access_flags;
    }

    pub fn constant_pool(&self) -> &ConstantPool {
        &self.constant_pool
    }

    pub fn constant_pool_mut(&mut self) -> &mut ConstantPool {
        &mut self.constant_pool
    }

    pub fn this_class(&self) -> u16 {
        self.this_class
    }

    /// The index of the superclass, 0 when there is none.
    pub fn super_class(&self) -> u16 {
        self.super_class
    }

    pub fn class_name(&self) -> Result<TypeName> {
        self.constant_pool.class_name(self.this_class)
    }

    /// Renames the class by pointing its `Class` constant at the new name.
    pub fn set_class_name(&mut self, name: &TypeName) -> Result<()> {
        let name_index = self.constant_pool.add_utf8(&name.as_path()?)?;
        self.constant_pool.class_info_mut(self.this_class)?.name_index = name_index;

        Ok(())
    }

    /// `None` for `java.lang.Object`, the only class without a superclass.
    pub fn super_class_name(&self) -> Result<Option<TypeName>> {
        if self.super_class == 0 {
            return Ok(None);
        }

        self.constant_pool.class_name(self.super_class).map(Some)
    }

    pub fn set_super_class_name(&mut self, name: Option<&TypeName>) -> Result<()> {
        let Some(name) = name else {
            self.super_class = 0;
            return Ok(());
        };

        let name_index = self.constant_pool.add_utf8(&name.as_path()?)?;
        if self.super_class == 0 {
            self.super_class = self
                .constant_pool
                .add_constant(Constant::Class(ClassInfo { name_index }))?;
        } else {
            self.constant_pool.class_info_mut(self.super_class)?.name_index = name_index;
        }

        Ok(())
    }

    pub fn interface_indices(&self) -> &[u16] {
        &self.interfaces
    }

    pub fn interfaces(&self) -> Result<Vec<TypeName>> {
        self.interfaces
            .iter()
            .map(|&index| self.constant_pool.class_name(index))
            .collect()
    }

    pub fn fields(&self) -> &[ClassField] {
        &self.fields
    }

    pub fn fields_mut(&mut self) -> &mut [ClassField] {
        &mut self.fields
    }

    pub fn methods(&self) -> &[ClassMethod] {
        &self.methods
    }

    pub fn methods_mut(&mut self) -> &mut [ClassMethod] {
        &mut self.methods
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn add_attribute(&mut self, attribute: Attribute) {
        self.attributes.push(attribute);
    }

    pub fn field_by_name(&self, name: &str) -> Option<&ClassField> {
        self.fields
            .iter()
            .find(|field| matches!(field.name(&self.constant_pool), Ok(n) if n == name))
    }

    /// The first method called `name`. Overloads and bridges share a name, so this is the one
    /// declared first.
    pub fn method_by_name(&self, name: &str) -> Option<&ClassMethod> {
        self.methods
            .iter()
            .find(|method| matches!(method.name(&self.constant_pool), Ok(n) if n == name))
    }
}

/// A short listing of the class in the spirit of `javap`.
impl fmt::Display for ClassFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let constant_pool = &self.constant_pool;

        write_flags(f, &self.access_flags.name())?;
        write!(f, "class {}", display_name(self.class_name()))?;
        match self.super_class_name() {
            Ok(Some(name)) => write!(f, " extends {}", name.as_identifier())?,
            Ok(None) => {}
            Err(_) => f.write_str(" extends <invalid>")?,
        }
        writeln!(f, " (version {}.{})", self.major_version, self.minor_version)?;

        for &index in &self.interfaces {
            writeln!(
                f,
                "  implements {}",
                display_name(constant_pool.class_name(index))
            )?;
        }

        for field in &self.fields {
            write!(f, "  field ")?;
            write_flags(f, &field.access_flags().name())?;
            write!(
                f,
                "{} {}",
                display_name(field.descriptor(constant_pool)),
                display_text(field.name(constant_pool))
            )?;
            if let Ok(Some(value)) = field.constant_value(constant_pool) {
                write!(f, " = {}", value)?;
            }
            writeln!(f)?;
        }

        for method in &self.methods {
            write!(f, "  method ")?;
            write_flags(f, &method.access_flags().name())?;
            let parameters = method
                .parameter_types()
                .iter()
                .map(TypeName::as_identifier)
                .collect::<Vec<_>>();
            write!(
                f,
                "{} {}({})",
                method.return_type().as_identifier(),
                display_text(method.name(constant_pool)),
                parameters.join(", ")
            )?;
            if let Ok(exceptions) = method.exceptions(constant_pool) {
                if !exceptions.is_empty() {
                    let exceptions = exceptions
                        .iter()
                        .map(TypeName::as_identifier)
                        .collect::<Vec<_>>();
                    write!(f, " throws {}", exceptions.join(", "))?;
                }
            }
            writeln!(f)?;
        }

        let attributes = self
            .attributes
            .iter()
            .map(|attribute| display_text(attribute.name(constant_pool)))
            .collect::<Vec<_>>();
        write!(f, "  attributes: {}", attributes.join(", "))
    }
}

fn write_flags(f: &mut fmt::Formatter<'_>, flags: &str) -> fmt::Result {
    if flags.is_empty() {
        return Ok(());
    }
    write!(f, "{} ", flags)
}

fn display_name(name: Result<TypeName>) -> String {
    name.map_or_else(|_| "<invalid>".to_owned(), |name| name.as_identifier())
}

fn display_text(text: Result<std::borrow::Cow<'_, str>>) -> String {
    text.map_or_else(|_| "<invalid>".to_owned(), |text| text.into_owned())
}
