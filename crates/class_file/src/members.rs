use std::borrow::Cow;

use jace_metaclass::{MethodDescriptor, TypeName};

use crate::{
    access_flags::{FieldAccessFlags, MethodAccessFlags},
    attributes::{Attribute, Attributes, CodeAttribute, ConstantValueAttribute},
    constant_pool::{ConstantPool, ConstantValue},
    Result,
};

#[derive(Debug, Clone, PartialEq)]
pub struct ClassField {
    access_flags: FieldAccessFlags,
    name_index: u16,
    descriptor_index: u16,
    attributes: Attributes,
}

impl ClassField {
    pub fn new(
        access_flags: FieldAccessFlags,
        name_index: u16,
        descriptor_index: u16,
        attributes: Attributes,
    ) -> Self {
        Self {
            access_flags,
            name_index,
            descriptor_index,
            attributes,
        }
    }

    pub fn access_flags(&self) -> FieldAccessFlags {
        self.access_flags
    }

    pub fn set_access_flags(&mut self, access_flags: FieldAccessFlags) {
        self.access_flags = access_flags;
    }

    pub fn name_index(&self) -> u16 {
        self.name_index
    }

    pub fn set_name_index(&mut self, name_index: u16) {
        self.name_index = name_index;
    }

    pub fn descriptor_index(&self) -> u16 {
        self.descriptor_index
    }

    pub fn set_descriptor_index(&mut self, descriptor_index: u16) {
        self.descriptor_index = descriptor_index;
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn add_attribute(&mut self, attribute: Attribute) {
        self.attributes.push(attribute);
    }

    pub fn name<'a>(&self, constant_pool: &'a ConstantPool) -> Result<Cow<'a, str>> {
        constant_pool.utf8(self.name_index)
    }

    pub fn descriptor(&self, constant_pool: &ConstantPool) -> Result<TypeName> {
        Ok(TypeName::from_descriptor(
            constant_pool.utf8(self.descriptor_index)?,
        )?)
    }

    pub fn constant_value_attribute(&self) -> Option<&ConstantValueAttribute> {
        self.attributes.constant_value()
    }

    /// The initial value of a `static final` field, when the compiler recorded one.
    pub fn constant_value<'a>(
        &self,
        constant_pool: &'a ConstantPool,
    ) -> Result<Option<ConstantValue<'a>>> {
        let Some(attribute) = self.constant_value_attribute() else {
            return Ok(None);
        };

        match constant_pool.get(attribute.value_index) {
            Some(constant) => constant.value(constant_pool),
            None => Err(crate::constant_pool::wrong_kind(
                attribute.value_index,
                "a constant value",
                None,
            )),
        }
    }
}

/// A method and the types of its descriptor, parsed once when it is built.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassMethod {
    access_flags: MethodAccessFlags,
    name_index: u16,
    descriptor_index: u16,
    attributes: Attributes,
    parameter_types: Vec<TypeName>,
    return_type: TypeName,
}

impl ClassMethod {
    /// Fails if the `descriptor_index` entry is not a well-formed method descriptor.
    pub fn new(
        access_flags: MethodAccessFlags,
        name_index: u16,
        descriptor_index: u16,
        attributes: Attributes,
        constant_pool: &ConstantPool,
    ) -> Result<Self> {
        let (parameter_types, return_type) =
            MethodDescriptor::parse(&constant_pool.utf8(descriptor_index)?)?.into_parts();

        Ok(Self {
            access_flags,
            name_index,
            descriptor_index,
            attributes,
            parameter_types,
            return_type,
        })
    }

    pub fn access_flags(&self) -> MethodAccessFlags {
        self.access_flags
    }

    pub fn set_access_flags(&mut self, access_flags: MethodAccessFlags) {
        self.access_flags = access_flags;
    }

    pub fn name_index(&self) -> u16 {
        self.name_index
    }

    pub fn set_name_index(&mut self, name_index: u16) {
        self.name_index = name_index;
    }

    pub fn descriptor_index(&self) -> u16 {
        self.descriptor_index
    }

    /// Points the method at another descriptor and parses it again. On failure nothing changes.
    pub fn set_descriptor_index(
        &mut self,
        descriptor_index: u16,
        constant_pool: &ConstantPool,
    ) -> Result<()> {
        let (parameter_types, return_type) =
            MethodDescriptor::parse(&constant_pool.utf8(descriptor_index)?)?.into_parts();

        self.descriptor_index = descriptor_index;
        self.parameter_types = parameter_types;
        self.return_type = return_type;
        Ok(())
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn add_attribute(&mut self, attribute: Attribute) {
        self.attributes.push(attribute);
    }

    pub fn name<'a>(&self, constant_pool: &'a ConstantPool) -> Result<Cow<'a, str>> {
        constant_pool.utf8(self.name_index)
    }

    pub fn descriptor<'a>(&self, constant_pool: &'a ConstantPool) -> Result<Cow<'a, str>> {
        constant_pool.utf8(self.descriptor_index)
    }

    pub fn parameter_types(&self) -> &[TypeName] {
        &self.parameter_types
    }

    pub fn return_type(&self) -> &TypeName {
        &self.return_type
    }

    pub fn code(&self) -> Option<&CodeAttribute> {
        self.attributes.code()
    }

    /// The types listed in the `Exceptions` attribute, if there is one.
    pub fn exceptions(&self, constant_pool: &ConstantPool) -> Result<Vec<TypeName>> {
        let Some(exceptions) = self.attributes.exceptions() else {
            return Ok(Vec::new());
        };

        exceptions
            .exception_index_table
            .iter()
            .map(|&index| constant_pool.class_name(index))
            .collect()
    }
}
