// https://docs.oracle.com/javase/specs/jvms/se19/html/jvms-4.html

mod access_flags;
pub mod attributes;
mod class_file;
mod constant_pool;
mod error;
mod members;
mod parser;
mod writer;

pub use self::class_file::{ClassFile, JAVA_5_MAJOR_VERSION, MAGIC};
pub use access_flags::{ClassAccessFlags, FieldAccessFlags, MethodAccessFlags};
pub use constant_pool::{
    ClassInfo, Constant, ConstantPool, ConstantValue, DynamicInfo, MethodHandleInfo,
    MethodTypeInfo, NameAndTypeInfo, RefInfo, Utf8Info,
};
pub use error::ClassFileError;
pub use members::{ClassField, ClassMethod};
pub use parser::Parser;
pub use writer::Writer;

pub type Result<T, E = ClassFileError> = std::result::Result<T, E>;
