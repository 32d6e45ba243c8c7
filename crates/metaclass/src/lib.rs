// https://docs.oracle.com/javase/specs/jvms/se19/html/jvms-4.html#jvms-4.3

mod error;
mod keyword;
mod meta_class;
mod method_descriptor;
mod package;
mod primitive;
mod type_name;

pub use error::MetaClassError;
pub use keyword::adjust_keyword;
pub use meta_class::{ClassMetaClass, MetaClass};
pub use method_descriptor::MethodDescriptor;
pub use package::{ClassPackage, PEER_PACKAGE, PROXY_PACKAGE};
pub use primitive::PrimitiveKind;
pub use type_name::TypeName;

pub type Result<T, E = MetaClassError> = std::result::Result<T, E>;
