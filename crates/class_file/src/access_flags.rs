use std::fmt;

use bitflags::bitflags;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ClassAccessFlags: u16 {
        const PUBLIC = 0x0001;
        const FINAL = 0x0010;
        const SUPER = 0x0020;
        const INTERFACE = 0x0200;
        const ABSTRACT = 0x0400;
        const SYNTHETIC = 0x1000;
        const ANNOTATION = 0x2000;
        const ENUM = 0x4000;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct FieldAccessFlags: u16 {
        const PUBLIC = 0x0001;
        const PRIVATE = 0x0002;
        const PROTECTED = 0x0004;
        const STATIC = 0x0008;
        const FINAL = 0x0010;
        const VOLATILE = 0x0040;
        const TRANSIENT = 0x0080;
        const SYNTHETIC = 0x1000;
        const ENUM = 0x4000;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct MethodAccessFlags: u16 {
        const PUBLIC = 0x0001;
        const PRIVATE = 0x0002;
        const PROTECTED = 0x0004;
        const STATIC = 0x0008;
        const FINAL = 0x0010;
        const SYNCHRONIZED = 0x0020;
        const BRIDGE = 0x0040;
        const VARARGS = 0x0080;
        const NATIVE = 0x0100;
        const ABSTRACT = 0x0400;
        const STRICT = 0x0800;
        const SYNTHETIC = 0x1000;
    }
}

/// Gives a flag set its modifier names, in the order the rows are listed.
macro_rules! flag_names {
    ($flags:ty, [$(($flag:ident, $name:literal)),* $(,)?]) => {
        impl $flags {
            const NAMES: &'static [($flags, &'static str)] = &[$((<$flags>::$flag, $name)),*];

            /// The names of the set flags joined with spaces. Bits without a name are skipped.
            pub fn name(&self) -> String {
                Self::NAMES
                    .iter()
                    .filter(|(flag, _)| self.contains(*flag))
                    .map(|(_, name)| *name)
                    .collect::<Vec<_>>()
                    .join(" ")
            }
        }

        impl fmt::Display for $flags {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.name())
            }
        }
    };
}

flag_names!(
    ClassAccessFlags,
    [
        (PUBLIC, "public"),
        (FINAL, "final"),
        (SUPER, "super"),
        (INTERFACE, "interface"),
        (ABSTRACT, "abstract"),
        (SYNTHETIC, "synthetic"),
        (ANNOTATION, "annotation"),
        (ENUM, "enum"),
    ]
);

flag_names!(
    FieldAccessFlags,
    [
        (PUBLIC, "public"),
        (PRIVATE, "private"),
        (PROTECTED, "protected"),
        (STATIC, "static"),
        (FINAL, "final"),
        (VOLATILE, "volatile"),
        (TRANSIENT, "transient"),
        (ENUM, "enum"),
        (SYNTHETIC, "synthetic"),
    ]
);

flag_names!(
    MethodAccessFlags,
    [
        (PUBLIC, "public"),
        (PRIVATE, "private"),
        (PROTECTED, "protected"),
        (STATIC, "static"),
        (FINAL, "final"),
        (SYNCHRONIZED, "synchronized"),
        (BRIDGE, "bridge"),
        (VARARGS, "varargs"),
        (NATIVE, "native"),
        (ABSTRACT, "abstract"),
        (STRICT, "strict"),
        (SYNTHETIC, "synthetic"),
    ]
);
