use std::{fmt, iter::Peekable, str::CharIndices};

use crate::{MetaClassError, PrimitiveKind, Result, TypeName};

/// A parsed method descriptor such as `(ILjava/lang/String;[J)V`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDescriptor {
    parameters: Vec<TypeName>,
    return_type: TypeName,
}

impl MethodDescriptor {
    pub fn parse(descriptor: &str) -> Result<Self> {
        let mut reader = DescriptorReader {
            descriptor,
            chars: descriptor.char_indices().peekable(),
        };

        if reader.next() != Some('(') {
            return Err(reader.malformed("it does not begin its parameter list with a '('"));
        }

        let mut parameters = Vec::new();
        loop {
            match reader.peek() {
                Some(')') => break,
                None => {
                    return Err(reader.malformed("it does not end its parameter list with a ')'"))
                }
                Some(_) => parameters.push(reader.read_type(false)?),
            }
        }
        reader.next();

        let return_type = reader.read_type(true)?;

        if reader.peek().is_some() {
            return Err(reader.malformed("it does not end after specifying the return type"));
        }

        Ok(Self {
            parameters,
            return_type,
        })
    }

    pub fn parameters(&self) -> &[TypeName] {
        &self.parameters
    }

    pub fn return_type(&self) -> &TypeName {
        &self.return_type
    }

    pub fn into_parts(self) -> (Vec<TypeName>, TypeName) {
        (self.parameters, self.return_type)
    }
}

impl fmt::Display for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for parameter in &self.parameters {
            f.write_str(&parameter.as_descriptor())?;
        }
        write!(f, "){}", self.return_type.as_descriptor())
    }
}

struct DescriptorReader<'a> {
    descriptor: &'a str,
    chars: Peekable<CharIndices<'a>>,
}

impl<'a> DescriptorReader<'a> {
    fn next(&mut self) -> Option<char> {
        self.chars.next().map(|(_, c)| c)
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().map(|&(_, c)| c)
    }

    fn position(&mut self) -> usize {
        match self.chars.peek() {
            Some(&(i, _)) => i,
            None => self.descriptor.len(),
        }
    }

    /// Reads one field type, or `V` when `allow_void` is set and no array prefix was read.
    fn read_type(&mut self, allow_void: bool) -> Result<TypeName> {
        let start = self.position();

        let mut dimensions = 0;
        while self.peek() == Some('[') {
            self.next();
            dimensions += 1;
        }

        match self.next() {
            None => return Err(self.malformed("the type ends prematurely")),
            Some('V') if !allow_void || dimensions > 0 => {
                return Err(self.malformed("void is only allowed as the return type"))
            }
            Some('L') => loop {
                match self.next() {
                    None => return Err(self.malformed("an object type ends prematurely")),
                    Some(';') => break,
                    Some(_) => {}
                }
            },
            Some(c) if PrimitiveKind::from_descriptor_char(c).is_some() => {}
            Some(_) => return Err(self.malformed("a type was expected, but none could be found")),
        }

        let end = self.position();
        TypeName::from_descriptor(&self.descriptor[start..end])
            .map_err(|_| self.malformed("it contains an invalid field type"))
    }

    fn malformed(&self, reason: &'static str) -> MetaClassError {
        MetaClassError::MalformedMethodDescriptor {
            descriptor: self.descriptor.to_owned(),
            reason,
        }
    }
}
