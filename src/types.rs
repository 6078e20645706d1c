use std::fmt;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Mutability {
    ReadOnly,
    WriteOnly,
    ReadWrite,
}

impl Mutability {
    pub const fn is_readable(self) -> bool {
        matches!(self, Mutability::ReadOnly | Mutability::ReadWrite)
    }

    pub const fn is_writable(self) -> bool {
        matches!(self, Mutability::WriteOnly | Mutability::ReadWrite)
    }
}

/// A scalar type descriptor.
///
/// Descriptors are validated when constructed (see [`Type::int`] and
/// [`Type::float`]), so every value of this type has a legal byte size.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Type {
    Int(Scalar),
    Float(Scalar),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Scalar {
    signed: bool,
    byte_size: u32,
    mutability: Mutability,
}

impl Type {
    /// The type spelled `i32` in source programs.
    pub const I32: Type = Type::Int(Scalar {
        signed: true,
        byte_size: 4,
        mutability: Mutability::ReadOnly,
    });

    pub const INT_SIZES: &'static [u32] = &[1, 2, 4, 8];
    pub const FLOAT_SIZES: &'static [u32] = &[4, 8];

    pub fn int(signed: bool, byte_size: u32, mutability: Mutability) -> Result<Type, TypeError> {
        let scalar = Scalar::new(signed, byte_size, mutability, Self::INT_SIZES, "int")?;
        Ok(Type::Int(scalar))
    }

    pub fn float(signed: bool, byte_size: u32, mutability: Mutability) -> Result<Type, TypeError> {
        let scalar = Scalar::new(signed, byte_size, mutability, Self::FLOAT_SIZES, "float")?;
        Ok(Type::Float(scalar))
    }

    /// Returns the same type with another mutability qualifier.
    pub fn with_mutability(self, mutability: Mutability) -> Type {
        match self {
            Type::Int(s) => Type::Int(Scalar { mutability, ..s }),
            Type::Float(s) => Type::Float(Scalar { mutability, ..s }),
        }
    }

    fn scalar(&self) -> &Scalar {
        match self {
            Type::Int(s) | Type::Float(s) => s,
        }
    }

    pub fn is_signed(&self) -> bool {
        self.scalar().signed
    }

    pub fn byte_size(&self) -> u32 {
        self.scalar().byte_size
    }

    pub fn mutability(&self) -> Mutability {
        self.scalar().mutability
    }

    /// The bare C spelling, without qualifiers.
    pub fn c_type(&self) -> &'static str {
        match *self {
            Type::Int(Scalar {
                signed, byte_size, ..
            }) => match (signed, byte_size) {
                (true, 1) => "char",
                (true, 2) => "short",
                (true, 4) => "int",
                (true, _) => "long long",
                (false, 1) => "unsigned char",
                (false, 2) => "unsigned short",
                (false, 4) => "unsigned int",
                (false, _) => "unsigned long long",
            },
            Type::Float(Scalar { byte_size: 4, .. }) => "float",
            Type::Float(_) => "double",
        }
    }

    /// Spelling used to declare a variable holding a value of this type.
    pub fn var_c_type(&self) -> Result<String, TypeError> {
        let mutability = self.mutability();
        if !mutability.is_readable() {
            return Err(TypeError::WriteOnlyVariable);
        }
        if mutability.is_writable() {
            Ok(self.c_type().to_owned())
        } else {
            Ok(format!("const {}", self.c_type()))
        }
    }

    /// Spelling used for declarations such as parameters, where writable
    /// types are passed by pointer.
    pub fn decl_c_type(&self) -> String {
        if self.mutability().is_writable() {
            format!("{}*", self.c_type())
        } else {
            format!("const {}", self.c_type())
        }
    }

    /// Spelling used for function return types.
    pub fn ret_c_type(&self) -> Result<&'static str, TypeError> {
        if self.mutability().is_writable() {
            return Err(TypeError::WritableReturn);
        }
        Ok(self.c_type())
    }

    /// Whether a value of type `self` can be used where `other` is expected
    /// without narrowing.
    pub fn compatible(&self, other: &Type) -> bool {
        match (self, other) {
            (Type::Int(a), Type::Int(b)) | (Type::Float(a), Type::Float(b)) => {
                a.signed == b.signed && a.byte_size <= b.byte_size
            }
            _ => false,
        }
    }

    pub fn exact(&self, other: &Type) -> bool {
        match (self, other) {
            (Type::Int(a), Type::Int(b)) | (Type::Float(a), Type::Float(b)) => {
                a.signed == b.signed && a.byte_size == b.byte_size
            }
            _ => false,
        }
    }
}

impl Scalar {
    fn new(
        signed: bool,
        byte_size: u32,
        mutability: Mutability,
        allowed: &[u32],
        variant: &'static str,
    ) -> Result<Scalar, TypeError> {
        if !byte_size.is_power_of_two() {
            return Err(TypeError::NotPowerOfTwo { byte_size });
        }
        if !allowed.contains(&byte_size) {
            return Err(TypeError::InvalidByteSize { byte_size, variant });
        }
        Ok(Scalar {
            signed,
            byte_size,
            mutability,
        })
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match (self, self.is_signed()) {
            (Type::Float(_), _) => 'f',
            (Type::Int(_), true) => 'i',
            (Type::Int(_), false) => 'u',
        };
        let bits = self.byte_size() * 8;
        match self.mutability() {
            Mutability::ReadOnly => write!(f, "{prefix}{bits}"),
            Mutability::WriteOnly => write!(f, "writeonly {prefix}{bits}"),
            Mutability::ReadWrite => write!(f, "mut {prefix}{bits}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TypeError {
    #[error("byte_size is not a power of 2")]
    NotPowerOfTwo { byte_size: u32 },
    #[error("invalid byte size of {byte_size} bytes for {variant}")]
    InvalidByteSize {
        byte_size: u32,
        variant: &'static str,
    },
    #[error("write-only type used in variable declaration")]
    WriteOnlyVariable,
    #[error("writable type used as return type")]
    WritableReturn,
}

#[cfg(test)]
mod tests {
    use super::*;
    use Mutability::*;

    fn int(signed: bool, byte_size: u32) -> Type {
        Type::int(signed, byte_size, ReadOnly).unwrap()
    }

    #[test]
    fn rejects_non_power_of_two() {
        for byte_size in [0, 3, 5, 6, 12] {
            let error = Type::int(true, byte_size, ReadOnly).unwrap_err();
            assert_eq!(error, TypeError::NotPowerOfTwo { byte_size });
            assert_eq!(error.to_string(), "byte_size is not a power of 2");
        }
        assert!(Type::float(true, 3, ReadOnly).is_err());
    }

    #[test]
    fn rejects_sizes_outside_variant_set() {
        let error = Type::int(true, 16, ReadOnly).unwrap_err();
        assert_eq!(error.to_string(), "invalid byte size of 16 bytes for int");

        for byte_size in [1, 2, 16] {
            let error = Type::float(true, byte_size, ReadOnly).unwrap_err();
            assert_eq!(
                error,
                TypeError::InvalidByteSize {
                    byte_size,
                    variant: "float"
                }
            );
        }
    }

    #[test]
    fn i32_constant_is_valid() {
        assert_eq!(Type::int(true, 4, ReadOnly), Ok(Type::I32));
        assert_eq!(Type::I32.to_string(), "i32");
    }

    #[test]
    fn c_spellings() {
        let cases = [
            (int(true, 1), "char"),
            (int(true, 2), "short"),
            (int(true, 4), "int"),
            (int(true, 8), "long long"),
            (int(false, 1), "unsigned char"),
            (int(false, 8), "unsigned long long"),
            (Type::float(true, 4, ReadOnly).unwrap(), "float"),
            (Type::float(true, 8, ReadOnly).unwrap(), "double"),
        ];
        for (ty, spelling) in cases {
            assert_eq!(ty.c_type(), spelling, "{ty}");
        }
    }

    #[test]
    fn var_c_type() {
        assert_eq!(Type::I32.var_c_type().unwrap(), "const int");
        let rw = Type::I32.with_mutability(ReadWrite);
        assert_eq!(rw.var_c_type().unwrap(), "int");
        let wo = Type::I32.with_mutability(WriteOnly);
        assert_eq!(wo.var_c_type(), Err(TypeError::WriteOnlyVariable));
    }

    #[test]
    fn ret_c_type() {
        assert_eq!(Type::I32.ret_c_type(), Ok("int"));
        for mutability in [WriteOnly, ReadWrite] {
            let ty = Type::I32.with_mutability(mutability);
            assert_eq!(ty.ret_c_type(), Err(TypeError::WritableReturn));
        }
    }

    #[test]
    fn decl_c_type() {
        assert_eq!(Type::I32.decl_c_type(), "const int");
        let double = Type::float(true, 8, ReadWrite).unwrap();
        assert_eq!(double.decl_c_type(), "double*");
        let wo = Type::I32.with_mutability(WriteOnly);
        assert_eq!(wo.decl_c_type(), "int*");
    }

    #[test]
    fn compatibility_is_ordered_by_size() {
        for signed in [true, false] {
            for &a in Type::INT_SIZES {
                for &b in Type::INT_SIZES {
                    let (ta, tb) = (int(signed, a), int(signed, b));
                    assert_eq!(ta.compatible(&tb), a <= b, "{ta} -> {tb}");
                    assert_eq!(ta.exact(&tb), a == b, "{ta} == {tb}");
                }
            }
        }
    }

    #[test]
    fn incompatible_across_signedness_and_variant() {
        let i4 = int(true, 4);
        let u4 = int(false, 4);
        let u8_ = int(false, 8);
        let f4 = Type::float(true, 4, ReadOnly).unwrap();
        let f8 = Type::float(true, 8, ReadOnly).unwrap();

        assert!(!i4.compatible(&u4));
        assert!(!i4.exact(&u4));
        assert!(!u4.compatible(&i4));
        assert!(u4.compatible(&u8_));
        assert!(!i4.compatible(&f4));
        assert!(!i4.exact(&f4));
        assert!(!f4.compatible(&i4));
        assert!(f4.compatible(&f8));
        assert!(!f8.compatible(&f4));
    }

    #[test]
    fn mutability_is_ignored_by_predicates() {
        let rw = Type::I32.with_mutability(ReadWrite);
        assert!(Type::I32.exact(&rw));
        assert!(rw.compatible(&Type::I32));
    }

    #[test]
    fn display() {
        let ty = Type::int(false, 2, ReadWrite).unwrap();
        assert_eq!(ty.to_string(), "mut u16");
        let ty = Type::float(true, 8, WriteOnly).unwrap();
        assert_eq!(ty.to_string(), "writeonly f64");
    }
}
